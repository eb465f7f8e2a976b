//! Display state of one embedded widget and the reducer driving it.

use tracing::{debug, error, warn};

use super::FetchError;
use crate::model::Slots;

/// Lifecycle of a widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No successful poll yet.
    #[default]
    Uninitialized,
    /// Slots remain.
    Active,
    /// Server reports zero remaining. A later poll can revive the widget.
    Depleted,
    /// Access denied. Terminal.
    Revoked,
}

/// Result of one status fetch.
#[derive(Debug)]
pub enum PollOutcome {
    Status { remaining: Slots, total: Slots },
    Revoked,
    /// Network, status or decode failure; all are handled the same way.
    Failed(FetchError),
}

/// Input of the reducer.
#[derive(Debug)]
pub enum Event {
    /// A fetch issued as poll number `seq` completed.
    Polled { seq: u64, outcome: PollOutcome },
    /// The urgency simulator fired with a drawn decrement.
    Simulated { decrement: Slots },
}

/// What the render sink should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Hidden,
    Showing { remaining: Slots, total: Slots },
    Removed,
}

/// Reconciled state of the real and simulated counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayState {
    phase: Phase,
    /// Last remaining count reported by the server.
    authoritative: Slots,
    /// Count currently displayed, decayed by the simulator.
    displayed: Slots,
    total: Slots,
    /// Sequence number of the last applied status.
    last_poll: Option<u64>,
}

/// Public API
impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn authoritative(&self) -> Slots {
        self.authoritative
    }

    pub fn displayed(&self) -> Slots {
        self.displayed
    }

    pub fn total(&self) -> Slots {
        self.total
    }

    pub fn is_revoked(&self) -> bool {
        self.phase == Phase::Revoked
    }

    /// Apply one event and return the next state.
    pub fn apply(self, event: Event) -> Self {
        if self.is_revoked() {
            return self;
        }
        match event {
            Event::Polled { seq, outcome } => self.apply_poll(seq, outcome),
            Event::Simulated { decrement } => self.apply_simulation(decrement),
        }
    }

    /// Hidden while nothing real remains, removed once revoked.
    pub fn frame(&self) -> Frame {
        match self.phase {
            Phase::Revoked => Frame::Removed,
            _ if self.authoritative <= 0 => Frame::Hidden,
            _ => Frame::Showing {
                remaining: self.displayed,
                total: self.total,
            },
        }
    }
}

/// Private API
impl DisplayState {
    /// Apply a completed poll:
    /// - Revocation is terminal, whatever the poll order
    /// - Failures keep the last good state
    /// - Statuses older than the last applied one are dropped
    /// - The displayed count snaps up to the real one, but is never pulled
    ///   up while the simulator is still catching down
    fn apply_poll(self, seq: u64, outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Revoked => {
                error!(seq, "access revoked, removing widget");
                Self {
                    phase: Phase::Revoked,
                    ..self
                }
            }
            PollOutcome::Failed(e) => {
                warn!(seq, error = %e, "status fetch failed, keeping last value");
                self
            }
            PollOutcome::Status { remaining, total } => {
                if self.last_poll.is_some_and(|last| seq <= last) {
                    debug!(seq, "dropping out-of-order status");
                    return self;
                }

                let displayed = if self.displayed <= remaining {
                    remaining
                } else {
                    self.displayed
                };
                let phase = if remaining > 0 {
                    Phase::Active
                } else {
                    Phase::Depleted
                };

                Self {
                    phase,
                    authoritative: remaining,
                    displayed,
                    total,
                    last_poll: Some(seq),
                }
            }
        }
    }

    /// Decay the displayed count by 1 or 2, never below the real count and
    /// never below 1.
    fn apply_simulation(self, decrement: Slots) -> Self {
        if self.displayed <= 1 || self.displayed <= self.authoritative {
            return self;
        }

        let floor = self.authoritative.max(1);
        let displayed = (self.displayed - decrement.clamp(1, 2)).max(floor);

        Self { displayed, ..self }
    }
}
