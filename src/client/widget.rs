//! Widget runtime: timers, fetches and rendering around the reducer.
//!
//! Poll ticks, simulator ticks and fetch completions are merged into a single
//! stream and applied one at a time, so the reducer sees an explicit order.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use reqwest::{StatusCode, Url};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::{IntervalStream, ReceiverStream};
use tracing::{debug, info, warn};

use super::{DisplayState, Event, FetchError, Frame, PollOutcome};
use crate::api::StatusResponse;
use crate::model::WidgetId;

/// Time between two status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Time between two simulated sales.
pub const SIMULATION_INTERVAL: Duration = Duration::from_secs(30);

/// Where the widget reads its status from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, widget: &str) -> PollOutcome;
}

/// Status source backed by the HTTP API at `origin`.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    origin: Url,
}

impl HttpStatusSource {
    pub fn new(origin: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin,
        }
    }

    /// `{origin}/api/status/{widget}`, with `widget` encoded as one segment.
    pub fn status_url(&self, widget: &str) -> Result<Url, FetchError> {
        let mut url = self.origin.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidOrigin(self.origin.to_string()))?
            .pop_if_empty()
            .extend(["api", "status", widget]);
        Ok(url)
    }

    async fn request(&self, widget: &str) -> Result<PollOutcome, FetchError> {
        let response = self.client.get(self.status_url(widget)?).send().await?;

        match response.status() {
            StatusCode::FORBIDDEN => return Ok(PollOutcome::Revoked),
            status if !status.is_success() => {
                return Err(FetchError::UnexpectedStatus(status.as_u16()));
            }
            _ => {}
        }

        let body: StatusResponse = serde_json::from_slice(&response.bytes().await?)?;
        Ok(PollOutcome::Status {
            remaining: body.remaining,
            total: body.total,
        })
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self, widget: &str) -> PollOutcome {
        self.request(widget)
            .await
            .unwrap_or_else(PollOutcome::Failed)
    }
}

/// Consumer of rendered frames.
pub trait RenderSink {
    fn render(&mut self, frame: &Frame);
}

impl RenderSink for Vec<Frame> {
    fn render(&mut self, frame: &Frame) {
        self.push(*frame);
    }
}

/// Writes one banner line per frame.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for ConsoleSink<W> {
    fn render(&mut self, frame: &Frame) {
        let result = match frame {
            Frame::Showing { remaining, .. } => writeln!(
                self.out,
                "🔥 LAST {remaining} SLOTS! Hurry before they're gone!"
            ),
            Frame::Hidden => writeln!(self.out, "(hidden)"),
            Frame::Removed => writeln!(self.out, "(removed)"),
        };
        if let Err(e) = result.and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to render frame");
        }
    }
}

/// Final state of a widget whose access was revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetReport {
    pub state: DisplayState,
    /// Number of fetches issued.
    pub polls: u64,
}

/// One embedded widget instance.
pub struct Widget<S> {
    widget_id: WidgetId,
    source: Arc<S>,
    poll_every: Duration,
    simulate_every: Duration,
    rng: StdRng,
}

enum Signal {
    PollDue,
    SimulateDue,
    Fetched { seq: u64, outcome: PollOutcome },
}

impl<S: StatusSource + 'static> Widget<S> {
    pub fn new(widget_id: impl Into<WidgetId>, source: S) -> Self {
        Self {
            widget_id: widget_id.into(),
            source: Arc::new(source),
            poll_every: POLL_INTERVAL,
            simulate_every: SIMULATION_INTERVAL,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn poll_every(mut self, period: Duration) -> Self {
        self.poll_every = period;
        self
    }

    pub fn simulate_every(mut self, period: Duration) -> Self {
        self.simulate_every = period;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Run until access is revoked. Transient failures never stop the widget.
    ///
    /// The first poll fires immediately, the first simulated sale one period
    /// after start. Dropping the returned future stops both timers.
    pub async fn run(mut self, sink: &mut impl RenderSink) -> WidgetReport {
        let (fetched_tx, fetched_rx) = mpsc::channel(16);

        let mut poll_timer = time::interval(self.poll_every);
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut simulation_timer =
            time::interval_at(Instant::now() + self.simulate_every, self.simulate_every);
        simulation_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut signals = IntervalStream::new(poll_timer)
            .map(|_| Signal::PollDue)
            .merge(IntervalStream::new(simulation_timer).map(|_| Signal::SimulateDue))
            .merge(
                ReceiverStream::new(fetched_rx)
                    .map(|(seq, outcome)| Signal::Fetched { seq, outcome }),
            );

        let mut inflight = JoinSet::new();
        let mut state = DisplayState::new();
        let mut rendered: Option<Frame> = None;
        let mut polls: u64 = 0;

        info!(widget = %self.widget_id, "widget started");

        while let Some(signal) = signals.next().await {
            while inflight.try_join_next().is_some() {}

            let event = match signal {
                Signal::PollDue => {
                    let seq = polls;
                    polls += 1;
                    let source = Arc::clone(&self.source);
                    let widget = self.widget_id.clone();
                    let fetched_tx = fetched_tx.clone();
                    inflight.spawn(async move {
                        let outcome = source.fetch(&widget).await;
                        // receiver is gone once the widget stopped
                        let _ = fetched_tx.send((seq, outcome)).await;
                    });
                    debug!(widget = %self.widget_id, seq, "poll issued");
                    continue;
                }
                Signal::SimulateDue => Event::Simulated {
                    decrement: self.rng.random_range(1..=2),
                },
                Signal::Fetched { seq, outcome } => Event::Polled { seq, outcome },
            };

            state = state.apply(event);

            let frame = state.frame();
            if rendered != Some(frame) {
                sink.render(&frame);
                rendered = Some(frame);
            }

            if state.is_revoked() {
                break;
            }
        }

        // Dropping the timers and the join set cancels every pending tick and fetch.
        inflight.abort_all();
        info!(widget = %self.widget_id, polls, "widget removed");

        WidgetReport { state, polls }
    }
}
