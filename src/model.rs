//! Core domain types for the slot counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Widget identifier, an opaque string chosen by the customer.
pub type WidgetId = String;

/// Slot count. Signed because inputs are coerced, not validated.
pub type Slots = i64;

/// Inventory of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Total capacity.
    pub total_slots: Slots,
    /// Number of slots consumed.
    pub sold_slots: Slots,
    /// Access gate; an inactive widget reads as revoked.
    pub active: bool,
}

impl InventoryRecord {
    /// Create a new, active record.
    pub fn new(total_slots: Slots, sold_slots: Slots) -> Self {
        Self {
            total_slots,
            sold_slots,
            active: true,
        }
    }

    /// Remaining slots, floored at zero. Never stored.
    pub fn remaining(&self) -> Slots {
        self.total_slots.saturating_sub(self.sold_slots).max(0)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Result of a status lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The widget is live.
    Available {
        remaining: Slots,
        total: Slots,
        timestamp: DateTime<Utc>,
    },
    /// Unknown or deactivated widget.
    Revoked,
}

impl Status {
    pub fn is_revoked(&self) -> bool {
        matches!(self, Status::Revoked)
    }
}
