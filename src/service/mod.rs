//! Status and config services.
//!
//! The service is the only writer and reader of the inventory store. Reads
//! derive remaining slots and apply the access gate; writes replace the whole
//! record and always re-activate the widget.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::model::{InventoryRecord, Slots, Status};
use crate::store::InventoryStore;

mod error;
pub use error::{ConfigError, ServiceError};

/// Widget inventory service, cheap to clone across request handlers.
#[derive(Clone)]
pub struct WidgetService {
    store: Arc<dyn InventoryStore>,
}

/// Public API
impl WidgetService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Backing store, for out-of-band administration.
    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    /// Status of `widget` at call time:
    /// - unknown or inactive widgets are `Revoked`
    /// - otherwise remaining slots are derived, floored at zero
    pub fn status(&self, widget: &str) -> Result<Status, ServiceError> {
        let status = match self.store.get(widget)? {
            Some(record) if record.active => Status::Available {
                remaining: record.remaining(),
                total: record.total_slots,
                timestamp: Utc::now(),
            },
            Some(_) => {
                info!(widget = %widget, "status denied: widget deactivated");
                Status::Revoked
            }
            None => {
                info!(widget = %widget, "status denied: unknown widget");
                Status::Revoked
            }
        };
        Ok(status)
    }

    /// Replace the record of `widget`:
    /// - Reject an empty identifier
    /// - Store a fresh active record, discarding any previous one
    pub fn configure(
        &self,
        widget: &str,
        total: Slots,
        sold: Slots,
    ) -> Result<InventoryRecord, ServiceError> {
        if widget.is_empty() {
            debug!("config rejected: missing widget id");
            return Err(ConfigError::MissingWidgetId.into());
        }

        let record = InventoryRecord::new(total, sold);
        self.store.put(widget, record)?;

        info!(widget = %widget, total, sold, "configuration saved");
        Ok(record)
    }
}

impl std::fmt::Debug for WidgetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetService").finish_non_exhaustive()
    }
}
