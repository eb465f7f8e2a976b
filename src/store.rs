//! Inventory storage.
//!
//! Services only see the [`InventoryStore`] trait, so a durable backend can
//! replace [`MemoryStore`] without touching status or config logic.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::model::{InventoryRecord, WidgetId};

/// Error raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Keyed storage of inventory records.
pub trait InventoryStore: Send + Sync {
    /// Fetch the record for `widget`, if one was ever written.
    fn get(&self, widget: &str) -> Result<Option<InventoryRecord>, StoreError>;

    /// Replace the record for `widget`.
    fn put(&self, widget: &str, record: InventoryRecord) -> Result<(), StoreError>;
}

impl<S: InventoryStore + ?Sized> InventoryStore for Arc<S> {
    fn get(&self, widget: &str) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get(widget)
    }

    fn put(&self, widget: &str, record: InventoryRecord) -> Result<(), StoreError> {
        (**self).put(widget, record)
    }
}

/// In-process store. Concurrent writes to one widget are last-write-wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<WidgetId, InventoryRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store preloaded with `records`.
    pub fn with_records(records: impl IntoIterator<Item = (WidgetId, InventoryRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl InventoryStore for MemoryStore {
    fn get(&self, widget: &str) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self.records.get(widget).map(|entry| *entry.value()))
    }

    fn put(&self, widget: &str, record: InventoryRecord) -> Result<(), StoreError> {
        self.records.insert(widget.to_string(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_widget_reads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn put_overwrites_whole_record() {
        let store = MemoryStore::new();
        let mut revoked = InventoryRecord::new(10, 2);
        revoked.deactivate();
        store.put("w1", revoked).unwrap();

        store.put("w1", InventoryRecord::new(20, 5)).unwrap();

        assert_eq!(store.get("w1").unwrap(), Some(InventoryRecord::new(20, 5)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn preloaded_records_are_readable() {
        let store = MemoryStore::with_records([("a".to_string(), InventoryRecord::new(3, 1))]);
        assert_eq!(store.get("a").unwrap().map(|r| r.remaining()), Some(2));
    }

    #[test]
    fn shared_store_delegates() {
        let store: Arc<dyn InventoryStore> = Arc::new(MemoryStore::new());
        store.put("w", InventoryRecord::new(1, 0)).unwrap();
        assert!(store.get("w").unwrap().is_some());
    }
}
