pub mod api;
pub mod client;
pub mod config;
pub mod model;
pub mod service;
pub mod store;

pub use model::{InventoryRecord, Slots, Status, WidgetId};
pub use service::WidgetService;
pub use store::{InventoryStore, MemoryStore};
