//! Error types for the widget service.

use thiserror::Error;

use crate::store::StoreError;

/// Top-level error returned by [`WidgetService`](super::WidgetService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid config request: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejected config write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("widgetID is required")]
    MissingWidgetId,
}
