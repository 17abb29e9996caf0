use thiserror::Error;

use tokencount_core::ViewId;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("engine failed to start: {0}")]
    Engine(#[from] tokencount_engine::EngineError),
}

/// The host could not supply text for a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("view {0} is disposed")]
    ViewDisposed(ViewId),
    #[error("text unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Parse(String),
}
