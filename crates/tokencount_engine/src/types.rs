use std::fmt;
use std::time::Duration;

pub type ViewId = u64;
pub type Generation = u64;

/// A debounced count request for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountJob {
    pub view: ViewId,
    pub generation: Generation,
    pub text: String,
    pub debounce: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CountCompleted {
        view: ViewId,
        generation: Generation,
        result: Result<u32, CountFailure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountFailure {
    #[error("token counter panicked: {0}")]
    Panicked(String),
    #[error("count task aborted")]
    Aborted,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl fmt::Display for CountJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "view={} generation={} chars={} debounce={:?}",
            self.view,
            self.generation,
            self.text.chars().count(),
            self.debounce
        )
    }
}
