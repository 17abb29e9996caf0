//! Token counter engine: estimation and debounced background counting.
mod bpe;
mod engine;
mod heuristic;
mod token;
mod types;

pub use bpe::{BpeTokenCounter, Encoding};
pub use engine::{ChannelEventSink, CountTicket, EngineHandle, EventNotifier, EventSink};
pub use heuristic::HeuristicTokenCounter;
pub use token::{estimate, Estimator, TokenCountResult, TokenCounter};
pub use types::{CountFailure, CountJob, EngineError, EngineEvent, Generation, ViewId};
