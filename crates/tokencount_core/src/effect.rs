use std::time::Duration;

use crate::{Generation, ViewId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Count synchronously and feed the result back before publishing.
    CountNow {
        view: ViewId,
        generation: Generation,
        text: String,
    },
    /// Count on a worker after the debounce interval.
    ScheduleCount {
        view: ViewId,
        generation: Generation,
        text: String,
        debounce: Duration,
    },
    /// Invalidate a previously scheduled count.
    CancelCount { generation: Generation },
}
