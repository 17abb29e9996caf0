use crate::{Generation, TextSnapshot, ViewId};

/// Which editor notification triggered a recount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CaretMoved,
    SelectionChanged,
    DocumentChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The host resolved a new active view. `snapshot` is `None` when its text
    /// could not be read.
    ViewActivated {
        view: ViewId,
        snapshot: Option<TextSnapshot>,
    },
    /// The host has no active editor view any more.
    ViewCleared,
    /// Caret, selection or document notification for a view.
    ViewEvent {
        view: ViewId,
        kind: EventKind,
        snapshot: Option<TextSnapshot>,
    },
    /// A count finished for the given generation.
    CountFinished {
        view: ViewId,
        generation: Generation,
        count: u32,
    },
    /// A count errored for the given generation.
    CountFailed { view: ViewId, generation: Generation },
    /// Widget is being torn down.
    Dispose,
}
