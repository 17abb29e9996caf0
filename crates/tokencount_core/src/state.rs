use std::time::Duration;

use crate::view_model::StatusViewModel;

/// Host-assigned identity of an editor view.
pub type ViewId = u64;

/// Monotonic id of a single recount request.
pub type Generation = u64;

/// Text read from a view: the selection when one exists, else the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    pub text: String,
    pub is_selection: bool,
}

impl TextSnapshot {
    pub fn selection(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_selection: true,
        }
    }

    pub fn document(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_selection: false,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Thresholds deciding between the synchronous and the debounced path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountPolicy {
    /// Texts shorter than this many chars are counted synchronously.
    pub fast_path_max_chars: usize,
    pub debounce: Duration,
}

impl Default for CountPolicy {
    fn default() -> Self {
        Self {
            fast_path_max_chars: 3000,
            debounce: Duration::from_millis(300),
        }
    }
}

/// An outstanding count; `selection` is applied to the view only once it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingCount {
    Immediate { generation: Generation, selection: bool },
    Debounced { generation: Generation, selection: bool },
}

impl PendingCount {
    fn generation(self) -> Generation {
        match self {
            PendingCount::Immediate { generation, .. }
            | PendingCount::Debounced { generation, .. } => generation,
        }
    }

    fn selection(self) -> bool {
        match self {
            PendingCount::Immediate { selection, .. }
            | PendingCount::Debounced { selection, .. } => selection,
        }
    }
}

/// Per-view count state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    last_count: u32,
    selection_active: bool,
    pending: Option<PendingCount>,
}

impl ViewState {
    pub fn last_count(&self) -> u32 {
        self.last_count
    }

    pub fn selection_active(&self) -> bool {
        self.selection_active
    }

    /// True exactly while a debounced count is outstanding.
    pub fn calculation_in_progress(&self) -> bool {
        matches!(self.pending, Some(PendingCount::Debounced { .. }))
    }

    pub fn pending_generation(&self) -> Option<Generation> {
        self.pending.map(PendingCount::generation)
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.pending_generation() == Some(generation)
    }

    fn take_pending(&mut self) -> Option<Generation> {
        self.pending.take().map(PendingCount::generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetState {
    policy: CountPolicy,
    tracked: Option<ViewId>,
    view: ViewState,
    next_generation: Generation,
    disposed: bool,
    dirty: bool,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CountPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> CountPolicy {
        self.policy
    }

    pub fn tracked_view(&self) -> Option<ViewId> {
        self.tracked
    }

    pub fn tracks(&self, view: ViewId) -> bool {
        self.tracked == Some(view)
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn view(&self) -> StatusViewModel {
        StatusViewModel::from_view_state(&self.view)
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn track(&mut self, view: ViewId) -> Option<Generation> {
        let cancelled = self.view.take_pending();
        self.tracked = Some(view);
        self.view = ViewState::default();
        cancelled
    }

    pub(crate) fn untrack(&mut self) -> Option<Generation> {
        let cancelled = self.view.take_pending();
        self.tracked = None;
        self.view = ViewState::default();
        cancelled
    }

    pub(crate) fn dispose(&mut self) -> Option<Generation> {
        let cancelled = self.untrack();
        self.disposed = true;
        self.dirty = false;
        cancelled
    }

    /// Supersedes any pending count and registers a new one.
    pub(crate) fn begin_count(&mut self, selection: bool, debounced: bool) -> Generation {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.view.pending = Some(if debounced {
            PendingCount::Debounced {
                generation,
                selection,
            }
        } else {
            PendingCount::Immediate {
                generation,
                selection,
            }
        });
        generation
    }

    pub(crate) fn cancel_pending(&mut self) -> Option<Generation> {
        self.view.take_pending()
    }

    /// Adopts a finished count if it is still the current one.
    pub(crate) fn finish_count(
        &mut self,
        view: ViewId,
        generation: Generation,
        count: u32,
    ) -> bool {
        if !self.tracks(view) || !self.view.is_current(generation) {
            return false;
        }
        if let Some(pending) = self.view.pending.take() {
            self.view.selection_active = pending.selection();
        }
        self.view.last_count = count;
        true
    }

    /// A synchronous failure zeroes the view; a debounced one keeps the last published state.
    pub(crate) fn fail_count(&mut self, view: ViewId, generation: Generation) -> bool {
        if !self.tracks(view) || !self.view.is_current(generation) {
            return false;
        }
        if let Some(PendingCount::Immediate { .. }) = self.view.pending {
            self.reset_view();
        }
        self.view.pending = None;
        true
    }

    pub(crate) fn reset_view(&mut self) -> Option<Generation> {
        let cancelled = self.view.take_pending();
        self.view = ViewState::default();
        cancelled
    }
}
