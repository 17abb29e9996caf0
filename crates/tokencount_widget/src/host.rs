use tokencount_core::{StatusViewModel, TextSnapshot, ViewId};

use crate::HostError;

/// Read access to the host's editors.
pub trait EditorHost {
    /// The editor view that currently has focus, if any.
    fn active_view(&self) -> Option<ViewId>;

    /// Selection text if the view has a non-empty selection, else the whole document.
    fn current_text(&self, view: ViewId) -> Result<TextSnapshot, HostError>;
}

/// The status-bar slot the widget renders into. Only called on the UI thread.
pub trait StatusDisplay {
    fn publish(&self, view: Option<ViewId>, model: &StatusViewModel);
}

/// Queues `Controller::pump` on the host's UI thread.
///
/// Called from worker threads whenever a background count has finished.
pub trait UiScheduler: Send + Sync {
    fn schedule_pump(&self);
}

/// A listener registration that must be released on dispose.
pub trait Subscription {
    fn unsubscribe(&mut self);
}
