use std::collections::VecDeque;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokencount_core::{update, EventKind, Msg, StatusViewModel, TextSnapshot, ViewId, WidgetState};
use tokencount_engine::TokenCounter;

use crate::effects::EffectRunner;
use crate::{EditorHost, StatusDisplay, Subscription, UiScheduler, WidgetConfig, WidgetError};

/// Keeps the status-bar count in sync with the active editor view.
///
/// Every method must be called on the host's UI thread. Background counts come
/// back through [`Controller::pump`], which the host runs when the
/// [`UiScheduler`] asks for it.
pub struct Controller {
    state: WidgetState,
    host: Box<dyn EditorHost>,
    display: Box<dyn StatusDisplay>,
    effects: EffectRunner,
    subscriptions: Vec<Box<dyn Subscription>>,
}

impl Controller {
    pub fn new(
        config: &WidgetConfig,
        host: Box<dyn EditorHost>,
        display: Box<dyn StatusDisplay>,
        scheduler: Option<Arc<dyn UiScheduler>>,
    ) -> Result<Self, WidgetError> {
        Self::with_counter(config, config.counter(), host, display, scheduler)
    }

    pub fn with_counter(
        config: &WidgetConfig,
        counter: Arc<dyn TokenCounter>,
        host: Box<dyn EditorHost>,
        display: Box<dyn StatusDisplay>,
        scheduler: Option<Arc<dyn UiScheduler>>,
    ) -> Result<Self, WidgetError> {
        let effects = EffectRunner::new(counter, scheduler)?;
        let mut controller = Self {
            state: WidgetState::with_policy(config.policy()),
            host,
            display,
            effects,
            subscriptions: Vec::new(),
        };
        engine_info!("Token counter widget started with {:?}", config);
        controller.refresh_active_view();
        Ok(controller)
    }

    /// Registers a listener to release on [`Controller::dispose`].
    pub fn attach_subscription(&mut self, subscription: Box<dyn Subscription>) {
        if self.state.is_disposed() {
            let mut subscription = subscription;
            subscription.unsubscribe();
            return;
        }
        self.subscriptions.push(subscription);
    }

    pub fn on_active_view_changed(&mut self, view: Option<ViewId>) {
        match view {
            Some(view) if self.state.tracks(view) => {}
            Some(view) => {
                let snapshot = self.read_text(view);
                self.dispatch(Msg::ViewActivated { view, snapshot });
            }
            None => self.dispatch(Msg::ViewCleared),
        }
    }

    /// Re-resolves the active view from the host.
    pub fn refresh_active_view(&mut self) {
        let view = self.host.active_view();
        self.on_active_view_changed(view);
    }

    pub fn on_file_opened(&mut self) {
        self.refresh_active_view();
    }

    pub fn on_file_closed(&mut self) {
        self.refresh_active_view();
    }

    pub fn on_caret_moved(&mut self, view: ViewId) {
        self.on_view_event(view, EventKind::CaretMoved);
    }

    pub fn on_selection_changed(&mut self, view: ViewId) {
        self.on_view_event(view, EventKind::SelectionChanged);
    }

    pub fn on_document_changed(&mut self, view: ViewId) {
        self.on_view_event(view, EventKind::DocumentChanged);
    }

    /// Adopts finished background counts. Safe to call at any time.
    pub fn pump(&mut self) {
        while let Some(msg) = self.effects.next_message() {
            self.dispatch(msg);
        }
    }

    /// Cancels pending work and releases all listeners. Idempotent.
    pub fn dispose(&mut self) {
        for mut subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        if !self.state.is_disposed() {
            engine_info!("Token counter widget disposed");
            self.dispatch(Msg::Dispose);
        }
    }

    pub fn view_model(&self) -> StatusViewModel {
        self.state.view()
    }

    pub fn tracked_view(&self) -> Option<ViewId> {
        self.state.tracked_view()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    pub fn counter(&self) -> &dyn TokenCounter {
        self.effects.counter()
    }

    fn on_view_event(&mut self, view: ViewId, kind: EventKind) {
        if !self.state.tracks(view) {
            return;
        }
        let snapshot = self.read_text(view);
        self.dispatch(Msg::ViewEvent {
            view,
            kind,
            snapshot,
        });
    }

    fn read_text(&self, view: ViewId) -> Option<TextSnapshot> {
        match self.host.current_text(view) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                engine_warn!("Could not read text for view {}: {}", view, err);
                None
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            inbox.extend(self.effects.run(effects));
        }

        if self.state.consume_dirty() {
            let view = self.state.view();
            engine_debug!(
                "Publishing {:?} for view {:?}",
                view.text,
                self.state.tracked_view()
            );
            self.display.publish(self.state.tracked_view(), &view);
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.dispose();
    }
}
