use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tokencount_widget::{
    Controller, EditorHost, HostError, StatusDisplay, StatusViewModel, Subscription, TextSnapshot,
    UiScheduler, ViewId, WidgetConfig,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Clone, Default)]
struct FakeHost {
    inner: Arc<Mutex<HostInner>>,
}

#[derive(Default)]
struct HostInner {
    active: Option<ViewId>,
    texts: HashMap<ViewId, TextSnapshot>,
}

impl FakeHost {
    fn with_view(view: ViewId, text: &str) -> Self {
        let host = Self::default();
        host.set_text(view, TextSnapshot::document(text));
        host.set_active(Some(view));
        host
    }

    fn set_active(&self, view: Option<ViewId>) {
        self.inner.lock().unwrap().active = view;
    }

    fn set_text(&self, view: ViewId, snapshot: TextSnapshot) {
        self.inner.lock().unwrap().texts.insert(view, snapshot);
    }

    fn remove(&self, view: ViewId) {
        self.inner.lock().unwrap().texts.remove(&view);
    }
}

impl EditorHost for FakeHost {
    fn active_view(&self) -> Option<ViewId> {
        self.inner.lock().unwrap().active
    }

    fn current_text(&self, view: ViewId) -> Result<TextSnapshot, HostError> {
        self.inner
            .lock()
            .unwrap()
            .texts
            .get(&view)
            .cloned()
            .ok_or(HostError::ViewDisposed(view))
    }
}

#[derive(Clone, Default)]
struct RecordingDisplay {
    published: Arc<Mutex<Vec<(Option<ViewId>, StatusViewModel)>>>,
}

impl RecordingDisplay {
    fn texts(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, model)| model.text.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    fn last(&self) -> Option<(Option<ViewId>, StatusViewModel)> {
        self.published.lock().unwrap().last().cloned()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn publish(&self, view: Option<ViewId>, model: &StatusViewModel) {
        self.published.lock().unwrap().push((view, model.clone()));
    }
}

#[derive(Default)]
struct CountingScheduler {
    pumps: AtomicUsize,
}

impl UiScheduler for CountingScheduler {
    fn schedule_pump(&self) {
        self.pumps.fetch_add(1, Ordering::SeqCst);
    }
}

struct FlagSubscription(Arc<AtomicUsize>);

impl Subscription for FlagSubscription {
    fn unsubscribe(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn heuristic_config(fast_path_max_chars: usize, debounce_ms: u64) -> WidgetConfig {
    WidgetConfig {
        fast_path_max_chars,
        debounce_ms,
        exact_tokenizer: false,
        ..WidgetConfig::default()
    }
}

fn controller(config: &WidgetConfig, host: &FakeHost, display: &RecordingDisplay) -> Controller {
    Controller::new(
        config,
        Box::new(host.clone()),
        Box::new(display.clone()),
        None,
    )
    .expect("controller")
}

/// Pumps until the display shows a settled count or the deadline passes.
fn pump_until_settled(controller: &mut Controller, display: &RecordingDisplay) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        controller.pump();
        if let Some((_, model)) = display.last() {
            if model.text != "Calculating…" {
                return;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("count never settled: {:?}", display.texts());
}

#[test]
fn initial_view_is_counted_on_start() {
    init_logging();
    let host = FakeHost::with_view(1, "the cat");
    let display = RecordingDisplay::default();
    let controller = controller(&heuristic_config(3000, 300), &host, &display);

    assert_eq!(controller.tracked_view(), Some(1));
    assert_eq!(
        display.last(),
        Some((
            Some(1),
            StatusViewModel {
                text: "2 tokens".to_string(),
                tooltip: "2 tokens".to_string(),
            }
        ))
    );
}

#[test]
fn text_below_threshold_never_shows_calculating() {
    init_logging();
    let host = FakeHost::with_view(1, "hello world");
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(3000, 300), &host, &display);

    host.set_text(1, TextSnapshot::document("x".repeat(2999)));
    controller.on_document_changed(1);

    let texts = display.texts();
    assert!(texts.iter().all(|text| text != "Calculating…"), "{texts:?}");
    assert_eq!(texts.last().map(String::as_str), Some("750 tokens"));
}

#[test]
fn text_at_threshold_shows_calculating_first() {
    init_logging();
    let host = FakeHost::default();
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(3000, 20), &host, &display);
    assert!(display.texts().is_empty());

    host.set_text(1, TextSnapshot::document("x".repeat(3000)));
    host.set_active(Some(1));
    controller.refresh_active_view();
    assert_eq!(display.texts().last().map(String::as_str), Some("Calculating…"));
    assert_eq!(controller.view_model().tooltip, "Calculating token count…");

    pump_until_settled(&mut controller, &display);
    assert_eq!(display.texts().last().map(String::as_str), Some("751 tokens"));
}

#[test]
fn burst_of_edits_publishes_only_the_last_result() {
    init_logging();
    let host = FakeHost::with_view(1, "go");
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(4, 40), &host, &display);

    for words in 1..=20 {
        host.set_text(1, TextSnapshot::document("word ".repeat(words)));
        controller.on_document_changed(1);
    }
    pump_until_settled(&mut controller, &display);

    // Give any superseded count a chance to arrive late.
    thread::sleep(Duration::from_millis(200));
    controller.pump();

    let settled: Vec<String> = display
        .texts()
        .into_iter()
        .filter(|text| text != "Calculating…")
        .collect();
    assert_eq!(settled, vec!["1 tokens".to_string(), "20 tokens".to_string()]);
}

#[test]
fn selection_is_counted_instead_of_document() {
    init_logging();
    let host = FakeHost::with_view(1, "a much longer document body here");
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(3000, 300), &host, &display);

    host.set_text(1, TextSnapshot::selection("the cat"));
    controller.on_selection_changed(1);

    let (_, model) = display.last().expect("published");
    assert_eq!(model.text, "2 tokens");
    assert_eq!(model.tooltip, "selection: 2 tokens");
}

#[test]
fn events_for_inactive_views_are_ignored() {
    init_logging();
    let host = FakeHost::with_view(1, "hello");
    host.set_text(2, TextSnapshot::document("other editor text"));
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(3000, 300), &host, &display);
    let before = display.len();

    controller.on_caret_moved(2);
    controller.on_selection_changed(2);
    controller.on_document_changed(2);

    assert_eq!(display.len(), before);
}

#[test]
fn switching_and_closing_editors() {
    init_logging();
    let host = FakeHost::with_view(1, "one two three");
    host.set_text(2, TextSnapshot::document("the"));
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(3000, 300), &host, &display);
    assert_eq!(display.texts().last().map(String::as_str), Some("4 tokens"));

    host.set_active(Some(2));
    controller.on_file_opened();
    assert_eq!(controller.tracked_view(), Some(2));
    assert_eq!(display.texts().last().map(String::as_str), Some("1 tokens"));

    // Same view again: nothing to do.
    let before = display.len();
    controller.on_active_view_changed(Some(2));
    assert_eq!(display.len(), before);

    host.set_active(None);
    controller.on_file_closed();
    assert_eq!(controller.tracked_view(), None);
    assert_eq!(
        display.last(),
        Some((
            None,
            StatusViewModel {
                text: "0 tokens".to_string(),
                tooltip: "0 tokens".to_string(),
            }
        ))
    );
}

#[test]
fn unreadable_view_resets_to_zero() {
    init_logging();
    let host = FakeHost::with_view(1, "one two three");
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(3000, 300), &host, &display);

    host.remove(1);
    controller.on_caret_moved(1);

    assert_eq!(display.texts().last().map(String::as_str), Some("0 tokens"));
}

#[test]
fn dispose_with_pending_count_publishes_nothing_more() {
    init_logging();
    let host = FakeHost::with_view(1, "long enough to be slow");
    let display = RecordingDisplay::default();
    let mut controller = controller(&heuristic_config(4, 30), &host, &display);
    let unsubscribed = Arc::new(AtomicUsize::new(0));
    controller.attach_subscription(Box::new(FlagSubscription(unsubscribed.clone())));
    assert_eq!(display.texts().last().map(String::as_str), Some("Calculating…"));
    let before = display.len();

    controller.dispose();
    thread::sleep(Duration::from_millis(150));
    controller.pump();
    controller.on_document_changed(1);
    controller.dispose();

    assert!(controller.is_disposed());
    assert_eq!(display.len(), before);
    assert_eq!(unsubscribed.load(Ordering::SeqCst), 1);

    let late = Arc::new(AtomicUsize::new(0));
    controller.attach_subscription(Box::new(FlagSubscription(late.clone())));
    assert_eq!(late.load(Ordering::SeqCst), 1);
}

#[test]
fn finished_background_count_requests_a_pump() {
    init_logging();
    let host = FakeHost::with_view(1, "slow text");
    let display = RecordingDisplay::default();
    let scheduler = Arc::new(CountingScheduler::default());
    let mut controller = Controller::new(
        &heuristic_config(2, 10),
        Box::new(host.clone()),
        Box::new(display.clone()),
        Some(scheduler.clone() as Arc<dyn UiScheduler>),
    )
    .expect("controller");

    let deadline = Instant::now() + Duration::from_secs(5);
    while scheduler.pumps.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(scheduler.pumps.load(Ordering::SeqCst), 1);

    controller.pump();
    assert_eq!(display.texts().last().map(String::as_str), Some("2 tokens"));
}

#[test]
fn count_now_shares_the_widget_counter() {
    init_logging();
    let host = FakeHost::with_view(1, "whole file");
    let display = RecordingDisplay::default();
    let controller = controller(&heuristic_config(3000, 300), &host, &display);

    host.set_text(1, TextSnapshot::selection("the cat"));
    let report = tokencount_widget::count_tokens_now(&host, controller.counter()).expect("report");
    assert_eq!(report.message(), "Token in selection: 2");
}
