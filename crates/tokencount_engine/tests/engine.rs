use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokencount_engine::{
    CountFailure, CountJob, CountTicket, EngineEvent, EngineHandle, EventNotifier,
    HeuristicTokenCounter, TokenCounter,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

const WAIT: Duration = Duration::from_secs(5);

fn job(generation: u64, text: &str, debounce_ms: u64) -> CountJob {
    CountJob {
        view: 1,
        generation,
        text: text.to_string(),
        debounce: Duration::from_millis(debounce_ms),
    }
}

#[derive(Default)]
struct CountingNotifier {
    calls: AtomicUsize,
}

impl EventNotifier for CountingNotifier {
    fn notify(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct PanickingCounter;

impl TokenCounter for PanickingCounter {
    fn count(&self, _text: &str) -> u32 {
        panic!("broken vocabulary");
    }
}

/// Signals when counting starts, then blocks until released.
struct GatedCounter {
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl TokenCounter for GatedCounter {
    fn count(&self, text: &str) -> u32 {
        let _ = self.started.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv_timeout(WAIT);
        HeuristicTokenCounter.count(text)
    }
}

#[test]
fn scheduled_count_reports_after_debounce() {
    init_logging();
    let notifier = Arc::new(CountingNotifier::default());
    let engine = EngineHandle::new(
        Arc::new(HeuristicTokenCounter),
        Some(notifier.clone() as Arc<dyn EventNotifier>),
    )
    .expect("engine");

    let ticket = engine.schedule(job(1, "the cat", 20));
    assert_eq!(ticket.generation(), 1);
    assert!(engine.try_recv().is_none());

    let event = engine.recv_timeout(WAIT).expect("count event");
    assert_eq!(
        event,
        EngineEvent::CountCompleted {
            view: 1,
            generation: 1,
            result: Ok(2),
        }
    );
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cancelled_during_debounce_never_reports() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(HeuristicTokenCounter), None).expect("engine");

    let first = engine.schedule(job(1, "first burst", 200));
    first.cancel();
    assert!(first.is_cancelled());
    let _second = engine.schedule(job(2, "second burst text", 10));

    let event = engine.recv_timeout(WAIT).expect("count event");
    assert!(matches!(
        event,
        EngineEvent::CountCompleted { generation: 2, .. }
    ));
    assert!(engine.recv_timeout(Duration::from_millis(400)).is_none());
}

#[test]
fn only_last_of_a_burst_reports() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(HeuristicTokenCounter), None).expect("engine");

    let mut tickets: Vec<CountTicket> = Vec::new();
    for generation in 1..=10u64 {
        if let Some(previous) = tickets.last() {
            previous.cancel();
        }
        let text = "word ".repeat(generation as usize);
        tickets.push(engine.schedule(job(generation, &text, 30)));
    }

    let event = engine.recv_timeout(WAIT).expect("count event");
    assert_eq!(
        event,
        EngineEvent::CountCompleted {
            view: 1,
            generation: 10,
            result: Ok(10),
        }
    );
    assert!(engine.recv_timeout(Duration::from_millis(200)).is_none());
}

#[test]
fn panicking_counter_reports_failure() {
    init_logging();
    let engine = EngineHandle::new(Arc::new(PanickingCounter), None).expect("engine");
    let _ticket = engine.schedule(job(3, "anything", 0));

    match engine.recv_timeout(WAIT).expect("count event") {
        EngineEvent::CountCompleted {
            generation, result, ..
        } => {
            assert_eq!(generation, 3);
            assert_eq!(
                result,
                Err(CountFailure::Panicked("broken vocabulary".to_string()))
            );
        }
    }
}

#[test]
fn cancelled_while_counting_never_reports() {
    init_logging();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let counter = GatedCounter {
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    };
    let engine = EngineHandle::new(Arc::new(counter), None).expect("engine");

    let ticket = engine.schedule(job(4, "counted too late", 0));
    started_rx.recv_timeout(WAIT).expect("count started");
    ticket.cancel();
    release_tx.send(()).expect("release");

    assert!(engine.recv_timeout(Duration::from_millis(300)).is_none());
}
