use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use tokencount_core::{Effect, Msg};
use tokencount_engine::{
    CountJob, CountTicket, EngineEvent, EngineHandle, EventNotifier, TokenCounter,
};

use crate::{UiScheduler, WidgetError};

struct PumpNotifier {
    scheduler: Arc<dyn UiScheduler>,
}

impl EventNotifier for PumpNotifier {
    fn notify(&self) {
        self.scheduler.schedule_pump();
    }
}

/// Executes core effects: synchronous counts inline, debounced counts on the engine.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    counter: Arc<dyn TokenCounter>,
    pending: Option<CountTicket>,
}

impl EffectRunner {
    pub(crate) fn new(
        counter: Arc<dyn TokenCounter>,
        scheduler: Option<Arc<dyn UiScheduler>>,
    ) -> Result<Self, WidgetError> {
        let notifier = scheduler
            .map(|scheduler| Arc::new(PumpNotifier { scheduler }) as Arc<dyn EventNotifier>);
        let engine = EngineHandle::new(counter.clone(), notifier)?;
        Ok(Self {
            engine,
            counter,
            pending: None,
        })
    }

    /// Runs effects and returns messages that must be applied right away.
    pub(crate) fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::CountNow {
                    view,
                    generation,
                    text,
                } => {
                    let counter = &self.counter;
                    let msg = match panic::catch_unwind(AssertUnwindSafe(|| counter.count(&text)))
                    {
                        Ok(count) => Msg::CountFinished {
                            view,
                            generation,
                            count,
                        },
                        Err(_) => {
                            engine_warn!(
                                "Synchronous count {} for view {} panicked",
                                generation,
                                view
                            );
                            Msg::CountFailed { view, generation }
                        }
                    };
                    follow_ups.push(msg);
                }
                Effect::ScheduleCount {
                    view,
                    generation,
                    text,
                    debounce,
                } => {
                    let ticket = self.engine.schedule(CountJob {
                        view,
                        generation,
                        text,
                        debounce,
                    });
                    if let Some(stale) = self.pending.replace(ticket) {
                        stale.cancel();
                    }
                }
                Effect::CancelCount { generation } => match self.pending.take() {
                    Some(ticket) if ticket.generation() == generation => {
                        engine_debug!("Cancelled count {}", generation);
                        ticket.cancel();
                    }
                    other => self.pending = other,
                },
            }
        }
        follow_ups
    }

    /// Next finished background count, mapped to a core message.
    pub(crate) fn next_message(&mut self) -> Option<Msg> {
        let EngineEvent::CountCompleted {
            view,
            generation,
            result,
        } = self.engine.try_recv()?;
        if self
            .pending
            .as_ref()
            .is_some_and(|ticket| ticket.generation() == generation)
        {
            self.pending = None;
        }
        Some(match result {
            Ok(count) => Msg::CountFinished {
                view,
                generation,
                count,
            },
            Err(_) => Msg::CountFailed { view, generation },
        })
    }

    pub(crate) fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }
}
