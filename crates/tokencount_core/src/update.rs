use crate::{Effect, Generation, Msg, TextSnapshot, ViewId, WidgetState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: WidgetState, msg: Msg) -> (WidgetState, Vec<Effect>) {
    if state.is_disposed() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::ViewActivated { view, snapshot } => {
            if state.tracks(view) {
                return (state, Vec::new());
            }
            let mut effects = cancel_effect(state.track(view));
            effects.extend(recount(&mut state, view, snapshot));
            effects
        }
        Msg::ViewCleared => {
            if state.tracked_view().is_none() {
                return (state, Vec::new());
            }
            let effects = cancel_effect(state.untrack());
            state.mark_dirty();
            effects
        }
        Msg::ViewEvent { view, snapshot, .. } => {
            if !state.tracks(view) {
                return (state, Vec::new());
            }
            recount(&mut state, view, snapshot)
        }
        Msg::CountFinished {
            view,
            generation,
            count,
        } => {
            if state.finish_count(view, generation, count) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CountFailed { view, generation } => {
            if state.fail_count(view, generation) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Dispose => cancel_effect(state.dispose()),
    };

    (state, effects)
}

fn recount(state: &mut WidgetState, view: ViewId, snapshot: Option<TextSnapshot>) -> Vec<Effect> {
    let Some(snapshot) = snapshot else {
        // Text could not be read: show an idle zero rather than a stale count.
        let effects = cancel_effect(state.reset_view());
        state.mark_dirty();
        return effects;
    };

    let mut effects = cancel_effect(state.cancel_pending());
    let policy = state.policy();
    let debounced = snapshot.char_len() >= policy.fast_path_max_chars;
    let generation = state.begin_count(snapshot.is_selection, debounced);
    if debounced {
        state.mark_dirty();
        effects.push(Effect::ScheduleCount {
            view,
            generation,
            text: snapshot.text,
            debounce: policy.debounce,
        });
    } else {
        effects.push(Effect::CountNow {
            view,
            generation,
            text: snapshot.text,
        });
    }
    effects
}

fn cancel_effect(cancelled: Option<Generation>) -> Vec<Effect> {
    cancelled
        .map(|generation| vec![Effect::CancelCount { generation }])
        .unwrap_or_default()
}
