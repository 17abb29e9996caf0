use crate::ViewState;

pub const CALCULATING_TEXT: &str = "Calculating…";
pub const CALCULATING_TOOLTIP: &str = "Calculating token count…";

/// What the status bar shows for the tracked view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusViewModel {
    pub text: String,
    pub tooltip: String,
}

impl StatusViewModel {
    pub(crate) fn from_view_state(view: &ViewState) -> Self {
        if view.calculation_in_progress() {
            return Self {
                text: CALCULATING_TEXT.to_string(),
                tooltip: CALCULATING_TOOLTIP.to_string(),
            };
        }
        let count = view.last_count();
        let tooltip = if view.selection_active() {
            format!("selection: {count} tokens")
        } else {
            format!("{count} tokens")
        };
        Self {
            text: format!("{count} tokens"),
            tooltip,
        }
    }
}
