use std::fmt;

use engine_logging::engine_warn;
use tokencount_engine::TokenCounter;

use crate::EditorHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountScope {
    Selection,
    File,
}

impl fmt::Display for CountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountScope::Selection => write!(f, "selection"),
            CountScope::File => write!(f, "file"),
        }
    }
}

/// Result of the on-demand "count tokens now" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountNowReport {
    pub scope: CountScope,
    pub tokens: u32,
}

impl CountNowReport {
    pub const TITLE: &'static str = "Token Count AI";

    pub fn message(&self) -> String {
        format!("Token in {}: {}", self.scope, self.tokens)
    }
}

/// Counts the active view's selection or document synchronously.
///
/// Returns `None` when no editor is active or its text cannot be read.
pub fn count_tokens_now(
    host: &dyn EditorHost,
    counter: &dyn TokenCounter,
) -> Option<CountNowReport> {
    let view = host.active_view()?;
    let snapshot = match host.current_text(view) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            engine_warn!("Count tokens now: no text for view {}: {}", view, err);
            return None;
        }
    };
    let scope = if snapshot.is_selection {
        CountScope::Selection
    } else {
        CountScope::File
    };
    Some(CountNowReport {
        scope,
        tokens: counter.count(&snapshot.text),
    })
}
