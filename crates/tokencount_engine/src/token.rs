use crate::{BpeTokenCounter, Encoding, HeuristicTokenCounter};

pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenCountResult {
    pub count: u32,
}

/// Exact BPE count when the tokenizer loads, heuristic count otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Estimator {
    exact: Option<BpeTokenCounter>,
}

impl Estimator {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            exact: Some(BpeTokenCounter::new(encoding)),
        }
    }

    /// Never touches the tokenizer.
    pub fn heuristic_only() -> Self {
        Self { exact: None }
    }

    pub fn estimate(&self, text: &str) -> TokenCountResult {
        estimate_with(text, |text| self.exact.and_then(|bpe| bpe.try_count(text)))
    }
}

/// Blank text is zero; otherwise the exact count, or the heuristic when `exact` gives up.
fn estimate_with(text: &str, exact: impl FnOnce(&str) -> Option<u32>) -> TokenCountResult {
    if text.trim().is_empty() {
        return TokenCountResult::default();
    }
    let count = exact(text).unwrap_or_else(|| HeuristicTokenCounter.count(text));
    TokenCountResult { count }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(Encoding::default())
    }
}

impl TokenCounter for Estimator {
    fn count(&self, text: &str) -> u32 {
        self.estimate(text).count
    }
}

/// Estimate with the default encoding.
pub fn estimate(text: &str) -> TokenCountResult {
    Estimator::default().estimate(text)
}
