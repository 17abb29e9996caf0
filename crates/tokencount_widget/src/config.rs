use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use tokencount_core::CountPolicy;
use tokencount_engine::{Encoding, Estimator, TokenCounter};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Texts with fewer chars than this are counted synchronously.
    pub fast_path_max_chars: usize,
    pub debounce_ms: u64,
    pub encoding: Encoding,
    /// When false the BPE tokenizer is never loaded.
    pub exact_tokenizer: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let policy = CountPolicy::default();
        Self {
            fast_path_max_chars: policy.fast_path_max_chars,
            debounce_ms: policy.debounce.as_millis() as u64,
            encoding: Encoding::default(),
            exact_tokenizer: true,
        }
    }
}

impl WidgetConfig {
    pub fn policy(&self) -> CountPolicy {
        CountPolicy {
            fast_path_max_chars: self.fast_path_max_chars,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn counter(&self) -> Arc<dyn TokenCounter> {
        let estimator = if self.exact_tokenizer {
            Estimator::new(self.encoding)
        } else {
            Estimator::heuristic_only()
        };
        Arc::new(estimator)
    }
}

pub fn parse_config(content: &str) -> Result<WidgetConfig, ConfigError> {
    ron::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
}

/// Loads a RON config file. Missing or broken files fall back to defaults.
pub fn load_config(path: &Path) -> WidgetConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return WidgetConfig::default();
        }
        Err(err) => {
            engine_warn!("Failed to read config from {:?}: {}", path, err);
            return WidgetConfig::default();
        }
    };

    match parse_config(&content) {
        Ok(config) => {
            engine_info!("Loaded widget config from {:?}", path);
            config
        }
        Err(err) => {
            engine_warn!("Failed to parse config from {:?}: {}", path, err);
            WidgetConfig::default()
        }
    }
}
