use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

/// BPE vocabulary used for exact counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// cl100k_base: GPT-4, GPT-3.5-turbo
    #[default]
    Cl100kBase,
    /// o200k_base: GPT-4o
    O200kBase,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Cl100kBase => write!(f, "cl100k_base"),
            Encoding::O200kBase => write!(f, "o200k_base"),
        }
    }
}

// Loaded at most once per process; a failed load stays `None`.
static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn tokenizer(encoding: Encoding) -> Option<&'static CoreBPE> {
    let cell = match encoding {
        Encoding::Cl100kBase => &CL100K,
        Encoding::O200kBase => &O200K,
    };
    cell.get_or_init(|| load(encoding)).as_ref()
}

fn load(encoding: Encoding) -> Option<CoreBPE> {
    let loaded = match encoding {
        Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
        Encoding::O200kBase => tiktoken_rs::o200k_base(),
    };
    match loaded {
        Ok(bpe) => {
            engine_info!("Loaded {} tokenizer", encoding);
            Some(bpe)
        }
        Err(err) => {
            engine_warn!(
                "Tokenizer {} unavailable, using heuristic counts: {}",
                encoding,
                err
            );
            None
        }
    }
}

/// Exact counter over a process-wide, read-only BPE table.
#[derive(Debug, Clone, Copy)]
pub struct BpeTokenCounter {
    encoding: Encoding,
}

impl BpeTokenCounter {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_available(&self) -> bool {
        tokenizer(self.encoding).is_some()
    }

    /// `None` when the table failed to load or encoding panicked.
    pub fn try_count(&self, text: &str) -> Option<u32> {
        let bpe = tokenizer(self.encoding)?;
        guarded_len(self.encoding, || bpe.encode_ordinary(text).len())
    }
}

fn guarded_len(encoding: Encoding, encode: impl FnOnce() -> usize) -> Option<u32> {
    match panic::catch_unwind(AssertUnwindSafe(encode)) {
        Ok(len) => Some(u32::try_from(len).unwrap_or(u32::MAX)),
        Err(_) => {
            engine_warn!("Tokenizer {} panicked, falling back", encoding);
            None
        }
    }
}

impl Default for BpeTokenCounter {
    fn default() -> Self {
        Self::new(Encoding::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_length_is_reported() {
        assert_eq!(guarded_len(Encoding::Cl100kBase, || 12), Some(12));
    }

    #[test]
    fn panicking_encoder_yields_none() {
        let result = guarded_len(Encoding::O200kBase, || panic!("corrupt merge table"));
        assert_eq!(result, None);
    }
}
