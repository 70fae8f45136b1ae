//! Build-once holder for the dictionary-backed tokenizer.
//!
//! A full dictionary build is far too expensive to repeat per query, so the
//! tokenizer is built lazily by the first normalization that needs it and
//! shared read-only afterwards. Concurrent first callers wait on the same
//! build. A failed build is remembered and handed to every later caller;
//! there is no retry.

use once_cell::sync::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{CloseWordsError, Result};
use crate::tokenizer::Tokenizer;

/// Knows how to construct a tokenizer from its dictionary resource.
pub trait DictionaryBuilder: Send + Sync {
    type Tokenizer: Tokenizer + 'static;

    /// Human-readable location of the dictionary resource (for errors and logs).
    fn source(&self) -> String;

    /// Build the tokenizer. Called at most once per `DictionaryCache`.
    fn build(&self) -> anyhow::Result<Self::Tokenizer>;
}

pub struct DictionaryCache<B: DictionaryBuilder> {
    builder: B,
    cell: OnceCell<Result<Arc<B::Tokenizer>>>,
    attempted: AtomicBool,
}

impl<B: DictionaryBuilder> DictionaryCache<B> {
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            cell: OnceCell::new(),
            attempted: AtomicBool::new(false),
        }
    }

    /// Return the tokenizer, building it on first use.
    pub fn tokenizer(&self) -> Result<Arc<B::Tokenizer>> {
        self.cell.get_or_init(|| self.build_once()).clone()
    }

    /// True once a build has succeeded.
    pub fn is_built(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// True once a build has started, whatever its outcome.
    pub fn build_attempted(&self) -> bool {
        self.attempted.load(Ordering::Acquire)
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    fn build_once(&self) -> Result<Arc<B::Tokenizer>> {
        self.attempted.store(true, Ordering::Release);
        let source = self.builder.source();
        let started = Instant::now();
        tracing::info!(source = %source, "building dictionary");

        // A panicking builder must not leave the cell empty, or the next
        // caller would silently retry.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.builder.build()));
        let built = match outcome {
            Ok(Ok(tokenizer)) => Ok(Arc::new(tokenizer)),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(payload) => Err(format!("builder panicked: {}", panic_message(&payload))),
        };

        match built {
            Ok(tokenizer) => {
                tracing::info!(
                    source = %source,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "dictionary ready"
                );
                Ok(tokenizer)
            }
            Err(reason) => {
                tracing::error!(source = %source, %reason, "dictionary build failed");
                Err(CloseWordsError::DictionaryBuild {
                    source_path: source,
                    reason,
                })
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
