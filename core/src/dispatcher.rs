//! Normalization worker pool.
//!
//! Batches are queued on a crossbeam channel shared by a fixed set of named
//! worker threads. Every job carries a oneshot reply sender; the caller awaits
//! exactly one typed reply, so the async caller is suspended (not blocked)
//! while the CPU-bound dictionary build and tokenization run elsewhere.
//!
//! Outcomes seen by the caller:
//! - `Ok(readings)`: one reading per word, index-aligned with the batch
//! - `Err(DictionaryBuild | Tokenization)`: the batch failed as a unit
//! - `Err(WorkerFailure)`: the worker panicked, or went away without replying
//!
//! There is no cancellation and no timeout.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

use crate::cache::{panic_message, DictionaryBuilder};
use crate::candidate::Word;
use crate::error::{CloseWordsError, Result};
use crate::normalizer::{Normalizer, ReadingCache, Romanizer};
use crate::Config;

struct Job {
    id: u64,
    batch: Vec<Word>,
    reply: oneshot::Sender<Result<Vec<String>>>,
}

pub struct Dispatcher {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl Dispatcher {
    /// Start `config.worker_count()` workers sharing `normalizer` (and thus
    /// one dictionary cache).
    pub fn spawn<B, R>(normalizer: Arc<Normalizer<B, R>>, config: &Config) -> Result<Self>
    where
        B: DictionaryBuilder + 'static,
        R: Romanizer + 'static,
    {
        let (tx, rx) = unbounded::<Job>();
        let count = config.worker_count();
        let mut workers = Vec::with_capacity(count);

        for idx in 0..count {
            let rx = rx.clone();
            let normalizer = Arc::clone(&normalizer);
            let cache_size = config.reading_cache_size;
            let handle = thread::Builder::new()
                .name(format!("closewords-worker-{}", idx))
                .spawn(move || run_worker(idx, normalizer, rx, cache_size))
                .map_err(|e| {
                    CloseWordsError::WorkerFailure(format!("failed to spawn worker {}: {}", idx, e))
                })?;
            workers.push(handle);
        }
        tracing::debug!(workers = count, "normalization pool started");

        Ok(Self {
            jobs: Some(tx),
            workers,
            next_id: AtomicU64::new(0),
        })
    }

    /// Normalize `batch` on the pool.
    ///
    /// Either every reading comes back, aligned with `batch`, or the call
    /// fails as a whole.
    pub async fn normalize_batch(&self, batch: Vec<Word>) -> Result<Vec<String>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let expected = batch.len();
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| CloseWordsError::WorkerFailure("dispatcher is shut down".into()))?;

        let (reply, response) = oneshot::channel();
        jobs.send(Job { id, batch, reply }).map_err(|_| {
            CloseWordsError::WorkerFailure("all normalization workers have exited".into())
        })?;
        tracing::trace!(job = id, words = expected, "batch queued");

        let readings = response.await.map_err(|_| {
            CloseWordsError::WorkerFailure(format!(
                "worker stopped before answering batch {}",
                id
            ))
        })??;

        if readings.len() != expected {
            return Err(CloseWordsError::WorkerFailure(format!(
                "batch {}: expected {} readings, got {}",
                id,
                expected,
                readings.len()
            )));
        }
        Ok(readings)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue and wait for the workers to drain it.
    pub fn shutdown(&mut self) {
        self.jobs.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("normalization worker terminated by panic");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<B, R>(idx: usize, normalizer: Arc<Normalizer<B, R>>, jobs: Receiver<Job>, cache_size: usize)
where
    B: DictionaryBuilder,
    R: Romanizer,
{
    let mut cache = ReadingCache::new(cache_size);

    while let Ok(job) = jobs.recv() {
        tracing::debug!(worker = idx, job = job.id, words = job.batch.len(), "normalizing batch");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            normalizer.normalize_batch(&job.batch, &mut cache)
        }));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                // the cache may hold a half-written entry
                cache = ReadingCache::new(cache_size);
                Err(CloseWordsError::WorkerFailure(format!(
                    "worker {} panicked: {}",
                    idx,
                    panic_message(&payload)
                )))
            }
        };

        if let Err(e) = &result {
            tracing::warn!(worker = idx, job = job.id, error = %e, "batch failed");
        }
        if job.reply.send(result).is_err() {
            tracing::debug!(worker = idx, job = job.id, "caller went away before the reply");
        }
    }

    let (hits, misses) = cache.stats();
    tracing::debug!(worker = idx, hits, misses, "normalization worker exiting");
}
