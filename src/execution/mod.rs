//! Parallel load-time annotation.
//!
//! Model inference is the only slow step of building a table and runs once per record, before
//! the table is published. [`ExecutionEngine`] spreads it over a dedicated rayon pool in
//! fixed-size chunks, caps how many chunks are inside the model at once, and hands results
//! back in input order. Progress goes to an optional [`ExecutionObserver`] and to
//! [`ExecutionMetrics`].

mod gate;
mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;

use crate::error::FeedResult;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingExecutionObserver,
};

use gate::ChunkGate;

/// `[execution]` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Worker threads; `None` uses the available parallelism.
    pub num_threads: Option<usize>,
    /// Records per chunk.
    pub chunk_size: usize,
    /// Chunks allowed inside the model at once, independent of the thread count. Useful when
    /// the model backend has its own concurrency limit.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_parallelism();
        Self {
            num_threads: Some(n),
            chunk_size: 64,
            max_in_flight_chunks: n,
        }
    }
}

pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("opts", &self.opts)
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl ExecutionEngine {
    /// Build the worker pool. Zero-valued options are raised to 1.
    pub fn new(opts: ExecutionOptions) -> FeedResult<Self> {
        let threads = opts.num_threads.unwrap_or_else(available_parallelism).max(1);
        let opts = ExecutionOptions {
            num_threads: Some(threads),
            chunk_size: opts.chunk_size.max(1),
            max_in_flight_chunks: opts.max_in_flight_chunks.max(1),
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("newsfeed-annotate-{i}"))
            .build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::default(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Options in effect after zero values were raised.
    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// `items.iter().map(f).collect()`, computed on the pool.
    pub fn map_ordered<T, U, F>(&self, items: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        let started = Instant::now();
        let chunk_size = self.opts.chunk_size;
        let gate = ChunkGate::new(self.opts.max_in_flight_chunks);

        self.metrics.batch_started();
        self.emit(ExecutionEvent::BatchStarted {
            records: items.len(),
            chunks: items.len().div_ceil(chunk_size),
        });

        let per_chunk: Vec<Vec<U>> = self.pool.install(|| {
            items
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(index, chunk)| {
                    let (_permit, waited) = gate.enter();
                    if let Some(waited) = waited {
                        self.metrics.throttled(waited);
                        self.emit(ExecutionEvent::Throttled { waited });
                    }

                    self.metrics.chunk_entered();
                    let chunk_started = Instant::now();
                    let out: Vec<U> = chunk.iter().map(&f).collect();
                    self.metrics.chunk_left(out.len());
                    self.emit(ExecutionEvent::ChunkDone {
                        first_record: index * chunk_size,
                        records: out.len(),
                        took: chunk_started.elapsed(),
                    });
                    out
                })
                .collect()
        });

        self.metrics.batch_finished(started.elapsed());
        self.emit(ExecutionEvent::BatchFinished {
            metrics: self.metrics.snapshot(),
        });

        per_chunk.into_iter().flatten().collect()
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
