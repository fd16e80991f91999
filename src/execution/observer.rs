use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, trace};

/// Progress of one annotation batch, as seen by an [`ExecutionObserver`].
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    BatchStarted { records: usize, chunks: usize },
    /// A chunk was held back by `max_in_flight_chunks`.
    Throttled { waited: Duration },
    ChunkDone {
        first_record: usize,
        records: usize,
        took: Duration,
    },
    BatchFinished { metrics: ExecutionMetricsSnapshot },
}

pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Chunk-level events at `trace`, batch boundaries at `debug`.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::BatchStarted { records, chunks } => {
                debug!(records, chunks, "annotation batch started");
            }
            ExecutionEvent::Throttled { waited } => trace!(?waited, "annotation chunk throttled"),
            ExecutionEvent::ChunkDone {
                first_record,
                records,
                took,
            } => trace!(first_record, records, ?took, "annotation chunk done"),
            ExecutionEvent::BatchFinished { metrics } => debug!(%metrics, "annotation batch finished"),
        }
    }
}

/// Counters for the engine's annotation batches. Readable from any thread while a batch runs.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    batches: AtomicU64,
    records_annotated: AtomicU64,
    chunks_done: AtomicU64,
    throttled_ns: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    last_batch_ns: AtomicU64,
}

impl ExecutionMetrics {
    pub(crate) fn batch_started(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.records_annotated.store(0, Ordering::Relaxed);
        self.chunks_done.store(0, Ordering::Relaxed);
        self.throttled_ns.store(0, Ordering::Relaxed);
        self.peak_in_flight.store(0, Ordering::Relaxed);
        self.last_batch_ns.store(0, Ordering::Relaxed);
    }

    pub(crate) fn chunk_entered(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
    }

    pub(crate) fn chunk_left(&self, records: usize) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.chunks_done.fetch_add(1, Ordering::Relaxed);
        self.records_annotated.fetch_add(records as u64, Ordering::Relaxed);
    }

    pub(crate) fn throttled(&self, waited: Duration) {
        self.throttled_ns.fetch_add(nanos(waited), Ordering::Relaxed);
    }

    pub(crate) fn batch_finished(&self, elapsed: Duration) {
        self.last_batch_ns.store(nanos(elapsed).max(1), Ordering::Relaxed);
    }

    /// Counters of the current (or most recent) batch.
    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let last_batch_ns = self.last_batch_ns.load(Ordering::Relaxed);
        ExecutionMetricsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            records_annotated: self.records_annotated.load(Ordering::Relaxed),
            chunks_done: self.chunks_done.load(Ordering::Relaxed),
            throttled_for: Duration::from_nanos(self.throttled_ns.load(Ordering::Relaxed)),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
            elapsed: (last_batch_ns > 0).then(|| Duration::from_nanos(last_batch_ns)),
        }
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Point-in-time copy of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    /// Batches started since the engine was built.
    pub batches: u64,
    pub records_annotated: u64,
    pub chunks_done: u64,
    /// Total time chunks spent waiting for a free slot.
    pub throttled_for: Duration,
    pub peak_in_flight: usize,
    /// `None` while a batch is still running.
    pub elapsed: Option<Duration>,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch #{}: {} records in {} chunks, peak {} in flight, throttled {:?}",
            self.batches, self.records_annotated, self.chunks_done, self.peak_in_flight, self.throttled_for
        )?;
        if let Some(elapsed) = self.elapsed {
            write!(f, ", took {elapsed:?}")?;
        }
        Ok(())
    }
}
