// packages/recorder/src/recording/flush.rs
//! Flush engine
//!
//! The single serialization point between the ingestion path, the periodic
//! flush thread and shutdown.
//!
//! Locks are always taken sink first, then buffer. A flush holds the sink
//! lock, swaps the live buffer with an empty staging buffer under a brief
//! buffer lock, and serializes the staged batch with the buffer unlocked.
//! Appends only ever hold the buffer lock, so a plain append never waits on
//! file I/O; only an append that fills the buffer (or finds it full) waits,
//! because it performs the threshold flush itself. Batches reach the file
//! in the order of their swaps since swap and write share one sink hold.

use crate::recording::buffer::BoundedBuffer;
use crate::recording::record::EventRecord;
use crate::recording::reporter::Reporter;
use crate::recording::writer::TimeseriesWriter;
use crate::utils::errors::{RecorderError, Result};
use metrics::counter;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushCause {
    /// The buffer reached capacity
    Threshold,

    /// The background thread woke up
    Periodic,

    /// A caller asked for it (`on_complete`, `flush`)
    Explicit,

    /// Final flush during shutdown
    Shutdown,
}

impl FlushCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushCause::Threshold => "threshold",
            FlushCause::Periodic => "periodic",
            FlushCause::Explicit => "explicit",
            FlushCause::Shutdown => "shutdown",
        }
    }
}

/// Recorder statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub events_recorded: u64,
    pub events_flushed: u64,
    pub flushes: u64,
    pub threshold_flushes: u64,
    pub periodic_flushes: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
}

impl RecorderStats {
    /// Records accepted but not (yet) written
    pub fn events_pending(&self) -> u64 {
        self.events_recorded.saturating_sub(self.events_flushed)
    }
}

#[derive(Debug, Default)]
struct StatsCounters {
    events_recorded: AtomicU64,
    events_flushed: AtomicU64,
    flushes: AtomicU64,
    threshold_flushes: AtomicU64,
    periodic_flushes: AtomicU64,
    bytes_written: AtomicU64,
    write_errors: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> RecorderStats {
        RecorderStats {
            events_recorded: self.events_recorded.load(Ordering::Relaxed),
            events_flushed: self.events_flushed.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            threshold_flushes: self.threshold_flushes.load(Ordering::Relaxed),
            periodic_flushes: self.periodic_flushes.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

struct Sink {
    /// `None` once the destination is closed
    writer: Option<TimeseriesWriter>,

    /// Empty except while a batch is being serialized
    staging: BoundedBuffer,
}

/// Buffer plus destination, shared by every actor that flushes
pub struct FlushEngine {
    path: PathBuf,
    buffer: Mutex<BoundedBuffer>,
    sink: Mutex<Sink>,
    stats: StatsCounters,
    reporter: Arc<dyn Reporter>,
}

impl FlushEngine {
    /// Create an engine buffering up to `capacity` records in front of `writer`
    pub fn new(writer: TimeseriesWriter, capacity: usize, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            path: writer.path().to_path_buf(),
            buffer: Mutex::new(BoundedBuffer::new(capacity)),
            sink: Mutex::new(Sink {
                writer: Some(writer),
                staging: BoundedBuffer::new(capacity),
            }),
            stats: StatsCounters::default(),
            reporter,
        }
    }

    /// Append a record, flushing on this thread if the buffer became full
    ///
    /// Flush failures are reported, never returned.
    pub fn record(&self, record: EventRecord) {
        let mut buffer = self.buffer.lock();
        while buffer.is_full() {
            // The appender that filled it has not swapped yet.
            drop(buffer);
            self.flush_and_report(FlushCause::Threshold);
            buffer = self.buffer.lock();
        }

        buffer.append(record);
        self.stats.events_recorded.fetch_add(1, Ordering::Relaxed);
        let full = buffer.is_full();
        drop(buffer);

        if full {
            trace!("Buffer reached capacity");
            self.flush_and_report(FlushCause::Threshold);
        }
    }

    /// Write all buffered records and flush the stream
    ///
    /// Returns the number of records written. An empty buffer still flushes
    /// the stream.
    pub fn flush(&self, cause: FlushCause) -> Result<usize> {
        let mut sink = self.sink.lock();
        std::mem::swap(&mut *self.buffer.lock(), &mut sink.staging);

        let Sink { writer, staging } = &mut *sink;
        let batch = staging.len();

        let Some(writer) = writer.as_mut() else {
            staging.clear();
            return Err(RecorderError::Closed);
        };

        let drained = staging.drain_and_serialize(&mut *writer);
        let flushed = writer.flush();
        self.stats
            .bytes_written
            .store(writer.bytes_written(), Ordering::Relaxed);
        drop(sink);

        let result = drained.and_then(|written| flushed.map(|()| written));
        self.account(cause, batch, &result);
        result
    }

    /// Like `flush`, routing failures to the reporter
    pub fn flush_and_report(&self, cause: FlushCause) {
        if let Err(e) = self.flush(cause) {
            self.reporter.flush_failed(&self.path, cause, &e);
        }
    }

    fn account(&self, cause: FlushCause, batch: usize, result: &Result<usize>) {
        match result {
            Ok(written) => {
                let written = *written as u64;
                self.stats.flushes.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .events_flushed
                    .fetch_add(written, Ordering::Relaxed);
                match cause {
                    FlushCause::Threshold => {
                        self.stats.threshold_flushes.fetch_add(1, Ordering::Relaxed);
                    }
                    FlushCause::Periodic => {
                        self.stats.periodic_flushes.fetch_add(1, Ordering::Relaxed);
                    }
                    FlushCause::Explicit | FlushCause::Shutdown => {}
                }

                counter!("heaptrack_flushes_total", "cause" => cause.as_str()).increment(1);
                counter!("heaptrack_records_flushed_total", "cause" => cause.as_str())
                    .increment(written);

                if written > 0 {
                    debug!("{} flush wrote {} records", cause.as_str(), written);
                }
            }
            Err(e) => {
                self.stats.write_errors.fetch_add(1, Ordering::Relaxed);
                counter!("heaptrack_flush_errors_total", "cause" => cause.as_str()).increment(1);
                debug!(
                    "{} flush of {} records failed: {}",
                    cause.as_str(),
                    batch,
                    e
                );
            }
        }
    }

    /// Close the destination; later flushes fail with `RecorderError::Closed`
    pub fn close(&self) -> Result<()> {
        let writer = self.sink.lock().writer.take();
        match writer {
            Some(writer) => writer.close(),
            None => Err(RecorderError::Closed),
        }
    }

    /// Current buffer occupancy
    pub fn buffered(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.lock().capacity()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats.snapshot()
    }
}
