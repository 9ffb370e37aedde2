// packages/recorder/src/recording/recorder.rs
//! Heap timeseries recorder
//!
//! Accepts allocation and free events from any thread, buffers them and
//! persists them to an append-only file, flushing when the buffer fills,
//! every flush interval, on `on_complete` and once more at shutdown.

use crate::recording::flush::{FlushCause, FlushEngine, RecorderStats};
use crate::recording::flusher::PeriodicFlusher;
use crate::recording::observer::HeapObserver;
use crate::recording::record::{AllocCallbackInfo, EventRecord, FreeCallbackInfo};
use crate::recording::reporter::{Reporter, TracingReporter};
use crate::recording::writer::TimeseriesWriter;
use crate::utils::config::{HeapTrackOptions, RecorderConfig};
use crate::utils::errors::{RecorderError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Heap observer that records every event to a timeseries file
pub struct HeapRecorder {
    options: HeapTrackOptions,
    engine: Arc<FlushEngine>,
    flusher: PeriodicFlusher,
    closed: bool,
}

impl HeapRecorder {
    /// Create a recorder writing to `path`, truncating any existing file
    pub fn create<P: AsRef<Path>>(
        options: HeapTrackOptions,
        path: P,
        config: RecorderConfig,
    ) -> Result<Self> {
        Self::create_with_reporter(options, path, config, Arc::new(TracingReporter))
    }

    /// Create a recorder that sends flush failures and the shutdown notice to `reporter`
    pub fn create_with_reporter<P: AsRef<Path>>(
        options: HeapTrackOptions,
        path: P,
        config: RecorderConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        config.validate()?;

        let writer = TimeseriesWriter::create(path)?;
        let engine = Arc::new(FlushEngine::new(writer, config.buffer_capacity, reporter));

        let mut flusher = PeriodicFlusher::new(config.flush_interval());
        flusher.start(Arc::clone(&engine))?;

        info!(
            "Recording heap timeseries to {:?} (capacity {}, flush interval {:?})",
            engine.path(),
            config.buffer_capacity,
            config.flush_interval()
        );

        Ok(Self {
            options,
            engine,
            flusher,
            closed: false,
        })
    }

    /// Flush buffered records now, returning how many were written
    pub fn flush(&self) -> Result<usize> {
        self.engine.flush(FlushCause::Explicit)
    }

    /// Records currently buffered
    pub fn buffered(&self) -> usize {
        self.engine.buffered()
    }

    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    pub fn path(&self) -> &Path {
        self.engine.path()
    }

    pub fn stats(&self) -> RecorderStats {
        self.engine.stats()
    }

    /// Stop the flush thread, flush what is left and close the file
    ///
    /// Dropping the recorder does the same; `close` also returns the first
    /// error encountered.
    pub fn close(mut self) -> Result<RecorderStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<RecorderStats> {
        if self.closed {
            return Ok(self.engine.stats());
        }
        self.closed = true;

        // The thread must be joined before the final flush so no periodic
        // flush can run after it.
        let stopped = self.flusher.stop();

        let flushed = self.engine.flush(FlushCause::Shutdown);
        if let Err(e) = &flushed {
            self.engine
                .reporter()
                .flush_failed(self.engine.path(), FlushCause::Shutdown, e);
        }

        let closed = self.engine.close();
        let stats = self.engine.stats();
        if closed.is_ok() {
            self.engine.reporter().saved(self.engine.path(), &stats);
        }

        stopped?;
        flushed?;
        closed?;
        Ok(stats)
    }
}

impl HeapObserver for HeapRecorder {
    fn heap_track_options(&self) -> HeapTrackOptions {
        self.options.clone()
    }

    fn on_alloc(&self, info: &AllocCallbackInfo) {
        self.engine.record(EventRecord::from(info));
    }

    fn on_free(&self, info: &FreeCallbackInfo) {
        self.engine.record(EventRecord::from(info));
    }

    fn on_complete(&self) {
        self.engine.flush_and_report(FlushCause::Explicit);
    }

    fn dump(&self) {}

    fn reset(&self) -> Result<()> {
        Err(RecorderError::Unsupported("reset"))
    }
}

impl Drop for HeapRecorder {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.shutdown() {
            warn!("Heap recorder shutdown for {:?} failed: {}", self.engine.path(), e);
        }
    }
}
