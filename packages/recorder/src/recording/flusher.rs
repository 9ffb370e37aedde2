// packages/recorder/src/recording/flusher.rs
//! Periodic flush thread
//!
//! Wakes every `interval` and flushes the engine, bounding how stale the
//! file can get when events arrive too slowly to trip the threshold.
//!
//! ```text
//! NotStarted --start()--> Running --stop()--> Stopped
//! ```
//!
//! Stopping sets a one-way flag and disconnects the wake channel, so the
//! thread leaves its sleep early and exits without flushing. The final
//! flush belongs to whoever stopped it.

use crate::recording::flush::{FlushCause, FlushEngine};
use crate::utils::errors::{RecorderError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

const THREAD_NAME: &str = "heaptrack-flush";

/// Lifecycle of the flush thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlusherState {
    NotStarted,
    Running,
    Stopped,
}

/// Owner of the background flush thread
pub struct PeriodicFlusher {
    interval: Duration,
    state: FlusherState,
    stop: Arc<AtomicBool>,
    wake: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicFlusher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: FlusherState::NotStarted,
            stop: Arc::new(AtomicBool::new(false)),
            wake: None,
            handle: None,
        }
    }

    pub fn state(&self) -> FlusherState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the thread; may only be called once
    pub fn start(&mut self, engine: Arc<FlushEngine>) -> Result<()> {
        if self.state != FlusherState::NotStarted {
            return Err(RecorderError::Lifecycle("flush thread started twice"));
        }

        let (wake_tx, wake_rx) = crossbeam_channel::bounded(0);
        let stop = Arc::clone(&self.stop);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(engine, stop, wake_rx, interval))
            .map_err(RecorderError::SpawnFailed)?;

        debug!("Started periodic flush thread (interval {:?})", interval);

        self.wake = Some(wake_tx);
        self.handle = Some(handle);
        self.state = FlusherState::Running;
        Ok(())
    }

    /// Signal the thread and join it; may only be called once, after `start`
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            FlusherState::NotStarted => {
                return Err(RecorderError::Lifecycle("flush thread stopped before start"))
            }
            FlusherState::Stopped => {
                return Err(RecorderError::Lifecycle("flush thread stopped twice"))
            }
            FlusherState::Running => {}
        }

        self.stop.store(true, Ordering::Release);
        // Disconnecting the channel wakes the thread from its sleep.
        drop(self.wake.take());
        self.state = FlusherState::Stopped;

        let joined = match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| RecorderError::FlusherPanicked),
            None => Ok(()),
        };

        debug!("Stopped periodic flush thread");
        joined
    }
}

impl Drop for PeriodicFlusher {
    fn drop(&mut self) {
        if self.state == FlusherState::Running {
            let _ = self.stop();
        }
    }
}

fn run(engine: Arc<FlushEngine>, stop: Arc<AtomicBool>, wake: Receiver<()>, interval: Duration) {
    loop {
        // Returns on timeout, or immediately once the sender is dropped.
        let _ = wake.recv_timeout(interval);

        if stop.load(Ordering::Acquire) {
            break;
        }

        trace!("Periodic flush");
        engine.flush_and_report(FlushCause::Periodic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::reader::TimeseriesReader;
    use crate::recording::record::{AllocCallbackInfo, EventRecord};
    use crate::recording::reporter::TracingReporter;
    use crate::recording::writer::TimeseriesWriter;
    use std::time::Instant;
    use tempfile::NamedTempFile;

    fn engine(file: &NamedTempFile) -> Arc<FlushEngine> {
        let writer = TimeseriesWriter::create(file.path()).unwrap();
        Arc::new(FlushEngine::new(writer, 1024, Arc::new(TracingReporter)))
    }

    #[test]
    fn test_state_machine() {
        let file = NamedTempFile::new().unwrap();
        let mut flusher = PeriodicFlusher::new(Duration::from_secs(60));
        assert_eq!(flusher.state(), FlusherState::NotStarted);

        flusher.start(engine(&file)).unwrap();
        assert_eq!(flusher.state(), FlusherState::Running);

        flusher.stop().unwrap();
        assert_eq!(flusher.state(), FlusherState::Stopped);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let engine = engine(&file);
        let mut flusher = PeriodicFlusher::new(Duration::from_secs(60));

        flusher.start(Arc::clone(&engine)).unwrap();
        assert!(matches!(
            flusher.start(engine),
            Err(RecorderError::Lifecycle(_))
        ));
        flusher.stop().unwrap();
    }

    #[test]
    fn test_stop_before_start_is_rejected() {
        let mut flusher = PeriodicFlusher::new(Duration::from_secs(60));
        assert!(matches!(flusher.stop(), Err(RecorderError::Lifecycle(_))));
        assert_eq!(flusher.state(), FlusherState::NotStarted);
    }

    #[test]
    fn test_restart_after_stop_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let engine = engine(&file);
        let mut flusher = PeriodicFlusher::new(Duration::from_secs(60));

        flusher.start(Arc::clone(&engine)).unwrap();
        flusher.stop().unwrap();

        assert!(matches!(flusher.stop(), Err(RecorderError::Lifecycle(_))));
        assert!(matches!(
            flusher.start(engine),
            Err(RecorderError::Lifecycle(_))
        ));
    }

    #[test]
    fn test_stop_does_not_wait_for_interval() {
        let file = NamedTempFile::new().unwrap();
        let mut flusher = PeriodicFlusher::new(Duration::from_secs(3600));
        flusher.start(engine(&file)).unwrap();

        let started = Instant::now();
        flusher.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_periodic_flush_without_threshold() {
        let file = NamedTempFile::new().unwrap();
        let engine = engine(&file);
        let mut flusher = PeriodicFlusher::new(Duration::from_millis(20));
        flusher.start(Arc::clone(&engine)).unwrap();

        engine.record(EventRecord::from(&AllocCallbackInfo::new(1, 8)));

        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.buffered() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        flusher.stop().unwrap();

        assert_eq!(engine.buffered(), 0);
        assert_eq!(TimeseriesReader::read_all(file.path()).unwrap().len(), 1);
        assert!(engine.stats().periodic_flushes >= 1);
    }

    #[test]
    fn test_no_flush_after_stop() {
        let file = NamedTempFile::new().unwrap();
        let engine = engine(&file);
        let mut flusher = PeriodicFlusher::new(Duration::from_secs(3600));
        flusher.start(Arc::clone(&engine)).unwrap();

        engine.record(EventRecord::from(&AllocCallbackInfo::new(1, 8)));
        flusher.stop().unwrap();

        // The stopping thread exits without draining the buffer.
        assert_eq!(engine.buffered(), 1);
        assert_eq!(engine.stats().periodic_flushes, 0);
    }
}
