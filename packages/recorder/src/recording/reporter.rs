// packages/recorder/src/recording/reporter.rs
//! Reporting hooks for conditions the recorder cannot return to a caller
//!
//! Flush failures on the ingestion path and the background thread, and the
//! final "saved" notice at shutdown, go through a `Reporter` instead of a
//! process-wide output channel.

use crate::recording::flush::{FlushCause, RecorderStats};
use crate::utils::errors::RecorderError;
use std::path::Path;
use tracing::{info, warn};

/// Receives recorder notifications
pub trait Reporter: Send + Sync {
    /// A flush failed; the affected records are lost
    fn flush_failed(&self, path: &Path, cause: FlushCause, error: &RecorderError);

    /// The recorder closed its destination
    fn saved(&self, path: &Path, stats: &RecorderStats);
}

/// Reporter that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn flush_failed(&self, path: &Path, cause: FlushCause, error: &RecorderError) {
        warn!("{} flush of {:?} failed: {}", cause.as_str(), path, error);
    }

    fn saved(&self, path: &Path, stats: &RecorderStats) {
        info!(
            "Observer timeseries saved to file {:?} ({} events, {} bytes)",
            path, stats.events_flushed, stats.bytes_written
        );
    }
}
