// packages/recorder/src/utils/config.rs
//! Recorder configuration
//!
//! `RecorderConfig` holds the knobs of the recorder itself (buffer capacity
//! and periodic flush interval). `HeapTrackOptions` belongs to the
//! instrumentation layer; the recorder stores it and hands it back unchanged.

use crate::utils::errors::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default number of records buffered before a threshold flush
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Default period of the background flush thread (milliseconds)
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 10_000;

/// Recorder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Number of records held in memory before a flush is forced
    pub buffer_capacity: usize,

    /// Flush interval of the background thread (milliseconds)
    pub flush_interval_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
        }
    }
}

impl RecorderConfig {
    /// Load configuration from a TOML, YAML or JSON file
    ///
    /// Keys missing from the file keep their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading recorder configuration from {:?}", path);

        let config: RecorderConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Flush interval as a `Duration`
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(RecorderError::InvalidConfig(
                "buffer_capacity must be at least 1".to_string(),
            ));
        }

        if self.flush_interval_ms == 0 {
            return Err(RecorderError::InvalidConfig(
                "flush_interval_ms must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Options of the instrumentation layer that drives the recorder
///
/// The recorder never interprets these; they are returned verbatim from
/// `HeapObserver::heap_track_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapTrackOptions {
    /// Maximum number of stack frames captured per allocation
    pub stack_depth: u32,

    /// Record one of every `sample_every` allocations (1 = all)
    pub sample_every: u32,
}

impl Default for HeapTrackOptions {
    fn default() -> Self {
        Self {
            stack_depth: 16,
            sample_every: 1,
        }
    }
}
