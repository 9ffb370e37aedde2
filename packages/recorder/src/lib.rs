// packages/recorder/src/lib.rs
//! Heap Timeseries Recorder Library
//!
//! Records the allocation lifecycle events reported by a memory
//! instrumentation layer into an append-only timeseries file, with bounded
//! memory use and without losing events at shutdown.
//!
//! # Modules
//!
//! - **recording**: event records, buffering, flushing and the recorder
//! - **utils**: configuration and error types
//!
//! # Example
//!
//! ```no_run
//! use heaptrack_recorder::{
//!     AllocCallbackInfo, HeapObserver, HeapRecorder, HeapTrackOptions, RecorderConfig,
//! };
//!
//! # fn main() -> heaptrack_recorder::Result<()> {
//! let recorder = HeapRecorder::create(
//!     HeapTrackOptions::default(),
//!     "heap.ts",
//!     RecorderConfig::default(),
//! )?;
//! recorder.on_alloc(&AllocCallbackInfo::new(0x1000, 64));
//! recorder.close()?;
//! # Ok(())
//! # }
//! ```

pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use recording::{
    AllocCallbackInfo, EventKind, EventRecord, FreeCallbackInfo, HeapObserver, HeapRecorder,
    RecorderStats, Reporter, TimeseriesReader, TracingReporter,
};
pub use utils::config::{HeapTrackOptions, RecorderConfig};
pub use utils::errors::{RecorderError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
