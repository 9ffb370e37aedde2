// packages/recorder/src/recording/mod.rs
//! Heap event recording
//!
//! This module turns allocation lifecycle callbacks into a timeseries file:
//!
//! - **Record**: immutable alloc/free events built from callback info
//! - **Buffer**: fixed-capacity, allocation-free staging of records
//! - **Flush**: the single serialization point in front of the file
//! - **Flusher**: background thread flushing on a fixed interval
//! - **Writer**: JSON-lines encoding and flush-to-OS
//! - **Recorder**: the `HeapObserver` composing all of the above
//! - **Reader**: sequential reader for recorded files
//!
//! # Architecture
//!
//! ```text
//! on_alloc / on_free ──→ Bounded Buffer ──(full)──→ Flush Engine ──→ file
//!                               ↑                        ↑
//!                    Periodic Flush Thread ──(interval)──┘
//!                                                        ↑
//!                    drop / close: stop → join → final flush → close
//! ```

pub mod buffer;
pub mod flush;
pub mod flusher;
pub mod observer;
pub mod reader;
pub mod record;
pub mod recorder;
pub mod reporter;
pub mod writer;

// Re-export commonly used types
pub use buffer::{BoundedBuffer, RecordSink};
pub use flush::{FlushCause, FlushEngine, RecorderStats};
pub use flusher::{FlusherState, PeriodicFlusher};
pub use observer::HeapObserver;
pub use reader::TimeseriesReader;
pub use record::{AllocCallbackInfo, EventKind, EventRecord, FreeCallbackInfo};
pub use recorder::HeapRecorder;
pub use reporter::{Reporter, TracingReporter};
pub use writer::TimeseriesWriter;
