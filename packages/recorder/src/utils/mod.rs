// packages/recorder/src/utils/mod.rs
//! Shared configuration and error types

pub mod config;
pub mod errors;

pub use self::config::{HeapTrackOptions, RecorderConfig};
pub use self::errors::{RecorderError, Result};
