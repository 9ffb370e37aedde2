// packages/recorder/src/recording/observer.rs
//! Interface between the instrumentation layer and a heap observer

use crate::recording::record::{AllocCallbackInfo, FreeCallbackInfo};
use crate::utils::config::HeapTrackOptions;
use crate::utils::errors::Result;

/// Receives allocation lifecycle events from the instrumentation layer
///
/// Event methods may be called from any thread, concurrently.
pub trait HeapObserver: Send + Sync {
    /// Options the observer was created with
    fn heap_track_options(&self) -> HeapTrackOptions;

    fn on_alloc(&self, info: &AllocCallbackInfo);

    fn on_free(&self, info: &FreeCallbackInfo);

    /// The instrumentation layer has no more events for now
    fn on_complete(&self);

    /// Emit a summary, if the observer keeps one
    fn dump(&self);

    /// Discard recorded history
    fn reset(&self) -> Result<()>;
}
