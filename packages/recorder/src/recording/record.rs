// packages/recorder/src/recording/record.rs
//! Allocation and free events
//!
//! The instrumentation layer hands the recorder an `AllocCallbackInfo` or a
//! `FreeCallbackInfo`; the recorder turns each into an immutable
//! `EventRecord`, which is the unit that gets buffered and serialized.

use serde::{Deserialize, Serialize};

/// Current wall-clock time in nanoseconds since the Unix epoch
pub fn now_ns() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|ns| u64::try_from(ns).ok())
        .unwrap_or_default()
}

/// Information reported by the instrumentation layer for one allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocCallbackInfo {
    /// Address of the allocated block
    pub address: usize,

    /// Requested size in bytes
    pub size: usize,

    /// Opaque identifier of the allocating call site (interned stack)
    pub call_site: Option<u64>,

    /// Timestamp (nanoseconds since epoch)
    pub timestamp_ns: u64,
}

impl AllocCallbackInfo {
    /// Describe an allocation that happened now
    pub fn new(address: usize, size: usize) -> Self {
        Self {
            address,
            size,
            call_site: None,
            timestamp_ns: now_ns(),
        }
    }

    pub fn with_call_site(mut self, call_site: u64) -> Self {
        self.call_site = Some(call_site);
        self
    }

    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }
}

/// Information reported by the instrumentation layer for one free
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeCallbackInfo {
    /// Address of the released block
    pub address: usize,

    /// Size of the released block in bytes
    pub size: usize,

    /// Timestamp (nanoseconds since epoch)
    pub timestamp_ns: u64,
}

impl FreeCallbackInfo {
    /// Describe a free that happened now
    pub fn new(address: usize, size: usize) -> Self {
        Self {
            address,
            size,
            timestamp_ns: now_ns(),
        }
    }

    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }
}

/// Event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Alloc,
    Free,
}

/// One recorded allocation or free
///
/// Encoded as a single JSON object per line, so records never depend on
/// their neighbours in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    kind: EventKind,
    timestamp_ns: u64,
    address: u64,
    size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    call_site: Option<u64>,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn call_site(&self) -> Option<u64> {
        self.call_site
    }

    pub fn is_alloc(&self) -> bool {
        self.kind == EventKind::Alloc
    }
}

impl From<&AllocCallbackInfo> for EventRecord {
    fn from(info: &AllocCallbackInfo) -> Self {
        Self {
            kind: EventKind::Alloc,
            timestamp_ns: info.timestamp_ns,
            address: info.address as u64,
            size: info.size as u64,
            call_site: info.call_site,
        }
    }
}

impl From<&FreeCallbackInfo> for EventRecord {
    fn from(info: &FreeCallbackInfo) -> Self {
        Self {
            kind: EventKind::Free,
            timestamp_ns: info.timestamp_ns,
            address: info.address as u64,
            size: info.size as u64,
            call_site: None,
        }
    }
}
