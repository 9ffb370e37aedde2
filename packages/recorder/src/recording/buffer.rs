// packages/recorder/src/recording/buffer.rs
//! Fixed-capacity event buffer
//!
//! Holds at most `capacity` records between flushes. Storage is allocated
//! once at construction and never grows; appending into a full buffer is a
//! broken contract and panics.

use crate::recording::record::EventRecord;
use crate::utils::errors::Result;

/// Destination for drained records
pub trait RecordSink {
    /// Serialize one record
    fn write_record(&mut self, record: &EventRecord) -> Result<()>;
}

/// Bounded, insertion-ordered record buffer
#[derive(Debug)]
pub struct BoundedBuffer {
    records: Vec<EventRecord>,
    capacity: usize,
}

impl BoundedBuffer {
    /// Create a buffer with exactly `capacity` pre-allocated slots
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be at least 1");

        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record at the end
    ///
    /// # Panics
    ///
    /// Panics when the buffer is already full; the caller must flush as
    /// soon as `is_full` reports true.
    pub fn append(&mut self, record: EventRecord) {
        assert!(
            self.records.len() < self.capacity,
            "append into full buffer (capacity {})",
            self.capacity
        );
        self.records.push(record);
    }

    /// Write every record to `sink` in insertion order and empty the buffer
    ///
    /// The buffer is empty afterwards even when the sink fails; records after
    /// the failing one are discarded. Returns the number of records written.
    pub fn drain_and_serialize<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let mut written = 0;
        let mut outcome = Ok(());

        for record in self.records.drain(..) {
            if outcome.is_err() {
                continue;
            }
            match sink.write_record(&record) {
                Ok(()) => written += 1,
                Err(e) => outcome = Err(e),
            }
        }

        outcome.map(|()| written)
    }

    /// Discard every record without serializing
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Current occupancy
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() == self.capacity
    }

    /// Records currently held, oldest first
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }
}
