// packages/recorder/src/recording/writer.rs
//! Timeseries file writer
//!
//! Records are encoded one JSON object per line into a reusable staging
//! buffer; `flush` hands the staged bytes to the OS in a single write.
//! No fsync is performed.
//!
//! A failed write may leave a partial line behind. The next batch then
//! starts with a line break so the damage stays within the failed batch.

use crate::recording::buffer::RecordSink;
use crate::recording::record::EventRecord;
use crate::utils::errors::{RecorderError, Result};
use bytes::{BufMut, BytesMut};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

const STAGING_CAPACITY: usize = 64 * 1024;

/// Append-only writer for a timeseries file
pub struct TimeseriesWriter {
    path: PathBuf,
    output: Box<dyn Write + Send>,
    staging: BytesMut,
    /// The last write failed, possibly mid-line
    torn: bool,
    records_written: u64,
    bytes_written: u64,
}

impl TimeseriesWriter {
    /// Create the file at `path`, truncating any existing content
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| RecorderError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        debug!("Opened timeseries file {:?}", path);

        Ok(Self::from_writer(path, file))
    }

    /// Write to an already open destination; `path` only labels errors and logs
    pub fn from_writer<P, W>(path: P, output: W) -> Self
    where
        P: Into<PathBuf>,
        W: Write + Send + 'static,
    {
        Self {
            path: path.into(),
            output: Box::new(output),
            staging: BytesMut::with_capacity(STAGING_CAPACITY),
            torn: false,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Encode a record into the staging buffer
    pub fn write_record(&mut self, record: &EventRecord) -> Result<()> {
        let mark = self.staging.len();

        if let Err(e) = serde_json::to_writer((&mut self.staging).writer(), record) {
            self.staging.truncate(mark);
            return Err(e.into());
        }
        self.staging.put_u8(b'\n');
        self.records_written += 1;

        Ok(())
    }

    /// Hand staged bytes to the OS
    ///
    /// Staged bytes are dropped on failure; nothing is retried.
    pub fn flush(&mut self) -> Result<()> {
        let mut staged = self.staging.len();
        let mut result = Ok(());

        if self.torn && staged > 0 {
            result = self.output.write_all(b"\n");
            staged += 1;
        }
        let result = result
            .and_then(|()| self.output.write_all(&self.staging))
            .and_then(|()| self.output.flush());
        self.staging.clear();

        if let Err(source) = result {
            self.torn = true;
            return Err(self.write_failed(source));
        }

        if staged > 0 {
            self.torn = false;
            self.bytes_written += staged as u64;
            trace!("Wrote {} bytes to {:?}", staged, self.path);
        }

        Ok(())
    }

    /// Flush remaining bytes and close the file
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        if self.torn {
            warn!("Timeseries file {:?} ends with a partial record", self.path);
        }
        debug!(
            "Closed timeseries file {:?} ({} records, {} bytes)",
            self.path, self.records_written, self.bytes_written
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records encoded so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes handed to the OS so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bytes staged but not yet flushed
    pub fn pending_bytes(&self) -> usize {
        self.staging.len()
    }

    fn write_failed(&self, source: std::io::Error) -> RecorderError {
        RecorderError::WriteFailed {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordSink for TimeseriesWriter {
    fn write_record(&mut self, record: &EventRecord) -> Result<()> {
        TimeseriesWriter::write_record(self, record)
    }
}
