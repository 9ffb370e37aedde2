// packages/recorder/src/recording/reader.rs
//! Sequential reader for timeseries files written by the recorder

use crate::recording::record::EventRecord;
use crate::utils::errors::{RecorderError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Iterates the records of a timeseries file in file order
pub struct TimeseriesReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
}

impl TimeseriesReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| RecorderError::ReadFailed {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line: 0,
        })
    }

    /// Read every record of the file at `path`
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<EventRecord>> {
        Self::open(path)?.collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for TimeseriesReader {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(RecorderError::ReadFailed {
                        path: self.path.clone(),
                        source,
                    }))
                }
            };
            self.line += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(&line).map_err(|source| RecorderError::Decode {
                    line: self.line,
                    source,
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::record::EventKind;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_records() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            concat!(
                r#"{"kind":"alloc","timestamp_ns":1,"address":4096,"size":64,"call_site":3}"#,
                "\n",
                r#"{"kind":"free","timestamp_ns":2,"address":4096,"size":64}"#,
                "\n",
            ),
        )
        .unwrap();

        let records = TimeseriesReader::read_all(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind(), EventKind::Alloc);
        assert_eq!(records[0].call_site(), Some(3));
        assert_eq!(records[1].kind(), EventKind::Free);
        assert_eq!(records[1].timestamp_ns(), 2);
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "{\"kind\":\"free\",\"timestamp_ns\":2,\"address\":1,\"size\":8}\n{\"kind\":\"fr\n",
        )
        .unwrap();

        let mut reader = TimeseriesReader::open(file.path()).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next(),
            Some(Err(RecorderError::Decode { line: 2, .. }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TimeseriesReader::open(dir.path().join("absent.ts")),
            Err(RecorderError::ReadFailed { .. })
        ));
    }
}
