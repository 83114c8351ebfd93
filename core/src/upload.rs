//! Upload sources and the pre-flight size guard.
//!
//! # Design
//! A [`FileSource`] is a reader plus whatever the source can tell us about its
//! length without reading it: an in-memory buffer knows its length, a file
//! knows it from its metadata, an arbitrary reader knows nothing. The size
//! guard only acts on a known length; unknown lengths are left for the service
//! to judge.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::ClientError;

/// Bytes to upload, with an optional cheaply-known length.
///
/// The reader is owned: the encoder thread may outlive a call that gave up on
/// it at the deadline.
pub struct FileSource {
    reader: Box<dyn Read + Send>,
    len: Option<u64>,
}

impl FileSource {
    /// Wrap a reader whose length is unknown. The size guard skips it.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            len: None,
        }
    }

    /// Wrap a reader whose length the caller already knows.
    pub fn with_len(reader: impl Read + Send + 'static, len: u64) -> Self {
        Self {
            reader: Box::new(reader),
            len: Some(len),
        }
    }

    pub fn from_bytes<B>(bytes: B) -> Self
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let len = bytes.as_ref().len() as u64;
        Self::with_len(Cursor::new(bytes), len)
    }

    /// Wrap an open file, taking its length from metadata when available.
    pub fn from_file(file: File) -> Self {
        let len = file.metadata().ok().map(|meta| meta.len());
        Self {
            reader: Box::new(file),
            len,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ClientError::Validation(format!("open {}: {e}", path.display())))?;
        Ok(Self::from_file(file))
    }

    pub(crate) fn len(&self) -> Option<u64> {
        self.len
    }

    pub(crate) fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource").field("len", &self.len).finish_non_exhaustive()
    }
}

impl From<File> for FileSource {
    fn from(file: File) -> Self {
        Self::from_file(file)
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for FileSource {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for FileSource {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl From<&'static str> for FileSource {
    fn from(text: &'static str) -> Self {
        Self::from_bytes(text.as_bytes())
    }
}

/// Reject a source whose known length exceeds `max_bytes`.
pub fn check_size(source: &FileSource, max_bytes: u64) -> Result<(), ClientError> {
    match source.len() {
        Some(len) if len > max_bytes => Err(ClientError::Validation(format!(
            "file size {len} exceeds the limit of {max_bytes} bytes"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bytes_report_their_length() {
        let source = FileSource::from(vec![0u8; 12]);
        assert_eq!(source.len(), Some(12));
        assert!(check_size(&source, 12).is_ok());
        assert!(matches!(check_size(&source, 11), Err(ClientError::Validation(_))));
    }

    #[test]
    fn file_reports_length_from_metadata() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();
        let source = FileSource::from_file(file);
        assert_eq!(source.len(), Some(10));

        let err = check_size(&source, 9).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid request: file size 10 exceeds the limit of 9 bytes"
        );
    }

    #[test]
    fn sparse_file_checked_without_reading() {
        let file = tempfile::tempfile().unwrap();
        file.set_len(crate::config::DEFAULT_MAX_UPLOAD_SIZE + 1).unwrap();
        let source = FileSource::from(file);
        assert!(matches!(
            check_size(&source, crate::config::DEFAULT_MAX_UPLOAD_SIZE),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn unknown_length_is_not_checked() {
        let source = FileSource::from_reader(std::io::repeat(1).take(1024));
        assert_eq!(source.len(), None);
        assert!(check_size(&source, 1).is_ok());
    }

    #[test]
    fn explicit_length_is_checked() {
        let source = FileSource::with_len(std::io::empty(), 5_000);
        assert!(check_size(&source, 4_999).is_err());
    }

    #[test]
    fn open_missing_path_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::open(dir.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn reader_yields_original_bytes() {
        let mut reader = FileSource::from("payload").into_reader();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "payload");
    }
}
