//! Streaming `multipart/form-data` encoding for a single file field.
//!
//! # Design
//! The encoded body is never assembled in memory. [`MultipartForm::encode`]
//! runs on a producer thread and writes the part header, the source bytes and
//! the closing boundary into a [`PipeWriter`]; the HTTP layer reads the other
//! end as the request body. Any failure closes the pipe with that error, so
//! the request fails instead of sending a truncated form.

use std::io::{self, Read, Write};

use uuid::Uuid;

use crate::pipe::PipeWriter;

/// One file part and its boundary.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    field_name: String,
    filename: String,
}

impl MultipartForm {
    pub fn new(field_name: &str, filename: &str) -> Self {
        Self::with_boundary(field_name, filename, format!("see-{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(field_name: &str, filename: &str, boundary: String) -> Self {
        Self {
            boundary,
            field_name: field_name.to_string(),
            filename: filename.to_string(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn part_header(&self) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            self.boundary,
            escape_quotes(&self.field_name),
            escape_quotes(&self.filename),
        )
    }

    pub fn closing(&self) -> String {
        format!("\r\n--{}--\r\n", self.boundary)
    }

    /// Encode the whole form into `writer`, then close it.
    ///
    /// Errors are not returned; they are delivered to the pipe's reader.
    pub fn encode<R: Read>(&self, mut source: R, mut writer: PipeWriter) {
        match self.write_parts(&mut source, &mut writer) {
            Ok(()) => {
                if let Err(err) = writer.close() {
                    tracing::debug!(error = %err, "multipart body abandoned by reader");
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "multipart encoding failed");
                writer.close_with_error(err);
            }
        }
    }

    fn write_parts<R: Read, W: Write>(&self, source: &mut R, writer: &mut W) -> io::Result<()> {
        writer
            .write_all(self.part_header().as_bytes())
            .map_err(|e| with_context(e, "create form file"))?;
        io::copy(source, writer).map_err(|e| with_context(e, "copy file content"))?;
        writer
            .write_all(self.closing().as_bytes())
            .map_err(|e| with_context(e, "close writer"))?;
        Ok(())
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn with_context(err: io::Error, context: &str) -> io::Error {
    io::Error::new(err.kind(), format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::{pipe, PIPE_CAPACITY};
    use std::thread;

    fn encode_to_vec(form: &MultipartForm, source: Vec<u8>) -> io::Result<Vec<u8>> {
        let (writer, mut reader) = pipe(PIPE_CAPACITY);
        let form = form.clone();
        let producer = thread::spawn(move || form.encode(source.as_slice(), writer));
        let mut body = Vec::new();
        let result = reader.read_to_end(&mut body);
        producer.join().unwrap();
        result.map(|_| body)
    }

    #[test]
    fn encodes_single_file_part() {
        let form = MultipartForm::with_boundary("file", "notes.txt", "XYZ".to_string());
        let body = encode_to_vec(&form, b"hello".to_vec()).unwrap();
        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
            Content-Type: application/octet-stream\r\n\
            \r\n\
            hello\r\n\
            --XYZ--\r\n";
        assert_eq!(String::from_utf8(body).unwrap(), expected);
    }

    #[test]
    fn content_type_carries_boundary() {
        let form = MultipartForm::with_boundary("file", "a.bin", "b0undary".to_string());
        assert_eq!(form.content_type(), "multipart/form-data; boundary=b0undary");
    }

    #[test]
    fn random_boundaries_differ() {
        let a = MultipartForm::new("file", "a");
        let b = MultipartForm::new("file", "a");
        assert_ne!(a.boundary(), b.boundary());
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let form = MultipartForm::with_boundary("fi\"le", "my \"doc\".txt", "B".to_string());
        let header = form.part_header();
        assert!(header.contains(r#"name="fi\"le""#));
        assert!(header.contains(r#"filename="my \"doc\".txt""#));
    }

    #[test]
    fn binary_content_is_copied_verbatim() {
        let form = MultipartForm::with_boundary("file", "blob", "B".to_string());
        let content: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
        let body = encode_to_vec(&form, content.clone()).unwrap();
        let header_len = form.part_header().len();
        let closing_len = form.closing().len();
        assert_eq!(&body[header_len..body.len() - closing_len], content.as_slice());
    }

    struct FailingSource;

    impl Read for FailingSource {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "disk says no"))
        }
    }

    #[test]
    fn source_failure_reaches_reader() {
        let form = MultipartForm::with_boundary("file", "x", "B".to_string());
        let (writer, mut reader) = pipe(PIPE_CAPACITY);
        let producer = thread::spawn(move || form.encode(FailingSource, writer));
        let mut body = Vec::new();
        let err = reader.read_to_end(&mut body).unwrap_err();
        producer.join().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(err.to_string().starts_with("copy file content:"));
    }
}
