//! Typed operations of the S.EE API.
//!
//! # Design
//! Each operation is a thin mapping onto [`Transport`]: a method, a path, an
//! optional request body and the type to decode the response into. All
//! behaviour worth testing lives in the transport; these wrappers only pin the
//! wire contract for each endpoint.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::transport::Transport;
use crate::types::{
    CreateShortUrlRequest, CreateShortUrlResponse, CreateTextRequest, CreateTextResponse,
    DeleteFileResponse, DeleteTextRequest, DeleteTextResponse, DeleteUrlRequest,
    DeleteUrlResponse, DomainsResponse, TagsResponse, UpdateShortUrlRequest,
    UpdateShortUrlResponse, UpdateTextRequest, UpdateTextResponse, UploadFileResponse,
};
use crate::upload::{check_size, FileSource};

/// Multipart field the upload endpoint reads the file from.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Client for the short URL, text and file endpoints.
#[derive(Debug, Clone)]
pub struct SeeClient {
    transport: Transport,
}

impl SeeClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            transport: Transport::new(config),
        }
    }

    /// Build a client from `SEE_API_KEY` / `SEE_BASE_URL` / `SEE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub fn create_short_url(
        &self,
        request: &CreateShortUrlRequest,
    ) -> Result<CreateShortUrlResponse, ClientError> {
        self.transport
            .execute_json(HttpMethod::Post, "/shorten", Some(request))
    }

    pub fn update_short_url(
        &self,
        request: &UpdateShortUrlRequest,
    ) -> Result<UpdateShortUrlResponse, ClientError> {
        self.transport
            .execute_json(HttpMethod::Put, "/shorten", Some(request))
    }

    pub fn delete_short_url(
        &self,
        request: &DeleteUrlRequest,
    ) -> Result<DeleteUrlResponse, ClientError> {
        self.transport
            .execute_json(HttpMethod::Delete, "/shorten", Some(request))
    }

    pub fn get_domains(&self) -> Result<DomainsResponse, ClientError> {
        self.transport
            .execute_json::<_, ()>(HttpMethod::Get, "/domains", None)
    }

    pub fn get_tags(&self) -> Result<TagsResponse, ClientError> {
        self.transport
            .execute_json::<_, ()>(HttpMethod::Get, "/tags", None)
    }

    pub fn create_text(
        &self,
        request: &CreateTextRequest,
    ) -> Result<CreateTextResponse, ClientError> {
        self.transport
            .execute_json(HttpMethod::Post, "/text", Some(request))
    }

    pub fn update_text(
        &self,
        request: &UpdateTextRequest,
    ) -> Result<UpdateTextResponse, ClientError> {
        self.transport
            .execute_json(HttpMethod::Put, "/text", Some(request))
    }

    pub fn delete_text(
        &self,
        request: &DeleteTextRequest,
    ) -> Result<DeleteTextResponse, ClientError> {
        self.transport
            .execute_json(HttpMethod::Delete, "/text", Some(request))
    }

    /// Upload a file under `filename`.
    ///
    /// Sources that know their length are checked against the configured
    /// maximum before anything is sent.
    pub fn upload_file(
        &self,
        filename: &str,
        source: impl Into<FileSource>,
    ) -> Result<UploadFileResponse, ClientError> {
        if filename.is_empty() {
            return Err(ClientError::Validation("filename is empty".to_string()));
        }
        let source = source.into();
        check_size(&source, self.config().max_upload_size)?;
        self.transport
            .upload_json("/file/upload", UPLOAD_FIELD_NAME, filename, source)
    }

    /// Delete an uploaded file. `delete_key` is appended to the path as is.
    pub fn delete_file(&self, delete_key: &str) -> Result<DeleteFileResponse, ClientError> {
        let path = format!("/file/delete/{delete_key}");
        self.transport
            .execute_json::<_, ()>(HttpMethod::Get, &path, None)
    }

    pub fn get_file_domains(&self) -> Result<DomainsResponse, ClientError> {
        self.transport
            .execute_json::<_, ()>(HttpMethod::Get, "/file/domains", None)
    }

    pub fn get_text_domains(&self) -> Result<DomainsResponse, ClientError> {
        self.transport
            .execute_json::<_, ()>(HttpMethod::Get, "/text/domains", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SeeClient {
        SeeClient::new(ClientConfig::new("key").with_base_url("http://127.0.0.1:9"))
    }

    #[test]
    fn upload_rejects_empty_filename() {
        let err = client().upload_file("", b"data".as_slice()).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn upload_rejects_oversized_source_before_io() {
        let client = SeeClient::new(
            ClientConfig::new("key")
                .with_base_url("http://127.0.0.1:9")
                .with_max_upload_size(4),
        );
        let err = client.upload_file("big.bin", vec![0u8; 5]).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn config_is_normalized_copy() {
        let client = SeeClient::new(ClientConfig::default());
        assert_eq!(client.config().base_url, crate::config::DEFAULT_BASE_URL);
    }
}
