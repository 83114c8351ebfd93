//! Request and response DTOs for the S.EE API.
//!
//! # Design
//! Nearly every response is wrapped in the same `{code, data, message}`
//! envelope, so [`Envelope`] is generic over its payload and the per-operation
//! names are aliases. File deletion is the exception: it answers with a
//! string `code` and a `success` flag, and keeps its own type so the wire
//! shape is preserved exactly.
//!
//! Optional request fields are left off the wire when unset. Response payloads
//! default missing fields, matching how the service omits empty values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{code, data, message}` wrapper around a response payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub data: T,
    #[serde(default)]
    pub message: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShortUrlRequest {
    pub domain: String,
    pub target_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expiration_redirect_url: String,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub expire_at: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateShortUrlRequest {
    pub domain: String,
    pub slug: String,
    pub target_url: String,
    pub title: String,
}

/// Identifies a short URL or text entry by domain and slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugRef {
    pub domain: String,
    pub slug: String,
}

pub type DeleteUrlRequest = SlugRef;
pub type DeleteTextRequest = SlugRef;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTextRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub expire_at: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTextRequest {
    pub domain: String,
    pub slug: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
}

/// Payload returned when a short URL or text entry is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortUrlData {
    pub custom_slug: String,
    pub short_url: String,
    pub slug: String,
}

/// Payload returned by a file upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadedFile {
    /// Key accepted by the file delete endpoint.
    pub delete: String,
    pub file_id: i64,
    pub filename: String,
    pub hash: String,
    pub height: i64,
    pub page: String,
    pub path: String,
    pub size: i64,
    pub storename: String,
    pub upload_status: i64,
    pub url: String,
    pub width: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainList {
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagList {
    pub tags: Vec<Tag>,
}

/// Response to a file deletion; unlike every other response its `code` is a
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

pub type CreateShortUrlResponse = Envelope<ShortUrlData>;
pub type UpdateShortUrlResponse = Envelope<Option<Value>>;
pub type DeleteUrlResponse = Envelope<Option<Value>>;
pub type CreateTextResponse = Envelope<ShortUrlData>;
pub type UpdateTextResponse = Envelope<Option<Value>>;
pub type DeleteTextResponse = Envelope<Option<Value>>;
pub type UploadFileResponse = Envelope<UploadedFile>;
pub type DomainsResponse = Envelope<DomainList>;
pub type TagsResponse = Envelope<TagList>;
