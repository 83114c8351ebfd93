//! Blocking client for the S.EE short URL, text and file hosting API.
//!
//! # Overview
//! [`Transport`] turns a method, a path and an optional JSON body into one
//! HTTP exchange, reads the whole response and classifies it. [`decode`]
//! turns the raw body into whatever type the caller asks for. File uploads
//! are encoded as `multipart/form-data` on a producer thread and streamed
//! through a bounded pipe, so memory use does not grow with file size.
//! [`SeeClient`] maps each API operation onto the transport.
//!
//! # Design
//! - The connection profile is copied and normalized once; a client never
//!   changes its address or credential afterwards.
//! - Calls share no mutable state, so clients are `Clone` and usable from
//!   several threads at once.
//! - Every failure is one of the four [`ClientError`] variants and is returned
//!   to the caller; nothing is retried.
//!
//! ```no_run
//! use see_core::{ClientConfig, CreateShortUrlRequest, SeeClient};
//!
//! let client = SeeClient::new(ClientConfig::new("your-api-key"));
//! let created = client.create_short_url(&CreateShortUrlRequest {
//!     domain: "s.ee".to_string(),
//!     target_url: "https://example.com".to_string(),
//!     ..Default::default()
//! })?;
//! println!("{}", created.data.short_url);
//! # Ok::<(), see_core::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod multipart;
pub mod pipe;
pub mod transport;
pub mod types;
pub mod upload;

pub use client::{SeeClient, UPLOAD_FIELD_NAME};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_TIMEOUT};
pub use decode::decode;
pub use error::ClientError;
pub use http::{classify, HttpMethod, RawResponse};
pub use pipe::{PIPE_CAPACITY, PIPE_CHUNK_SIZE};
pub use transport::Transport;
pub use types::*;
pub use upload::{check_size, FileSource};
