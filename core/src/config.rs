//! Connection profile for the S.EE API.
//!
//! # Design
//! `ClientConfig` is plain data with public fields so callers can fill in only
//! what they need. Empty or zero fields fall back to the defaults below when a
//! client is built; the client keeps its own normalized copy, so nothing a
//! caller does afterwards can change the address or credential in use.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://s.ee/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Settings consumed by [`crate::Transport`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix every request path is appended to, verbatim.
    pub base_url: String,
    /// Sent as the `Authorization` header when non-empty.
    pub api_key: String,
    /// Overall deadline for a single call, body upload included.
    pub timeout: Duration,
    /// Ceiling enforced by the upload size guard.
    pub max_upload_size: u64,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read `SEE_API_KEY`, `SEE_BASE_URL` and `SEE_TIMEOUT_SECS`.
    ///
    /// Missing or unparsable variables leave the field unset so the usual
    /// defaults apply.
    pub fn from_env() -> Self {
        let timeout = std::env::var("SEE_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_default();
        Self {
            base_url: std::env::var("SEE_BASE_URL").unwrap_or_default(),
            api_key: std::env::var("SEE_API_KEY").unwrap_or_default(),
            timeout,
            max_upload_size: 0,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Replace unset fields with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.base_url.is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.max_upload_size == 0 {
            self.max_upload_size = DEFAULT_MAX_UPLOAD_SIZE;
        }
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .field("timeout", &self.timeout)
            .field("max_upload_size", &self.max_upload_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_fills_defaults() {
        let config = ClientConfig::default().normalized();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_upload_size, DEFAULT_MAX_UPLOAD_SIZE);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn normalized_keeps_explicit_values() {
        let config = ClientConfig::new("key")
            .with_base_url("http://localhost:3000")
            .with_timeout(Duration::from_millis(250))
            .with_max_upload_size(10)
            .normalized();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.max_upload_size, 10);
    }

    #[test]
    fn default_max_upload_size_is_100_mib() {
        assert_eq!(DEFAULT_MAX_UPLOAD_SIZE, 104_857_600);
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
