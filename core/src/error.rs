//! Error types for the S.EE client.
//!
//! # Design
//! Every failed call lands in exactly one of four variants so callers can tell
//! "my input was invalid" from "the service was unreachable", "the service
//! rejected the request" and "the service sent something unparseable". None of
//! them are retried by this crate.

use std::io;

use thiserror::Error;

/// Errors returned by [`crate::Transport`] and [`crate::SeeClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network activity.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request could not be sent or the response could not be read in
    /// full. Multipart encoding failures also surface here.
    #[error("transport failed: {0}")]
    Transport(#[source] ureq::Error),

    /// The exchange completed but the status was outside 200..300.
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The response body did not decode into the requested type.
    #[error("decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// True when the call ran out of its configured wait duration.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Transport(ureq::Error::Timeout(_)) => true,
            ClientError::Transport(ureq::Error::Io(err)) => err.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// HTTP status carried by an [`ClientError::Api`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Transport(ureq::Error::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_body() {
        let err = ClientError::Api {
            status: 403,
            body: r#"{"code":403,"message":"forbidden"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"API error (status 403): {"code":403,"message":"forbidden"}"#
        );
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_timeout());
    }

    #[test]
    fn io_timeout_counts_as_timeout() {
        let err = ClientError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn other_io_errors_are_not_timeouts() {
        let err = ClientError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(!err.is_timeout());
    }

    #[test]
    fn decode_error_keeps_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ClientError::Decode(source);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("decode response:"));
    }
}
