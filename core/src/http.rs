//! HTTP data types shared by the transport and its callers.
//!
//! # Design
//! Responses are read eagerly into memory, so an inbound response is just a
//! status code and the body bytes. Status interpretation lives here rather
//! than in the transport so it can be exercised without a network.

use std::fmt;

use crate::error::ClientError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Hand back the body for 2xx statuses, otherwise an [`ClientError::Api`].
    pub fn into_result(self) -> Result<Vec<u8>, ClientError> {
        classify(self.status, self.body)
    }
}

/// Map a status code and body to success or an API failure.
///
/// The service's own error envelope is left uninterpreted; the body is passed
/// through as text.
pub fn classify(status: u16, body: Vec<u8>) -> Result<Vec<u8>, ClientError> {
    if (200..300).contains(&status) {
        return Ok(body);
    }
    Err(ClientError::Api {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_passes_body_through_unmodified() {
        for status in [200, 201, 204, 250, 299] {
            let body = br#"{"code":200}"#.to_vec();
            assert_eq!(classify(status, body.clone()).unwrap(), body, "status {status}");
        }
    }

    #[test]
    fn statuses_outside_success_range_are_api_errors() {
        for status in [100, 101, 199, 300, 302, 400, 404, 429, 500, 503] {
            let err = classify(status, b"rejected".to_vec()).unwrap_err();
            match err {
                ClientError::Api { status: got, body } => {
                    assert_eq!(got, status);
                    assert_eq!(body, "rejected");
                }
                other => panic!("unexpected error for {status}: {other:?}"),
            }
        }
    }

    #[test]
    fn raw_response_into_result() {
        let response = RawResponse {
            status: 404,
            body: b"not found".to_vec(),
        };
        let err = response.into_result().unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
