//! Generic response decoding.

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Deserialize a raw response body into `T`.
///
/// Unknown fields are ignored. A body that is not JSON, or whose fields have
/// the wrong types, yields [`ClientError::Decode`] and no value at all.
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(raw).map_err(ClientError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeleteFileResponse, DomainsResponse, Envelope, ShortUrlData};

    #[test]
    fn decodes_envelope() {
        let raw = br#"{"code":200,"data":{"domains":["s.ee","t.ly"]},"message":"success"}"#;
        let response: DomainsResponse = decode(raw).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.data.domains, vec!["s.ee", "t.ly"]);
        assert_eq!(response.message, "success");
    }

    #[test]
    fn ignores_unknown_fields() {
        let raw = br#"{"code":200,"data":{"slug":"abc","short_url":"https://s.ee/abc","custom_slug":"","visits":3},"message":"ok","request_id":"r-1"}"#;
        let response: Envelope<ShortUrlData> = decode(raw).unwrap();
        assert_eq!(response.data.slug, "abc");
        assert_eq!(response.data.short_url, "https://s.ee/abc");
    }

    #[test]
    fn rejects_non_json() {
        let err = decode::<DomainsResponse>(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn rejects_type_mismatch() {
        let raw = br#"{"code":"200","data":{"domains":[]},"message":"ok"}"#;
        let err = decode::<DomainsResponse>(raw).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn rejects_empty_body() {
        let err = decode::<DomainsResponse>(b"").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn delete_file_response_has_string_code() {
        let raw = br#"{"code":"success","message":"File deleted","success":true}"#;
        let response: DeleteFileResponse = decode(raw).unwrap();
        assert_eq!(response.code, "success");
        assert!(response.success);

        let err = decode::<DomainsResponse>(raw).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
