//! Blocking HTTP transport for the S.EE API.
//!
//! # Design
//! `Transport` owns a ureq `Agent` configured with the profile's timeout as a
//! global per-call deadline and with status-as-error turned off, so 4xx/5xx
//! responses come back as data and are classified by [`classify`]. Every
//! response body is read in full before the call returns; ureq releases the
//! connection once the body is drained or the response is dropped.
//!
//! Uploads stream through a bounded [`pipe`] fed by a producer thread. The
//! pipe's reader shares the call's deadline, so a source that stalls fails the
//! call with a timeout instead of holding it. The reader end is dropped as soon
//! as the send finishes, which makes the producer's next write fail with
//! `BrokenPipe`; the producer is joined if it finishes before the deadline and
//! left to wind down on its own otherwise.
//!
//! Upload requests carry `Expect: 100-continue`. A service that rejects the
//! request from its headers alone (a bad key, say) answers before any body
//! byte is written, and that answer is classified like any other response.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder, SendBody};

use crate::config::ClientConfig;
use crate::decode::decode;
use crate::error::ClientError;
use crate::http::{classify, HttpMethod};
use crate::multipart::MultipartForm;
use crate::pipe::{pipe, PIPE_CAPACITY};
use crate::upload::FileSource;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Executes one request per call against a fixed connection profile.
///
/// Holds no per-call state, so a single `Transport` can be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct Transport {
    config: ClientConfig,
    agent: Agent,
}

impl Transport {
    pub fn new(config: ClientConfig) -> Self {
        let config = config.normalized();
        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { config, agent }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `path` is appended to the base URL verbatim; callers escape dynamic
    /// segments themselves.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Send a JSON request and return the raw body of a 2xx response.
    pub fn execute<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ClientError::Validation(format!("marshal request body: {e}")))?;
        let url = self.url(path);
        debug!(%method, %url, body_bytes = payload.as_ref().map_or(0, Vec::len), "sending request");

        let result = match (method, payload) {
            (HttpMethod::Get, None) => self.prepare(self.agent.get(&url), JSON_CONTENT_TYPE).call(),
            (HttpMethod::Get, Some(body)) => self
                .prepare(self.agent.get(&url).force_send_body(), JSON_CONTENT_TYPE)
                .send(&body[..]),
            (HttpMethod::Delete, None) => {
                self.prepare(self.agent.delete(&url), JSON_CONTENT_TYPE).call()
            }
            (HttpMethod::Delete, Some(body)) => self
                .prepare(self.agent.delete(&url).force_send_body(), JSON_CONTENT_TYPE)
                .send(&body[..]),
            (HttpMethod::Post, Some(body)) => self
                .prepare(self.agent.post(&url), JSON_CONTENT_TYPE)
                .send(&body[..]),
            (HttpMethod::Post, None) => {
                self.prepare(self.agent.post(&url), JSON_CONTENT_TYPE).send_empty()
            }
            (HttpMethod::Put, Some(body)) => self
                .prepare(self.agent.put(&url), JSON_CONTENT_TYPE)
                .send(&body[..]),
            (HttpMethod::Put, None) => {
                self.prepare(self.agent.put(&url), JSON_CONTENT_TYPE).send_empty()
            }
        };

        read_response(method, &url, result)
    }

    /// POST a single file field as `multipart/form-data` without buffering
    /// the encoded body.
    pub fn execute_multipart(
        &self,
        path: &str,
        field_name: &str,
        filename: &str,
        source: FileSource,
    ) -> Result<Vec<u8>, ClientError> {
        let deadline = Instant::now() + self.config.timeout;
        let url = self.url(path);
        let form = MultipartForm::new(field_name, filename);
        let content_type = form.content_type();
        let reader = source.into_reader();
        debug!(%url, field_name, filename, "sending multipart upload");

        let (writer, body) = pipe(PIPE_CAPACITY);
        let mut body = body.with_deadline(deadline);
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let producer = thread::Builder::new()
            .name("see-multipart-encoder".to_string())
            .spawn(move || {
                form.encode(reader, writer);
                let _ = done_tx.send(());
            })?;

        let result = self
            .prepare(self.agent.post(&url), &content_type)
            .header("Expect", "100-continue")
            .send(SendBody::from_reader(&mut body));
        drop(body);
        let response = read_response(HttpMethod::Post, &url, result);

        match done_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Err(RecvTimeoutError::Timeout) => {
                debug!(%url, "multipart encoder still reading its source; detaching");
            }
            _ => {
                if producer.join().is_err() {
                    warn!(%url, "multipart encoder panicked");
                }
            }
        }
        response
    }

    /// [`Transport::execute`] followed by [`decode`].
    pub fn execute_json<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = self.execute(method, path, body)?;
        decode(&raw)
    }

    /// [`Transport::execute_multipart`] followed by [`decode`].
    pub fn upload_json<T: DeserializeOwned>(
        &self,
        path: &str,
        field_name: &str,
        filename: &str,
        source: FileSource,
    ) -> Result<T, ClientError> {
        let raw = self.execute_multipart(path, field_name, filename, source)?;
        decode(&raw)
    }

    fn prepare<S>(&self, builder: RequestBuilder<S>, content_type: &str) -> RequestBuilder<S> {
        let builder = builder.header("Content-Type", content_type);
        if self.config.api_key.is_empty() {
            builder
        } else {
            builder.header("Authorization", self.config.api_key.as_str())
        }
    }
}

fn read_response(
    method: HttpMethod,
    url: &str,
    result: Result<Response<Body>, ureq::Error>,
) -> Result<Vec<u8>, ClientError> {
    let mut response = result.map_err(|err| {
        debug!(%method, %url, error = %err, "request failed");
        ClientError::Transport(err)
    })?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(ClientError::Transport)?;
    debug!(%method, %url, status, body_bytes = body.len(), "received response");
    classify(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;
    use std::time::Duration;

    #[test]
    fn new_normalizes_config() {
        let transport = Transport::new(ClientConfig::default());
        assert_eq!(transport.config().base_url, DEFAULT_BASE_URL);
        assert_eq!(transport.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn path_is_appended_verbatim() {
        let transport = Transport::new(ClientConfig::default().with_base_url("http://h/api/v1"));
        assert_eq!(transport.url("/file/delete/a b%2F"), "http://h/api/v1/file/delete/a b%2F");
        assert_eq!(transport.url(""), "http://h/api/v1");
    }

    #[test]
    fn unserializable_body_is_validation_error() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut body = HashMap::new();
        body.insert((1, 2), "value");
        let transport = Transport::new(ClientConfig::default().with_base_url("http://127.0.0.1:9"));
        let err = transport.execute(HttpMethod::Post, "/x", Some(&body)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let transport = Transport::new(
            ClientConfig::default()
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(2)),
        );
        let err = transport.execute::<()>(HttpMethod::Get, "/domains", None).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
