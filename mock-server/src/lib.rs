//! In-memory stand-in for the S.EE API.
//!
//! Serves the short URL, text, domain, tag and file endpoints with the same
//! envelopes as the real service, plus a few diagnostic routes (`/echo`,
//! `/inspect`, `/status/{code}`, `/slow/{millis}`, `/garbage`) that client
//! tests use to provoke specific transport outcomes.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const LINK_DOMAINS: &[&str] = &["s.ee", "a.see-test.com"];
pub const TEXT_DOMAINS: &[&str] = &["t.s.ee"];
pub const FILE_DOMAINS: &[&str] = &["f.s.ee"];

const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub domain: String,
    pub slug: String,
    pub target_url: String,
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Text {
    pub domain: String,
    pub slug: String,
    pub content: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub file_id: i64,
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Deserialize)]
pub struct CreateLink {
    pub domain: String,
    pub target_url: String,
    #[serde(default)]
    pub custom_slug: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateLink {
    pub domain: String,
    pub slug: String,
    pub target_url: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateText {
    pub content: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub custom_slug: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateText {
    pub domain: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Deserialize)]
pub struct SlugRef {
    pub domain: String,
    pub slug: String,
}

type Key = (String, String);

/// Everything the mock remembers between requests.
#[derive(Debug, Default)]
pub struct MockState {
    api_key: Option<String>,
    requests: AtomicUsize,
    next_file_id: AtomicI64,
    pub links: RwLock<HashMap<Key, Link>>,
    pub texts: RwLock<HashMap<Key, Text>>,
    pub files: RwLock<HashMap<String, StoredFile>>,
}

pub type SharedState = Arc<MockState>;

impl MockState {
    pub fn new() -> SharedState {
        Arc::new(Self::default())
    }

    /// Require `Authorization: <api_key>` on every request.
    pub fn with_api_key(api_key: impl Into<String>) -> SharedState {
        Arc::new(Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        })
    }

    /// Requests received so far, rejected ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Look up an uploaded file from synchronous code.
    ///
    /// Must not be called from inside an async context.
    pub fn stored_file(&self, delete_key: &str) -> Option<StoredFile> {
        self.files.blocking_read().get(delete_key).cloned()
    }
}

pub fn app() -> Router {
    app_with_state(MockState::new())
}

pub fn app_with_state(state: SharedState) -> Router {
    Router::new()
        .route("/shorten", post(create_link).put(update_link).delete(delete_link))
        .route("/text", post(create_text).put(update_text).delete(delete_text))
        .route("/domains", get(|| async { domains(LINK_DOMAINS) }))
        .route("/text/domains", get(|| async { domains(TEXT_DOMAINS) }))
        .route("/file/domains", get(|| async { domains(FILE_DOMAINS) }))
        .route("/tags", get(tags))
        .route("/file/upload", post(upload_file))
        .route("/file/delete/{key}", get(delete_file))
        .route("/echo", post(echo))
        .route("/inspect", any(inspect))
        .route("/status/{code}", any(status_with))
        .route("/slow/{millis}", any(slow))
        .route("/garbage", get(|| async { "<html>not json</html>" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), track))
        .with_state(state)
}

pub async fn run_with_state(listener: TcpListener, state: SharedState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn success(data: Value) -> Json<Value> {
    Json(json!({ "code": 200, "data": data, "message": "success" }))
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "code": status.as_u16(), "message": message })),
    )
}

fn random_slug() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_string()
}

async fn track(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if let Some(expected) = &state.api_key {
        let provided = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            tracing::debug!(uri = %request.uri(), "rejecting request with bad credentials");
            return failure(StatusCode::UNAUTHORIZED, "invalid api key").into_response();
        }
    }
    next.run(request).await
}

fn domains(list: &[&str]) -> Json<Value> {
    success(json!({ "domains": list }))
}

async fn tags() -> Json<Value> {
    success(json!({
        "tags": [
            { "id": 1, "name": "docs" },
            { "id": 2, "name": "release" },
        ]
    }))
}

async fn create_link(
    State(state): State<SharedState>,
    Json(input): Json<CreateLink>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !LINK_DOMAINS.contains(&input.domain.as_str()) {
        return Err(failure(StatusCode::BAD_REQUEST, "domain not allowed"));
    }
    let slug = if input.custom_slug.is_empty() {
        random_slug()
    } else {
        input.custom_slug.clone()
    };
    let key = (input.domain.clone(), slug.clone());
    let mut links = state.links.write().await;
    if links.contains_key(&key) {
        return Err(failure(StatusCode::CONFLICT, "slug already exists"));
    }
    let short_url = format!("https://{}/{}", input.domain, slug);
    links.insert(
        key,
        Link {
            domain: input.domain,
            slug: slug.clone(),
            target_url: input.target_url,
            title: input.title,
        },
    );
    Ok(success(json!({
        "custom_slug": input.custom_slug,
        "short_url": short_url,
        "slug": slug,
    })))
}

async fn update_link(
    State(state): State<SharedState>,
    Json(input): Json<UpdateLink>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut links = state.links.write().await;
    let link = links
        .get_mut(&(input.domain, input.slug))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "short url not found"))?;
    link.target_url = input.target_url;
    link.title = input.title;
    Ok(success(Value::Null))
}

async fn delete_link(
    State(state): State<SharedState>,
    Json(input): Json<SlugRef>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut links = state.links.write().await;
    links
        .remove(&(input.domain, input.slug))
        .map(|_| Json(json!({ "code": 200, "message": "deleted" })))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "short url not found"))
}

async fn create_text(
    State(state): State<SharedState>,
    Json(input): Json<CreateText>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if input.content.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "content is required"));
    }
    let domain = if input.domain.is_empty() {
        TEXT_DOMAINS[0].to_string()
    } else {
        input.domain.clone()
    };
    if !TEXT_DOMAINS.contains(&domain.as_str()) {
        return Err(failure(StatusCode::BAD_REQUEST, "domain not allowed"));
    }
    let slug = if input.custom_slug.is_empty() {
        random_slug()
    } else {
        input.custom_slug.clone()
    };
    let key = (domain.clone(), slug.clone());
    let mut texts = state.texts.write().await;
    if texts.contains_key(&key) {
        return Err(failure(StatusCode::CONFLICT, "slug already exists"));
    }
    let short_url = format!("https://{domain}/{slug}");
    texts.insert(
        key,
        Text {
            domain,
            slug: slug.clone(),
            content: input.content,
            title: input.title,
        },
    );
    Ok(success(json!({
        "custom_slug": input.custom_slug,
        "short_url": short_url,
        "slug": slug,
    })))
}

async fn update_text(
    State(state): State<SharedState>,
    Json(input): Json<UpdateText>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut texts = state.texts.write().await;
    let text = texts
        .get_mut(&(input.domain, input.slug))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "text not found"))?;
    text.content = input.content;
    if !input.title.is_empty() {
        text.title = input.title;
    }
    Ok(success(Value::Null))
}

async fn delete_text(
    State(state): State<SharedState>,
    Json(input): Json<SlugRef>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut texts = state.texts.write().await;
    texts
        .remove(&(input.domain, input.slug))
        .map(|_| Json(json!({ "code": 200, "message": "deleted" })))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "text not found"))
}

async fn upload_file(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let bad_form = |_| failure(StatusCode::BAD_REQUEST, "malformed multipart body");
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(bad_form)?.to_vec();
        let file_id = state.next_file_id.fetch_add(1, Ordering::SeqCst) + 1;
        let delete_key = Uuid::new_v4().simple().to_string();
        let storename = format!("{}-{}", &delete_key[..8], filename);
        let size = content.len();
        tracing::debug!(%filename, size, "stored upload");
        state.files.write().await.insert(
            delete_key.clone(),
            StoredFile {
                file_id,
                filename: filename.clone(),
                content,
            },
        );
        return Ok(success(json!({
            "delete": delete_key,
            "file_id": file_id,
            "filename": filename,
            "hash": "",
            "height": 0,
            "page": format!("https://{}/p/{storename}", FILE_DOMAINS[0]),
            "path": format!("/{storename}"),
            "size": size,
            "storename": storename,
            "upload_status": 1,
            "url": format!("https://{}/{storename}", FILE_DOMAINS[0]),
            "width": 0,
        })));
    }
    Err(failure(StatusCode::BAD_REQUEST, "missing file field"))
}

async fn delete_file(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.files.write().await.remove(&key) {
        Some(_) => (
            StatusCode::OK,
            Json(json!({ "code": "success", "message": "File deleted", "success": true })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "error", "message": "File not found", "success": false })),
        ),
    }
}

async fn echo(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn inspect(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "content_type": header_value(header::CONTENT_TYPE),
        "authorization": header_value(header::AUTHORIZATION),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn status_with(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")).into_response(),
        Err(_) => failure(StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

async fn slow(Path(millis): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    success(Value::Null)
}
