// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: an in-process mock backend and token helpers.

use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::json;
use tokio::net::TcpListener;

use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::token::TokenStore;

/// Unsigned JWT whose payload carries `exp`.
pub fn fake_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "tester", "exp": exp }).to_string());
    format!("{header}.{payload}.sig")
}

/// Unsigned JWT expiring `offset` seconds from now (negative for the past).
pub fn jwt_expiring_in(offset: i64) -> String {
    let now = crate::token::claims::epoch_secs() as i64;
    fake_jwt(now + offset)
}

/// Enveloped credential pair as the refresh and login endpoints return it.
pub fn pair_body(access: &str, refresh: &str) -> String {
    json!({
        "code": 1000,
        "data": { "accessToken": access, "refreshToken": refresh, "authenticated": true }
    })
    .to_string()
}

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub bearer: Option<String>,
}

/// One multipart file part received by the upload route.
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

/// Mock chat backend. Protected routes accept only bearers in `valid`.
#[derive(Default)]
pub struct Backend {
    valid: Mutex<HashSet<String>>,
    refresh_calls: AtomicU32,
    refresh_script: Mutex<VecDeque<(u16, String)>>,
    refresh_last: Mutex<Option<(u16, String)>>,
    refresh_delay: Mutex<Duration>,
    refresh_bodies: Mutex<Vec<serde_json::Value>>,
    logout_bodies: Mutex<Vec<serde_json::Value>>,
    seen: Mutex<Vec<Seen>>,
    stream_chunks: Mutex<Vec<Bytes>>,
    stream_requests: Mutex<Vec<serde_json::Value>>,
    uploads: Mutex<Vec<Upload>>,
}

impl Backend {
    pub fn grant(&self, token: &str) {
        self.valid.lock().insert(token.to_owned());
    }

    pub fn revoke_all(&self) {
        self.valid.lock().clear();
    }

    /// Responses for successive refresh calls; the last one repeats.
    pub fn script_refresh(&self, responses: Vec<(u16, String)>) {
        *self.refresh_script.lock() = responses.into();
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock() = delay;
    }

    pub fn set_stream(&self, chunks: &[&[u8]]) {
        *self.stream_chunks.lock() = chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect();
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_bodies(&self) -> Vec<serde_json::Value> {
        self.refresh_bodies.lock().clone()
    }

    pub fn logout_bodies(&self) -> Vec<serde_json::Value> {
        self.logout_bodies.lock().clone()
    }

    pub fn stream_requests(&self) -> Vec<serde_json::Value> {
        self.stream_requests.lock().clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().clone()
    }

    /// Bearers presented on `path`, in arrival order.
    pub fn bearers_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen.lock().iter().filter(|s| s.path == path).map(|s| s.bearer.clone()).collect()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.seen.lock().iter().filter(|s| s.path == path).count()
    }

    fn record(&self, path: &str, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);
        self.seen.lock().push(Seen { path: path.to_owned(), bearer: bearer.clone() });
        bearer
    }

    /// Record the call and reject it with 401 unless its bearer is valid.
    fn check(&self, path: &str, headers: &HeaderMap) -> Result<(), Response> {
        match self.record(path, headers) {
            Some(token) if self.valid.lock().contains(&token) => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED.into_response()),
        }
    }

    fn next_refresh(&self) -> (u16, String) {
        let next = self.refresh_script.lock().pop_front();
        let mut last = self.refresh_last.lock();
        match next {
            Some(resp) => {
                *last = Some(resp.clone());
                resp
            }
            None => last.clone().unwrap_or((500, "{}".to_owned())),
        }
    }
}

type Shared = State<Arc<Backend>>;

fn ok(data: serde_json::Value) -> Response {
    Json(json!({ "code": 1000, "data": data })).into_response()
}

async fn refresh(State(b): Shared, headers: HeaderMap, body: String) -> Response {
    b.record("/auth/refresh", &headers);
    b.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if let Ok(value) = serde_json::from_str(&body) {
        b.refresh_bodies.lock().push(value);
    }
    let delay = *b.refresh_delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let (status, body) = b.next_refresh();
    if (200..300).contains(&status) {
        if let Ok(pair) = crate::api::auth::parse_credential_pair(body.as_bytes()) {
            b.grant(&pair.access_token);
        }
    }
    (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body)
        .into_response()
}

async fn login(
    State(b): Shared,
    headers: HeaderMap,
    Json(req): Json<serde_json::Value>,
) -> Response {
    b.record("/auth/login", &headers);
    if req["password"] != "secret" {
        return Json(json!({ "code": 1006, "message": "unauthenticated" })).into_response();
    }
    let access = jwt_expiring_in(3600);
    b.grant(&access);
    (StatusCode::OK, pair_body(&access, "login-refresh")).into_response()
}

async fn logout(State(b): Shared, headers: HeaderMap, body: String) -> Response {
    b.record("/auth/logout", &headers);
    b.logout_bodies.lock().push(serde_json::from_str(&body).unwrap_or_default());
    Json(json!({ "code": 1000 })).into_response()
}

async fn register(State(b): Shared, headers: HeaderMap) -> Response {
    b.record("/user/register", &headers);
    ok(json!({ "id": "u1", "username": "ada" }))
}

async fn protected(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.check("/protected", &headers) {
        return r;
    }
    ok(json!("ok"))
}

async fn always_unauthorized(State(b): Shared, headers: HeaderMap) -> Response {
    b.record("/always-401", &headers);
    StatusCode::UNAUTHORIZED.into_response()
}

async fn server_error(State(b): Shared, headers: HeaderMap) -> Response {
    b.record("/broken", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn list_conversations(
    State(b): Shared,
    headers: HeaderMap,
    Query(q): Query<std::collections::HashMap<String, String>>,
) -> Response {
    if let Err(r) = b.check("/conversation/list", &headers) {
        return r;
    }
    let page: u32 = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: u32 = q.get("size").and_then(|p| p.parse().ok()).unwrap_or(0);
    ok(json!({
        "currentPage": page, "totalPages": 1, "pageSize": size, "totalElements": 1,
        "hasNextPage": false, "hasPreviousPage": false,
        "result": [{ "id": "c1", "title": "Fees", "userId": "u1" }]
    }))
}

async fn create_conversation(
    State(b): Shared,
    headers: HeaderMap,
    Json(req): Json<serde_json::Value>,
) -> Response {
    if let Err(r) = b.check("/conversation/create", &headers) {
        return r;
    }
    ok(json!({ "id": "c-new", "title": req["title"] }))
}

async fn delete_conversation(
    State(b): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = b.check("/conversation/delete", &headers) {
        return r;
    }
    if id == "missing" {
        return Json(json!({ "code": 1007, "message": "conversation not existed" })).into_response();
    }
    Json(json!({ "code": 1000 })).into_response()
}

async fn generate_title(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.check("/api/chat/generate-title", &headers) {
        return r;
    }
    ok(json!("Contract Fee Review"))
}

async fn list_messages(State(b): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(r) = b.check("/message/list", &headers) {
        return r;
    }
    ok(json!([
        { "id": "m1", "text": "hi", "conversationId": id, "role": "USER" },
        { "id": "m2", "text": "hello", "conversationId": id, "role": "ASSISTANT" }
    ]))
}

async fn stream_create(
    State(b): Shared,
    headers: HeaderMap,
    Json(req): Json<serde_json::Value>,
) -> Response {
    if let Err(r) = b.check("/message/stream-create", &headers) {
        return r;
    }
    b.stream_requests.lock().push(req);
    let chunks: Vec<Bytes> = b.stream_chunks.lock().clone();
    let body = Body::from_stream(futures_util::stream::iter(
        chunks.into_iter().map(Ok::<_, std::io::Error>),
    ));
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn upload(State(b): Shared, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Err(r) = b.check("/documents/upload", &headers) {
        return r;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        b.uploads.lock().push(Upload { field: name, file_name, content_type, len });
    }
    ok(json!({ "id": "d1", "filename": "report.pdf", "status": "PROCESSING" }))
}

async fn my_documents(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.check("/documents/my-documents", &headers) {
        return r;
    }
    ok(json!([{ "id": "d1", "filename": "report.pdf", "fileSize": 42 }]))
}

async fn delete_document(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.check("/documents/delete", &headers) {
        return r;
    }
    (StatusCode::OK, "").into_response()
}

async fn my_info(State(b): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = b.check("/user/my-info", &headers) {
        return r;
    }
    ok(json!({ "id": "u1", "username": "ada", "firstName": "Ada", "email": "ada@example.com" }))
}

async fn update_my_info(
    State(b): Shared,
    headers: HeaderMap,
    Json(req): Json<serde_json::Value>,
) -> Response {
    if let Err(r) = b.check("/user/update-my-info", &headers) {
        return r;
    }
    let mut profile = json!({ "id": "u1", "username": "ada", "firstName": "Ada" });
    if let (Some(dst), Some(src)) = (profile.as_object_mut(), req.as_object()) {
        for (k, v) in src {
            dst.insert(k.clone(), v.clone());
        }
    }
    ok(profile)
}

/// Start the mock backend. Returns it with the API base URL.
pub async fn spawn_backend() -> (Arc<Backend>, String) {
    let backend = Arc::new(Backend::default());
    let api = Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/user/register", post(register))
        .route("/protected", get(protected))
        .route("/always-401", get(always_unauthorized))
        .route("/broken", get(server_error))
        .route("/conversation/list", get(list_conversations))
        .route("/conversation/create", post(create_conversation))
        .route("/conversation/delete/{id}", delete(delete_conversation))
        .route("/api/chat/generate-title", post(generate_title))
        .route("/message/list/{id}", get(list_messages))
        .route("/message/stream-create", post(stream_create))
        .route("/documents/upload", post(upload))
        .route("/documents/my-documents", get(my_documents))
        .route("/documents/{id}", delete(delete_document))
        .route("/user/my-info", get(my_info))
        .route("/user/update-my-info", put(update_my_info))
        .with_state(Arc::clone(&backend));
    let app = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (backend, format!("http://{addr}/api"))
}

/// Client against `base_url` with an in-memory store seeded with `pair`.
pub fn client_with(base_url: &str, pair: Option<(&str, &str)>) -> (ChatClient, Arc<TokenStore>) {
    let store = Arc::new(TokenStore::in_memory());
    if let Some((access, refresh)) = pair {
        store.set(crate::token::CredentialPair::new(access, refresh));
    }
    let client = ChatClient::with_store(ClientConfig::for_url(base_url), Arc::clone(&store));
    (client, store)
}
