//! Ephemeral mock of the knowledge-base backend for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use teamkb::client::{ApiClient, Navigation, Navigator};
use teamkb::identity::SessionStore;

#[derive(Default)]
pub struct MockBackend {
    /// email -> (name, password)
    pub users: Mutex<HashMap<String, (String, String)>>,
    pub documents: Mutex<Vec<Value>>,
    /// Authorization header of every request, in arrival order.
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub questions: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    /// When set, every protected endpoint answers 401.
    pub expired: AtomicBool,
    /// Delay applied to GET /documents, in milliseconds.
    pub list_delay_ms: AtomicU64,
    pub upload_delay_ms: AtomicU64,
    pub ask_delay_ms: AtomicU64,
    /// Answer a successful registration with 201 and no body.
    pub register_empty_body: AtomicBool,
    /// Answer a successful upload with a plain-text `ok`.
    pub upload_text_body: AtomicBool,
    next_id: AtomicU64,
}

impl MockBackend {
    pub fn add_user(&self, email: &str, name: &str, password: &str) {
        self.users.lock().insert(email.to_string(), (name.to_string(), password.to_string()));
    }

    pub fn list_calls(&self) -> usize { self.list_calls.load(Ordering::SeqCst) }

    pub fn last_auth_header(&self) -> Option<String> { self.auth_headers.lock().last().cloned().flatten() }

    fn record(&self, headers: &HeaderMap) {
        let h = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
        self.auth_headers.lock().push(h);
    }

    pub fn push_document(&self, filename: &str) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let doc = json!({
            "id": id,
            "filename": filename,
            "file_path": format!("uploads/{filename}"),
            "uploaded_at": "2024-05-01T12:30:00.123456",
            "processed": false,
        });
        self.documents.lock().push(doc.clone());
        doc
    }
}

type Shared = Arc<MockBackend>;

async fn delay(ms: &AtomicU64) {
    let ms = ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

fn expired(state: &MockBackend) -> Option<Response> {
    if state.expired.load(Ordering::SeqCst) {
        Some(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    } else {
        None
    }
}

#[derive(Deserialize)]
struct LoginBody { email: String, password: String }

#[derive(Deserialize)]
struct RegisterBody { email: String, name: String, password: String }

#[derive(Deserialize)]
struct AskParams { question: String }

#[derive(Deserialize)]
struct SearchBody { query: String }

async fn login(State(st): State<Shared>, headers: HeaderMap, Json(b): Json<LoginBody>) -> Response {
    st.record(&headers);
    if b.password == "no-detail" {
        return (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response();
    }
    let ok = st.users.lock().get(&b.email).map(|(_, p)| p == &b.password).unwrap_or(false);
    if !ok {
        return detail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    Json(json!({ "access_token": format!("token-{}", b.email), "token_type": "bearer" })).into_response()
}

async fn register(State(st): State<Shared>, headers: HeaderMap, Json(b): Json<RegisterBody>) -> Response {
    st.record(&headers);
    let mut users = st.users.lock();
    if users.contains_key(&b.email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let id = users.len() + 1;
    users.insert(b.email.clone(), (b.name.clone(), b.password));
    if st.register_empty_body.load(Ordering::SeqCst) {
        return StatusCode::CREATED.into_response();
    }
    Json(json!({ "id": id, "email": b.email, "name": b.name })).into_response()
}

async fn list_documents(State(st): State<Shared>, headers: HeaderMap) -> Response {
    st.record(&headers);
    st.list_calls.fetch_add(1, Ordering::SeqCst);
    delay(&st.list_delay_ms).await;
    if let Some(r) = expired(&st) { return r; }
    Json(Value::Array(st.documents.lock().clone())).into_response()
}

async fn get_document(State(st): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    st.record(&headers);
    if let Some(r) = expired(&st) { return r; }
    let found = st.documents.lock().iter().find(|d| d["id"].as_i64() == Some(id)).cloned();
    match found {
        Some(d) => Json(d).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Document not found"),
    }
}

async fn upload(State(st): State<Shared>, headers: HeaderMap, mut form: Multipart) -> Response {
    st.record(&headers);
    if let Some(r) = expired(&st) { return r; }
    while let Ok(Some(field)) = form.next_field().await {
        if field.name() != Some("file") { continue; }
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let _ = field.bytes().await;
        delay(&st.upload_delay_ms).await;
        if filename.starts_with("boom") {
            return detail(StatusCode::INTERNAL_SERVER_ERROR, "disk full");
        }
        let doc = st.push_document(&filename);
        if st.upload_text_body.load(Ordering::SeqCst) {
            return "ok".into_response();
        }
        return Json(doc).into_response();
    }
    detail(StatusCode::UNPROCESSABLE_ENTITY, "file field missing")
}

async fn ask(State(st): State<Shared>, headers: HeaderMap, Query(q): Query<AskParams>) -> Response {
    st.record(&headers);
    if let Some(r) = expired(&st) { return r; }
    st.questions.lock().push(q.question.clone());
    delay(&st.ask_delay_ms).await;
    Json(json!({
        "question": q.question,
        "answer": "30 days",
        "sources": [{ "document": "policy.pdf", "score": 0.92 }],
    }))
    .into_response()
}

async fn search(State(st): State<Shared>, headers: HeaderMap, Json(b): Json<SearchBody>) -> Response {
    st.record(&headers);
    if let Some(r) = expired(&st) { return r; }
    Json(json!({
        "query": b.query,
        "results": [{ "document_id": 1, "text": "Refunds within 30 days.", "score": 0.81, "chunk_index": 0 }],
    }))
    .into_response()
}

pub struct Mock {
    pub base: Url,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl Drop for Mock {
    fn drop(&mut self) { self.handle.abort(); }
}

impl Mock {
    pub fn client(&self, store: Arc<dyn SessionStore>, nav: Arc<Navigation>) -> ApiClient {
        let nav: Arc<dyn Navigator> = nav;
        ApiClient::with_http(&self.base, reqwest::Client::new(), store, nav)
    }
}

pub async fn start_mock() -> Mock {
    let state: Shared = Arc::new(MockBackend::default());
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/documents", get(list_documents))
        .route("/api/documents/{id}", get(get_document))
        .route("/api/upload", post(upload))
        .route("/api/ask", post(ask))
        .route("/api/search", post(search))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock backend error: {e:?}");
        }
    });
    let base = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    Mock { base, state, handle }
}

/// A loopback URL with nothing listening on it.
pub fn dead_url() -> Url {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
}
