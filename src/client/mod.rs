//!
//! Knowledge-base HTTP client
//! --------------------------
//! Typed wrapper over the `/api` REST surface. Every call goes through
//! [`AuthorizationGuard`]: the bearer token is read from the session store at
//! send time, and a 401 from any endpoint tears the session down and fires the
//! login redirect before the error reaches the caller.

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{RequestError, RequestResult};
use crate::identity::SessionStore;

mod guard;
mod models;
mod navigation;

pub use guard::AuthorizationGuard;
pub use models::{Answer, Document, LoginResponse, SearchHit, SearchResults, Source};
pub use navigation::{Navigation, Navigator};

use models::{Credentials, Registration};

const API_PREFIX: &str = "api/";

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    guard: Arc<AuthorizationGuard>,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig, store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> RequestResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| RequestError::invalid(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http(&cfg.base_url, http, store, navigator))
    }

    pub fn with_http(base: &Url, http: reqwest::Client, store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        // Url::join drops the last path segment unless it ends in '/'
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }
        Self { base, http, guard: Arc::new(AuthorizationGuard::new(store, navigator)) }
    }

    pub fn base(&self) -> &Url { &self.base }

    pub fn guard(&self) -> &AuthorizationGuard { &self.guard }

    fn endpoint(&self, path: &str) -> RequestResult<Url> {
        self.base
            .join(API_PREFIX)
            .and_then(|u| u.join(path))
            .map_err(|e| RequestError::invalid(format!("bad endpoint '{path}': {e}")))
    }

    /// Send one request through the guard. Non-2xx responses become errors.
    async fn send(&self, builder: RequestBuilder) -> RequestResult<Response> {
        let outcome = self.send_inner(builder).await;
        self.guard.inspect(&outcome);
        outcome
    }

    async fn send_inner(&self, builder: RequestBuilder) -> RequestResult<Response> {
        let req = self.guard.authorize(builder.build()?)?;
        let (method, path) = (req.method().clone(), req.url().path().to_string());
        let resp = self.http.execute(req).await.map_err(|e| {
            debug!(%method, %path, error = %e, "request failed without response");
            RequestError::network(e.to_string())
        })?;
        let status = resp.status();
        debug!(%method, %path, status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await.unwrap_or_default();
        Err(RequestError::from_status(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RequestResult<T> {
        let resp = self.send(builder).await?;
        let body = resp.bytes().await.map_err(|e| RequestError::network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| RequestError::decode(e.to_string()))
    }

    /// For calls whose success body is not relied on: any 2xx is success, and the
    /// body is kept only when it parses as JSON.
    async fn send_accepted(&self, builder: RequestBuilder) -> RequestResult<Option<Value>> {
        let resp = self.send(builder).await?;
        let body = resp.bytes().await.map_err(|e| RequestError::network(e.to_string()))?;
        Ok(parse_optional_body(&body))
    }

    fn request(&self, method: Method, path: &str) -> RequestResult<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    pub async fn list_documents(&self) -> RequestResult<Vec<Document>> {
        self.send_json(self.request(Method::GET, "documents")?).await
    }

    pub async fn get_document(&self, id: i64) -> RequestResult<Document> {
        self.send_json(self.request(Method::GET, &format!("documents/{id}"))?).await
    }

    /// Upload a file from disk as multipart field `file`.
    pub async fn upload(&self, path: &Path) -> RequestResult<Option<Value>> {
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .ok_or_else(|| RequestError::invalid(format!("not a file: {}", path.display())))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RequestError::invalid(format!("cannot read {}: {}", path.display(), e)))?;
        self.upload_bytes(&filename, bytes).await
    }

    pub async fn upload_bytes(&self, filename: &str, bytes: Vec<u8>) -> RequestResult<Option<Value>> {
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        self.send_accepted(self.request(Method::POST, "upload")?.multipart(form)).await
    }

    /// `POST /ask?question=<q>`; the question travels in the query string, not the body.
    pub async fn ask(&self, question: &str) -> RequestResult<Answer> {
        let mut url = self.endpoint("ask")?;
        url.set_query(Some(&format!("question={}", urlencoding::encode(question))));
        self.send_json(self.http.post(url)).await
    }

    pub async fn search(&self, query: &str) -> RequestResult<SearchResults> {
        let body = serde_json::json!({ "query": query });
        self.send_json(self.request(Method::POST, "search")?.json(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> RequestResult<LoginResponse> {
        let body = Credentials { email, password };
        self.send_json(self.request(Method::POST, "login")?.json(&body)).await
    }

    pub async fn register(&self, email: &str, name: &str, password: &str) -> RequestResult<Option<Value>> {
        let body = Registration { email, name, password };
        self.send_accepted(self.request(Method::POST, "register")?.json(&body)).await
    }
}

fn parse_optional_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(error = %e, "ignoring non-JSON success body");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let nav: Arc<dyn Navigator> = Arc::new(Navigation::new());
        ApiClient::with_http(&Url::parse(base).unwrap(), reqwest::Client::new(), store, nav)
    }

    #[test]
    fn endpoints_keep_base_path() {
        let c = client("http://127.0.0.1:8000");
        assert_eq!(c.endpoint("documents").unwrap().as_str(), "http://127.0.0.1:8000/api/documents");
        let c = client("https://kb.example.com/teams");
        assert_eq!(c.endpoint("documents/7").unwrap().as_str(), "https://kb.example.com/teams/api/documents/7");
    }

    #[test]
    fn optional_body_tolerates_empty_and_text() {
        assert_eq!(parse_optional_body(b""), None);
        assert_eq!(parse_optional_body(b"  \n"), None);
        assert_eq!(parse_optional_body(b"ok"), None);
        assert_eq!(parse_optional_body(br#"{"id":1}"#), Some(serde_json::json!({"id": 1})));
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let c = client(&format!("http://127.0.0.1:{port}"));
        let err = c.list_documents().await.unwrap_err();
        assert_eq!(err.code_str(), "network");
    }
}
