//! Cross-cutting request policy: bearer augmentation on the way out and the
//! 401 teardown on the way back. Every call on `ApiClient` passes through here.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use tracing::{debug, warn};

use crate::error::{RequestError, RequestResult};
use crate::identity::SessionStore;

use super::navigation::Navigator;

pub struct AuthorizationGuard {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthorizationGuard {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// `Bearer <token>` for the token stored right now, if any.
    pub fn bearer(&self) -> Option<String> {
        self.store.token().map(|t| format!("Bearer {}", t))
    }

    /// Attach the current token. The store is read at call time so a logout that
    /// happened after the request was prepared is honoured.
    pub fn authorize(&self, mut req: Request) -> RequestResult<Request> {
        match self.bearer() {
            Some(b) => {
                let value = HeaderValue::from_str(&b)
                    .map_err(|_| RequestError::invalid("stored token is not a valid header value"))?;
                req.headers_mut().insert(AUTHORIZATION, value);
            }
            None => {
                req.headers_mut().remove(AUTHORIZATION);
            }
        }
        Ok(req)
    }

    /// Inspect a completed call. A 401 clears the session and fires the login
    /// redirect; anything else, including a failure with no response, passes through.
    pub fn inspect<T>(&self, outcome: &RequestResult<T>) {
        match outcome {
            Err(RequestError::Unauthorized { detail }) => {
                warn!(detail = detail.as_deref().unwrap_or(""), "authorization failure; clearing session");
                self.store.clear();
                self.navigator.navigate_to_login();
            }
            Err(RequestError::Network { message }) => debug!(%message, "no response received"),
            _ => {}
        }
    }
}
