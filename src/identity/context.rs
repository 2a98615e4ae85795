use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::tprintln;

use super::principal::UserIdentity;
use super::session::{Session, SessionStore};

pub const LOGIN_FAILED: &str = "Login Failed";
pub const REGISTRATION_FAILED: &str = "Registration Failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Anonymous,
    Authenticated(UserIdentity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool { matches!(self, AuthOutcome::Success) }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Failure(m) => Some(m.as_str()),
            AuthOutcome::Success => None,
        }
    }
}

/// Single source of truth for who is logged in. State is written only by
/// `mount`, `login`, `register` and `logout`.
pub struct AuthContext {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    state: RwLock<AuthState>,
}

impl AuthContext {
    pub fn new(client: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { client, store, state: RwLock::new(AuthState::Loading) }
    }

    /// Derive state from the store: cached identity if a token is present, else anonymous.
    /// Re-running it after the store was cleared behind our back restores consistency.
    pub fn mount(&self) -> AuthState {
        let next = match self.store.load() {
            Some(s) => AuthState::Authenticated(s.user),
            None => AuthState::Anonymous,
        };
        tprintln!("auth.mount state={:?}", next);
        *self.state.write() = next.clone();
        next
    }

    pub fn state(&self) -> AuthState { self.state.read().clone() }

    pub fn user(&self) -> Option<UserIdentity> {
        match &*self.state.read() {
            AuthState::Authenticated(u) => Some(u.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool { matches!(*self.state.read(), AuthState::Loading) }

    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let resp = match self.client.login(email, password).await {
            Ok(r) => r,
            Err(e) => {
                info!(email, error = %e, "login rejected");
                return AuthOutcome::Failure(e.user_message(LOGIN_FAILED));
            }
        };
        if resp.access_token.is_empty() {
            warn!(email, "login response carried an empty access token");
            return AuthOutcome::Failure(LOGIN_FAILED.to_string());
        }
        // only the email is kept; the password never touches the store
        let user = UserIdentity::new(email);
        if let Err(e) = self.store.save(&Session::new(resp.access_token, user.clone())) {
            warn!("failed to persist session: {:#}", e);
            self.store.clear();
            return AuthOutcome::Failure(LOGIN_FAILED.to_string());
        }
        *self.state.write() = AuthState::Authenticated(user);
        info!(email, "logged in");
        AuthOutcome::Success
    }

    /// Register, then log in with the same credentials. No retry on failure.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> AuthOutcome {
        if let Err(e) = self.client.register(email, name, password).await {
            info!(email, error = %e, "registration rejected");
            return AuthOutcome::Failure(e.user_message(REGISTRATION_FAILED));
        }
        info!(email, "registered");
        self.login(email, password).await
    }

    /// Idempotent.
    pub fn logout(&self) {
        self.store.clear();
        *self.state.write() = AuthState::Anonymous;
        info!("logged out");
    }
}
