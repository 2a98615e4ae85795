//!
//! App shell
//! ---------
//! Wires the session store, HTTP client, auth context and views together.
//!
//! Responsibilities:
//! - Gate the main views behind the auth page.
//! - Own the refresh counter that links a successful upload to exactly one
//!   document-list re-fetch.
//! - Act on the login redirect fired by the authorization guard: re-mount the
//!   auth context from the (now empty) store and drop the main views.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::client::{ApiClient, Navigation, Navigator};
use crate::config::ClientConfig;
use crate::identity::{AuthContext, AuthOutcome, AuthState, SessionStore};
use crate::views::{AskView, AuthMode, AuthPage, DocumentListView, Key, UploadOutcome, UploadView};

pub const APP_TITLE: &str = "KnowledgeBase for Teams";

/// Views that exist only while a user is logged in.
#[derive(Debug, Default)]
struct MainViews {
    upload: UploadView,
    ask: AskView,
    documents: DocumentListView,
}

impl MainViews {
    fn unmount(&self) {
        self.upload.liveness().unmount();
        self.ask.liveness().unmount();
        self.documents.liveness().unmount();
    }
}

pub struct App {
    client: ApiClient,
    auth: AuthContext,
    navigation: Arc<Navigation>,
    auth_page: AuthPage,
    main: Option<MainViews>,
    refresh: u64,
}

impl App {
    pub fn new(cfg: &ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let navigation = Arc::new(Navigation::new());
        let nav: Arc<dyn Navigator> = navigation.clone();
        let client = ApiClient::new(cfg, store.clone(), nav)?;
        Ok(Self::with_client(client, store, navigation))
    }

    pub fn with_client(client: ApiClient, store: Arc<dyn SessionStore>, navigation: Arc<Navigation>) -> Self {
        let auth = AuthContext::new(client.clone(), store);
        Self { client, auth, navigation, auth_page: AuthPage::new(), main: None, refresh: 0 }
    }

    pub fn client(&self) -> &ApiClient { &self.client }
    pub fn auth(&self) -> &AuthContext { &self.auth }
    pub fn navigation(&self) -> &Navigation { &self.navigation }
    pub fn auth_page(&self) -> &AuthPage { &self.auth_page }
    pub fn refresh_counter(&self) -> u64 { self.refresh }

    pub fn documents(&self) -> Option<&DocumentListView> { self.main.as_ref().map(|m| &m.documents) }
    pub fn upload_view(&self) -> Option<&UploadView> { self.main.as_ref().map(|m| &m.upload) }
    pub fn ask_view(&self) -> Option<&AskView> { self.main.as_ref().map(|m| &m.ask) }

    /// Initial mount: resolve auth state and, when logged in, load the main views.
    pub async fn mount(&mut self) -> AuthState {
        let state = self.auth.mount();
        self.sync_views().await;
        state
    }

    /// Apply a pending login redirect. Returns true if one was pending.
    pub fn handle_navigation(&mut self) -> bool {
        if !self.navigation.take_login_redirect() {
            return false;
        }
        info!("session ended by server; returning to login");
        self.auth.mount();
        self.teardown_main();
        true
    }

    fn teardown_main(&mut self) {
        if let Some(m) = self.main.take() {
            m.unmount();
        }
    }

    // Bring the mounted views in line with the auth state.
    async fn sync_views(&mut self) {
        if self.handle_navigation() {
            return;
        }
        if self.auth.user().is_none() {
            self.teardown_main();
            return;
        }
        if self.main.is_none() {
            self.main = Some(MainViews::default());
        }
        if let Some(m) = self.main.as_mut() {
            m.documents.sync(&self.client, self.refresh).await;
        }
        self.handle_navigation();
    }

    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        let outcome = self.auth_page.submit_login(&self.auth, email, password).await;
        self.sync_views().await;
        outcome
    }

    pub async fn register(&mut self, email: &str, name: &str, password: &str) -> AuthOutcome {
        let outcome = self.auth_page.submit_register(&self.auth, email, name, password).await;
        self.sync_views().await;
        outcome
    }

    /// Switch the auth page between login and registration.
    pub fn show_auth(&mut self, mode: AuthMode) -> String {
        self.auth_page.set_mode(mode);
        self.auth_page.render()
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.teardown_main();
        self.auth_page = AuthPage::new();
    }

    /// Select and upload a file. On success the document list re-fetches once.
    pub async fn upload(&mut self, path: PathBuf) -> Option<UploadOutcome> {
        let outcome = {
            let m = self.main.as_mut()?;
            m.upload.select(path);
            m.upload.submit(&self.client).await
        };
        if outcome == UploadOutcome::Uploaded {
            self.refresh += 1;
        }
        self.sync_views().await;
        Some(outcome)
    }

    /// Returns None when nobody is logged in.
    pub async fn ask(&mut self, question: &str) -> Option<bool> {
        let sent = {
            let m = self.main.as_mut()?;
            m.ask.set_input(question);
            m.ask.on_key(Key::Enter, &self.client).await
        };
        self.sync_views().await;
        Some(sent)
    }

    /// Bump the refresh counter, re-fetching the list.
    pub async fn refresh_documents(&mut self) -> bool {
        if self.main.is_none() {
            return false;
        }
        self.refresh += 1;
        self.sync_views().await;
        true
    }

    pub fn render(&self) -> String {
        match (self.auth.state(), &self.main) {
            (AuthState::Loading, _) => "Loading...".to_string(),
            (AuthState::Authenticated(user), Some(m)) => {
                let header = format!(
                    "{APP_TITLE}\nWelcome, {}    (logout)\nUpload and manage your team's documents",
                    user.email
                );
                [header, m.upload.render(), m.ask.render(), m.documents.render()].join("\n\n")
            }
            _ => self.auth_page.render(),
        }
    }
}
