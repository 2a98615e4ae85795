//! Terminal renditions of the app's views. Each view owns its display state,
//! triggers requests through [`crate::client::ApiClient`], and renders to text.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod ask;
mod auth_page;
mod documents;
mod upload;

pub use ask::{source_tag, AskView, Key};
pub use auth_page::{AuthMode, AuthPage};
pub use documents::{format_uploaded_at, DocumentListView, ListState};
pub use upload::{UploadOutcome, UploadView};

/// Mount flag shared between a view and whoever may tear it down. A request that
/// completes after `unmount` must not write into the view.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self { Self(Arc::new(AtomicBool::new(true))) }
}

impl Liveness {
    pub fn new() -> Self { Self::default() }
    pub fn unmount(&self) { self.0.store(false, Ordering::Release); }
    pub fn is_alive(&self) -> bool { self.0.load(Ordering::Acquire) }
}
