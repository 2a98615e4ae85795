use serde::{Deserialize, Serialize};

/// Minimal client-side projection of the logged-in user. A display cache only;
/// the backend stays authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    #[serde(default)]
    pub email: String,
}

impl UserIdentity {
    pub fn new<S: Into<String>>(email: S) -> Self { Self { email: email.into() } }

    /// Parse a stored identity. Malformed JSON is an empty identity, never an error.
    pub fn from_stored(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }
}
