//! Client configuration read from the environment. Command-line flags in the binary
//! override whatever is loaded here.

use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin; the `/api` prefix is appended by the client.
    pub base_url: Url,
    pub session_dir: PathBuf,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, session_dir: PathBuf) -> Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("invalid API base URL: {}", base_url))?;
        Ok(Self { base_url, session_dir, timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) })
    }

    /// `TEAMKB_API_URL`, `TEAMKB_SESSION_DIR`, `TEAMKB_TIMEOUT_SECS`.
    /// An unparseable URL or timeout falls back to its default with a warning, so a
    /// bad environment never blocks a command-line override.
    pub fn from_env() -> Result<Self> {
        let default_url = Url::parse(DEFAULT_API_URL).context("invalid built-in API URL")?;
        let base_url: Url = try_load("TEAMKB_API_URL", default_url);
        let session_dir = env::var("TEAMKB_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::system_paths::default_session_dir());
        let secs: u64 = try_load("TEAMKB_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        Ok(Self { base_url, session_dir, timeout: Duration::from_secs(secs) })
    }

    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        self.base_url = Url::parse(base).with_context(|| format!("invalid API base URL: {}", base))?;
        Ok(self)
    }

    pub fn with_session_dir(mut self, dir: PathBuf) -> Self {
        self.session_dir = dir;
        self
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}; using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
