use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::system_paths::{token_path, user_path};
use crate::tprintln;

use super::principal::UserIdentity;

pub type SessionToken = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user: UserIdentity,
}

impl Session {
    pub fn new<S: Into<String>>(token: S, user: UserIdentity) -> Self { Self { token: token.into(), user } }
}

/// Persistence for the single active session. Token and identity are written
/// and removed together.
pub trait SessionStore: Send + Sync {
    /// Overwrites any prior session.
    fn save(&self, session: &Session) -> Result<()>;
    /// `None` when no token is stored. A malformed identity loads as empty.
    fn load(&self) -> Option<Session>;
    /// Idempotent.
    fn clear(&self);

    fn token(&self) -> Option<SessionToken> { self.load().map(|s| s.token) }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    // (token, raw identity json)
    entries: RwLock<Option<(String, String)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self { Self::default() }

    /// Seed raw entries as they would sit in storage, bypassing `save`.
    pub fn with_raw(token: &str, user_json: &str) -> Self {
        Self { entries: RwLock::new(Some((token.to_string(), user_json.to_string()))) }
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        *self.entries.write() = Some((session.token.clone(), user));
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        let g = self.entries.read();
        let (token, user) = g.as_ref()?;
        if token.is_empty() { return None; }
        Some(Session::new(token.clone(), UserIdentity::from_stored(user)))
    }

    fn clear(&self) { *self.entries.write() = None; }

    fn token(&self) -> Option<SessionToken> {
        self.entries.read().as_ref().map(|(t, _)| t.clone()).filter(|t| !t.is_empty())
    }
}

/// Session persisted as two files (`token`, `user.json`) under a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create session directory {}", self.dir.display()))?;
        let user = serde_json::to_string(&session.user)?;
        write_private(&token_path(&self.dir), &session.token)?;
        write_private(&user_path(&self.dir), &user)?;
        tprintln!("session.save dir={} user={}", self.dir.display(), session.user.email);
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        let token = self.token()?;
        let user = fs::read_to_string(user_path(&self.dir)).unwrap_or_default();
        Some(Session::new(token, UserIdentity::from_stored(&user)))
    }

    fn clear(&self) {
        for p in [token_path(&self.dir), user_path(&self.dir)] {
            match fs::remove_file(&p) {
                Ok(()) => debug!(path = %p.display(), "session file removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to remove session file {}: {}", p.display(), e),
            }
        }
    }

    fn token(&self) -> Option<SessionToken> {
        let raw = fs::read_to_string(token_path(&self.dir)).ok()?;
        // verbatim apart from a trailing line ending added by hand edits
        let t = raw.strip_suffix('\n').map(|t| t.strip_suffix('\r').unwrap_or(t)).unwrap_or(&raw);
        if t.is_empty() { None } else { Some(t.to_string()) }
    }
}

fn write_private(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            warn!("could not restrict permissions on {}: {}", path.display(), e);
        }
    }
    Ok(())
}
