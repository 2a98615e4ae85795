use std::path::{Path, PathBuf};

/// Well-known locations of the persisted session under a session directory.
/// Token and identity live in separate files and are always cleared together.
pub const TOKEN_FILE: &str = "token";
pub const USER_FILE: &str = "user.json";

#[inline]
pub fn token_path(session_dir: &Path) -> PathBuf { session_dir.join(TOKEN_FILE) }

#[inline]
pub fn user_path(session_dir: &Path) -> PathBuf { session_dir.join(USER_FILE) }

#[inline]
pub fn history_path(session_dir: &Path) -> PathBuf { session_dir.join("history.txt") }

/// `$HOME/.teamkb` (or `%USERPROFILE%\.teamkb`), falling back to `./.teamkb`.
pub fn default_session_dir() -> PathBuf {
    let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok();
    match home {
        Some(h) if !h.is_empty() => PathBuf::from(h).join(".teamkb"),
        _ => PathBuf::from(".teamkb"),
    }
}
