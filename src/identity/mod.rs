//! Client-side identity: the persisted session and the auth state built on it.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod context;

pub use principal::UserIdentity;
pub use session::{Session, SessionToken, SessionStore, MemorySessionStore, FileSessionStore};
pub use context::{AuthContext, AuthState, AuthOutcome, LOGIN_FAILED, REGISTRATION_FAILED};
