use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hook fired when the client must send the user back to the login entry point.
pub trait Navigator: Send + Sync {
    fn navigate_to_login(&self);
}

/// Navigator that records a pending login redirect for the app shell to act on.
#[derive(Debug, Default)]
pub struct Navigation {
    pending_login: AtomicBool,
    redirects: AtomicUsize,
}

impl Navigation {
    pub fn new() -> Self { Self::default() }

    /// Consume a pending redirect; true at most once per redirect burst.
    pub fn take_login_redirect(&self) -> bool { self.pending_login.swap(false, Ordering::AcqRel) }

    pub fn has_pending_redirect(&self) -> bool { self.pending_login.load(Ordering::Acquire) }

    /// Total redirects fired since creation.
    pub fn redirect_count(&self) -> usize { self.redirects.load(Ordering::Acquire) }
}

impl Navigator for Navigation {
    fn navigate_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::AcqRel);
        self.pending_login.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_consumed_once() {
        let nav = Navigation::new();
        assert!(!nav.take_login_redirect());
        nav.navigate_to_login();
        nav.navigate_to_login();
        assert!(nav.has_pending_redirect());
        assert!(nav.take_login_redirect());
        assert!(!nav.take_login_redirect());
        assert_eq!(nav.redirect_count(), 2);
    }
}
