use crate::identity::{AuthContext, AuthOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Login/registration page shown whenever nobody is logged in.
#[derive(Debug, Default)]
pub struct AuthPage {
    mode: AuthMode,
    error: Option<String>,
    busy: bool,
}

impl AuthPage {
    pub fn new() -> Self { Self::default() }

    pub fn mode(&self) -> AuthMode { self.mode }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
    }

    pub async fn submit_login(&mut self, auth: &AuthContext, email: &str, password: &str) -> AuthOutcome {
        self.set_mode(AuthMode::Login);
        if email.trim().is_empty() || password.is_empty() {
            return self.finish(AuthOutcome::Failure("Email and password are required".to_string()));
        }
        self.busy = true;
        let outcome = auth.login(email.trim(), password).await;
        self.finish(outcome)
    }

    pub async fn submit_register(&mut self, auth: &AuthContext, email: &str, name: &str, password: &str) -> AuthOutcome {
        self.set_mode(AuthMode::Register);
        if email.trim().is_empty() || name.trim().is_empty() || password.is_empty() {
            return self.finish(AuthOutcome::Failure("Email, name and password are required".to_string()));
        }
        self.busy = true;
        let outcome = auth.register(email.trim(), name.trim(), password).await;
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: AuthOutcome) -> AuthOutcome {
        self.busy = false;
        self.error = outcome.error().map(str::to_string);
        outcome
    }

    pub fn render(&self) -> String {
        let (title, usage, other) = match self.mode {
            AuthMode::Login => ("Login", "login <email> <password>", "register <email> <name> <password>"),
            AuthMode::Register => ("Register", "register <email> <name> <password>", "login <email> <password>"),
        };
        let mut out = vec![format!("KnowledgeBase for Teams - {}", title), format!("  {}", usage)];
        if self.busy {
            out.push("  Please wait...".to_string());
        }
        if let Some(err) = &self.error {
            out.push(format!("  [error] {}", err));
        }
        out.push(format!("  or: {}", other));
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_mode_clears_error() {
        let mut p = AuthPage::new();
        p.error = Some("Invalid credentials".into());
        p.set_mode(AuthMode::Register);
        assert_eq!(p.mode(), AuthMode::Register);
        assert!(p.error().is_none());
        assert!(p.render().contains("Register"));
    }
}
