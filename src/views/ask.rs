use tracing::warn;

use crate::client::{Answer, ApiClient, Source};

use super::Liveness;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Backspace,
}

/// Question box with the last answer and its cited sources.
#[derive(Debug, Default)]
pub struct AskView {
    input: String,
    loading: bool,
    answer: Option<Answer>,
    error: Option<String>,
    liveness: Liveness,
}

impl AskView {
    pub fn new() -> Self { Self::default() }

    pub fn liveness(&self) -> Liveness { self.liveness.clone() }

    pub fn set_input<S: Into<String>>(&mut self, text: S) { self.input = text.into(); }
    pub fn input(&self) -> &str { &self.input }
    pub fn answer(&self) -> Option<&Answer> { self.answer.as_ref() }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }
    pub fn is_loading(&self) -> bool { self.loading }

    pub fn can_submit(&self) -> bool { !self.loading && !self.input.trim().is_empty() }

    /// Typing edits the input; Enter submits. Returns true if a request was sent.
    pub async fn on_key(&mut self, key: Key, client: &ApiClient) -> bool {
        match key {
            Key::Enter => self.submit(client).await,
            Key::Char(c) => {
                self.input.push(c);
                false
            }
            Key::Backspace => {
                self.input.pop();
                false
            }
        }
    }

    /// Returns true if a request was sent.
    pub async fn submit(&mut self, client: &ApiClient) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.loading = true;
        self.error = None;
        let res = client.ask(&self.input).await;
        if !self.liveness.is_alive() {
            return true;
        }
        self.loading = false;
        match res {
            Ok(a) => self.answer = Some(a),
            Err(e) => {
                warn!(error = %e, "ask failed");
                self.error = Some(format!("Failed to get an answer: {}", e.message()));
            }
        }
        true
    }

    pub fn render(&self) -> String {
        let mut out = vec!["Ask a Question".to_string()];
        out.push(format!("  > {}", self.input));
        if self.loading {
            out.push("  Thinking...".to_string());
        }
        if let Some(err) = &self.error {
            out.push(format!("  [error] {}", err));
        }
        if let Some(a) = &self.answer {
            out.push("Answer:".to_string());
            out.push(a.answer.clone());
            out.push("Sources:".to_string());
            let tags: Vec<String> = a.sources.iter().map(source_tag).collect();
            out.push(format!("  {}", tags.join("  ")));
        }
        out.join("\n")
    }
}

/// `policy.pdf (92%)`
pub fn source_tag(s: &Source) -> String { format!("{} ({}%)", s.document, s.percent()) }
