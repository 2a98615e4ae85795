use serde::{Deserialize, Serialize};

/// A document as listed by the backend. Display-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    /// ISO-8601 timestamp as sent by the server.
    pub uploaded_at: String,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub document: String,
    /// Relevance in `0..=1`.
    pub score: f64,
}

impl Source {
    /// Score as a whole percentage, e.g. `0.92` -> `92`.
    pub fn percent(&self) -> i64 { (self.score * 100.0).round() as i64 }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    #[serde(default)]
    pub question: Option<String>,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub document_id: i64,
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub chunk_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Registration<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds() {
        let s = |score| Source { document: "d".into(), score };
        assert_eq!(s(0.92).percent(), 92);
        assert_eq!(s(0.926).percent(), 93);
        assert_eq!(s(0.0).percent(), 0);
        assert_eq!(s(1.0).percent(), 100);
        assert_eq!(s(0.004).percent(), 0);
    }

    #[test]
    fn backend_document_shape_parses() {
        let raw = r#"[{"id":3,"filename":"report.pdf","file_path":"uploads/report.pdf","uploaded_at":"2024-05-01T12:30:00.123456","processed":false}]"#;
        let docs: Vec<Document> = serde_json::from_str(raw).unwrap();
        assert_eq!(docs[0].id, 3);
        assert_eq!(docs[0].file_path.as_deref(), Some("uploads/report.pdf"));
        assert!(!docs[0].processed);
    }

    #[test]
    fn answer_without_question_parses() {
        let a: Answer = serde_json::from_str(r#"{"answer":"30 days","sources":[{"document":"policy.pdf","score":0.92}]}"#).unwrap();
        assert_eq!(a.question, None);
        assert_eq!(a.sources.len(), 1);
    }
}
