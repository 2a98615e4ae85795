//! Request error model for the knowledge-base HTTP client.
//! Every call on [`crate::client::ApiClient`] fails with a [`RequestError`]; views turn it
//! into inline text through [`RequestError::message`] or [`RequestError::user_message`].

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No response arrived (connect refused, DNS, timeout, reset).
    #[error("Network Error: {message}")]
    Network { message: String },
    #[error("Request failed with status code 401")]
    Unauthorized { detail: Option<String> },
    /// Any 4xx other than 401.
    #[error("Request failed with status code {status}")]
    Validation { status: u16, detail: Option<String> },
    #[error("Request failed with status code {status}")]
    Server { status: u16, detail: Option<String> },
    /// 2xx with a body that does not match the expected shape.
    #[error("Invalid response body: {message}")]
    Decode { message: String },
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

pub type RequestResult<T> = Result<T, RequestError>;

impl RequestError {
    pub fn network<S: Into<String>>(msg: S) -> Self { RequestError::Network { message: msg.into() } }
    pub fn decode<S: Into<String>>(msg: S) -> Self { RequestError::Decode { message: msg.into() } }
    pub fn invalid<S: Into<String>>(msg: S) -> Self { RequestError::InvalidRequest { message: msg.into() } }

    /// Classify a non-2xx response. `body` is the raw response body; a `{"detail": ...}`
    /// payload is picked up when present.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = extract_detail(body);
        match status {
            401 => RequestError::Unauthorized { detail },
            400..=499 => RequestError::Validation { status, detail },
            _ => RequestError::Server { status, detail },
        }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            RequestError::Network { .. } => "network",
            RequestError::Unauthorized { .. } => "unauthorized",
            RequestError::Validation { .. } => "validation",
            RequestError::Server { .. } => "server",
            RequestError::Decode { .. } => "decode",
            RequestError::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// HTTP status of the response, `None` when no response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Unauthorized { .. } => Some(401),
            RequestError::Validation { status, .. } | RequestError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided `detail` text, if the error carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            RequestError::Unauthorized { detail }
            | RequestError::Validation { detail, .. }
            | RequestError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool { matches!(self, RequestError::Unauthorized { .. }) }

    /// Detail text for 4xx responses, otherwise the generic description.
    /// Server failures never leak backend detail.
    pub fn message(&self) -> String {
        match self {
            RequestError::Unauthorized { detail: Some(d) } | RequestError::Validation { detail: Some(d), .. } => d.clone(),
            other => other.to_string(),
        }
    }

    /// Backend detail verbatim when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().map(str::to_string).unwrap_or_else(|| fallback.to_string())
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::decode(err.to_string())
        } else if err.is_builder() {
            RequestError::invalid(err.to_string())
        } else {
            RequestError::network(err.to_string())
        }
    }
}

/// Pull `detail` out of an error payload. Strings are returned as-is; a list of
/// validation entries (`[{"msg": ...}, ...]`) is joined; anything else is ignored.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let v: Value = serde_json::from_slice(body).ok()?;
    match v.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items.iter().filter_map(|it| it.get("msg").and_then(|m| m.as_str())).collect();
            if msgs.is_empty() { None } else { Some(msgs.join("; ")) }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
