use chrono::{DateTime, Local, NaiveDateTime};

use crate::cli::outputformatter::render_table;
use crate::client::{ApiClient, Document};

use super::Liveness;

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Loaded(Vec<Document>),
    Failed(String),
}

/// Document listing. Fetches on first sync and again whenever the refresh
/// counter handed in by the parent changes; each fetch replaces the list.
#[derive(Debug)]
pub struct DocumentListView {
    state: ListState,
    seen: Option<u64>,
    fetches: usize,
    liveness: Liveness,
}

impl Default for DocumentListView {
    fn default() -> Self { Self { state: ListState::Loading, seen: None, fetches: 0, liveness: Liveness::new() } }
}

impl DocumentListView {
    pub fn new() -> Self { Self::default() }

    pub fn liveness(&self) -> Liveness { self.liveness.clone() }
    pub fn state(&self) -> &ListState { &self.state }

    /// Number of list requests issued by this view.
    pub fn fetch_count(&self) -> usize { self.fetches }

    /// Fetch if this is the first sync or `refresh` moved. Returns whether a fetch ran.
    pub async fn sync(&mut self, client: &ApiClient, refresh: u64) -> bool {
        if self.seen == Some(refresh) {
            return false;
        }
        self.seen = Some(refresh);
        self.fetch(client).await;
        true
    }

    async fn fetch(&mut self, client: &ApiClient) {
        self.state = ListState::Loading;
        self.fetches += 1;
        let res = client.list_documents().await;
        if !self.liveness.is_alive() {
            return;
        }
        self.state = match res {
            Ok(docs) => ListState::Loaded(docs),
            Err(e) => ListState::Failed(format!("Failed to load documents: {}", e.message())),
        };
    }

    pub fn render(&self) -> String {
        match &self.state {
            ListState::Loading => "Loading documents...".to_string(),
            ListState::Failed(msg) => msg.clone(),
            ListState::Loaded(docs) if docs.is_empty() => {
                "Uploaded Documents\nNo documents uploaded yet".to_string()
            }
            ListState::Loaded(docs) => {
                let rows: Vec<Vec<String>> = docs
                    .iter()
                    .map(|d| {
                        vec![
                            d.id.to_string(),
                            d.filename.clone(),
                            format_uploaded_at(&d.uploaded_at),
                            if d.processed { "Processed" } else { "Pending" }.to_string(),
                        ]
                    })
                    .collect();
                format!(
                    "Uploaded Documents\n{}",
                    render_table(&["ID", "FileName", "Uploaded At", "Status"], &rows)
                )
            }
        }
    }
}

/// Offset timestamps are shown in local time; naive ones as sent; anything else raw.
pub fn format_uploaded_at(raw: &str) -> String {
    const FMT: &str = "%Y-%m-%d %H:%M:%S";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(FMT).to_string();
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ndt.format(FMT).to_string();
    }
    raw.to_string()
}
