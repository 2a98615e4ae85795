use std::path::{Path, PathBuf};

use tracing::info;

use crate::client::ApiClient;

use super::Liveness;

pub const NO_FILE_SELECTED: &str = "Please select a file first";
pub const UPLOAD_OK: &str = "File uploaded successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Server accepted the file; dependent views should refresh.
    Uploaded,
    /// Nothing was sent (no selection or already uploading).
    Skipped,
    Failed,
    /// Finished after the view was unmounted; result dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct UploadView {
    selected: Option<PathBuf>,
    uploading: bool,
    message: String,
    liveness: Liveness,
}

impl UploadView {
    pub fn new() -> Self { Self::default() }

    pub fn liveness(&self) -> Liveness { self.liveness.clone() }

    pub fn select<P: Into<PathBuf>>(&mut self, path: P) {
        self.selected = Some(path.into());
        self.message.clear();
    }

    pub fn selected(&self) -> Option<&Path> { self.selected.as_deref() }
    pub fn message(&self) -> &str { &self.message }
    pub fn is_uploading(&self) -> bool { self.uploading }
    pub fn can_submit(&self) -> bool { !self.uploading && self.selected.is_some() }

    pub async fn submit(&mut self, client: &ApiClient) -> UploadOutcome {
        if self.uploading {
            return UploadOutcome::Skipped;
        }
        let Some(path) = self.selected.clone() else {
            self.message = NO_FILE_SELECTED.to_string();
            return UploadOutcome::Skipped;
        };
        self.uploading = true;
        self.message.clear();

        let res = client.upload(&path).await;
        if !self.liveness.is_alive() {
            return UploadOutcome::Stale;
        }
        self.uploading = false;
        match res {
            Ok(_) => {
                info!(file = %path.display(), "uploaded");
                self.message = UPLOAD_OK.to_string();
                self.selected = None;
                UploadOutcome::Uploaded
            }
            Err(e) => {
                self.message = format!("Failed to Upload File: {}", e.message());
                UploadOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = vec!["Upload Document".to_string()];
        match &self.selected {
            Some(p) => out.push(format!("  selected: {}", p.display())),
            None => out.push("  no file selected".to_string()),
        }
        if self.uploading {
            out.push("  Uploading...".to_string());
        }
        if !self.message.is_empty() {
            let tag = if self.message.contains("success") { "ok" } else { "error" };
            out.push(format!("  [{}] {}", tag, self.message));
        }
        out.join("\n")
    }
}
