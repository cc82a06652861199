//! Failure artifact sink
//!
//! Output-only collaborator: screenshots, HTML snapshots, and error text
//! land under the configured reports directories with timestamped names.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::config::ReportingConfig;
use crate::error::HarnessResult;

#[derive(Debug, Clone)]
pub struct ReportSink {
    screenshots_dir: PathBuf,
    snapshots_dir: PathBuf,
}

impl ReportSink {
    /// Create the sink, making both artifact directories
    pub fn new(reporting: &ReportingConfig) -> HarnessResult<Self> {
        let screenshots_dir = PathBuf::from(&reporting.screenshots_dir);
        let snapshots_dir = PathBuf::from(&reporting.snapshots_dir);
        fs::create_dir_all(&screenshots_dir)?;
        fs::create_dir_all(&snapshots_dir)?;
        Ok(Self {
            screenshots_dir,
            snapshots_dir,
        })
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    /// Timestamped screenshot path for a named step or test
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshots_dir
            .join(format!("{}_{}.png", sanitize(name), timestamp()))
    }

    /// Write error text alongside the screenshots, returning the path
    pub fn save_error(&self, name: &str, message: &str) -> HarnessResult<PathBuf> {
        let path = self
            .screenshots_dir
            .join(format!("{}_{}.error.txt", sanitize(name), timestamp()));
        fs::write(&path, message)?;
        info!(path = %path.display(), "saved error text");
        Ok(path)
    }

    /// Write a page HTML snapshot, returning the path
    pub fn save_html(&self, name: &str, html: &str) -> HarnessResult<PathBuf> {
        let path = self
            .snapshots_dir
            .join(format!("{}_{}.html", sanitize(name), timestamp()));
        fs::write(&path, html)?;
        info!(path = %path.display(), "saved page snapshot");
        Ok(path)
    }
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S_%3f").to_string()
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
