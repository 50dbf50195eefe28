//! Scoring of case results and the overall run report.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backend::DocumentId;
use crate::error::{Result, SmokeError};
use crate::verify::CaseResult;

/// Minimum share of passing cases for the run to pass.
pub const PASS_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub success_count: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_results(results: &[CaseResult]) -> Self {
        Self {
            success_count: results.iter().filter(|r| r.outcome.is_pass()).count(),
            total: results.len(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.total as f64
    }

    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }

    /// An empty run never passes.
    pub fn passed(&self) -> bool {
        self.total > 0 && self.success_count as f64 >= self.total as f64 * PASS_THRESHOLD
    }
}

/// Everything observed during one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub backend_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
    pub cases: Vec<CaseResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub passed: bool,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let write = || -> std::io::Result<()> {
            let json = serde_json::to_string_pretty(self)?;
            std::fs::write(path, json)
        };
        write().map_err(|e| SmokeError::Report {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
