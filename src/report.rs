use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::PublicAppConfig;
use crate::enrichment::EnrichmentStats;
use crate::errors::AppResult;

/// Summary of one run, written next to the output when requested.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: PublicAppConfig,
    pub stats: EnrichmentStats,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        input: &Path,
        output: &Path,
        config: PublicAppConfig,
        stats: EnrichmentStats,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            started_at,
            finished_at: Utc::now(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            config,
            stats,
        }
    }

    pub fn persist(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }
}
