pub mod console;
pub mod progress;

use crate::driver::DriverConfig;
use crate::model::RunStats;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Point-in-time snapshot of a run: stats plus derived average and run
/// metadata. Overwritten on each checkpoint so a crash mid-run still
/// leaves a usable partial report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub stats: RunStats,
    pub avg_score: f64,
    pub model: String,
    pub dataset: String,
    pub out_jsonl: String,
    pub start: usize,
    pub end: usize,
    pub generated_at: String,
}

impl RunReport {
    pub fn snapshot(stats: &RunStats, config: &DriverConfig, start: usize, end: usize) -> Self {
        RunReport {
            stats: stats.clone(),
            avg_score: stats.avg_score(),
            model: config.judge_model.clone(),
            dataset: config.dataset.display().to_string(),
            out_jsonl: config.out_jsonl.display().to_string(),
            start,
            end,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn write_json(&self, out: &Path) -> anyhow::Result<()> {
        if let Some(parent) = out.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(out, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
