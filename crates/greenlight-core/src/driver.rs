//! Resumable batch audit driver.
//!
//! Iterates the dataset strictly sequentially: one item's agent call,
//! retrieval, and judge call finish before the next item starts. That
//! bounds load on the external services and keeps the append-only log free
//! of concurrent writers. Per-item failures become error records and the
//! batch continues; only a structurally broken dataset aborts the run.

use crate::dataset;
use crate::errors::AuditError;
use crate::judge::SignalJudge;
use crate::model::{AuditRecord, DatasetItem, RunStats};
use crate::providers::agent::AgentClient;
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::report::{console, RunReport};
use crate::retrieval::ContextRetriever;
use crate::store::AuditRecordStore;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub dataset: PathBuf,
    pub out_jsonl: PathBuf,
    pub report: PathBuf,
    /// First dataset index to process.
    pub start: usize,
    /// Number of items to process; 0 means all.
    pub limit: usize,
    /// Judge retries per item after the first attempt.
    pub retries: u32,
    /// Backoff base between judge attempts; attempt n sleeps base × n.
    pub retry_backoff: Duration,
    /// Optional fixed per-item delay to throttle judge/agent call rate.
    pub item_delay: Duration,
    /// Snapshot the report after every this many scored items.
    pub report_interval: u64,
    /// Judge model identifier, recorded in the report. Opaque to the core.
    pub judge_model: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/dataset.json"),
            out_jsonl: PathBuf::from("output/audit_results.jsonl"),
            report: PathBuf::from("output/final_audit_report.json"),
            start: 0,
            limit: 0,
            retries: 2,
            retry_backoff: Duration::from_millis(1500),
            item_delay: Duration::ZERO,
            report_interval: 200,
            judge_model: String::new(),
        }
    }
}

pub struct BatchAuditDriver {
    pub store: AuditRecordStore,
    pub retriever: ContextRetriever,
    pub judge: SignalJudge,
    /// Live candidate agent; when absent the recorded dataset answer is used.
    pub agent: Option<AgentClient>,
    pub config: DriverConfig,
}

impl BatchAuditDriver {
    /// Run the audit over the configured dataset range. Resumes from the
    /// existing record log: ids already present are skipped with no side
    /// effects, so each item is effectively processed at most once across
    /// restarts.
    pub async fn run(&self, progress: Option<ProgressSink>) -> anyhow::Result<RunReport> {
        let items = dataset::load_dataset(&self.config.dataset)?;
        let total_n = items.len();
        let start = self.config.start.min(total_n);
        let end = if self.config.limit == 0 {
            total_n
        } else {
            (start + self.config.limit).min(total_n)
        };

        let mut done_ids = self.store.read_done_ids()?;
        tracing::info!(
            dataset = %self.config.dataset.display(),
            range = ?(start..end),
            already_done = done_ids.len(),
            "starting audit run"
        );

        let mut stats = RunStats::default();
        let range_total = end - start;

        for (pos, item) in items[start..end].iter().enumerate() {
            if done_ids.contains(&item.id) {
                stats.record_skip();
            } else {
                let scored = self.audit_item(item, &mut stats).await?;
                done_ids.insert(item.id.clone());

                if scored
                    && self.config.report_interval > 0
                    && stats.total % self.config.report_interval == 0
                {
                    console::print_running_counts(&stats);
                    self.write_report(&stats, start, end)?;
                }
                if !self.config.item_delay.is_zero() {
                    tokio::time::sleep(self.config.item_delay).await;
                }
            }

            if let Some(ref sink) = progress {
                sink(ProgressEvent {
                    done: pos + 1,
                    total: range_total,
                });
            }
        }

        let report = self.write_report(&stats, start, end)?;
        console::print_summary(&stats);
        tracing::info!(
            green = stats.green,
            yellow = stats.yellow,
            red = stats.red,
            errors = stats.errors,
            skipped = stats.skipped_done,
            "audit run complete"
        );
        Ok(report)
    }

    /// Audit one item end to end. Returns true when the item was scored,
    /// false when it was recorded as an error. Only store I/O failures
    /// propagate; everything upstream becomes an error record.
    async fn audit_item(&self, item: &DatasetItem, stats: &mut RunStats) -> anyhow::Result<bool> {
        // Candidate answer: live agent when configured, recorded field
        // otherwise. An empty answer is an error outcome, never scored.
        let answer = match &self.agent {
            Some(agent) => match agent.ask(&item.question).await {
                Ok(answer) => answer,
                Err(e) => {
                    return self.record_item_error(item, "", Vec::new(), &e, stats);
                }
            },
            None => item.answer.clone().unwrap_or_default(),
        };
        if answer.trim().is_empty() {
            let e = AuditError::AgentCall("empty answer from candidate agent".into());
            return self.record_item_error(item, "", Vec::new(), &e, stats);
        }

        // Ground truth is retrieved fresh per item, never cached across
        // runs: its independence from the candidate's own retrieval is what
        // the audit rests on.
        let context = match self.retriever.retrieve(&item.question, None).await {
            Ok(context) => context,
            Err(e) => {
                return self.record_item_error(item, &answer, Vec::new(), &e, stats);
            }
        };

        let mut last_err: Option<anyhow::Error> = None;
        let mut outcome = None;
        for attempt in 0..=self.config.retries {
            match self
                .judge
                .evaluate_signal(&item.question, &answer, &context)
                .await
            {
                Ok(o) => {
                    outcome = Some(o);
                    break;
                }
                Err(e) => {
                    tracing::warn!(id = %item.id, attempt, error = %e, "judge attempt failed");
                    last_err = Some(e);
                    if attempt < self.config.retries {
                        tokio::time::sleep(self.config.retry_backoff * (attempt + 1)).await;
                    }
                }
            }
        }

        match outcome {
            Some(o) => {
                stats.record_verdict(&o.verdict);
                let record = AuditRecord::scored(
                    &item.id,
                    &item.question,
                    &answer,
                    context,
                    &o.verdict,
                    o.raw,
                );
                self.store.append(&record)?;
                console::print_item(&item.id, &o.verdict);
                Ok(true)
            }
            None => {
                // Keep the typed kind from the last attempt so transport
                // failures are not persisted as parse failures.
                let e = match last_err {
                    Some(err) => err
                        .downcast::<AuditError>()
                        .unwrap_or_else(|other| AuditError::JudgeCall(other.to_string())),
                    None => AuditError::JudgeCall("judge failed".into()),
                };
                self.record_item_error(item, &answer, context, &e, stats)
            }
        }
    }

    fn record_item_error(
        &self,
        item: &DatasetItem,
        answer: &str,
        context: Vec<String>,
        error: &AuditError,
        stats: &mut RunStats,
    ) -> anyhow::Result<bool> {
        stats.record_error();
        let record = AuditRecord::errored(
            &item.id,
            &item.question,
            answer,
            context,
            error.kind_str(),
            &error.to_string(),
        );
        self.store.append(&record)?;
        console::print_item_error(&item.id, &error.to_string());
        Ok(false)
    }

    fn write_report(&self, stats: &RunStats, start: usize, end: usize) -> anyhow::Result<RunReport> {
        let report = RunReport::snapshot(stats, &self.config, start, end);
        report.write_json(&self.config.report)?;
        Ok(report)
    }
}
