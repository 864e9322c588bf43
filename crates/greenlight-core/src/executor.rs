//! Assessment entry point for callers that hand over a loose request
//! payload instead of constructing a driver themselves. The transport that
//! delivers the payload (HTTP, JSON-RPC, a queue) lives outside this crate;
//! the contract here is payload in, run report out.

use crate::driver::{BatchAuditDriver, DriverConfig};
use crate::judge::SignalJudge;
use crate::providers::agent::AgentClient;
use crate::report::RunReport;
use crate::retrieval::ContextRetriever;
use crate::store::AuditRecordStore;
use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Incoming assessment request: named participant endpoints plus a loose
/// config object with driver overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub participants: BTreeMap<String, String>,
    #[serde(default)]
    pub config: Value,
}

impl AssessmentRequest {
    pub fn from_payload(payload: &Value) -> anyhow::Result<Self> {
        serde_json::from_value(payload.clone()).context("malformed assessment payload")
    }

    /// Endpoint of the agent under test. The role key is matched by
    /// substring so "purple", "purple_agent", and "agent_purple" all
    /// resolve; absent that, a sole participant is taken as the candidate.
    pub fn purple_endpoint(&self) -> Option<&str> {
        let matched = self
            .participants
            .iter()
            .find(|(role, _)| role.to_lowercase().contains("purple"))
            .map(|(_, url)| url.as_str());
        match matched {
            Some(url) => Some(url),
            None if self.participants.len() == 1 => {
                self.participants.values().next().map(String::as_str)
            }
            None => None,
        }
    }

    /// Driver config from the request's config object. Unknown keys are
    /// ignored; missing keys keep their defaults.
    pub fn driver_config(&self) -> DriverConfig {
        let mut config = DriverConfig::default();
        if let Some(s) = config_str(&self.config, "dataset") {
            config.dataset = PathBuf::from(s);
        }
        if let Some(s) = config_str(&self.config, "out_jsonl") {
            config.out_jsonl = PathBuf::from(s);
        }
        if let Some(s) = config_str(&self.config, "report") {
            config.report = PathBuf::from(s);
        }
        if let Some(n) = config_u64(&self.config, "start") {
            config.start = n as usize;
        }
        if let Some(n) = config_u64(&self.config, "limit") {
            config.limit = n as usize;
        }
        if let Some(n) = config_u64(&self.config, "retries") {
            config.retries = n as u32;
        }
        if let Some(n) = config_u64(&self.config, "report_interval") {
            config.report_interval = n;
        }
        if let Some(s) = config_str(&self.config, "judge_model") {
            config.judge_model = s.to_string();
        }
        config
    }
}

fn config_str<'a>(config: &'a Value, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn config_u64(config: &Value, key: &str) -> Option<u64> {
    config.get(key).and_then(Value::as_u64)
}

/// Run one full assessment described by `payload`. Builds the driver from
/// the request, runs the batch, and returns the final report; per-item
/// artifacts land in the configured record log.
pub async fn run_assessment(
    payload: &Value,
    retriever: ContextRetriever,
    judge: SignalJudge,
    agent_timeout: Duration,
) -> anyhow::Result<RunReport> {
    let request = AssessmentRequest::from_payload(payload)?;
    let config = request.driver_config();
    let agent = request
        .purple_endpoint()
        .map(|url| AgentClient::new(url.to_string(), agent_timeout));
    if let Some(url) = request.purple_endpoint() {
        tracing::info!(endpoint = url, "auditing live candidate agent");
    } else {
        tracing::info!("no candidate endpoint; auditing recorded answers");
    }

    let driver = BatchAuditDriver {
        store: AuditRecordStore::new(config.out_jsonl.clone()),
        retriever,
        judge,
        agent,
        config,
    };
    driver.run(None).await
}
