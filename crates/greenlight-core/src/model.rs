use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Three-valued traffic-light verdict. The only signal values the audit log
/// may ever contain; anything else coerces to `Yellow` at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Green,
    Yellow,
    Red,
}

impl Signal {
    pub fn parse(s: &str) -> Option<Signal> {
        match s.trim().to_uppercase().as_str() {
            "GREEN" => Some(Signal::Green),
            "YELLOW" => Some(Signal::Yellow),
            "RED" => Some(Signal::Red),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Green => "GREEN",
            Signal::Yellow => "YELLOW",
            Signal::Red => "RED",
        }
    }
}

/// Structured verdict produced by the judge for one audited answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub signal: Signal,
    pub reason: String,
    pub score: f64,
}

impl Verdict {
    /// Ingest a loosely-shaped judge JSON object into a well-formed verdict.
    ///
    /// Judge uncertainty defaults to caution: unknown or missing signal
    /// becomes YELLOW, missing score becomes 0.5, and the score is clamped
    /// to [0, 1]. The `verdict` key is accepted as a legacy alias for
    /// `signal`.
    pub fn from_json(value: &Value) -> Verdict {
        let raw_signal = ["signal", "verdict"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty());
        let signal = raw_signal
            .and_then(Signal::parse)
            .unwrap_or(Signal::Yellow);

        let score = value
            .get("score")
            .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
            .unwrap_or(0.5)
            .clamp(0.0, 1.0);

        let reason = value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        Verdict {
            signal,
            reason,
            score,
        }
    }
}

/// One evaluation unit, normalized from a loose dataset row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetItem {
    pub id: String,
    pub question: String,
    /// Pre-recorded answer, used when no live candidate agent is configured.
    pub answer: Option<String>,
    /// The original row, kept for traceability.
    pub raw: Value,
}

/// Persisted outcome for one dataset item. Appended once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Signal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Raw judge output, sanitized by the store before writing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_judge: Option<Value>,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ground_truth_context: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub created_at: String,
}

impl AuditRecord {
    pub fn scored(
        id: &str,
        question: &str,
        answer: &str,
        context: Vec<String>,
        verdict: &Verdict,
        raw_judge: Value,
    ) -> AuditRecord {
        AuditRecord {
            id: id.to_string(),
            signal: Some(verdict.signal),
            score: Some(verdict.score),
            reason: Some(verdict.reason.clone()),
            raw_judge: Some(raw_judge),
            question: question.to_string(),
            answer: answer.to_string(),
            ground_truth_context: context,
            error: None,
            error_kind: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn errored(
        id: &str,
        question: &str,
        answer: &str,
        context: Vec<String>,
        error_kind: &str,
        error: &str,
    ) -> AuditRecord {
        AuditRecord {
            id: id.to_string(),
            signal: None,
            score: None,
            reason: None,
            raw_judge: None,
            question: question.to_string(),
            answer: answer.to_string(),
            ground_truth_context: context,
            error: Some(error.to_string()),
            error_kind: Some(error_kind.to_string()),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Running aggregate counters for one batch run.
///
/// Owned and mutated only by the driver's control loop, snapshotted into the
/// report; never ambient process state. Recomputable by replaying the log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Items that received a verdict (errors excluded).
    pub total: u64,
    pub green: u64,
    pub yellow: u64,
    pub red: u64,
    pub errors: u64,
    pub skipped_done: u64,
    pub score_sum: f64,
    pub score_count: u64,
}

impl RunStats {
    pub fn record_verdict(&mut self, verdict: &Verdict) {
        self.total += 1;
        self.score_sum += verdict.score;
        self.score_count += 1;
        match verdict.signal {
            Signal::Green => self.green += 1,
            Signal::Yellow => self.yellow += 1,
            Signal::Red => self.red += 1,
        }
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_done += 1;
    }

    pub fn avg_score(&self) -> f64 {
        if self.score_count == 0 {
            0.0
        } else {
            self.score_sum / self.score_count as f64
        }
    }
}

/// Provider-boundary response from the judge model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}
