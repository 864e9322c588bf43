use crate::errors::AuditError;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

/// Response fields checked, in order, for the candidate agent's answer.
const ANSWER_FIELDS: [&str; 3] = ["answer", "response", "output"];

/// HTTP client for the agent under test ("Purple Agent").
///
/// Protocol: POST `{"query": <question>}` to the configured endpoint; the
/// answer is taken from the first conventional field present, or the whole
/// body stringified as a last resort.
pub struct AgentClient {
    pub endpoint: String,
    pub timeout: Duration,
    client: reqwest::Client,
}

impl AgentClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// The timeout bounds the whole exchange, send through body read, so a
    /// peer that returns headers and then stalls cannot hang the batch.
    pub async fn ask(&self, question: &str) -> Result<String, AuditError> {
        let fut = async {
            let resp = self
                .client
                .post(&self.endpoint)
                .json(&json!({ "query": question }))
                .send()
                .await
                .map_err(|e| AuditError::AgentCall(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(AuditError::AgentCall(format!(
                    "agent returned status {}",
                    resp.status()
                )));
            }

            let body: Value = resp
                .json()
                .await
                .map_err(|e| AuditError::AgentCall(format!("invalid JSON body: {e}")))?;

            Ok(extract_answer(&body))
        };

        timeout(self.timeout, fut).await.map_err(|_| {
            AuditError::AgentCall(format!(
                "timeout after {:?} calling {}",
                self.timeout, self.endpoint
            ))
        })?
    }
}

pub(crate) fn extract_answer(body: &Value) -> String {
    for field in ANSWER_FIELDS {
        if let Some(s) = body.get(field).and_then(Value::as_str) {
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    body.to_string()
}
