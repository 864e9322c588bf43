use thiserror::Error;

/// Per-item and load-time error taxonomy for the audit pipeline.
///
/// Only `DatasetFormat` is fatal to a run; every other kind is converted
/// into an error audit record and the batch continues.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Ground-truth lookup failed (embedding or vector-store call).
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// Candidate-agent call failed or returned no usable answer.
    #[error("agent call failed: {0}")]
    AgentCall(String),

    /// Judge output could not be coerced into a structured verdict.
    #[error("judge output not parseable: {0}")]
    JudgeParse(String),

    /// Judge call failed before any output arrived (timeout, HTTP error).
    #[error("judge call failed: {0}")]
    JudgeCall(String),

    /// Dataset file is neither a sequence nor a recognized wrapper object.
    #[error("dataset format error: {0}")]
    DatasetFormat(String),
}

impl AuditError {
    /// Stable kind string persisted in error audit records.
    pub fn kind_str(&self) -> &'static str {
        match self {
            AuditError::Retrieval(_) => "retrieval",
            AuditError::AgentCall(_) => "agent_call",
            AuditError::JudgeParse(_) => "judge_parse",
            AuditError::JudgeCall(_) => "judge_call",
            AuditError::DatasetFormat(_) => "dataset_format",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditError::DatasetFormat(_))
    }
}

#[cfg(test)]
mod tests {
    use super::AuditError;

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(AuditError::Retrieval("x".into()).kind_str(), "retrieval");
        assert_eq!(AuditError::AgentCall("x".into()).kind_str(), "agent_call");
        assert_eq!(AuditError::JudgeParse("x".into()).kind_str(), "judge_parse");
        assert_eq!(AuditError::JudgeCall("x".into()).kind_str(), "judge_call");
        assert_eq!(
            AuditError::DatasetFormat("x".into()).kind_str(),
            "dataset_format"
        );
    }

    #[test]
    fn only_dataset_format_is_fatal() {
        assert!(AuditError::DatasetFormat("bad".into()).is_fatal());
        assert!(!AuditError::Retrieval("down".into()).is_fatal());
        assert!(!AuditError::AgentCall("down".into()).is_fatal());
        assert!(!AuditError::JudgeParse("garbled".into()).is_fatal());
        assert!(!AuditError::JudgeCall("timeout".into()).is_fatal());
    }
}
