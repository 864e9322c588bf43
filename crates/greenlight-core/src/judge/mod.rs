//! Traffic-light judge: classifies a candidate answer against ground truth.
//!
//! Responsibility boundaries:
//! - prompt.rs: prompt builders only
//! - parse.rs: judge output parse boundary
//! - mod.rs: the evaluate flow

mod parse;
mod prompt;

use crate::model::Verdict;
use crate::providers::llm::LlmClient;
use serde_json::Value;
use std::sync::Arc;

/// One judged answer: the well-formed verdict plus the parsed raw output,
/// which is persisted alongside the record for auditability.
#[derive(Debug)]
pub struct JudgeOutcome {
    pub verdict: Verdict,
    pub raw: Value,
}

pub struct SignalJudge {
    client: Arc<dyn LlmClient>,
}

impl SignalJudge {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Compare `answer` against the retrieved ground-truth snippets and
    /// classify it GREEN/YELLOW/RED.
    ///
    /// Fails with `AuditError::JudgeParse` when the model output cannot be
    /// coerced into a JSON object; the caller owns the conservative
    /// fallback (retry, then error record).
    pub async fn evaluate_signal(
        &self,
        question: &str,
        answer: &str,
        snippets: &[String],
    ) -> anyhow::Result<JudgeOutcome> {
        let prompt = prompt::build_signal_prompt(question, answer, snippets);
        let resp = self.client.complete(&prompt).await?;
        let raw = parse::parse_judge_json(&resp.text)?;
        let verdict = Verdict::from_json(&raw);
        Ok(JudgeOutcome { verdict, raw })
    }

    /// Decompose text into (entity, relation, value) claims for downstream
    /// analysis. Failures here are non-fatal to the main verdict; callers
    /// log and move on.
    pub async fn extract_triples(&self, text: &str) -> anyhow::Result<Value> {
        let prompt = prompt::build_triples_prompt(text);
        let resp = self.client.complete(&prompt).await?;
        Ok(parse::parse_judge_json(&resp.text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuditError;
    use crate::model::Signal;
    use crate::providers::llm::FakeClient;

    fn judge(responses: Vec<&str>) -> SignalJudge {
        SignalJudge::new(Arc::new(FakeClient::scripted(
            responses.into_iter().map(String::from).collect(),
        )))
    }

    #[tokio::test]
    async fn fenced_output_yields_green_verdict() {
        let j = judge(vec!["```json\n{\"signal\":\"GREEN\",\"reason\":\"ok\",\"score\":0.9}\n```"]);
        let out = j.evaluate_signal("q", "a", &["gt".into()]).await.unwrap();
        assert_eq!(out.verdict.signal, Signal::Green);
        assert_eq!(out.verdict.reason, "ok");
        assert_eq!(out.verdict.score, 0.9);
    }

    #[tokio::test]
    async fn prose_wrapped_output_yields_red_verdict() {
        let j = judge(vec![
            "Sure! { \"signal\": \"RED\", \"reason\": \"contradicts law\", \"score\": 0.1 } Hope this helps.",
        ]);
        let out = j.evaluate_signal("q", "a", &["gt".into()]).await.unwrap();
        assert_eq!(out.verdict.signal, Signal::Red);
        assert_eq!(out.verdict.reason, "contradicts law");
        assert_eq!(out.verdict.score, 0.1);
    }

    #[tokio::test]
    async fn unparseable_output_is_a_typed_error() {
        let j = judge(vec!["not json at all"]);
        let err = j
            .evaluate_signal("q", "a", &["gt".into()])
            .await
            .unwrap_err();
        let audit = err.downcast_ref::<AuditError>().expect("typed error");
        assert_eq!(audit.kind_str(), "judge_parse");
    }

    #[tokio::test]
    async fn malformed_signal_coerces_to_yellow_with_neutral_score() {
        let j = judge(vec!["{\"signal\": \"MAYBE\", \"reason\": \"unsure\"}"]);
        let out = j.evaluate_signal("q", "a", &[]).await.unwrap();
        assert_eq!(out.verdict.signal, Signal::Yellow);
        assert_eq!(out.verdict.score, 0.5);
    }

    #[tokio::test]
    async fn extract_triples_returns_parsed_list() {
        let j = judge(vec!["[[\"ACME\", \"registered_in\", \"Delaware\"]]"]);
        let v = j.extract_triples("ACME is registered in Delaware").await.unwrap();
        assert!(v.is_array());
    }
}
