//! Robust extraction of a JSON verdict from free-form judge output.
//!
//! Strategy chain, in order of preference:
//! 1. content of a fenced code block,
//! 2. the outermost `{...}` span in the raw text,
//! 3. the raw text itself.
//!
//! Each candidate is parsed as-is first; on failure a cleanup pass
//! normalizes quote characters and parenthesis variants (models answering
//! legal questions mix locales and quoting styles) and parsing is retried
//! once. If everything fails the caller gets `AuditError::JudgeParse` —
//! never a guessed verdict.

use crate::errors::AuditError;
use regex::Regex;
use std::sync::OnceLock;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("static regex"))
}

pub(crate) fn extract_candidates(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(caps) = fence_re().captures(raw) {
        out.push(caps[1].trim().to_string());
    }
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            out.push(raw[start..=end].to_string());
        }
    }
    out.push(raw.trim().to_string());
    out
}

fn normalize_quirks(s: &str) -> String {
    s.replace('\'', "\"").replace('(', "（").replace(')', "）")
}

pub(crate) fn parse_judge_json(raw: &str) -> Result<serde_json::Value, AuditError> {
    for candidate in extract_candidates(raw) {
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(&candidate) {
            return Ok(v);
        }
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(&normalize_quirks(&candidate)) {
            return Ok(v);
        }
    }
    Err(AuditError::JudgeParse(preview(raw)))
}

fn preview(raw: &str) -> String {
    const MAX: usize = 120;
    match raw.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}…", &raw[..i]),
        None => raw.to_string(),
    }
}
