//! Append-only audit record store: newline-delimited JSON, one record per
//! line, safe to tail and to resume-scan. Records are never rewritten or
//! deleted; the file is the permanent audit trail.

use crate::model::AuditRecord;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Layered retries can wrap raw judge output in itself; unwrapping stops
/// here no matter how deep the nesting goes.
const RAW_UNWRAP_MAX_DEPTH: usize = 10;

/// Fields already present at the top level of the record; stripped from the
/// nested raw copy so records don't grow without bound.
const DUPLICATED_FIELDS: [&str; 4] = ["answer", "question", "ground_truth_context", "id"];

pub struct AuditRecordStore {
    path: PathBuf,
}

impl AuditRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the log once and collect every id present. Error records count:
    /// a failed item is done and is not silently retried on restart.
    /// Malformed lines are skipped, not fatal.
    pub fn read_done_ids(&self) -> anyhow::Result<HashSet<String>> {
        let mut done = HashSet::new();
        if !self.path.exists() {
            return Ok(done);
        }
        let file = File::open(&self.path)?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(obj) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            if let Some(id) = obj.get("id").and_then(Value::as_str) {
                if !id.is_empty() {
                    done.insert(id.to_string());
                }
            }
        }
        Ok(done)
    }

    /// Durably append one record, sanitizing the raw judge payload first.
    pub fn append(&self, record: &AuditRecord) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sanitized = sanitize(record);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(&sanitized)?)?;
        Ok(())
    }
}

fn unwrap_raw(value: &Value) -> &Value {
    let mut cur = value;
    let mut depth = 0;
    while depth < RAW_UNWRAP_MAX_DEPTH {
        match cur.get("raw_judge") {
            Some(inner @ Value::Object(_)) => {
                cur = inner;
                depth += 1;
            }
            _ => break,
        }
    }
    cur
}

pub(crate) fn sanitize(record: &AuditRecord) -> AuditRecord {
    let mut rec = record.clone();
    if let Some(raw) = rec.raw_judge.take() {
        let mut inner = unwrap_raw(&raw).clone();
        if let Some(obj) = inner.as_object_mut() {
            obj.remove("raw_judge");
            for field in DUPLICATED_FIELDS {
                obj.remove(field);
            }
        }
        rec.raw_judge = Some(inner);
    }
    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Signal, Verdict};
    use serde_json::json;
    use tempfile::tempdir;

    fn verdict() -> Verdict {
        Verdict {
            signal: Signal::Green,
            reason: "ok".into(),
            score: 0.9,
        }
    }

    #[test]
    fn append_then_read_done_ids_roundtrip() {
        let tmp = tempdir().unwrap();
        let store = AuditRecordStore::new(tmp.path().join("out/audit.jsonl"));
        let rec = AuditRecord::scored("q1", "q?", "a", vec!["gt".into()], &verdict(), json!({}));
        store.append(&rec).unwrap();
        let err = AuditRecord::errored("q2", "q?", "", vec![], "agent_call", "timeout");
        store.append(&err).unwrap();

        let done = store.read_done_ids().unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.contains("q1"));
        // Error records count as done: no silent infinite retry on restart.
        assert!(done.contains("q2"));
    }

    #[test]
    fn read_done_ids_skips_malformed_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("audit.jsonl");
        fs::write(&path, "{\"id\":\"a\"}\nnot json\n\n{\"id\":\"b\"}\n").unwrap();
        let store = AuditRecordStore::new(&path);
        let done = store.read_done_ids().unwrap();
        assert_eq!(done.len(), 2);
    }

    #[test]
    fn missing_file_means_nothing_done() {
        let tmp = tempdir().unwrap();
        let store = AuditRecordStore::new(tmp.path().join("absent.jsonl"));
        assert!(store.read_done_ids().unwrap().is_empty());
    }

    #[test]
    fn sanitize_unwraps_nested_raw_and_strips_duplicates() {
        let raw = json!({
            "raw_judge": {
                "raw_judge": {
                    "signal": "GREEN",
                    "answer": "huge duplicated answer",
                    "question": "huge duplicated question",
                    "ground_truth_context": ["dup"],
                    "id": "dup"
                }
            }
        });
        let rec = AuditRecord::scored("x", "q", "a", vec![], &verdict(), raw);
        let clean = sanitize(&rec);
        let inner = clean.raw_judge.unwrap();
        assert_eq!(inner["signal"], "GREEN");
        assert!(inner.get("answer").is_none());
        assert!(inner.get("question").is_none());
        assert!(inner.get("ground_truth_context").is_none());
        assert!(inner.get("id").is_none());
        assert!(inner.get("raw_judge").is_none());
    }

    #[test]
    fn sanitize_unwrap_depth_is_bounded() {
        let mut raw = json!({"signal": "RED", "marker": "innermost"});
        for _ in 0..15 {
            raw = json!({ "raw_judge": raw });
        }
        let rec = AuditRecord::scored("x", "q", "a", vec![], &verdict(), raw);
        let clean = sanitize(&rec);
        // 15 layers, cap 10: sanitization terminates and the immediate
        // wrapper layer is removed from whatever level it stopped at.
        let inner = clean.raw_judge.unwrap();
        assert!(inner.is_object());
        assert!(inner.get("raw_judge").is_none());
    }

    #[test]
    fn appended_records_are_never_rewritten() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("audit.jsonl");
        let store = AuditRecordStore::new(&path);
        let rec = AuditRecord::scored("q1", "q", "a", vec![], &verdict(), json!({}));
        store.append(&rec).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        let rec2 = AuditRecord::scored("q2", "q", "a", vec![], &verdict(), json!({}));
        store.append(&rec2).unwrap();
        let both = fs::read_to_string(&path).unwrap();
        assert!(both.starts_with(&first));
        assert_eq!(both.lines().count(), 2);
    }
}
