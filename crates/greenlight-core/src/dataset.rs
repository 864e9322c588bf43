//! Dataset loading and item normalization.
//!
//! Real benchmark files drift across versions: the sequence may sit at the
//! top level or under a wrapper key, and question/answer fields go by
//! several names. Each logical field has an explicit ordered candidate
//! list, evaluated first-match-wins; the loose shape never leaks past this
//! boundary.

use crate::errors::AuditError;
use crate::model::DatasetItem;
use serde_json::{json, Value};
use std::path::Path;

const WRAPPER_KEYS: [&str; 4] = ["data", "items", "samples", "dataset"];
const ID_FIELDS: [&str; 3] = ["id", "qid", "uuid"];
const QUESTION_FIELDS: [&str; 4] = ["original_fact", "question", "query", "prompt"];
const ANSWER_FIELDS: [&str; 4] = ["answer", "response", "model_answer", "output"];

pub fn load_dataset(path: &Path) -> Result<Vec<DatasetItem>, AuditError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AuditError::DatasetFormat(format!("read {}: {e}", path.display())))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| AuditError::DatasetFormat(format!("parse {}: {e}", path.display())))?;
    let rows = into_item_array(value)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| normalize_item(row, idx))
        .collect())
}

fn into_item_array(value: Value) -> Result<Vec<Value>, AuditError> {
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut obj) => {
            for key in WRAPPER_KEYS {
                if matches!(obj.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(rows)) = obj.remove(key) {
                        return Ok(rows);
                    }
                }
            }
            Err(AuditError::DatasetFormat(
                "object holds no array under data/items/samples/dataset".into(),
            ))
        }
        other => Err(AuditError::DatasetFormat(format!(
            "expected array or wrapper object, got {}",
            json_type(&other)
        ))),
    }
}

pub(crate) fn normalize_item(row: Value, idx: usize) -> DatasetItem {
    let row = if row.is_object() {
        row
    } else {
        json!({ "value": row })
    };

    let id = first_string(&row, &ID_FIELDS).unwrap_or_else(|| format!("idx_{idx}"));
    let question = first_string(&row, &QUESTION_FIELDS).unwrap_or_default();
    let answer = first_string(&row, &ANSWER_FIELDS);

    DatasetItem {
        id,
        question,
        answer,
        raw: row,
    }
}

fn first_string(row: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        match row.get(*field) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(value: &Value) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", value).unwrap();
        f
    }

    #[test]
    fn loads_flat_array() {
        let f = write_json(&json!([
            {"id": "a", "question": "q1", "answer": "ans1"},
            {"id": "b", "question": "q2"}
        ]));
        let items = load_dataset(f.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].answer.as_deref(), Some("ans1"));
        assert_eq!(items[1].answer, None);
    }

    #[test]
    fn unwraps_conventional_wrapper_keys() {
        for key in ["data", "items", "samples", "dataset"] {
            let f = write_json(&json!({ key: [{"id": "x", "query": "q"}] }));
            let items = load_dataset(f.path()).unwrap();
            assert_eq!(items.len(), 1, "wrapper key {key}");
            assert_eq!(items[0].question, "q");
        }
    }

    #[test]
    fn unrecognized_shape_is_a_dataset_format_error() {
        let f = write_json(&json!("just a string"));
        let err = load_dataset(f.path()).unwrap_err();
        assert_eq!(err.kind_str(), "dataset_format");
        assert!(err.is_fatal());

        let f = write_json(&json!({"rows": []}));
        assert!(load_dataset(f.path()).is_err());
    }

    #[test]
    fn field_fallback_order_first_match_wins() {
        let item = normalize_item(
            json!({"original_fact": "of", "question": "q", "response": "r", "answer": "a"}),
            0,
        );
        assert_eq!(item.question, "of");
        assert_eq!(item.answer.as_deref(), Some("a"));

        let item = normalize_item(json!({"prompt": "p", "model_answer": "m"}), 0);
        assert_eq!(item.question, "p");
        assert_eq!(item.answer.as_deref(), Some("m"));
    }

    #[test]
    fn id_falls_back_to_index_and_accepts_numbers() {
        let item = normalize_item(json!({"question": "q"}), 7);
        assert_eq!(item.id, "idx_7");

        let item = normalize_item(json!({"qid": 42, "question": "q"}), 0);
        assert_eq!(item.id, "42");
    }

    #[test]
    fn non_object_rows_are_wrapped() {
        let item = normalize_item(json!("bare string"), 3);
        assert_eq!(item.id, "idx_3");
        assert_eq!(item.raw["value"], "bare string");
        assert_eq!(item.question, "");
    }
}
