//! Usage accounting: normalize per-backend token-usage metadata.
//!
//! Backends disagree on both field naming (snake_case vs camelCase) and
//! shape (completion-style `prompt_tokens`/`completion_tokens` vs
//! responses-style `input_tokens`/`output_tokens`). Normalization is a total
//! function: it never fails, and fields a backend did not report stay `None`.
//! A reported zero is a meaningful value; `None` means unknown.

use serde_json::{Map, Value};

use crate::types::UsageRecord;

const INPUT_KEYS: &[&str] = &["input_tokens", "inputTokens", "prompt_tokens", "promptTokens"];
const OUTPUT_KEYS: &[&str] = &[
    "output_tokens",
    "outputTokens",
    "completion_tokens",
    "completionTokens",
];
const TOTAL_KEYS: &[&str] = &["total_tokens", "totalTokens"];

/// Normalize a raw usage object into the canonical record.
pub fn normalize_usage(usage: Option<&Value>, request_id: Option<String>) -> UsageRecord {
    let mut record = UsageRecord {
        request_id,
        ..Default::default()
    };

    let Some(fields) = usage.and_then(Value::as_object) else {
        return record;
    };

    record.input_tokens = first_u64(fields, INPUT_KEYS);
    record.output_tokens = first_u64(fields, OUTPUT_KEYS);
    record.total_tokens = first_u64(fields, TOTAL_KEYS).or_else(|| {
        match (record.input_tokens, record.output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        }
    });

    record
}

fn first_u64(fields: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|key| fields.get(*key))
        .and_then(Value::as_u64)
}
