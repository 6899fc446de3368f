//! Parsing of raw model output into a [`Classification`]
//!
//! Model output is untrusted free text. [`parse_classification`] has no
//! failure channel: every input maps to a well-formed classification, so a
//! malformed reply can never abort a scan.

use crate::types::{Classification, Decision, DEFAULT_CONFIDENCE};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

/// Reason used when no JSON object can be recovered from the reply
pub const UNPARSABLE_REASON: &str = "Could not parse LLM response.";

/// Reason used when the decision is outside the taxonomy
pub const INVALID_DECISION_REASON: &str = "Invalid decision from LLM.";

/// Reason used when the model omits one
pub const MISSING_REASON: &str = "No reason provided.";

/// First `{` up to the nearest following `}`
fn object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[\s\S]*?\}").expect("object pattern is valid"))
}

/// Turn raw model text into a validated classification
pub fn parse_classification(text: &str) -> Classification {
    let Some(candidate) = object_pattern().find(text) else {
        debug!("No JSON object in model reply");
        return Classification::review(UNPARSABLE_REASON);
    };

    let fields = match serde_json::from_str::<Value>(candidate.as_str()) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            debug!("Model reply object is not valid JSON");
            return Classification::review(UNPARSABLE_REASON);
        }
    };

    let Some(decision) = read_decision(&fields) else {
        debug!("Model reply carries an invalid decision: {:?}", fields.get("decision"));
        return Classification::review(INVALID_DECISION_REASON);
    };

    Classification::new(decision, read_confidence(&fields), read_reason(&fields))
}

/// Absent or null means REVIEW; strings are compared case-insensitively
fn read_decision(fields: &Map<String, Value>) -> Option<Decision> {
    match fields.get("decision") {
        None | Some(Value::Null) => Some(Decision::Review),
        Some(Value::String(s)) => s.to_uppercase().parse().ok(),
        Some(_) => None,
    }
}

fn read_confidence(fields: &Map<String, Value>) -> f64 {
    let value = match fields.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0)
}

fn read_reason(fields: &Map<String, Value>) -> String {
    match fields.get("reason") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => MISSING_REASON.to_string(),
    }
}
