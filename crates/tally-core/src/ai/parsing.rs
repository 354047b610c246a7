//! JSON parsing helpers for oracle responses
//!
//! Models often wrap the JSON payload in prose or code fences, so the object is
//! located first and then parsed. Field helpers tolerate the loose typing models
//! produce (numbers as strings, blank strings for "no value").

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Longest raw excerpt carried in error messages
pub const RAW_EXCERPT_LEN: usize = 200;

/// Truncate raw oracle output for error messages and logs
pub fn truncate_raw(raw: &str) -> String {
    match raw.char_indices().nth(RAW_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

/// Extract the first `{` .. last `}` span of a response as a JSON object
pub fn extract_json_object(response: &str) -> Result<Map<String, Value>> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            match serde_json::from_str::<Value>(json_str) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(Error::InvalidData(format!(
                    "Oracle reply is not a JSON object | Raw: {}",
                    truncate_raw(json_str)
                ))),
                Err(e) => Err(Error::InvalidData(format!(
                    "Invalid JSON from oracle: {} | Raw: {}",
                    e,
                    truncate_raw(json_str)
                ))),
            }
        }
        _ => Err(Error::InvalidData(format!(
            "No JSON found in oracle response | Raw: {}",
            truncate_raw(response)
        ))),
    }
}

/// Trimmed, non-empty string value of a field
///
/// Numbers are stringified; null, blank strings and other types yield `None`.
pub fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Outcome of reading a money amount from a field
#[derive(Debug, Clone, PartialEq)]
pub enum AmountField {
    Missing,
    Value(f64),
    Invalid(String),
}

/// Read an amount from a JSON number or a numeric string
///
/// Accepts `50`, `"50"`, `"50,90"`, `"R$ 1.234,56"` and `"1,234.56"`.
pub fn amount_field(obj: &Map<String, Value>, key: &str) -> AmountField {
    match obj.get(key) {
        None | Some(Value::Null) => AmountField::Missing,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => AmountField::Value(v),
            _ => AmountField::Invalid(n.to_string()),
        },
        Some(Value::String(s)) if s.trim().is_empty() => AmountField::Missing,
        Some(Value::String(s)) => match parse_amount_text(s) {
            Some(v) => AmountField::Value(v),
            None => AmountField::Invalid(s.clone()),
        },
        Some(other) => AmountField::Invalid(other.to_string()),
    }
}

/// Outcome of reading an ISO date from a field
#[derive(Debug, Clone, PartialEq)]
pub enum DateField {
    Missing,
    Value(NaiveDate),
    Invalid(String),
}

pub fn date_field(obj: &Map<String, Value>, key: &str) -> DateField {
    match obj.get(key) {
        None | Some(Value::Null) => DateField::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => DateField::Missing,
        Some(Value::String(s)) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(date) => DateField::Value(date),
            Err(_) => DateField::Invalid(s.clone()),
        },
        Some(other) => DateField::Invalid(other.to_string()),
    }
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d[\d.,]*").expect("valid regex"))
}

/// Parse free-form numeric text with either decimal convention
fn parse_amount_text(text: &str) -> Option<f64> {
    let m = amount_re().find(text)?;
    let token = m.as_str().trim_end_matches(['.', ',']);

    let last_comma = token.rfind(',');
    let last_dot = token.rfind('.');
    let normalized = match (last_comma, last_dot) {
        // Both present: the rightmost one is the decimal separator
        (Some(c), Some(d)) if c > d => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        // A lone separator followed by exactly three digits is a thousands
        // separator: "1,234" and "R$ 1.500"
        (Some(c), None) => {
            if token.matches(',').count() == 1 && !is_thousands_group(token, c) {
                token.replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
        (None, Some(d)) => {
            if token.matches('.').count() == 1 && !is_thousands_group(token, d) {
                token.to_string()
            } else {
                token.replace('.', "")
            }
        }
        (None, None) => token.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_thousands_group(token: &str, separator: usize) -> bool {
    token.len() - separator - 1 == 3
}
