//! Field normalization for upstream BOM lines.
//!
//! Upstream quantities arrive as numbers, numeric strings, junk, or not at
//! all. Everything is coerced here:
//! - non-negative integers (or integral floats) are kept
//! - negative quantities reject the line
//! - anything else falls back to `"1"` and is flagged

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Result of coercing an upstream quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quantity {
    /// Parsed to a non-negative integer
    Parsed(String),
    /// Missing or non-numeric, replaced by "1"
    Defaulted { raw: Option<String> },
    /// Negative; the line is dropped
    Negative { raw: String },
}

pub const DEFAULT_QUANTITY: &str = "1";

pub fn coerce_quantity(raw: Option<&Value>) -> Quantity {
    match raw {
        None | Some(Value::Null) => Quantity::Defaulted { raw: None },
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                Quantity::Parsed(u.to_string())
            } else if n.as_i64().map(|i| i < 0).unwrap_or(false) {
                Quantity::Negative { raw: n.to_string() }
            } else {
                coerce_float(n.as_f64(), n.to_string())
            }
        }
        Some(Value::String(s)) => coerce_text(s),
        Some(other) => Quantity::Defaulted {
            raw: Some(other.to_string()),
        },
    }
}

fn coerce_text(text: &str) -> Quantity {
    let trimmed = text.trim();
    if let Ok(u) = trimmed.parse::<u64>() {
        return Quantity::Parsed(u.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        if i < 0 {
            return Quantity::Negative {
                raw: trimmed.to_string(),
            };
        }
    }
    coerce_float(trimmed.parse::<f64>().ok(), trimmed.to_string())
}

fn coerce_float(value: Option<f64>, raw: String) -> Quantity {
    match value {
        Some(f) if f.is_finite() && f < 0.0 => Quantity::Negative { raw },
        Some(f) if f.is_finite() && f.fract() == 0.0 => Quantity::Parsed((f as u64).to_string()),
        _ => Quantity::Defaulted { raw: Some(raw) },
    }
}

/// Trim and collapse internal whitespace. Empty results become `None`.
pub fn clean_text(text: Option<&str>) -> Option<String> {
    let text = text?;
    let collapsed = MULTI_SPACE.replace_all(text.trim(), " ").to_string();
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
