//! Raw requirement lists as stored on overwrite rows.
//!
//! Stored lists are JSON arrays whose elements are either a scalar (a
//! mandatory requirement) or an array of scalars (an alternative group).
//! Decoding is done element by element so every malformed element is
//! reported with its own path instead of failing the whole row opaquely.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RequirementFieldError;

/// One element of a requirement list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementItem<T> {
    /// Must be present.
    Single(T),
    /// At least one must be present.
    AnyOf(Vec<T>),
}

/// Item types that can appear as scalars in a stored requirement list.
pub trait RequirementScalar: Sized {
    /// Human readable name used in validation messages.
    const EXPECTED: &'static str;

    fn from_scalar(value: &Value) -> Option<Self>;
}

impl RequirementScalar for String {
    const EXPECTED: &'static str = "a string or integer id";

    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            // Snowflakes are frequently stored as numbers.
            Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
            _ => None,
        }
    }
}

impl RequirementScalar for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_scalar(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_at<T: RequirementScalar>(
    value: &Value,
    path: String,
    errors: &mut Vec<RequirementFieldError>,
) -> Option<T> {
    let parsed = T::from_scalar(value);
    if parsed.is_none() {
        errors.push(RequirementFieldError::new(
            path,
            format!("expected {}, found {}", T::EXPECTED, describe(value)),
        ));
    }
    parsed
}

/// Decode a nested requirement list (`[a, [b, c], d]`).
///
/// `None` and JSON `null` both mean "no requirement".
pub fn parse_requirement_list<T: RequirementScalar>(
    field: &str,
    value: Option<&Value>,
) -> Result<Option<Vec<RequirementItem<T>>>, Vec<RequirementFieldError>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(vec![RequirementFieldError::new(
                field,
                format!("expected an array, found {}", describe(other)),
            )])
        }
    };

    let mut errors = Vec::new();
    let mut out = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        match item {
            Value::Array(group) => {
                let mut alternatives = Vec::with_capacity(group.len());
                for (inner_idx, inner) in group.iter().enumerate() {
                    let path = format!("{field}[{idx}][{inner_idx}]");
                    if let Some(v) = scalar_at::<T>(inner, path, &mut errors) {
                        alternatives.push(v);
                    }
                }
                out.push(RequirementItem::AnyOf(alternatives));
            }
            scalar => {
                if let Some(v) = scalar_at::<T>(scalar, format!("{field}[{idx}]"), &mut errors) {
                    out.push(RequirementItem::Single(v));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Some(out))
    } else {
        Err(errors)
    }
}

/// Decode a flat list of scalars (`[a, b, c]`).
pub fn parse_flat_list<T: RequirementScalar>(
    field: &str,
    value: Option<&Value>,
) -> Result<Option<Vec<T>>, Vec<RequirementFieldError>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(vec![RequirementFieldError::new(
                field,
                format!("expected an array, found {}", describe(other)),
            )])
        }
    };

    let mut errors = Vec::new();
    let out: Vec<T> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| scalar_at::<T>(item, format!("{field}[{idx}]"), &mut errors))
        .collect();

    if errors.is_empty() {
        Ok(Some(out))
    } else {
        Err(errors)
    }
}
