//! Field kinds for option schemas
//!
//! Every schema field is one of a handful of kinds. Each kind knows how to
//! coerce a loosely typed document value into itself and when it should be
//! left out of serialized output.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// A value kind that can live in an option schema field.
pub trait FieldValue: Default {
    /// Coerce a document value into this kind.
    ///
    /// `Value::Null` always yields the absent value.
    fn from_value(value: Value) -> Result<Self, String>;

    /// Whether serialization should skip this value
    fn omit(&self) -> bool;
}

/// `skip_serializing_if` hook shared by every schema field
pub fn omit<T: FieldValue>(value: &T) -> bool {
    value.omit()
}

/// Boolean that distinguishes "never set" from "explicitly false".
///
/// `cluster-init` is the one flag whose explicit `false` must survive
/// serialization, so it cannot use the omit-on-false rule of `Option<bool>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriState {
    /// Not set; omitted from output
    #[default]
    Unset,
    /// Explicitly true
    Enabled,
    /// Explicitly false; serialized as literal `false`
    Disabled,
}

impl TriState {
    /// The explicit value, if any
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::Enabled => Some(true),
            TriState::Disabled => Some(false),
        }
    }

    /// Whether the flag has been set either way
    pub fn is_set(self) -> bool {
        self != TriState::Unset
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::Enabled
        } else {
            TriState::Disabled
        }
    }
}

impl Serialize for TriState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_bool() {
            Some(b) => serializer.serialize_bool(b),
            None => serializer.serialize_none(),
        }
    }
}

impl FieldValue for TriState {
    fn from_value(value: Value) -> Result<Self, String> {
        Ok(match Option::<bool>::from_value(value)? {
            Some(b) => TriState::from(b),
            None => TriState::Unset,
        })
    }

    fn omit(&self) -> bool {
        !self.is_set()
    }
}

impl FieldValue for Option<String> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            // A comma-separated scalar split by the normalizer is put back together.
            Value::Array(items) => items
                .into_iter()
                .map(scalar_to_string)
                .collect::<Result<Vec<_>, _>>()
                .map(|parts| Some(parts.join(","))),
            other => scalar_to_string(other).map(Some),
        }
    }

    fn omit(&self) -> bool {
        self.as_deref().map_or(true, str::is_empty)
    }
}

impl FieldValue for Option<Vec<String>> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .into_iter()
                .map(scalar_to_string)
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            other => scalar_to_string(other).map(|s| Some(vec![s])),
        }
    }

    fn omit(&self) -> bool {
        self.as_ref().map_or(true, Vec::is_empty)
    }
}

impl FieldValue for Option<bool> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            Value::String(s) => parse_flag(&s)
                .map(Some)
                .ok_or_else(|| format!("expected a boolean, found '{s}'")),
            other => Err(format!("expected a boolean, found {}", describe(&other))),
        }
    }

    fn omit(&self) -> bool {
        !self.unwrap_or(false)
    }
}

impl FieldValue for Option<i64> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| format!("expected an integer, found {n}")),
            Value::String(s) => parse_int(s.trim())
                .map(Some)
                .ok_or_else(|| format!("expected an integer, found '{s}'")),
            other => Err(format!("expected an integer, found {}", describe(&other))),
        }
    }

    fn omit(&self) -> bool {
        self.unwrap_or(0) == 0
    }
}

/// Parse the boolean spellings administrators use in string-only maps.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "1" => Some(true),
        "false" | "no" | "off" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Integer written in decimal, or with a `0x` / `0o` prefix.
fn parse_int(s: &str) -> Option<i64> {
    if let Some(hex) = s.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = s.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else {
        s.parse().ok()
    }
}

fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected a scalar, found {}", describe(&other))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
