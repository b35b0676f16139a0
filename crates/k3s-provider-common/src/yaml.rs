//! YAML parsing utilities using yaml-rust2
//!
//! Human-authored override documents arrive as YAML. They are parsed with
//! yaml-rust2's event parser straight into `serde_json::Value` so the rest of
//! the pipeline works on a single value model.
//!
//! Plain scalars keep the text the author wrote unless it survives a round
//! trip through a number unchanged: `6443` becomes a number, while `0644`,
//! `0x10` and `1.10` stay strings.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;

/// Error type for YAML parsing
#[derive(Debug, Clone, PartialEq)]
pub struct YamlError(String);

impl std::fmt::Display for YamlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for YamlError {}

/// Parse a YAML string into a serde_json::Value.
///
/// For multi-document YAML, returns only the first document.
/// Returns `Value::Null` for empty input.
pub fn parse_yaml(input: &str) -> Result<Value, YamlError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut builder = JsonBuilder::default();
    Parser::new(input.chars())
        .load(&mut builder, false)
        .map_err(|e| YamlError(e.to_string()))?;
    builder.finish()
}

/// Parse a YAML document that must be a mapping.
///
/// Empty input and an explicit `null` document both yield an empty map.
/// Any other non-mapping document (a bare scalar or a list) is an error.
pub fn parse_yaml_mapping(input: &str) -> Result<Map<String, Value>, YamlError> {
    match parse_yaml(input)? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(YamlError(format!(
            "expected a mapping at document root, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Open collection while its events are still arriving
enum Frame {
    Sequence {
        items: Vec<Value>,
        anchor: usize,
    },
    Mapping {
        entries: Map<String, Value>,
        pending_key: Option<String>,
        anchor: usize,
    },
}

/// Event receiver assembling the first document as JSON
#[derive(Default)]
struct JsonBuilder {
    document: Option<Value>,
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    error: Option<YamlError>,
}

impl JsonBuilder {
    fn finish(self) -> Result<Value, YamlError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.document.unwrap_or(Value::Null)),
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(YamlError(message.into()));
        }
    }

    /// Attach a finished node to its parent, or make it the document.
    fn complete(&mut self, value: Value, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
        match self.stack.last_mut() {
            None => {
                if self.document.is_none() {
                    self.document = Some(value);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => {
                    entries.insert(key, value);
                }
                None => match key_text(value) {
                    Some(key) => *pending_key = Some(key),
                    None => {
                        self.error
                            .get_or_insert_with(|| YamlError("unsupported YAML key type".into()));
                    }
                },
            },
        }
    }
}

impl EventReceiver for JsonBuilder {
    fn on_event(&mut self, event: Event) {
        if self.error.is_some() {
            return;
        }
        match event {
            Event::Scalar(text, style, anchor, tag) => {
                let explicit_string = tag.as_ref().is_some_and(|t| t.suffix == "str");
                let value = if explicit_string || !matches!(style, TScalarStyle::Plain) {
                    Value::String(text)
                } else {
                    resolve_plain(text)
                };
                self.complete(value, anchor);
            }
            Event::SequenceStart(anchor, _) => self.stack.push(Frame::Sequence {
                items: Vec::new(),
                anchor,
            }),
            Event::MappingStart(anchor, _) => self.stack.push(Frame::Mapping {
                entries: Map::new(),
                pending_key: None,
                anchor,
            }),
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence { items, anchor }) => {
                    self.complete(Value::Array(items), anchor)
                }
                Some(Frame::Mapping {
                    entries, anchor, ..
                }) => self.complete(Value::Object(entries), anchor),
                None => self.fail("unbalanced YAML collection"),
            },
            Event::Alias(id) => match self.anchors.get(&id).cloned() {
                Some(value) => self.complete(value, 0),
                None => self.fail(format!("unknown YAML alias {id}")),
            },
            _ => {}
        }
    }
}

/// Resolve a plain scalar against the YAML 1.2 core schema.
///
/// Numbers are kept only when printing them reproduces `text` exactly.
fn resolve_plain(text: String) -> Value {
    match text.as_str() {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(i) = text.parse::<i64>() {
        if i.to_string() == text {
            return Value::Number(i.into());
        }
    } else if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
        if n.to_string() == text {
            return Value::Number(n);
        }
    }
    Value::String(text)
}

fn key_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
