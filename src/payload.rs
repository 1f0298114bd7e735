//! Tool payload shapes
//!
//! Tool providers return anything: bare strings, arbitrary JSON, or the MCP
//! content envelope `{"content": [{"type": "text", "text": "..."}]}`. This
//! module names those shapes and renders any of them as display text.

use serde_json::Value;

/// A tool argument or result value, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    /// A bare string
    Text(String),
    /// An MCP content envelope
    Envelope(Vec<ContentPart>),
    /// Any other JSON value
    Structured(Value),
}

/// One entry of an MCP content envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Other(Value),
}

impl ToolPayload {
    /// Classify a raw value. `null` carries no payload.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Object(map) => match map.get("content") {
                Some(Value::Array(parts)) => {
                    Some(Self::Envelope(parts.iter().map(ContentPart::from_value).collect()))
                }
                _ => Some(Self::Structured(value.clone())),
            },
            other => Some(Self::Structured(other.clone())),
        }
    }

    /// Render for display. Envelope text parts that hold JSON are rendered
    /// as that JSON, recursively.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Envelope(parts) => parts
                .iter()
                .map(ContentPart::display)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Structured(value) => pretty(value),
        }
    }

    /// Text a human would read as the payload's message: the string itself,
    /// or the envelope's text parts joined by newlines.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Envelope(parts) => {
                let texts: Vec<&str> = parts
                    .iter()
                    .filter_map(|p| match p {
                        ContentPart::Text(t) => Some(t.as_str()),
                        ContentPart::Other(_) => None,
                    })
                    .collect();
                (!texts.is_empty()).then(|| texts.join("\n"))
            }
            Self::Structured(_) => None,
        }
    }
}

impl ContentPart {
    fn from_value(value: &Value) -> Self {
        match (value.get("type").and_then(Value::as_str), value.get("text")) {
            (Some("text"), Some(Value::String(text))) if !text.is_empty() => {
                Self::Text(text.clone())
            }
            _ => Self::Other(value.clone()),
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Text(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::String(_)) | Err(_) => text.clone(),
                Ok(parsed) => ToolPayload::from_value(&parsed)
                    .map_or_else(|| pretty(&parsed), |p| p.display()),
            },
            Self::Other(value) => pretty(value),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Display text for any raw value; `null` shows as "No data".
pub fn display_value(value: &Value) -> String {
    ToolPayload::from_value(value).map_or_else(|| "No data".to_string(), |p| p.display())
}

/// JavaScript-style truthiness, as used by tool providers for flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Message text for an error-ish value: strings as-is, everything else as JSON.
pub fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
