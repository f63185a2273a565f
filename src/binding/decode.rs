//! Body decoding into raw, untyped fields.
//!
//! # Responsibilities
//! - Pick JSON or form decoding from the `Content-Type`
//! - Turn the body into a flat name → value map
//!
//! # Design Decisions
//! - Decode failures are reported as a `ValidationError` with rule `decode`,
//!   so callers see a single error representation
//! - Form fields keep their first value when repeated

use serde_json::{Map, Value};

use crate::binding::error::ValidationError;

/// How a request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Form,
}

impl ContentKind {
    /// JSON for `application/json` (and `+json` types); form otherwise.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if essence == "application/json" || essence.ends_with("+json") {
            ContentKind::Json
        } else {
            ContentKind::Form
        }
    }
}

/// Flat name → value view of a decoded body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields(Map<String, Value>);

impl RawFields {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode `body` according to `kind`.
pub fn decode(body: &[u8], kind: ContentKind) -> Result<RawFields, ValidationError> {
    match kind {
        ContentKind::Json => decode_json(body),
        ContentKind::Form => Ok(decode_form(body)),
    }
}

fn decode_json(body: &[u8]) -> Result<RawFields, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::decode("request body is empty"));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(RawFields(map)),
        Ok(other) => Err(ValidationError::decode(format!(
            "expected a JSON object, found {}",
            json_type(&other)
        ))),
        Err(e) => Err(ValidationError::decode(format!("malformed JSON body: {}", e))),
    }
}

fn decode_form(body: &[u8]) -> RawFields {
    let mut map = Map::new();
    for (key, value) in form_urlencoded::parse(body) {
        map.entry(key.into_owned())
            .or_insert_with(|| Value::String(value.into_owned()));
    }
    RawFields(map)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
