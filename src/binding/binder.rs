//! Typed binding: raw fields → validated payload.
//!
//! # Responsibilities
//! - Convert each declared field to its kind (date, number, text)
//! - Evaluate every declared rule on every field
//! - Assemble the payload only when nothing was violated
//!
//! # Design Decisions
//! - Fields are validated independently; all violations are returned together
//! - A field that fails conversion reports rule `format` and skips its
//!   other rules; the remaining fields are still checked
//! - Dates use the fixed `YYYY-MM-DD` layout for both JSON and form bodies

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::binding::decode::{decode, ContentKind, RawFields};
use crate::binding::error::{ValidationError, ValidationErrors};
use crate::binding::rules::{parse_rules, FieldValue, RuleSet};

/// Layout accepted for date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Type a declared field is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Number,
    Text,
}

/// Declaration of one bindable field: body name, kind and rule list.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub rules: &'static str,
}

impl FieldSpec {
    pub const fn date(name: &'static str, rules: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Date,
            rules,
        }
    }

    pub const fn number(name: &'static str, rules: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            rules,
        }
    }

    pub const fn text(name: &'static str, rules: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            rules,
        }
    }
}

/// A payload that can be bound from a request body.
pub trait Bind: Sized {
    /// Field declarations in the order they are validated.
    const FIELDS: &'static [FieldSpec];

    /// Build the payload once every declared rule has passed.
    fn assemble(fields: &BoundFields) -> Result<Self, ValidationError>;
}

/// Converted field values handed to [`Bind::assemble`].
#[derive(Debug, Default)]
pub struct BoundFields(HashMap<&'static str, FieldValue>);

impl BoundFields {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn date(&self, name: &str) -> Result<NaiveDate, ValidationError> {
        match self.get(name) {
            Some(FieldValue::Date(d)) => Ok(*d),
            _ => Err(missing(name)),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, ValidationError> {
        match self.get(name) {
            Some(FieldValue::Number(n)) => Ok(*n),
            _ => Err(missing(name)),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

fn missing(name: &str) -> ValidationError {
    ValidationError::new(name, "required", format!("field '{}' is required", name))
}

/// Decodes bodies and validates them against a [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Binder {
    rules: RuleSet,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new(RuleSet::standard())
    }
}

impl Binder {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Decode `body` as `kind` and bind it to `T`.
    pub fn bind<T: Bind>(&self, body: &[u8], kind: ContentKind) -> Result<T, ValidationErrors> {
        let raw = decode(body, kind)?;
        self.bind_fields(&raw)
    }

    /// Bind already-decoded fields to `T`.
    pub fn bind_fields<T: Bind>(&self, raw: &RawFields) -> Result<T, ValidationErrors> {
        let mut errors = Vec::new();
        let mut bound = BoundFields::default();

        for spec in T::FIELDS {
            let value = match convert(spec, raw.get(spec.name)) {
                Ok(value) => value,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            for expr in parse_rules(spec.rules) {
                let passed = match self.rules.get(expr.name) {
                    Some(rule) => rule.check(value.as_ref(), expr.param),
                    None => {
                        errors.push(ValidationError::new(
                            spec.name,
                            expr.name,
                            format!("no validation rule named '{}'", expr.name),
                        ));
                        continue;
                    }
                };
                if !passed {
                    errors.push(ValidationError::new(
                        spec.name,
                        expr.name,
                        format!("field '{}' failed on the '{}' rule", spec.name, expr.raw),
                    ));
                }
            }

            if let Some(value) = value {
                bound.0.insert(spec.name, value);
            }
        }

        if let Some(errors) = ValidationErrors::from_vec(errors) {
            return Err(errors);
        }

        T::assemble(&bound).map_err(ValidationErrors::from)
    }
}

/// Strict `YYYY-MM-DD`: zero-padded, unsigned, no surrounding whitespace.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let shaped = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Convert a raw value to the declared kind. Absent, null and empty-string
/// values yield `Ok(None)`.
fn convert(spec: &FieldSpec, raw: Option<&Value>) -> Result<Option<FieldValue>, ValidationError> {
    let raw = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(v) => v,
    };

    let converted = match (spec.kind, raw) {
        (FieldKind::Date, Value::String(s)) => parse_date(s).map(FieldValue::Date),
        (FieldKind::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
        (FieldKind::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FieldValue::Number),
        (FieldKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (FieldKind::Text, Value::Number(n)) => Some(FieldValue::Text(n.to_string())),
        _ => None,
    };

    converted.map(Some).ok_or_else(|| {
        let expected = match spec.kind {
            FieldKind::Date => "a date formatted as YYYY-MM-DD",
            FieldKind::Number => "a number",
            FieldKind::Text => "text",
        };
        ValidationError::new(
            spec.name,
            "format",
            format!("field '{}' must be {}", spec.name, expected),
        )
    })
}
