//! Schema-driven payload validation.
//!
//! # Design
//! Each operation declares a static `Schema`: the fields it accepts, the JSON
//! type each must have, and an optional character-length bound. Every field
//! present in a payload is checked; absent fields are never required here
//! (required values are positional arguments of the service methods).
//! Violations are accumulated so a single call reports every bad field.

use std::fmt;

use serde_json::Value;

use crate::error::{ApiError, FieldError};
use crate::payload::Payload;

/// Expected JSON type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// Whole number. Booleans do not qualify.
    Integer,
    /// Any JSON number, integral or not.
    Number,
    Boolean,
    List,
    Object,
}

impl FieldType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::List => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Object => "object",
        };
        f.write_str(name)
    }
}

/// One accepted field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldType,
    /// Inclusive character-count bounds, checked only for strings.
    pub length: Option<(usize, usize)>,
}

impl FieldRule {
    pub const fn new(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            length: None,
        }
    }

    pub const fn with_length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    fn check(&self, field: &str, value: &Value, errors: &mut Vec<FieldError>) {
        if !self.kind.matches(value) {
            errors.push(FieldError::new(field, format!("must be of type {}", self.kind)));
            return;
        }
        if let (Some((min, max)), Some(text)) = (self.length, value.as_str()) {
            if let Some(message) = length_violation(text, min, max) {
                errors.push(FieldError::new(field, message));
            }
        }
    }
}

/// The fields an operation accepts.
pub type Schema = [FieldRule];

/// Describe why `text` falls outside `[min, max]` characters, if it does.
pub fn length_violation(text: &str, min: usize, max: usize) -> Option<String> {
    let len = text.chars().count();
    if min == max && len != min {
        Some(format!("must be exactly {min} characters long, got {len}"))
    } else if len < min {
        Some(format!("must be at least {min} characters long, got {len}"))
    } else if len > max {
        Some(format!("must be at most {max} characters long, got {len}"))
    } else {
        None
    }
}

/// Check every field of `payload` against `schema`.
pub fn validate(payload: &Payload, schema: &Schema) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    collect_violations(payload, schema, "", &mut errors);
    finish(errors)
}

/// Check each element of a sequence against the same `schema`.
///
/// Field names in the reported violations are prefixed with `{label}[i].`.
pub fn validate_each(label: &str, items: &[Payload], schema: &Schema) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        collect_violations(item, schema, &format!("{label}[{index}]."), &mut errors);
    }
    finish(errors)
}

/// Combine several validation outcomes into one, concatenating violations.
///
/// A non-validation error short-circuits and is returned as-is.
pub fn merge(results: impl IntoIterator<Item = Result<(), ApiError>>) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(()) => {}
            Err(ApiError::Validation(found)) => errors.extend(found),
            Err(other) => return Err(other),
        }
    }
    finish(errors)
}

fn collect_violations(payload: &Payload, schema: &Schema, prefix: &str, errors: &mut Vec<FieldError>) {
    for (field, value) in payload {
        let name = format!("{prefix}{field}");
        match schema.iter().find(|rule| rule.name == field) {
            Some(rule) => rule.check(&name, value, errors),
            None => errors.push(FieldError::new(name, "unknown field")),
        }
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}
