//! Error types for the Finolog client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." Client-side failures (`Validation`, `MissingField`, `InvalidId`)
//! are raised before any request leaves the process. Response-side failures
//! carry the raw body so API drift can be diagnosed from the error alone.

use std::fmt;

use thiserror::Error;

/// A single rejected payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors returned by `FinologClient` and its resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404. `body` is the raw response text.
    #[error("resource not found: {body}")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// One or more payload fields failed type or length checks.
    #[error("payload validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// A required argument was absent or empty.
    #[error("missing required field `{0}`")]
    MissingField(String),

    /// An identifier could not be read as an integer.
    #[error("`{field}` must be an integer, got {value:?}")]
    InvalidId { field: String, value: String },

    /// A successful response did not match the expected record shape.
    #[error("unexpected response shape ({message}): {body}")]
    UnexpectedShape { message: String, body: String },

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// Client configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The violations carried by a `Validation` error, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
