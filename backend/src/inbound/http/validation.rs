//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs declare their fields as `Option` so a missing field yields a
//! `missing_field` error naming it, rather than a serde message.

use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} is required")).with_code(ErrorCode::MissingField)
}

/// Wrap a domain validation failure, keeping its message.
pub(crate) fn invalid_field_error(field: FieldName, err: impl std::fmt::Display) -> Error {
    ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidValue)
}

/// Unwrap a required DTO field.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Unwrap a required text field, treating blank strings as missing.
pub(crate) fn required_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    required(value, field).and_then(|text| {
        if text.trim().is_empty() {
            Err(missing_field_error(field))
        } else {
            Ok(text)
        }
    })
}
