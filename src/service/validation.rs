//! Field-level validation shared by the per-kind payload validators.

use crate::error::AppError;
use serde::Serialize;
use std::fmt;

/// One rejected field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every rule violation found in a payload, in field order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded, otherwise `AppError::Validation`.
    pub fn finish<T>(self, value: T) -> Result<T, AppError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Length is counted in characters, not bytes.
pub(crate) fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(field, format!("{} must be at least {} characters", field, min));
    } else if len > max {
        errors.push(field, format!("{} must be at most {} characters", field, max));
    }
}

pub(crate) fn check_optional_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(s) = value {
        check_length(errors, field, s, 0, max);
    }
}

pub(crate) fn check_positive(errors: &mut ValidationErrors, field: &'static str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(field, format!("{} must be greater than 0", field));
    }
}

pub(crate) fn check_non_negative(errors: &mut ValidationErrors, field: &'static str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(field, format!("{} must be at least 0", field));
    }
}
