// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Field validation shared by the overlay form and the in-process stores.

use std::fmt;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field that failed validation, in check order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    /// Message for a given field, if it failed.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Collects failed checks so all problems are reported at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn check(&mut self, field: &'static str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError {
                field,
                message: message.to_string(),
            });
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// True when `value` is finite and inside `[min, max]`.
pub fn in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_failure() {
        let mut v = Validator::new();
        v.check("x", false, "must be between 0 and 100")
            .check("y", true, "unused")
            .check("width", false, "must be positive");

        let err = v.finish().unwrap_err();
        assert_eq!(err.0.len(), 2);
        assert_eq!(err.for_field("width"), Some("must be positive"));
        assert_eq!(err.for_field("y"), None);
        assert_eq!(
            err.to_string(),
            "validation failed: x: must be between 0 and 100, width: must be positive"
        );
    }

    #[test]
    fn test_in_range_rejects_nan() {
        assert!(in_range(0.0, 0.0, 100.0));
        assert!(in_range(100.0, 0.0, 100.0));
        assert!(!in_range(f64::NAN, 0.0, 100.0));
        assert!(!in_range(100.5, 0.0, 100.0));
    }
}
