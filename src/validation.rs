use regex::Regex;
use serde::Serialize;

use crate::error::ApiError;

/// A single field-level rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub property_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            message: message.into(),
        }
    }
}

/// Collects violations across every rule of an entity so callers get the
/// whole list at once.
#[derive(Debug, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Value must be present and contain something other than whitespace.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>, message: &str) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.0.push(Violation::new(field, message));
        }
    }

    pub fn present<T>(&mut self, field: &str, value: Option<&T>, message: &str) {
        if value.is_none() {
            self.0.push(Violation::new(field, message));
        }
    }

    /// Blank values are left to `not_blank`.
    pub fn matches(&mut self, field: &str, value: Option<&str>, pattern: &Regex, message: &str) {
        match value {
            Some(v) if !v.is_empty() && !pattern.is_match(v) => {
                self.0.push(Violation::new(field, message));
            }
            _ => {}
        }
    }

    /// Length is counted in characters, as `VARCHAR(n)` does.
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.0.push(Violation::new(field, message));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::Validation(self.0)
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}
