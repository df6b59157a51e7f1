use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Failure reported by a relation store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing table already holds this pair. Raised when two adds race
    /// past the existence check.
    #[error("Unique constraint violated")]
    UniqueViolation,

    #[error("Storage backend failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortLinkError {
    #[error("Invalid short link token: {0:?}")]
    InvalidToken(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Expected a base64 data URI (data:image/<type>;base64,...)")]
    NotDataUri,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported image: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("CSV file is empty")]
    Empty,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Field-level validation failures, keyed by payload field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_group_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("tags", "This field is required.");
        errors.add("tags", "Duplicate tag.");
        errors.add("name", "Too long.");

        assert!(errors.has("tags"));
        assert_eq!(errors.fields()["tags"].len(), 2);
        assert_eq!(
            errors.to_string(),
            "name: Too long.; tags: This field is required., Duplicate tag."
        );
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
