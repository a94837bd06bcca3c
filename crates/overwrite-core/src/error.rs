//! Error types for overwrite-core

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single requirement validation error with a stable field path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementFieldError {
    pub path: String,
    pub message: String,
}

impl RequirementFieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A collection of validation errors for a single overwrite row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementValidationError {
    pub errors: Vec<RequirementFieldError>,
}

impl RequirementValidationError {
    pub fn new(errors: Vec<RequirementFieldError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for RequirementValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "Overwrite validation failed (no details)");
        }

        write!(
            f,
            "Overwrite validation failed with {} error(s):",
            self.errors.len()
        )?;
        for err in &self.errors {
            write!(f, " {}: {};", err.path, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RequirementValidationError {}

/// Errors that can occur while normalizing overwrite rows
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Overwrite {rule_id} is invalid: {source}")]
    InvalidOverwrite {
        rule_id: i64,
        #[source]
        source: RequirementValidationError,
    },
}

/// Result type for overwrite-core operations
pub type Result<T> = std::result::Result<T, Error>;
