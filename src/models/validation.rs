//! Validation error types

use std::fmt;

/// Validation error for request payloads
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required field is absent
    Missing { field: &'static str },

    /// Field length must fall within [min, max]
    OutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::OutOfRange { field, min, max } => {
                write!(f, "{} must be between {} and {} characters", field, min, max)
            }
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
