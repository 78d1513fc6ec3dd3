//! Error types for StudyKit Guard

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Guard operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Guard error types
#[derive(Debug, Error)]
pub enum GuardError {
    /// Content failed an admission check
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GuardError {
    /// The admission failure, if this error is one
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            GuardError::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Why a piece of content was refused
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationFailure {
    /// Nothing left after trimming
    #[error("Content cannot be empty")]
    Empty,

    /// Longer than the submission ceiling
    #[error("Content must be less than {} characters", max_label(.max))]
    TooLong { length: usize, max: usize },

    /// A dangerous pattern survived sanitization
    #[error("Content contains potentially dangerous code that has been filtered for security")]
    Dangerous { pattern: String },
}

impl ValidationFailure {
    /// Whether this failure was raised by the security scan
    pub fn is_security(&self) -> bool {
        matches!(self, ValidationFailure::Dangerous { .. })
    }
}

fn max_label(max: &usize) -> String {
    group_thousands(*max as u64)
}

/// Format a count with thousands separators (`20000` -> `20,000`)
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(20_000), "20,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(ValidationFailure::Empty.to_string(), "Content cannot be empty");
        let too_long = ValidationFailure::TooLong {
            length: 20_001,
            max: 20_000,
        };
        assert_eq!(
            too_long.to_string(),
            "Content must be less than 20,000 characters"
        );
        assert!(!too_long.is_security());
        assert!(ValidationFailure::Dangerous {
            pattern: "javascript:".into()
        }
        .is_security());
    }
}
