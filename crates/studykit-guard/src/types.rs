//! Core types for StudyKit Guard

use crate::error::ValidationFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the content passed
    pub is_valid: bool,
    /// Human-readable reason when it did not
    pub error: Option<String>,
    /// Typed reason when it did not
    pub failure: Option<ValidationFailure>,
}

impl ValidationResult {
    /// A passing result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
            failure: None,
        }
    }

    /// A failing result
    pub fn invalid(failure: ValidationFailure) -> Self {
        Self {
            is_valid: false,
            error: Some(failure.to_string()),
            failure: Some(failure),
        }
    }

    /// Convert into a `Result`, surfacing the failure as an error
    pub fn into_result(self) -> std::result::Result<(), ValidationFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

/// Request context for guard operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardContext {
    /// Unique request ID
    pub request_id: Uuid,
    /// Where the content came from (`text`, `url`, `youtube`, `upload`, ...)
    pub source: Option<String>,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Default for GuardContext {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            source: None,
            timestamp: Utc::now(),
        }
    }
}

impl GuardContext {
    /// Create a new context with a fresh request ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content source label
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Which admission stage produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Empty / over-length check
    Length,
    /// Post-sanitization pattern scan
    Security,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Request context
    pub context: GuardContext,
    /// SHA-256 of the content as received
    pub content_hash: String,
    /// Characters received
    pub input_chars: usize,
    /// Characters left after sanitization
    pub output_chars: usize,
    /// Decision
    pub result: AuditResult,
    /// Processing time in microseconds
    pub processing_time_us: u64,
}

/// Result for audit logging (simplified)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuditResult {
    /// Content admitted unchanged
    Passed,
    /// Content admitted after markup was stripped
    Sanitized { removed_chars: usize },
    /// Content refused
    Rejected { stage: Stage, reason: String },
}
