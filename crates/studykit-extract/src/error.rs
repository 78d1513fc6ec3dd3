//! Error types for content extraction
//!
//! Extraction failures are shown to end users, so their messages say what went
//! wrong in plain words and point at pasting the content directly.

use studykit_guard::{GuardError, ValidationFailure};
use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur during content extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Not a usable URL, or no video id in a YouTube link
    #[error("Invalid URL: {0}. Please check the link or paste the content directly.")]
    InvalidUrl(String),

    /// The remote end did not answer in time
    #[error("The website took too long to respond (over {0} seconds). Please try again or paste the content directly.")]
    Timeout(u64),

    /// 403 / 404
    #[error("The page is not accessible (HTTP {status}). It may be private or removed. Please paste the content directly.")]
    Inaccessible { status: u16 },

    /// Any other non-success status
    #[error("Failed to extract content from URL (HTTP {status}: {message}). Please paste the content directly.")]
    Http { status: u16, message: String },

    /// Network error during fetch
    #[error("Failed to extract content from URL: {0}. Please paste the content directly.")]
    Network(String),

    /// Nothing readable on the page
    #[error("Could not extract meaningful content from this page. Please paste the content directly.")]
    NoMeaningfulContent,

    /// Private, removed or region-locked video
    #[error("This video is unavailable: {0}. Please paste the transcript directly.")]
    VideoUnavailable(String),

    /// Video has no caption tracks
    #[error("No captions found for this video. Please ensure the video has captions enabled, or paste the transcript directly.")]
    CaptionsUnavailable,

    /// Captions exist but carry almost no text
    #[error("The video transcript is too short to learn from. Please ensure the video has captions enabled, or paste the transcript directly.")]
    TranscriptTooShort,

    /// Response or upload exceeds the byte limit
    #[error("Content too large: {size} bytes exceeds max {max} bytes. Please paste the relevant section directly.")]
    ContentTooLarge { size: usize, max: usize },

    /// Unexpected response shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Upload type we do not read
    #[error("{0}")]
    UnsupportedUpload(String),

    /// Extracted text failed an admission check
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Map a reqwest failure onto the user-facing taxonomy
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout(timeout_secs)
        } else if let Some(status) = err.status() {
            ExtractError::from_status(status.as_u16(), status.to_string())
        } else {
            ExtractError::Network(err.to_string())
        }
    }

    /// Map a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            403 | 404 => ExtractError::Inaccessible { status },
            _ => ExtractError::Http {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether the content was refused by the security scan
    pub fn is_security(&self) -> bool {
        matches!(self, ExtractError::Validation(f) if f.is_security())
    }

    /// Whether this is a problem with the input or the remote source, as
    /// opposed to a fault on our side
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExtractError::Io(_) | ExtractError::Other(_))
    }
}

impl From<GuardError> for ExtractError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Validation(failure) => ExtractError::Validation(failure),
            GuardError::IoError(e) => ExtractError::Io(e),
            other => ExtractError::Other(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ExtractError::from_status(403, "Forbidden"),
            ExtractError::Inaccessible { status: 403 }
        ));
        assert!(matches!(
            ExtractError::from_status(404, "Not Found"),
            ExtractError::Inaccessible { status: 404 }
        ));
        assert!(matches!(
            ExtractError::from_status(500, "Internal Server Error"),
            ExtractError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn test_messages_suggest_pasting() {
        let errors = [
            ExtractError::Timeout(10),
            ExtractError::Inaccessible { status: 404 },
            ExtractError::NoMeaningfulContent,
            ExtractError::Network("connection reset".into()),
            ExtractError::CaptionsUnavailable,
        ];
        for err in errors {
            assert!(err.to_string().contains("paste"), "{}", err);
        }
        assert!(ExtractError::Timeout(10)
            .to_string()
            .contains("took too long to respond"));
        assert!(ExtractError::Inaccessible { status: 403 }
            .to_string()
            .contains("not accessible"));
        assert!(ExtractError::NoMeaningfulContent
            .to_string()
            .contains("Could not extract meaningful content"));
        assert!(ExtractError::CaptionsUnavailable
            .to_string()
            .contains("captions enabled"));
    }

    #[test]
    fn test_guard_error_conversion() {
        let err: ExtractError = GuardError::Validation(ValidationFailure::Dangerous {
            pattern: "<script".into(),
        })
        .into();
        assert!(err.is_security());
        assert!(err.is_client_error());

        let err: ExtractError = GuardError::ConfigError("bad".into()).into();
        assert!(!err.is_client_error());
    }
}
