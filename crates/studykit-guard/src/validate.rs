//! Length and emptiness check

use crate::error::ValidationFailure;
use crate::types::ValidationResult;

/// Absolute ceiling, in characters, on text submitted for generation
pub const DEFAULT_MAX_CHARS: usize = 20_000;

/// Reject content that is blank after trimming or longer than `max_chars`.
///
/// Length is counted in characters, not bytes.
pub fn validate_length(content: &str, max_chars: usize) -> ValidationResult {
    if content.trim().is_empty() {
        return ValidationResult::invalid(ValidationFailure::Empty);
    }

    let length = content.chars().count();
    if length > max_chars {
        return ValidationResult::invalid(ValidationFailure::TooLong {
            length,
            max: max_chars,
        });
    }

    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_blank() {
        assert_eq!(
            validate_length("", DEFAULT_MAX_CHARS).failure,
            Some(ValidationFailure::Empty)
        );
        assert_eq!(
            validate_length(" \n\t ", DEFAULT_MAX_CHARS).failure,
            Some(ValidationFailure::Empty)
        );
    }

    #[test]
    fn test_boundary() {
        let at_limit = "a".repeat(DEFAULT_MAX_CHARS);
        assert!(validate_length(&at_limit, DEFAULT_MAX_CHARS).is_valid);

        let over = "a".repeat(DEFAULT_MAX_CHARS + 1);
        let result = validate_length(&over, DEFAULT_MAX_CHARS);
        assert!(!result.is_valid);
        assert_eq!(
            result.failure,
            Some(ValidationFailure::TooLong {
                length: DEFAULT_MAX_CHARS + 1,
                max: DEFAULT_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 3 bytes per char
        let text = "語".repeat(10);
        assert!(validate_length(&text, 10).is_valid);
        assert!(!validate_length(&text, 9).is_valid);
    }
}
