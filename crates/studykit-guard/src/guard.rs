//! Main Guard implementation

use crate::audit::AuditLogger;
use crate::config::GuardConfig;
use crate::error::{Result, ValidationFailure};
use crate::markup::Sanitizer;
use crate::security::SecurityScanner;
use crate::types::{AuditResult, GuardContext, Stage, ValidationResult};
use crate::validate::validate_length;
use std::time::Instant;

/// Admission gate for text headed to the generation layer.
///
/// Stateless between calls; one instance can be shared across requests.
pub struct Guard {
    config: GuardConfig,
    sanitizer: Sanitizer,
    scanner: SecurityScanner,
    audit_logger: AuditLogger,
}

impl Default for Guard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl Guard {
    /// Create a new Guard with the given configuration
    pub fn new(config: GuardConfig) -> Self {
        Self {
            sanitizer: Sanitizer::new(config.markup.clone()),
            scanner: SecurityScanner::new(config.security.clone()),
            audit_logger: AuditLogger::new(config.audit.clone()),
            config,
        }
    }

    /// Strip markup; never fails
    pub fn sanitize(&self, text: &str) -> String {
        self.sanitizer.sanitize(text)
    }

    /// Emptiness and length check against the configured ceiling
    pub fn validate(&self, text: &str) -> ValidationResult {
        validate_length(text, self.config.limits.max_chars)
    }

    /// Scan already-sanitized text for dangerous residue
    pub fn check_security(&self, text: &str) -> ValidationResult {
        let scan = self.scanner.scan(text);
        match scan.first_pattern() {
            Some(pattern) => ValidationResult::invalid(ValidationFailure::Dangerous {
                pattern: pattern.to_string(),
            }),
            None => ValidationResult::valid(),
        }
    }

    /// Sanitize, then run the length and security checks in that order.
    ///
    /// Returns the sanitized text, or the first failing check.
    pub fn admit(&self, text: &str) -> Result<String> {
        self.admit_with_context(text, &GuardContext::default())
    }

    /// [`Guard::admit`] with request context for the audit trail
    pub fn admit_with_context(&self, text: &str, context: &GuardContext) -> Result<String> {
        let start = Instant::now();
        let clean = self.sanitize(text);
        let output_chars = clean.chars().count();

        let checks = [
            (Stage::Length, self.validate(&clean)),
            (Stage::Security, self.check_security(&clean)),
        ];
        for (stage, result) in checks {
            if let Some(failure) = result.failure {
                self.audit_logger.log(
                    context,
                    text,
                    output_chars,
                    AuditResult::Rejected {
                        stage,
                        reason: failure.to_string(),
                    },
                    start.elapsed().as_micros() as u64,
                );
                return Err(failure.into());
            }
        }

        let input_chars = text.chars().count();
        let result = if clean == text {
            AuditResult::Passed
        } else {
            AuditResult::Sanitized {
                removed_chars: input_chars.saturating_sub(output_chars),
            }
        };
        self.audit_logger.log(
            context,
            text,
            output_chars,
            result,
            start.elapsed().as_micros() as u64,
        );

        Ok(clean)
    }

    /// Submission ceiling in characters
    pub fn max_chars(&self) -> usize {
        self.config.limits.max_chars
    }

    /// Create a builder for Guard
    pub fn builder() -> GuardBuilder {
        GuardBuilder::new()
    }
}

/// Builder for Guard configuration
pub struct GuardBuilder {
    config: GuardConfig,
}

impl GuardBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: GuardConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the submission ceiling
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.config.limits.max_chars = max_chars;
        self
    }

    /// Add a custom dangerous substring
    pub fn deny_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.security.custom_patterns.push(pattern.into());
        self
    }

    /// Configure audit logging
    pub fn with_audit(mut self, config: crate::config::AuditConfig) -> Self {
        self.config.audit = config;
        self
    }

    /// Build the Guard
    pub fn build(self) -> Guard {
        Guard::new(self.config)
    }
}

impl Default for GuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}
