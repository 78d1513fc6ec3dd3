//! Configuration for StudyKit Guard

use crate::error::{GuardError, Result};
use crate::validate::DEFAULT_MAX_CHARS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for Guard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Markup stripping configuration
    pub markup: MarkupConfig,
    /// Dangerous-pattern scan configuration
    pub security: SecurityConfig,
    /// Length limits
    pub limits: LimitConfig,
    /// Audit configuration
    pub audit: AuditConfig,
}

impl GuardConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GuardError::ConfigError(e.to_string()))
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Config with the audit trail switched off
    pub fn quiet() -> Self {
        Self {
            audit: AuditConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Markup stripping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Elements removed together with everything inside them
    pub forbidden_elements: Vec<String>,
    /// Elements after which a line break is emitted so words don't run together
    pub block_elements: Vec<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        let forbidden = [
            "script", "style", "noscript", "template", "object", "embed", "applet", "iframe",
            "frame", "frameset", "form", "input", "button", "textarea", "select", "svg", "math",
            "title", "head", "link", "meta", "base",
        ];
        let block = [
            "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr",
            "blockquote", "pre", "section", "article", "table", "hr",
        ];
        Self {
            forbidden_elements: forbidden.iter().map(|s| s.to_string()).collect(),
            block_elements: block.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MarkupConfig {
    /// Whether an element (lowercase local name) must be dropped with its subtree
    pub fn is_forbidden(&self, name: &str) -> bool {
        self.forbidden_elements
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name))
    }

    /// Whether an element ends a block of text
    pub fn is_block(&self, name: &str) -> bool {
        self.block_elements.iter().any(|b| b.eq_ignore_ascii_case(name))
    }
}

/// Dangerous-pattern scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable the post-sanitization scan
    pub enabled: bool,
    /// Extra substrings (case-insensitive) treated as dangerous
    pub custom_patterns: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_patterns: vec![],
        }
    }
}

/// Length limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Absolute ceiling, in characters, for text handed to generation
    pub max_chars: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Enable audit events
    pub enabled: bool,
    /// Include a truncated copy of the content in events
    pub log_content: bool,
    /// Append JSON lines to this file as well
    pub log_file: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_content: false,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.limits.max_chars, 20_000);
        assert!(config.security.enabled);
        assert!(config.markup.is_forbidden("script"));
        assert!(config.markup.is_forbidden("IFRAME"));
        assert!(!config.markup.is_forbidden("p"));
        assert!(config.markup.is_block("p"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = GuardConfig::from_toml_str(
            r#"
            [limits]
            max_chars = 500

            [security]
            custom_patterns = ["<marquee"]
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_chars, 500);
        assert_eq!(config.security.custom_patterns, vec!["<marquee".to_string()]);
        // Untouched sections keep their defaults
        assert!(config.security.enabled);
        assert!(config.audit.enabled);
        assert!(config.markup.is_forbidden("object"));
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = GuardConfig::from_toml_str("limits = 3").unwrap_err();
        assert!(matches!(err, GuardError::ConfigError(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.toml");
        std::fs::write(&path, "[audit]\nenabled = false\n").unwrap();

        let config = GuardConfig::from_file(&path).unwrap();
        assert!(!config.audit.enabled);
    }
}
