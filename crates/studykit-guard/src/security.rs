//! Post-sanitization scan for script-like residue
//!
//! Runs on text the sanitizer already cleaned. A hit here means something got
//! through, so the content is refused outright instead of being stripped again.

use crate::config::SecurityConfig;
use regex::Regex;

/// Dangerous-pattern scanner
pub struct SecurityScanner {
    config: SecurityConfig,
    patterns: Vec<DangerPattern>,
}

/// A built-in pattern with its category
struct DangerPattern {
    name: &'static str,
    regex: Regex,
    kind: ThreatKind,
}

/// Categories of residue the scanner recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatKind {
    /// `<script`
    ScriptTag,
    /// `javascript:`
    ScriptProtocol,
    /// `onload=` and friends
    EventHandler,
    /// `<iframe`
    EmbeddedFrame,
    /// `<object` / `<embed`
    EmbeddedObject,
    /// `eval(`
    DynamicEval,
    /// `document.write`
    DocumentWrite,
    /// Operator-supplied pattern
    Custom,
}

/// Result of a scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Whether anything matched
    pub detected: bool,
    /// Every match, in pattern order
    pub findings: Vec<Finding>,
}

/// A single match
#[derive(Debug, Clone)]
pub struct Finding {
    /// Category of the match
    pub kind: ThreatKind,
    /// Name of the pattern that matched
    pub pattern: String,
    /// Byte offset in the scanned text
    pub position: usize,
}

impl ScanResult {
    /// Name of the first matching pattern
    pub fn first_pattern(&self) -> Option<&str> {
        self.findings.first().map(|f| f.pattern.as_str())
    }
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new(SecurityConfig::default())
    }
}

impl SecurityScanner {
    /// Create a new scanner
    pub fn new(config: SecurityConfig) -> Self {
        let pattern = |name, re: &str, kind| DangerPattern {
            name,
            regex: Regex::new(re).unwrap(),
            kind,
        };
        let patterns = vec![
            pattern("<script", r"(?i)<script", ThreatKind::ScriptTag),
            pattern("javascript:", r"(?i)javascript:", ThreatKind::ScriptProtocol),
            pattern("on*=", r"(?i)\bon[a-z]+\s*=", ThreatKind::EventHandler),
            pattern("<iframe", r"(?i)<iframe", ThreatKind::EmbeddedFrame),
            pattern("<object", r"(?i)<object", ThreatKind::EmbeddedObject),
            pattern("<embed", r"(?i)<embed", ThreatKind::EmbeddedObject),
            pattern("eval(", r"(?i)\beval\s*\(", ThreatKind::DynamicEval),
            pattern("document.write", r"(?i)document\.write", ThreatKind::DocumentWrite),
        ];

        Self { config, patterns }
    }

    /// Scan text for dangerous patterns
    pub fn scan(&self, text: &str) -> ScanResult {
        if !self.config.enabled {
            return ScanResult {
                detected: false,
                findings: vec![],
            };
        }

        let mut findings = vec![];

        for pattern in &self.patterns {
            if let Some(m) = pattern.regex.find(text) {
                findings.push(Finding {
                    kind: pattern.kind,
                    pattern: pattern.name.to_string(),
                    position: m.start(),
                });
            }
        }

        if !self.config.custom_patterns.is_empty() {
            let text_lower = text.to_lowercase();
            for custom in &self.config.custom_patterns {
                if let Some(pos) = text_lower.find(&custom.to_lowercase()) {
                    findings.push(Finding {
                        kind: ThreatKind::Custom,
                        pattern: custom.clone(),
                        position: pos,
                    });
                }
            }
        }

        ScanResult {
            detected: !findings.is_empty(),
            findings,
        }
    }
}
