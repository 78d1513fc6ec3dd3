//! Markup stripping
//!
//! The HTML parser is the primary control: the input is parsed as a body
//! fragment and only text nodes are kept, so no tag or attribute can survive.
//! The regex backstop afterwards catches what a parser cannot see, such as
//! script fragments that were entity-encoded in the source and decoded into
//! plain text by parsing.

use crate::config::MarkupConfig;
use regex::Regex;
use scraper::{ElementRef, Html};

/// Text-only HTML sanitizer
pub struct Sanitizer {
    config: MarkupConfig,
    backstop: Backstop,
}

/// Residual patterns removed after markup stripping
struct Backstop {
    script_block: Regex,
    script_protocol: Regex,
    event_handler: Regex,
    encoded_script: Regex,
    encoded_bracket: Regex,
    tag_like: Regex,
}

impl Backstop {
    fn new() -> Self {
        Self {
            // <script ...> ... </script>, possibly spanning lines
            script_block: Regex::new(r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>").unwrap(),
            // javascript: / vbscript: (whitespace tolerated before the colon)
            script_protocol: Regex::new(r"(?i)(?:java|vb)script\s*:").unwrap(),
            // onclick= onerror = ...
            event_handler: Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap(),
            // &lt;script / &lt;/script / &#60;script
            encoded_script: Regex::new(r"(?i)(?:&lt;|&#0*60;|&#x0*3c;)\s*/?\s*script").unwrap(),
            // stray encoded angle brackets
            encoded_bracket: Regex::new(r"(?i)&(?:lt|gt);|&#0*6[02];|&#x0*3[ce];").unwrap(),
            // anything that still reads as an opening or closing tag
            tag_like: Regex::new(r"</?[A-Za-z!?][^<>]*>?").unwrap(),
        }
    }

    fn clean(&self, text: &str) -> String {
        let text = self.script_block.replace_all(text, "");
        let text = self.encoded_script.replace_all(&text, "");
        let text = self.encoded_bracket.replace_all(&text, "");
        let text = self.tag_like.replace_all(&text, "");
        let text = self.script_protocol.replace_all(&text, "");
        let text = self.event_handler.replace_all(&text, "");
        text.trim().to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(MarkupConfig::default())
    }
}

impl Sanitizer {
    /// Create a new sanitizer with the given configuration
    pub fn new(config: MarkupConfig) -> Self {
        Self {
            config,
            backstop: Backstop::new(),
        }
    }

    /// Strip all markup and residual script patterns from `text`.
    ///
    /// Total and idempotent: passes repeat until the output stops changing,
    /// so `sanitize(sanitize(x)) == sanitize(x)`. A pass never lengthens its
    /// input and only shortens it or folds a CR, so the loop terminates.
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// One parse + backstop pass
    fn pass(&self, text: &str) -> String {
        let normalized = normalize_controls(text);
        let stripped = if normalized.contains(['<', '&']) {
            self.strip_markup(&normalized)
        } else {
            normalized
        };
        self.backstop.clean(&stripped)
    }

    /// Parse as a body fragment and keep only text nodes
    fn strip_markup(&self, text: &str) -> String {
        let fragment = Html::parse_fragment(text);
        let mut out = String::with_capacity(text.len());
        self.collect_text(fragment.root_element(), &mut out);
        out
    }

    fn collect_text(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let name = child_element.value().name();
                if self.config.is_forbidden(name) {
                    continue;
                }
                self.collect_text(child_element, out);
                if self.config.is_block(name) && !out.ends_with('\n') {
                    out.push('\n');
                }
            } else if let Some(text_node) = child.value().as_text() {
                out.push_str(text_node);
            }
        }
    }
}

/// Fold CR/CRLF to LF and drop NULs, matching what the HTML tokenizer does,
/// so parsed and unparsed passes agree.
fn normalize_controls(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter_map(|c| match c {
            '\0' => None,
            '\r' => Some('\n'),
            other => Some(other),
        })
        .collect()
}
