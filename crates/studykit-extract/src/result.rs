//! Extraction result types

use crate::detect::ContentType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Plain text produced by exactly one extraction path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// The extracted text content
    pub text: String,

    /// Detected input type
    pub content_type: ContentType,

    /// Source URL, or a label for pasted text and uploads
    pub source: String,

    /// Page or video title
    pub title: Option<String>,

    /// Length of what was fetched or received, in characters
    pub original_length: usize,

    /// Text length in characters
    pub text_length: usize,

    /// Whether the text was cut at the extractor bound
    pub truncated: bool,

    /// Metadata extracted from the source
    pub metadata: HashMap<String, String>,

    /// Whether the text went through the sanitizer and admission checks
    pub sanitized: bool,
}

impl ExtractedContent {
    /// Create a new extraction result
    pub fn new(text: String, content_type: ContentType, source: impl Into<String>) -> Self {
        let text_length = text.chars().count();
        Self {
            original_length: text_length,
            text,
            content_type,
            source: source.into(),
            title: None,
            text_length,
            truncated: false,
            metadata: HashMap::new(),
            sanitized: false,
        }
    }

    /// Set the original length
    pub fn with_original_length(mut self, length: usize) -> Self {
        self.original_length = length;
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Mark as truncated
    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Replace the text with its admitted form
    pub fn with_sanitized_text(mut self, text: String) -> Self {
        self.text_length = text.chars().count();
        self.text = text;
        self.sanitized = true;
        self
    }

    /// Video id when the content came from a YouTube link
    pub fn video_id(&self) -> Option<&str> {
        self.content_type.video_id()
    }
}
