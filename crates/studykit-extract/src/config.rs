//! Extractor configuration

use serde::{Deserialize, Serialize};

/// Browser user agent sent with page and video requests. Some sites refuse
/// requests that identify as a bot or as a bare HTTP library.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Configuration for content extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum extracted text length (in characters) before truncation
    pub max_length: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent for web requests
    pub user_agent: String,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Maximum redirects to follow
    pub max_redirects: usize,

    /// Largest response body accepted, in bytes
    pub max_body_bytes: usize,

    /// Largest upload accepted, in bytes
    pub max_upload_bytes: usize,

    /// A content container is accepted once its text is longer than this
    pub min_selector_chars: usize,

    /// Paragraphs at or below this length are skipped by the paragraph fallback
    pub min_paragraph_chars: usize,

    /// Below this length the whole body is used instead
    pub min_fallback_chars: usize,

    /// Final text shorter than this is treated as "nothing meaningful"
    pub min_content_chars: usize,

    /// YouTube-specific settings
    pub youtube: YouTubeConfig,
}

/// YouTube transcript settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Site root used to build watch-page URLs
    pub base_url: String,

    /// Caption language tried before falling back to the first listed track
    pub preferred_language: String,

    /// Description characters kept in the header block
    pub description_chars: usize,

    /// Maximum number of key sections listed
    pub max_key_sections: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_length: 15_000,
            timeout_secs: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
            follow_redirects: true,
            max_redirects: 5,
            max_body_bytes: 5 * 1024 * 1024,
            max_upload_bytes: 5 * 1024 * 1024,
            min_selector_chars: 200,
            min_paragraph_chars: 50,
            min_fallback_chars: 100,
            min_content_chars: 50,
            youtube: YouTubeConfig::default(),
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            preferred_language: "en".to_string(),
            description_chars: 500,
            max_key_sections: 10,
        }
    }
}

impl ExtractorConfig {
    /// Create a new config with custom max length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Create a new config with custom timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Point YouTube requests at another host
    pub fn with_youtube_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.youtube.base_url = base_url.into();
        self
    }

    /// Set the preferred caption language
    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.youtube.preferred_language = language.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.max_length, 15_000);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.youtube.max_key_sections, 10);
    }

    #[test]
    fn test_builders() {
        let config = ExtractorConfig::default()
            .with_max_length(100)
            .with_timeout(2)
            .with_youtube_base_url("http://127.0.0.1:9")
            .with_preferred_language("de");
        assert_eq!(config.max_length, 100);
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.youtube.base_url, "http://127.0.0.1:9");
        assert_eq!(config.youtube.preferred_language, "de");
    }
}
