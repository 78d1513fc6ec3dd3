//! Content-type detection
//!
//! Raw input is classified by an ordered list of named matchers. Order is
//! significant: every YouTube link is also an http(s) URL, so the YouTube
//! matcher has to run first.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static YOUTUBE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]+)").unwrap()
});

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+").unwrap());

/// What kind of input the user handed us
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentType {
    /// Pasted text, used as-is
    Text,
    /// Article or page URL
    Url,
    /// YouTube video link; the id is parsed once, here
    YouTube { video_id: String },
}

impl ContentType {
    /// Stable tag used for storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Url => "url",
            ContentType::YouTube { .. } => "youtube",
        }
    }

    /// Video id for YouTube input
    pub fn video_id(&self) -> Option<&str> {
        match self {
            ContentType::YouTube { video_id } => Some(video_id),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named classifier, tried in priority order
struct Matcher {
    name: &'static str,
    classify: fn(&str) -> Option<ContentType>,
}

const MATCHERS: &[Matcher] = &[
    Matcher {
        name: "youtube",
        classify: match_youtube,
    },
    Matcher {
        name: "url",
        classify: match_url,
    },
];

fn match_youtube(input: &str) -> Option<ContentType> {
    youtube_video_id(input).map(|video_id| ContentType::YouTube { video_id })
}

fn match_url(input: &str) -> Option<ContentType> {
    URL_PATTERN.is_match(input).then_some(ContentType::Url)
}

/// Classify raw input. Never fails; anything unrecognized is text.
pub fn detect(input: &str) -> ContentType {
    let trimmed = input.trim();
    MATCHERS
        .iter()
        .find_map(|m| {
            let found = (m.classify)(trimmed);
            if found.is_some() {
                tracing::trace!(matcher = m.name, "Content type matched");
            }
            found
        })
        .unwrap_or(ContentType::Text)
}

/// Video id from a `watch?v=`, `youtu.be/` or `embed/` link
pub fn youtube_video_id(input: &str) -> Option<String> {
    YOUTUBE_PATTERN
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
