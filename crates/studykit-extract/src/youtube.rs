//! YouTube transcript extraction
//!
//! Turns a video link into a text document: a metadata header, an optional
//! list of key sections, then the caption transcript.

use crate::{
    config::ExtractorConfig,
    detect::{youtube_video_id, ContentType},
    error::Result,
    platform::{CaptionSegment, CaptionTrack, VideoDetails, VideoPlatform, YouTubeClient},
    text::{collapse_whitespace, truncate_with_marker},
    ExtractError, ExtractedContent, Extractor,
};
use studykit_guard::group_thousands;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

/// Canonical watch URL written into the header
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Transcripts shorter than this are not worth generating from
const MIN_TRANSCRIPT_CHARS: usize = 50;

/// Longest line accepted as a section heading
const MAX_SECTION_CHARS: usize = 100;

static SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 0:00 Intro, (12:30) - Results, 1:02:03 | Wrap-up
        r"^\(?(?:\d{1,2}:)?\d{1,2}:\d{2}\)?\s*[-:|.]?\s*\S.*$",
        r"(?i)^chapter\s+\d+\s*[:.\-]\s*\S.*$",
        r"^\d{1,2}[.)]\s+[A-Z].*$",
        r"(?i)^(?:introduction|overview|background|summary|conclusion|recap|key takeaways|wrap[- ]up)\b.*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Caption-based transcript extractor
pub struct TranscriptExtractor {
    config: ExtractorConfig,
    platform: Arc<dyn VideoPlatform>,
}

impl TranscriptExtractor {
    /// Create an extractor backed by the real YouTube client
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let client = YouTubeClient::new(&config)?;
        Ok(Self::with_platform(config, Arc::new(client)))
    }

    /// Create an extractor over any video platform
    pub fn with_platform(config: ExtractorConfig, platform: Arc<dyn VideoPlatform>) -> Self {
        Self { config, platform }
    }

    /// Build the transcript document for an already-parsed video id
    pub async fn extract_video(&self, video_id: &str, source: &str) -> Result<ExtractedContent> {
        let details = self.platform.video_details(video_id).await?;
        let track = select_track(&details.caption_tracks, &self.config.youtube.preferred_language)
            .ok_or(ExtractError::CaptionsUnavailable)?;
        debug!(
            video_id,
            language = %track.language_code,
            auto_generated = track.auto_generated,
            "Selected caption track"
        );

        let mut segments = self.platform.caption_segments(track).await?;
        segments.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));

        let transcript = join_segments(&segments);
        if transcript.chars().count() < MIN_TRANSCRIPT_CHARS {
            return Err(ExtractError::TranscriptTooShort);
        }

        let sections = key_sections(
            &details.description,
            &segments,
            self.config.youtube.max_key_sections,
        );
        let document = assemble(&details, &sections, &transcript, self.config.youtube.description_chars);
        let original_length = document.chars().count();
        let (text, truncated) = truncate_with_marker(&document, self.config.max_length);

        info!(
            video_id,
            segments = segments.len(),
            key_sections = sections.len(),
            transcript_chars = transcript.chars().count(),
            truncated,
            "Extracted video transcript"
        );

        let mut result = ExtractedContent::new(
            text,
            ContentType::YouTube {
                video_id: video_id.to_string(),
            },
            source,
        )
        .with_original_length(original_length)
        .with_truncated(truncated)
        .with_metadata("caption_language", track.language_code.clone())
        .with_metadata("auto_generated", track.auto_generated.to_string());

        if let Some(title) = &details.title {
            result = result.with_title(title.clone());
        }
        if let Some(channel) = &details.channel {
            result = result.with_metadata("channel", channel.clone());
        }

        Ok(result)
    }
}

#[async_trait::async_trait]
impl Extractor for TranscriptExtractor {
    async fn extract(&self, source: &str) -> Result<ExtractedContent> {
        let video_id = youtube_video_id(source).ok_or_else(|| {
            ExtractError::InvalidUrl(format!("{} (no YouTube video id found)", source.trim()))
        })?;
        self.extract_video(&video_id, source.trim()).await
    }
}

/// Preferred language first (uploaded captions before speech recognition),
/// then whatever is listed first
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matches_language = |t: &&CaptionTrack| {
        t.language_code.eq_ignore_ascii_case(language)
            || t.language_code
                .to_ascii_lowercase()
                .starts_with(&format!("{}-", language.to_ascii_lowercase()))
    };

    tracks
        .iter()
        .filter(matches_language)
        .min_by_key(|t| t.auto_generated)
        .or_else(|| tracks.first())
}

fn join_segments(segments: &[CaptionSegment]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

/// Chapter-like lines from the description, then from the captions
fn key_sections(description: &str, segments: &[CaptionSegment], max: usize) -> Vec<String> {
    let candidates = description
        .lines()
        .map(str::to_string)
        .chain(segments.iter().map(|s| s.text.clone()));

    let mut sections: Vec<String> = Vec::new();
    for candidate in candidates {
        if sections.len() >= max {
            break;
        }
        let line = collapse_whitespace(&candidate);
        if line.is_empty() || line.chars().count() > MAX_SECTION_CHARS {
            continue;
        }
        if SECTION_PATTERNS.iter().any(|p| p.is_match(&line)) && !sections.contains(&line) {
            sections.push(line);
        }
    }
    sections
}

/// `H:MM:SS` for an hour or more, `M:SS` otherwise
pub fn format_duration(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

fn assemble(
    details: &VideoDetails,
    sections: &[String],
    transcript: &str,
    description_chars: usize,
) -> String {
    const UNKNOWN: &str = "Unknown";
    let mut doc = String::with_capacity(transcript.len() + 1024);

    doc.push_str(&format!("Title: {}\n", details.title.as_deref().unwrap_or(UNKNOWN)));
    doc.push_str(&format!("Channel: {}\n", details.channel.as_deref().unwrap_or(UNKNOWN)));
    doc.push_str(&format!(
        "Duration: {}\n",
        details
            .duration_secs
            .map(format_duration)
            .unwrap_or_else(|| UNKNOWN.to_string())
    ));
    doc.push_str(&format!(
        "Views: {}\n",
        details
            .view_count
            .map(group_thousands)
            .unwrap_or_else(|| UNKNOWN.to_string())
    ));
    doc.push_str(&format!(
        "Published: {}\n",
        details.publish_date.as_deref().unwrap_or(UNKNOWN)
    ));
    doc.push_str(&format!("Source: {WATCH_URL}{}\n", details.video_id));

    let description = collapse_whitespace(&details.description);
    if !description.is_empty() {
        let (description, _) = truncate_with_marker(&description, description_chars);
        doc.push_str(&format!("Description: {description}\n"));
    }

    if !sections.is_empty() {
        doc.push_str("\nKey Sections:\n");
        for section in sections {
            doc.push_str(&format!("- {section}\n"));
        }
    }

    doc.push_str("\nTranscript:\n");
    doc.push_str(transcript);
    doc
}
