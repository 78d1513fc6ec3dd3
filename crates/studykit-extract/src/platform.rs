//! Video platform access
//!
//! [`VideoPlatform`] is the seam between transcript assembly and the network.
//! [`YouTubeClient`] reads the player response embedded in a watch page and
//! downloads timedtext caption tracks.

use crate::{body::read_limited, config::ExtractorConfig, error::Result, ExtractError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Metadata and caption tracks for one video
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub duration_secs: Option<u64>,
    pub view_count: Option<u64>,
    pub publish_date: Option<String>,
    pub description: String,
    pub caption_tracks: Vec<CaptionTrack>,
}

/// A caption track the platform offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Where the timedtext document lives
    pub base_url: String,
    /// BCP-47 code, e.g. `en` or `en-GB`
    pub language_code: String,
    /// Display name
    pub name: Option<String>,
    /// Speech-recognition track rather than uploaded captions
    pub auto_generated: bool,
}

/// One timed caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub start_secs: f64,
    pub duration_secs: f64,
    pub text: String,
}

/// Resolves a video id to metadata and caption text
#[async_trait::async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Metadata and the list of caption tracks
    async fn video_details(&self, video_id: &str) -> Result<VideoDetails>;

    /// Timed segments of one caption track
    async fn caption_segments(&self, track: &CaptionTrack) -> Result<Vec<CaptionSegment>>;
}

static PLAYER_RESPONSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ytInitialPlayerResponse\s*=\s*").unwrap());
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);").unwrap());
static TEXT_ELEMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("text").unwrap());
static P_ELEMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// YouTube watch-page client
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    language: String,
    timeout_secs: u64,
    max_body_bytes: usize,
}

impl YouTubeClient {
    /// Create a client using the extractor's timeout, user agent and YouTube settings
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ExtractError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.youtube.base_url.trim_end_matches('/').to_string(),
            language: config.youtube.preferred_language.clone(),
            timeout_secs: config.timeout_secs,
            max_body_bytes: config.max_body_bytes,
        })
    }

    async fn get_text(&self, url: &str) -> Result<(u16, String)> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, format!("{};q=1.0,en;q=0.8", self.language))
            .header(COOKIE, "CONSENT=YES+1")
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status().as_u16();
        let body = read_limited(response, self.max_body_bytes, self.timeout_secs).await?;
        Ok((status, body.text()))
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

#[async_trait::async_trait]
impl VideoPlatform for YouTubeClient {
    async fn video_details(&self, video_id: &str) -> Result<VideoDetails> {
        let url = format!("{}/watch?v={}&hl={}", self.base_url, video_id, self.language);
        debug!(video_id, "Fetching watch page");

        let (status, html) = self.get_text(&url).await?;
        match status {
            200..=299 => {}
            404 => return Err(ExtractError::VideoUnavailable("video not found".into())),
            other => return Err(ExtractError::from_status(other, "watch page request failed")),
        }

        let player = parse_player_response(&html)?;
        player.into_details(video_id)
    }

    async fn caption_segments(&self, track: &CaptionTrack) -> Result<Vec<CaptionSegment>> {
        let url = self.absolute(&track.base_url);
        let (status, body) = self.get_text(&url).await?;
        if !(200..300).contains(&status) {
            return Err(ExtractError::from_status(status, "caption track request failed"));
        }
        Ok(parse_timedtext(&body))
    }
}

/// Read the player response object embedded in a watch page
pub(crate) fn parse_player_response(html: &str) -> Result<PlayerResponse> {
    let start = PLAYER_RESPONSE
        .find(html)
        .map(|m| m.end())
        .ok_or_else(|| ExtractError::VideoUnavailable("video details could not be read".into()))?;

    // The object is followed by more script; read exactly one JSON value
    let mut values = serde_json::Deserializer::from_str(&html[start..]).into_iter::<PlayerResponse>();
    match values.next() {
        Some(parsed) => Ok(parsed?),
        None => Err(ExtractError::Parse("empty player response".into())),
    }
}

/// Parse a timedtext document. Handles both the legacy `<text start dur>`
/// format (seconds) and the `<p t d>` format (milliseconds).
pub(crate) fn parse_timedtext(xml: &str) -> Vec<CaptionSegment> {
    let document = Html::parse_fragment(xml);

    let mut segments: Vec<CaptionSegment> = document
        .select(&TEXT_ELEMENT)
        .map(|el| CaptionSegment {
            start_secs: attr_f64(el.value().attr("start")),
            duration_secs: attr_f64(el.value().attr("dur")),
            text: decode_entities(&el.text().collect::<String>()),
        })
        .collect();

    if segments.is_empty() {
        segments = document
            .select(&P_ELEMENT)
            .map(|el| CaptionSegment {
                start_secs: attr_f64(el.value().attr("t")) / 1000.0,
                duration_secs: attr_f64(el.value().attr("d")) / 1000.0,
                text: decode_entities(&el.text().collect::<String>()),
            })
            .collect();
    }

    segments.retain(|s| !s.text.trim().is_empty());
    segments
}

fn attr_f64(value: Option<&str>) -> f64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0.0)
}

/// Caption text is entity-encoded twice; the parser undoes one layer
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = entity.trim_start_matches('#');
                    let parsed = match code.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => code.parse().ok(),
                    };
                    parsed.and_then(char::from_u32)
                }
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<RawVideoDetails>,
    microformat: Option<Microformat>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideoDetails {
    title: Option<String>,
    author: Option<String>,
    length_seconds: Option<String>,
    view_count: Option<String>,
    short_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Microformat {
    player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicroformatRenderer {
    publish_date: Option<String>,
    owner_channel_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    name: Option<TextRuns>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRuns {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
struct Run {
    text: String,
}

impl TextRuns {
    fn into_text(self) -> String {
        self.simple_text
            .unwrap_or_else(|| self.runs.into_iter().map(|r| r.text).collect())
    }
}

impl PlayerResponse {
    fn into_details(self, video_id: &str) -> Result<VideoDetails> {
        if let Some(status) = self.playability_status {
            if status.status != "OK" {
                return Err(ExtractError::VideoUnavailable(
                    status.reason.unwrap_or_else(|| status.status.to_lowercase()),
                ));
            }
        }

        let details = self.video_details.ok_or_else(|| {
            ExtractError::VideoUnavailable("video details missing from page".into())
        })?;
        let renderer = self.microformat.and_then(|m| m.player_microformat_renderer);

        let caption_tracks = self
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default()
            .into_iter()
            .map(|t| CaptionTrack {
                auto_generated: t.kind.as_deref() == Some("asr"),
                name: t.name.map(TextRuns::into_text),
                base_url: t.base_url,
                language_code: t.language_code,
            })
            .collect();

        let (publish_date, owner) = match renderer {
            Some(r) => (r.publish_date, r.owner_channel_name),
            None => (None, None),
        };

        Ok(VideoDetails {
            video_id: video_id.to_string(),
            title: details.title,
            channel: details.author.or(owner),
            duration_secs: details.length_seconds.and_then(|s| s.parse().ok()),
            view_count: details.view_count.and_then(|s| s.parse().ok()),
            publish_date,
            description: details.short_description.unwrap_or_default(),
            caption_tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {
        "playabilityStatus": {"status": "OK"},
        "videoDetails": {
            "videoId": "abc123",
            "title": "How Vaccines Work",
            "author": "Science Channel",
            "lengthSeconds": "754",
            "viewCount": "1234567",
            "shortDescription": "0:00 Introduction\n2:15 The immune system"
        },
        "microformat": {"playerMicroformatRenderer": {"publishDate": "2023-04-01"}},
        "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
            {"baseUrl": "/api/timedtext?v=abc123&lang=en", "languageCode": "en",
             "name": {"simpleText": "English"}},
            {"baseUrl": "/api/timedtext?v=abc123&lang=en&kind=asr", "languageCode": "en",
             "kind": "asr", "name": {"runs": [{"text": "English "}, {"text": "(auto)"}]}}
        ]}}
    };var meta = {"x": 1};</script></html>"#;

    #[test]
    fn test_parse_player_response() {
        let details = parse_player_response(WATCH_PAGE)
            .unwrap()
            .into_details("abc123")
            .unwrap();

        assert_eq!(details.title.as_deref(), Some("How Vaccines Work"));
        assert_eq!(details.channel.as_deref(), Some("Science Channel"));
        assert_eq!(details.duration_secs, Some(754));
        assert_eq!(details.view_count, Some(1_234_567));
        assert_eq!(details.publish_date.as_deref(), Some("2023-04-01"));
        assert_eq!(details.caption_tracks.len(), 2);
        assert!(!details.caption_tracks[0].auto_generated);
        assert!(details.caption_tracks[1].auto_generated);
        assert_eq!(details.caption_tracks[1].name.as_deref(), Some("English (auto)"));
    }

    #[test]
    fn test_unplayable_video() {
        let html = r#"ytInitialPlayerResponse = {"playabilityStatus":
            {"status": "LOGIN_REQUIRED", "reason": "This video is private"}};"#;
        let err = parse_player_response(html)
            .unwrap()
            .into_details("x")
            .unwrap_err();
        assert!(matches!(err, ExtractError::VideoUnavailable(ref r) if r == "This video is private"));
    }

    #[test]
    fn test_missing_player_response() {
        let err = parse_player_response("<html>consent wall</html>").unwrap_err();
        assert!(matches!(err, ExtractError::VideoUnavailable(_)));
    }

    #[test]
    fn test_no_captions() {
        let html = r#"ytInitialPlayerResponse = {"videoDetails": {"title": "Silent"}};"#;
        let details = parse_player_response(html)
            .unwrap()
            .into_details("x")
            .unwrap();
        assert!(details.caption_tracks.is_empty());
        assert_eq!(details.description, "");
    }

    #[test]
    fn test_parse_legacy_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.5" dur="2.1">Hello &amp;#39;world&amp;#39;</text>
            <text start="2.6" dur="1.0">   </text>
            <text start="3.6" dur="2">cats &amp;amp; dogs</text>
        </transcript>"#;
        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello 'world'");
        assert_eq!(segments[0].start_secs, 0.5);
        assert_eq!(segments[1].text, "cats & dogs");
    }

    #[test]
    fn test_parse_srv3_timedtext() {
        let xml = r#"<timedtext format="3"><body>
            <p t="1500" d="2000">first line</p>
            <p t="3500" d="1000"><s>second</s><s> line</s></p>
        </body></timedtext>"#;
        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_secs, 1.5);
        assert_eq!(segments[1].text, "second line");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &#39;b&#39; &#x26; &quot;c&quot;"), "a 'b' & \"c\"");
        assert_eq!(decode_entities("&unknown; &#xZZ;"), "&unknown; &#xZZ;");
    }
}
