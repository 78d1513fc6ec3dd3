//! # StudyKit Extract
//!
//! Content extraction with sanitization via `studykit-guard`.
//!
//! Takes whatever the user handed over (pasted text, an article URL or a
//! YouTube link) and produces one bounded, markup-free text blob that is safe
//! to put in a prompt.
//!
//! ## Features
//!
//! - **Detection**: ordered matchers classify input as text, URL or YouTube video
//! - **Web Extraction**: fetch a page and keep its main readable text
//! - **Transcripts**: caption track plus video metadata as a text document
//! - **Uploads**: plain-text files spooled through a temporary file
//! - **Admission**: every path ends in `studykit-guard`'s sanitize and checks
//!
//! ## Example
//!
//! ```rust,ignore
//! use studykit_extract::{ContentPipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = ContentPipeline::new(PipelineConfig::default())?;
//!     let content = pipeline.process("https://example.com/article").await?;
//!     println!("{} ({} chars)", content.content_type, content.text_length);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Raw input  │ ──► │   Detector   │ ──► │    Extractor     │ ──► │ StudyKit Guard  │
//! │             │     │ (youtube/url │     │ (web / captions  │     │ (sanitize, len, │
//! │             │     │  /text)      │     │  / passthrough)  │     │  security scan) │
//! └─────────────┘     └──────────────┘     └──────────────────┘     └─────────────────┘
//!                                                                            │
//!                                                                            ▼
//!                                                                   ┌─────────────────┐
//!                                                                   │  Clean Output   │
//!                                                                   │  (LLM-Ready)    │
//!                                                                   └─────────────────┘
//! ```

mod body;
pub mod config;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod result;
pub mod text;
pub mod upload;
pub mod web;
pub mod youtube;

pub use config::{ExtractorConfig, YouTubeConfig};
pub use detect::{detect, youtube_video_id, ContentType};
pub use error::{ExtractError, Result};
pub use pipeline::{ContentPipeline, PipelineConfig};
pub use platform::{CaptionSegment, CaptionTrack, VideoDetails, VideoPlatform, YouTubeClient};
pub use result::ExtractedContent;
pub use upload::{SpooledUpload, UploadKind};
pub use web::WebExtractor;
pub use youtube::TranscriptExtractor;

/// Common trait for all extractors
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text content from the given source
    async fn extract(&self, source: &str) -> Result<ExtractedContent>;
}
