//! Extraction orchestrator
//!
//! `detect -> extract -> sanitize -> length check -> security check`, strictly
//! in that order. The first failing stage ends the request; nothing is retried
//! and no partial result is returned.

use crate::{
    config::ExtractorConfig,
    detect::{detect, ContentType},
    error::Result,
    upload::SpooledUpload,
    web::WebExtractor,
    youtube::TranscriptExtractor,
    ExtractError, ExtractedContent, Extractor,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use studykit_guard::{Guard, GuardConfig, GuardContext};
use tracing::{debug, warn};

/// Source label used for pasted text
pub const TEXT_SOURCE: &str = "text";

/// Extractor and guard settings, loadable from one TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extractor: ExtractorConfig,
    pub guard: GuardConfig,
}

impl PipelineConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ExtractError::Parse(format!("invalid config: {e}")))
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// The single entry point from raw input to admitted text
pub struct ContentPipeline {
    config: ExtractorConfig,
    web: Box<dyn Extractor>,
    transcripts: TranscriptExtractor,
    guard: Guard,
}

impl ContentPipeline {
    /// Pipeline with the network-backed extractors
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let web = WebExtractor::new(config.extractor.clone())?;
        let transcripts = TranscriptExtractor::new(config.extractor.clone())?;
        Ok(Self::with_parts(
            config.extractor,
            Box::new(web),
            transcripts,
            Guard::new(config.guard),
        ))
    }

    /// Pipeline over caller-supplied parts
    pub fn with_parts(
        config: ExtractorConfig,
        web: Box<dyn Extractor>,
        transcripts: TranscriptExtractor,
        guard: Guard,
    ) -> Self {
        Self {
            config,
            web,
            transcripts,
            guard,
        }
    }

    /// Turn raw user input into sanitized, bounded text
    pub async fn process(&self, input: &str) -> Result<ExtractedContent> {
        let content_type = detect(input);
        debug!(content_type = %content_type, input_len = input.len(), "Processing input");

        let extracted = match &content_type {
            ContentType::Text => {
                ExtractedContent::new(input.trim().to_string(), ContentType::Text, TEXT_SOURCE)
                    .with_original_length(input.chars().count())
            }
            ContentType::Url => self.web.extract(input.trim()).await?,
            ContentType::YouTube { video_id } => {
                self.transcripts.extract_video(video_id, input.trim()).await?
            }
        };

        self.admit(extracted)
    }

    /// Read a spooled upload and run it through the same admission stages as
    /// pasted text. The spool file is removed before this returns.
    pub async fn process_upload(
        &self,
        upload: SpooledUpload,
        mime: &str,
        filename: Option<&str>,
    ) -> Result<ExtractedContent> {
        let text = upload.into_text(mime, filename).await?;
        let original_length = text.chars().count();

        let mut extracted = ExtractedContent::new(
            text.trim().to_string(),
            ContentType::Text,
            filename.unwrap_or("upload"),
        )
        .with_original_length(original_length)
        .with_metadata("mime", mime);
        if let Some(name) = filename {
            extracted = extracted.with_title(name);
        }

        self.admit(extracted)
    }

    fn admit(&self, extracted: ExtractedContent) -> Result<ExtractedContent> {
        let context = GuardContext::new().with_source(extracted.content_type.as_str());
        match self.guard.admit_with_context(&extracted.text, &context) {
            Ok(clean) => Ok(extracted.with_sanitized_text(clean)),
            Err(e) => {
                warn!(
                    request_id = %context.request_id,
                    content_type = %extracted.content_type,
                    error = %e,
                    "Extracted content rejected"
                );
                Err(e.into())
            }
        }
    }

    /// Extractor settings in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Submission ceiling in characters
    pub fn max_chars(&self) -> usize {
        self.guard.max_chars()
    }
}
