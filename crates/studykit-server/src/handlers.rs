//! HTTP handlers

use crate::app::AppState;
use crate::error::{AppError, Result};
use crate::model::{ComplexityLevel, LearningContent, Materials, NewContent};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use studykit_extract::{ExtractError, SpooledUpload};
use studykit_guard::ValidationFailure;
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// API Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub content: Option<String>,
    pub complexity_level: Option<i64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn complexity(level: Option<i64>) -> Result<ComplexityLevel> {
    match level {
        None => Ok(ComplexityLevel::default()),
        Some(level) => ComplexityLevel::try_from(level).map_err(AppError::BadRequest),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn process_content(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<LearningContent>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let content = request
        .content
        .ok_or_else(|| AppError::BadRequest("Content is required".into()))?;
    if content.trim().is_empty() {
        return Err(ExtractError::Validation(ValidationFailure::Empty).into());
    }
    let level = complexity(request.complexity_level)?;

    let extracted = state.pipeline.process(&content).await?;
    info!(
        content_type = %extracted.content_type,
        chars = extracted.text_length,
        truncated = extracted.truncated,
        level = level.get(),
        "Content extracted"
    );

    let record = materialize(&state, NewContent::from_extracted(&extracted, level)).await?;
    Ok(Json(record))
}

pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<LearningContent>> {
    let mut upload = None;
    let mut level = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let filename = field.file_name().map(str::to_string);

                let mut spool = SpooledUpload::new(state.pipeline.config().max_upload_bytes)?;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?
                {
                    spool.write_chunk(&chunk).await?;
                }
                debug!(?filename, mime = %mime, bytes = spool.len(), "Upload received");
                upload = Some((spool, mime, filename));
            }
            Some("complexityLevel") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                let parsed = text.trim().parse::<i64>().map_err(|_| {
                    AppError::BadRequest("Complexity level must be a number".into())
                })?;
                level = Some(parsed);
            }
            _ => {}
        }
    }

    let (spool, mime, filename) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    let level = complexity(level)?;

    let extracted = state
        .pipeline
        .process_upload(spool, &mime, filename.as_deref())
        .await?;

    let record = materialize(&state, NewContent::from_extracted(&extracted, level)).await?;
    Ok(Json(record))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<LearningContent>> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Store the record, then produce all seven artifacts concurrently. The
/// record stays stored without materials when generation fails.
async fn materialize(state: &AppState, content: NewContent) -> Result<LearningContent> {
    let record = state.store.create(content).await?;
    let text = record.original_content.as_str();
    let level = record.complexity_level;
    let generator = &state.generator;

    let (summary, flashcards, quiz, mind_map, learning_path, key_terms, additional_resources) =
        tokio::try_join!(
            generator.summary(text, level),
            generator.flashcards(text, level),
            generator.quiz(text, level),
            generator.mind_map(text, level),
            generator.learning_path(text, level),
            generator.key_terms(text, level),
            generator.additional_resources(text, level),
        )
        .map_err(|source| AppError::Generation {
            source,
            content_id: record.id,
        })?;

    info!(
        id = record.id,
        flashcards = flashcards.len(),
        questions = quiz.len(),
        branches = mind_map.branches.len(),
        path_steps = learning_path.recommended_steps.len(),
        key_terms = key_terms.len(),
        resources = additional_resources.len(),
        "Materials generated"
    );

    state
        .store
        .attach_materials(
            record.id,
            Materials {
                summary,
                flashcards,
                quiz,
                mind_map,
                learning_path,
                key_terms,
                additional_resources,
            },
        )
        .await?
        .ok_or(AppError::NotFound)
}
