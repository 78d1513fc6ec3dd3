//! Router and shared state

use crate::config::ServerConfig;
use crate::generate::{ChatGenerator, MaterialGenerator};
use crate::handlers;
use crate::store::{ContentStore, MemStore};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use studykit_extract::ContentPipeline;
use tower_http::cors::CorsLayer;

/// Multipart framing allowance on top of the upload limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Collaborators shared by every request
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ContentPipeline>,
    pub store: Arc<dyn ContentStore>,
    pub generator: Arc<dyn MaterialGenerator>,
}

impl AppState {
    pub fn new(
        pipeline: ContentPipeline,
        store: Arc<dyn ContentStore>,
        generator: Arc<dyn MaterialGenerator>,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store,
            generator,
        }
    }

    /// Network-backed pipeline, in-memory store and the chat generator
    pub fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let pipeline = ContentPipeline::new(config.pipeline_config())?;
        let generator = ChatGenerator::new(config.llm)?;
        Ok(Self::new(
            pipeline,
            Arc::new(MemStore::new()),
            Arc::new(generator),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.pipeline.config().max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/process-content", post(handlers::process_content))
        .route(
            "/api/upload-file",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/content/:id", get(handlers::get_content))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
