//! StudyKit HTTP server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use studykit_server::{router, AppState, ServerConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "studykit-server")]
#[command(about = "Turn text, articles and videos into study materials")]
struct Args {
    /// Address to bind
    #[arg(long, env = "STUDYKIT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "STUDYKIT_PORT", default_value = "5000")]
    port: u16,

    /// TOML file with [extractor], [guard] and [llm] tables
    #[arg(short, long, env = "STUDYKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat completions base URL, overrides the config file
    #[arg(long, env = "STUDYKIT_LLM_BASE_URL")]
    llm_base_url: Option<String>,

    /// Model name, overrides the config file
    #[arg(long, env = "STUDYKIT_LLM_MODEL")]
    llm_model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if args.api_key.is_some() {
        config.llm.api_key = args.api_key;
    }
    if let Some(base_url) = args.llm_base_url {
        config.llm.base_url = base_url;
    }
    if let Some(model) = args.llm_model {
        config.llm.model = model;
    }
    if config.llm.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; material generation will fail");
    }

    let model = config.llm.model.clone();
    let app = router(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!(host = %args.host, port = args.port, model = %model, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
