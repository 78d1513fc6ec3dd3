//! Server configuration
//!
//! One TOML file with `[extractor]`, `[guard]` and `[llm]` tables. Every table
//! and field is optional.

use crate::generate::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use studykit_extract::{ExtractorConfig, PipelineConfig};
use studykit_guard::GuardConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub extractor: ExtractorConfig,
    pub guard: GuardConfig,
    pub llm: LlmConfig,
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The extraction half of the configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            extractor: self.extractor.clone(),
            guard: self.guard.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config.extractor.max_length, 15_000);
        assert_eq!(config.llm.model, "gpt-4o");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[extractor]\ntimeout_secs = 3\n\n[llm]\nmodel = \"gpt-4o-mini\"\nbase_url = \"http://localhost:8080/v1\""
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.extractor.timeout_secs, 3);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.pipeline_config().extractor.timeout_secs, 3);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            ServerConfig::from_toml_str("[llm]\ntimeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServerConfig::from_file(Path::new("/nonexistent/studykit.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
