//! YAML configuration for the full pipeline.
//!
//! One file configures every stage (corpus, embedding, index, retrieval,
//! generation). Each section carries defaults, so a minimal file only needs
//! the fields it overrides.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "ragline"
//!
//! corpus:
//!   store_path: "data/corpus.redb"
//!
//! embedding:
//!   provider: "openai"
//!   model_name: "text-embedding-ada-002"
//!   dimension: 1536
//!   normalize: true
//!
//! index:
//!   artifact_path: "data/index/vectors.bin"
//!   manifest_path: "data/index/manifest.json"
//!   compression:
//!     enabled: true
//!     level: 3
//!
//! retrieval:
//!   default_k: 3
//!
//! generation:
//!   provider: "openai"
//!   model: "gpt-3.5-turbo"
//! ```
//!
//! API keys never live in the file. [`PipelineConfig::load`] fills
//! `embedding.api_key` and `generation.api_key` from the `OPENAI_API_KEY`
//! environment variable when the file leaves them unset.

use std::fs;
use std::path::{Path, PathBuf};

use embedding::EmbedConfig;
use generation::GenConfig;
use index::{CompressionCodec, CompressionConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the entire pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Corpus store configuration
    #[serde(default)]
    pub corpus: CorpusYamlConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbedConfig,

    /// Index artifact configuration
    #[serde(default)]
    pub index: IndexYamlConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalYamlConfig,

    /// Answer generation configuration
    #[serde(default)]
    pub generation: GenConfig,
}

impl PipelineConfig {
    /// Load a configuration file and fill API keys from the environment.
    ///
    /// `OPENAI_API_KEY` is applied to `embedding.api_key` and
    /// `generation.api_key` only when the file leaves them unset.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let mut config = Self::from_file(path)?;
        if config.embedding.api_key.is_none() {
            config.embedding.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.generation.api_key.is_none() {
            config.generation.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        Ok(config)
    }

    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Also called by the build entry points, since configs assembled in
    /// code never pass through [`PipelineConfig::from_yaml`].
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.corpus.validate()?;
        self.embedding
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.index.validate()?;
        self.retrieval.validate()?;
        self.generation
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            corpus: CorpusYamlConfig::default(),
            embedding: EmbedConfig::default(),
            index: IndexYamlConfig::default(),
            retrieval: RetrievalYamlConfig::default(),
            generation: GenConfig::default(),
        }
    }
}

/// Corpus store YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusYamlConfig {
    /// Path of the redb database file holding the documents.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl CorpusYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "corpus.store_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CorpusYamlConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

/// Index artifact YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexYamlConfig {
    /// Where the vector artifact is written.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Where the build manifest is written.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    #[serde(default)]
    pub compression: CompressionYamlConfig,
}

impl IndexYamlConfig {
    /// Translate the YAML compression block into the index crate's config.
    ///
    /// The same configuration must be used to write and read an artifact;
    /// the codec is not recorded in the file itself.
    pub fn compression_config(&self) -> CompressionConfig {
        let codec = if self.compression.enabled {
            CompressionCodec::Zstd
        } else {
            CompressionCodec::None
        };
        CompressionConfig::new(codec, self.compression.level)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.artifact_path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "index.artifact_path must not be empty".to_string(),
            ));
        }
        if self.manifest_path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "index.manifest_path must not be empty".to_string(),
            ));
        }
        if self.compression.enabled && !(1..=22).contains(&self.compression.level) {
            return Err(ConfigLoadError::Validation(
                "index.compression.level must be between 1 and 22".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            manifest_path: default_manifest_path(),
            compression: CompressionYamlConfig::default(),
        }
    }
}

/// Artifact compression YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionYamlConfig {
    #[serde(default = "true_value")]
    pub enabled: bool,

    /// Zstd level, 1 to 22. Ignored when compression is disabled.
    #[serde(default = "default_compression_level")]
    pub level: i32,
}

impl Default for CompressionYamlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_compression_level(),
        }
    }
}

/// Retrieval YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalYamlConfig {
    /// `k` used when a query does not specify one.
    #[serde(default = "default_k")]
    pub default_k: usize,
}

impl RetrievalYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.default_k == 0 {
            return Err(ConfigLoadError::Validation(
                "retrieval.default_k must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetrievalYamlConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
        }
    }
}

// Helper functions for serde defaults
fn default_store_path() -> PathBuf {
    PathBuf::from("data/corpus.redb")
}
fn default_artifact_path() -> PathBuf {
    PathBuf::from("data/index/vectors.bin")
}
fn default_manifest_path() -> PathBuf {
    PathBuf::from("data/index/manifest.json")
}
fn true_value() -> bool {
    true
}
fn default_compression_level() -> i32 {
    3
}
fn default_k() -> usize {
    3
}
