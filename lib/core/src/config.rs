//! Typed pipeline configuration.
//!
//! Loaded once from TOML, validated, and passed explicitly to every stage.

use crate::kmeans::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const KEYSPACE_ENV: &str = "NUTRICLUST_KEYSPACE";
pub const DATA_DIR_ENV: &str = "NUTRICLUST_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Clustering hyperparameters and the model output location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of clusters
    pub k: usize,
    /// Seed for centroid initialization
    pub seed: u64,
    /// Where the fitted model is written
    pub save_path: PathBuf,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker threads; 0 uses every available core
    #[serde(default)]
    pub threads: usize,
    /// Rows per partial-sum chunk in the k-means reduction
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Location of table exports: `<data_dir>/<keyspace>/<table>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_keyspace")]
    pub keyspace: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            keyspace: default_keyspace(),
        }
    }
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_keyspace() -> String {
    "nutrition".to_string()
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(keyspace) = lookup(KEYSPACE_ENV).filter(|s| !s.is_empty()) {
            self.source.keyspace = keyspace;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.is_empty()) {
            self.source.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if model.k == 0 {
            return Err(Error::InvalidConfig("model.k must be a positive integer".into()));
        }
        if model.save_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("model.save_path must not be empty".into()));
        }
        if model.max_iterations == 0 {
            return Err(Error::InvalidConfig("model.max_iterations must be at least 1".into()));
        }
        if !model.tolerance.is_finite() || model.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "model.tolerance must be a non-negative number, got {}",
                model.tolerance
            )));
        }
        if self.engine.chunk_size == 0 {
            return Err(Error::InvalidConfig("engine.chunk_size must be at least 1".into()));
        }
        if self.source.keyspace.is_empty() {
            return Err(Error::InvalidConfig("source.keyspace must not be empty".into()));
        }
        Ok(())
    }
}
