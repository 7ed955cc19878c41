// File: src/config.rs
use crate::core::engine::ApplyOptions;
use crate::core::extractor::DEFAULT_MIN_SENTENCE_TOKENS;
use crate::core::scorer::DEFAULT_THRESHOLD;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "modelo_inferencias.json";

/// TOML-backed configuration. Every field has a default, so an empty file
/// (or a missing section) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirtConfig {
    pub build: BuildConfig,
    pub apply: ApplyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// CoNLL-U annotated corpus.
    pub corpus: Option<PathBuf>,
    pub model_path: PathBuf,
    /// Optional bincode snapshot of the aggregated verb contexts.
    pub contexts_snapshot: Option<PathBuf>,
    pub threshold: f64,
    pub min_sentence_tokens: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            corpus: None,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            contexts_snapshot: None,
            threshold: DEFAULT_THRESHOLD,
            min_sentence_tokens: DEFAULT_MIN_SENTENCE_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplyConfig {
    pub model_path: PathBuf,
    pub substitution_probability: f64,
    pub min_score: f64,
    pub max_substitutions: Option<usize>,
    /// Seed for reproducible substitution draws.
    pub seed: Option<u64>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        let options = ApplyOptions::default();
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            substitution_probability: options.substitution_probability,
            min_score: options.min_score,
            max_substitutions: options.max_substitutions,
            seed: None,
        }
    }
}

impl ApplyConfig {
    pub fn options(&self) -> ApplyOptions {
        ApplyOptions {
            substitution_probability: self.substitution_probability,
            min_score: self.min_score,
            max_substitutions: self.max_substitutions,
        }
    }
}

impl DirtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("build.threshold", self.build.threshold)?;
        self.apply.options().validate()
    }
}

pub(crate) fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min: 0.0, max: 1.0 })
    }
}

/// Load, parse and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<DirtConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: DirtConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
