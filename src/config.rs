//! Configuration management for the scheme matcher

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub lexical: LexicalConfig,
    pub hybrid: HybridConfig,
    pub embedding: EmbeddingConfig,
    pub skill_gap: SkillGapConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub data_dir: PathBuf,
    pub schemes_file: String,
    pub jobs_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalConfig {
    pub occupation_weight: f32,
    pub interest_weight: f32,
    pub fresher_boost: f32,
    pub portal_boost: f32,
    pub result_limit: usize,
    pub preview_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridConfig {
    pub semantic_weight: f32,
    pub demographic_weight: f32,
    pub pool_size: usize,
    pub final_size: usize,
    pub age_cap: f32,
    pub income_cap: f32,
    pub demographic_weights: DemographicWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicWeights {
    pub age: f32,
    pub income: f32,
    pub occupation: f32,
    pub health: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Model2vec,
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapConfig {
    pub display_limit: usize,
    pub reload_before_analysis: bool,
    /// `{skill}` is replaced by the skill with spaces turned into `+`
    pub video_search_url: String,
    pub course_search_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                data_dir: PathBuf::from("data"),
                schemes_file: "schemes.csv".to_string(),
                jobs_file: "job.csv".to_string(),
            },
            lexical: LexicalConfig {
                occupation_weight: 2.0,
                interest_weight: 1.0,
                fresher_boost: 2.0,
                portal_boost: 0.5,
                result_limit: 50,
                preview_size: 6,
            },
            hybrid: HybridConfig {
                semantic_weight: 0.6,
                demographic_weight: 0.4,
                pool_size: 20,
                final_size: 6,
                age_cap: 100.0,
                income_cap: 500_000.0,
                demographic_weights: DemographicWeights {
                    age: 0.2,
                    income: 0.3,
                    occupation: 0.3,
                    health: 0.2,
                },
            },
            embedding: EmbeddingConfig {
                backend: EmbeddingBackend::Model2vec,
                model: "minishlab/potion-base-8M".to_string(),
                dimension: 256,
            },
            skill_gap: SkillGapConfig {
                display_limit: 12,
                reload_before_analysis: true,
                video_search_url: "https://www.youtube.com/results?search_query=learn+{skill}+course"
                    .to_string(),
                course_search_url: "https://www.classcentral.com/search?q={skill}".to_string(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, creating it with defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| MatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("scheme-matcher")
            .join("config.toml")
    }

    pub fn schemes_path(&self) -> PathBuf {
        self.catalog.data_dir.join(&self.catalog.schemes_file)
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.catalog.data_dir.join(&self.catalog.jobs_file)
    }

    /// Set a scalar value by dotted key, e.g. `hybrid.pool_size = 30`.
    ///
    /// The new value is parsed according to the type of the value it replaces,
    /// so a key can never change shape.
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut root = toml::Value::try_from(&*self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        let mut slot = &mut root;
        for part in key.split('.') {
            slot = slot
                .get_mut(part)
                .ok_or_else(|| MatcherError::Configuration(format!("Unknown configuration key: {}", key)))?;
        }

        let parsed = match slot {
            toml::Value::Float(_) => raw.parse::<f64>().map(toml::Value::Float).ok(),
            toml::Value::Integer(_) => raw.parse::<i64>().map(toml::Value::Integer).ok(),
            toml::Value::Boolean(_) => raw.parse::<bool>().map(toml::Value::Boolean).ok(),
            toml::Value::String(_) => Some(toml::Value::String(raw.to_string())),
            _ => None,
        }
        .ok_or_else(|| {
            MatcherError::Configuration(format!("Invalid value '{}' for key '{}'", raw, key))
        })?;
        *slot = parsed;

        *self = root
            .try_into()
            .map_err(|e| MatcherError::Configuration(format!("Invalid value for '{}': {}", key, e)))?;
        Ok(())
    }
}
