use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::clustering::clusterer::DEFAULT_CLUSTER_COUNT;
use crate::embedding::DEFAULT_DIMENSION;
use crate::matching::score::ScoringParams;

pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Application configuration loaded from environment variables.
/// Everything has a default except the API key of a remote embedder.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of an OpenAI-compatible embeddings API. `None` selects the local hashing embedder.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub cluster_count: usize,
    pub scoring: ScoringParams,
    pub session_ttl_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            embedding_api_url: None,
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_DIMENSION,
            cluster_count: DEFAULT_CLUSTER_COUNT,
            scoring: ScoringParams::default(),
            session_ttl_secs: 3600,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let embedding_api_url = optional_env("EMBEDDING_API_URL");
        let embedding_api_key = match embedding_api_url {
            Some(_) => Some(require_env("EMBEDDING_API_KEY")?),
            None => optional_env("EMBEDDING_API_KEY"),
        };

        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            embedding_api_url,
            embedding_api_key,
            embedding_model: optional_env("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dim: parse_env("EMBEDDING_DIM", defaults.embedding_dim)?,
            cluster_count: parse_env("CLUSTER_COUNT", defaults.cluster_count)?,
            scoring: ScoringParams {
                min_skill_overlap: parse_env(
                    "MIN_SKILL_OVERLAP",
                    defaults.scoring.min_skill_overlap,
                )?,
                skill_penalty: parse_env("SKILL_PENALTY", defaults.scoring.skill_penalty)?,
            },
            session_ttl_secs: parse_env("SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            bail!("EMBEDDING_DIM must be positive");
        }
        if self.cluster_count == 0 {
            bail!("CLUSTER_COUNT must be positive");
        }
        if !(0.0..=1.0).contains(&self.scoring.min_skill_overlap) {
            bail!("MIN_SKILL_OVERLAP must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.scoring.skill_penalty) {
            bail!("SKILL_PENALTY must be within [0, 1]");
        }
        if self.session_ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be positive");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.embedding_dim, 384);
        assert_eq!(config.cluster_count, 3);
        assert_eq!(config.scoring.min_skill_overlap, 0.2);
        assert_eq!(config.scoring.skill_penalty, 0.5);
    }

    #[test]
    fn test_out_of_range_penalty_is_rejected() {
        let mut config = Config::default();
        config.scoring.skill_penalty = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cluster_count_is_rejected() {
        let config = Config {
            cluster_count: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("SCREENER_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
