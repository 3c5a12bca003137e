use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::artifacts::ArtifactPaths;
use crate::recommendation::DEFAULT_RECOMMENDATION_COUNT;
use crate::repo_search::GITHUB_API_URL;

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
    pub catalog_path: PathBuf,
    pub github_api_url: String,
    pub repo_search_limit: u32,
    pub repo_search_timeout_secs: u64,
    pub recommendation_count: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            vectorizer_path: env_or("VECTORIZER_PATH", "models/vectorizer.json").into(),
            classifier_path: env_or("CLASSIFIER_PATH", "models/stacked_model.json").into(),
            catalog_path: env_or("CATALOG_PATH", "data/preprocessed/courses_all_labeled.csv")
                .into(),
            github_api_url: env_or("GITHUB_API_URL", GITHUB_API_URL),
            repo_search_limit: parse_env("REPO_SEARCH_LIMIT", 5)?,
            repo_search_timeout_secs: parse_env("REPO_SEARCH_TIMEOUT_SECS", 10)?,
            recommendation_count: parse_env("RECOMMENDATION_COUNT", DEFAULT_RECOMMENDATION_COUNT)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            vectorizer: self.vectorizer_path.clone(),
            classifier: self.classifier_path.clone(),
            catalog: self.catalog_path.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
