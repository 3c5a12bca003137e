// Precomputed model artifacts: text vectorizer, role classifier, labeled course catalog.
// Loaded once at startup and shared read-only for the lifetime of the process.
// Any load or consistency failure is fatal: the service cannot run without them.

pub mod catalog;
pub mod classifier;
pub mod vectorizer;

#[cfg(test)]
pub(crate) mod fixtures;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub use catalog::CourseCatalog;
pub use classifier::RoleClassifier;
pub use vectorizer::{TfidfVectorizer, VectorizerArtifact};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read catalog {}: {}", .path.display(), .source)]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid vectorizer: {0}")]
    InvalidVectorizer(String),

    #[error("invalid classifier: {0}")]
    InvalidClassifier(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("classifier expects {classifier} features but the vectorizer produces {vectorizer}")]
    DimensionMismatch { classifier: usize, vectorizer: usize },
}

/// File locations of the three artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
    pub catalog: PathBuf,
}

/// Counts reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub vocabulary_size: usize,
    pub classifier_kind: &'static str,
    pub classes: Vec<String>,
    pub catalog_rows: usize,
    pub catalog_roles: usize,
    pub loaded_at: DateTime<Utc>,
}

/// The immutable bundle every prediction and recommendation reads from.
#[derive(Debug)]
pub struct ArtifactStore {
    vectorizer: TfidfVectorizer,
    classifier: RoleClassifier,
    catalog: CourseCatalog,
    loaded_at: DateTime<Utc>,
}

impl ArtifactStore {
    /// Bundles already-parsed artifacts after checking they agree with each other.
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: RoleClassifier,
        catalog: CourseCatalog,
    ) -> Result<Self, ArtifactError> {
        let width = classifier.validate()?;
        if width != vectorizer.dimension() {
            return Err(ArtifactError::DimensionMismatch {
                classifier: width,
                vectorizer: vectorizer.dimension(),
            });
        }

        if catalog.is_empty() {
            return Err(ArtifactError::InvalidCatalog(
                "catalog has no usable rows".to_string(),
            ));
        }

        Ok(Self {
            vectorizer,
            classifier,
            catalog,
            loaded_at: Utc::now(),
        })
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        info!("Loading vectorizer from {}", paths.vectorizer.display());
        let artifact: VectorizerArtifact = read_json(&paths.vectorizer)?;
        let vectorizer = TfidfVectorizer::from_artifact(artifact)?;

        info!("Loading classifier from {}", paths.classifier.display());
        let classifier: RoleClassifier = read_json(&paths.classifier)?;

        info!("Loading course catalog from {}", paths.catalog.display());
        let catalog = CourseCatalog::from_csv_path(&paths.catalog)?;

        let store = Self::new(vectorizer, classifier, catalog)?;
        info!(
            "Artifacts ready: {} terms, {} classifier over {} roles, {} catalog rows",
            store.vectorizer.vocabulary_size(),
            store.classifier.kind(),
            store.classifier.classes().len(),
            store.catalog.len()
        );
        Ok(store)
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &RoleClassifier {
        &self.classifier
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            vocabulary_size: self.vectorizer.vocabulary_size(),
            classifier_kind: self.classifier.kind(),
            classes: self.classifier.classes().to_vec(),
            catalog_rows: self.catalog.len(),
            catalog_roles: self.catalog.roles().len(),
            loaded_at: self.loaded_at,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}
