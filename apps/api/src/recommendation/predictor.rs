//! Role Predictor — scores a course history against every trained role.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifacts::ArtifactStore;

/// One role and the classifier's probability for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleProbability {
    pub role: String,
    pub probability: f64,
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("course history text is empty")]
    EmptyInput,

    #[error("classifier returned {probabilities} probabilities for {classes} classes")]
    ShapeMismatch { classes: usize, probabilities: usize },
}

/// Full ranking over the trained classes, most probable first.
///
/// Deterministic for a given artifact set. Ties keep the classifier's class order.
pub fn predict_roles(
    store: &ArtifactStore,
    course_history_text: &str,
) -> Result<Vec<RoleProbability>, PredictionError> {
    if course_history_text.trim().is_empty() {
        return Err(PredictionError::EmptyInput);
    }

    let features = store.vectorizer().transform(course_history_text);
    let classifier = store.classifier();
    let classes = classifier.classes();
    let proba = classifier.predict_proba(&features);

    if proba.len() != classes.len() {
        return Err(PredictionError::ShapeMismatch {
            classes: classes.len(),
            probabilities: proba.len(),
        });
    }

    let mut ranking: Vec<RoleProbability> = classes
        .iter()
        .zip(proba)
        .map(|(role, probability)| RoleProbability {
            role: role.clone(),
            probability,
        })
        .collect();

    ranking.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    Ok(ranking)
}

/// The `k` most probable roles. Returns every class when fewer than `k` exist.
pub fn top_roles(
    store: &ArtifactStore,
    course_history_text: &str,
    k: usize,
) -> Result<Vec<RoleProbability>, PredictionError> {
    let mut ranking = predict_roles(store, course_history_text)?;
    ranking.truncate(k);
    Ok(ranking)
}
