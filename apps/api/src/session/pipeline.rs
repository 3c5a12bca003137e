//! Prediction pipeline: session history → role ranking → course recommendations
//! → repository lookup, in that fixed order.
//!
//! Only the repository lookup touches the network; its failures are carried in
//! the report as a notice and never abort the rest of the pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::artifacts::ArtifactStore;
use crate::recommendation::{recommend_similar_courses, top_roles, PredictionError, RoleProbability};
use crate::repo_search::{role_query, RepoLookup, RepositorySearch};
use crate::session::CourseSession;

/// Joins session entries into the single text the models score.
pub const HISTORY_SEPARATOR: &str = " | ";

/// Predicted role plus one alternative.
const SURFACED_ROLES: usize = 2;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("add at least one course before requesting a prediction")]
    EmptySession,

    #[error("classifier produced no roles")]
    NoRoles,

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub session_id: Uuid,
    pub courses_analyzed: Vec<String>,
    pub search_history: String,
    pub predicted_role: RoleProbability,
    /// Absent when the classifier knows a single role.
    pub alternative_role: Option<RoleProbability>,
    pub recommended_courses: Vec<String>,
    pub repositories: RepoLookup,
    pub generated_at: DateTime<Utc>,
}

pub struct RecommendationPipeline {
    artifacts: Arc<ArtifactStore>,
    repo_search: Arc<dyn RepositorySearch>,
    recommendation_count: usize,
}

impl RecommendationPipeline {
    pub fn new(
        artifacts: Arc<ArtifactStore>,
        repo_search: Arc<dyn RepositorySearch>,
        recommendation_count: usize,
    ) -> Self {
        Self {
            artifacts,
            repo_search,
            recommendation_count,
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub async fn predict_and_recommend(
        &self,
        session: &CourseSession,
    ) -> Result<PredictionReport, PipelineError> {
        if !session.can_predict() {
            return Err(PipelineError::EmptySession);
        }

        let search_history = session.courses().join(HISTORY_SEPARATOR);

        let mut roles = top_roles(&self.artifacts, &search_history, SURFACED_ROLES)?.into_iter();
        let predicted_role = roles.next().ok_or(PipelineError::NoRoles)?;
        let alternative_role = roles.next();

        info!(
            "Predicted '{}' ({:.3}) from {} courses",
            predicted_role.role,
            predicted_role.probability,
            session.len()
        );

        let recommended_courses = recommend_similar_courses(
            &self.artifacts,
            &search_history,
            &predicted_role.role,
            self.recommendation_count,
        );

        let repositories = self
            .repo_search
            .search(&role_query(&predicted_role.role))
            .await;

        Ok(PredictionReport {
            session_id: session.id(),
            courses_analyzed: session.courses().to_vec(),
            search_history,
            predicted_role,
            alternative_role,
            recommended_courses,
            repositories,
            generated_at: Utc::now(),
        })
    }
}
