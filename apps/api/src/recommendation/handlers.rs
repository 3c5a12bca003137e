//! Axum route handlers exposing the prediction and similarity core directly.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::recommendation::{predict_roles, rank_courses, RoleProbability, ScoredCourse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictRolesRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictRolesResponse {
    pub roles: Vec<RoleProbability>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub role: String,
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub role: String,
    pub courses: Vec<ScoredCourse>,
}

/// POST /api/v1/roles/predict
///
/// Full ranking over every trained role, most probable first.
pub async fn handle_predict_roles(
    State(state): State<AppState>,
    payload: Result<Json<PredictRolesRequest>, JsonRejection>,
) -> Result<Json<PredictRolesResponse>, AppError> {
    let Json(request) = payload?;
    let roles = predict_roles(state.pipeline.artifacts(), &request.text)?;
    Ok(Json(PredictRolesResponse { roles }))
}

/// POST /api/v1/recommendations
///
/// Courses labeled with `role`, ranked by similarity to `query`.
/// A role with no catalog rows, blank included, returns an empty list.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let Json(request) = payload?;
    let n = request.n.unwrap_or(state.config.recommendation_count);
    let courses = rank_courses(state.pipeline.artifacts(), &request.query, &request.role, n);

    Ok(Json(RecommendResponse {
        role: request.role,
        courses,
    }))
}
