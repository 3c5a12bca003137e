//! Axum route handlers for the course session.
//!
//! Each request maps to one `SessionCommand` (or a prediction over the current
//! snapshot) and responds with a fresh render of the resulting state.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::render::{render_report, render_session};
use crate::session::{SessionCommand, SessionView, SessionWarning};
use crate::state::AppState;

const MARKDOWN: &str = "text/markdown; charset=utf-8";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddCourseRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct WarningBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&SessionWarning> for WarningBody {
    fn from(w: &SessionWarning) -> Self {
        Self {
            code: w.code(),
            message: w.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddCourseResponse {
    pub session: SessionView,
    pub warning: Option<WarningBody>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
///
/// Markdown page for the current session.
pub async fn handle_session_page(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.session.lock().await.view();
    ([(header::CONTENT_TYPE, MARKDOWN)], render_session(&view))
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.lock().await.view())
}

/// POST /api/v1/session/courses
///
/// Blank and duplicate titles are reported as a warning; the list is unchanged.
pub async fn handle_add_course(
    State(state): State<AppState>,
    payload: Result<Json<AddCourseRequest>, JsonRejection>,
) -> Result<Json<AddCourseResponse>, AppError> {
    let Json(request) = payload?;
    let mut session = state.session.lock().await;
    let warning = session
        .apply(SessionCommand::Add(request.title))
        .err()
        .map(|w| {
            debug!("Course not added: {w}");
            WarningBody::from(&w)
        });

    Ok(Json(AddCourseResponse {
        session: session.view(),
        warning,
    }))
}

/// DELETE /api/v1/session
pub async fn handle_reset_session(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    // Reset never warns.
    let _ = session.apply(SessionCommand::Reset);
    info!("Session reset; new session {}", session.id());
    Json(session.view())
}

/// POST /api/v1/session/predict
///
/// Runs prediction → recommendation → repository lookup over a snapshot of the
/// session. 409 when no courses have been added.
pub async fn handle_predict(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, AppError> {
    // Release the lock before the outbound repository call.
    let snapshot = state.session.lock().await.clone();

    let report = state.pipeline.predict_and_recommend(&snapshot).await?;

    Ok(match query.format {
        ReportFormat::Json => Json(report).into_response(),
        ReportFormat::Markdown => {
            ([(header::CONTENT_TYPE, MARKDOWN)], render_report(&report)).into_response()
        }
    })
}
