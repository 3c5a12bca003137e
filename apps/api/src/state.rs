use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::session::pipeline::RecommendationPipeline;
use crate::session::CourseSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The single user session. Commands lock it briefly; prediction runs on a snapshot.
    pub session: Arc<Mutex<CourseSession>>,
    /// Holds the read-only artifacts and the pluggable repository search backend.
    pub pipeline: Arc<RecommendationPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: RecommendationPipeline) -> Self {
        Self {
            config,
            session: Arc::new(Mutex::new(CourseSession::new())),
            pipeline: Arc::new(pipeline),
        }
    }
}
