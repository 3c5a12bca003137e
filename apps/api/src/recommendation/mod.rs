// Course-to-role core: role prediction over a course history and
// similarity-ranked course recommendations within a role.
// Pure functions of their inputs and the shared ArtifactStore.

pub mod handlers;
pub mod predictor;
pub mod similarity;

pub use predictor::{predict_roles, top_roles, PredictionError, RoleProbability};
pub use similarity::{rank_courses, recommend_similar_courses, ScoredCourse};

/// Number of recommended courses returned when the caller does not ask for a count.
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 5;
