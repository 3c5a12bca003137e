//! Course session — the ordered, case-insensitively deduplicated list of
//! courses a user has entered, driven by explicit commands.
//!
//! States: EMPTY (no courses) and NONEMPTY. `Add` moves EMPTY → NONEMPTY or
//! grows the list; `Reset` returns to EMPTY from anywhere. Prediction is only
//! offered in NONEMPTY (see `pipeline`).

pub mod handlers;
pub mod pipeline;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const EMPTY_SESSION_HINT: &str = "Enter at least one course to begin.";

/// Non-fatal validation outcome of an `Add`. The course list is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionWarning {
    #[error("Course title cannot be empty.")]
    BlankTitle,

    #[error("You've already added this course.")]
    DuplicateTitle { existing: String },
}

impl SessionWarning {
    pub fn code(&self) -> &'static str {
        match self {
            SessionWarning::BlankTitle => "BLANK_TITLE",
            SessionWarning::DuplicateTitle { .. } => "DUPLICATE_TITLE",
        }
    }
}

/// A discrete user action applied to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add(String),
    Reset,
}

#[derive(Debug, Clone)]
pub struct CourseSession {
    id: Uuid,
    courses: Vec<String>,
}

impl Default for CourseSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            courses: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn courses(&self) -> &[String] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn can_predict(&self) -> bool {
        !self.courses.is_empty()
    }

    pub fn apply(&mut self, command: SessionCommand) -> Result<(), SessionWarning> {
        match command {
            SessionCommand::Add(title) => self.add(&title),
            SessionCommand::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Appends the trimmed title unless it is blank or already present
    /// (compared case-insensitively).
    pub fn add(&mut self, title: &str) -> Result<(), SessionWarning> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SessionWarning::BlankTitle);
        }

        let lowered = title.to_lowercase();
        if let Some(existing) = self.courses.iter().find(|c| c.to_lowercase() == lowered) {
            return Err(SessionWarning::DuplicateTitle {
                existing: existing.clone(),
            });
        }

        self.courses.push(title.to_string());
        Ok(())
    }

    /// Clears every course and starts a fresh session id.
    pub fn reset(&mut self) {
        self.courses.clear();
        self.id = Uuid::new_v4();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            courses: self
                .courses
                .iter()
                .enumerate()
                .map(|(i, title)| NumberedCourse {
                    position: i + 1,
                    title: title.clone(),
                })
                .collect(),
            can_predict: self.can_predict(),
            hint: self.is_empty().then(|| EMPTY_SESSION_HINT.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberedCourse {
    pub position: usize,
    pub title: String,
}

/// Render-ready snapshot of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub courses: Vec<NumberedCourse>,
    pub can_predict: bool,
    pub hint: Option<String>,
}
