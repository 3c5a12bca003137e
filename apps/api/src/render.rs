//! Markdown rendering of the session page and prediction report.
//!
//! Output depends only on the value passed in; rendering the same state twice
//! yields the same text.

use crate::repo_search::{NoticeKind, RepoLookup};
use crate::session::pipeline::PredictionReport;
use crate::session::SessionView;

pub const PAGE_TITLE: &str = "Course-to-Career Recommender";

pub fn render_session(view: &SessionView) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {PAGE_TITLE}\n\n"));
    md.push_str("Enter the **recent courses** you've completed or enrolled in, one by one.\n\n");

    if view.courses.is_empty() {
        if let Some(hint) = &view.hint {
            md.push_str(&format!("_{hint}_\n"));
        }
        return md;
    }

    md.push_str("### Courses Added:\n");
    for course in &view.courses {
        md.push_str(&format!("{}. {}\n", course.position, course.title));
    }
    md
}

pub fn render_report(report: &PredictionReport) -> String {
    let mut md = String::new();
    let top = &report.predicted_role;

    md.push_str(&format!(
        "**Predicted Role:** {} ({:.1}%)\n",
        top.role,
        top.probability * 100.0
    ));
    if let Some(alt) = &report.alternative_role {
        md.push_str(&format!(
            "**You might also be interested in:** {} ({:.1}%)\n",
            alt.role,
            alt.probability * 100.0
        ));
    }

    md.push_str("\n### Recommended Courses\n");
    if report.recommended_courses.is_empty() {
        md.push_str("_No catalog courses are labeled with this role._\n");
    }
    for title in &report.recommended_courses {
        md.push_str(&format!("- {title}\n"));
    }

    md.push_str(&format!("\n### Top GitHub Repositories for {}\n", top.role));
    md.push_str(&render_repositories(&report.repositories));
    md
}

fn render_repositories(lookup: &RepoLookup) -> String {
    if let Some(notice) = &lookup.notice {
        let label = match notice.kind {
            NoticeKind::RateLimited => "Warning",
            NoticeKind::UpstreamError | NoticeKind::Unreachable => "Error",
        };
        return format!("> **{label}:** {}\n", notice.message);
    }

    if lookup.repositories.is_empty() {
        return "_No repositories found._\n".to_string();
    }

    let mut md = String::new();
    for repo in &lookup.repositories {
        md.push_str(&format!("- **[{}]({})**\n", repo.full_name, repo.html_url));
        md.push_str(&format!("  - {} stars\n", repo.stargazers_count));
        md.push_str(&format!(
            "  - {}\n",
            repo.description.as_deref().unwrap_or("No description")
        ));
    }
    md
}
