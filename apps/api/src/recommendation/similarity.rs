//! Similarity Recommender — ranks a role's catalog courses against free text.
//!
//! Algorithm:
//! 1. Restrict the catalog to rows whose job_role equals the role, deduplicated by title
//! 2. Vectorize the query and every remaining title with the shared vectorizer
//! 3. Score each title by cosine similarity to the query
//! 4. Stable sort descending, so tied titles keep catalog order
//! 5. Keep the top n

use serde::Serialize;

use crate::artifacts::ArtifactStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCourse {
    pub course_title: String,
    pub similarity: f64,
}

/// Ranks up to `n` courses for `role` by similarity to `query_text`.
/// An unknown role yields an empty list.
pub fn rank_courses(
    store: &ArtifactStore,
    query_text: &str,
    role: &str,
    n: usize,
) -> Vec<ScoredCourse> {
    let titles = store.catalog().titles_for_role(role);
    if titles.is_empty() || n == 0 {
        return Vec::new();
    }

    let vectorizer = store.vectorizer();
    let query = vectorizer.transform(query_text);
    let course_vectors = vectorizer.transform_all(&titles);

    let mut scored: Vec<ScoredCourse> = titles
        .iter()
        .zip(&course_vectors)
        .map(|(title, vector)| ScoredCourse {
            course_title: title.to_string(),
            similarity: query.cosine_similarity(vector),
        })
        .collect();

    // sort_by is stable: ties stay in filtered-catalog order
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(n);
    scored
}

/// Titles only, best match first.
pub fn recommend_similar_courses(
    store: &ArtifactStore,
    query_text: &str,
    role: &str,
    n: usize,
) -> Vec<String> {
    rank_courses(store, query_text, role, n)
        .into_iter()
        .map(|c| c.course_title)
        .collect()
}
