//! TF-IDF text vectorizer restored from a fitted artifact.
//!
//! The vocabulary and idf weights are frozen at load time. `transform` never
//! learns new terms: tokens outside the vocabulary contribute nothing, and an
//! empty (or entirely unknown) text maps to the zero vector.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactError;

/// Word tokens of two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk shape of a fitted vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub token_pattern: Option<String>,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

// ────────────────────────────────────────────────────────────────────────────
// Sparse vectors
// ────────────────────────────────────────────────────────────────────────────

/// Sparse vector stored as parallel arrays sorted by column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Builds a vector from (column, value) pairs. Duplicate columns are summed.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(idx, _)| *idx);

        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            if indices.last() == Some(&idx) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                indices.push(idx);
                values.push(value);
            }
        }

        Self { indices, values }
    }

    /// Builds a vector from dense values, dropping exact zeros.
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .unzip();
        Self { indices, values }
    }

    #[cfg(test)]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        sum
    }

    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Cosine of the angle between two vectors. Zero when either is the zero vector.
    pub fn cosine_similarity(&self, other: &SparseVector) -> f64 {
        let denom = self.l2_norm() * other.l2_norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }

    /// Appends `other` with every column shifted by `offset`.
    /// `offset` must be past the last column of `self`.
    pub fn append_shifted(&mut self, other: &SparseVector, offset: usize) {
        debug_assert!(self.indices.last().map_or(true, |last| *last < offset));
        for (idx, value) in other.iter() {
            self.indices.push(idx + offset);
            self.values.push(value);
        }
    }

    fn normalize(&mut self, norm: Norm) {
        let total = match norm {
            Norm::L1 => self.values.iter().map(|v| v.abs()).sum::<f64>(),
            Norm::L2 => self.l2_norm(),
        };
        if total > 0.0 {
            for v in &mut self.values {
                *v /= total;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vectorizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    stop_words: HashSet<String>,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ArtifactError> {
        let dimension = artifact.idf.len();

        if artifact.vocabulary.len() != dimension {
            return Err(ArtifactError::InvalidVectorizer(format!(
                "vocabulary has {} terms but idf has {} weights",
                artifact.vocabulary.len(),
                dimension
            )));
        }

        let mut seen_columns = HashSet::with_capacity(dimension);
        for (term, &column) in &artifact.vocabulary {
            if column >= dimension {
                return Err(ArtifactError::InvalidVectorizer(format!(
                    "term '{term}' maps to column {column}, outside 0..{dimension}"
                )));
            }
            if !seen_columns.insert(column) {
                return Err(ArtifactError::InvalidVectorizer(format!(
                    "column {column} is assigned to more than one term"
                )));
            }
        }

        if let Some(bad) = artifact.idf.iter().position(|w| !w.is_finite()) {
            return Err(ArtifactError::InvalidVectorizer(format!(
                "idf weight at column {bad} is not finite"
            )));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::InvalidVectorizer(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }

        let pattern = artifact
            .token_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_pattern = Regex::new(pattern).map_err(|e| {
            ArtifactError::InvalidVectorizer(format!("invalid token_pattern '{pattern}': {e}"))
        })?;

        let stop_words = artifact
            .stop_words
            .into_iter()
            .map(|w| if artifact.lowercase { w.to_lowercase() } else { w })
            .collect();

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            stop_words,
            token_pattern,
        })
    }

    /// Width of every vector this vectorizer produces.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (column, tf * self.idf[column])
            })
            .collect();

        let mut vector = SparseVector::from_pairs(pairs);
        if let Some(norm) = self.norm {
            vector.normalize(norm);
        }
        vector
    }

    pub fn transform_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }

    /// Splits text into the n-gram terms looked up in the vocabulary.
    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let words: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|w| !self.stop_words.contains(*w))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(words.iter().map(|w| w.to_string()));
            } else {
                terms.extend(words.windows(n).map(|gram| gram.join(" ")));
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(terms: &[&str]) -> VectorizerArtifact {
        VectorizerArtifact {
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i))
                .collect(),
            idf: vec![1.0; terms.len()],
            lowercase: true,
            ngram_range: (1, 1),
            sublinear_tf: false,
            norm: Some(Norm::L2),
            stop_words: vec![],
            token_pattern: None,
        }
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let v = TfidfVectorizer::from_artifact(artifact(&["sql", "basics"])).unwrap();
        let x = v.transform("SQL basics");
        assert!((x.l2_norm() - 1.0).abs() < 1e-9);
        assert_eq!(x.nnz(), 2);
    }

    #[test]
    fn test_unknown_tokens_contribute_nothing() {
        let v = TfidfVectorizer::from_artifact(artifact(&["sql"])).unwrap();
        assert!(v.transform("quantum basket weaving").is_zero());
        assert_eq!(v.transform("sql and quantum"), v.transform("sql"));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = TfidfVectorizer::from_artifact(artifact(&["sql"])).unwrap();
        assert!(v.transform("").is_zero());
        assert!(v.transform("   ").is_zero());
    }

    #[test]
    fn test_single_character_tokens_are_ignored() {
        let v = TfidfVectorizer::from_artifact(artifact(&["c", "rust"])).unwrap();
        let x = v.transform("C and Rust");
        assert_eq!(x.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_bigrams_and_stop_words() {
        let mut a = artifact(&["machine", "learning", "machine learning"]);
        a.ngram_range = (1, 2);
        a.stop_words = vec!["Intro".to_string()];
        a.norm = None;
        let v = TfidfVectorizer::from_artifact(a).unwrap();
        let x = v.transform("Intro machine learning");
        assert_eq!(x.iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_sublinear_tf_and_idf_weighting() {
        let mut a = artifact(&["data", "sql"]);
        a.idf = vec![2.0, 1.0];
        a.sublinear_tf = true;
        a.norm = None;
        let v = TfidfVectorizer::from_artifact(a).unwrap();
        let x = v.transform("data data sql");
        let values: Vec<(usize, f64)> = x.iter().collect();
        assert!((values[0].1 - (1.0 + 2f64.ln()) * 2.0).abs() < 1e-9);
        assert!((values[1].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_l1_norm_sums_to_one() {
        let mut a = artifact(&["data", "sql"]);
        a.norm = Some(Norm::L1);
        let v = TfidfVectorizer::from_artifact(a).unwrap();
        let total: f64 = v.transform("data sql sql").iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_mismatched_idf() {
        let mut a = artifact(&["sql", "basics"]);
        a.idf.pop();
        assert!(matches!(
            TfidfVectorizer::from_artifact(a),
            Err(ArtifactError::InvalidVectorizer(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_column() {
        let mut a = artifact(&["sql"]);
        a.vocabulary.insert("sql".to_string(), 4);
        assert!(TfidfVectorizer::from_artifact(a).is_err());
    }

    #[test]
    fn test_rejects_bad_ngram_range() {
        let mut a = artifact(&["sql"]);
        a.ngram_range = (2, 1);
        assert!(TfidfVectorizer::from_artifact(a).is_err());
    }

    #[test]
    fn test_artifact_defaults_from_json() {
        let json = r#"{"vocabulary": {"sql": 0}, "idf": [1.5]}"#;
        let a: VectorizerArtifact = serde_json::from_str(json).unwrap();
        assert!(a.lowercase);
        assert_eq!(a.ngram_range, (1, 1));
        assert_eq!(a.norm, Some(Norm::L2));

        let json = r#"{"vocabulary": {"sql": 0}, "idf": [1.5], "norm": null, "ngram_range": [1, 2]}"#;
        let a: VectorizerArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(a.norm, None);
        assert_eq!(a.ngram_range, (1, 2));
    }

    #[test]
    fn test_cosine_similarity_of_zero_vector_is_zero() {
        let a = SparseVector::from_dense(&[1.0, 0.0]);
        let zero = SparseVector::default();
        assert_eq!(a.cosine_similarity(&zero), 0.0);
        assert!((a.cosine_similarity(&a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_pairs_merges_duplicate_columns() {
        let v = SparseVector::from_pairs(vec![(3, 1.0), (1, 2.0), (3, 0.5)]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 2.0), (3, 1.5)]);
    }

    #[test]
    fn test_append_shifted() {
        let mut meta = SparseVector::from_dense(&[0.2, 0.8]);
        meta.append_shifted(&SparseVector::from_dense(&[0.0, 1.0]), 2);
        assert_eq!(meta.iter().collect::<Vec<_>>(), vec![(0, 0.2), (1, 0.8), (3, 1.0)]);
    }
}
