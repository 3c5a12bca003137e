//! Small in-memory artifacts shared by unit tests.

use std::collections::HashMap;

use crate::artifacts::classifier::{LinearModel, MultiClass, RoleClassifier};
use crate::artifacts::vectorizer::{Norm, TfidfVectorizer, VectorizerArtifact};
use crate::artifacts::{ArtifactStore, CourseCatalog};

pub const VOCABULARY: &[&str] = &[
    "sql",
    "basics",
    "excel",
    "for",
    "data",
    "python",
    "intro",
    "to",
    "machine",
    "learning",
    "deep",
    "statistics",
    "fundamentals",
    "web",
    "javascript",
];

pub const CATALOG_CSV: &str = "\
course_title,job_role
SQL Basics,Data Analyst
SQL Basics,Data Analyst
Excel for Data,Data Analyst
Machine Learning with Python,Data Scientist
Deep Learning,Data Scientist
Statistics for Data,Data Scientist
Intro to JavaScript,Web Developer
";

pub fn vectorizer_artifact() -> VectorizerArtifact {
    VectorizerArtifact {
        vocabulary: VOCABULARY
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect::<HashMap<_, _>>(),
        idf: vec![1.0; VOCABULARY.len()],
        lowercase: true,
        ngram_range: (1, 1),
        sublinear_tf: false,
        norm: Some(Norm::L2),
        stop_words: vec![],
        token_pattern: None,
    }
}

pub fn vectorizer() -> TfidfVectorizer {
    TfidfVectorizer::from_artifact(vectorizer_artifact()).expect("fixture vectorizer is valid")
}

fn coef_row(weights: &[(&str, f64)]) -> Vec<f64> {
    let mut row = vec![0.0; VOCABULARY.len()];
    for (term, w) in weights {
        let column = VOCABULARY
            .iter()
            .position(|t| t == term)
            .expect("fixture term is in vocabulary");
        row[column] = *w;
    }
    row
}

/// Multinomial model over three roles keyed on obvious terms.
pub fn classifier() -> RoleClassifier {
    RoleClassifier::Linear(LinearModel {
        classes: vec![
            "Data Analyst".to_string(),
            "Data Scientist".to_string(),
            "Web Developer".to_string(),
        ],
        coef: vec![
            coef_row(&[("sql", 3.0), ("excel", 3.0), ("data", 1.0), ("basics", 0.5)]),
            coef_row(&[
                ("python", 2.0),
                ("machine", 3.0),
                ("learning", 3.0),
                ("statistics", 1.5),
                ("data", 0.5),
            ]),
            coef_row(&[("javascript", 3.0), ("web", 3.0), ("intro", 0.2)]),
        ],
        intercept: vec![0.0, 0.0, 0.0],
        multi_class: MultiClass::Multinomial,
    })
}

/// A model that only knows one role.
pub fn single_class_classifier() -> RoleClassifier {
    RoleClassifier::Linear(LinearModel {
        classes: vec!["Data Analyst".to_string()],
        coef: vec![vec![0.0; VOCABULARY.len()]],
        intercept: vec![0.0],
        multi_class: MultiClass::Multinomial,
    })
}

pub fn catalog() -> CourseCatalog {
    CourseCatalog::from_csv_reader(CATALOG_CSV.as_bytes()).expect("fixture catalog is valid")
}

pub fn store() -> ArtifactStore {
    ArtifactStore::new(vectorizer(), classifier(), catalog()).expect("fixture artifacts agree")
}

pub fn single_class_store() -> ArtifactStore {
    ArtifactStore::new(vectorizer(), single_class_classifier(), catalog())
        .expect("fixture artifacts agree")
}
