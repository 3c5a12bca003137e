//! Role classifiers restored from fitted artifacts.
//!
//! Two model shapes are supported:
//! - `linear`: a (multinomial or one-vs-rest) logistic model over vectorizer features.
//! - `stacking`: base classifiers whose class probabilities feed a final linear model.
//!
//! Every model exposes a full probability distribution over its `classes`.

use serde::{Deserialize, Serialize};

use crate::artifacts::vectorizer::SparseVector;
use crate::artifacts::ArtifactError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    Multinomial,
    Ovr,
}

/// Logistic model: one coefficient row per class, or a single row for binary problems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackingModel {
    pub classes: Vec<String>,
    pub estimators: Vec<RoleClassifier>,
    pub final_estimator: LinearModel,
    #[serde(default)]
    pub passthrough: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleClassifier {
    Linear(LinearModel),
    Stacking(StackingModel),
}

// ────────────────────────────────────────────────────────────────────────────
// Linear model
// ────────────────────────────────────────────────────────────────────────────

impl LinearModel {
    /// Checks shapes and returns the expected input width.
    pub fn validate(&self) -> Result<usize, ArtifactError> {
        if self.classes.is_empty() {
            return Err(invalid("linear model has no classes"));
        }

        let expected_rows = if self.classes.len() <= 2 {
            1
        } else {
            self.classes.len()
        };
        // A two-class model may also carry one row per class.
        let rows_ok = self.coef.len() == expected_rows
            || (self.classes.len() == 2 && self.coef.len() == 2);
        if !rows_ok {
            return Err(invalid(format!(
                "linear model has {} classes but {} coefficient rows",
                self.classes.len(),
                self.coef.len()
            )));
        }

        if self.intercept.len() != self.coef.len() {
            return Err(invalid(format!(
                "linear model has {} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }

        let width = self.n_features();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(invalid("linear model coefficient rows differ in width"));
        }

        let non_finite = self
            .coef
            .iter()
            .flatten()
            .chain(self.intercept.iter())
            .any(|w| !w.is_finite());
        if non_finite {
            return Err(invalid("linear model contains non-finite weights"));
        }

        Ok(width)
    }

    pub fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    /// Raw scores, one per coefficient row.
    pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| {
                b + x
                    .iter()
                    .filter_map(|(i, v)| row.get(i).map(|w| w * v))
                    .sum::<f64>()
            })
            .collect()
    }

    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        if self.classes.len() == 1 {
            return vec![1.0];
        }

        let scores = self.decision_function(x);

        if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            return vec![1.0 - p, p];
        }

        match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.iter().map(|s| sigmoid(*s)).collect();
                let total: f64 = raw.iter().sum();
                if total > 0.0 {
                    raw.iter().map(|p| p / total).collect()
                } else {
                    vec![1.0 / raw.len() as f64; raw.len()]
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stacking model
// ────────────────────────────────────────────────────────────────────────────

impl StackingModel {
    pub fn validate(&self) -> Result<usize, ArtifactError> {
        if self.estimators.is_empty() {
            return Err(invalid("stacking model has no base estimators"));
        }

        let mut base_width: Option<usize> = None;
        for (i, estimator) in self.estimators.iter().enumerate() {
            let width = estimator.validate()?;
            if estimator.classes() != self.classes.as_slice() {
                return Err(invalid(format!(
                    "base estimator {i} classes differ from the stacking model classes"
                )));
            }
            if let Some(w) = base_width {
                if w != width {
                    return Err(invalid(format!(
                        "base estimator {i} expects {width} features, others expect {w}"
                    )));
                }
            } else {
                base_width = Some(width);
            }
        }
        let base_width = base_width.unwrap_or(0);

        self.final_estimator.validate()?;
        if self.final_estimator.classes != self.classes {
            return Err(invalid(
                "final estimator classes differ from the stacking model classes",
            ));
        }

        let mut meta_width = self.estimators.len() * self.meta_columns_per_estimator();
        if self.passthrough {
            meta_width += base_width;
        }
        if self.final_estimator.n_features() != meta_width {
            return Err(invalid(format!(
                "final estimator expects {} features but stacking produces {meta_width}",
                self.final_estimator.n_features()
            )));
        }

        Ok(base_width)
    }

    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        self.final_estimator.predict_proba(&self.meta_features(x))
    }

    /// Binary problems keep only the positive-class column per estimator.
    fn meta_columns_per_estimator(&self) -> usize {
        if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        }
    }

    fn meta_features(&self, x: &SparseVector) -> SparseVector {
        let mut dense = Vec::with_capacity(self.estimators.len() * self.meta_columns_per_estimator());
        for estimator in &self.estimators {
            let proba = estimator.predict_proba(x);
            if self.classes.len() == 2 {
                dense.push(proba[1]);
            } else {
                dense.extend(proba);
            }
        }

        let width = dense.len();
        let mut meta = SparseVector::from_dense(&dense);
        if self.passthrough {
            meta.append_shifted(x, width);
        }
        meta
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public classifier API
// ────────────────────────────────────────────────────────────────────────────

impl RoleClassifier {
    /// Class labels in the order used by `predict_proba`.
    pub fn classes(&self) -> &[String] {
        match self {
            RoleClassifier::Linear(m) => &m.classes,
            RoleClassifier::Stacking(m) => &m.classes,
        }
    }

    /// Checks the model's internal consistency and returns its input width.
    pub fn validate(&self) -> Result<usize, ArtifactError> {
        match self {
            RoleClassifier::Linear(m) => m.validate(),
            RoleClassifier::Stacking(m) => m.validate(),
        }
    }

    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        match self {
            RoleClassifier::Linear(m) => m.predict_proba(x),
            RoleClassifier::Stacking(m) => m.predict_proba(x),
        }
    }

    /// The first class with maximal probability.
    #[cfg(test)]
    pub fn predict(&self, x: &SparseVector) -> Option<&str> {
        let proba = self.predict_proba(x);
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in proba.into_iter().enumerate() {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }
        best.and_then(|(i, _)| self.classes().get(i).map(String::as_str))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RoleClassifier::Linear(_) => "linear",
            RoleClassifier::Stacking(_) => "stacking",
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

fn invalid(msg: impl Into<String>) -> ArtifactError {
    ArtifactError::InvalidClassifier(msg.into())
}
