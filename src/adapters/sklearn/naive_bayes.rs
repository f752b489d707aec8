//! Bernoulli naive Bayes classifier exported from scikit-learn.

use serde::{Deserialize, Serialize};

use crate::ports::{check_width, Classifier, ModelError};

/// Parameters of a fitted `BernoulliNB`.
///
/// `feature_log_prob[c][j]` is `ln P(x_j = 1 | class c)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BernoulliNaiveBayes {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub classes: Vec<i64>,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
    /// Threshold for mapping inputs to {0, 1}; `None` expects binary input.
    #[serde(default)]
    pub binarize: Option<f64>,
}

impl BernoulliNaiveBayes {
    /// Check internal consistency of the exported parameters.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes != [0, 1] {
            return Err(format!("expected classes [0, 1], got {:?}", self.classes));
        }
        if self.class_log_prior.len() != 2 || self.feature_log_prob.len() != 2 {
            return Err("class_log_prior and feature_log_prob must have one entry per class".into());
        }
        if self.class_log_prior.iter().any(|p| !p.is_finite() || *p > 0.0) {
            return Err("class_log_prior must hold finite log probabilities".into());
        }

        let n = self.feature_log_prob[0].len();
        if n == 0 || self.feature_log_prob[1].len() != n {
            return Err("feature_log_prob rows must be non-empty and equally long".into());
        }
        // ln(p) must be strictly negative, otherwise ln(1 - p) is undefined.
        if self
            .feature_log_prob
            .iter()
            .flatten()
            .any(|p| !p.is_finite() || *p >= 0.0)
        {
            return Err("feature_log_prob must hold finite values below zero".into());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != n {
                return Err(format!(
                    "feature_names has {} entries but model has {n} features",
                    names.len()
                ));
            }
        }
        if matches!(self.binarize, Some(t) if !t.is_finite()) {
            return Err("binarize threshold must be finite".into());
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, row: &[f64]) -> [f64; 2] {
        let mut jll = [self.class_log_prior[0], self.class_log_prior[1]];
        for (class, total) in jll.iter_mut().enumerate() {
            for (&x, &log_p) in row.iter().zip(&self.feature_log_prob[class]) {
                let x = match self.binarize {
                    Some(threshold) => {
                        if x > threshold {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    None => x,
                };
                let log_not_p = (-log_p.exp()).ln_1p();
                *total += x * log_p + (1.0 - x) * log_not_p;
            }
        }
        jll
    }
}

impl Classifier for BernoulliNaiveBayes {
    fn name(&self) -> &'static str {
        "bernoulli_naive_bayes"
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        check_width(self.n_features(), row)?;

        let [a, b] = self.joint_log_likelihood(row);
        // Normalize in log space to avoid underflow.
        let max = a.max(b);
        let log_norm = max + ((a - max).exp() + (b - max).exp()).ln();
        let proba = [(a - log_norm).exp(), (b - log_norm).exp()];

        if let Some(index) = proba.iter().position(|p| !p.is_finite()) {
            return Err(ModelError::NonFinite {
                stage: "classifier",
                index,
            });
        }
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLabel;

    fn two_feature_model() -> BernoulliNaiveBayes {
        BernoulliNaiveBayes {
            feature_names: Some(vec!["a".into(), "b".into()]),
            classes: vec![0, 1],
            class_log_prior: vec![0.5f64.ln(), 0.5f64.ln()],
            feature_log_prob: vec![
                vec![0.2f64.ln(), 0.5f64.ln()],
                vec![0.8f64.ln(), 0.5f64.ln()],
            ],
            binarize: Some(0.0),
        }
    }

    #[test]
    fn test_probabilities_match_closed_form() {
        let model = two_feature_model();
        assert!(model.validate().is_ok());

        // Feature a on: P(c1) = 0.8 / (0.8 + 0.2)
        let p = model.predict_proba(&[1.3, -0.4]).expect("Should predict");
        assert!((p[1] - 0.8).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[1.3, -0.4]).unwrap(), RiskLabel::Present);

        // Feature a off: P(c1) = 0.2 / (0.2 + 0.8)
        let p = model.predict_proba(&[-1.0, 2.0]).expect("Should predict");
        assert!((p[1] - 0.2).abs() < 1e-12);
        assert_eq!(model.predict(&[-1.0, 2.0]).unwrap(), RiskLabel::Absent);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let model = two_feature_model();
        assert_eq!(
            model.predict_proba(&[1.0]),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut model = two_feature_model();
        model.feature_log_prob[1][0] = 0.0;
        assert!(model.validate().is_err());

        let mut model = two_feature_model();
        model.classes = vec![1, 2];
        assert!(model.validate().is_err());

        let mut model = two_feature_model();
        model.feature_names = Some(vec!["a".into()]);
        assert!(model.validate().is_err());
    }
}
