//! Binary logistic regression exported from scikit-learn.

use serde::{Deserialize, Serialize};

use crate::ports::{check_width, Classifier, ModelError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl LogisticRegression {
    /// Check internal consistency of the exported parameters.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("coefficients must not be empty".into());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients and intercept must be finite".into());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(format!(
                    "feature_names has {} entries but model has {} coefficients",
                    names.len(),
                    self.coefficients.len()
                ));
            }
        }
        Ok(())
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        check_width(self.n_features(), row)?;

        let logit: f64 = self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        if !logit.is_finite() {
            return Err(ModelError::NonFinite {
                stage: "classifier",
                index: 0,
            });
        }

        let p1 = sigmoid(logit);
        Ok([1.0 - p1, p1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLabel;

    #[test]
    fn test_logistic_probabilities() {
        let model = LogisticRegression {
            feature_names: None,
            coefficients: vec![2.0, -1.0],
            intercept: 0.0,
        };
        assert!(model.validate().is_ok());

        let p = model.predict_proba(&[0.0, 0.0]).unwrap();
        assert!((p[0] - 0.5).abs() < 1e-12);
        // Exact tie goes to class 0.
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), RiskLabel::Absent);

        let p = model.predict_proba(&[1.0, 0.0]).unwrap();
        assert!((p[1] - sigmoid(2.0)).abs() < 1e-12);
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), RiskLabel::Present);

        assert!(model.predict_proba(&[1.0, 0.0, 3.0]).is_err());
    }
}
