//! scikit-learn adapter: JSON exports of fitted estimators.
//!
//! The training pipeline exports each estimator's fitted attributes as JSON.
//! Classifiers are tagged by `kind` so the loader can pick the right type
//! without guessing from the field set.

mod logistic;
mod naive_bayes;
mod scaler;

use serde::{Deserialize, Serialize};

pub use logistic::LogisticRegression;
pub use naive_bayes::BernoulliNaiveBayes;
pub use scaler::StandardScaler;

use crate::domain::RiskLabel;
use crate::ports::{Classifier, ModelError};

/// A classifier artifact as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    BernoulliNaiveBayes(BernoulliNaiveBayes),
    LogisticRegression(LogisticRegression),
}

impl ModelArtifact {
    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::BernoulliNaiveBayes(m) => m,
            Self::LogisticRegression(m) => m,
        }
    }

    /// Check internal consistency of the exported parameters.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::BernoulliNaiveBayes(m) => m.validate(),
            Self::LogisticRegression(m) => m.validate(),
        }
    }
}

impl Classifier for ModelArtifact {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.inner().feature_names()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        self.inner().predict_proba(row)
    }

    fn predict(&self, row: &[f64]) -> Result<RiskLabel, ModelError> {
        self.inner().predict(row)
    }
}
