//! Classifier port: Trait for the pretrained risk model.
//!
//! This trait abstracts the model artifact format from the application logic.

use crate::domain::RiskLabel;

/// Errors raised when a model or scaler cannot process a row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Feature count mismatch: got {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Non-finite value in {stage} output at column {index}")]
    NonFinite { stage: &'static str, index: usize },

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
}

/// Check an input row against the width a model or scaler was fitted on.
///
/// # Errors
/// Returns `ModelError::DimensionMismatch` if the widths differ.
pub fn check_width(expected: usize, row: &[f64]) -> Result<(), ModelError> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            expected,
            got: row.len(),
        })
    }
}

/// Trait for binary classifiers over a scaled feature row.
///
/// Implementations are read-only after construction and shared across
/// submissions.
pub trait Classifier: Send + Sync {
    /// Short identifier for logs and the status line.
    fn name(&self) -> &'static str;

    /// Number of input columns the model was fitted on.
    fn n_features(&self) -> usize;

    /// Column names the model was fitted on, if the artifact records them.
    fn feature_names(&self) -> Option<&[String]>;

    /// Class probabilities `[P(class 0), P(class 1)]`.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `row` has the wrong width.
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ModelError>;

    /// Predicted label: the class with the higher probability, ties to class 0.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `row` has the wrong width.
    fn predict(&self, row: &[f64]) -> Result<RiskLabel, ModelError> {
        let [p0, p1] = self.predict_proba(row)?;
        Ok(if p1 > p0 {
            RiskLabel::Present
        } else {
            RiskLabel::Absent
        })
    }
}
