//! Scaler port: Trait for the fitted feature scaler.

use super::classifier::ModelError;

/// Trait for numeric transforms applied to a feature row before prediction.
pub trait FeatureScaler: Send + Sync {
    /// Number of input columns the scaler was fitted on.
    fn n_features(&self) -> usize;

    /// Column names the scaler was fitted on, if the artifact records them.
    fn feature_names(&self) -> Option<&[String]>;

    /// Scale one row.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `row` has the wrong width,
    /// or `ModelError::NonFinite` if scaling produces NaN or infinity.
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;
}
