//! Standardization scaler exported from scikit-learn (`StandardScaler`).

use serde::{Deserialize, Serialize};

use crate::ports::{check_width, FeatureScaler, ModelError};

/// `x_scaled = (x - mean) / scale`, column-wise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check internal consistency of the exported parameters.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.mean.len();
        if n == 0 || self.scale.len() != n {
            return Err(format!(
                "mean ({n}) and scale ({}) must be non-empty and equally long",
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("mean and scale must be finite".into());
        }
        if self.scale.iter().any(|s| *s < 0.0) {
            return Err("scale must not be negative".into());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != n {
                return Err(format!(
                    "feature_names has {} entries but scaler has {n} columns",
                    names.len()
                ));
            }
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_width(self.n_features(), row)?;

        let scaled: Vec<f64> = row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // Constant columns are fitted with a zero scale; leave them unscaled.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect();

        if let Some(index) = scaled.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite {
                stage: "scaler",
                index,
            });
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names: None,
            mean: vec![10.0, 0.5, 3.0],
            scale: vec![2.0, 0.5, 0.0],
        }
    }

    #[test]
    fn test_transform_standardizes() {
        let s = scaler();
        assert!(s.validate().is_ok());
        let out = s.transform(&[14.0, 0.0, 5.0]).expect("Should scale");
        assert!((out[0] - 2.0).abs() < 1e-12);
        assert!((out[1] + 1.0).abs() < 1e-12);
        assert!((out[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        assert_eq!(
            scaler().transform(&[1.0, 2.0]),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_transform_rejects_non_finite() {
        let err = scaler().transform(&[f64::INFINITY, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonFinite {
                stage: "scaler",
                index: 0
            }
        );
    }

    #[test]
    fn test_validate_rejects_mismatched_lengths() {
        let bad = StandardScaler {
            feature_names: None,
            mean: vec![0.0, 1.0],
            scale: vec![1.0],
        };
        assert!(bad.validate().is_err());
    }
}
