//! Assessment service: runs one submission through the loaded model.
//!
//! Pipeline:
//! 1. Range-check the numeric answers
//! 2. Encode the 18-column feature row
//! 3. Standardize with the fitted scaler
//! 4. Predict class probabilities and label
//! 5. Check the probability invariants before anything is shown

use std::sync::Arc;

use crate::adapters::ModelContext;
use crate::domain::{Assessment, FeatureVector, PatientInput, PredictionResult};
use crate::ports::ModelError;
use crate::HeartCheckError;

/// Service for scoring patient submissions.
///
/// Holds only the shared, read-only model context. Submissions are
/// independent of each other.
#[derive(Debug, Clone)]
pub struct AssessmentService {
    context: Arc<ModelContext>,
}

impl AssessmentService {
    #[must_use]
    pub fn new(context: Arc<ModelContext>) -> Self {
        Self { context }
    }

    /// Identifier of the loaded classifier, for the status line.
    #[must_use]
    pub fn model_name(&self) -> &'static str {
        self.context.classifier().name()
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.context.is_verified()
    }

    /// Score one submission.
    ///
    /// # Errors
    /// Returns `HeartCheckError::Validation` for out-of-range answers and
    /// `HeartCheckError::Model` if the model rejects the row or returns
    /// probabilities that break the invariants.
    pub fn assess(&self, input: &PatientInput) -> Result<Assessment, HeartCheckError> {
        input
            .validate()
            .map_err(|errors| HeartCheckError::Validation(errors.join("; ")))?;

        tracing::debug!("Step 1: Encoding submission...");
        let features = FeatureVector::encode(input);

        tracing::debug!("Step 2: Scaling features...");
        let scaled = self.context.scaler().transform(&features.to_array())?;

        tracing::debug!("Step 3: Running {}...", self.model_name());
        let classifier = self.context.classifier();
        let probabilities = classifier.predict_proba(&scaled)?;
        let label = classifier.predict(&scaled)?;

        let result = PredictionResult::new(label, probabilities)
            .map_err(|e| ModelError::InvalidOutput(e.to_string()))?;

        tracing::info!(
            "Assessment complete: label={}, confidence={:.2}%",
            result.label,
            result.confidence() * 100.0
        );

        Ok(Assessment::new(result))
    }
}
