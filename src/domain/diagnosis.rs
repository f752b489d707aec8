//! Prediction result types.
//!
//! Represents the output of the classifier for one submission.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that class probabilities sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Binary classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Class 0: no heart disease indicated
    Absent,
    /// Class 1: heart disease indicated
    Present,
}

impl RiskLabel {
    /// Label for a class index (0 or 1).
    #[must_use]
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(Self::Absent),
            1 => Some(Self::Present),
            _ => None,
        }
    }

    /// Class index in the model's probability output.
    #[must_use]
    pub fn class_index(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Present => 1,
        }
    }

    /// Headline phrase shown in the result panel.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Absent => "an absence of heart disease",
            Self::Present => "a presence of heart disease",
        }
    }

    /// Clinical recommendation paragraph for this outcome.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Present => {
                "Based on the prediction results, it is strongly recommended that you consult \
                 a qualified cardiologist or healthcare professional for a comprehensive \
                 clinical evaluation. Further diagnostic tests may be required to confirm \
                 the presence and severity of potential heart disease. In addition, adopting \
                 appropriate lifestyle modifications is advised, including maintaining a \
                 balanced and heart-healthy diet, engaging in regular physical activity suited \
                 to your condition, managing stress levels, and avoiding risk factors such as \
                 smoking and excessive alcohol consumption. Regular medical follow-ups are \
                 important to monitor cardiovascular health and support early intervention."
            }
            Self::Absent => {
                "Based on the prediction results, no significant indication of heart disease \
                 is identified at this time. It is recommended to continue maintaining a \
                 healthy lifestyle by following a balanced diet, engaging in regular physical \
                 activity, and managing stress effectively. Periodic health check-ups and \
                 routine monitoring of key cardiovascular indicators, such as blood pressure \
                 and cholesterol levels, are encouraged to help sustain long-term heart health \
                 and support early detection of potential risks."
            }
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Absent => (16, 185, 129), // Emerald (#10B981)
            Self::Present => (244, 63, 94), // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "ABSENT"),
            Self::Present => write!(f, "PRESENT"),
        }
    }
}

/// Why a classifier output was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("Class probability {0} is not within [0, 1]")]
    OutOfRange(f64),

    #[error("Class probabilities sum to {0}, expected 1")]
    NotNormalized(f64),

    #[error("Predicted label {label} disagrees with probabilities {probabilities:?}")]
    Inconsistent {
        label: RiskLabel,
        probabilities: [f64; 2],
    },
}

/// Label plus class probabilities for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: RiskLabel,

    /// `[P(absent), P(present)]`
    pub probabilities: [f64; 2],
}

impl PredictionResult {
    /// Build a result, checking the probability and label invariants.
    ///
    /// # Errors
    /// Returns `PredictionError` if a probability is outside [0, 1], the pair
    /// does not sum to one, or the label is not the more probable class.
    pub fn new(label: RiskLabel, probabilities: [f64; 2]) -> Result<Self, PredictionError> {
        for p in probabilities {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(PredictionError::OutOfRange(p));
            }
        }

        let sum = probabilities[0] + probabilities[1];
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(PredictionError::NotNormalized(sum));
        }

        // Ties go to class 0.
        let argmax = if probabilities[1] > probabilities[0] {
            RiskLabel::Present
        } else {
            RiskLabel::Absent
        };
        if argmax != label {
            return Err(PredictionError::Inconsistent {
                label,
                probabilities,
            });
        }

        Ok(Self {
            label,
            probabilities,
        })
    }

    /// Probability of the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probabilities[self.label.class_index()]
    }

    /// Probability of heart disease being present.
    #[must_use]
    pub fn disease_probability(&self) -> f64 {
        self.probabilities[RiskLabel::Present.class_index()]
    }

    /// Headline sentence, e.g. "The model indicates a presence of heart
    /// disease with an estimated probability of 87.50%."
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "The model indicates {} with an estimated probability of {:.2}%.",
            self.label.description(),
            self.confidence() * 100.0
        )
    }
}

/// A prediction together with when it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub result: PredictionResult,

    /// Timestamp of the assessment
    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    #[must_use]
    pub fn new(result: PredictionResult) -> Self {
        Self {
            result,
            assessed_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_accepts_consistent_output() {
        let result = PredictionResult::new(RiskLabel::Present, [0.125, 0.875]).expect("valid");
        assert!((result.confidence() - 0.875).abs() < f64::EPSILON);
        assert!((result.disease_probability() - 0.875).abs() < f64::EPSILON);
        assert_eq!(
            result.summary(),
            "The model indicates a presence of heart disease with an estimated probability of 87.50%."
        );

        let absent = PredictionResult::new(RiskLabel::Absent, [0.7, 0.3]).expect("valid");
        assert!((absent.confidence() - 0.7).abs() < f64::EPSILON);
        assert!(absent.summary().starts_with("The model indicates an absence of heart disease"));
        assert!(absent.summary().ends_with("70.00%."));
    }

    #[test]
    fn test_result_rejects_broken_probabilities() {
        assert_eq!(
            PredictionResult::new(RiskLabel::Absent, [1.2, -0.2]),
            Err(PredictionError::OutOfRange(1.2))
        );
        assert!(matches!(
            PredictionResult::new(RiskLabel::Absent, [0.6, 0.6]),
            Err(PredictionError::NotNormalized(_))
        ));
        assert!(matches!(
            PredictionResult::new(RiskLabel::Absent, [f64::NAN, 0.5]),
            Err(PredictionError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_result_rejects_label_mismatch() {
        assert!(matches!(
            PredictionResult::new(RiskLabel::Absent, [0.2, 0.8]),
            Err(PredictionError::Inconsistent { .. })
        ));
        // A tie resolves to class 0.
        assert!(PredictionResult::new(RiskLabel::Absent, [0.5, 0.5]).is_ok());
        assert!(PredictionResult::new(RiskLabel::Present, [0.5, 0.5]).is_err());
    }

    #[test]
    fn test_recommendation_follows_label() {
        assert!(RiskLabel::Present.recommendation().contains("cardiologist"));
        assert!(RiskLabel::Absent
            .recommendation()
            .contains("no significant indication"));
        assert_eq!(RiskLabel::from_class(1), Some(RiskLabel::Present));
        assert_eq!(RiskLabel::from_class(2), None);
    }
}
