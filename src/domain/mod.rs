//! Domain layer: Core types and the feature transform.
//!
//! Pure Rust types with no I/O. Categorical answers are closed enums and the
//! feature row is a fixed-field struct.

mod diagnosis;
mod features;
mod patient;

pub use diagnosis::{Assessment, PredictionError, PredictionResult, RiskLabel, PROBABILITY_TOLERANCE};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use patient::{
    parse_yes_no, ChestPainType, FieldRange, MappingError, PatientInput, RawSubmission,
    RestingEcg, Sex, StSlope, AGE_RANGE, CHOLESTEROL_RANGE, MAX_HR_RANGE, OLDPEAK_RANGE,
    OLDPEAK_STEP, RESTING_BP_RANGE, YES_NO_LABELS,
};
