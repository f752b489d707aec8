//! Patient input types for heart disease risk prediction.
//!
//! Categorical answers are closed enums. The label tables below are the only
//! way a form string becomes a variant, so an unknown answer is rejected at
//! the boundary instead of silently mapped to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error raised when a categorical answer is outside its closed option set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {field} value {value:?} (expected one of: {expected})")]
pub struct MappingError {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

impl MappingError {
    fn new(field: &'static str, value: &str, options: &[&str]) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected: options.join(", "),
        }
    }
}

/// Declares a closed categorical domain with explicit label and code tables.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal, $code:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in form display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Form labels, in the same order as [`Self::ALL`].
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// Label shown in the form.
            #[must_use]
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Canonical short code used in the model's column names.
            #[must_use]
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = MappingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(MappingError::new($field, other, Self::LABELS)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical! {
    /// Biological sex as recorded in the training data.
    Sex, "sex" {
        Male => "Male", "M";
        Female => "Female", "F";
    }
}

categorical! {
    /// Type of chest discomfort experienced.
    ChestPainType, "chest_pain_type" {
        /// Chest pain related to heart problems
        TypicalAngina => "Typical Angina", "TA";
        /// Chest pain with unusual characteristics
        AtypicalAngina => "Atypical Angina", "ATA";
        /// Chest pain not related to the heart
        NonAnginalPain => "Non-anginal Pain", "NAP";
        /// No chest pain symptoms
        Asymptomatic => "Asymptomatic", "ASY";
    }
}

categorical! {
    /// Resting electrocardiogram result.
    RestingEcg, "resting_ecg" {
        Normal => "Normal", "Normal";
        StTWaveAbnormality => "ST-T wave abnormality", "ST";
        LeftVentricularHypertrophy => "Left Ventricular Hypertrophy", "LVH";
    }
}

categorical! {
    /// Slope of the peak exercise ST segment.
    StSlope, "st_slope" {
        Down => "Down", "Down";
        Flat => "Flat", "Flat";
        Up => "Up", "Up";
    }
}

/// Form labels for the two yes/no questions.
pub const YES_NO_LABELS: &[&str] = &["Yes", "No"];

/// Map a yes/no form answer to a flag.
///
/// # Errors
/// Returns `MappingError` for anything other than `"Yes"` or `"No"`.
pub fn parse_yes_no(field: &'static str, value: &str) -> Result<bool, MappingError> {
    match value {
        "Yes" => Ok(true),
        "No" => Ok(false),
        other => Err(MappingError::new(field, other, YES_NO_LABELS)),
    }
}

/// Inclusive numeric range accepted by a form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && (self.min..=self.max).contains(&value)
    }
}

pub const AGE_RANGE: FieldRange = FieldRange::new(0.0, 120.0);
pub const RESTING_BP_RANGE: FieldRange = FieldRange::new(80.0, 200.0);
pub const CHOLESTEROL_RANGE: FieldRange = FieldRange::new(100.0, 600.0);
pub const MAX_HR_RANGE: FieldRange = FieldRange::new(60.0, 220.0);
pub const OLDPEAK_RANGE: FieldRange = FieldRange::new(0.0, 6.0);

/// Step of the oldpeak input.
pub const OLDPEAK_STEP: f64 = 0.1;

/// The eleven answers of one form submission.
///
/// Ephemeral: built per submission, consumed by the feature transform, then
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Age in years
    pub age: u32,
    pub sex: Sex,
    pub chest_pain_type: ChestPainType,
    /// Resting blood pressure in mmHg
    pub resting_bp: u32,
    /// Serum cholesterol in mg/dL
    pub cholesterol: u32,
    /// Fasting blood sugar above 120 mg/dL
    pub fasting_bs: bool,
    pub resting_ecg: RestingEcg,
    /// Maximum heart rate achieved in bpm
    pub max_hr: u32,
    /// Exercise-induced angina
    pub exercise_angina: bool,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    pub st_slope: StSlope,
}

impl PatientInput {
    /// Validate that numeric answers are within the form's declared ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let checks = [
            ("Age", f64::from(self.age), AGE_RANGE),
            ("Resting BP", f64::from(self.resting_bp), RESTING_BP_RANGE),
            ("Cholesterol", f64::from(self.cholesterol), CHOLESTEROL_RANGE),
            ("Max HR", f64::from(self.max_hr), MAX_HR_RANGE),
            ("Oldpeak", self.oldpeak, OLDPEAK_RANGE),
        ];
        for (label, value, range) in checks {
            if !range.contains(value) {
                errors.push(format!(
                    "{label} {value} out of range [{}, {}]",
                    range.min, range.max
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Untyped form submission, as received from an input surface.
///
/// Categorical answers are plain strings here; conversion into
/// [`PatientInput`] goes through the closed label tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    pub age: u32,
    pub sex: String,
    pub chest_pain_type: String,
    pub resting_bp: u32,
    pub cholesterol: u32,
    pub fasting_bs: String,
    pub resting_ecg: String,
    pub max_hr: u32,
    pub exercise_angina: String,
    pub oldpeak: f64,
    pub st_slope: String,
}

impl TryFrom<&RawSubmission> for PatientInput {
    type Error = MappingError;

    fn try_from(raw: &RawSubmission) -> Result<Self, Self::Error> {
        Ok(Self {
            age: raw.age,
            sex: raw.sex.parse()?,
            chest_pain_type: raw.chest_pain_type.parse()?,
            resting_bp: raw.resting_bp,
            cholesterol: raw.cholesterol,
            fasting_bs: parse_yes_no("fasting_bs", &raw.fasting_bs)?,
            resting_ecg: raw.resting_ecg.parse()?,
            max_hr: raw.max_hr,
            exercise_angina: parse_yes_no("exercise_angina", &raw.exercise_angina)?,
            oldpeak: raw.oldpeak,
            st_slope: raw.st_slope.parse()?,
        })
    }
}

impl TryFrom<RawSubmission> for PatientInput {
    type Error = MappingError;

    fn try_from(raw: RawSubmission) -> Result<Self, Self::Error> {
        Self::try_from(&raw)
    }
}
