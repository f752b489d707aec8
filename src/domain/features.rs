//! Fixed-order feature encoding consumed by the scaler and classifier.
//!
//! The column order here must match the order the artifacts were fitted on.
//! It is checked against the artifacts' `feature_names` at load time.

use serde::{Deserialize, Serialize};

use super::patient::{ChestPainType, MappingError, PatientInput, RawSubmission, RestingEcg, Sex, StSlope};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 18;

/// Column names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Age",
    "Sex",
    "RestingBP",
    "Cholesterol",
    "FastingBS",
    "MaxHR",
    "ExerciseAngina",
    "Oldpeak",
    "ChestPainType_ASY",
    "ChestPainType_ATA",
    "ChestPainType_NAP",
    "ChestPainType_TA",
    "RestingECG_LVH",
    "RestingECG_Normal",
    "RestingECG_ST",
    "ST_Slope_Down",
    "ST_Slope_Flat",
    "ST_Slope_Up",
];

/// One encoded row, one field per model column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct FeatureVector {
    pub Age: f64,
    pub Sex: f64,
    pub RestingBP: f64,
    pub Cholesterol: f64,
    pub FastingBS: f64,
    pub MaxHR: f64,
    pub ExerciseAngina: f64,
    pub Oldpeak: f64,
    pub ChestPainType_ASY: f64,
    pub ChestPainType_ATA: f64,
    pub ChestPainType_NAP: f64,
    pub ChestPainType_TA: f64,
    pub RestingECG_LVH: f64,
    pub RestingECG_Normal: f64,
    pub RestingECG_ST: f64,
    pub ST_Slope_Down: f64,
    pub ST_Slope_Flat: f64,
    pub ST_Slope_Up: f64,
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn sex_flag(sex: Sex) -> f64 {
    match sex {
        Sex::Male => 1.0,
        Sex::Female => 0.0,
    }
}

/// Indicators in column order: ASY, ATA, NAP, TA.
fn chest_pain_one_hot(value: ChestPainType) -> [f64; 4] {
    ["ASY", "ATA", "NAP", "TA"].map(|code| flag(value.code() == code))
}

/// Indicators in column order: LVH, Normal, ST.
fn resting_ecg_one_hot(value: RestingEcg) -> [f64; 3] {
    ["LVH", "Normal", "ST"].map(|code| flag(value.code() == code))
}

/// Indicators in column order: Down, Flat, Up.
fn st_slope_one_hot(value: StSlope) -> [f64; 3] {
    ["Down", "Flat", "Up"].map(|code| flag(value.code() == code))
}

impl FeatureVector {
    /// Encode one form submission.
    #[must_use]
    pub fn encode(input: &PatientInput) -> Self {
        let [cp_asy, cp_ata, cp_nap, cp_ta] = chest_pain_one_hot(input.chest_pain_type);
        let [ecg_lvh, ecg_normal, ecg_st] = resting_ecg_one_hot(input.resting_ecg);
        let [slope_down, slope_flat, slope_up] = st_slope_one_hot(input.st_slope);

        Self {
            Age: f64::from(input.age),
            Sex: sex_flag(input.sex),
            RestingBP: f64::from(input.resting_bp),
            Cholesterol: f64::from(input.cholesterol),
            FastingBS: flag(input.fasting_bs),
            MaxHR: f64::from(input.max_hr),
            ExerciseAngina: flag(input.exercise_angina),
            Oldpeak: input.oldpeak,
            ChestPainType_ASY: cp_asy,
            ChestPainType_ATA: cp_ata,
            ChestPainType_NAP: cp_nap,
            ChestPainType_TA: cp_ta,
            RestingECG_LVH: ecg_lvh,
            RestingECG_Normal: ecg_normal,
            RestingECG_ST: ecg_st,
            ST_Slope_Down: slope_down,
            ST_Slope_Flat: slope_flat,
            ST_Slope_Up: slope_up,
        }
    }

    /// Map an untyped submission through the label tables, then encode it.
    ///
    /// # Errors
    /// Returns `MappingError` if any categorical answer is outside its domain.
    pub fn from_submission(raw: &RawSubmission) -> Result<Self, MappingError> {
        let input = PatientInput::try_from(raw)?;
        Ok(Self::encode(&input))
    }

    /// Values in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.Age,
            self.Sex,
            self.RestingBP,
            self.Cholesterol,
            self.FastingBS,
            self.MaxHR,
            self.ExerciseAngina,
            self.Oldpeak,
            self.ChestPainType_ASY,
            self.ChestPainType_ATA,
            self.ChestPainType_NAP,
            self.ChestPainType_TA,
            self.RestingECG_LVH,
            self.RestingECG_Normal,
            self.RestingECG_ST,
            self.ST_Slope_Down,
            self.ST_Slope_Flat,
            self.ST_Slope_Up,
        ]
    }

    /// Pairs of (column name, value) in model input order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concrete_input() -> PatientInput {
        PatientInput {
            age: 55,
            sex: Sex::Male,
            chest_pain_type: ChestPainType::Asymptomatic,
            resting_bp: 140,
            cholesterol: 289,
            fasting_bs: false,
            resting_ecg: RestingEcg::Normal,
            max_hr: 130,
            exercise_angina: true,
            oldpeak: 1.0,
            st_slope: StSlope::Flat,
        }
    }

    fn value(fv: &FeatureVector, name: &str) -> f64 {
        fv.named()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .expect("known column")
    }

    fn group_sum(fv: &FeatureVector, prefix: &str) -> f64 {
        fv.named()
            .filter(|(n, _)| n.starts_with(prefix))
            .map(|(_, v)| v)
            .sum()
    }

    #[test]
    fn test_concrete_encoding() {
        let fv = FeatureVector::encode(&concrete_input());

        assert_eq!(fv.Sex, 1.0);
        assert_eq!(fv.FastingBS, 0.0);
        assert_eq!(fv.ExerciseAngina, 1.0);

        assert_eq!(fv.ChestPainType_ASY, 1.0);
        assert_eq!(fv.ChestPainType_ATA, 0.0);
        assert_eq!(fv.ChestPainType_NAP, 0.0);
        assert_eq!(fv.ChestPainType_TA, 0.0);

        assert_eq!(fv.RestingECG_Normal, 1.0);
        assert_eq!(fv.RestingECG_LVH, 0.0);
        assert_eq!(fv.RestingECG_ST, 0.0);

        assert_eq!(fv.ST_Slope_Flat, 1.0);
        assert_eq!(fv.ST_Slope_Down, 0.0);
        assert_eq!(fv.ST_Slope_Up, 0.0);

        assert_eq!(fv.Age, 55.0);
        assert_eq!(fv.RestingBP, 140.0);
        assert_eq!(fv.Cholesterol, 289.0);
        assert_eq!(fv.MaxHR, 130.0);
        assert!((fv.Oldpeak - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_array_follows_column_order() {
        let fv = FeatureVector::encode(&concrete_input());
        let arr = fv.to_array();
        assert_eq!(arr.len(), FEATURE_COUNT);
        assert_eq!(arr[0], 55.0);
        assert_eq!(arr[2], 140.0);
        assert_eq!(arr[3], 289.0);
        assert_eq!(arr[5], 130.0);
        assert_eq!(arr[8], 1.0); // ChestPainType_ASY
        assert_eq!(arr[13], 1.0); // RestingECG_Normal
        assert_eq!(arr[16], 1.0); // ST_Slope_Flat
        assert_eq!(value(&fv, "ChestPainType_ASY"), arr[8]);
    }

    #[test]
    fn test_exactly_one_indicator_per_group() {
        let base = concrete_input();
        for &cp in ChestPainType::ALL {
            for &ecg in RestingEcg::ALL {
                for &slope in StSlope::ALL {
                    let input = PatientInput {
                        chest_pain_type: cp,
                        resting_ecg: ecg,
                        st_slope: slope,
                        ..base
                    };
                    let fv = FeatureVector::encode(&input);
                    assert_eq!(group_sum(&fv, "ChestPainType_"), 1.0);
                    assert_eq!(group_sum(&fv, "RestingECG_"), 1.0);
                    assert_eq!(group_sum(&fv, "ST_Slope_"), 1.0);
                    assert_eq!(value(&fv, &format!("ChestPainType_{}", cp.code())), 1.0);
                    assert_eq!(value(&fv, &format!("RestingECG_{}", ecg.code())), 1.0);
                    assert_eq!(value(&fv, &format!("ST_Slope_{}", slope.code())), 1.0);
                }
            }
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let input = concrete_input();
        let a = FeatureVector::encode(&input).to_array();
        let b = FeatureVector::encode(&input).to_array();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_boundary_values_encode() {
        let input = PatientInput {
            age: 0,
            resting_bp: 80,
            cholesterol: 100,
            max_hr: 220,
            oldpeak: 0.0,
            ..concrete_input()
        };
        assert!(input.validate().is_ok());
        let fv = FeatureVector::encode(&input);
        assert_eq!(fv.Age, 0.0);
        assert_eq!(fv.RestingBP, 80.0);
        assert_eq!(fv.Cholesterol, 100.0);
        assert_eq!(fv.MaxHR, 220.0);
        assert_eq!(fv.Oldpeak, 0.0);
    }

    #[test]
    fn test_unknown_category_fails_transform() {
        let raw = RawSubmission {
            age: 55,
            sex: "Male".into(),
            chest_pain_type: "Unknown".into(),
            resting_bp: 140,
            cholesterol: 289,
            fasting_bs: "No".into(),
            resting_ecg: "Normal".into(),
            max_hr: 130,
            exercise_angina: "Yes".into(),
            oldpeak: 1.0,
            st_slope: "Flat".into(),
        };
        let err = FeatureVector::from_submission(&raw).unwrap_err();
        assert_eq!(err.field, "chest_pain_type");
    }
}
