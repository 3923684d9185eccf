//! Request field records for the tabular model families.
//!
//! Each family's record is a fixed-shape typed struct parsed once at the
//! request boundary. Field order in `to_vec` matches the order the
//! corresponding model was trained on; the `FieldSpec` tables are the single
//! written-down source of that order and the artifact loader cross-checks
//! them against every model file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, ModelId};

/// Form fields as submitted, keyed by field name.
pub type FormValues = HashMap<String, String>;

/// Declared type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Real,
}

impl FieldKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::Real => "a number",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared name, type and accepted range of one form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
}

impl FieldSpec {
    const fn int(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            min,
            max,
        }
    }

    const fn real(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Real,
            min,
            max,
        }
    }

    /// Parse one submitted value against this spec.
    fn parse(&self, raw: &str) -> Result<f64, ValidationError> {
        let trimmed = raw.trim();
        let parsed = match self.kind {
            FieldKind::Integer => trimmed.parse::<i64>().ok().map(|v| v as f64),
            FieldKind::Real => trimmed.parse::<f64>().ok().filter(|v| v.is_finite()),
        };
        parsed.ok_or_else(|| ValidationError::WrongType {
            field: self.name,
            kind: self.kind,
            value: raw.to_string(),
        })
    }

    fn check_range(&self, value: f64) -> Result<(), ValidationError> {
        if (self.min..=self.max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Rejection of one submitted form field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` expects {kind}, got `{value}`")]
    WrongType {
        field: &'static str,
        kind: FieldKind,
        value: String,
    },

    #[error("field `{field}` value {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Canonical field order for the diabetes model (trained order).
pub const DIABETES_FIELDS: [FieldSpec; 8] = [
    FieldSpec::int("pregnancies", 0.0, 20.0),
    FieldSpec::int("glucose", 0.0, 300.0),
    FieldSpec::int("blood_pressure", 0.0, 250.0),
    FieldSpec::real("skin_thickness", 0.0, 120.0),
    FieldSpec::real("insulin", 0.0, 1000.0),
    FieldSpec::real("bmi", 0.0, 80.0),
    FieldSpec::real("pedigree", 0.0, 3.0),
    FieldSpec::int("age", 0.0, 120.0),
];

/// Canonical field order for the lung cancer model (trained order).
///
/// Indicator fields are 0/1; `age` is in years.
pub const LUNG_CANCER_FIELDS: [FieldSpec; 15] = [
    FieldSpec::int("gender", 0.0, 1.0),
    FieldSpec::int("age", 0.0, 120.0),
    FieldSpec::int("smoking", 0.0, 1.0),
    FieldSpec::int("yellow_fingers", 0.0, 1.0),
    FieldSpec::int("anxiety", 0.0, 1.0),
    FieldSpec::int("peer_pressure", 0.0, 1.0),
    FieldSpec::int("chronic_disease", 0.0, 1.0),
    FieldSpec::int("fatigue", 0.0, 1.0),
    FieldSpec::int("allergy", 0.0, 1.0),
    FieldSpec::int("wheezing", 0.0, 1.0),
    FieldSpec::int("alcohol_consuming", 0.0, 1.0),
    FieldSpec::int("coughing", 0.0, 1.0),
    FieldSpec::int("shortness_of_breath", 0.0, 1.0),
    FieldSpec::int("swallowing_difficulty", 0.0, 1.0),
    FieldSpec::int("chest_pain", 0.0, 1.0),
];

fn parse_fields(
    specs: &'static [FieldSpec],
    form: &FormValues,
) -> Result<Vec<f64>, ValidationError> {
    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        let raw = form
            .get(spec.name)
            .ok_or(ValidationError::Missing(spec.name))?;
        out.push(spec.parse(raw)?);
    }
    Ok(out)
}

fn check_ranges(specs: &'static [FieldSpec], values: &[f64]) -> Result<(), ValidationError> {
    for (spec, value) in specs.iter().zip(values) {
        spec.check_range(*value)?;
    }
    Ok(())
}

/// Clinical intake fields for the diabetes classifier.
///
/// 8 features matching the exported model: pregnancies, glucose,
/// blood_pressure, skin_thickness, insulin, bmi, pedigree, age.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiabetesFields {
    /// Number of pregnancies
    pub pregnancies: i64,
    /// Plasma glucose concentration in mg/dL
    pub glucose: i64,
    /// Diastolic blood pressure in mmHg
    pub blood_pressure: i64,
    /// Triceps skin fold thickness in mm
    pub skin_thickness: f64,
    /// 2-hour serum insulin in uU/mL
    pub insulin: f64,
    /// Body mass index
    pub bmi: f64,
    /// Diabetes pedigree function
    pub pedigree: f64,
    /// Age in years
    pub age: i64,
}

impl DiabetesFields {
    /// Parse the submitted form fields.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first missing or wrong-typed field.
    pub fn from_form(form: &FormValues) -> Result<Self, ValidationError> {
        let v = parse_fields(&DIABETES_FIELDS, form)?;
        Ok(Self {
            pregnancies: v[0] as i64,
            glucose: v[1] as i64,
            blood_pressure: v[2] as i64,
            skin_thickness: v[3],
            insulin: v[4],
            bmi: v[5],
            pedigree: v[6],
            age: v[7] as i64,
        })
    }

    /// Convert to the model input vector.
    /// Order matches the exported model: pregnancies, glucose, blood_pressure,
    /// skin_thickness, insulin, bmi, pedigree, age.
    #[must_use]
    pub fn to_vec(&self) -> FeatureVector {
        vec![
            self.pregnancies as f64,
            self.glucose as f64,
            self.blood_pressure as f64,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.pedigree,
            self.age as f64,
        ]
    }

    /// Validate that all fields are within their declared ranges.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_ranges(&DIABETES_FIELDS, &self.to_vec())
    }
}

/// Survey fields for the lung cancer classifier.
///
/// 15 integer features; indicators are 0 (no) or 1 (yes).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LungCancerFields {
    pub gender: i64,
    pub age: i64,
    pub smoking: i64,
    pub yellow_fingers: i64,
    pub anxiety: i64,
    pub peer_pressure: i64,
    pub chronic_disease: i64,
    pub fatigue: i64,
    pub allergy: i64,
    pub wheezing: i64,
    pub alcohol_consuming: i64,
    pub coughing: i64,
    pub shortness_of_breath: i64,
    pub swallowing_difficulty: i64,
    pub chest_pain: i64,
}

impl LungCancerFields {
    /// Parse the submitted form fields.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first missing or wrong-typed field.
    pub fn from_form(form: &FormValues) -> Result<Self, ValidationError> {
        let v = parse_fields(&LUNG_CANCER_FIELDS, form)?;
        Ok(Self {
            gender: v[0] as i64,
            age: v[1] as i64,
            smoking: v[2] as i64,
            yellow_fingers: v[3] as i64,
            anxiety: v[4] as i64,
            peer_pressure: v[5] as i64,
            chronic_disease: v[6] as i64,
            fatigue: v[7] as i64,
            allergy: v[8] as i64,
            wheezing: v[9] as i64,
            alcohol_consuming: v[10] as i64,
            coughing: v[11] as i64,
            shortness_of_breath: v[12] as i64,
            swallowing_difficulty: v[13] as i64,
            chest_pain: v[14] as i64,
        })
    }

    /// Convert to the model input vector, in trained field order.
    #[must_use]
    pub fn to_vec(&self) -> FeatureVector {
        vec![
            self.gender as f64,
            self.age as f64,
            self.smoking as f64,
            self.yellow_fingers as f64,
            self.anxiety as f64,
            self.peer_pressure as f64,
            self.chronic_disease as f64,
            self.fatigue as f64,
            self.allergy as f64,
            self.wheezing as f64,
            self.alcohol_consuming as f64,
            self.coughing as f64,
            self.shortness_of_breath as f64,
            self.swallowing_difficulty as f64,
            self.chest_pain as f64,
        ]
    }

    /// Validate that all fields are within their declared ranges.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_ranges(&LUNG_CANCER_FIELDS, &self.to_vec())
    }
}

/// A tabular prediction request, tagged by model family.
#[derive(Debug, Clone)]
pub enum TabularRequest {
    Diabetes(DiabetesFields),
    LungCancer(LungCancerFields),
}

impl TabularRequest {
    /// The model this request is addressed to.
    #[must_use]
    pub fn model(&self) -> ModelId {
        match self {
            Self::Diabetes(_) => ModelId::Diabetes,
            Self::LungCancer(_) => ModelId::LungCancer,
        }
    }

    /// Canonical field order for this request's model family.
    #[must_use]
    pub fn specs(&self) -> &'static [FieldSpec] {
        match self {
            Self::Diabetes(_) => &DIABETES_FIELDS,
            Self::LungCancer(_) => &LUNG_CANCER_FIELDS,
        }
    }

    /// Validate all fields against their declared ranges.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Diabetes(f) => f.validate(),
            Self::LungCancer(f) => f.validate(),
        }
    }

    /// The raw (unscaled) model input vector.
    #[must_use]
    pub fn to_vec(&self) -> FeatureVector {
        match self {
            Self::Diabetes(f) => f.to_vec(),
            Self::LungCancer(f) => f.to_vec(),
        }
    }
}

/// Raw image payload for an image-based prediction.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Full upload body.
    pub bytes: Vec<u8>,
    /// Client-supplied filename; kept for logging only, never used on disk.
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diabetes_form() -> FormValues {
        [
            ("pregnancies", "2"),
            ("glucose", "120"),
            ("blood_pressure", "70"),
            ("skin_thickness", "20"),
            ("insulin", "79"),
            ("bmi", "25.0"),
            ("pedigree", "0.5"),
            ("age", "33"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn lung_cancer_form() -> FormValues {
        LUNG_CANCER_FIELDS
            .iter()
            .map(|spec| (spec.name.to_string(), "0".to_string()))
            .collect()
    }

    #[test]
    fn test_diabetes_to_vec_order() {
        let fields = DiabetesFields::from_form(&diabetes_form()).expect("Should parse");
        assert_eq!(
            fields.to_vec(),
            vec![2.0, 120.0, 70.0, 20.0, 79.0, 25.0, 0.5, 33.0]
        );
    }

    #[test]
    fn test_missing_field_named_for_every_field() {
        let full = diabetes_form();
        for spec in &DIABETES_FIELDS {
            let mut form = full.clone();
            form.remove(spec.name);
            let err = DiabetesFields::from_form(&form).expect_err("Should reject");
            assert_eq!(err, ValidationError::Missing(spec.name));
        }

        let full = lung_cancer_form();
        for spec in &LUNG_CANCER_FIELDS {
            let mut form = full.clone();
            form.remove(spec.name);
            let err = LungCancerFields::from_form(&form).expect_err("Should reject");
            assert_eq!(err, ValidationError::Missing(spec.name));
        }
    }

    #[test]
    fn test_wrong_type_named_for_every_field() {
        let full = diabetes_form();
        for spec in &DIABETES_FIELDS {
            let mut form = full.clone();
            // A real where an integer is declared, or non-numeric text.
            let bad = match spec.kind {
                FieldKind::Integer => "2.5",
                FieldKind::Real => "abc",
            };
            form.insert(spec.name.to_string(), bad.to_string());
            let err = DiabetesFields::from_form(&form).expect_err("Should reject");
            match err {
                ValidationError::WrongType { field, .. } => assert_eq!(field, spec.name),
                other => panic!("expected WrongType, got {other:?}"),
            }
        }

        let full = lung_cancer_form();
        for spec in &LUNG_CANCER_FIELDS {
            let mut form = full.clone();
            form.insert(spec.name.to_string(), "1.5".to_string());
            let err = LungCancerFields::from_form(&form).expect_err("Should reject");
            match err {
                ValidationError::WrongType { field, .. } => assert_eq!(field, spec.name),
                other => panic!("expected WrongType, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_out_of_range_named() {
        let fields = DiabetesFields {
            bmi: 200.0,
            ..DiabetesFields::from_form(&diabetes_form()).expect("Should parse")
        };
        let err = fields.validate().expect_err("Should reject");
        match err {
            ValidationError::OutOfRange { field, .. } => assert_eq!(field, "bmi"),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_all_zero_lung_cancer_vector_is_valid() {
        let fields = LungCancerFields::from_form(&lung_cancer_form()).expect("Should parse");
        assert!(fields.validate().is_ok());
        assert_eq!(fields.to_vec(), vec![0.0; 15]);
    }

    #[test]
    fn test_integer_field_accepts_no_fraction() {
        let mut form = diabetes_form();
        form.insert("glucose".to_string(), " 121 ".to_string());
        let fields = DiabetesFields::from_form(&form).expect("Should parse with whitespace");
        assert_eq!(fields.glucose, 121);
    }
}
