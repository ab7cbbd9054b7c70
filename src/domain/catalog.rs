//! Feature catalog for heart disease risk prediction.
//!
//! Based on the UCI Cleveland heart disease features. The catalog is the single
//! source of truth for labels, control kinds and categorical encodings, and its
//! order is the column order the scaler and classifier were fit on.

/// One selectable value of a categorical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    /// Human-readable label shown in the form
    pub label: &'static str,
    /// Encoded value the model was trained on
    pub code: i32,
}

/// How a numeric field is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericInput {
    /// Whole numbers, step 1
    Integer,
    /// Free decimal entry
    Decimal,
    /// Bounded integer slider
    Slider { min: i32, max: i32 },
}

/// Semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric(NumericInput),
    Categorical(&'static [Choice]),
}

/// Declarative description of one model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Stable identifier matching the model column
    pub key: &'static str,
    /// Display label
    pub label: &'static str,
    /// Optional help text for the control
    pub help: Option<&'static str>,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FeatureKind::Numeric(_))
    }

    /// Choices in declared order (empty for numeric fields).
    #[must_use]
    pub fn choices(&self) -> &'static [Choice] {
        match self.kind {
            FeatureKind::Categorical(choices) => choices,
            FeatureKind::Numeric(_) => &[],
        }
    }

    /// Resolve a display label to its encoded value.
    #[must_use]
    pub fn code_for(&self, label: &str) -> Option<i32> {
        self.choices()
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.code)
    }

    /// Default value a numeric control starts from.
    #[must_use]
    pub fn numeric_default(&self) -> f64 {
        match self.kind {
            FeatureKind::Numeric(NumericInput::Slider { min, .. }) => f64::from(min),
            _ => 0.0,
        }
    }
}

const SEX: &[Choice] = &[
    Choice { label: "Male", code: 1 },
    Choice { label: "Female", code: 0 },
];

const CHEST_PAIN: &[Choice] = &[
    Choice { label: "Typical Angina", code: 0 },
    Choice { label: "Atypical Angina", code: 1 },
    Choice { label: "Non-Anginal Pain", code: 2 },
    Choice { label: "Asymptomatic", code: 3 },
];

const YES_NO: &[Choice] = &[
    Choice { label: "Yes", code: 1 },
    Choice { label: "No", code: 0 },
];

const RESTING_ECG: &[Choice] = &[
    Choice { label: "Normal", code: 0 },
    Choice { label: "ST-T Wave Abnormality", code: 1 },
    Choice { label: "Left Ventricular Hypertrophy", code: 2 },
];

const ST_SLOPE: &[Choice] = &[
    Choice { label: "Upsloping", code: 0 },
    Choice { label: "Flat", code: 1 },
    Choice { label: "Downsloping", code: 2 },
];

// Not zero-based: the training data codes thalassemia as 1..=3.
const THALASSEMIA: &[Choice] = &[
    Choice { label: "Normal", code: 1 },
    Choice { label: "Fixed Defect", code: 2 },
    Choice { label: "Reversible Defect", code: 3 },
];

/// Total number of model columns.
pub const FEATURE_COUNT: usize = 13;

/// Number of leading numeric columns.
pub const NUMERIC_COUNT: usize = 6;

/// The ordered feature catalog.
///
/// Order: age, trestbps, chol, thalach, oldpeak, ca, sex, cp, fbs, restecg, exang, slope, thal.
/// Changing this after the model was fit silently invalidates predictions.
pub static FEATURE_CATALOG: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec {
        key: "age",
        label: "Age",
        help: None,
        kind: FeatureKind::Numeric(NumericInput::Integer),
    },
    FeatureSpec {
        key: "trestbps",
        label: "Resting Blood Pressure (mm Hg)",
        help: None,
        kind: FeatureKind::Numeric(NumericInput::Integer),
    },
    FeatureSpec {
        key: "chol",
        label: "Serum Cholestoral (mg/dl)",
        help: None,
        kind: FeatureKind::Numeric(NumericInput::Integer),
    },
    FeatureSpec {
        key: "thalach",
        label: "Maximum Heart Rate Achieved",
        help: None,
        kind: FeatureKind::Numeric(NumericInput::Integer),
    },
    FeatureSpec {
        key: "oldpeak",
        label: "Oldpeak (ST depression by exercise)",
        help: None,
        kind: FeatureKind::Numeric(NumericInput::Decimal),
    },
    FeatureSpec {
        key: "ca",
        label: "Number of Major Vessels (0-3)",
        help: Some("Number of major vessels colored by fluoroscopy (0-3)"),
        kind: FeatureKind::Numeric(NumericInput::Slider { min: 0, max: 3 }),
    },
    FeatureSpec {
        key: "sex",
        label: "Sex",
        help: None,
        kind: FeatureKind::Categorical(SEX),
    },
    FeatureSpec {
        key: "cp",
        label: "Chest Pain Type",
        help: None,
        kind: FeatureKind::Categorical(CHEST_PAIN),
    },
    FeatureSpec {
        key: "fbs",
        label: "Fasting Blood Sugar > 120 mg/dl",
        help: None,
        kind: FeatureKind::Categorical(YES_NO),
    },
    FeatureSpec {
        key: "restecg",
        label: "Resting ECG Results",
        help: None,
        kind: FeatureKind::Categorical(RESTING_ECG),
    },
    FeatureSpec {
        key: "exang",
        label: "Exercise Induced Angina",
        help: None,
        kind: FeatureKind::Categorical(YES_NO),
    },
    FeatureSpec {
        key: "slope",
        label: "Slope of Peak Exercise ST Segment",
        help: None,
        kind: FeatureKind::Categorical(ST_SLOPE),
    },
    FeatureSpec {
        key: "thal",
        label: "Thalassemia",
        help: None,
        kind: FeatureKind::Categorical(THALASSEMIA),
    },
];

/// Look up a field by key.
#[must_use]
pub fn feature(key: &str) -> Option<&'static FeatureSpec> {
    FEATURE_CATALOG.iter().find(|f| f.key == key)
}

/// Position of a key in the model column order.
#[must_use]
pub fn feature_index(key: &str) -> Option<usize> {
    FEATURE_CATALOG.iter().position(|f| f.key == key)
}

/// Keys in model column order.
pub fn feature_keys() -> impl Iterator<Item = &'static str> {
    FEATURE_CATALOG.iter().map(|f| f.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let keys: Vec<&str> = feature_keys().collect();
        assert_eq!(
            keys,
            [
                "age", "trestbps", "chol", "thalach", "oldpeak", "ca", "sex", "cp", "fbs",
                "restecg", "exang", "slope", "thal"
            ]
        );
    }

    #[test]
    fn test_numeric_block_precedes_categorical() {
        assert!(FEATURE_CATALOG[..NUMERIC_COUNT].iter().all(FeatureSpec::is_numeric));
        assert!(FEATURE_CATALOG[NUMERIC_COUNT..].iter().all(|f| !f.is_numeric()));
    }

    #[test]
    fn test_code_lookup() {
        let cp = feature("cp").expect("cp in catalog");
        assert_eq!(cp.code_for("Asymptomatic"), Some(3));
        assert_eq!(cp.code_for("Select..."), None);

        let thal = feature("thal").expect("thal in catalog");
        assert_eq!(thal.code_for("Normal"), Some(1));
        assert_eq!(thal.code_for("Reversible Defect"), Some(3));

        // Same label, different encodings per field.
        let restecg = feature("restecg").expect("restecg in catalog");
        assert_eq!(restecg.code_for("Normal"), Some(0));
    }

    #[test]
    fn test_choice_order_is_declared_order() {
        let labels: Vec<&str> = feature("sex")
            .expect("sex in catalog")
            .choices()
            .iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, ["Male", "Female"]);
    }

    #[test]
    fn test_vessel_slider_bounds() {
        let ca = feature("ca").expect("ca in catalog");
        assert_eq!(
            ca.kind,
            FeatureKind::Numeric(NumericInput::Slider { min: 0, max: 3 })
        );
        assert!(ca.help.is_some());
        assert_eq!(feature_index("ca"), Some(5));
    }
}
