//! Prediction result types.
//!
//! Represents the binary output of the heart disease classifier.

/// Binary classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionLabel {
    /// Classifier output 0
    NoHeartDisease,
    /// Classifier output 1
    HeartDisease,
}

impl PredictionLabel {
    /// Map a raw classifier output to a label.
    #[must_use]
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Self::NoHeartDisease),
            1 => Some(Self::HeartDisease),
            _ => None,
        }
    }

    #[must_use]
    pub fn class(&self) -> i64 {
        match self {
            Self::NoHeartDisease => 0,
            Self::HeartDisease => 1,
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::NoHeartDisease => (16, 185, 129), // Emerald (#10B981)
            Self::HeartDisease => (244, 63, 94),    // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHeartDisease => write!(f, "No Heart Disease"),
            Self::HeartDisease => write!(f, "Heart Disease"),
        }
    }
}

/// Outcome of one successful submission. Displayed once, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionResult {
    pub label: PredictionLabel,
}

impl PredictionResult {
    #[must_use]
    pub fn new(label: PredictionLabel) -> Self {
        Self { label }
    }

    /// The user-visible message, e.g. `Prediction: Heart Disease`.
    #[must_use]
    pub fn message(&self) -> String {
        format!("Prediction: {}", self.label)
    }
}
