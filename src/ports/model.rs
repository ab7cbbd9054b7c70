//! Model port: Traits for the pre-fit scaler and classifier.
//!
//! These abstract the trained model artifact from the application logic so the
//! prediction path can run against stub implementations in tests.

/// Faults raised while running the model. Not user-correctable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Feature count mismatch: got {got}, expected {expected}")]
    Dimension { expected: usize, got: usize },

    #[error("Non-finite value at column {index}")]
    NonFinite { index: usize },

    #[error("Classifier returned unexpected class {0}")]
    UnexpectedClass(i64),
}

/// A fitted feature transform applied before classification.
pub trait FeatureScaler: Send + Sync {
    /// Number of columns the scaler was fit on.
    fn n_features(&self) -> usize;

    /// Transform one row of raw features.
    ///
    /// # Errors
    /// Returns `InferenceError::Dimension` if the row width is wrong.
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// A fitted binary classifier.
pub trait BinaryClassifier: Send + Sync {
    /// Number of columns the classifier was fit on.
    fn n_features(&self) -> usize;

    /// Predict the class of one scaled row.
    ///
    /// # Errors
    /// Returns `InferenceError` if the row does not match the classifier.
    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError>;
}
