//! Prediction service: Orchestrates validation and inference.
//!
//! This service coordinates:
//! - Feature vector assembly against the catalog
//! - Scaling with the fitted scaler
//! - Classification with the fitted classifier

use std::sync::Arc;

use crate::domain::{assemble, AssemblyError, FeatureVector, PredictionLabel, PredictionResult, RawInput};
use crate::ports::{BinaryClassifier, FeatureScaler, InferenceError};
use crate::HeartcheckError;

/// Service for running one prediction per form submission.
///
/// The scaler and classifier are loaded once at startup and injected here;
/// both are read-only, so the service holds no mutable state.
pub struct PredictionService<S, C>
where
    S: FeatureScaler,
    C: BinaryClassifier,
{
    scaler: Arc<S>,
    classifier: Arc<C>,
}

impl<S, C> Clone for PredictionService<S, C>
where
    S: FeatureScaler,
    C: BinaryClassifier,
{
    fn clone(&self) -> Self {
        Self {
            scaler: Arc::clone(&self.scaler),
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<S, C> PredictionService<S, C>
where
    S: FeatureScaler,
    C: BinaryClassifier,
{
    /// Create a new prediction service.
    pub fn new(scaler: Arc<S>, classifier: Arc<C>) -> Self {
        Self { scaler, classifier }
    }

    /// Validate raw input and build the model vector.
    ///
    /// # Errors
    /// Returns `AssemblyError` if any selection is missing or input is malformed.
    pub fn assemble(&self, inputs: &[RawInput]) -> Result<FeatureVector, AssemblyError> {
        assemble(inputs)
    }

    /// Run the scaler/classifier pair on a complete vector.
    ///
    /// The vector is consumed: it is used for exactly one prediction.
    ///
    /// # Errors
    /// Returns `InferenceError` if the artifacts reject the vector.
    pub fn predict(&self, vector: FeatureVector) -> Result<PredictionResult, InferenceError> {
        let scaled = self.scaler.transform(vector.as_slice())?;
        let class = self.classifier.predict(&scaled)?;
        let label = PredictionLabel::from_class(class).ok_or(InferenceError::UnexpectedClass(class))?;
        Ok(PredictionResult::new(label))
    }

    /// Handle one form submission: assemble, then predict.
    ///
    /// # Errors
    /// Returns `HeartcheckError::Validation` for incomplete input and
    /// `HeartcheckError::Inference` for model faults.
    pub fn submit(&self, inputs: &[RawInput]) -> Result<PredictionResult, HeartcheckError> {
        let vector = match self.assemble(inputs) {
            Ok(v) => v,
            Err(e) => {
                match &e {
                    AssemblyError::IncompleteSelection { .. } => {
                        tracing::info!("{}", rejection_summary(&e))
                    }
                    _ => tracing::warn!("{}", rejection_summary(&e)),
                }
                return Err(e.into());
            }
        };

        tracing::debug!("Assembled feature vector ({} columns)", vector.len());

        match self.predict(vector) {
            Ok(result) => {
                tracing::info!("Prediction complete: {}", result.label);
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Inference failed: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Log line for a rejected submission. Names fields only, never entered values.
fn rejection_summary(error: &AssemblyError) -> String {
    match error {
        AssemblyError::IncompleteSelection { missing } => {
            format!("Submission incomplete: unselected {missing:?}")
        }
        AssemblyError::InputCount { expected, got } => {
            format!("Submission rejected: {got} inputs for {expected} fields")
        }
        AssemblyError::KindMismatch { key } => {
            format!("Submission rejected: wrong input kind for {key}")
        }
        AssemblyError::UnknownChoice { key, .. } => {
            format!("Submission rejected: unknown choice for {key}")
        }
    }
}
