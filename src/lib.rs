//! # Heartcheck
//!
//! Heart disease risk prediction from a guided form.
//!
//! This crate provides:
//! - A declarative feature catalog (labels, kinds, categorical encodings)
//! - Completeness validation and ordered feature-vector assembly
//! - Inference through a pre-fit standard scaler and logistic regression
//! - Terminal UI and one-shot CLI, both driven from the catalog
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Catalog, assembly, prediction types (pure)
//! - `ports`: Scaler and classifier traits
//! - `adapters`: JSON model artifacts, log sanitization
//! - `application`: The prediction use case
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{assemble, FeatureVector, PredictionLabel, PredictionResult, RawInput};

/// Result type for Heartcheck operations
pub type Result<T> = std::result::Result<T, HeartcheckError>;

/// Main error type for Heartcheck
#[derive(Debug, thiserror::Error)]
pub enum HeartcheckError {
    /// Incomplete or malformed form input; the user can correct it.
    #[error("{0}")]
    Validation(#[from] domain::AssemblyError),

    /// The model failed on a well-formed vector.
    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HeartcheckError {
    /// Whether the user can fix this by changing the form input.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
