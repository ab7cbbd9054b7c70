//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifact`: JSON model artifacts (scaler + logistic regression)
//! - `sanitize`: clinical value filtering for logs

pub mod artifact;
pub mod sanitize;

pub use artifact::{ArtifactError, LogisticRegression, ModelArtifacts, StandardScaler};
