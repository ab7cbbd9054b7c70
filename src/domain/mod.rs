//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O. The catalog is static
//! data; assembly is a pure function over it.

pub mod assembly;
pub mod catalog;
mod prediction;

pub use assembly::{assemble, AssemblyError, FeatureVector, RawInput, INCOMPLETE_SELECTION_MESSAGE};
pub use catalog::{
    Choice, FeatureKind, FeatureSpec, NumericInput, FEATURE_CATALOG, FEATURE_COUNT, NUMERIC_COUNT,
};
pub use prediction::{PredictionLabel, PredictionResult};
