//! Feature vector assembly and completeness validation.
//!
//! Turns one raw input per catalog field into the ordered numeric vector the
//! model expects. Numeric values are passed through without range checks;
//! only categorical completeness is validated.

use super::catalog::{FeatureKind, FEATURE_CATALOG, FEATURE_COUNT};

/// User-facing message for an incomplete form.
pub const INCOMPLETE_SELECTION_MESSAGE: &str =
    "Please fill all fields and select options for each category before predicting.";

/// The transient value entered for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// Numeric fields always carry a value.
    Numeric(f64),
    /// `None` means no choice was made.
    Categorical(Option<String>),
}

impl RawInput {
    /// Selected categorical choice.
    pub fn choice(label: impl Into<String>) -> Self {
        Self::Categorical(Some(label.into()))
    }

    /// Categorical field left at the placeholder.
    #[must_use]
    pub fn unselected() -> Self {
        Self::Categorical(None)
    }
}

/// Errors produced while assembling a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    /// At least one categorical field is still unselected.
    ///
    /// `missing` is kept for logging; the message shown to the user does not name fields.
    #[error("{}", INCOMPLETE_SELECTION_MESSAGE)]
    IncompleteSelection { missing: Vec<&'static str> },

    #[error("Expected {expected} inputs, got {got}")]
    InputCount { expected: usize, got: usize },

    #[error("Input for '{key}' does not match its field kind")]
    KindMismatch { key: &'static str },

    #[error("'{choice}' is not a choice for '{key}'")]
    UnknownChoice { key: &'static str, choice: String },
}

/// Ordered model input, built only from complete input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Values in catalog order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Value for a catalog key.
    #[must_use]
    pub fn get_by_key(&self, key: &str) -> Option<f64> {
        super::catalog::feature_index(key).and_then(|i| self.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Assemble a feature vector from raw inputs supplied in catalog order.
///
/// Every field is scanned before reporting an incomplete selection.
///
/// # Errors
/// Returns [`AssemblyError::IncompleteSelection`] if any categorical input is
/// unselected, or a structural error if the inputs do not line up with the catalog.
pub fn assemble(inputs: &[RawInput]) -> Result<FeatureVector, AssemblyError> {
    if inputs.len() != FEATURE_COUNT {
        return Err(AssemblyError::InputCount {
            expected: FEATURE_COUNT,
            got: inputs.len(),
        });
    }

    let mut values = [0.0; FEATURE_COUNT];
    let mut missing = Vec::new();

    for (i, (spec, input)) in FEATURE_CATALOG.iter().zip(inputs).enumerate() {
        match (spec.kind, input) {
            (FeatureKind::Numeric(_), RawInput::Numeric(v)) => values[i] = *v,
            (FeatureKind::Categorical(_), RawInput::Categorical(None)) => missing.push(spec.key),
            (FeatureKind::Categorical(_), RawInput::Categorical(Some(label))) => {
                let code = spec
                    .code_for(label)
                    .ok_or_else(|| AssemblyError::UnknownChoice {
                        key: spec.key,
                        choice: label.clone(),
                    })?;
                values[i] = f64::from(code);
            }
            _ => return Err(AssemblyError::KindMismatch { key: spec.key }),
        }
    }

    if missing.is_empty() {
        Ok(FeatureVector { values })
    } else {
        Err(AssemblyError::IncompleteSelection { missing })
    }
}
