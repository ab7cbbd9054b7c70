//! Model artifact adapter: JSON-backed scaler and logistic regression.
//!
//! Loads the two pre-fit artifacts exported by the training pipeline:
//!
//! - `scaler.json`: per-column `mean` and `scale` of a standard scaler
//! - `logreg_model.json`: `coefficients`, `intercept` and `classes` of a
//!   logistic regression classifier
//!
//! # Integrity
//!
//! An optional `manifest.json` binds both files to SHA-256 digests (see the
//! `write_manifest` binary). When present, every bound file is hashed and
//! compared before anything is parsed. Setting `HEARTCHECK_REQUIRE_MANIFEST=true`
//! makes a missing manifest fatal.
//!
//! # Consistency
//!
//! Parameter lengths must equal the catalog width, and when the artifacts carry
//! `feature_names` they must match the catalog key order exactly. Anything else
//! is refused at startup rather than producing silently wrong predictions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::catalog::{feature_keys, FEATURE_COUNT};
use crate::ports::{BinaryClassifier, FeatureScaler, InferenceError};

pub const SCALER_FILE: &str = "scaler.json";
pub const CLASSIFIER_FILE: &str = "logreg_model.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors raised while loading model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found at {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact format in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {file}: {reason}")]
    Shape { file: &'static str, reason: String },

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("File hash mismatch for {0}")]
    HashMismatch(String),
}

/// Fitted standard scaler parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&mut self) -> Result<(), ArtifactError> {
        let shape = |reason: String| ArtifactError::Shape {
            file: SCALER_FILE,
            reason,
        };

        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(shape(format!(
                "expected {FEATURE_COUNT} columns, got mean={} scale={}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(shape("parameters must be finite".into()));
        }
        check_feature_names(SCALER_FILE, self.feature_names.as_deref())?;

        // Constant columns are fit with a zero scale; they pass through unscaled.
        for s in &mut self.scale {
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if row.len() != self.mean.len() {
            return Err(InferenceError::Dimension {
                expected: self.mean.len(),
                got: row.len(),
            });
        }

        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .enumerate()
            .map(|(i, (x, (mean, scale)))| {
                let v = (x - mean) / scale;
                if v.is_finite() {
                    Ok(v)
                } else {
                    Err(InferenceError::NonFinite { index: i })
                }
            })
            .collect()
    }
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

/// Fitted logistic regression parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), ArtifactError> {
        let shape = |reason: String| ArtifactError::Shape {
            file: CLASSIFIER_FILE,
            reason,
        };

        if self.coefficients.len() != FEATURE_COUNT {
            return Err(shape(format!(
                "expected {FEATURE_COUNT} coefficients, got {}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(shape("parameters must be finite".into()));
        }
        if self.classes[0] == self.classes[1] {
            return Err(shape("classes must be distinct".into()));
        }
        check_feature_names(CLASSIFIER_FILE, self.feature_names.as_deref())
    }

    /// Signed distance to the decision boundary.
    ///
    /// # Errors
    /// Returns `InferenceError::Dimension` if the row width is wrong.
    pub fn decision_function(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.coefficients.len() {
            return Err(InferenceError::Dimension {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        let z = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        if z.is_finite() {
            Ok(z)
        } else {
            Err(InferenceError::NonFinite {
                index: self.coefficients.len(),
            })
        }
    }
}

impl BinaryClassifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, row: &[f64]) -> Result<i64, InferenceError> {
        let z = self.decision_function(row)?;
        Ok(if z > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }
}

fn check_feature_names(file: &'static str, names: Option<&[String]>) -> Result<(), ArtifactError> {
    let Some(names) = names else {
        return Ok(());
    };
    if !names.iter().map(String::as_str).eq(feature_keys()) {
        return Err(ArtifactError::Shape {
            file,
            reason: format!(
                "feature_names {:?} do not match catalog order {:?}",
                names,
                feature_keys().collect::<Vec<_>>()
            ),
        });
    }
    Ok(())
}

/// Manifest binding artifact files to their SHA-256 digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
    pub files: BTreeMap<String, String>,
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn verify_manifest(dir: &Path, require: bool) -> Result<bool, ArtifactError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        if require {
            return Err(ArtifactError::Manifest(format!(
                "{MANIFEST_FILE} required but not found in {dir:?}"
            )));
        }
        tracing::warn!("No {} in {:?}; artifact hashes not verified", MANIFEST_FILE, dir);
        return Ok(false);
    }

    let content = read_file(&manifest_path)?;
    let manifest: ModelManifest =
        serde_json::from_slice(&content).map_err(|source| ArtifactError::Parse {
            path: manifest_path.clone(),
            source,
        })?;

    if manifest.version != 1 {
        return Err(ArtifactError::Manifest(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }
    for required in [SCALER_FILE, CLASSIFIER_FILE] {
        if !manifest.files.contains_key(required) {
            return Err(ArtifactError::Manifest(format!(
                "{MANIFEST_FILE} must bind {required}"
            )));
        }
    }

    for (rel, expected_hex) in &manifest.files {
        let bytes = read_file(&dir.join(rel))?;
        if !sha256_hex(&bytes).eq_ignore_ascii_case(expected_hex.trim()) {
            return Err(ArtifactError::HashMismatch(rel.clone()));
        }
    }

    Ok(true)
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The loaded scaler/classifier pair. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub scaler: Arc<StandardScaler>,
    pub classifier: Arc<LogisticRegression>,
}

impl ModelArtifacts {
    /// Load and check both artifacts from `dir`.
    ///
    /// # Errors
    /// Returns error if a file is missing, unreadable, malformed, inconsistent
    /// with the feature catalog, or fails manifest verification.
    pub fn load(dir: &Path, require_manifest: bool) -> Result<Self, ArtifactError> {
        if !dir.is_dir() {
            return Err(ArtifactError::Missing(dir.to_path_buf()));
        }

        let verified = verify_manifest(dir, require_manifest)?;

        let mut scaler: StandardScaler = parse_json(&dir.join(SCALER_FILE))?;
        scaler.validate()?;

        let classifier: LogisticRegression = parse_json(&dir.join(CLASSIFIER_FILE))?;
        classifier.validate()?;

        tracing::info!(
            "Loaded model artifacts from {:?} (n_features={}, classes={:?}, manifest_verified={})",
            dir,
            scaler.n_features(),
            classifier.classes,
            verified
        );

        Ok(Self {
            scaler: Arc::new(scaler),
            classifier: Arc::new(classifier),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn keys() -> Vec<String> {
        feature_keys().map(str::to_string).collect()
    }

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names: Some(keys()),
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    fn classifier(intercept: f64) -> LogisticRegression {
        LogisticRegression {
            feature_names: None,
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept,
            classes: [0, 1],
        }
    }

    fn write_artifacts(dir: &Path, scaler: &StandardScaler, classifier: &LogisticRegression) {
        fs::write(dir.join(SCALER_FILE), serde_json::to_vec(scaler).expect("serialize"))
            .expect("write scaler");
        fs::write(
            dir.join(CLASSIFIER_FILE),
            serde_json::to_vec(classifier).expect("serialize"),
        )
        .expect("write classifier");
    }

    fn write_manifest(dir: &Path) {
        let mut files = BTreeMap::new();
        for name in [SCALER_FILE, CLASSIFIER_FILE] {
            let bytes = fs::read(dir.join(name)).expect("read artifact");
            files.insert(name.to_string(), sha256_hex(&bytes));
        }
        let manifest = ModelManifest {
            version: 1,
            created_at: None,
            files,
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("serialize"),
        )
        .expect("write manifest");
    }

    #[test]
    fn test_load_valid_artifacts() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), &scaler(), &classifier(0.5));

        let artifacts = ModelArtifacts::load(temp.path(), false).expect("load");
        assert_eq!(artifacts.scaler.n_features(), FEATURE_COUNT);
        assert_eq!(artifacts.classifier.predict(&[0.0; FEATURE_COUNT]), Ok(1));
    }

    #[test]
    fn test_load_shipped_models() {
        let artifacts = ModelArtifacts::load(Path::new("models"), true).expect("shipped models");
        assert_eq!(artifacts.classifier.n_features(), FEATURE_COUNT);
    }

    #[test]
    fn test_missing_classifier_fails() {
        let temp = tempdir().expect("tempdir");
        fs::write(
            temp.path().join(SCALER_FILE),
            serde_json::to_vec(&scaler()).expect("serialize"),
        )
        .expect("write scaler");

        let err = ModelArtifacts::load(temp.path(), false).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Missing(p) if p.ends_with(CLASSIFIER_FILE)));
    }

    #[test]
    fn test_wrong_width_fails() {
        let temp = tempdir().expect("tempdir");
        let mut narrow = classifier(0.0);
        narrow.coefficients.pop();
        write_artifacts(temp.path(), &scaler(), &narrow);

        let err = ModelArtifacts::load(temp.path(), false).expect_err("must fail");
        assert!(matches!(
            err,
            ArtifactError::Shape {
                file: CLASSIFIER_FILE,
                ..
            }
        ));
    }

    #[test]
    fn test_feature_order_mismatch_fails() {
        let temp = tempdir().expect("tempdir");
        let mut swapped = scaler();
        if let Some(names) = swapped.feature_names.as_mut() {
            names.swap(6, 7);
        }
        write_artifacts(temp.path(), &swapped, &classifier(0.0));

        let err = ModelArtifacts::load(temp.path(), false).expect_err("must fail");
        assert!(err.to_string().contains("catalog order"));
    }

    #[test]
    fn test_manifest_hash_mismatch_fails() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), &scaler(), &classifier(0.0));
        write_manifest(temp.path());

        // Tamper after the manifest was written.
        write_artifacts(temp.path(), &scaler(), &classifier(9.0));

        let err = ModelArtifacts::load(temp.path(), false).expect_err("must fail");
        assert!(matches!(err, ArtifactError::HashMismatch(f) if f == SCALER_FILE || f == CLASSIFIER_FILE));
    }

    #[test]
    fn test_required_manifest() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), &scaler(), &classifier(0.0));

        assert!(matches!(
            ModelArtifacts::load(temp.path(), true),
            Err(ArtifactError::Manifest(_))
        ));

        write_manifest(temp.path());
        ModelArtifacts::load(temp.path(), true).expect("manifest verified");
    }

    #[test]
    fn test_scaler_transform() {
        let mut s = scaler();
        s.mean[0] = 50.0;
        s.scale[0] = 10.0;
        s.scale[1] = 0.0;
        s.validate().expect("valid");

        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 70.0;
        row[1] = 4.0;
        let out = s.transform(&row).expect("transform");
        assert!((out[0] - 2.0).abs() < 1e-12);
        // Zero scale passes the centered value through.
        assert!((out[1] - 4.0).abs() < 1e-12);

        assert_eq!(
            s.transform(&row[..3]),
            Err(InferenceError::Dimension {
                expected: FEATURE_COUNT,
                got: 3
            })
        );
    }

    #[test]
    fn test_decision_boundary() {
        let mut c = classifier(-1.0);
        c.coefficients[0] = 1.0;

        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 1.0;
        // z == 0 falls on the negative side.
        assert_eq!(c.predict(&row), Ok(0));
        row[0] = 1.5;
        assert_eq!(c.predict(&row), Ok(1));
    }
}
