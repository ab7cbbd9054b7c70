//! Manifest writer for Heartcheck model artifacts.
//!
//! Hashes `scaler.json` and `logreg_model.json` with SHA-256 and writes
//! `manifest.json` next to them, binding the files the loader will accept.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir>
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use heartcheck::adapters::artifact::{
    sha256_hex, ModelManifest, CLASSIFIER_FILE, MANIFEST_FILE, SCALER_FILE,
};

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn usage() -> String {
    "Usage: write_manifest <model_dir>".to_string()
}

fn parse_args() -> Result<PathBuf, String> {
    let mut model_dir: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage()),
            _ if model_dir.is_none() => model_dir = Some(PathBuf::from(&arg)),
            _ => return Err(usage()),
        }
    }

    model_dir.ok_or_else(usage)
}

fn main() -> Result<(), String> {
    let model_dir = parse_args()?;

    let mut files: BTreeMap<String, String> = BTreeMap::new();
    for rel in [SCALER_FILE, CLASSIFIER_FILE] {
        let path = model_dir.join(rel);
        let bytes = fs::read(&path).map_err(|e| format!("Failed to read {path:?}: {e}"))?;
        files.insert(rel.to_string(), sha256_hex(&bytes));
    }

    let manifest = ModelManifest {
        version: 1,
        created_at: Some(unix_now()),
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    println!("Wrote manifest: {manifest_path:?}");
    for (rel, digest) in &manifest.files {
        println!("  {rel}  sha256={digest}");
    }

    Ok(())
}
