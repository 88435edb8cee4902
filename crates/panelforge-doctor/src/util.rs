#![forbid(unsafe_code)]

use std::path::Path;

use panelforge_runtime::EditorConfig;
use serde::de::DeserializeOwned;

use crate::error::{DoctorError, Result};

pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DoctorError::MissingPath {
            path: path.to_path_buf(),
        })
    }
}

/// Read and parse a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    ensure_exists(path)?;
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load `--config` if given, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => {
            ensure_exists(path)?;
            Ok(EditorConfig::from_path(path)?)
        }
        None => Ok(EditorConfig::default()),
    }
}
