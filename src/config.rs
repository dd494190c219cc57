//! Persisted binding configuration
//!
//! A config file is one JSON object with a single `binds` array:
//!
//! ```json
//! {
//!   "binds": [
//!     { "protocol": "TCP", "port": 8080 }
//!   ]
//! }
//! ```
//!
//! Loading and saving preserve the ordered (protocol, port) sequence.

use crate::binding::Binding;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name used when saving into a directory
pub const DEFAULT_FILE_NAME: &str = "config.json";

/// On-disk shape of a saved binding list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedConfig {
    /// Saved bindings, in registry order
    pub binds: Vec<Binding>,
}

/// Loads bindings from a config file
///
/// # Arguments
/// * `path` - Path to an existing config file
///
/// # Returns
/// The saved bindings in file order. An unreadable file fails with an I/O
/// error; any malformed record (bad protocol token, out-of-range port,
/// missing field) fails the whole load with a parse error.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Binding>> {
    let path = path.as_ref();

    let data = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(format!(
            "Could not get config data from file: {}: {}",
            path.display(),
            e
        ))
    })?;

    let config: PersistedConfig = serde_json::from_str(&data)
        .map_err(|e| Error::Parse(format!("Invalid config data in {}: {}", path.display(), e)))?;

    Ok(config.binds)
}

/// Saves bindings to a config file
///
/// # Arguments
/// * `bindings` - The bindings to persist, in registry order
/// * `path` - An existing directory (saved as `config.json` inside it) or
///   an explicit file path
///
/// # Returns
/// The path the config was written to
pub fn save<P: AsRef<Path>>(bindings: &[Binding], path: P) -> Result<PathBuf> {
    let path = path.as_ref();

    let target = if path.is_dir() {
        path.join(DEFAULT_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    let config = PersistedConfig {
        binds: bindings.to_vec(),
    };

    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| Error::Parse(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(&target, json).map_err(|e| {
        Error::Io(format!(
            "Failed to save config to {}: {}. Did you use single quotes?",
            target.display(),
            e
        ))
    })?;

    Ok(target)
}
