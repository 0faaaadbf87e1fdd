use super::{RuntimeConfig, RuntimeConfigError};
use crate::shared::fs_atomic::{atomic_write_file, sha256_hex};
use std::fs;
use std::path::Path;

/// Loads the config document; `Ok(None)` when the file does not exist.
pub fn load_runtime_config(path: &Path) -> Result<Option<RuntimeConfig>, RuntimeConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(RuntimeConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    RuntimeConfig::from_json_str(&raw)
        .map(Some)
        .map_err(|source| RuntimeConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
}

/// Overwrites the whole document atomically and returns the SHA-256 of the
/// bytes written.
pub fn save_runtime_config(path: &Path, config: &RuntimeConfig) -> Result<String, RuntimeConfigError> {
    let body = config
        .to_pretty_json()
        .map_err(|source| RuntimeConfigError::Encode {
            what: "runtime config".to_string(),
            source,
        })?;
    atomic_write_file(path, body.as_bytes()).map_err(|source| RuntimeConfigError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(sha256_hex(body.as_bytes()))
}
