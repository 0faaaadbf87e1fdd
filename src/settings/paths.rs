use super::BootSettings;
use crate::shared::BootError;
use std::fs;
use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "bootstrap.log";
pub const GATEWAY_LOCK_FILE_NAME: &str = "gateway.lock";
pub const WORKSPACE_LINK_NAME: &str = "workspace";

/// Every local path the bootstrap touches, derived once from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub workspace_dir: PathBuf,
    pub skills_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl StatePaths {
    pub fn from_settings(settings: &BootSettings) -> Self {
        Self {
            config_dir: settings.config_dir.clone(),
            config_file: settings.config_dir.join(&settings.config_file_name),
            workspace_dir: settings.workspace_dir.clone(),
            skills_dir: settings.skills_dir.clone(),
            state_dir: settings.state_dir.clone(),
        }
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.config_dir.clone(),
            self.workspace_dir.clone(),
            self.skills_dir.clone(),
            self.logs_dir(),
        ]
    }

    pub fn config_file_name(&self) -> &str {
        self.config_file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn workspace_link(&self) -> PathBuf {
        self.config_dir.join(WORKSPACE_LINK_NAME)
    }

    pub fn gateway_lock_file(&self) -> PathBuf {
        self.config_dir.join(GATEWAY_LOCK_FILE_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    pub fn sidecar_dir(&self, name: &str) -> PathBuf {
        self.state_dir.join("sidecars").join(name)
    }

    pub fn sidecar_log_file(&self, name: &str) -> PathBuf {
        self.logs_dir().join(format!("{name}.log"))
    }

    pub fn last_sync_marker(&self) -> PathBuf {
        self.config_dir.join(".last-sync")
    }
}

pub fn bootstrap_state_dirs(paths: &StatePaths) -> Result<(), BootError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| BootError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

pub(crate) fn is_within(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}
