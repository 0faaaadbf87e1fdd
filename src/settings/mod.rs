pub mod error;
pub mod paths;

pub use error::SettingsError;
pub use paths::{bootstrap_state_dirs, StatePaths, WORKSPACE_LINK_NAME};

use crate::shared::Env;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_ENV_VAR: &str = "CLAWBOOT_SETTINGS";
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/clawboot/settings.yaml";

/// What happens to a config file restored from remote storage before
/// reconciliation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPolicy {
    /// Discard it; environment overlays are the only source of truth.
    #[default]
    ForceFresh,
    /// Keep it as the reconciliation base and skip onboarding.
    KeepRestored,
}

impl ConfigPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForceFresh => "force_fresh",
            Self::KeepRestored => "keep_restored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PortSettings {
    pub gateway: u16,
    pub google_workspace: u16,
    pub notion: u16,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            gateway: 18789,
            google_workspace: 8000,
            notion: 8001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BinarySettings {
    pub gateway: String,
    /// Program plus leading args of the stdio-to-HTTP bridge launcher.
    pub bridge_launcher: Vec<String>,
    /// `pgrep -f` pattern matching bridges left over from a previous run.
    pub bridge_process_pattern: String,
    pub remote_client: String,
}

impl Default for BinarySettings {
    fn default() -> Self {
        Self {
            gateway: "openclaw".to_string(),
            bridge_launcher: vec![
                "npx".to_string(),
                "-y".to_string(),
                "supergateway".to_string(),
            ],
            bridge_process_pattern: "supergateway".to_string(),
            remote_client: "rclone".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadinessSettings {
    pub timeout_ms: u64,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            initial_delay_ms: 250,
            max_delay_ms: 2_000,
            probe_timeout_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BootSettings {
    pub config_dir: PathBuf,
    pub config_file_name: String,
    pub workspace_dir: PathBuf,
    pub skills_dir: PathBuf,
    pub state_dir: PathBuf,
    pub remote_client_config: PathBuf,
    pub ports: PortSettings,
    pub binaries: BinarySettings,
    pub readiness: ReadinessSettings,
    /// Extra lock files removed before handoff, on top of `<config_dir>/gateway.lock`.
    pub stale_lock_files: Vec<PathBuf>,
    pub port_release_pause_ms: u64,
    pub config_policy: ConfigPolicy,
}

impl Default for BootSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/root/.openclaw"),
            config_file_name: "openclaw.json".to_string(),
            workspace_dir: PathBuf::from("/root/clawd"),
            skills_dir: PathBuf::from("/root/clawd/skills"),
            state_dir: PathBuf::from("/root/.clawboot"),
            remote_client_config: PathBuf::from("/root/.config/rclone/rclone.conf"),
            ports: PortSettings::default(),
            binaries: BinarySettings::default(),
            readiness: ReadinessSettings::default(),
            stale_lock_files: vec![PathBuf::from("/tmp/openclaw-gateway.lock")],
            port_release_pause_ms: 1_000,
            config_policy: ConfigPolicy::default(),
        }
    }
}

impl BootSettings {
    /// Resolves settings from `CLAWBOOT_SETTINGS`, then the default settings
    /// path, then built-in defaults.
    pub fn resolve(env: &Env) -> Result<Self, SettingsError> {
        let settings = match env.get(SETTINGS_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(path))?,
            None if Path::new(DEFAULT_SETTINGS_PATH).is_file() => {
                Self::from_path(Path::new(DEFAULT_SETTINGS_PATH))?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, path) in [
            ("config_dir", &self.config_dir),
            ("workspace_dir", &self.workspace_dir),
            ("skills_dir", &self.skills_dir),
            ("state_dir", &self.state_dir),
            ("remote_client_config", &self.remote_client_config),
        ] {
            if !path.is_absolute() {
                return Err(SettingsError::Invalid(format!(
                    "{field} must be an absolute path, got `{}`",
                    path.display()
                )));
            }
        }
        // The link is replaced on every boot; it must not be the workspace itself.
        if self.workspace_dir == self.config_dir.join(WORKSPACE_LINK_NAME) {
            return Err(SettingsError::Invalid(format!(
                "workspace_dir must not be `{}`; that path is the workspace link",
                self.workspace_dir.display()
            )));
        }
        if let Some(lock) = self.stale_lock_files.iter().find(|p| !p.is_absolute()) {
            return Err(SettingsError::Invalid(format!(
                "stale_lock_files entries must be absolute, got `{}`",
                lock.display()
            )));
        }

        let name = self.config_file_name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(SettingsError::Invalid(
                "config_file_name must be a bare, non-empty file name".to_string(),
            ));
        }

        let ports = [
            self.ports.gateway,
            self.ports.google_workspace,
            self.ports.notion,
        ];
        if ports.contains(&0) {
            return Err(SettingsError::Invalid("ports must be non-zero".to_string()));
        }
        if ports.iter().collect::<BTreeSet<_>>().len() != ports.len() {
            return Err(SettingsError::Invalid(format!(
                "ports must be distinct, got gateway={} google_workspace={} notion={}",
                ports[0], ports[1], ports[2]
            )));
        }

        if self.binaries.gateway.trim().is_empty()
            || self.binaries.remote_client.trim().is_empty()
            || self.binaries.bridge_process_pattern.trim().is_empty()
        {
            return Err(SettingsError::Invalid(
                "binary names must be non-empty".to_string(),
            ));
        }
        if self
            .binaries
            .bridge_launcher
            .first()
            .map(|program| program.trim().is_empty())
            .unwrap_or(true)
        {
            return Err(SettingsError::Invalid(
                "bridge_launcher must name a program".to_string(),
            ));
        }

        if self.readiness.initial_delay_ms == 0 {
            return Err(SettingsError::Invalid(
                "readiness.initial_delay_ms must be non-zero".to_string(),
            ));
        }
        if self.readiness.max_delay_ms < self.readiness.initial_delay_ms {
            return Err(SettingsError::Invalid(
                "readiness.max_delay_ms must be >= readiness.initial_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn port_release_pause(&self) -> Duration {
        Duration::from_millis(self.port_release_pause_ms)
    }

    /// `pgrep -f` signature of a running gateway.
    pub fn gateway_signature(&self) -> String {
        format!("{} gateway", self.binaries.gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        BootSettings::default().validate().expect("defaults are valid");
    }

    #[test]
    fn duplicate_ports_are_rejected() {
        let mut settings = BootSettings::default();
        settings.ports.notion = settings.ports.google_workspace;
        let err = settings.validate().expect_err("duplicate ports");
        assert!(err.to_string().contains("ports must be distinct"));
    }

    #[test]
    fn relative_paths_are_rejected() {
        let settings = BootSettings {
            workspace_dir: PathBuf::from("clawd"),
            ..BootSettings::default()
        };
        let err = settings.validate().expect_err("relative path");
        assert!(err.to_string().contains("workspace_dir"));
    }

    #[test]
    fn workspace_inside_link_path_is_rejected() {
        let settings = BootSettings::default();
        let settings = BootSettings {
            workspace_dir: settings.config_dir.join("workspace"),
            ..settings
        };
        let err = settings.validate().expect_err("workspace at link path");
        assert!(err.to_string().contains("workspace link"));
    }

    #[test]
    fn zero_initial_readiness_delay_is_rejected() {
        let mut settings = BootSettings::default();
        settings.readiness.initial_delay_ms = 0;
        let err = settings.validate().expect_err("zero delay");
        assert!(err.to_string().contains("initial_delay_ms"));
    }

    #[test]
    fn gateway_signature_uses_configured_binary() {
        let mut settings = BootSettings::default();
        assert_eq!(settings.gateway_signature(), "openclaw gateway");
        settings.binaries.gateway = "/opt/bin/openclaw".to_string();
        assert_eq!(settings.gateway_signature(), "/opt/bin/openclaw gateway");
    }
}
