use crate::identity::IdentityError;
use crate::runtime_config::RuntimeConfigError;
use crate::settings::SettingsError;
use crate::sidecar::SidecarError;

/// Failures that abort the bootstrap. Everything recoverable is logged and
/// absorbed inside its stage instead.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    RuntimeConfig(#[from] RuntimeConfigError),
    #[error(transparent)]
    Sidecar(#[from] SidecarError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("failed to create state directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to reset config file {path}: {source}")]
    ConfigReset {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("gateway onboarding failed: {0}")]
    Onboarding(String),
    #[error("failed to link workspace {path}: {source}")]
    WorkspaceLink {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to hand off to gateway `{binary}`: {source}")]
    Handoff {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}
