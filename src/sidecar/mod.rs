pub mod credentials;
pub mod manager;
pub mod plan;
pub mod readiness;

pub use manager::{ensure_sidecars, LaunchedSidecar, SidecarStartup};
pub use plan::{plan_sidecars, required_bridges, BridgeKind, CredentialFile, SidecarSpec};
pub use readiness::{
    wait_for_ready, BackoffPolicy, HttpProbe, PendingBridge, ProbeStatus, ReadinessProbe,
    ReadinessReport, ReadinessState,
};

#[derive(Debug, thiserror::Error)]
pub enum SidecarError {
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write sidecar credential {path}: {source}")]
    WriteCredential {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove stale sidecar credential {path}: {source}")]
    RemoveCredential {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
