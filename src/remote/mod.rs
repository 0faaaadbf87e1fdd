pub mod rclone;

pub use rclone::RcloneStore;

use crate::settings::StatePaths;
use crate::shared::Env;
use std::path::Path;

pub const ACCESS_KEY_ID_ENV: &str = "R2_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_ENV: &str = "R2_SECRET_ACCESS_KEY";
pub const ACCOUNT_ID_ENV: &str = "CF_ACCOUNT_ID";
pub const BUCKET_NAME_ENV: &str = "R2_BUCKET_NAME";
pub const DEFAULT_BUCKET: &str = "moltbot-data";

pub const CONFIG_PREFIX: &str = "openclaw";
pub const LEGACY_CONFIG_PREFIX: &str = "clawdbot";
pub const LEGACY_CONFIG_FILE_NAME: &str = "clawdbot.json";
pub const WORKSPACE_PREFIX: &str = "workspace";
pub const SKILLS_PREFIX: &str = "skills";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("failed to write remote client config {path}: {source}")]
    WriteConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("remote client `{binary}` is not available in PATH")]
    MissingBinary { binary: String },
    #[error("failed to run remote client `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("remote {operation} failed with exit code {code}: {stderr}")]
    Failed {
        operation: String,
        code: i32,
        stderr: String,
    },
}

/// Credentials for the remote object store. All three keys must be present.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub account_id: String,
    pub bucket: String,
}

impl RemoteCredentials {
    pub fn from_env(env: &Env) -> Option<Self> {
        Some(Self {
            access_key_id: env.get(ACCESS_KEY_ID_ENV)?.to_string(),
            secret_access_key: env.get(SECRET_ACCESS_KEY_ENV)?.to_string(),
            account_id: env.get(ACCOUNT_ID_ENV)?.to_string(),
            bucket: env.get_or(BUCKET_NAME_ENV, DEFAULT_BUCKET).to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// One of the independently persisted local trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTree {
    Config,
    Workspace,
    Skills,
}

impl StateTree {
    pub const ALL: [StateTree; 3] = [Self::Config, Self::Workspace, Self::Skills];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Workspace => "workspace",
            Self::Skills => "skills",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Config => CONFIG_PREFIX,
            Self::Workspace => WORKSPACE_PREFIX,
            Self::Skills => SKILLS_PREFIX,
        }
    }

    pub fn local_dir(self, paths: &StatePaths) -> &Path {
        match self {
            Self::Config => &paths.config_dir,
            Self::Workspace => &paths.workspace_dir,
            Self::Skills => &paths.skills_dir,
        }
    }
}

/// Hierarchical key space in remote object storage. Keys and prefixes are
/// relative to the bucket root and use `/` separators.
pub trait RemoteStore {
    fn object_exists(&self, key: &str) -> Result<bool, RemoteError>;
    fn count_objects(&self, prefix: &str) -> Result<usize, RemoteError>;
    /// Copies every object under `prefix` into `dest`, keeping relative paths.
    fn copy_to_local(&self, prefix: &str, dest: &Path) -> Result<(), RemoteError>;
    /// Copies a local file or directory tree to `prefix`, skipping paths that
    /// match any of the glob `excludes`.
    fn copy_from_local(&self, src: &Path, prefix: &str, excludes: &[String])
        -> Result<(), RemoteError>;
}

pub fn remote_config_key(paths: &StatePaths) -> String {
    format!("{CONFIG_PREFIX}/{}", paths.config_file_name())
}

pub fn legacy_config_key() -> String {
    format!("{LEGACY_CONFIG_PREFIX}/{LEGACY_CONFIG_FILE_NAME}")
}
