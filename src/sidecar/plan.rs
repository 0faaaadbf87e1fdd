use super::SidecarError;
use crate::process::LaunchCommand;
use crate::settings::{BootSettings, PortSettings, StatePaths};
use crate::shared::Env;
use serde::Serialize;
use std::path::PathBuf;

pub const GOOGLE_CLIENT_ID_ENV: &str = "GOOGLE_OAUTH_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET_ENV: &str = "GOOGLE_OAUTH_CLIENT_SECRET";
pub const NOTION_API_KEY_ENV: &str = "NOTION_API_KEY";

/// Named Google account slots and the env var carrying each refresh token.
pub const GOOGLE_ACCOUNT_SLOTS: [(&str, &str); 3] = [
    ("personal", "GOOGLE_REFRESH_TOKEN_PERSONAL"),
    ("work", "GOOGLE_REFRESH_TOKEN_WORK"),
    ("shared", "GOOGLE_REFRESH_TOKEN_SHARED"),
];

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/spreadsheets",
];
const GOOGLE_STDIO_SERVER: &str = "uvx workspace-mcp --tool-tier core";
const NOTION_STDIO_SERVER: &str = "npx -y @notionhq/notion-mcp-server";
const NOTION_API_VERSION: &str = "2022-06-28";
const BRIDGE_HTTP_PATH: &str = "/mcp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BridgeKind {
    GoogleWorkspace,
    Notion,
}

impl BridgeKind {
    pub const ALL: [BridgeKind; 2] = [Self::GoogleWorkspace, Self::Notion];

    /// Key in the gateway's MCP server map; also names the bridge's state dir.
    pub fn server_name(self) -> &'static str {
        match self {
            Self::GoogleWorkspace => "google-workspace",
            Self::Notion => "notion",
        }
    }

    pub fn required_env(self) -> &'static [&'static str] {
        match self {
            Self::GoogleWorkspace => &[GOOGLE_CLIENT_ID_ENV, GOOGLE_CLIENT_SECRET_ENV],
            Self::Notion => &[NOTION_API_KEY_ENV],
        }
    }

    pub fn port(self, ports: &PortSettings) -> u16 {
        match self {
            Self::GoogleWorkspace => ports.google_workspace,
            Self::Notion => ports.notion,
        }
    }

    pub fn is_enabled(self, env: &Env) -> bool {
        env.has_all(self.required_env())
    }
}

/// Bridges whose prerequisites are all present, in a fixed order.
pub fn required_bridges(env: &Env) -> Vec<BridgeKind> {
    BridgeKind::ALL
        .into_iter()
        .filter(|kind| kind.is_enabled(env))
        .collect()
}

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl std::fmt::Debug for CredentialFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialFile")
            .field("path", &self.path)
            .field("bytes", &self.contents.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarSpec {
    pub kind: BridgeKind,
    pub name: &'static str,
    pub listen_port: u16,
    pub launch: LaunchCommand,
    pub credential_files: Vec<CredentialFile>,
    /// Credentials left by an earlier run that this plan no longer owns.
    pub stale_files: Vec<PathBuf>,
    pub required_env: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct GoogleCredential<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    account: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    token_uri: &'static str,
    scopes: &'static [&'static str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountIndex {
    accounts: Vec<AccountIndexEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountIndexEntry {
    name: String,
    credentials_file: PathBuf,
}

/// Builds a spec for every bridge whose prerequisites are present.
pub fn plan_sidecars(
    env: &Env,
    settings: &BootSettings,
    paths: &StatePaths,
) -> Result<Vec<SidecarSpec>, SidecarError> {
    required_bridges(env)
        .into_iter()
        .map(|kind| match kind {
            BridgeKind::GoogleWorkspace => plan_google_workspace(env, settings, paths),
            BridgeKind::Notion => plan_notion(env, settings, paths),
        })
        .collect()
}

fn plan_google_workspace(
    env: &Env,
    settings: &BootSettings,
    paths: &StatePaths,
) -> Result<SidecarSpec, SidecarError> {
    let kind = BridgeKind::GoogleWorkspace;
    let client_id = env.get(GOOGLE_CLIENT_ID_ENV).unwrap_or_default();
    let client_secret = env.get(GOOGLE_CLIENT_SECRET_ENV).unwrap_or_default();
    let root = paths.sidecar_dir(kind.server_name());
    let credentials_dir = root.join("credentials");
    let index_path = root.join("accounts.json");

    let mut files = Vec::new();
    let mut stale_files = Vec::new();
    let mut index = AccountIndex {
        accounts: Vec::new(),
        default: None,
    };
    for (slot, token_env) in GOOGLE_ACCOUNT_SLOTS {
        let path = credentials_dir.join(format!("{slot}.json"));
        let Some(refresh_token) = env.get(token_env) else {
            stale_files.push(path);
            continue;
        };
        let credential = GoogleCredential {
            kind: "authorized_user",
            account: slot,
            client_id,
            client_secret,
            refresh_token,
            token_uri: GOOGLE_TOKEN_URI,
            scopes: &GOOGLE_SCOPES,
        };
        files.push(CredentialFile {
            path: path.clone(),
            contents: to_pretty_bytes("google credential", &credential)?,
        });
        index.default.get_or_insert_with(|| slot.to_string());
        index.accounts.push(AccountIndexEntry {
            name: slot.to_string(),
            credentials_file: path,
        });
    }
    files.push(CredentialFile {
        path: index_path.clone(),
        contents: to_pretty_bytes("google account index", &index)?,
    });

    let port = kind.port(&settings.ports);
    let launch = bridge_command(settings, GOOGLE_STDIO_SERVER, port)
        .env(GOOGLE_CLIENT_ID_ENV, client_id)
        .env(GOOGLE_CLIENT_SECRET_ENV, client_secret)
        .env(
            "GOOGLE_MCP_CREDENTIALS_DIR",
            credentials_dir.display().to_string(),
        )
        .env("GOOGLE_MCP_ACCOUNTS_FILE", index_path.display().to_string())
        .log_file(paths.sidecar_log_file(kind.server_name()));

    Ok(SidecarSpec {
        kind,
        name: kind.server_name(),
        listen_port: port,
        launch,
        credential_files: files,
        stale_files,
        required_env: kind.required_env(),
    })
}

fn plan_notion(
    env: &Env,
    settings: &BootSettings,
    paths: &StatePaths,
) -> Result<SidecarSpec, SidecarError> {
    let kind = BridgeKind::Notion;
    let api_key = env.get(NOTION_API_KEY_ENV).unwrap_or_default();
    let headers = serde_json::json!({
        "Authorization": format!("Bearer {api_key}"),
        "Notion-Version": NOTION_API_VERSION,
    });
    let compact = serde_json::to_string(&headers).map_err(|source| SidecarError::Encode {
        what: "notion headers".to_string(),
        source,
    })?;

    let port = kind.port(&settings.ports);
    let launch = bridge_command(settings, NOTION_STDIO_SERVER, port)
        .env("OPENAPI_MCP_HEADERS", compact)
        .log_file(paths.sidecar_log_file(kind.server_name()));

    Ok(SidecarSpec {
        kind,
        name: kind.server_name(),
        listen_port: port,
        launch,
        credential_files: vec![CredentialFile {
            path: paths.sidecar_dir(kind.server_name()).join("headers.json"),
            contents: to_pretty_bytes("notion headers", &headers)?,
        }],
        stale_files: Vec::new(),
        required_env: kind.required_env(),
    })
}

/// Wraps a stdio MCP server in the HTTP bridge launcher.
fn bridge_command(settings: &BootSettings, stdio_server: &str, port: u16) -> LaunchCommand {
    let mut launcher = settings.binaries.bridge_launcher.iter();
    let program = launcher.next().cloned().unwrap_or_default();
    LaunchCommand::new(program)
        .args(launcher.cloned())
        .args([
            "--stdio",
            stdio_server,
            "--outputTransport",
            "streamableHttp",
            "--streamableHttpPath",
            BRIDGE_HTTP_PATH,
        ])
        .arg("--port")
        .arg(port.to_string())
}

fn to_pretty_bytes<T: Serialize>(what: &str, value: &T) -> Result<Vec<u8>, SidecarError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| SidecarError::Encode {
        what: what.to_string(),
        source,
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}
