use crate::remote::{RcloneStore, RemoteCredentials};
use crate::settings::{bootstrap_state_dirs, BootSettings, StatePaths};
use crate::shared::{BootLog, Env};

/// Resolved inputs shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub env: Env,
    pub settings: BootSettings,
    pub paths: StatePaths,
    pub log: BootLog,
}

pub fn load_context() -> Result<CommandContext, String> {
    context_from_env(Env::from_process())
}

pub fn context_from_env(env: Env) -> Result<CommandContext, String> {
    let settings = BootSettings::resolve(&env).map_err(|e| e.to_string())?;
    let paths = StatePaths::from_settings(&settings);
    let log = BootLog::new(paths.log_file());
    Ok(CommandContext {
        env,
        settings,
        paths,
        log,
    })
}

pub fn ensure_state_dirs(ctx: &CommandContext) -> Result<(), String> {
    bootstrap_state_dirs(&ctx.paths).map_err(|e| e.to_string())
}

/// `None` when remote storage credentials are not configured.
pub fn remote_store(ctx: &CommandContext) -> Result<Option<RcloneStore>, String> {
    let Some(credentials) = RemoteCredentials::from_env(&ctx.env) else {
        return Ok(None);
    };
    RcloneStore::configure(
        &ctx.settings.binaries.remote_client,
        &ctx.settings.remote_client_config,
        &credentials,
    )
    .map(Some)
    .map_err(|e| e.to_string())
}
