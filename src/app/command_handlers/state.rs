use crate::app::command_support::{ensure_state_dirs, load_context, remote_store};
use crate::remote::RemoteStore;
use crate::restore::{restore_state, sync_state};

pub fn cmd_restore() -> Result<String, String> {
    let ctx = load_context()?;
    ensure_state_dirs(&ctx)?;
    let store = remote_store(&ctx)?;
    let result = restore_state(
        store.as_ref().map(|store| store as &dyn RemoteStore),
        &ctx.paths,
        &ctx.log,
    );
    Ok(format!(
        "remote_configured={}\nconfig_restored={}\nlegacy_migrated={}\nworkspace_files={}\nskills_files={}",
        store.is_some(),
        result.config_restored,
        result.legacy_migrated,
        result.workspace_file_count,
        result.skills_file_count
    ))
}

pub fn cmd_sync() -> Result<String, String> {
    let ctx = load_context()?;
    let Some(store) = remote_store(&ctx)? else {
        return Err("remote storage credentials are not configured".to_string());
    };
    let result = sync_state(Some(&store as &dyn RemoteStore), &ctx.paths, &ctx.log);
    let summary = format!(
        "config_synced={}\nworkspace_synced={}\nskills_synced={}\nmarker={}",
        result.config_synced,
        result.workspace_synced,
        result.skills_synced,
        result.marker.as_deref().unwrap_or("none")
    );
    if result.all_synced() {
        Ok(summary)
    } else {
        Err(format!("sync incomplete\n{summary}"))
    }
}
