use crate::process::LaunchCommand;
use crate::settings::{BootSettings, StatePaths};
use crate::shared::fs_atomic::remove_file_if_exists;
use crate::shared::BootLog;
use std::path::PathBuf;

/// Removes lock files a crashed gateway may have left behind. Returns the
/// paths that were actually removed.
pub fn clear_stale_locks(paths: &StatePaths, settings: &BootSettings, log: &BootLog) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    let candidates = std::iter::once(paths.gateway_lock_file()).chain(settings.stale_lock_files.iter().cloned());
    for lock in candidates {
        match remove_file_if_exists(&lock) {
            Ok(true) => {
                log.info("handoff.lock_removed", &lock.display().to_string());
                removed.push(lock);
            }
            Ok(false) => {}
            Err(err) => log.warn(
                "handoff.lock_remove_failed",
                &format!("{}: {err}", lock.display()),
            ),
        }
    }
    removed
}

/// Foreground gateway invocation. Auth comes from the reconciled config, so
/// no token is passed on the command line.
pub fn gateway_command(settings: &BootSettings) -> LaunchCommand {
    LaunchCommand::new(settings.binaries.gateway.clone())
        .arg("gateway")
        .arg("--port")
        .arg(settings.ports.gateway.to_string())
        .args(["--verbose", "--allow-unconfigured", "--bind", "lan"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_command_starts_with_signature() {
        let settings = BootSettings::default();
        let command = gateway_command(&settings);
        assert!(command
            .display_form()
            .starts_with(&settings.gateway_signature()));
        assert_eq!(
            command.display_form(),
            "openclaw gateway --port 18789 --verbose --allow-unconfigured --bind lan"
        );
    }
}
