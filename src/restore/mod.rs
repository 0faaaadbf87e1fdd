pub mod sync;

pub use sync::{sync_state, SyncResult};

use crate::remote::{
    legacy_config_key, remote_config_key, RemoteStore, StateTree, LEGACY_CONFIG_FILE_NAME,
    LEGACY_CONFIG_PREFIX,
};
use crate::settings::StatePaths;
use crate::shared::BootLog;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreResult {
    pub config_restored: bool,
    pub legacy_migrated: bool,
    pub workspace_file_count: usize,
    pub skills_file_count: usize,
}

/// Pulls the config, workspace and skills trees from remote storage.
///
/// `store` is `None` when remote credentials are missing; the bootstrap then
/// continues from fresh local state. Every copy is independent and a failed
/// one is logged, never propagated.
pub fn restore_state(
    store: Option<&dyn RemoteStore>,
    paths: &StatePaths,
    log: &BootLog,
) -> RestoreResult {
    let Some(store) = store else {
        log.info(
            "restore.skipped",
            "remote storage credentials not configured; starting fresh",
        );
        return RestoreResult::default();
    };

    let mut result = RestoreResult::default();
    restore_config(store, paths, log, &mut result);
    result.workspace_file_count = restore_tree(store, StateTree::Workspace, paths, log);
    result.skills_file_count = restore_tree(store, StateTree::Skills, paths, log);

    log.info(
        "restore.completed",
        &format!(
            "config_restored={} legacy_migrated={} workspace_files={} skills_files={}",
            result.config_restored,
            result.legacy_migrated,
            result.workspace_file_count,
            result.skills_file_count
        ),
    );
    result
}

fn restore_config(
    store: &dyn RemoteStore,
    paths: &StatePaths,
    log: &BootLog,
    result: &mut RestoreResult,
) {
    let current_key = remote_config_key(paths);
    match store.object_exists(&current_key) {
        Ok(true) => {
            match store.copy_to_local(StateTree::Config.prefix(), &paths.config_dir) {
                Ok(()) => {
                    result.config_restored = paths.config_file.is_file();
                    log.info("restore.config.current", &format!("restored {current_key}"));
                }
                Err(err) => log.warn("restore.config.copy_failed", &err.to_string()),
            }
            return;
        }
        Ok(false) => {}
        Err(err) => {
            log.warn("restore.config.probe_failed", &err.to_string());
            return;
        }
    }

    let legacy_key = legacy_config_key();
    match store.object_exists(&legacy_key) {
        Ok(true) => {}
        Ok(false) => {
            log.info("restore.config.absent", "no remote config found");
            return;
        }
        Err(err) => {
            log.warn("restore.config.legacy_probe_failed", &err.to_string());
            return;
        }
    }

    if paths.config_file.is_file() {
        log.info(
            "restore.config.legacy_ignored",
            &format!(
                "{} already exists; not migrating {legacy_key}",
                paths.config_file.display()
            ),
        );
        return;
    }

    if let Err(err) = store.copy_to_local(LEGACY_CONFIG_PREFIX, &paths.config_dir) {
        log.warn("restore.config.legacy_copy_failed", &err.to_string());
        return;
    }
    match migrate_legacy_config(&paths.config_dir, &paths.config_file) {
        Ok(migrated) => {
            result.legacy_migrated = migrated;
            result.config_restored = paths.config_file.is_file();
            log.info(
                "restore.config.legacy",
                &format!("migrated={migrated} from {legacy_key}"),
            );
        }
        Err(err) => log.warn("restore.config.legacy_migrate_failed", &err.to_string()),
    }
}

/// Renames a restored legacy config file into the current file name. Never
/// overwrites an existing current-format file.
pub fn migrate_legacy_config(config_dir: &Path, config_file: &Path) -> std::io::Result<bool> {
    let legacy = config_dir.join(LEGACY_CONFIG_FILE_NAME);
    if config_file.exists() || !legacy.is_file() {
        return Ok(false);
    }
    fs::rename(&legacy, config_file)?;
    Ok(true)
}

fn restore_tree(
    store: &dyn RemoteStore,
    tree: StateTree,
    paths: &StatePaths,
    log: &BootLog,
) -> usize {
    let event = |suffix: &str| format!("restore.{}.{suffix}", tree.as_str());
    let count = match store.count_objects(tree.prefix()) {
        Ok(count) => count,
        Err(err) => {
            log.warn(&event("list_failed"), &err.to_string());
            return 0;
        }
    };
    if count == 0 {
        log.info(&event("skipped"), "remote prefix is empty");
        return 0;
    }

    let dest = tree.local_dir(paths);
    if let Err(err) = fs::create_dir_all(dest) {
        log.warn(
            &event("copy_failed"),
            &format!("failed to create {}: {err}", dest.display()),
        );
        return 0;
    }
    match store.copy_to_local(tree.prefix(), dest) {
        Ok(()) => {
            log.info(&event("restored"), &format!("files={count}"));
            count
        }
        Err(err) => {
            log.warn(&event("copy_failed"), &err.to_string());
            0
        }
    }
}
