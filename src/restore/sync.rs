use crate::remote::{RemoteStore, StateTree};
use crate::settings::paths::{is_within, GATEWAY_LOCK_FILE_NAME, WORKSPACE_LINK_NAME};
use crate::settings::StatePaths;
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::BootLog;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub config_synced: bool,
    pub workspace_synced: bool,
    pub skills_synced: bool,
    pub marker: Option<String>,
}

impl SyncResult {
    pub fn all_synced(&self) -> bool {
        self.config_synced && self.workspace_synced && self.skills_synced
    }
}

/// Pushes the local state trees back to remote storage, the reverse of
/// restore. The `.last-sync` marker is only written after every tree landed.
pub fn sync_state(
    store: Option<&dyn RemoteStore>,
    paths: &StatePaths,
    log: &BootLog,
) -> SyncResult {
    let Some(store) = store else {
        log.info("sync.skipped", "remote storage credentials not configured");
        return SyncResult::default();
    };

    let mut result = SyncResult {
        config_synced: push_tree(store, StateTree::Config, paths, log),
        workspace_synced: push_tree(store, StateTree::Workspace, paths, log),
        skills_synced: push_tree(store, StateTree::Skills, paths, log),
        marker: None,
    };
    if !result.all_synced() {
        log.warn("sync.incomplete", "one or more trees failed; marker not updated");
        return result;
    }

    let stamp = chrono::Utc::now().to_rfc3339();
    let marker = paths.last_sync_marker();
    if let Err(err) = atomic_write_file(&marker, format!("{stamp}\n").as_bytes()) {
        log.warn("sync.marker_failed", &err.to_string());
        return result;
    }
    match store.copy_from_local(&marker, StateTree::Config.prefix(), &[]) {
        Ok(()) => {
            log.info("sync.completed", &format!("marker={stamp}"));
            result.marker = Some(stamp);
        }
        Err(err) => log.warn("sync.marker_failed", &err.to_string()),
    }
    result
}

fn push_tree(store: &dyn RemoteStore, tree: StateTree, paths: &StatePaths, log: &BootLog) -> bool {
    let src = tree.local_dir(paths);
    if !src.is_dir() {
        log.info(
            &format!("sync.{}.skipped", tree.as_str()),
            &format!("{} does not exist", src.display()),
        );
        return true;
    }
    match store.copy_from_local(src, tree.prefix(), &sync_excludes(tree, paths)) {
        Ok(()) => true,
        Err(err) => {
            log.warn(&format!("sync.{}.failed", tree.as_str()), &err.to_string());
            false
        }
    }
}

pub fn sync_excludes(tree: StateTree, paths: &StatePaths) -> Vec<String> {
    match tree {
        StateTree::Config => vec![
            "*.lock".to_string(),
            "*.log".to_string(),
            GATEWAY_LOCK_FILE_NAME.to_string(),
            format!("{WORKSPACE_LINK_NAME}/**"),
            ".last-sync".to_string(),
        ],
        StateTree::Workspace => nested_exclude(&paths.workspace_dir, &paths.skills_dir)
            .into_iter()
            .collect(),
        StateTree::Skills => Vec::new(),
    }
}

fn nested_exclude(root: &Path, nested: &Path) -> Option<String> {
    if !is_within(nested, root) {
        return None;
    }
    let relative = nested.strip_prefix(root).ok()?;
    Some(format!("{}/**", relative.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BootSettings;

    #[test]
    fn workspace_sync_excludes_nested_skills_tree() {
        let paths = StatePaths::from_settings(&BootSettings::default());
        assert_eq!(
            sync_excludes(StateTree::Workspace, &paths),
            vec!["skills/**".to_string()]
        );
    }

    #[test]
    fn workspace_sync_has_no_excludes_for_separate_skills_dir() {
        let settings = BootSettings {
            skills_dir: "/srv/skills".into(),
            ..BootSettings::default()
        };
        let paths = StatePaths::from_settings(&settings);
        assert!(sync_excludes(StateTree::Workspace, &paths).is_empty());
    }
}
