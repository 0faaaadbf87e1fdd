use crate::settings::StatePaths;
use crate::shared::BootError;
use std::fs;
use std::path::Path;

/// Replaces whatever sits at the workspace link path with a fresh symlink to
/// the workspace root.
pub fn relink_workspace(paths: &StatePaths) -> Result<(), BootError> {
    let link = paths.workspace_link();
    let io_error = |source| BootError::WorkspaceLink {
        path: link.display().to_string(),
        source,
    };
    remove_existing(&link).map_err(io_error)?;
    create_symlink(&paths.workspace_dir, &link).map_err(io_error)
}

fn remove_existing(path: &Path) -> std::io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if metadata.file_type().is_symlink() {
        remove_symlink(path)
    } else if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

fn remove_symlink(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::IsADirectory => fs::remove_dir(path),
        Err(err) => Err(err),
    }
}
