use super::{SidecarError, SidecarSpec};
use crate::shared::fs_atomic::{atomic_write_with_mode, remove_file_if_exists, FileMode};

/// Writes every credential file of `spec`, overwriting previous copies, and
/// removes credentials of account slots that are no longer configured.
pub fn write_credential_files(spec: &SidecarSpec) -> Result<usize, SidecarError> {
    for path in &spec.stale_files {
        remove_file_if_exists(path).map_err(|source| SidecarError::RemoveCredential {
            path: path.display().to_string(),
            source,
        })?;
    }
    for file in &spec.credential_files {
        atomic_write_with_mode(&file.path, &file.contents, FileMode::OwnerOnly).map_err(
            |source| SidecarError::WriteCredential {
                path: file.path.display().to_string(),
                source,
            },
        )?;
    }
    Ok(spec.credential_files.len())
}
