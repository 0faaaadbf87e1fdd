use super::{RemoteCredentials, RemoteError, RemoteStore};
use crate::shared::fs_atomic::{atomic_write_with_mode, FileMode};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const REMOTE_NAME: &str = "r2";
const TRANSFER_FLAGS: [&str; 3] = ["--transfers=16", "--fast-list", "--s3-no-check-bucket"];
// rclone exit codes for "directory not found" and "file not found".
const NOT_FOUND_EXIT_CODES: [i32; 2] = [3, 4];

/// `RemoteStore` that shells out to `rclone` against an S3-compatible remote.
///
/// Credentials live in the rclone config file (mode 0600) so they never
/// appear on a command line.
#[derive(Debug, Clone)]
pub struct RcloneStore {
    binary: String,
    config_path: PathBuf,
    bucket: String,
}

impl RcloneStore {
    pub fn configure(
        binary: &str,
        config_path: &Path,
        credentials: &RemoteCredentials,
    ) -> Result<Self, RemoteError> {
        atomic_write_with_mode(
            config_path,
            render_client_config(credentials).as_bytes(),
            FileMode::OwnerOnly,
        )
        .map_err(|source| RemoteError::WriteConfig {
            path: config_path.display().to_string(),
            source,
        })?;
        Ok(Self {
            binary: binary.to_string(),
            config_path: config_path.to_path_buf(),
            bucket: credentials.bucket.clone(),
        })
    }

    fn remote_path(&self, key: &str) -> String {
        format!(
            "{REMOTE_NAME}:{}/{}",
            self.bucket,
            key.trim_start_matches('/')
        )
    }

    fn remote_dir(&self, prefix: &str) -> String {
        format!("{}/", self.remote_path(prefix).trim_end_matches('/'))
    }

    fn run(&self, operation: &str, args: &[String]) -> Result<Output, RemoteError> {
        Command::new(&self.binary)
            .args(args)
            .arg("--config")
            .arg(&self.config_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    RemoteError::MissingBinary {
                        binary: self.binary.clone(),
                    }
                } else {
                    RemoteError::Spawn {
                        binary: self.binary.clone(),
                        source,
                    }
                }
            })
            .and_then(|output| {
                let code = output.status.code().unwrap_or(-1);
                if output.status.success() || NOT_FOUND_EXIT_CODES.contains(&code) {
                    Ok(output)
                } else {
                    Err(RemoteError::Failed {
                        operation: operation.to_string(),
                        code,
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    })
                }
            })
    }

    fn listed_files(&self, operation: &str, args: Vec<String>) -> Result<usize, RemoteError> {
        let output = self.run(operation, &args)?;
        if !output.status.success() {
            return Ok(0);
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count())
    }
}

impl RemoteStore for RcloneStore {
    fn object_exists(&self, key: &str) -> Result<bool, RemoteError> {
        let args = vec![
            "lsf".to_string(),
            "--files-only".to_string(),
            self.remote_path(key),
        ];
        Ok(self.listed_files("probe", args)? > 0)
    }

    fn count_objects(&self, prefix: &str) -> Result<usize, RemoteError> {
        let args = vec![
            "lsf".to_string(),
            "-R".to_string(),
            "--files-only".to_string(),
            "--fast-list".to_string(),
            self.remote_dir(prefix),
        ];
        self.listed_files("listing", args)
    }

    fn copy_to_local(&self, prefix: &str, dest: &Path) -> Result<(), RemoteError> {
        let mut args = vec![
            "copy".to_string(),
            self.remote_dir(prefix),
            dest.display().to_string(),
        ];
        args.extend(TRANSFER_FLAGS.iter().map(|flag| flag.to_string()));
        self.run("copy", &args).map(|_| ())
    }

    fn copy_from_local(
        &self,
        src: &Path,
        prefix: &str,
        excludes: &[String],
    ) -> Result<(), RemoteError> {
        let mut args = vec![
            "copy".to_string(),
            src.display().to_string(),
            self.remote_dir(prefix),
        ];
        args.extend(TRANSFER_FLAGS.iter().map(|flag| flag.to_string()));
        for pattern in excludes {
            args.push("--exclude".to_string());
            args.push(pattern.clone());
        }
        self.run("upload", &args).map(|_| ())
    }
}

pub fn render_client_config(credentials: &RemoteCredentials) -> String {
    format!(
        "[{REMOTE_NAME}]\n\
         type = s3\n\
         provider = Cloudflare\n\
         access_key_id = {}\n\
         secret_access_key = {}\n\
         endpoint = {}\n\
         acl = private\n\
         no_check_bucket = true\n",
        credentials.access_key_id,
        credentials.secret_access_key,
        credentials.endpoint()
    )
}
