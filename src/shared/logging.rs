use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// JSON-lines bootstrap log, mirrored to stderr for container log collectors.
///
/// Appending never fails the caller: an unwritable log is dropped silently.
#[derive(Debug, Clone)]
pub struct BootLog {
    path: Option<PathBuf>,
    echo_stderr: bool,
}

impl BootLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            echo_stderr: true,
        }
    }

    pub fn file_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            echo_stderr: false,
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            echo_stderr: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append("warn", event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append("error", event, message);
    }

    pub fn append(&self, level: &str, event: &str, message: &str) {
        if self.echo_stderr {
            eprintln!("[{level}] {event}: {message}");
        }

        let Some(path) = self.path.as_ref() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "level": level,
            "event": event,
            "message": message,
        });
        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}
