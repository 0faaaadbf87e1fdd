#![allow(dead_code)]

use clawboot::process::{LaunchCommand, ProcessControl};
use clawboot::remote::{RemoteError, RemoteStore};
use clawboot::settings::{BootSettings, StatePaths};
use clawboot::sidecar::{ProbeStatus, ReadinessProbe};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings rooted under a temp dir, with no pauses or long readiness waits.
pub fn temp_settings(root: &Path) -> BootSettings {
    let mut settings = BootSettings {
        config_dir: root.join("home/.openclaw"),
        workspace_dir: root.join("clawd"),
        skills_dir: root.join("clawd/skills"),
        state_dir: root.join("state"),
        remote_client_config: root.join("rclone.conf"),
        stale_lock_files: vec![root.join("tmp/openclaw-gateway.lock")],
        port_release_pause_ms: 0,
        ..BootSettings::default()
    };
    settings.readiness.timeout_ms = 50;
    settings.readiness.initial_delay_ms = 1;
    settings.readiness.max_delay_ms = 2;
    settings
}

pub fn temp_paths(root: &Path) -> (BootSettings, StatePaths) {
    let settings = temp_settings(root);
    let paths = StatePaths::from_settings(&settings);
    (settings, paths)
}

/// Remote store backed by a local directory standing in for the bucket.
pub struct DirStore {
    pub root: PathBuf,
    failing: BTreeSet<String>,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(&root).expect("bucket dir");
        Self {
            root,
            failing: BTreeSet::new(),
        }
    }

    /// Every operation touching `prefix` fails.
    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.failing.insert(prefix.to_string());
        self
    }

    pub fn put(&self, key: &str, contents: &str) {
        let path = self.root.join(key);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write object");
    }

    pub fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.root.join(key)).ok()
    }

    fn check(&self, operation: &str, key: &str) -> Result<(), RemoteError> {
        if self.failing.iter().any(|prefix| key.starts_with(prefix.as_str())) {
            return Err(RemoteError::Failed {
                operation: operation.to_string(),
                code: 1,
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl RemoteStore for DirStore {
    fn object_exists(&self, key: &str) -> Result<bool, RemoteError> {
        self.check("lsf", key)?;
        Ok(self.root.join(key).is_file())
    }

    fn count_objects(&self, prefix: &str) -> Result<usize, RemoteError> {
        self.check("lsf", prefix)?;
        Ok(list_files(&self.root.join(prefix), Path::new(""), &[]).len())
    }

    fn copy_to_local(&self, prefix: &str, dest: &Path) -> Result<(), RemoteError> {
        self.check("copy", prefix)?;
        copy_tree(&self.root.join(prefix), dest, &[]);
        Ok(())
    }

    fn copy_from_local(
        &self,
        src: &Path,
        prefix: &str,
        excludes: &[String],
    ) -> Result<(), RemoteError> {
        self.check("copy", prefix)?;
        let dest = self.root.join(prefix);
        if src.is_file() {
            fs::create_dir_all(&dest).expect("mkdir");
            fs::copy(src, dest.join(src.file_name().expect("file name"))).expect("copy");
        } else {
            copy_tree(src, &dest, excludes);
        }
        Ok(())
    }
}

fn excluded(relative: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|pattern| {
        if let Some(dir) = pattern.strip_suffix("/**") {
            relative == dir || relative.starts_with(&format!("{dir}/"))
        } else if let Some(ext) = pattern.strip_prefix('*') {
            relative.ends_with(ext)
        } else {
            relative == pattern
        }
    })
}

/// Relative paths of regular files; symlinks are skipped like rclone does.
fn list_files(root: &Path, relative: &Path, excludes: &[String]) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root.join(relative)) else {
        return Vec::new();
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.expect("entry");
        let rel = relative.join(entry.file_name());
        if excluded(&rel.to_string_lossy(), excludes) {
            continue;
        }
        let file_type = entry.file_type().expect("file type");
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            files.extend(list_files(root, &rel, excludes));
        } else {
            files.push(rel);
        }
    }
    files
}

fn copy_tree(src: &Path, dest: &Path, excludes: &[String]) {
    for relative in list_files(src, Path::new(""), excludes) {
        let target = dest.join(&relative);
        fs::create_dir_all(target.parent().expect("parent")).expect("mkdir");
        fs::copy(src.join(&relative), target).expect("copy file");
    }
}

/// Process table double that records every interaction in order.
#[derive(Default)]
pub struct RecordingProcesses {
    pub running: Vec<String>,
    pub events: Vec<String>,
    pub killed: Vec<String>,
    pub spawned: Vec<LaunchCommand>,
    pub ran: Vec<LaunchCommand>,
    pub execed: Vec<LaunchCommand>,
    /// File created by a successful `run`, standing in for onboarding output.
    pub run_creates: Option<(PathBuf, String)>,
    pub run_succeeds: bool,
    pub spawn_fails: bool,
    pub dead_pids: BTreeSet<u32>,
    next_pid: u32,
}

impl RecordingProcesses {
    pub fn new() -> Self {
        Self {
            run_succeeds: true,
            next_pid: 4_000,
            ..Self::default()
        }
    }

    pub fn with_running(mut self, command_line: &str) -> Self {
        self.running.push(command_line.to_string());
        self
    }

    pub fn onboarding_writes(mut self, path: &Path, contents: &str) -> Self {
        self.run_creates = Some((path.to_path_buf(), contents.to_string()));
        self
    }

    pub fn all_args(&self) -> Vec<String> {
        self.ran
            .iter()
            .chain(&self.spawned)
            .chain(&self.execed)
            .flat_map(|command| command.args.clone())
            .collect()
    }
}

impl ProcessControl for RecordingProcesses {
    fn is_running(&self, pattern: &str) -> bool {
        self.running.iter().any(|line| line.contains(pattern))
    }

    fn kill_matching(&mut self, pattern: &str) -> usize {
        let before = self.running.len();
        self.running.retain(|line| !line.contains(pattern));
        self.killed.push(pattern.to_string());
        self.events.push(format!("kill:{pattern}"));
        before - self.running.len()
    }

    fn is_alive(&self, pid: u32) -> bool {
        !self.dead_pids.contains(&pid)
    }

    fn spawn_detached(&mut self, command: &LaunchCommand) -> std::io::Result<u32> {
        self.events.push(format!("spawn:{}", command.display_form()));
        if self.spawn_fails {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "launcher missing",
            ));
        }
        self.spawned.push(command.clone());
        self.next_pid += 1;
        Ok(self.next_pid)
    }

    fn run(&mut self, command: &LaunchCommand) -> std::io::Result<bool> {
        self.events.push(format!("run:{}", command.program));
        self.ran.push(command.clone());
        if self.run_succeeds {
            if let Some((path, contents)) = &self.run_creates {
                fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
                fs::write(path, contents).expect("onboarding output");
            }
        }
        Ok(self.run_succeeds)
    }

    fn exec(&mut self, command: &LaunchCommand) -> std::io::Result<()> {
        self.events.push(format!("exec:{}", command.display_form()));
        self.execed.push(command.clone());
        Ok(())
    }
}

pub struct AlwaysReady;

impl ReadinessProbe for AlwaysReady {
    fn probe(&self, _port: u16) -> ProbeStatus {
        ProbeStatus::Ready
    }
}

pub struct NeverReady;

impl ReadinessProbe for NeverReady {
    fn probe(&self, _port: u16) -> ProbeStatus {
        ProbeStatus::NotReady("connection refused".to_string())
    }
}
