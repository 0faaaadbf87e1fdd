use super::{LaunchCommand, ProcessControl};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const TERM_GRACE: Duration = Duration::from_secs(2);

/// `ProcessControl` backed by the host's `pgrep`/`kill` and `std::process`.
///
/// Children spawned here are kept so their exit can be reaped; a zombie
/// still answers `kill -0`.
#[derive(Debug, Default)]
pub struct SystemProcesses {
    children: RefCell<BTreeMap<u32, Child>>,
}

impl SystemProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching_pids(&self, pattern: &str) -> Vec<u32> {
        let Ok(output) = Command::new("pgrep")
            .arg("-f")
            .arg(pattern)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        else {
            return Vec::new();
        };
        let own = std::process::id();
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse::<u32>().ok())
            .filter(|pid| *pid != own)
            .collect()
    }

    fn wait_for_exit(&self, pids: &[u32], timeout: Duration) -> Vec<u32> {
        let start = Instant::now();
        loop {
            let alive: Vec<u32> = pids
                .iter()
                .copied()
                .filter(|pid| self.is_alive(*pid))
                .collect();
            if alive.is_empty() || start.elapsed() >= timeout {
                return alive;
            }
            thread::sleep(Duration::from_millis(100));
        }
    }
}

impl ProcessControl for SystemProcesses {
    fn is_running(&self, pattern: &str) -> bool {
        !self.matching_pids(pattern).is_empty()
    }

    fn kill_matching(&mut self, pattern: &str) -> usize {
        let pids = self.matching_pids(pattern);
        for pid in &pids {
            send_signal(*pid, "-TERM");
        }
        for pid in self.wait_for_exit(&pids, TERM_GRACE) {
            send_signal(pid, "-KILL");
        }
        pids.len()
    }

    fn is_alive(&self, pid: u32) -> bool {
        if let Some(child) = self.children.borrow_mut().get_mut(&pid) {
            return matches!(child.try_wait(), Ok(None));
        }
        is_process_alive(pid)
    }

    fn spawn_detached(&mut self, command: &LaunchCommand) -> std::io::Result<u32> {
        let mut process = Command::new(&command.program);
        process.args(&command.args).envs(&command.env).stdin(Stdio::null());

        match &command.log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let log = fs::OpenOptions::new().create(true).append(true).open(path)?;
                process.stdout(log.try_clone()?).stderr(log);
            }
            None => {
                process.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }

        let child = process.spawn()?;
        let pid = child.id();
        self.children.borrow_mut().insert(pid, child);
        Ok(pid)
    }

    fn run(&mut self, command: &LaunchCommand) -> std::io::Result<bool> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .status()?;
        Ok(status.success())
    }

    #[cfg(unix)]
    fn exec(&mut self, command: &LaunchCommand) -> std::io::Result<()> {
        use std::os::unix::process::CommandExt;
        let err = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .exec();
        Err(err)
    }

    #[cfg(not(unix))]
    fn exec(&mut self, command: &LaunchCommand) -> std::io::Result<()> {
        Err(std::io::Error::other(format!(
            "cannot replace process image with `{}` on this platform",
            command.program
        )))
    }
}

pub fn is_process_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }

    #[cfg(unix)]
    {
        Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        false
    }
}

fn send_signal(pid: u32, signal: &str) {
    #[cfg(unix)]
    {
        let _ = Command::new("kill")
            .arg(signal)
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }

    #[cfg(not(unix))]
    {
        let _ = (pid, signal);
    }
}
