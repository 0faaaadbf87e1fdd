mod system;

pub use system::SystemProcesses;

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A program invocation. Secrets travel in `env`, never in `args`, so they do
/// not show up in process listings.
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Where stdout and stderr of a detached process are appended.
    pub log_file: Option<PathBuf>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            log_file: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// `program arg...` with env values withheld.
    pub fn display_form(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, self.args.join(" "))
    }
}

impl std::fmt::Debug for LaunchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("log_file", &self.log_file)
            .finish()
    }
}

/// The process table as the bootstrap sees it. Matching is by full command
/// line pattern, best-effort and not atomic.
pub trait ProcessControl {
    fn is_running(&self, pattern: &str) -> bool;
    /// Terminates every process matching `pattern`; returns how many were signalled.
    fn kill_matching(&mut self, pattern: &str) -> usize;
    fn is_alive(&self, pid: u32) -> bool;
    fn spawn_detached(&mut self, command: &LaunchCommand) -> std::io::Result<u32>;
    /// Runs to completion; `Ok(true)` on a zero exit status.
    fn run(&mut self, command: &LaunchCommand) -> std::io::Result<bool>;
    /// Replaces the current process image. Returns only on failure for the
    /// real process table.
    fn exec(&mut self, command: &LaunchCommand) -> std::io::Result<()>;
}
