use crate::process::ProcessControl;
use crate::settings::ReadinessSettings;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ready,
    NotReady(String),
}

pub trait ReadinessProbe {
    fn probe(&self, port: u16) -> ProbeStatus;
}

/// Probes `http://127.0.0.1:<port>/mcp`. Any HTTP response, including an
/// error status, means the listener is up.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ReadinessProbe for HttpProbe {
    fn probe(&self, port: u16) -> ProbeStatus {
        let url = format!("http://127.0.0.1:{port}/mcp");
        match ureq::get(&url).timeout(self.timeout).call() {
            Ok(_) | Err(ureq::Error::Status(_, _)) => ProbeStatus::Ready,
            Err(ureq::Error::Transport(transport)) => ProbeStatus::NotReady(transport.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub timeout: Duration,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    pub fn from_settings(settings: &ReadinessSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }

    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBridge {
    pub name: String,
    pub port: u16,
    pub pid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Ready { elapsed_ms: u64 },
    Exited,
    TimedOut { last_error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    pub name: String,
    pub port: u16,
    pub state: ReadinessState,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ReadinessState::Ready { .. })
    }
}

/// Polls every pending bridge until it answers, its process exits, or the
/// shared deadline passes. Delay between rounds doubles up to `max_delay`.
pub fn wait_for_ready(
    pending: &[PendingBridge],
    probe: &dyn ReadinessProbe,
    processes: &dyn ProcessControl,
    policy: BackoffPolicy,
) -> Vec<ReadinessReport> {
    let start = Instant::now();
    let mut resolved: Vec<Option<ReadinessState>> = vec![None; pending.len()];
    let mut last_errors = vec![String::from("not probed"); pending.len()];
    let mut delay = policy.initial_delay;

    loop {
        for (idx, bridge) in pending.iter().enumerate() {
            if resolved[idx].is_some() {
                continue;
            }
            if !processes.is_alive(bridge.pid) {
                resolved[idx] = Some(ReadinessState::Exited);
                continue;
            }
            match probe.probe(bridge.port) {
                ProbeStatus::Ready => {
                    resolved[idx] = Some(ReadinessState::Ready {
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    });
                }
                ProbeStatus::NotReady(reason) => last_errors[idx] = reason,
            }
        }

        if resolved.iter().all(Option::is_some) {
            break;
        }
        let elapsed = start.elapsed();
        if elapsed >= policy.timeout {
            break;
        }
        thread::sleep(delay.min(policy.timeout - elapsed));
        delay = policy.next_delay(delay);
    }

    pending
        .iter()
        .zip(resolved)
        .zip(last_errors)
        .map(|((bridge, state), last_error)| ReadinessReport {
            name: bridge.name.clone(),
            port: bridge.port,
            state: state.unwrap_or(ReadinessState::TimedOut { last_error }),
        })
        .collect()
}
