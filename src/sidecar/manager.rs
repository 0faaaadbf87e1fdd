use super::credentials::write_credential_files;
use super::plan::plan_sidecars;
use super::readiness::{wait_for_ready, BackoffPolicy, PendingBridge, ReadinessProbe, ReadinessReport};
use super::SidecarError;
use crate::process::ProcessControl;
use crate::settings::{BootSettings, StatePaths};
use crate::shared::{BootLog, Env};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedSidecar {
    pub name: String,
    pub pid: u32,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarStartup {
    pub stale_killed: usize,
    pub launched: Vec<LaunchedSidecar>,
    pub readiness: Vec<ReadinessReport>,
}

impl SidecarStartup {
    pub fn ready_count(&self) -> usize {
        self.readiness.iter().filter(|report| report.is_ready()).count()
    }
}

/// Stops stale bridges and starts one per enabled integration, then waits
/// for each to accept connections.
///
/// A bridge that fails to launch or never becomes ready is logged; the
/// gateway still starts without it. Only encoding failures propagate.
pub fn ensure_sidecars(
    env: &Env,
    settings: &BootSettings,
    paths: &StatePaths,
    processes: &mut dyn ProcessControl,
    probe: &dyn ReadinessProbe,
    log: &BootLog,
) -> Result<SidecarStartup, SidecarError> {
    let mut startup = SidecarStartup {
        stale_killed: processes.kill_matching(&settings.binaries.bridge_process_pattern),
        ..SidecarStartup::default()
    };
    if startup.stale_killed > 0 {
        log.info(
            "sidecar.stale_killed",
            &format!("count={}", startup.stale_killed),
        );
        let pause = settings.port_release_pause();
        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }

    let specs = plan_sidecars(env, settings, paths)?;
    if specs.is_empty() {
        log.info("sidecar.none", "no bridge prerequisites present");
        return Ok(startup);
    }

    for spec in &specs {
        if let Err(err) = write_credential_files(spec) {
            log.warn(
                "sidecar.credentials_failed",
                &format!("name={} {err}", spec.name),
            );
            continue;
        }
        match processes.spawn_detached(&spec.launch) {
            Ok(pid) => {
                log.info(
                    "sidecar.launched",
                    &format!("name={} pid={pid} port={}", spec.name, spec.listen_port),
                );
                startup.launched.push(LaunchedSidecar {
                    name: spec.name.to_string(),
                    pid,
                    port: spec.listen_port,
                });
            }
            Err(err) => log.warn(
                "sidecar.launch_failed",
                &format!("name={} command=`{}` {err}", spec.name, spec.launch.display_form()),
            ),
        }
    }

    let pending: Vec<PendingBridge> = startup
        .launched
        .iter()
        .map(|sidecar| PendingBridge {
            name: sidecar.name.clone(),
            port: sidecar.port,
            pid: sidecar.pid,
        })
        .collect();
    startup.readiness = wait_for_ready(
        &pending,
        probe,
        &*processes,
        BackoffPolicy::from_settings(&settings.readiness),
    );
    for report in &startup.readiness {
        if report.is_ready() {
            log.info(
                "sidecar.ready",
                &format!("name={} port={} {:?}", report.name, report.port, report.state),
            );
        } else {
            log.warn(
                "sidecar.not_ready",
                &format!("name={} port={} {:?}", report.name, report.port, report.state),
            );
        }
    }
    Ok(startup)
}
