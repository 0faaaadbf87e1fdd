use super::handoff::{clear_stale_locks, gateway_command};
use super::onboarding::{onboarding_command, AuthStrategy};
use super::workspace_link::relink_workspace;
use crate::identity::{assemble_identity, IdentityOutcome};
use crate::process::ProcessControl;
use crate::remote::RemoteStore;
use crate::restore::{restore_state, RestoreResult};
use crate::runtime_config::{reconcile_file, OverlayContext, RuleReport};
use crate::settings::{bootstrap_state_dirs, BootSettings, ConfigPolicy, StatePaths};
use crate::shared::fs_atomic::remove_file_if_exists;
use crate::shared::{BootError, BootLog, Env};
use crate::sidecar::{ensure_sidecars, ReadinessProbe, SidecarStartup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    Restoring,
    ConfigReset,
    Onboarding,
    WorkspaceLink,
    Reconciling,
    SidecarStartup,
    IdentityAssembly,
    Handoff,
}

impl BootStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restoring => "restoring",
            Self::ConfigReset => "config_reset",
            Self::Onboarding => "onboarding",
            Self::WorkspaceLink => "workspace_link",
            Self::Reconciling => "reconciling",
            Self::SidecarStartup => "sidecar_startup",
            Self::IdentityAssembly => "identity_assembly",
            Self::Handoff => "handoff",
        }
    }
}

/// What a bootstrap did up to the point of handoff.
#[derive(Debug, Clone, Default)]
pub struct BootReport {
    pub stages: Vec<BootStage>,
    pub restore: RestoreResult,
    pub config_reset: bool,
    pub auth_strategy: Option<AuthStrategy>,
    pub rule_outcomes: Vec<RuleReport>,
    pub sidecars: SidecarStartup,
    pub identity: Option<IdentityOutcome>,
}

#[derive(Debug)]
pub enum BootExit {
    AlreadyRunning,
    /// Only observable with a `ProcessControl` whose `exec` returns.
    HandedOff(BootReport),
}

/// Everything one bootstrap run depends on.
pub struct Bootstrap<'a> {
    pub settings: &'a BootSettings,
    pub paths: &'a StatePaths,
    pub env: &'a Env,
    pub store: Option<&'a dyn RemoteStore>,
    pub processes: &'a mut dyn ProcessControl,
    pub probe: &'a dyn ReadinessProbe,
    pub log: &'a BootLog,
}

/// True when a gateway process is already up. Only reads the process table.
pub fn gateway_already_running(settings: &BootSettings, processes: &dyn ProcessControl) -> bool {
    processes.is_running(&settings.gateway_signature())
}

/// Runs every stage in order and hands the process over to the gateway.
///
/// If a gateway is already running this returns `AlreadyRunning` without
/// touching the filesystem, so repeated invocations are safe. The notice goes
/// to stderr only; the boot log would create the state directory.
pub fn run_bootstrap(boot: Bootstrap<'_>) -> Result<BootExit, BootError> {
    let Bootstrap {
        settings,
        paths,
        env,
        store,
        processes,
        probe,
        log,
    } = boot;

    if gateway_already_running(settings, &*processes) {
        eprintln!(
            "[info] boot.already_running: found `{}`",
            settings.gateway_signature()
        );
        return Ok(BootExit::AlreadyRunning);
    }

    bootstrap_state_dirs(paths)?;
    log.info(
        "boot.started",
        &format!("config_policy={}", settings.config_policy.as_str()),
    );
    let mut report = BootReport::default();

    report.stages.push(BootStage::Restoring);
    report.restore = restore_state(store, paths, log);

    report.stages.push(BootStage::ConfigReset);
    if settings.config_policy == ConfigPolicy::ForceFresh {
        report.config_reset =
            remove_file_if_exists(&paths.config_file).map_err(|source| BootError::ConfigReset {
                path: paths.config_file.display().to_string(),
                source,
            })?;
        if report.config_reset {
            log.info(
                "boot.config_reset",
                &format!("removed {}", paths.config_file.display()),
            );
        }
    }

    if !paths.config_file.exists() {
        report.stages.push(BootStage::Onboarding);
        let strategy = AuthStrategy::resolve(env);
        log.info("boot.onboarding", &format!("auth={}", strategy.as_str()));
        let command = onboarding_command(settings, env, strategy);
        match processes.run(&command) {
            Ok(true) => {}
            Ok(false) => {
                return Err(BootError::Onboarding(format!(
                    "`{} onboard` exited with a non-zero status",
                    command.program
                )))
            }
            Err(err) => {
                return Err(BootError::Onboarding(format!(
                    "failed to run `{}`: {err}",
                    command.program
                )))
            }
        }
        report.auth_strategy = Some(strategy);
    }

    report.stages.push(BootStage::WorkspaceLink);
    relink_workspace(paths)?;

    report.stages.push(BootStage::Reconciling);
    let ctx = OverlayContext {
        env,
        ports: &settings.ports,
    };
    report.rule_outcomes = reconcile_file(&paths.config_file, &ctx, log)?.outcomes;

    report.stages.push(BootStage::SidecarStartup);
    report.sidecars = ensure_sidecars(env, settings, paths, &mut *processes, probe, log)?;

    report.stages.push(BootStage::IdentityAssembly);
    let identity = assemble_identity(&paths.workspace_dir)?;
    if let IdentityOutcome::Assembled { fragments, bytes, .. } = &identity {
        log.info(
            "boot.identity",
            &format!("fragments={} bytes={bytes}", fragments.len()),
        );
    }
    report.identity = Some(identity);

    report.stages.push(BootStage::Handoff);
    clear_stale_locks(paths, settings, log);
    let command = gateway_command(settings);
    log.info("boot.handoff", &command.display_form());
    processes
        .exec(&command)
        .map_err(|source| BootError::Handoff {
            binary: command.program.clone(),
            source,
        })?;
    Ok(BootExit::HandedOff(report))
}
