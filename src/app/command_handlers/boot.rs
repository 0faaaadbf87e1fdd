use crate::app::command_support::{ensure_state_dirs, load_context, remote_store};
use crate::identity::{assemble_identity, IdentityOutcome};
use crate::orchestrator::{gateway_already_running, run_bootstrap, BootExit, BootReport, Bootstrap};
use crate::process::SystemProcesses;
use crate::remote::RemoteStore;
use crate::runtime_config::{reconcile_file, reconcile_preview, OverlayContext, ReconcileReport};
use crate::sidecar::HttpProbe;
use std::time::Duration;

pub fn cmd_start() -> Result<String, String> {
    let ctx = load_context()?;
    let mut processes = SystemProcesses::new();
    // Checked before the remote client config is written.
    if gateway_already_running(&ctx.settings, &processes) {
        return Ok("already_running=true".to_string());
    }
    let store = remote_store(&ctx)?;
    let probe = HttpProbe::new(Duration::from_millis(ctx.settings.readiness.probe_timeout_ms));
    let exit = run_bootstrap(Bootstrap {
        settings: &ctx.settings,
        paths: &ctx.paths,
        env: &ctx.env,
        store: store.as_ref().map(|store| store as &dyn RemoteStore),
        processes: &mut processes,
        probe: &probe,
        log: &ctx.log,
    })
    .map_err(|err| {
        ctx.log.error("boot.failed", &err.to_string());
        err.to_string()
    })?;

    match exit {
        BootExit::AlreadyRunning => Ok("already_running=true".to_string()),
        BootExit::HandedOff(report) => Ok(render_boot_report(&report)),
    }
}

pub fn cmd_reconcile(args: &[String]) -> Result<String, String> {
    let dry_run = match args {
        [] => false,
        [flag] if flag == "--dry-run" => true,
        _ => return Err("usage: reconcile [--dry-run]".to_string()),
    };
    let ctx = load_context()?;
    let overlay = OverlayContext {
        env: &ctx.env,
        ports: &ctx.settings.ports,
    };
    let result = if dry_run {
        reconcile_preview(&ctx.paths.config_file, &overlay, &ctx.log)
    } else {
        ensure_state_dirs(&ctx)?;
        reconcile_file(&ctx.paths.config_file, &overlay, &ctx.log)
    };
    let report = result.map_err(|e| e.to_string())?;

    let mut lines = vec![
        format!("config_file={}", ctx.paths.config_file.display()),
        format!("dry_run={dry_run}"),
    ];
    lines.extend(render_rule_lines(&report));
    if dry_run {
        lines.push(report.config.to_pretty_json().map_err(|e| e.to_string())?);
    }
    Ok(lines.join("\n"))
}

pub fn cmd_identity() -> Result<String, String> {
    let ctx = load_context()?;
    match assemble_identity(&ctx.settings.workspace_dir).map_err(|e| e.to_string())? {
        IdentityOutcome::SourceMissing => Ok("identity=skipped\nreason=source_missing".to_string()),
        IdentityOutcome::Assembled {
            path,
            fragments,
            bytes,
        } => Ok(format!(
            "identity=assembled\npath={}\nfragments={}\nbytes={bytes}",
            path.display(),
            fragments.join(",")
        )),
    }
}

fn render_rule_lines(report: &ReconcileReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .map(|item| {
            format!(
                "rule.{}={} {}",
                item.rule,
                item.outcome.label(),
                item.outcome.detail()
            )
        })
        .collect()
}

pub fn render_boot_report(report: &BootReport) -> String {
    let mut lines = vec![
        format!(
            "stages={}",
            report
                .stages
                .iter()
                .map(|stage| stage.as_str())
                .collect::<Vec<_>>()
                .join(",")
        ),
        format!("config_restored={}", report.restore.config_restored),
        format!("config_reset={}", report.config_reset),
        format!(
            "auth_strategy={}",
            report
                .auth_strategy
                .map(|strategy| strategy.as_str())
                .unwrap_or("skipped")
        ),
        format!("sidecars_launched={}", report.sidecars.launched.len()),
        format!("sidecars_ready={}", report.sidecars.ready_count()),
    ];
    lines.extend(report.rule_outcomes.iter().map(|item| {
        format!("rule.{}={}", item.rule, item.outcome.label())
    }));
    lines.join("\n")
}
