use super::rules::{OverlayContext, RuleOutcome, OVERLAY_PIPELINE};
use super::store::{load_runtime_config, save_runtime_config};
use super::{RuntimeConfig, RuntimeConfigError};
use crate::shared::BootLog;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    pub rule: &'static str,
    pub outcome: RuleOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub config: RuntimeConfig,
    pub outcomes: Vec<RuleReport>,
}

/// Runs every overlay rule, in pipeline order, over `loaded`.
///
/// Pure: the only input is the document and the context. Applying it to its
/// own output with the same context yields the same document.
pub fn reconcile(
    loaded: RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<ReconcileReport, RuntimeConfigError> {
    let mut config = loaded;
    let mut outcomes = Vec::with_capacity(OVERLAY_PIPELINE.len());
    for rule in OVERLAY_PIPELINE.iter() {
        let outcome = (rule.apply)(&mut config, ctx)?;
        outcomes.push(RuleReport {
            rule: rule.name,
            outcome,
        });
    }
    Ok(ReconcileReport { config, outcomes })
}

/// Load, reconcile and overwrite the config file in one pass. A missing file
/// reconciles from an empty document.
pub fn reconcile_file(
    path: &Path,
    ctx: &OverlayContext<'_>,
    log: &BootLog,
) -> Result<ReconcileReport, RuntimeConfigError> {
    let report = reconcile_preview(path, ctx, log)?;
    let digest = save_runtime_config(path, &report.config)?;
    log.info(
        "reconcile.written",
        &format!("path={} sha256={digest}", path.display()),
    );
    Ok(report)
}

/// Same as `reconcile_file` without writing the result.
pub fn reconcile_preview(
    path: &Path,
    ctx: &OverlayContext<'_>,
    log: &BootLog,
) -> Result<ReconcileReport, RuntimeConfigError> {
    let loaded = match load_runtime_config(path)? {
        Some(config) => config,
        None => {
            log.info(
                "reconcile.base",
                &format!("{} absent; starting from an empty document", path.display()),
            );
            RuntimeConfig::default()
        }
    };
    let report = reconcile(loaded, ctx)?;
    log_outcomes(&report, log);
    Ok(report)
}

pub fn log_outcomes(report: &ReconcileReport, log: &BootLog) {
    for item in &report.outcomes {
        let event = format!("reconcile.rule.{}", item.outcome.label());
        let message = format!("rule={} {}", item.rule, item.outcome.detail());
        match item.outcome {
            RuleOutcome::Warning(_) => log.warn(&event, &message),
            _ => log.info(&event, &message),
        }
    }
}
