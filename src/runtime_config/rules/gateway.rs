use super::{OverlayContext, RuleOutcome};
use crate::runtime_config::{RuntimeConfig, RuntimeConfigError};

pub const GATEWAY_MODE: &str = "local";
pub const TRUSTED_PROXIES: [&str; 1] = ["10.1.0.0"];
pub const GATEWAY_TOKEN_ENV: &str = "OPENCLAW_GATEWAY_TOKEN";
pub const DEV_MODE_ENV: &str = "OPENCLAW_DEV_MODE";

/// Fixed port, mode and trusted proxies; optional auth token and the
/// development-only insecure control UI flag.
pub fn apply_gateway(
    config: &mut RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<RuleOutcome, RuntimeConfigError> {
    let gateway = config.gateway_mut();
    gateway.port = Some(ctx.ports.gateway);
    gateway.mode = Some(GATEWAY_MODE.to_string());
    gateway.trusted_proxies = Some(TRUSTED_PROXIES.iter().map(|p| p.to_string()).collect());

    let mut detail = format!("port={} mode={GATEWAY_MODE}", ctx.ports.gateway);
    if let Some(token) = ctx.env.get(GATEWAY_TOKEN_ENV) {
        gateway.auth.get_or_insert_with(Default::default).token = Some(token.to_string());
        detail.push_str(" auth_token=set");
    }
    if ctx.env.is_true(DEV_MODE_ENV) {
        gateway
            .control_ui
            .get_or_insert_with(Default::default)
            .allow_insecure_auth = Some(true);
        detail.push_str(" insecure_auth=true");
    }
    Ok(RuleOutcome::Applied(detail))
}
