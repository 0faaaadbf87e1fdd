//! Channel overlays. Each one replaces its channel subtree whole so no field
//! from an earlier document survives next to freshly derived credentials.

use super::{OverlayContext, RuleOutcome};
use crate::runtime_config::document::{
    encode, DiscordChannel, DiscordDm, SlackChannel, TelegramChannel,
};
use crate::runtime_config::{RuntimeConfig, RuntimeConfigError};

pub const TELEGRAM_BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_DM_POLICY_ENV: &str = "TELEGRAM_DM_POLICY";
pub const TELEGRAM_DM_ALLOW_FROM_ENV: &str = "TELEGRAM_DM_ALLOW_FROM";
pub const DISCORD_BOT_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";
pub const DISCORD_DM_POLICY_ENV: &str = "DISCORD_DM_POLICY";
pub const DISCORD_DM_ALLOW_FROM_ENV: &str = "DISCORD_DM_ALLOW_FROM";
pub const SLACK_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
pub const SLACK_APP_TOKEN_ENV: &str = "SLACK_APP_TOKEN";

pub const DEFAULT_DM_POLICY: &str = "pairing";
pub const OPEN_DM_POLICY: &str = "open";

/// An explicit allow-list always wins; otherwise `open` means everyone.
pub fn resolve_allow_from(policy: &str, explicit: Option<Vec<String>>) -> Option<Vec<String>> {
    match explicit {
        Some(list) => Some(list),
        None if policy == OPEN_DM_POLICY => Some(vec!["*".to_string()]),
        None => None,
    }
}

pub fn apply_telegram(
    config: &mut RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<RuleOutcome, RuntimeConfigError> {
    let Some(token) = ctx.env.get(TELEGRAM_BOT_TOKEN_ENV) else {
        return Ok(RuleOutcome::Skipped(format!("{TELEGRAM_BOT_TOKEN_ENV} not set")));
    };
    let policy = ctx.env.get_or(TELEGRAM_DM_POLICY_ENV, DEFAULT_DM_POLICY);
    let channel = TelegramChannel {
        bot_token: token.to_string(),
        enabled: true,
        dm_policy: policy.to_string(),
        allow_from: resolve_allow_from(policy, ctx.env.list(TELEGRAM_DM_ALLOW_FROM_ENV)),
    };
    let detail = describe("telegram", policy, channel.allow_from.as_deref());
    config
        .channels_mut()
        .insert("telegram".to_string(), encode("telegram channel", &channel)?);
    Ok(RuleOutcome::Applied(detail))
}

pub fn apply_discord(
    config: &mut RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<RuleOutcome, RuntimeConfigError> {
    let Some(token) = ctx.env.get(DISCORD_BOT_TOKEN_ENV) else {
        return Ok(RuleOutcome::Skipped(format!("{DISCORD_BOT_TOKEN_ENV} not set")));
    };
    let policy = ctx.env.get_or(DISCORD_DM_POLICY_ENV, DEFAULT_DM_POLICY);
    let channel = DiscordChannel {
        token: token.to_string(),
        enabled: true,
        dm: DiscordDm {
            policy: policy.to_string(),
            allow_from: resolve_allow_from(policy, ctx.env.list(DISCORD_DM_ALLOW_FROM_ENV)),
        },
    };
    let detail = describe("discord", policy, channel.dm.allow_from.as_deref());
    config
        .channels_mut()
        .insert("discord".to_string(), encode("discord channel", &channel)?);
    Ok(RuleOutcome::Applied(detail))
}

/// Slack needs both the bot token and the socket-mode app token.
pub fn apply_slack(
    config: &mut RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<RuleOutcome, RuntimeConfigError> {
    let (Some(bot_token), Some(app_token)) = (
        ctx.env.get(SLACK_BOT_TOKEN_ENV),
        ctx.env.get(SLACK_APP_TOKEN_ENV),
    ) else {
        return Ok(RuleOutcome::Skipped(format!(
            "{SLACK_BOT_TOKEN_ENV} and {SLACK_APP_TOKEN_ENV} are both required"
        )));
    };
    let channel = SlackChannel {
        bot_token: bot_token.to_string(),
        app_token: app_token.to_string(),
        enabled: true,
    };
    config
        .channels_mut()
        .insert("slack".to_string(), encode("slack channel", &channel)?);
    Ok(RuleOutcome::Applied("channel=slack".to_string()))
}

fn describe(channel: &str, policy: &str, allow_from: Option<&[String]>) -> String {
    match allow_from {
        Some(list) => format!("channel={channel} dm_policy={policy} allow_from={}", list.len()),
        None => format!("channel={channel} dm_policy={policy}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_allow_list_beats_open_policy() {
        assert_eq!(
            resolve_allow_from("open", Some(vec!["1".to_string()])),
            Some(vec!["1".to_string()])
        );
        assert_eq!(
            resolve_allow_from("open", None),
            Some(vec!["*".to_string()])
        );
        assert_eq!(resolve_allow_from("pairing", None), None);
        assert_eq!(
            resolve_allow_from("pairing", Some(vec!["9".to_string()])),
            Some(vec!["9".to_string()])
        );
    }
}
