use crate::process::LaunchCommand;
use crate::runtime_config::rules::model::{
    GATEWAY_ACCOUNT_ID_ENV, GATEWAY_API_KEY_ENV, GATEWAY_ID_ENV,
};
use crate::settings::BootSettings;
use crate::shared::Env;

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// First-run authentication, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    CloudflareAiGateway,
    Anthropic,
    OpenAi,
    None,
}

impl AuthStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CloudflareAiGateway => "cloudflare-ai-gateway",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::None => "none",
        }
    }

    pub fn resolve(env: &Env) -> Self {
        if env.has_all(&[GATEWAY_API_KEY_ENV, GATEWAY_ACCOUNT_ID_ENV, GATEWAY_ID_ENV]) {
            Self::CloudflareAiGateway
        } else if env.has(ANTHROPIC_API_KEY_ENV) {
            Self::Anthropic
        } else if env.has(OPENAI_API_KEY_ENV) {
            Self::OpenAi
        } else {
            Self::None
        }
    }

    fn args(self, env: &Env) -> Vec<String> {
        let value = |key: &str| env.get(key).unwrap_or_default().to_string();
        match self {
            Self::CloudflareAiGateway => vec![
                "--auth-choice".to_string(),
                "cloudflare-ai-gateway-api-key".to_string(),
                "--cloudflare-ai-gateway-account-id".to_string(),
                value(GATEWAY_ACCOUNT_ID_ENV),
                "--cloudflare-ai-gateway-gateway-id".to_string(),
                value(GATEWAY_ID_ENV),
                "--cloudflare-ai-gateway-api-key".to_string(),
                value(GATEWAY_API_KEY_ENV),
            ],
            Self::Anthropic => vec![
                "--auth-choice".to_string(),
                "apiKey".to_string(),
                "--anthropic-api-key".to_string(),
                value(ANTHROPIC_API_KEY_ENV),
            ],
            Self::OpenAi => vec![
                "--auth-choice".to_string(),
                "openai-api-key".to_string(),
                "--openai-api-key".to_string(),
                value(OPENAI_API_KEY_ENV),
            ],
            Self::None => Vec::new(),
        }
    }
}

/// Non-interactive first-run setup. The gateway CLI only accepts keys as
/// flags, so this command must never be logged with its args.
pub fn onboarding_command(settings: &BootSettings, env: &Env, strategy: AuthStrategy) -> LaunchCommand {
    LaunchCommand::new(settings.binaries.gateway.clone())
        .args([
            "onboard",
            "--non-interactive",
            "--accept-risk",
            "--mode",
            "local",
        ])
        .args(strategy.args(env))
        .arg("--gateway-port")
        .arg(settings.ports.gateway.to_string())
        .args([
            "--gateway-bind",
            "lan",
            "--skip-channels",
            "--skip-skills",
            "--skip-health",
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_strategy_needs_all_three_vars() {
        let env = Env::from_pairs([
            (GATEWAY_API_KEY_ENV, "k"),
            (GATEWAY_ACCOUNT_ID_ENV, "acc"),
            (ANTHROPIC_API_KEY_ENV, "sk-ant"),
        ]);
        assert_eq!(AuthStrategy::resolve(&env), AuthStrategy::Anthropic);
    }

    #[test]
    fn no_strategy_still_builds_a_command() {
        let command = onboarding_command(&BootSettings::default(), &Env::default(), AuthStrategy::None);
        assert_eq!(command.program, "openclaw");
        assert!(!command.args.iter().any(|arg| arg == "--auth-choice"));
        assert!(command.args.windows(2).any(|pair| pair == ["--gateway-port", "18789"]));
        assert!(command.args.iter().any(|arg| arg == "--skip-health"));
    }
}
