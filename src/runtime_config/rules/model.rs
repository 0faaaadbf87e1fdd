use super::{OverlayContext, RuleOutcome};
use crate::runtime_config::document::{encode, ModelDescriptor, ModelSelection, ProviderEntry};
use crate::runtime_config::{RuntimeConfig, RuntimeConfigError};
use crate::shared::Env;

pub const MODEL_ENV: &str = "CF_AI_GATEWAY_MODEL";
pub const GATEWAY_ACCOUNT_ID_ENV: &str = "CF_AI_GATEWAY_ACCOUNT_ID";
pub const GATEWAY_ID_ENV: &str = "CF_AI_GATEWAY_GATEWAY_ID";
pub const GATEWAY_API_KEY_ENV: &str = "CLOUDFLARE_AI_GATEWAY_API_KEY";
pub const ACCOUNT_ID_ENV: &str = "CF_ACCOUNT_ID";

pub const PROVIDER_KEY_PREFIX: &str = "cf-ai-gw-";
pub const WORKERS_AI_PROVIDER: &str = "workers-ai";
pub const DEFAULT_CONTEXT_WINDOW: u32 = 131_072;
pub const DEFAULT_MAX_TOKENS: u32 = 8_192;

const AI_GATEWAY_BASE: &str = "https://gateway.ai.cloudflare.com/v1";
const WORKERS_AI_BASE: &str = "https://api.cloudflare.com/client/v4/accounts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlStrategy {
    /// Account id and gateway id: route through the AI gateway.
    AiGateway,
    /// Same as `AiGateway` for Workers AI, which needs the OpenAI-compatible `/v1` suffix.
    AiGatewayWorkersAi,
    /// Workers AI with only an account id: call the account's AI endpoint directly.
    WorkersAiDirect,
}

impl BaseUrlStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AiGateway => "ai_gateway",
            Self::AiGatewayWorkersAi => "ai_gateway_workers_ai",
            Self::WorkersAiDirect => "workers_ai_direct",
        }
    }
}

/// Splits `provider/model-id` on the first `/`.
pub fn split_model_ref(raw: &str) -> Option<(&str, &str)> {
    let (provider, model) = raw.trim().split_once('/')?;
    if provider.is_empty() || model.is_empty() {
        return None;
    }
    Some((provider, model))
}

pub fn resolve_base_url(provider: &str, env: &Env) -> Option<(BaseUrlStrategy, String)> {
    if let (Some(account), Some(gateway)) = (env.get(GATEWAY_ACCOUNT_ID_ENV), env.get(GATEWAY_ID_ENV))
    {
        let url = format!("{AI_GATEWAY_BASE}/{account}/{gateway}/{provider}");
        if provider == WORKERS_AI_PROVIDER {
            return Some((BaseUrlStrategy::AiGatewayWorkersAi, format!("{url}/v1")));
        }
        return Some((BaseUrlStrategy::AiGateway, url));
    }
    if provider == WORKERS_AI_PROVIDER {
        let account = env
            .get(GATEWAY_ACCOUNT_ID_ENV)
            .or_else(|| env.get(ACCOUNT_ID_ENV))?;
        return Some((
            BaseUrlStrategy::WorkersAiDirect,
            format!("{WORKERS_AI_BASE}/{account}/ai/v1"),
        ));
    }
    None
}

pub fn api_flavor(provider: &str) -> &'static str {
    if provider == "anthropic" {
        "anthropic-messages"
    } else {
        "openai-completions"
    }
}

/// Synthesizes a single-model provider entry from `CF_AI_GATEWAY_MODEL` and
/// makes it the default model. Missing pieces downgrade to a warning.
pub fn apply_model_override(
    config: &mut RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<RuleOutcome, RuntimeConfigError> {
    let Some(raw) = ctx.env.get(MODEL_ENV) else {
        return Ok(RuleOutcome::Skipped(format!("{MODEL_ENV} not set")));
    };
    let Some((provider, model_id)) = split_model_ref(raw) else {
        return Ok(RuleOutcome::Warning(format!(
            "{MODEL_ENV} must use `provider/model-id` format, got `{raw}`"
        )));
    };
    let Some((strategy, base_url)) = resolve_base_url(provider, ctx.env) else {
        return Ok(RuleOutcome::Warning(format!(
            "{MODEL_ENV} set but no base url could be built; set {GATEWAY_ACCOUNT_ID_ENV} and {GATEWAY_ID_ENV}"
        )));
    };
    let Some(api_key) = ctx.env.get(GATEWAY_API_KEY_ENV) else {
        return Ok(RuleOutcome::Warning(format!(
            "{MODEL_ENV} set but {GATEWAY_API_KEY_ENV} is missing"
        )));
    };

    let provider_key = format!("{PROVIDER_KEY_PREFIX}{provider}");
    let entry = ProviderEntry {
        base_url,
        api_key: api_key.to_string(),
        api: api_flavor(provider).to_string(),
        models: vec![ModelDescriptor {
            id: model_id.to_string(),
            name: model_id.to_string(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            max_tokens: DEFAULT_MAX_TOKENS,
        }],
    };
    let selection = ModelSelection {
        primary: format!("{provider_key}/{model_id}"),
    };

    config
        .providers_mut()
        .insert(provider_key.clone(), encode("model provider entry", &entry)?);
    config.agent_defaults_mut().model = Some(encode("default model", &selection)?);

    Ok(RuleOutcome::Applied(format!(
        "provider={provider_key} model={model_id} strategy={}",
        strategy.as_str()
    )))
}
