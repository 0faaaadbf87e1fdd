//! Typed view of the gateway's JSON config.
//!
//! Only the subtrees the bootstrap writes are typed. Every section carries a
//! flattened `extra` bag so keys written by the gateway itself (or by a newer
//! version of it) survive a load/save cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Extra = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewaySection>,
    /// Channel name to channel subtree. Overlays replace entries whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Extra>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<AgentsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginsSection>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_proxies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<GatewayAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_ui: Option<ControlUi>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlUi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_insecure_auth: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsSection {
    /// Provider name to provider entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Extra>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<AgentDefaults>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
    /// Plugin id to plugin entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Extra>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramChannel {
    pub bot_token: String,
    pub enabled: bool,
    pub dm_policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_from: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordChannel {
    pub token: String,
    pub enabled: bool,
    pub dm: DiscordDm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordDm {
    pub policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_from: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackChannel {
    pub bot_token: String,
    pub app_token: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    pub base_url: String,
    pub api_key: String,
    pub api: String,
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub context_window: u32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub primary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerEntry {
    pub enabled: bool,
    pub transport: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub enabled: bool,
    pub config: PluginEntryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntryConfig {
    pub servers: Extra,
}

impl RuntimeConfig {
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut body = serde_json::to_string_pretty(self)?;
        body.push('\n');
        Ok(body)
    }

    pub fn gateway_mut(&mut self) -> &mut GatewaySection {
        self.gateway.get_or_insert_with(GatewaySection::default)
    }

    pub fn channels_mut(&mut self) -> &mut Extra {
        self.channels.get_or_insert_with(Extra::new)
    }

    pub fn providers_mut(&mut self) -> &mut Extra {
        self.models
            .get_or_insert_with(ModelsSection::default)
            .providers
            .get_or_insert_with(Extra::new)
    }

    pub fn agent_defaults_mut(&mut self) -> &mut AgentDefaults {
        self.agents
            .get_or_insert_with(AgentsSection::default)
            .defaults
            .get_or_insert_with(AgentDefaults::default)
    }

    pub fn plugins_mut(&mut self) -> &mut PluginsSection {
        self.plugins.get_or_insert_with(PluginsSection::default)
    }

    pub fn channel(&self, name: &str) -> Option<&Value> {
        self.channels.as_ref()?.get(name)
    }

    pub fn provider(&self, name: &str) -> Option<&Value> {
        self.models.as_ref()?.providers.as_ref()?.get(name)
    }

    pub fn default_model(&self) -> Option<&Value> {
        self.agents.as_ref()?.defaults.as_ref()?.model.as_ref()
    }
}

pub(crate) fn encode<T: Serialize>(
    what: &str,
    value: &T,
) -> Result<Value, super::RuntimeConfigError> {
    serde_json::to_value(value).map_err(|source| super::RuntimeConfigError::Encode {
        what: what.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_survive_round_trip_at_every_level() {
        let raw = json!({
            "gateway": {"port": 1, "bind": "lan", "auth": {"mode": "token"}},
            "channels": {"whatsapp": {"enabled": true}},
            "models": {"mode": "merge", "providers": {"x": {"baseUrl": "u"}}},
            "agents": {"defaults": {"workspace": "/root/clawd"}, "list": []},
            "plugins": {"load": {"paths": []}},
            "wizard": {"lastRunAt": "2026-01-01"}
        });
        let config: RuntimeConfig = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(serde_json::to_value(&config).expect("encode"), raw);
    }

    #[test]
    fn empty_input_is_an_empty_document() {
        let config = RuntimeConfig::from_json_str("  \n").expect("parse");
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.to_pretty_json().expect("encode"), "{}\n");
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let mut config = RuntimeConfig::default();
        config.gateway_mut().port = Some(18789);
        assert_eq!(
            config.to_pretty_json().expect("encode"),
            "{\n  \"gateway\": {\n    \"port\": 18789\n  }\n}\n"
        );
    }
}
