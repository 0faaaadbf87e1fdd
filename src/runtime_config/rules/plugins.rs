use super::{OverlayContext, RuleOutcome};
use crate::runtime_config::document::{encode, McpServerEntry, PluginEntry, PluginEntryConfig};
use crate::runtime_config::{Extra, RuntimeConfig, RuntimeConfigError};
use crate::sidecar::required_bridges;

pub const MCP_PLUGIN_ID: &str = "mcp-adapter";
pub const MCP_TRANSPORT: &str = "http";

pub fn bridge_url(port: u16) -> String {
    format!("http://localhost:{port}/mcp")
}

/// Registers one MCP server per bridge whose prerequisites are present and
/// enables the adapter plugin. With no bridges the plugin section is left as is.
pub fn apply_plugins(
    config: &mut RuntimeConfig,
    ctx: &OverlayContext<'_>,
) -> Result<RuleOutcome, RuntimeConfigError> {
    let bridges = required_bridges(ctx.env);
    if bridges.is_empty() {
        return Ok(RuleOutcome::Skipped(
            "no bridge prerequisites present".to_string(),
        ));
    }

    let mut servers = Extra::new();
    for bridge in &bridges {
        let entry = McpServerEntry {
            enabled: true,
            transport: MCP_TRANSPORT.to_string(),
            url: bridge_url(bridge.port(ctx.ports)),
        };
        servers.insert(
            bridge.server_name().to_string(),
            encode("mcp server entry", &entry)?,
        );
    }
    let names = servers.keys().cloned().collect::<Vec<_>>().join(",");
    let plugin = PluginEntry {
        enabled: true,
        config: PluginEntryConfig { servers },
    };
    let plugin = encode("mcp plugin entry", &plugin)?;

    let plugins = config.plugins_mut();
    plugins.enabled = Some(true);
    let allow = plugins.allow.get_or_insert_with(Vec::new);
    if !allow.iter().any(|id| id == MCP_PLUGIN_ID) {
        allow.push(MCP_PLUGIN_ID.to_string());
    }
    plugins
        .entries
        .get_or_insert_with(Extra::new)
        .insert(MCP_PLUGIN_ID.to_string(), plugin);

    Ok(RuleOutcome::Applied(format!("servers={names}")))
}
