//! Overlay rules: ordered, independently testable transforms of the config
//! document driven by the environment snapshot.
//!
//! Order matters and is fixed by `OVERLAY_PIPELINE`: network/auth, then the
//! model override, then channels, then plugin registration.

pub mod channels;
pub mod gateway;
pub mod model;
pub mod plugins;

use super::{RuntimeConfig, RuntimeConfigError};
use crate::settings::PortSettings;
use crate::shared::Env;

pub struct OverlayContext<'a> {
    pub env: &'a Env,
    pub ports: &'a PortSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Applied(String),
    Skipped(String),
    /// The rule's trigger was present but unusable; the document is unchanged.
    Warning(String),
}

impl RuleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied(_) => "applied",
            Self::Skipped(_) => "skipped",
            Self::Warning(_) => "warning",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Applied(detail) | Self::Skipped(detail) | Self::Warning(detail) => detail,
        }
    }
}

pub type OverlayFn = fn(&mut RuntimeConfig, &OverlayContext<'_>) -> Result<RuleOutcome, RuntimeConfigError>;

#[derive(Clone, Copy)]
pub struct OverlayRule {
    pub name: &'static str,
    pub apply: OverlayFn,
}

impl std::fmt::Debug for OverlayRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRule").field("name", &self.name).finish()
    }
}

pub const OVERLAY_PIPELINE: [OverlayRule; 6] = [
    OverlayRule {
        name: "gateway",
        apply: gateway::apply_gateway,
    },
    OverlayRule {
        name: "model_override",
        apply: model::apply_model_override,
    },
    OverlayRule {
        name: "telegram",
        apply: channels::apply_telegram,
    },
    OverlayRule {
        name: "discord",
        apply: channels::apply_discord,
    },
    OverlayRule {
        name: "slack",
        apply: channels::apply_slack,
    },
    OverlayRule {
        name: "plugins",
        apply: plugins::apply_plugins,
    },
];
