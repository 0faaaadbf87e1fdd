pub mod bootstrap;
pub mod handoff;
pub mod onboarding;
pub mod workspace_link;

pub use bootstrap::{
    gateway_already_running, run_bootstrap, BootExit, BootReport, BootStage, Bootstrap,
};
pub use handoff::{clear_stale_locks, gateway_command};
pub use onboarding::{onboarding_command, AuthStrategy};
pub use workspace_link::relink_workspace;
