pub mod app;
pub mod identity;
pub mod orchestrator;
pub mod process;
pub mod remote;
pub mod restore;
pub mod runtime_config;
pub mod settings;
pub mod shared;
pub mod sidecar;
