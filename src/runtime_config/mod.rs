pub mod document;
pub mod error;
pub mod reconcile;
pub mod rules;
pub mod store;

pub use document::{Extra, RuntimeConfig};
pub use error::RuntimeConfigError;
pub use reconcile::{reconcile, reconcile_file, reconcile_preview, ReconcileReport, RuleReport};
pub use rules::{OverlayContext, OverlayRule, RuleOutcome, OVERLAY_PIPELINE};
pub use store::{load_runtime_config, save_runtime_config};
