pub mod env;
pub mod errors;
pub mod fs_atomic;
pub mod logging;

pub use env::Env;
pub use errors::BootError;
pub use logging::BootLog;
