pub mod cli;

/// Name of the Crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Version of the Crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for configuration errors, distinct from a failed check
pub const CONFIG_ERROR_EXIT: u8 = 2;
