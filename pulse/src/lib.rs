//! Pulse performs a single reachability check against a host and port over TCP, UDP or HTTP.
//!
//! Configuration is resolved once into a [config::CheckConfig], handed to exactly one
//! [probe::Probe] through [check::check], and the resulting [check::CheckOutcome] maps onto the
//! process exit code. Every probe makes one bounded attempt; network failures are an unhealthy
//! result and never an error.
//!
//! Diagnostics go through the `log` facade at `info` level so the caller decides whether
//! verbose output is shown.

pub mod check;
pub mod config;
pub mod error;
pub mod probe;
pub mod tokio_tools;

pub use check::{check, report, CheckOutcome};
pub use config::{CheckConfig, CheckConfigBuilder, HttpMethod, Mode, PulseConfig};
pub use error::PulseError;

/// Name of the Crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Version of the Crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
