use std::fmt::Debug;

use async_trait::async_trait;

use crate::config::{CheckConfig, Mode};
use crate::error::PulseError;

/// This module contains the http probe
pub mod http;
/// This module contains the tcp probe
pub mod tcp;
/// This module contains the udp probe
pub mod udp;

pub use http::HttpProbe;
pub use tcp::TcpProbe;
pub use udp::UdpProbe;

/// A single bounded attempt to assess reachability of the configured target.
///
/// `Ok(true)` means reachable and `Ok(false)` unreachable, whatever the cause (refused, timed out,
/// unresolvable). `Err` is kept for local failures where the attempt could not even be made.
#[async_trait]
pub trait Probe: Debug + Sync + Send {
    /// Name of the probe
    fn name(&self) -> &'static str;

    /// Make exactly one attempt against the target in config
    async fn check(&self, config: &CheckConfig) -> Result<bool, PulseError>;
}

/// Select the probe for a mode
pub fn probe_for(mode: Mode) -> Box<dyn Probe> {
    match mode {
        Mode::Tcp => Box::new(TcpProbe),
        Mode::Udp => Box::new(UdpProbe),
        Mode::Http => Box::new(HttpProbe),
    }
}
