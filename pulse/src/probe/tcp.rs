use async_trait::async_trait;
use log::info;
use tokio::{net::TcpStream, time::timeout};

use crate::config::CheckConfig;
use crate::error::PulseError;

use super::Probe;

/// Healthy when a TCP connection is established within the timeout.
///
/// Name resolution counts against the timeout. No data is exchanged and the stream is dropped as
/// soon as it connects.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

#[async_trait]
impl Probe for TcpProbe {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn check(&self, config: &CheckConfig) -> Result<bool, PulseError> {
        info!(
            "Checking TCP connection to {}:{}",
            config.host, config.port
        );

        let connect = TcpStream::connect((config.host.as_str(), config.port));
        match timeout(config.timeout, connect).await {
            Ok(Ok(stream)) => {
                drop(stream);
                info!("TCP connection successful");
                Ok(true)
            }
            Ok(Err(e)) => {
                info!("TCP connection failed: {}", e);
                Ok(false)
            }
            Err(_) => {
                info!("TCP connection failed: timed out after {:?}", config.timeout);
                Ok(false)
            }
        }
    }
}
