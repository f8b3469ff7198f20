use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, info};
use tokio::{
    net::{lookup_host, UdpSocket},
    time::timeout,
};

use crate::config::CheckConfig;
use crate::error::PulseError;

use super::Probe;

/// Datagram sent to the target
pub const PROBE_PAYLOAD: &[u8] = b"PING";

/// How long to wait for an optional reply. Deliberately independent of the configured timeout.
pub const RESPONSE_WAIT: Duration = Duration::from_millis(100);

/// Best effort UDP reachability.
///
/// UDP has no handshake so the only signal of a closed or unreachable destination is an immediate
/// error from the OS when sending. The probe is healthy when [PROBE_PAYLOAD] is sent without such an
/// error, reply or not. Anything that silently drops the datagram (a firewall without ICMP
/// rejection, a host that is down on the local segment) is therefore reported healthy.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpProbe;

#[async_trait]
impl Probe for UdpProbe {
    fn name(&self) -> &'static str {
        "udp"
    }

    async fn check(&self, config: &CheckConfig) -> Result<bool, PulseError> {
        info!(
            "Checking UDP connection to {}:{}",
            config.host, config.port
        );

        let socket = match timeout(config.timeout, connect(config)).await {
            Ok(Ok(socket)) => socket,
            Ok(Err(e)) => {
                info!("UDP connection failed: {}", e);
                return Ok(false);
            }
            Err(_) => {
                info!("UDP connection failed: timed out after {:?}", config.timeout);
                return Ok(false);
            }
        };

        match timeout(config.timeout, socket.send(PROBE_PAYLOAD)).await {
            Ok(Ok(sent)) => debug!("sent {} byte UDP probe", sent),
            Ok(Err(e)) => {
                info!("Failed to send UDP probe: {}", e);
                return Ok(false);
            }
            Err(_) => {
                info!("Failed to send UDP probe: timed out after {:?}", config.timeout);
                return Ok(false);
            }
        }

        // Many UDP services ignore unsolicited datagrams so a reply is not required
        let mut buffer = [0u8; 1024];
        match timeout(RESPONSE_WAIT, socket.recv(&mut buffer)).await {
            Ok(Ok(received)) => {
                info!(
                    "UDP probe sent successfully, response received ({} bytes)",
                    received
                )
            }
            Ok(Err(e)) => {
                info!("UDP probe sent successfully, no response received: {}", e)
            }
            Err(_) => info!(
                "UDP probe sent successfully, no response received (this is normal for many UDP services)"
            ),
        }

        info!("UDP connection successful");
        Ok(true)
    }
}

/// Resolve the target and connect an ephemeral socket to the first address that accepts it
async fn connect(config: &CheckConfig) -> io::Result<UdpSocket> {
    let mut last_error = None;

    for addr in lookup_host((config.host.as_str(), config.port)).await? {
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let attempt = async {
            let socket = UdpSocket::bind(local).await?;
            socket.connect(addr).await?;
            Ok::<_, io::Error>(socket)
        };
        match attempt.await {
            Ok(socket) => return Ok(socket),
            Err(e) => {
                debug!("UDP connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses found for {}", config.host),
        )
    }))
}
