use async_trait::async_trait;
use log::info;
use reqwest::StatusCode;
use url::Url;

use crate::config::CheckConfig;
use crate::error::PulseError;

use super::Probe;

/// User-Agent sent with every request
pub const USER_AGENT: &str = "Pulse/1.0";

/// Healthy when a single request to the target answers with a 2xx or 3xx status.
///
/// The timeout covers the whole exchange including reading the body, which is drained chunk by
/// chunk and discarded so the connection closes cleanly. `HTTP_PROXY`, `HTTPS_PROXY` and
/// `NO_PROXY` from the environment are honoured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProbe;

/// Build `scheme://host:port/path` for the check.
///
/// The scheme is https exactly when the port is 443. This is a convention, no TLS negotiation is
/// attempted on other ports.
pub fn target_url(config: &CheckConfig) -> Result<Url, PulseError> {
    let scheme = if config.port == 443 { "https" } else { "http" };
    let url = format!(
        "{}://{}:{}{}",
        scheme, config.host, config.port, config.path
    );

    Url::parse(&url).map_err(|source| PulseError::UrlError { url, source })
}

/// 2xx and 3xx count as healthy
pub fn is_healthy_status(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn check(&self, config: &CheckConfig) -> Result<bool, PulseError> {
        info!(
            "Checking HTTP {} request to {}:{}{}",
            config.method, config.host, config.port, config.path
        );

        let (client, request) = match build_request(config) {
            Ok(built) => built,
            Err(e) => {
                info!("Failed to create HTTP request: {}", e);
                return Err(e);
            }
        };

        let mut response = match client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                info!("HTTP request failed: {}", e);
                return Ok(false);
            }
        };

        let status = response.status();
        loop {
            match response.chunk().await {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    info!("Warning: failed to read response body: {}", e);
                    break;
                }
            }
        }

        info!("HTTP request successful, status: {}", status.as_u16());
        Ok(is_healthy_status(status))
    }
}

/// Everything that can fail before the network is touched
fn build_request(
    config: &CheckConfig,
) -> Result<(reqwest::Client, reqwest::Request), PulseError> {
    let url = target_url(config)?;

    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .build()?;
    let request = client.request(config.method.into(), url).build()?;

    Ok((client, request))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;
    use crate::config::{CheckConfigBuilder, HttpMethod, Mode};

    fn config(host: &str, port: u16) -> CheckConfig {
        CheckConfigBuilder::default()
            .mode(Mode::Http)
            .host(host)
            .port(port)
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    /// Answer one request with `status` and hand back the request head
    async fn respond_once(status: u16) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buffer = [0u8; 1024];
            while !head.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&buffer[..read]);
            }

            let reply = format!(
                "HTTP/1.1 {} Pulse\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;

            String::from_utf8_lossy(&head).to_string()
        });

        (port, handle)
    }

    #[test]
    fn https_only_on_443() {
        let url = target_url(&config("example.com", 443)).unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.port_or_known_default(), Some(443));

        for port in [80, 8080, 8443] {
            let url = target_url(&config("example.com", port)).unwrap();
            assert_eq!(url.scheme(), "http");
            assert_eq!(url.port_or_known_default(), Some(port));
        }
    }

    #[test]
    fn url_includes_path() {
        let mut config = config("example.com", 8080);
        config.path = "/healthz?full=1".to_string();

        let url = target_url(&config).unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/healthz?full=1");
    }

    #[test]
    fn malformed_url_is_an_error() {
        let mut config = config("127.0.0.1", 8080);
        config.path = "health".to_string();

        assert!(matches!(
            target_url(&config),
            Err(PulseError::UrlError { .. })
        ));
    }

    #[test]
    fn healthy_status_range() {
        for code in 100..600u16 {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(is_healthy_status(status), (200..400).contains(&code));
        }
    }

    #[tokio::test]
    async fn success_statuses_are_healthy() {
        for status in [200, 204, 299, 302, 399] {
            let (port, responder) = respond_once(status).await;

            let reply = HttpProbe.check(&config("127.0.0.1", port)).await;
            assert!(reply.unwrap(), "status {} should be healthy", status);
            responder.await.unwrap();
        }
    }

    #[tokio::test]
    async fn failure_statuses_are_unhealthy() {
        for status in [400, 404, 500, 503] {
            let (port, responder) = respond_once(status).await;

            let reply = HttpProbe.check(&config("127.0.0.1", port)).await;
            assert!(!reply.unwrap(), "status {} should be unhealthy", status);
            responder.await.unwrap();
        }
    }

    #[tokio::test]
    async fn sends_method_path_and_user_agent() {
        let (port, responder) = respond_once(200).await;
        let mut config = config("127.0.0.1", port);
        config.method = HttpMethod::Post;
        config.path = "/status".to_string();

        assert!(HttpProbe.check(&config).await.unwrap());

        let head = responder.await.unwrap();
        assert!(head.starts_with("POST /status HTTP/1.1\r\n"), "{}", head);
        assert!(head
            .to_ascii_lowercase()
            .contains("user-agent: pulse/1.0\r\n"));
    }

    #[tokio::test]
    async fn head_request_is_supported() {
        let (port, responder) = respond_once(200).await;
        let mut config = config("127.0.0.1", port);
        config.method = HttpMethod::Head;

        assert!(HttpProbe.check(&config).await.unwrap());
        assert!(responder.await.unwrap().starts_with("HEAD / HTTP/1.1"));
    }

    #[tokio::test]
    async fn closed_port_is_unhealthy_not_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let reply = HttpProbe.check(&config("127.0.0.1", port)).await;
        assert!(!reply.unwrap());
    }

    #[tokio::test]
    async fn silent_server_times_out_unhealthy() {
        // Connections queue in the backlog and never get an answer
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = config("127.0.0.1", listener.local_addr().unwrap().port());
        config.timeout = Duration::from_millis(200);

        let started = Instant::now();
        let reply = HttpProbe.check(&config).await;

        assert!(!reply.unwrap());
        assert!(started.elapsed() < Duration::from_secs(1));
        drop(listener);
    }

    #[tokio::test]
    async fn unresolvable_host_is_unhealthy_not_error() {
        let reply = HttpProbe
            .check(&config("invalid-host-that-does-not-exist.invalid", 9999))
            .await;
        assert!(!reply.unwrap());
    }

    #[tokio::test]
    async fn malformed_request_is_error() {
        let mut config = config("127.0.0.1", 8080);
        config.path = "health".to_string();

        assert!(HttpProbe.check(&config).await.is_err());
    }
}
