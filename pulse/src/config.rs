use std::{fmt, path::Path, str::FromStr, time::Duration};

use derive_builder::Builder;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// Prefix for environment variables read into [PulseConfig]
pub const ENV_PREFIX: &str = "PULSE_";

/// Protocol used for a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Tcp,
    Udp,
    Http,
}

impl FromStr for Mode {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Mode::Tcp),
            "udp" => Ok(Mode::Udp),
            "http" => Ok(Mode::Http),
            _ => Err(PulseError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Tcp => "tcp",
            Mode::Udp => "udp",
            Mode::Http => "http",
        };
        write!(f, "{}", name)
    }
}

/// HTTP verbs accepted for http mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(PulseError::InvalidMethod(upper)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Layered settings as read from defaults, file, environment and flags.
///
/// Nothing here is validated. Convert to a [CheckConfig] before probing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PulseConfig {
    /// One of tcp, udp or http
    pub mode: String,
    /// Host to check
    pub host: String,
    /// Port to check. Signed and wide so out of range values can be reported
    pub port: i64,
    /// HTTP path (http mode only)
    pub path: String,
    /// HTTP method (http mode only)
    pub method: String,
    /// Timeout for the check eg "5s", "500ms", "1m30s"
    pub timeout: String,
    /// Suppress OK/FAIL output
    pub silent: bool,
    /// Emit diagnostic logging
    pub verbose: bool,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            mode: "tcp".to_string(),
            host: "localhost".to_string(),
            port: 80,
            path: "/".to_string(),
            method: "GET".to_string(),
            timeout: "5s".to_string(),
            silent: false,
            verbose: false,
        }
    }
}

impl PulseConfig {
    /// Layer the built in defaults, an optional YAML file and `PULSE_` prefixed
    /// environment variables. Callers merge their own flags on top.
    ///
    /// A config file that was asked for must exist, it is never searched for in parent directories.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, PulseError> {
        let mut figment = Figment::from(Serialized::defaults(PulseConfig::default()));
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(PulseError::ConfigFileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file_exact(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }
}

/// Validated, immutable configuration for exactly one check
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct CheckConfig {
    #[builder(setter(into))]
    pub mode: Mode,
    #[builder(setter(into))]
    pub host: String,
    pub port: u16,
    #[builder(setter(into))]
    pub path: String,
    pub method: HttpMethod,
    pub timeout: Duration,
    pub silent: bool,
    pub verbose: bool,
}

impl CheckConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.port {
            Some(0) => Err(PulseError::InvalidPort(0).to_string()),
            _ => Ok(()),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Tcp,
            host: "localhost".to_string(),
            port: 80,
            path: "/".to_string(),
            method: HttpMethod::Get,
            timeout: Duration::from_secs(5),
            silent: false,
            verbose: false,
        }
    }
}

impl CheckConfig {
    /// Target as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TryFrom<PulseConfig> for CheckConfig {
    type Error = PulseError;

    fn try_from(raw: PulseConfig) -> Result<Self, Self::Error> {
        let mode: Mode = raw.mode.parse()?;

        let port = u16::try_from(raw.port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or(PulseError::InvalidPort(raw.port))?;

        // The method only matters for http so a bad value elsewhere is ignored
        let method: HttpMethod = match mode {
            Mode::Http => raw.method.parse()?,
            Mode::Tcp | Mode::Udp => raw.method.parse().unwrap_or_default(),
        };

        let timeout = parse_duration(&raw.timeout)?;
        if timeout.is_zero() {
            return Err(PulseError::InvalidTimeout(raw.timeout));
        }

        Ok(CheckConfig {
            mode,
            host: raw.host,
            port,
            path: raw.path,
            method,
            timeout,
            silent: raw.silent,
            verbose: raw.verbose,
        })
    }
}

/// Parse a duration in the style of "300ms", "1.5s" or "2h45m".
///
/// Every number needs a unit from ns, us (or µs), ms, s, m and h. The only unitless value is "0".
pub fn parse_duration(s: &str) -> Result<Duration, PulseError> {
    let invalid = || PulseError::InvalidTimeout(s.to_string());

    let trimmed = s.trim();
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut total = 0f64;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1f64,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total += value * nanos_per_unit;
    }

    if !total.is_finite() || total > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total.round() as u64))
}
