use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use figment::providers::Serialized;
use pulse::{CheckConfig, PulseConfig, PulseError};
use serde::Serialize;

/// Verbose output covers both crates, everything else stays at warn
const VERBOSE_FILTER: &str = "pulse=info,pulse_cli=info";
const QUIET_FILTER: &str = "warn";

/// Single-shot TCP, UDP and HTTP health check.
///
/// Prints OK and exits 0 when the target is reachable, prints FAIL and exits 1 when it is not.
/// Values are taken from the flags, then PULSE_* environment variables, then the config file,
/// then built in defaults.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Sets a custom config file (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Mode: 'tcp', 'udp', or 'http' [default: tcp]
    #[arg(long)]
    pub mode: Option<String>,

    /// Host to check [default: localhost]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to check, 1-65535 [default: 80]
    #[arg(long, allow_negative_numbers = true)]
    pub port: Option<i64>,

    /// Timeout for the check eg 500ms, 5s, 1m [default: 5s]
    #[arg(long)]
    pub timeout: Option<String>,

    /// Silent mode (no output)
    #[arg(long)]
    pub silent: bool,

    /// Verbose mode (debug output)
    #[arg(long)]
    pub verbose: bool,

    /// HTTP path (for http mode) [default: /]
    #[arg(long)]
    pub path: Option<String>,

    /// HTTP method (for http mode): GET, POST, PUT, DELETE, HEAD, OPTIONS or PATCH [default: GET]
    #[arg(long)]
    pub method: Option<String>,
}

/// Flags given on the command line, merged over every other configuration source
#[derive(Serialize, Debug, Default, PartialEq)]
struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    silent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verbose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
}

impl From<&Cli> for FlagOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            mode: cli.mode.clone(),
            host: cli.host.clone(),
            port: cli.port,
            timeout: cli.timeout.clone(),
            // A bool flag can only switch on, absence leaves lower layers in charge
            silent: cli.silent.then_some(true),
            verbose: cli.verbose.then_some(true),
            path: cli.path.clone(),
            method: cli.method.clone(),
        }
    }
}

/// Resolve and validate the configuration for this invocation
pub fn resolve(cli: &Cli) -> Result<CheckConfig, PulseError> {
    let raw: PulseConfig = PulseConfig::figment(cli.config.as_deref())?
        .merge(Serialized::defaults(FlagOverrides::from(cli)))
        .extract()?;

    CheckConfig::try_from(raw)
}

/// Initialise logging to stderr. RUST_LOG still wins when set.
pub fn init_logging(verbose: bool) {
    let filter = if verbose { VERBOSE_FILTER } else { QUIET_FILTER };
    let log_level = Env::default().default_filter_or(filter);
    env_logger::Builder::from_env(log_level).init();
}
