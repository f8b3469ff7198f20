use std::{fmt, io::Write};

use log::info;

use crate::{
    config::{CheckConfig, Mode},
    error::PulseError,
    probe::probe_for,
    tokio_tools::run_in_tokio,
};

/// Result of one invocation as seen by the caller
#[derive(Debug)]
pub enum CheckOutcome {
    /// Target reachable
    Healthy,
    /// Target unreachable, for whatever reason
    Unhealthy,
    /// The check could not even be attempted
    Error(PulseError),
}

impl CheckOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckOutcome::Healthy => 0,
            CheckOutcome::Unhealthy | CheckOutcome::Error(_) => 1,
        }
    }

    /// Text printed for this outcome when not silent
    pub fn label(&self) -> Option<&'static str> {
        match self {
            CheckOutcome::Healthy => Some("OK"),
            CheckOutcome::Unhealthy => Some("FAIL"),
            CheckOutcome::Error(_) => None,
        }
    }
}

impl From<Result<bool, PulseError>> for CheckOutcome {
    fn from(reply: Result<bool, PulseError>) -> Self {
        match reply {
            Ok(true) => CheckOutcome::Healthy,
            Ok(false) => CheckOutcome::Unhealthy,
            Err(e) => CheckOutcome::Error(e),
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Healthy => write!(f, "healthy"),
            CheckOutcome::Unhealthy => write!(f, "unhealthy"),
            CheckOutcome::Error(e) => write!(f, "error: {}", e),
        }
    }
}

/// Run the probe selected by the configured mode exactly once
pub fn check(config: &CheckConfig) -> CheckOutcome {
    info!("Pulse healthcheck tool starting...");
    info!("Mode: {}", config.mode);
    info!("Target: {}", config.address());
    if config.mode == Mode::Http {
        info!("Path: {}", config.path);
        info!("Method: {}", config.method);
    }

    let probe = probe_for(config.mode);
    let outcome = CheckOutcome::from(run_in_tokio(probe.check(config)));

    if let CheckOutcome::Error(e) = &outcome {
        info!("Error: {}", e);
    }
    outcome
}

/// Write OK or FAIL for the outcome unless silent. Errors print nothing.
pub fn report<W: Write>(outcome: &CheckOutcome, silent: bool, out: &mut W) -> std::io::Result<()> {
    if silent {
        return Ok(());
    }
    match outcome.label() {
        Some(label) => writeln!(out, "{}", label),
        None => Ok(()),
    }
}
