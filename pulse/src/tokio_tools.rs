//! Module to drive a single async check from synchronous code
//!
//! Probes are written against tokio networking. run_in_tokio creates a current thread runtime and
//! blocks on the future so the check as a whole stays single threaded and synchronous for the caller.

use std::future::Future;

use log::debug;

use crate::error::PulseError;

/// run async function inside tokio instance on current thread
pub fn run_in_tokio<F, T>(my_function: F) -> Result<T, PulseError>
where
    F: Future<Output = Result<T, PulseError>>,
{
    debug!("starting Tokio");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let reply = rt.block_on(my_function);

    // A timed out name lookup may still occupy a blocking thread, do not wait on it
    rt.shutdown_background();
    reply
}
