use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use pulse_cli::cli::{init_logging, resolve, Cli};
use pulse_cli::{CONFIG_ERROR_EXIT, NAME, VERSION};

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", NAME, e);
            return ExitCode::from(CONFIG_ERROR_EXIT);
        }
    };

    init_logging(config.verbose);
    info!("{}:{} (pulse {})", NAME, VERSION, pulse::VERSION);

    let outcome = pulse::check(&config);

    if let Err(e) = pulse::report(&outcome, config.silent, &mut std::io::stdout().lock()) {
        error!("Failed to write result: {}", e);
    }

    ExitCode::from(outcome.exit_code())
}
