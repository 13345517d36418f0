//! `sodium` — command-line entry point for the cipher service.
//!
//! Startup sequence:
//! 1. Parse command-line arguments.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Build the [`CipherService`] from the configured default key.
//! 5. Run the command and print its output on stdout.

mod commands;
mod config;
mod telemetry;

use std::process::ExitCode;

use anyhow::Result;
use cipher_svc::CipherService;
use clap::Parser;
use tracing::debug;

use commands::Cli;
use config::Config;

fn main() -> Result<ExitCode> {
    // -----------------------------------------------------------------------
    // 1. Arguments
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        default_key_configured = cfg.app_key.is_some(),
        "sodium starting"
    );

    // -----------------------------------------------------------------------
    // 4. Cipher service
    // -----------------------------------------------------------------------
    let service = CipherService::from_source(&cfg);

    // -----------------------------------------------------------------------
    // 5. Command
    // -----------------------------------------------------------------------
    match commands::execute(&service, cli.command) {
        Ok(output) if cli.json => {
            println!("{}", serde_json::to_string(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(output) => {
            println!("{}", output.text());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if cli.json => {
            println!("{}", serde_json::to_string(&err)?);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(anyhow::anyhow!("{} ({})", err.message, err.code)),
    }
}
