//! Binary entrypoint for the `specwright` CLI.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use specwright::cli::Cli;
use specwright::commands::{self, Workspace};
use specwright::config::Config;
use specwright::context::ServiceContext;

fn main() -> ExitCode {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let ctx = ServiceContext::live();
    let env = |key: &str| std::env::var(key).ok();
    let config = match Config::load(ctx.fs.as_ref(), cli.config.as_deref(), env) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref());

    let ws = match Workspace::open(ctx, config) {
        Ok(ws) => ws,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    match commands::dispatch(&cli.command, &ws) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber.
///
/// Level priority: `--log-level` > config `log_level` (or `SPECWRIGHT_LOG`) >
/// `RUST_LOG` > `warn`.
fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) {
    let filter = match cli_log_level.or(config_log_level) {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Warning: unknown log level '{level}', using warn");
            EnvFilter::new("warn")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
