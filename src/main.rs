use basebuddy::cli::{Cli, Commands};
use basebuddy::BaseBuddyError;
use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // BASEBUDDY_LOG wins; otherwise -v raises the default level
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let log_level = std::env::var("BASEBUDDY_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<BaseBuddyError>() {
            Some(BaseBuddyError::Configuration(_)) => 2,
            Some(BaseBuddyError::Io(_)) => 3,
            Some(BaseBuddyError::Parse(_)) | Some(BaseBuddyError::InvalidInput(_)) => 4,
            Some(BaseBuddyError::UnsatisfiableConstraints { .. }) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Recode(mut args) => {
            args.quiet = cli.quiet;
            basebuddy::cli::commands::recode::run(args)
        }
        Commands::Table(args) => basebuddy::cli::commands::table::run(args),
        Commands::Config(mut args) => {
            args.quiet = cli.quiet;
            basebuddy::cli::commands::config::run(args)
        }
    }
}
