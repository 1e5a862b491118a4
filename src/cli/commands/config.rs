use crate::cli::formatter::print_success;
use crate::core::config::{default_config, save_config};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the default configuration to FILE instead of printing it
    #[arg(long, value_name = "FILE")]
    pub write: Option<PathBuf>,

    /// Passed from the global --quiet flag
    #[arg(skip)]
    pub quiet: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = default_config();
    match &args.write {
        Some(path) => {
            save_config(path, &config)?;
            if !args.quiet {
                print_success(&format!("Wrote default configuration to {}", path.display()));
            }
        }
        None => print!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}
