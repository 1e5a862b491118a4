pub mod commands;
pub mod formatter;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "basebuddy",
    version,
    about = "Constraint-guided codon optimization",
    long_about = "BaseBuddy recodes protein-coding DNA for a target organism: it swaps \
                  synonymous codons until manufacturability constraints (homopolymers, \
                  restriction sites, GC content, hairpins, repeated k-mers) hold, then \
                  improves codon usage without breaking them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide progress bars and status messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recode the sequences of a FASTA file
    Recode(commands::recode::RecodeArgs),

    /// Show a codon usage table or search organisms in a codon database
    Table(commands::table::TableArgs),

    /// Print or write the default configuration
    Config(commands::config::ConfigArgs),
}
