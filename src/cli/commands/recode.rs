use crate::bio::fasta;
use crate::cli::formatter::{self, info_box, print_error, print_success, print_tip};
use crate::core::config::{load_config, Config};
use crate::core::recoder::{RecordOutcome, Recoder};
use crate::objectives::CodonOptimizationMethod;
use crate::report::{Format, ReportGenerator, ReportOptions};
use crate::usage::{CachedTableSource, TsvCodonDatabase};
use crate::BaseBuddyError;
use clap::Args;
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RecodeArgs {
    /// Input FASTA file with coding sequences
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Codon usage database (TSV with Taxid, Species, # CDS and codon count columns)
    #[arg(long, value_name = "FILE", env = "BASEBUDDY_CODON_DB")]
    pub codon_db: PathBuf,

    /// NCBI taxonomy id of the organism to optimize for
    #[arg(short = 't', long, value_name = "TAXID")]
    pub target_taxid: u32,

    /// Optimization method: use_best_codon, match_codon_usage or harmonize_rca
    #[arg(short, long)]
    pub method: Option<CodonOptimizationMethod>,

    /// Taxonomy id of the organism the sequence comes from (harmonize_rca)
    #[arg(short = 's', long, value_name = "TAXID")]
    pub source_taxid: Option<u32>,

    /// Longest allowed run of A
    #[arg(long, value_name = "N")]
    pub poly_a: Option<usize>,

    /// Longest allowed run of T
    #[arg(long, value_name = "N")]
    pub poly_t: Option<usize>,

    /// Longest allowed run of C
    #[arg(long, value_name = "N")]
    pub poly_c: Option<usize>,

    /// Longest allowed run of G
    #[arg(long, value_name = "N")]
    pub poly_g: Option<usize>,

    /// Hairpin stem size
    #[arg(long, value_name = "N")]
    pub hairpin_stem: Option<usize>,

    /// Window in which a hairpin stem may pair
    #[arg(long, value_name = "N")]
    pub hairpin_window: Option<usize>,

    /// Extra pattern to avoid (enzyme name, literal sequence or NxB run); repeatable
    #[arg(long = "avoid", value_name = "PATTERN")]
    pub avoid: Vec<String>,

    /// Random seed for the repair search
    #[arg(long)]
    pub seed: Option<u64>,

    /// Iteration budget of the constraint repair phase
    #[arg(long, value_name = "N")]
    pub max_iters: Option<usize>,

    /// Configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output FASTA file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a report (.txt, .json or .csv)
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Stop at the first record that cannot be recoded
    #[arg(long)]
    pub fail_fast: bool,

    /// Passed from the global --quiet flag
    #[arg(skip)]
    pub quiet: bool,
}

impl RecodeArgs {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> crate::Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        let constraints = &mut config.constraints;
        if let Some(n) = self.poly_a {
            constraints.homopolymer.a = n;
        }
        if let Some(n) = self.poly_t {
            constraints.homopolymer.t = n;
        }
        if let Some(n) = self.poly_c {
            constraints.homopolymer.c = n;
        }
        if let Some(n) = self.poly_g {
            constraints.homopolymer.g = n;
        }
        if let Some(n) = self.hairpin_stem {
            constraints.hairpin_stem_size = n;
        }
        if let Some(n) = self.hairpin_window {
            constraints.hairpin_window = n;
        }
        constraints.avoid_patterns.extend(self.avoid.iter().cloned());

        let optimization = &mut config.optimization;
        if let Some(method) = self.method {
            optimization.method = method;
        }
        if let Some(seed) = self.seed {
            optimization.seed = seed;
        }
        if let Some(n) = self.max_iters {
            optimization.max_random_iters = n;
        }
        if self.fail_fast {
            optimization.fail_fast = true;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: RecodeArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let chatty = !args.quiet && args.output.is_some();

    let records = fasta::parse_fasta(&args.input)?;
    if records.is_empty() {
        return Err(BaseBuddyError::InvalidInput(format!(
            "no sequences in {}",
            args.input.display()
        ))
        .into());
    }
    tracing::debug!("Read {} records from {}", records.len(), args.input.display());

    let tables = CachedTableSource::new(TsvCodonDatabase::new(&args.codon_db));
    let recoder = Recoder::from_source(config, &tables, args.target_taxid, args.source_taxid)?
        .with_silent(args.quiet);

    if chatty {
        let method = format!("Method: {}", recoder.method());
        let count = format!("Records: {}", formatter::format_number(records.len()));
        let target = format!("Target taxid: {}", args.target_taxid);
        info_box("Recoding", &[&method, &count, &target]);
    }

    let outcomes = recoder.recode_all(&records)?;

    let recoded: Vec<(String, String, String)> = outcomes
        .iter()
        .filter_map(RecordOutcome::recoding)
        .map(|r| {
            (
                r.id().to_string(),
                r.notes.clone(),
                r.recoded.as_str().to_string(),
            )
        })
        .collect();
    match &args.output {
        Some(path) => fasta::write_recodings(File::create(path)?, &recoded)?,
        None => fasta::write_recodings(std::io::stdout().lock(), &recoded)?,
    }

    if let Some(path) = &args.report {
        let generator = ReportGenerator::new(ReportOptions {
            format: Format::from_extension(path),
            include_details: true,
        });
        std::fs::write(path, generator.generate(&outcomes)?)?;
    }

    let failures: Vec<&RecordOutcome> = outcomes.iter().filter(|o| o.is_failed()).collect();
    if chatty {
        if let Some(path) = &args.output {
            print_success(&format!(
                "Recoded {} of {} records into {}",
                recoded.len(),
                records.len(),
                path.display()
            ));
        }
    }
    if !args.quiet {
        for outcome in &failures {
            if let RecordOutcome::Failed { id, error } = outcome {
                print_error(&format!("{}: {}", id, error));
            }
        }
    }

    // Surface the first failure so the exit code reflects its kind
    let Some(position) = outcomes.iter().position(|o| o.is_failed()) else {
        return Ok(());
    };
    if !args.quiet {
        print_tip("relax the homopolymer or hairpin limits, or raise --max-iters");
    }
    match outcomes.into_iter().nth(position) {
        Some(RecordOutcome::Failed { error, .. }) => Err(error.into()),
        _ => Ok(()),
    }
}
