use crate::bio::genetic_code;
use crate::cli::formatter::{print_section, print_warning};
use crate::usage::{CodonTableSource, CodonUsageTable, OrganismEntry, TsvCodonDatabase};
use crate::BaseBuddyError;
use clap::Args;
use colored::*;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Codon usage database
    #[arg(long, value_name = "FILE", env = "BASEBUDDY_CODON_DB")]
    pub codon_db: PathBuf,

    /// Taxonomy id whose table to print
    #[arg(short, long, value_name = "TAXID", required_unless_present = "search")]
    pub taxid: Option<u32>,

    /// List organisms whose label contains every word of TEXT
    #[arg(long, value_name = "TEXT", conflicts_with = "taxid")]
    pub search: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TableArgs) -> anyhow::Result<()> {
    let database = TsvCodonDatabase::new(&args.codon_db);

    if let Some(text) = &args.search {
        let matches = search_organisms(database.organisms()?, text);
        if args.json {
            let labels: Vec<String> = matches.iter().map(OrganismEntry::label).collect();
            println!("{}", serde_json::to_string_pretty(&labels)?);
        } else if matches.is_empty() {
            print_warning(&format!("No organism matches '{}'", text));
        } else {
            for entry in &matches {
                println!("{}", entry.label());
            }
        }
        return Ok(());
    }

    let taxid = args
        .taxid
        .ok_or_else(|| BaseBuddyError::InvalidInput("--taxid is required".to_string()))?;
    let table = database.table_for_taxon(taxid)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&table.to_nested_map())?);
    } else {
        print_table(&table);
    }
    Ok(())
}

/// Case-insensitive species name filter
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Organisms whose label (`Species (TaxID: N)`) contains every
/// whitespace-separated word of `text`, ignoring case
pub fn search_organisms(organisms: Vec<OrganismEntry>, text: &str) -> Vec<OrganismEntry> {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    organisms
        .into_iter()
        .filter(|entry| {
            let label = entry.label().to_lowercase();
            words.iter().all(|word| label.contains(word.as_str()))
        })
        .take(MAX_SEARCH_RESULTS)
        .collect()
}

fn print_table(table: &CodonUsageTable) {
    print_section(table.label().unwrap_or("Codon usage"));
    for &aa in genetic_code::AMINO_ACIDS.iter() {
        let best = table.best_codon(aa);
        let cells: Vec<String> = genetic_code::synonymous_codons(aa)
            .iter()
            .map(|codon| {
                let cell = format!(
                    "{} {:.3}",
                    String::from_utf8_lossy(*codon),
                    table.frequency(codon)
                );
                if best.as_ref() == Some(*codon) {
                    cell.green().bold().to_string()
                } else {
                    cell
                }
            })
            .collect();
        println!("  {}  {}", (aa as char).to_string().bold(), cells.join("  "));
    }
}
