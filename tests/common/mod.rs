//! Common test utilities for BaseBuddy tests
//!
//! Fixtures for codon databases, FASTA inputs and usage tables shared by
//! the integration tests.

use basebuddy::bio::genetic_code::{self, Codon};
use basebuddy::usage::CodonUsageTable;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// E. coli K-12 taxid used throughout the tests
#[allow(dead_code)]
pub const ECOLI: u32 = 83333;
#[allow(dead_code)]
pub const HUMAN: u32 = 9606;

/// Test environment that owns a temporary directory
pub struct TestEnvironment {
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestEnvironment {
    pub fn new() -> Self {
        TestEnvironment {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// Codon database with an E. coli row preferring AGC/AAG/GCT and a
    /// human row preferring TCT/AAA/GCC
    pub fn codon_database(&self) -> PathBuf {
        let rows: Vec<(u32, &str, u64, Vec<(&str, u64)>)> = vec![
            (
                ECOLI,
                "Escherichia coli K-12",
                4000,
                vec![("AGC", 80), ("AAG", 60), ("GCT", 70), ("GAA", 50)],
            ),
            // Smaller duplicate row that must be ignored
            (ECOLI, "Escherichia coli K-12", 10, vec![("AGT", 500)]),
            (
                HUMAN,
                "Homo sapiens",
                90000,
                vec![("TCT", 80), ("AAA", 60), ("GCC", 70), ("GAG", 50)],
            ),
        ];
        write_database(&self.path("codons.tsv"), &rows);
        self.path("codons.tsv")
    }
}

/// Write a TSV codon database. Codons not listed in a row get a count of 10.
pub fn write_database(path: &Path, rows: &[(u32, &str, u64, Vec<(&str, u64)>)]) {
    let codons: Vec<String> = genetic_code::all_codons()
        .map(|(_, c)| String::from_utf8_lossy(c).to_string())
        .collect();
    let mut out = format!("Taxid\tSpecies\t# CDS\t{}\n", codons.join("\t"));
    for (taxid, species, cds, overrides) in rows {
        let values: Vec<String> = codons
            .iter()
            .map(|c| {
                overrides
                    .iter()
                    .find(|(name, _)| *name == c.as_str())
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_else(|| "10".to_string())
            })
            .collect();
        out.push_str(&format!("{}\t{}\t{}\t{}\n", taxid, species, cds, values.join("\t")));
    }
    std::fs::write(path, out).expect("Failed to write codon database");
}

/// Usage table with every codon counted 10 times except `overrides`
#[allow(dead_code)]
pub fn table_with(overrides: &[(&[u8; 3], f64)]) -> Arc<CodonUsageTable> {
    let mut counts: BTreeMap<Codon, f64> = genetic_code::all_codons()
        .map(|(_, codon)| (*codon, 10.0))
        .collect();
    for (codon, count) in overrides {
        counts.insert(**codon, *count);
    }
    Arc::new(CodonUsageTable::from_counts(&counts).expect("valid counts"))
}

/// A gene-like sequence built from a protein, using the first synonym of
/// every amino acid
#[allow(dead_code)]
pub fn back_translate(protein: &[u8]) -> String {
    protein
        .iter()
        .map(|&aa| String::from_utf8_lossy(genetic_code::synonymous_codons(aa)[0]).to_string())
        .collect()
}
