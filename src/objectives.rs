//! Codon usage objectives
//!
//! An objective turns a sequence into a single score, higher is better.
//! The engine only ever compares scores of sequences with the same protein.

use crate::bio::genetic_code::{self, Codon, AMINO_ACIDS};
use crate::bio::sequence::SequenceModel;
use crate::usage::CodonUsageTable;
use crate::{BaseBuddyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodonOptimizationMethod {
    /// Highest-frequency synonym at every position
    #[default]
    UseBestCodon,
    /// Sequence-wide codon distribution close to the target table
    MatchCodonUsage,
    /// Per-position usage rank in the target matches the rank of the
    /// original codon in the source organism
    HarmonizeRca,
}

impl CodonOptimizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodonOptimizationMethod::UseBestCodon => "use_best_codon",
            CodonOptimizationMethod::MatchCodonUsage => "match_codon_usage",
            CodonOptimizationMethod::HarmonizeRca => "harmonize_rca",
        }
    }

    pub fn requires_source_table(&self) -> bool {
        matches!(self, CodonOptimizationMethod::HarmonizeRca)
    }
}

impl fmt::Display for CodonOptimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CodonOptimizationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "use_best_codon" => Ok(CodonOptimizationMethod::UseBestCodon),
            "match_codon_usage" => Ok(CodonOptimizationMethod::MatchCodonUsage),
            "harmonize_rca" => Ok(CodonOptimizationMethod::HarmonizeRca),
            _ => Err(format!(
                "Unknown method: {} (expected use_best_codon, match_codon_usage or harmonize_rca)",
                s
            )),
        }
    }
}

/// Scores a sequence against a target codon usage table
#[derive(Debug, Clone)]
pub struct CodonUsageObjective {
    method: CodonOptimizationMethod,
    target: Arc<CodonUsageTable>,
    source: Option<Arc<CodonUsageTable>>,
    /// Source-table rank of the input codon at each position
    source_ranks: Vec<f64>,
}

impl CodonUsageObjective {
    /// `original` is the unmodified input; `harmonize_rca` compares every
    /// position against the codon originally there.
    pub fn new(
        method: CodonOptimizationMethod,
        target: Arc<CodonUsageTable>,
        source: Option<Arc<CodonUsageTable>>,
        original: &SequenceModel,
    ) -> Result<Self> {
        let source_ranks = match (method, &source) {
            (CodonOptimizationMethod::HarmonizeRca, Some(source)) => original
                .codons()
                .map(|codon| source.normalized_rank(&codon))
                .collect(),
            (CodonOptimizationMethod::HarmonizeRca, None) => {
                return Err(BaseBuddyError::Configuration(
                    "harmonize_rca requires a source codon usage table".to_string(),
                ))
            }
            _ => Vec::new(),
        };
        Ok(Self {
            method,
            target,
            source,
            source_ranks,
        })
    }

    pub fn method(&self) -> CodonOptimizationMethod {
        self.method
    }

    pub fn target(&self) -> &CodonUsageTable {
        &self.target
    }

    pub fn source(&self) -> Option<&CodonUsageTable> {
        self.source.as_deref()
    }

    pub fn label(&self) -> String {
        let table = self.target.label().unwrap_or("target table");
        match self.source.as_ref().and_then(|s| s.label()) {
            Some(source) => format!("CodonOptimize(method={}, {} -> {})", self.method, source, table),
            None => format!("CodonOptimize(method={}, {})", self.method, table),
        }
    }

    pub fn score(&self, sequence: &SequenceModel) -> f64 {
        match self.method {
            CodonOptimizationMethod::UseBestCodon => self.mean_adaptiveness(sequence),
            CodonOptimizationMethod::MatchCodonUsage => self.usage_deviation(sequence),
            CodonOptimizationMethod::HarmonizeRca => self.rank_mismatch(sequence),
        }
    }

    fn mean_adaptiveness(&self, sequence: &SequenceModel) -> f64 {
        let n = sequence.codon_count();
        if n == 0 {
            return 0.0;
        }
        let total: f64 = sequence
            .codons()
            .map(|codon| self.target.relative_adaptiveness(&codon))
            .sum();
        total / n as f64
    }

    /// Negative squared distance between the observed synonymous codon
    /// frequencies and the table, weighted by amino acid abundance
    fn usage_deviation(&self, sequence: &SequenceModel) -> f64 {
        let n = sequence.codon_count();
        if n == 0 {
            return 0.0;
        }
        let mut codon_counts: HashMap<Codon, usize> = HashMap::new();
        for codon in sequence.codons() {
            *codon_counts.entry(codon).or_default() += 1;
        }

        let mut deviation = 0.0;
        for &aa in AMINO_ACIDS.iter() {
            let synonyms = genetic_code::synonymous_codons(aa);
            let aa_count: usize = synonyms
                .iter()
                .map(|c| codon_counts.get(*c).copied().unwrap_or(0))
                .sum();
            if aa_count == 0 {
                continue;
            }
            let squared: f64 = synonyms
                .iter()
                .map(|c| {
                    let observed = codon_counts.get(*c).copied().unwrap_or(0) as f64 / aa_count as f64;
                    (observed - self.target.frequency(c)).powi(2)
                })
                .sum();
            deviation += aa_count as f64 / n as f64 * squared;
        }
        -deviation
    }

    fn rank_mismatch(&self, sequence: &SequenceModel) -> f64 {
        -sequence
            .codons()
            .zip(&self.source_ranks)
            .map(|(codon, source_rank)| (self.target.normalized_rank(&codon) - source_rank).abs())
            .sum::<f64>()
    }
}
