use crate::bio::genetic_code::{self, Codon, AMINO_ACIDS};
use crate::{BaseBuddyError, Result};
use std::collections::BTreeMap;

/// Tolerance used when checking that synonymous frequencies sum to one
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// Per-organism codon usage: for each amino acid, the relative frequency of
/// each of its synonymous codons. Frequencies of one amino acid sum to 1.
///
/// Immutable once built; the optimizer only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct CodonUsageTable {
    label: Option<String>,
    frequencies: BTreeMap<Codon, f64>,
}

impl CodonUsageTable {
    /// Build a table from raw per-codon observation counts.
    ///
    /// `frequency(codon) = count(codon) / sum(count(c) for c synonymous)`.
    /// An amino acid whose synonyms were never observed gets a uniform
    /// distribution.
    pub fn from_counts(counts: &BTreeMap<Codon, f64>) -> Result<Self> {
        let mut frequencies = BTreeMap::new();

        for &aa in AMINO_ACIDS.iter() {
            let synonyms = genetic_code::synonymous_codons(aa);
            let mut observed = Vec::with_capacity(synonyms.len());
            for codon in synonyms {
                let count = counts.get(*codon).copied().ok_or_else(|| {
                    BaseBuddyError::InvalidInput(format!(
                        "codon count table is missing {}",
                        String::from_utf8_lossy(*codon)
                    ))
                })?;
                if !count.is_finite() || count < 0.0 {
                    return Err(BaseBuddyError::InvalidInput(format!(
                        "invalid count {} for codon {}",
                        count,
                        String::from_utf8_lossy(*codon)
                    )));
                }
                observed.push((**codon, count));
            }

            let total: f64 = observed.iter().map(|(_, c)| c).sum();
            if total == 0.0 {
                tracing::warn!(
                    "No observations for amino acid '{}', using uniform codon usage",
                    aa as char
                );
            }
            for (codon, count) in observed {
                let freq = if total > 0.0 {
                    count / total
                } else {
                    1.0 / synonyms.len() as f64
                };
                frequencies.insert(codon, freq);
            }
        }

        Ok(Self {
            label: None,
            frequencies,
        })
    }

    /// Build a table from amino acid -> codon -> frequency entries, checking
    /// that every codon belongs to the amino acid it is listed under and
    /// that each amino acid is normalized.
    pub fn from_frequencies(entries: &BTreeMap<u8, BTreeMap<Codon, f64>>) -> Result<Self> {
        let mut frequencies = BTreeMap::new();

        for &aa in AMINO_ACIDS.iter() {
            let codons = entries.get(&aa).ok_or_else(|| {
                BaseBuddyError::InvalidInput(format!("missing amino acid '{}'", aa as char))
            })?;
            for (codon, freq) in codons {
                if genetic_code::translate_codon(codon) != Some(aa) {
                    return Err(BaseBuddyError::InvalidInput(format!(
                        "codon {} does not encode '{}'",
                        String::from_utf8_lossy(codon),
                        aa as char
                    )));
                }
                frequencies.insert(*codon, *freq);
            }
            for codon in genetic_code::synonymous_codons(aa) {
                if !codons.contains_key(*codon) {
                    return Err(BaseBuddyError::InvalidInput(format!(
                        "missing codon {} for '{}'",
                        String::from_utf8_lossy(*codon),
                        aa as char
                    )));
                }
            }
        }

        let table = Self {
            label: None,
            frequencies,
        };
        if let Some(aa) = table.unnormalized_amino_acid() {
            return Err(BaseBuddyError::InvalidInput(format!(
                "frequencies for '{}' sum to {:.6}, expected 1.0",
                aa as char,
                table.amino_acid_total(aa)
            )));
        }
        Ok(table)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn frequency(&self, codon: &Codon) -> f64 {
        self.frequencies.get(codon).copied().unwrap_or(0.0)
    }

    pub fn amino_acid_total(&self, aa: u8) -> f64 {
        genetic_code::synonymous_codons(aa)
            .iter()
            .map(|codon| self.frequency(codon))
            .sum()
    }

    /// First amino acid whose frequencies do not sum to 1
    pub fn unnormalized_amino_acid(&self) -> Option<u8> {
        AMINO_ACIDS
            .iter()
            .copied()
            .find(|&aa| (self.amino_acid_total(aa) - 1.0).abs() > NORMALIZATION_TOLERANCE)
    }

    /// Synonyms of `aa` from most to least used. Ties keep alphabetical
    /// codon order.
    pub fn ranked_synonyms(&self, aa: u8) -> Vec<(Codon, f64)> {
        let mut ranked: Vec<(Codon, f64)> = genetic_code::synonymous_codons(aa)
            .iter()
            .map(|codon| (**codon, self.frequency(codon)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// The single highest-frequency codon for `aa`
    pub fn best_codon(&self, aa: u8) -> Option<Codon> {
        self.ranked_synonyms(aa).first().map(|(codon, _)| *codon)
    }

    /// Frequency of `codon` relative to the most used synonym (1.0 for the
    /// best codon)
    pub fn relative_adaptiveness(&self, codon: &Codon) -> f64 {
        let Some(aa) = genetic_code::translate_codon(codon) else {
            return 0.0;
        };
        let max = genetic_code::synonymous_codons(aa)
            .iter()
            .map(|c| self.frequency(c))
            .fold(0.0_f64, f64::max);
        if max > 0.0 {
            self.frequency(codon) / max
        } else {
            1.0
        }
    }

    /// Usage rank of `codon` among its synonyms scaled to [0, 1]: 0 for the
    /// most used codon, 1 for the least used. Amino acids with a single
    /// codon always rank 0.
    pub fn normalized_rank(&self, codon: &Codon) -> f64 {
        let Some(aa) = genetic_code::translate_codon(codon) else {
            return 0.0;
        };
        let ranked = self.ranked_synonyms(aa);
        if ranked.len() < 2 {
            return 0.0;
        }
        let position = ranked
            .iter()
            .position(|(c, _)| c == codon)
            .unwrap_or(ranked.len() - 1);
        position as f64 / (ranked.len() - 1) as f64
    }

    /// Nested `aa -> codon -> frequency` view with string keys, used for
    /// display and JSON output.
    pub fn to_nested_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut nested: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (aa, codon) in genetic_code::all_codons() {
            nested
                .entry((aa as char).to_string())
                .or_default()
                .insert(String::from_utf8_lossy(codon).to_string(), self.frequency(codon));
        }
        nested
    }
}
