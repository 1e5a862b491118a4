use crate::bio::genetic_code::{self, Codon};
use crate::{BaseBuddyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A coding sequence in frame 0, the unit the optimizer mutates.
///
/// Construction validates the alphabet and the reading frame, so every
/// `SequenceModel` translates cleanly. The only mutation is
/// [`SequenceModel::swap_codon`], which refuses non-synonymous codons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceModel {
    pub id: String,
    pub description: Option<String>,
    nucleotides: Vec<u8>,
}

impl SequenceModel {
    pub fn new(id: impl Into<String>, nucleotides: impl AsRef<[u8]>) -> Result<Self> {
        let id = id.into();
        let nucleotides: Vec<u8> = nucleotides
            .as_ref()
            .iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase())
            .collect();

        if nucleotides.is_empty() {
            return Err(BaseBuddyError::InvalidInput(format!(
                "sequence '{}' is empty",
                id
            )));
        }
        if let Some(pos) = nucleotides
            .iter()
            .position(|b| !matches!(b, b'A' | b'C' | b'G' | b'T'))
        {
            return Err(BaseBuddyError::InvalidInput(format!(
                "sequence '{}' contains '{}' at position {}; only A, C, G, T are allowed",
                id, nucleotides[pos] as char, pos
            )));
        }
        if nucleotides.len() % 3 != 0 {
            return Err(BaseBuddyError::InvalidInput(format!(
                "sequence '{}' has length {}, which is not a multiple of 3",
                id,
                nucleotides.len()
            )));
        }

        Ok(Self {
            id,
            description: None,
            nucleotides,
        })
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn nucleotides(&self) -> &[u8] {
        &self.nucleotides
    }

    pub fn len(&self) -> usize {
        self.nucleotides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nucleotides.is_empty()
    }

    pub fn codon_count(&self) -> usize {
        self.nucleotides.len() / 3
    }

    pub fn codon(&self, index: usize) -> Codon {
        let start = index * 3;
        [
            self.nucleotides[start],
            self.nucleotides[start + 1],
            self.nucleotides[start + 2],
        ]
    }

    pub fn codons(&self) -> impl Iterator<Item = Codon> + '_ {
        self.nucleotides
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
    }

    /// Amino acid encoded at codon `index`
    pub fn amino_acid(&self, index: usize) -> u8 {
        // Construction guarantees every codon is ACGT, so translation cannot fail.
        genetic_code::translate_codon(&self.codon(index)).unwrap_or(b'X')
    }

    pub fn translation(&self) -> Vec<u8> {
        (0..self.codon_count()).map(|i| self.amino_acid(i)).collect()
    }

    /// Codon indices overlapping the nucleotide range `[start, end)`
    pub fn codons_overlapping(&self, start: usize, end: usize) -> std::ops::Range<usize> {
        let end = end.min(self.len());
        if start >= end {
            return 0..0;
        }
        (start / 3)..((end + 2) / 3)
    }

    /// Replace the codon at `index` with a synonymous codon, returning the
    /// codon that was there before.
    pub fn swap_codon(&mut self, index: usize, codon: Codon) -> Result<Codon> {
        if index >= self.codon_count() {
            return Err(BaseBuddyError::InvalidInput(format!(
                "codon index {} out of range for '{}' ({} codons)",
                index,
                self.id,
                self.codon_count()
            )));
        }
        let current = self.codon(index);
        let current_aa = genetic_code::translate_codon(&current);
        let new_aa = genetic_code::translate_codon(&codon);
        if new_aa.is_none() || new_aa != current_aa {
            return Err(BaseBuddyError::InvalidInput(format!(
                "{} is not synonymous with {} at codon {} of '{}'",
                String::from_utf8_lossy(&codon),
                String::from_utf8_lossy(&current),
                index,
                self.id
            )));
        }
        let start = index * 3;
        self.nucleotides[start..start + 3].copy_from_slice(&codon);
        Ok(current)
    }

    pub fn as_str(&self) -> &str {
        // ASCII-only by construction
        std::str::from_utf8(&self.nucleotides).unwrap_or_default()
    }
}

impl fmt::Display for SequenceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_case_and_whitespace() {
        let seq = SequenceModel::new("gene", "atg agt\nagt").unwrap();
        assert_eq!(seq.as_str(), "ATGAGTAGT");
        assert_eq!(seq.codon_count(), 3);
        assert_eq!(seq.translation(), b"MSS".to_vec());
    }

    #[test]
    fn test_rejects_bad_length() {
        let err = SequenceModel::new("gene", "ATGA").unwrap_err();
        match err {
            BaseBuddyError::InvalidInput(msg) => assert!(msg.contains("multiple of 3")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_symbols() {
        let err = SequenceModel::new("gene", "ATGNNN").unwrap_err();
        match err {
            BaseBuddyError::InvalidInput(msg) => assert!(msg.contains("'N' at position 3")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert!(SequenceModel::new("gene", "").is_err());
    }

    #[test]
    fn test_swap_codon_synonymous() {
        let mut seq = SequenceModel::new("gene", "ATGAGTAGT").unwrap();
        let previous = seq.swap_codon(1, *b"TCC").unwrap();
        assert_eq!(&previous, b"AGT");
        assert_eq!(seq.as_str(), "ATGTCCAGT");
        assert_eq!(seq.translation(), b"MSS".to_vec());
    }

    #[test]
    fn test_swap_codon_rejects_non_synonymous() {
        let mut seq = SequenceModel::new("gene", "ATGAGTAGT").unwrap();
        assert!(seq.swap_codon(0, *b"CTG").is_err());
        assert!(seq.swap_codon(1, *b"AGA").is_err());
        assert!(seq.swap_codon(5, *b"AGC").is_err());
        assert_eq!(seq.as_str(), "ATGAGTAGT");
    }

    #[test]
    fn test_codons_overlapping() {
        let seq = SequenceModel::new("gene", "ATGAGTAGTAAA").unwrap();
        assert_eq!(seq.codons_overlapping(0, 3), 0..1);
        assert_eq!(seq.codons_overlapping(2, 4), 0..2);
        assert_eq!(seq.codons_overlapping(4, 12), 1..4);
        assert_eq!(seq.codons_overlapping(10, 40), 3..4);
        assert_eq!(seq.codons_overlapping(5, 5), 0..0);
    }
}
