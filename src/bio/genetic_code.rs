//! Standard genetic code (NCBI translation table 1)
//!
//! Codons are handled as uppercase `[u8; 3]` over `ACGT`. Every one of the
//! 64 codons maps to exactly one amino acid symbol, with `*` for stop.

pub type Codon = [u8; 3];

/// Symbol used for stop codons
pub const STOP: u8 = b'*';

/// Amino acid symbols (20 standard + stop) in table order
pub const AMINO_ACIDS: [u8; 21] = *b"*ACDEFGHIKLMNPQRSTVWY";

/// Amino acids indexed by `16 * b1 + 4 * b2 + b3` with T=0, C=1, A=2, G=3
const TRANSLATION_TABLE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

// Synonym sets in alphabetical codon order. This order is also the
// tie-break order wherever two codons score the same.
static SYNONYMS: [(u8, &[&Codon]); 21] = [
    (b'*', &[b"TAA", b"TAG", b"TGA"]),
    (b'A', &[b"GCA", b"GCC", b"GCG", b"GCT"]),
    (b'C', &[b"TGC", b"TGT"]),
    (b'D', &[b"GAC", b"GAT"]),
    (b'E', &[b"GAA", b"GAG"]),
    (b'F', &[b"TTC", b"TTT"]),
    (b'G', &[b"GGA", b"GGC", b"GGG", b"GGT"]),
    (b'H', &[b"CAC", b"CAT"]),
    (b'I', &[b"ATA", b"ATC", b"ATT"]),
    (b'K', &[b"AAA", b"AAG"]),
    (b'L', &[b"CTA", b"CTC", b"CTG", b"CTT", b"TTA", b"TTG"]),
    (b'M', &[b"ATG"]),
    (b'N', &[b"AAC", b"AAT"]),
    (b'P', &[b"CCA", b"CCC", b"CCG", b"CCT"]),
    (b'Q', &[b"CAA", b"CAG"]),
    (b'R', &[b"AGA", b"AGG", b"CGA", b"CGC", b"CGG", b"CGT"]),
    (b'S', &[b"AGC", b"AGT", b"TCA", b"TCC", b"TCG", b"TCT"]),
    (b'T', &[b"ACA", b"ACC", b"ACG", b"ACT"]),
    (b'V', &[b"GTA", b"GTC", b"GTG", b"GTT"]),
    (b'W', &[b"TGG"]),
    (b'Y', &[b"TAC", b"TAT"]),
];

#[inline]
fn base_index(base: u8) -> Option<usize> {
    match base {
        b'T' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// Translate a single codon. Returns `None` for anything that is not
/// three uppercase `ACGT` bases.
pub fn translate_codon(codon: &[u8]) -> Option<u8> {
    if codon.len() != 3 {
        return None;
    }
    let idx = base_index(codon[0])? * 16 + base_index(codon[1])? * 4 + base_index(codon[2])?;
    Some(TRANSLATION_TABLE[idx])
}

/// Translate a nucleotide sequence in frame 0. Trailing bases that do not
/// form a full codon are ignored.
pub fn translate(sequence: &[u8]) -> Option<Vec<u8>> {
    sequence.chunks_exact(3).map(translate_codon).collect()
}

/// Codons encoding `aa`, in alphabetical order. Empty for unknown symbols.
pub fn synonymous_codons(aa: u8) -> &'static [&'static Codon] {
    SYNONYMS
        .iter()
        .find(|(symbol, _)| *symbol == aa)
        .map(|(_, codons)| *codons)
        .unwrap_or(&[])
}

/// All 64 codons grouped by amino acid
pub fn all_codons() -> impl Iterator<Item = (u8, &'static Codon)> {
    SYNONYMS
        .iter()
        .flat_map(|(aa, codons)| codons.iter().map(move |codon| (*aa, *codon)))
}

pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}

#[inline]
pub fn gc_count(sequence: &[u8]) -> usize {
    sequence.iter().filter(|&&b| b == b'G' || b == b'C').count()
}
