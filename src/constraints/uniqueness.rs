use super::{Constraint, Span, Violation};
use crate::bio::genetic_code;
use crate::bio::sequence::SequenceModel;
use std::collections::HashMap;

/// Every k-mer occurs at most once. With `include_reverse_complement`, a
/// k-mer and its reverse complement count as the same k-mer.
#[derive(Debug, Clone)]
pub struct UniquenessConstraint {
    k: usize,
    include_reverse_complement: bool,
}

impl UniquenessConstraint {
    pub fn new(k: usize, include_reverse_complement: bool) -> Self {
        Self {
            k: k.max(1),
            include_reverse_complement,
        }
    }

    fn canonical(&self, kmer: &[u8]) -> Vec<u8> {
        if self.include_reverse_complement {
            let rc = genetic_code::reverse_complement(kmer);
            if rc.as_slice() < kmer {
                return rc;
            }
        }
        kmer.to_vec()
    }
}

impl Constraint for UniquenessConstraint {
    fn label(&self) -> String {
        if self.include_reverse_complement {
            format!("UniquifyAllKmers(k={}, include_reverse_complement)", self.k)
        } else {
            format!("UniquifyAllKmers(k={})", self.k)
        }
    }

    /// One violation per repeated occurrence, pointing back at the first
    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        let nts = sequence.nucleotides();
        if nts.len() < self.k {
            return Vec::new();
        }

        let mut first_seen: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut violations = Vec::new();
        for (pos, kmer) in nts.windows(self.k).enumerate() {
            let key = self.canonical(kmer);
            match first_seen.get(&key) {
                Some(&first) => {
                    let earlier = Span::new(first, first + self.k);
                    let here = Span::new(pos, pos + self.k);
                    violations.push(
                        Violation::new(
                            self.label(),
                            here,
                            format!(
                                "{} repeats k-mer at {}",
                                String::from_utf8_lossy(kmer),
                                earlier
                            ),
                        )
                        .with_hotspots(vec![earlier, here]),
                    );
                }
                None => {
                    first_seen.insert(key, pos);
                }
            }
        }
        violations
    }
}
