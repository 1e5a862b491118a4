use super::{Constraint, Span, Violation};
use crate::bio::genetic_code;
use crate::bio::sequence::SequenceModel;
use std::collections::HashMap;

/// Forbids a stem of `stem_size` bases whose reverse complement appears
/// downstream within `window` bases of the stem start.
#[derive(Debug, Clone)]
pub struct HairpinConstraint {
    stem_size: usize,
    window: usize,
}

impl HairpinConstraint {
    pub fn new(stem_size: usize, window: usize) -> Self {
        Self {
            stem_size: stem_size.max(1),
            window,
        }
    }
}

impl Constraint for HairpinConstraint {
    fn label(&self) -> String {
        format!(
            "AvoidHairpins(stem_size={}, hairpin_window={})",
            self.stem_size, self.window
        )
    }

    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        let nts = sequence.nucleotides();
        let stem = self.stem_size;
        if nts.len() < 2 * stem || self.window < 2 * stem {
            return Vec::new();
        }

        let mut positions: HashMap<&[u8], Vec<usize>> = HashMap::new();
        for (i, kmer) in nts.windows(stem).enumerate() {
            positions.entry(kmer).or_default().push(i);
        }

        let mut violations = Vec::new();
        for i in 0..=nts.len() - 2 * stem {
            let arm = genetic_code::reverse_complement(&nts[i..i + stem]);
            let Some(candidates) = positions.get(arm.as_slice()) else {
                continue;
            };
            let last = (i + self.window).min(nts.len()) - stem;
            let Some(&p) = candidates.iter().find(|&&p| p >= i + stem && p <= last) else {
                continue;
            };
            violations.push(
                Violation::new(
                    self.label(),
                    Span::new(i, p + stem),
                    format!(
                        "stem {} pairs with {}",
                        Span::new(i, i + stem),
                        Span::new(p, p + stem)
                    ),
                )
                .with_hotspots(vec![Span::new(i, i + stem), Span::new(p, p + stem)]),
            );
        }
        violations
    }
}
