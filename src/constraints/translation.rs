use super::{Constraint, Mutation, Span, Violation};
use crate::bio::sequence::SequenceModel;

/// The protein must stay exactly the one encoded by the input sequence.
///
/// Every mutation the engine applies is a synonymous swap, so this can only
/// fail if the sequence was changed some other way. It is never repairable.
#[derive(Debug, Clone)]
pub struct TranslationConstraint {
    protein: Vec<u8>,
}

impl TranslationConstraint {
    pub fn new(protein: Vec<u8>) -> Self {
        Self { protein }
    }

    pub fn from_sequence(original: &SequenceModel) -> Self {
        Self::new(original.translation())
    }

    pub fn protein(&self) -> &[u8] {
        &self.protein
    }
}

impl Constraint for TranslationConstraint {
    fn label(&self) -> String {
        "EnforceTranslation".to_string()
    }

    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        let current = sequence.translation();
        if current.len() != self.protein.len() {
            return vec![Violation::new(
                self.label(),
                Span::new(0, sequence.len()),
                format!(
                    "protein length changed from {} to {}",
                    self.protein.len(),
                    current.len()
                ),
            )];
        }

        current
            .iter()
            .zip(&self.protein)
            .enumerate()
            .filter(|(_, (now, expected))| now != expected)
            .map(|(idx, (now, expected))| {
                Violation::new(
                    self.label(),
                    Span::new(idx * 3, idx * 3 + 3),
                    format!(
                        "codon {} encodes '{}' instead of '{}'",
                        idx,
                        *now as char,
                        *expected as char
                    ),
                )
            })
            .collect()
    }

    fn repair_options(&self, _sequence: &SequenceModel, _violation: &Violation) -> Vec<Mutation> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonymous_change_keeps_translation() {
        let original = SequenceModel::new("s", "ATGAGTAGT").unwrap();
        let constraint = TranslationConstraint::from_sequence(&original);
        assert_eq!(constraint.protein(), b"MSS");

        let mut recoded = original.clone();
        recoded.swap_codon(1, *b"AGC").unwrap();
        assert!(constraint.evaluate(&recoded).is_empty());
    }

    #[test]
    fn test_different_protein_is_unrepairable() {
        let constraint = TranslationConstraint::new(b"MSS".to_vec());
        let other = SequenceModel::new("s", "ATGAGTTGG").unwrap();
        let violations = constraint.evaluate(&other);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].span, Span::new(6, 9));
        assert!(constraint.repair_options(&other, &violations[0]).is_empty());

        let shorter = SequenceModel::new("s", "ATGAGT").unwrap();
        assert_eq!(constraint.evaluate(&shorter).len(), 1);
    }
}
