use super::{synonymous_alternatives, Constraint, Mutation, Span, Violation};
use crate::bio::sequence::SequenceModel;

/// Forbids runs of more than `max_run` consecutive `base`s
#[derive(Debug, Clone)]
pub struct HomopolymerConstraint {
    base: u8,
    max_run: usize,
}

impl HomopolymerConstraint {
    pub fn new(base: u8, max_run: usize) -> Self {
        Self {
            base: base.to_ascii_uppercase(),
            max_run,
        }
    }

    pub fn base(&self) -> u8 {
        self.base
    }

    pub fn max_run(&self) -> usize {
        self.max_run
    }

    /// Maximal runs of `base` as `[start, end)` spans
    fn runs(&self, nucleotides: &[u8]) -> Vec<Span> {
        let mut runs = Vec::new();
        let mut start = None;
        for (i, &b) in nucleotides.iter().enumerate() {
            match (b == self.base, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    runs.push(Span::new(s, i));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push(Span::new(s, nucleotides.len()));
        }
        runs
    }
}

impl Constraint for HomopolymerConstraint {
    fn label(&self) -> String {
        format!("AvoidHomopolymer({}, max_run={})", self.base as char, self.max_run)
    }

    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        self.runs(sequence.nucleotides())
            .into_iter()
            .filter(|run| run.len() > self.max_run)
            .map(|run| {
                Violation::new(
                    self.label(),
                    run,
                    format!(
                        "run of {} {}s exceeds {}",
                        run.len(),
                        self.base as char,
                        self.max_run
                    ),
                )
                .with_severity((run.len() - self.max_run) as f64)
            })
            .collect()
    }

    /// Only swaps that put a different base somewhere inside the run
    fn repair_options(&self, sequence: &SequenceModel, violation: &Violation) -> Vec<Mutation> {
        let run = violation.span;
        synonymous_alternatives(sequence, &[run], |idx, candidate| {
            candidate.iter().enumerate().any(|(offset, &b)| {
                let pos = idx * 3 + offset;
                pos >= run.start && pos < run.end && b != self.base
            })
        })
    }
}
