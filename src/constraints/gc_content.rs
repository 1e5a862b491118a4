use super::{synonymous_alternatives, Constraint, Mutation, Span, Violation};
use crate::bio::genetic_code;
use crate::bio::sequence::SequenceModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    TooLow,
    TooHigh,
}

/// Keeps the G/C fraction of every sliding window within `[min, max]`.
///
/// Windows slide by one base. A sequence shorter than the window is checked
/// as a single window. Overlapping failing windows with the same direction
/// are reported as one violation covering their union.
#[derive(Debug, Clone)]
pub struct GcContentConstraint {
    min: f64,
    max: f64,
    window: usize,
}

impl GcContentConstraint {
    pub fn new(min: f64, max: f64, window: usize) -> Self {
        Self {
            min,
            max,
            window: window.max(1),
        }
    }

    fn effective_window(&self, len: usize) -> usize {
        self.window.min(len)
    }

    /// Direction and number of excess bases for one window, if it fails
    fn check(&self, gc: usize, width: usize) -> Option<(Direction, f64)> {
        let gc = gc as f64;
        let width = width as f64;
        if gc > self.max * width {
            Some((Direction::TooHigh, gc - self.max * width))
        } else if gc < self.min * width {
            Some((Direction::TooLow, self.min * width - gc))
        } else {
            None
        }
    }

    fn direction_at(&self, nucleotides: &[u8], start: usize) -> Option<Direction> {
        let width = self.effective_window(nucleotides.len());
        let start = start.min(nucleotides.len().saturating_sub(width));
        let gc = genetic_code::gc_count(&nucleotides[start..start + width]);
        self.check(gc, width).map(|(direction, _)| direction)
    }
}

impl Constraint for GcContentConstraint {
    fn label(&self) -> String {
        format!(
            "EnforceGCContent({:.2}-{:.2}, window={})",
            self.min, self.max, self.window
        )
    }

    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        let nts = sequence.nucleotides();
        if nts.is_empty() {
            return Vec::new();
        }
        let width = self.effective_window(nts.len());

        let mut violations = Vec::new();
        let mut current: Option<(Direction, Span, f64)> = None;
        let mut gc = genetic_code::gc_count(&nts[..width]);

        for start in 0..=nts.len() - width {
            if start > 0 {
                gc -= genetic_code::gc_count(&nts[start - 1..start]);
                gc += genetic_code::gc_count(&nts[start + width - 1..start + width]);
            }
            let failing = self.check(gc, width);

            current = match (current, failing) {
                (Some((dir, span, excess)), Some((d, e))) if dir == d && start < span.end => {
                    Some((dir, Span::new(span.start, start + width), excess + e))
                }
                (previous, failing) => {
                    if let Some(done) = previous {
                        violations.push(done);
                    }
                    failing.map(|(d, e)| (d, Span::new(start, start + width), e))
                }
            };
        }
        if let Some(done) = current {
            violations.push(done);
        }

        violations
            .into_iter()
            .map(|(direction, span, excess)| {
                let what = match direction {
                    Direction::TooHigh => "above",
                    Direction::TooLow => "below",
                };
                Violation::new(
                    self.label(),
                    span,
                    format!(
                        "GC content {} [{:.2}, {:.2}] over {}",
                        what, self.min, self.max, span
                    ),
                )
                .with_severity(excess)
            })
            .collect()
    }

    /// Swaps inside the region that move GC content the right way
    fn repair_options(&self, sequence: &SequenceModel, violation: &Violation) -> Vec<Mutation> {
        let Some(direction) = self.direction_at(sequence.nucleotides(), violation.span.start) else {
            return Vec::new();
        };
        synonymous_alternatives(sequence, &[violation.span], |idx, candidate| {
            let current = genetic_code::gc_count(&sequence.codon(idx));
            let proposed = genetic_code::gc_count(candidate);
            match direction {
                Direction::TooHigh => proposed < current,
                Direction::TooLow => proposed > current,
            }
        })
    }
}
