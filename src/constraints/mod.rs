//! Hard constraints over a coding sequence
//!
//! Each constraint is a pure function of the current sequence snapshot and
//! its own parameters. Evaluation reports [`Violation`]s; for a violation a
//! constraint can list the synonymous codon swaps that may repair it, and
//! pick one of them at random. Constraints never mutate the sequence.

pub mod gc_content;
pub mod hairpin;
pub mod homopolymer;
pub mod pattern;
pub mod translation;
pub mod uniqueness;

pub use gc_content::GcContentConstraint;
pub use hairpin::HairpinConstraint;
pub use homopolymer::HomopolymerConstraint;
pub use pattern::{parse_pattern_constraint, PatternConstraint};
pub use translation::TranslationConstraint;
pub use uniqueness::UniquenessConstraint;

use crate::bio::genetic_code::{self, Codon};
use crate::bio::sequence::SequenceModel;
use crate::core::config::ConstraintConfig;
use crate::Result;
use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;

/// Half-open nucleotide interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A single failing location of a constraint
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Position of the reporting constraint in its [`ConstraintSet`]
    pub constraint_index: usize,
    pub constraint_id: String,
    pub span: Span,
    pub message: String,
    /// How badly the constraint is broken here; summed by the engine to
    /// decide whether a repair attempt made things worse.
    pub severity: f64,
    /// Regions whose codons may be changed to repair this violation
    pub hotspots: Vec<Span>,
}

impl Violation {
    pub fn new(constraint_id: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            constraint_index: 0,
            constraint_id: constraint_id.into(),
            span,
            message: message.into(),
            severity: 1.0,
            hotspots: vec![span],
        }
    }

    pub fn with_severity(mut self, severity: f64) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_hotspots(mut self, hotspots: Vec<Span>) -> Self {
        self.hotspots = hotspots;
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.span, self.message)
    }
}

/// One synonymous codon replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub codon_index: usize,
    pub codon: Codon,
}

pub trait Constraint: Send + Sync {
    /// Stable human-readable identifier, used in reports
    fn label(&self) -> String;

    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation>;

    /// Every synonymous swap that may repair `violation`, in codon order.
    /// An empty list means the violation cannot be repaired by synonymous
    /// substitution in the current context.
    fn repair_options(&self, sequence: &SequenceModel, violation: &Violation) -> Vec<Mutation> {
        synonymous_alternatives(sequence, &violation.hotspots, |_, _| true)
    }

    /// Pick one repair for `violation`: a codon position uniformly at random,
    /// then one of its candidate codons uniformly at random.
    fn propose_repair(
        &self,
        sequence: &SequenceModel,
        violation: &Violation,
        rng: &mut StdRng,
    ) -> Option<Mutation> {
        choose_mutation(&self.repair_options(sequence, violation), rng)
    }
}

/// Synonymous alternatives (excluding the current codon) for every codon
/// overlapping `spans`, filtered by `accept(codon_index, candidate)`.
pub fn synonymous_alternatives<F>(sequence: &SequenceModel, spans: &[Span], accept: F) -> Vec<Mutation>
where
    F: Fn(usize, &Codon) -> bool,
{
    let mut indices: Vec<usize> = spans
        .iter()
        .flat_map(|span| sequence.codons_overlapping(span.start, span.end))
        .collect();
    indices.sort_unstable();
    indices.dedup();

    let mut options = Vec::new();
    for idx in indices {
        let current = sequence.codon(idx);
        let aa = sequence.amino_acid(idx);
        for candidate in genetic_code::synonymous_codons(aa) {
            if **candidate != current && accept(idx, *candidate) {
                options.push(Mutation {
                    codon_index: idx,
                    codon: **candidate,
                });
            }
        }
    }
    options
}

/// Two-stage uniform choice: first a codon position, then a codon for it.
/// `options` must be grouped by codon index, as produced by
/// [`synonymous_alternatives`].
pub fn choose_mutation(options: &[Mutation], rng: &mut StdRng) -> Option<Mutation> {
    if options.is_empty() {
        return None;
    }
    let mut positions: Vec<usize> = options.iter().map(|m| m.codon_index).collect();
    positions.dedup();
    let position = positions[rng.gen_range(0..positions.len())];

    let candidates: Vec<&Mutation> = options
        .iter()
        .filter(|m| m.codon_index == position)
        .collect();
    Some(*candidates[rng.gen_range(0..candidates.len())])
}

/// The full set of hard constraints for one run
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, constraint: impl Constraint + 'static) -> Self {
        self.push(Box::new(constraint));
        self
    }

    pub fn push(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    /// Build the standard recoding constraint set from configuration.
    ///
    /// Order: k-mer uniqueness, hairpins, homopolymers (A, T, C, G),
    /// restriction sites, extra patterns, GC content, translation.
    pub fn from_config(config: &ConstraintConfig, original: &SequenceModel) -> Result<Self> {
        let mut set = Self::new();
        set.push(Box::new(UniquenessConstraint::new(
            config.kmer_size,
            config.kmer_include_reverse_complement,
        )));
        set.push(Box::new(HairpinConstraint::new(
            config.hairpin_stem_size,
            config.hairpin_window,
        )));
        for (base, max_run) in config.homopolymer.limits() {
            set.push(Box::new(HomopolymerConstraint::new(base, max_run)));
        }
        for site in &config.restriction_sites {
            set.push(Box::new(PatternConstraint::from_site_name(site)?));
        }
        for pattern in &config.avoid_patterns {
            set.push(parse_pattern_constraint(pattern)?);
        }
        set.push(Box::new(GcContentConstraint::new(
            config.gc_min,
            config.gc_max,
            config.gc_window,
        )));
        set.push(Box::new(TranslationConstraint::from_sequence(original)));
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Constraint> {
        self.constraints.get(index).map(|c| c.as_ref())
    }

    pub fn labels(&self) -> Vec<String> {
        self.constraints.iter().map(|c| c.label()).collect()
    }

    /// Violations of every constraint, tagged with the constraint's index
    pub fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        self.evaluate_each(sequence).into_iter().flatten().collect()
    }

    /// Violations grouped per constraint, in set order
    pub fn evaluate_each(&self, sequence: &SequenceModel) -> Vec<Vec<Violation>> {
        self.constraints
            .iter()
            .enumerate()
            .map(|(idx, constraint)| {
                let mut violations = constraint.evaluate(sequence);
                for v in &mut violations {
                    v.constraint_index = idx;
                }
                violations
            })
            .collect()
    }

    pub fn repair_options(&self, sequence: &SequenceModel, violation: &Violation) -> Vec<Mutation> {
        self.get(violation.constraint_index)
            .map(|c| c.repair_options(sequence, violation))
            .unwrap_or_default()
    }

    /// One seeded repair for `violation`, chosen by the constraint that
    /// reported it
    pub fn propose_repair(
        &self,
        sequence: &SequenceModel,
        violation: &Violation,
        rng: &mut StdRng,
    ) -> Option<Mutation> {
        self.get(violation.constraint_index)
            .and_then(|c| c.propose_repair(sequence, violation, rng))
    }
}

/// Sum of violation severities
pub fn total_severity(violations: &[Violation]) -> f64 {
    violations.iter().map(|v| v.severity).sum()
}
