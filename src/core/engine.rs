//! Two-phase recoding search: repair constraint violations with seeded
//! random synonymous swaps, then greedily improve the codon usage score
//! without breaking any constraint.

use crate::bio::genetic_code;
use crate::bio::sequence::SequenceModel;
use crate::constraints::{total_severity, ConstraintSet, Violation};
use crate::objectives::CodonUsageObjective;
use crate::{BaseBuddyError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt::Write as _;

pub const DEFAULT_SEED: u64 = 123;
pub const DEFAULT_MAX_RANDOM_ITERS: usize = 10_000;
pub const DEFAULT_MAX_OPTIMIZATION_PASSES: usize = 20;

const SCORE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    /// Repair attempts made during constraint resolution
    pub iterations: usize,
    pub accepted_repairs: usize,
    pub rejected_repairs: usize,
    pub optimization_passes: usize,
    pub accepted_swaps: usize,
    pub initial_score: f64,
    pub final_score: f64,
}

/// One sequence being recoded: a private working copy, its constraints,
/// its objective and its own random generator.
pub struct OptimizationProblem {
    sequence: SequenceModel,
    constraints: ConstraintSet,
    objective: CodonUsageObjective,
    state: ResolutionState,
    rng: StdRng,
    seed: u64,
    max_random_iters: usize,
    max_optimization_passes: usize,
    stats: EngineStats,
}

impl OptimizationProblem {
    pub fn new(
        sequence: SequenceModel,
        constraints: ConstraintSet,
        objective: CodonUsageObjective,
    ) -> Self {
        Self {
            sequence,
            constraints,
            objective,
            state: ResolutionState::Unresolved,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            seed: DEFAULT_SEED,
            max_random_iters: DEFAULT_MAX_RANDOM_ITERS,
            max_optimization_passes: DEFAULT_MAX_OPTIMIZATION_PASSES,
            stats: EngineStats::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_max_random_iters(mut self, max_random_iters: usize) -> Self {
        self.max_random_iters = max_random_iters;
        self
    }

    pub fn with_max_optimization_passes(mut self, passes: usize) -> Self {
        self.max_optimization_passes = passes;
        self
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn sequence(&self) -> &SequenceModel {
        &self.sequence
    }

    pub fn into_sequence(self) -> SequenceModel {
        self.sequence
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn objective(&self) -> &CodonUsageObjective {
        &self.objective
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn objective_score(&self) -> f64 {
        self.objective.score(&self.sequence)
    }

    /// Resolve constraints, then optimize the objective
    pub fn run(&mut self) -> Result<()> {
        self.resolve_constraints()?;
        self.optimize()
    }

    /// Random repair loop.
    ///
    /// Each iteration picks a repairable violation uniformly at random,
    /// applies the swap its constraint proposes and keeps it only if the
    /// total violation severity does not increase. Fails when the iteration
    /// budget runs out, or at once when no violation has any candidate swap.
    pub fn resolve_constraints(&mut self) -> Result<()> {
        self.state = ResolutionState::Resolving;
        self.stats.initial_score = self.objective.score(&self.sequence);
        tracing::debug!(
            "Resolving constraints for '{}' ({} constraints, budget {})",
            self.sequence.id,
            self.constraints.len(),
            self.max_random_iters
        );

        let mut violations = self.constraints.evaluate(&self.sequence);
        loop {
            if violations.is_empty() {
                self.state = ResolutionState::Resolved;
                tracing::debug!(
                    "Constraints resolved for '{}' after {} iterations",
                    self.sequence.id,
                    self.stats.iterations
                );
                return Ok(());
            }

            let repairable: Vec<&Violation> = violations
                .iter()
                .filter(|v| !self.constraints.repair_options(&self.sequence, v).is_empty())
                .collect();

            if repairable.is_empty() {
                tracing::warn!(
                    "No synonymous swap can repair the remaining violations of '{}'",
                    self.sequence.id
                );
                return Err(self.fail(&violations));
            }
            if self.stats.iterations >= self.max_random_iters {
                tracing::warn!(
                    "Iteration budget of {} exhausted for '{}' with {} violations left",
                    self.max_random_iters,
                    self.sequence.id,
                    violations.len()
                );
                return Err(self.fail(&violations));
            }
            self.stats.iterations += 1;

            let violation = repairable[self.rng.gen_range(0..repairable.len())];
            let proposal = self
                .constraints
                .propose_repair(&self.sequence, violation, &mut self.rng);
            let Some(mutation) = proposal else {
                continue;
            };

            let previous = self.sequence.swap_codon(mutation.codon_index, mutation.codon)?;
            let candidate = self.constraints.evaluate(&self.sequence);
            if total_severity(&candidate) <= total_severity(&violations) + SCORE_EPSILON {
                self.stats.accepted_repairs += 1;
                violations = candidate;
            } else {
                self.sequence.swap_codon(mutation.codon_index, previous)?;
                self.stats.rejected_repairs += 1;
            }
        }
    }

    fn fail(&mut self, violations: &[Violation]) -> BaseBuddyError {
        self.state = ResolutionState::Failed;
        let mut remaining: Vec<String> = Vec::new();
        for v in violations {
            if !remaining.contains(&v.constraint_id) {
                remaining.push(v.constraint_id.clone());
            }
        }
        BaseBuddyError::UnsatisfiableConstraints {
            record: self.sequence.id.clone(),
            iterations: self.stats.iterations,
            remaining,
        }
    }

    /// Greedy improvement in sequential codon order.
    ///
    /// At each position the synonyms are tried from best to worst score;
    /// the first one that strictly improves the score and keeps every
    /// constraint satisfied is kept. Passes repeat until one changes
    /// nothing or the pass cap is reached.
    pub fn optimize(&mut self) -> Result<()> {
        if self.state != ResolutionState::Resolved {
            return Err(BaseBuddyError::Other(format!(
                "cannot optimize '{}' before its constraints are resolved",
                self.sequence.id
            )));
        }

        let mut score = self.objective.score(&self.sequence);
        while self.stats.optimization_passes < self.max_optimization_passes {
            self.stats.optimization_passes += 1;
            let mut changed = false;

            for idx in 0..self.sequence.codon_count() {
                let current = self.sequence.codon(idx);
                let aa = self.sequence.amino_acid(idx);

                let mut scored = Vec::new();
                for synonym in genetic_code::synonymous_codons(aa) {
                    if **synonym == current {
                        continue;
                    }
                    self.sequence.swap_codon(idx, **synonym)?;
                    scored.push((**synonym, self.objective.score(&self.sequence)));
                    self.sequence.swap_codon(idx, current)?;
                }
                scored.sort_by(|a, b| b.1.total_cmp(&a.1));

                for (codon, candidate_score) in scored {
                    if candidate_score <= score + SCORE_EPSILON {
                        break;
                    }
                    self.sequence.swap_codon(idx, codon)?;
                    if self.constraints.evaluate(&self.sequence).is_empty() {
                        score = candidate_score;
                        self.stats.accepted_swaps += 1;
                        changed = true;
                        break;
                    }
                    self.sequence.swap_codon(idx, current)?;
                }
            }

            tracing::debug!(
                "Optimization pass {} for '{}': score {:.6}",
                self.stats.optimization_passes,
                self.sequence.id,
                score
            );
            if !changed {
                break;
            }
        }

        self.stats.final_score = score;
        Ok(())
    }

    /// One block per constraint: label, PASS/FAIL and any remaining
    /// violations.
    pub fn constraints_text_summary(&self) -> String {
        let mut out = String::new();
        for (idx, violations) in self.constraints.evaluate_each(&self.sequence).iter().enumerate() {
            let label = self
                .constraints
                .get(idx)
                .map(|c| c.label())
                .unwrap_or_default();
            if violations.is_empty() {
                let _ = writeln!(out, "PASS {}", label);
            } else {
                let _ = writeln!(out, "FAIL {} ({} violations)", label, violations.len());
                for v in violations {
                    let _ = writeln!(out, "  {}", v);
                }
            }
        }
        out
    }

    /// One block for the objective: method, scores and traversal order
    pub fn objectives_text_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "SCORE {:>10.4} {}", self.objective_score(), self.objective.label());
        let _ = writeln!(out, "  method: {}", self.objective.method());
        let _ = writeln!(out, "  initial score: {:.4}", self.stats.initial_score);
        let _ = writeln!(out, "  traversal: sequential, {} passes", self.stats.optimization_passes);
        let _ = writeln!(
            out,
            "  repairs: {} accepted, {} rejected in {} iterations",
            self.stats.accepted_repairs, self.stats.rejected_repairs, self.stats.iterations
        );
        let _ = writeln!(out, "  improving swaps: {}", self.stats.accepted_swaps);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{
        GcContentConstraint, HairpinConstraint, HomopolymerConstraint, PatternConstraint,
        TranslationConstraint, UniquenessConstraint,
    };
    use crate::objectives::CodonOptimizationMethod;
    use crate::usage::CodonUsageTable;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn uniform_table() -> Arc<CodonUsageTable> {
        let counts: BTreeMap<_, _> = genetic_code::all_codons()
            .map(|(_, codon)| (*codon, 10.0))
            .collect();
        Arc::new(CodonUsageTable::from_counts(&counts).unwrap())
    }

    fn problem(nts: &str, constraints: ConstraintSet) -> OptimizationProblem {
        let seq = SequenceModel::new("test", nts).unwrap();
        let objective = CodonUsageObjective::new(
            CodonOptimizationMethod::UseBestCodon,
            uniform_table(),
            None,
            &seq,
        )
        .unwrap();
        OptimizationProblem::new(seq, constraints, objective)
    }

    #[test]
    fn test_resolves_long_homopolymer() {
        let nts = format!("ATG{}TGG", "AAA".repeat(5));
        let constraints = ConstraintSet::new().with(HomopolymerConstraint::new(b'A', 9));
        let mut p = problem(&nts, constraints);
        assert_eq!(p.state(), ResolutionState::Unresolved);
        p.resolve_constraints().unwrap();
        assert_eq!(p.state(), ResolutionState::Resolved);
        assert!(p.constraints().evaluate(p.sequence()).is_empty());
        assert_eq!(p.sequence().translation(), b"MKKKKKW".to_vec());
    }

    fn assert_resolves(nts: &str, constraints: ConstraintSet) {
        let mut p = problem(nts, constraints);
        assert!(!p.constraints().evaluate(p.sequence()).is_empty());
        p.resolve_constraints().unwrap();
        assert_eq!(p.state(), ResolutionState::Resolved);
        assert!(p.constraints().evaluate(p.sequence()).is_empty());
        assert!(p.stats().accepted_repairs > 0);
        assert_eq!(
            p.sequence().translation(),
            SequenceModel::new("test", nts).unwrap().translation()
        );
    }

    #[test]
    fn test_resolves_gc_rich_window() {
        // Ala Gly Arg Pro, all at full GC
        let nts = "GCCGGCCGCCCC".repeat(3);
        assert_resolves(
            &nts,
            ConstraintSet::new().with(GcContentConstraint::new(0.3, 0.75, 30)),
        );
    }

    #[test]
    fn test_resolves_planted_hairpin() {
        // AGTCAGTTCAGC pairs with GCTGAACTGACT 12 bases downstream
        let nts = "ATGGCTGAACTGACTATTCCGGAGTACAGTCAGTTCAGCTGG";
        assert_resolves(
            nts,
            ConstraintSet::new().with(HairpinConstraint::new(10, 100)),
        );
    }

    #[test]
    fn test_resolves_duplicated_kmer() {
        // GCTGAACTGACT occurs twice
        let nts = "ATGGCTGAACTGACTATTCCGGAGTACGCTGAACTGACTTGG";
        assert_resolves(
            nts,
            ConstraintSet::new().with(UniquenessConstraint::new(10, true)),
        );
    }

    #[test]
    fn test_unrepairable_site_fails_fast() {
        // TGTG spans ATG and TGG, neither of which has a synonym
        let constraints = ConstraintSet::new().with(PatternConstraint::literal("TGTG").unwrap());
        let mut p = problem("ATGTGG", constraints);
        let err = p.resolve_constraints().unwrap_err();
        assert_eq!(p.state(), ResolutionState::Failed);
        assert_eq!(p.stats().iterations, 0);
        match err {
            BaseBuddyError::UnsatisfiableConstraints { record, remaining, .. } => {
                assert_eq!(record, "test");
                assert_eq!(remaining, vec!["AvoidPattern(TGTG)".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_budget_exhaustion_fails() {
        // Every Lys codon starts with AA, so max_run 1 never holds
        let constraints = ConstraintSet::new().with(HomopolymerConstraint::new(b'A', 1));
        let mut p = problem("AAAAAA", constraints).with_max_random_iters(1);
        assert!(p.resolve_constraints().is_err());
        assert_eq!(p.state(), ResolutionState::Failed);
        assert_eq!(p.stats().iterations, 1);
    }

    #[test]
    fn test_optimize_requires_resolution() {
        let mut p = problem("ATGAGT", ConstraintSet::new());
        assert!(p.optimize().is_err());
    }

    #[test]
    fn test_optimize_respects_constraints() {
        // AGC is the best Ser codon but GAG+AGC would create GAGC
        let mut counts: BTreeMap<_, _> = genetic_code::all_codons()
            .map(|(_, codon)| (*codon, 10.0))
            .collect();
        counts.insert(*b"AGC", 100.0);
        let table = Arc::new(CodonUsageTable::from_counts(&counts).unwrap());
        let seq = SequenceModel::new("test", "GAGAGTAGT").unwrap();
        let objective =
            CodonUsageObjective::new(CodonOptimizationMethod::UseBestCodon, table, None, &seq).unwrap();
        let constraints = ConstraintSet::new()
            .with(PatternConstraint::literal("GAGC").unwrap())
            .with(TranslationConstraint::from_sequence(&seq));
        let mut p = OptimizationProblem::new(seq, constraints, objective);
        p.run().unwrap();
        let out = p.sequence().as_str().to_string();
        assert!(!out.contains("GAGC"));
        assert_eq!(&out[6..9], "AGC");
        assert!(p.stats().final_score >= p.stats().initial_score);
    }

    #[test]
    fn test_text_summaries() {
        let constraints = ConstraintSet::new().with(HomopolymerConstraint::new(b'A', 9));
        let mut p = problem("ATGAGTAGT", constraints);
        p.run().unwrap();
        let constraints = p.constraints_text_summary();
        assert_eq!(constraints.lines().count(), 1);
        assert!(constraints.starts_with("PASS"));
        let objectives = p.objectives_text_summary();
        assert!(objectives.contains("method: use_best_codon"));
        assert!(objectives.contains("traversal: sequential"));
    }
}
