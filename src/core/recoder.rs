//! Batch recoding pipeline

use crate::bio::sequence::SequenceModel;
use crate::constraints::ConstraintSet;
use crate::core::config::Config;
use crate::core::engine::{EngineStats, OptimizationProblem};
use crate::objectives::{CodonOptimizationMethod, CodonUsageObjective};
use crate::usage::{CachedTableSource, CodonTableSource, CodonUsageTable};
use crate::{BaseBuddyError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// A successfully recoded record
#[derive(Debug, Clone)]
pub struct Recoding {
    pub original: SequenceModel,
    pub recoded: SequenceModel,
    pub method: CodonOptimizationMethod,
    /// Header annotation, e.g. `method: use_best_codon, target_taxid: 83333`
    pub notes: String,
    pub stats: EngineStats,
    pub constraints_summary: String,
    pub objectives_summary: String,
}

impl Recoding {
    pub fn id(&self) -> &str {
        &self.recoded.id
    }

    /// Codon positions that differ from the input
    pub fn changed_codons(&self) -> usize {
        self.original
            .codons()
            .zip(self.recoded.codons())
            .filter(|(a, b)| a != b)
            .count()
    }
}

#[derive(Debug)]
pub enum RecordOutcome {
    Recoded(Recoding),
    Failed { id: String, error: BaseBuddyError },
}

impl RecordOutcome {
    pub fn id(&self) -> &str {
        match self {
            RecordOutcome::Recoded(recoding) => recoding.id(),
            RecordOutcome::Failed { id, .. } => id,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecordOutcome::Failed { .. })
    }

    pub fn recoding(&self) -> Option<&Recoding> {
        match self {
            RecordOutcome::Recoded(recoding) => Some(recoding),
            RecordOutcome::Failed { .. } => None,
        }
    }
}

/// Recodes records one after another with shared tables and settings.
///
/// Every record gets a fresh working copy and a generator seeded with the
/// configured seed, so results do not depend on batch order.
pub struct Recoder {
    config: Config,
    target_taxid: u32,
    target: Arc<CodonUsageTable>,
    source: Option<(u32, Arc<CodonUsageTable>)>,
    silent: bool,
}

impl Recoder {
    pub fn new(config: Config, target_taxid: u32, target: Arc<CodonUsageTable>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            target_taxid,
            target,
            source: None,
            silent: false,
        })
    }

    /// Look up the target (and, for `harmonize_rca`, the source) table
    pub fn from_source<S: CodonTableSource>(
        config: Config,
        tables: &CachedTableSource<S>,
        target_taxid: u32,
        source_taxid: Option<u32>,
    ) -> Result<Self> {
        let method = config.optimization.method;
        let target = tables.get(target_taxid)?;
        let mut recoder = Self::new(config, target_taxid, target)?;
        match source_taxid {
            Some(taxid) => {
                recoder = recoder.with_source_table(taxid, tables.get(taxid)?);
            }
            None if method.requires_source_table() => {
                return Err(BaseBuddyError::Configuration(format!(
                    "{} requires a source taxid",
                    method
                )));
            }
            None => {}
        }
        Ok(recoder)
    }

    pub fn with_source_table(mut self, taxid: u32, table: Arc<CodonUsageTable>) -> Self {
        self.source = Some((taxid, table));
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn method(&self) -> CodonOptimizationMethod {
        self.config.optimization.method
    }

    /// `method: M[, source_taxid: S], target_taxid: T`
    pub fn notes(&self) -> String {
        match (&self.source, self.method()) {
            (Some((source_taxid, _)), CodonOptimizationMethod::HarmonizeRca) => format!(
                "method: {}, source_taxid: {}, target_taxid: {}",
                self.method(),
                source_taxid,
                self.target_taxid
            ),
            _ => format!(
                "method: {}, target_taxid: {}",
                self.method(),
                self.target_taxid
            ),
        }
    }

    pub fn recode_record(&self, record: &SequenceModel) -> Result<Recoding> {
        let settings = &self.config.optimization;
        let constraints = ConstraintSet::from_config(&self.config.constraints, record)?;
        let objective = CodonUsageObjective::new(
            settings.method,
            Arc::clone(&self.target),
            self.source.as_ref().map(|(_, table)| Arc::clone(table)),
            record,
        )?;

        let mut problem = OptimizationProblem::new(record.clone(), constraints, objective)
            .with_seed(settings.seed)
            .with_max_random_iters(settings.max_random_iters)
            .with_max_optimization_passes(settings.max_optimization_passes);
        problem.run()?;

        let recoding = Recoding {
            original: record.clone(),
            method: settings.method,
            notes: self.notes(),
            stats: problem.stats().clone(),
            constraints_summary: problem.constraints_text_summary(),
            objectives_summary: problem.objectives_text_summary(),
            recoded: problem.into_sequence(),
        };
        tracing::info!(
            "Recoded '{}': {} of {} codons changed, score {:.4} -> {:.4}",
            recoding.id(),
            recoding.changed_codons(),
            record.codon_count(),
            recoding.stats.initial_score,
            recoding.stats.final_score
        );
        Ok(recoding)
    }

    /// Recode every record. Failures are collected per record unless
    /// `fail_fast` is set, in which case the first failure is returned.
    pub fn recode_all(&self, records: &[SequenceModel]) -> Result<Vec<RecordOutcome>> {
        let pb = if self.silent {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(records.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .map_err(|e| BaseBuddyError::Other(e.to_string()))?,
            );
            pb
        };

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            pb.set_message(record.id.clone());
            match self.recode_record(record) {
                Ok(recoding) => outcomes.push(RecordOutcome::Recoded(recoding)),
                Err(error) if self.config.optimization.fail_fast => {
                    pb.abandon();
                    return Err(error);
                }
                Err(error) => {
                    tracing::warn!("Skipping '{}': {}", record.id, error);
                    outcomes.push(RecordOutcome::Failed {
                        id: record.id.clone(),
                        error,
                    });
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(outcomes)
    }
}
