use crate::core::engine::EngineStats;
use crate::core::recoder::RecordOutcome;
use anyhow::Result;
use serde::Serialize;

pub mod text;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: Format,
    /// Include the per-constraint and per-objective blocks
    pub include_details: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: Format::Text,
            include_details: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Csv,
}

impl Format {
    /// Pick a format from a report file extension, defaulting to text
    pub fn from_extension(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            Some("csv") => Format::Csv,
            _ => Format::Text,
        }
    }
}

/// Flat, serializable view of one record's outcome
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub status: &'static str,
    pub notes: Option<String>,
    pub codons: Option<usize>,
    pub changed_codons: Option<usize>,
    pub stats: Option<EngineStats>,
    pub sequence: Option<String>,
    pub error: Option<String>,
}

impl From<&RecordOutcome> for RecordSummary {
    fn from(outcome: &RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Recoded(r) => Self {
                id: r.id().to_string(),
                status: "recoded",
                notes: Some(r.notes.clone()),
                codons: Some(r.recoded.codon_count()),
                changed_codons: Some(r.changed_codons()),
                stats: Some(r.stats.clone()),
                sequence: Some(r.recoded.as_str().to_string()),
                error: None,
            },
            RecordOutcome::Failed { id, error } => Self {
                id: id.clone(),
                status: "failed",
                notes: None,
                codons: None,
                changed_codons: None,
                stats: None,
                sequence: None,
                error: Some(error.to_string()),
            },
        }
    }
}

pub struct ReportGenerator {
    options: ReportOptions,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn generate(&self, outcomes: &[RecordOutcome]) -> Result<String> {
        match self.options.format {
            Format::Text => text::generate_text_report(outcomes, &self.options),
            Format::Json => self.generate_json_report(outcomes),
            Format::Csv => self.generate_csv_report(outcomes),
        }
    }

    fn generate_json_report(&self, outcomes: &[RecordOutcome]) -> Result<String> {
        let summaries: Vec<RecordSummary> = outcomes.iter().map(RecordSummary::from).collect();
        Ok(serde_json::to_string_pretty(&summaries)?)
    }

    fn generate_csv_report(&self, outcomes: &[RecordOutcome]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "id",
            "status",
            "codons",
            "changed_codons",
            "iterations",
            "initial_score",
            "final_score",
            "error",
        ])?;
        for summary in outcomes.iter().map(RecordSummary::from) {
            let opt = |v: Option<String>| v.unwrap_or_default();
            writer.write_record([
                summary.id.clone(),
                summary.status.to_string(),
                opt(summary.codons.map(|n| n.to_string())),
                opt(summary.changed_codons.map(|n| n.to_string())),
                opt(summary.stats.as_ref().map(|s| s.iterations.to_string())),
                opt(summary.stats.as_ref().map(|s| format!("{:.6}", s.initial_score))),
                opt(summary.stats.as_ref().map(|s| format!("{:.6}", s.final_score))),
                opt(summary.error.clone()),
            ])?;
        }
        let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}
