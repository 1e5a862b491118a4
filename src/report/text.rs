use crate::core::recoder::RecordOutcome;
use crate::report::ReportOptions;
use anyhow::Result;
use std::fmt::Write;

pub fn generate_text_report(outcomes: &[RecordOutcome], options: &ReportOptions) -> Result<String> {
    let mut output = String::new();

    writeln!(&mut output, "Recoding Report")?;
    writeln!(&mut output, "===============")?;
    writeln!(&mut output)?;

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    writeln!(&mut output, "Summary")?;
    writeln!(&mut output, "-------")?;
    writeln!(&mut output, "- Records:  {:6}", outcomes.len())?;
    writeln!(&mut output, "- Recoded:  {:6}", outcomes.len() - failed)?;
    writeln!(&mut output, "- Failed:   {:6}", failed)?;
    writeln!(&mut output)?;

    for outcome in outcomes {
        let title = format!("Record: {}", outcome.id());
        writeln!(&mut output, "{}", title)?;
        writeln!(&mut output, "{}", "-".repeat(title.chars().count()))?;

        match outcome {
            RecordOutcome::Recoded(recoding) => {
                writeln!(&mut output, "Status: recoded ({})", recoding.notes)?;
                writeln!(
                    &mut output,
                    "Codons changed: {} of {}",
                    recoding.changed_codons(),
                    recoding.recoded.codon_count()
                )?;
                if options.include_details {
                    writeln!(&mut output)?;
                    writeln!(&mut output, "Constraints")?;
                    output.push_str(&recoding.constraints_summary);
                    writeln!(&mut output)?;
                    writeln!(&mut output, "Objectives")?;
                    output.push_str(&recoding.objectives_summary);
                }
            }
            RecordOutcome::Failed { error, .. } => {
                writeln!(&mut output, "Status: failed")?;
                writeln!(&mut output, "Error: {}", error)?;
            }
        }
        writeln!(&mut output)?;
    }

    Ok(output)
}
