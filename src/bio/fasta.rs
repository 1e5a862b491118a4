//! FASTA input/output for coding sequences
//!
//! Record parsing is delegated to `bio::io::fasta`; this module only turns
//! records into validated [`SequenceModel`]s and writes annotated results.

use crate::bio::sequence::SequenceModel;
use crate::{BaseBuddyError, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Read every record from a FASTA source. Records are validated in order;
/// the first invalid record aborts the read.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SequenceModel>> {
    let mut sequences = Vec::new();
    for record in bio::io::fasta::Reader::new(reader).records() {
        let record = record.map_err(|e| BaseBuddyError::Parse(format!("Failed to read FASTA record: {}", e)))?;
        let mut seq = SequenceModel::new(record.id(), record.seq())?;
        if let Some(desc) = record.desc() {
            seq = seq.with_description(desc.to_string());
        }
        sequences.push(seq);
    }
    Ok(sequences)
}

pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<SequenceModel>> {
    read_records(data)
}

pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceModel>> {
    let file = File::open(path.as_ref())?;
    read_records(file)
}

/// Header annotation for a recoded record, e.g.
/// `gene (method: harmonize_rca, source_taxid: 9606, target_taxid: 83333)`
pub fn recoding_header(id: &str, notes: &str) -> String {
    format!(">{} ({})", id, notes)
}

pub fn write_recodings<W: Write>(writer: W, recodings: &[(String, String, String)]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for (id, notes, sequence) in recodings {
        writeln!(writer, "{}", recoding_header(id, notes))?;
        writeln!(writer, "{}", sequence)?;
    }
    writer.flush()?;
    Ok(())
}
