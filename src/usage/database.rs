//! Organism codon usage databases
//!
//! The on-disk format is the CoCoPUTs species table: tab-separated, one row
//! per genome assembly, with `Taxid`, `Species`, `# CDS` and one count
//! column per codon. A taxon can appear on several rows; the row with the
//! most coding sequences wins.

use crate::bio::genetic_code::{self, Codon};
use crate::usage::table::CodonUsageTable;
use crate::{BaseBuddyError, Result};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TAXID_COLUMN: &str = "Taxid";
const SPECIES_COLUMN: &str = "Species";
const CDS_COLUMN: &str = "# CDS";

/// Anything that can produce the codon usage table of a taxon
pub trait CodonTableSource {
    fn table_for_taxon(&self, taxid: u32) -> Result<CodonUsageTable>;
}

impl CodonTableSource for HashMap<u32, CodonUsageTable> {
    fn table_for_taxon(&self, taxid: u32) -> Result<CodonUsageTable> {
        self.get(&taxid).cloned().ok_or_else(|| {
            BaseBuddyError::InvalidInput(format!("taxon {} not found in codon database", taxid))
        })
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OrganismEntry {
    pub taxid: u32,
    pub species: String,
    pub cds_count: f64,
}

impl OrganismEntry {
    /// Display label, e.g. `Escherichia coli (TaxID: 562)`
    pub fn label(&self) -> String {
        format!("{} (TaxID: {})", self.species, self.taxid)
    }
}

struct ColumnLayout {
    taxid: usize,
    species: Option<usize>,
    cds: usize,
    codons: Vec<(Codon, usize)>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let taxid = find(TAXID_COLUMN).ok_or_else(|| {
            BaseBuddyError::Parse(format!("codon database has no '{}' column", TAXID_COLUMN))
        })?;
        let cds = find(CDS_COLUMN).ok_or_else(|| {
            BaseBuddyError::Parse(format!("codon database has no '{}' column", CDS_COLUMN))
        })?;

        let mut codons = Vec::with_capacity(64);
        for (_, codon) in genetic_code::all_codons() {
            let name = String::from_utf8_lossy(codon);
            let idx = find(name.as_ref()).ok_or_else(|| {
                BaseBuddyError::Parse(format!("codon database has no '{}' column", name))
            })?;
            codons.push((*codon, idx));
        }

        Ok(Self {
            taxid,
            species: find(SPECIES_COLUMN),
            cds,
            codons,
        })
    }
}

fn parse_field<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize, column: &str) -> Result<T> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| {
        BaseBuddyError::Parse(format!("invalid value '{}' in column '{}'", raw, column))
    })
}

/// Codon database backed by a CoCoPUTs-style TSV file
#[derive(Debug, Clone)]
pub struct TsvCodonDatabase {
    path: PathBuf,
}

impl TsvCodonDatabase {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<(csv::Reader<File>, ColumnLayout)> {
        let file = File::open(&self.path).map_err(|e| {
            BaseBuddyError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", self.path.display(), e),
            ))
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(false)
            .from_reader(file);
        let layout = ColumnLayout::from_headers(reader.headers()?)?;
        Ok((reader, layout))
    }

    /// Raw codon counts for `taxid`, taken from its row with the largest
    /// `# CDS` (the first such row on ties).
    pub fn counts_for_taxon(&self, taxid: u32) -> Result<BTreeMap<Codon, f64>> {
        let (mut reader, layout) = self.open()?;
        let mut best: Option<(f64, csv::StringRecord)> = None;

        for record in reader.records() {
            let record = record?;
            let row_taxid: u32 = parse_field(&record, layout.taxid, TAXID_COLUMN)?;
            if row_taxid != taxid {
                continue;
            }
            let cds: f64 = parse_field(&record, layout.cds, CDS_COLUMN)?;
            if best.as_ref().map_or(true, |(best_cds, _)| cds > *best_cds) {
                best = Some((cds, record));
            }
        }

        let (cds, record) = best.ok_or_else(|| {
            BaseBuddyError::InvalidInput(format!("taxon {} not found in codon database", taxid))
        })?;
        tracing::debug!("Using row with {} coding sequences for taxon {}", cds, taxid);

        let mut counts = BTreeMap::new();
        for (codon, idx) in &layout.codons {
            let count: f64 = parse_field(&record, *idx, &String::from_utf8_lossy(codon))?;
            counts.insert(*codon, count);
        }
        Ok(counts)
    }

    /// One entry per taxon (the row with the most coding sequences), sorted
    /// by species name.
    pub fn organisms(&self) -> Result<Vec<OrganismEntry>> {
        let (mut reader, layout) = self.open()?;
        let mut by_taxid: BTreeMap<u32, OrganismEntry> = BTreeMap::new();

        for record in reader.records() {
            let record = record?;
            let taxid: u32 = parse_field(&record, layout.taxid, TAXID_COLUMN)?;
            let cds_count: f64 = parse_field(&record, layout.cds, CDS_COLUMN)?;
            let species = layout
                .species
                .and_then(|idx| record.get(idx))
                .unwrap_or("")
                .trim()
                .to_string();

            let replace = by_taxid
                .get(&taxid)
                .map_or(true, |existing| cds_count > existing.cds_count);
            if replace {
                by_taxid.insert(
                    taxid,
                    OrganismEntry {
                        taxid,
                        species,
                        cds_count,
                    },
                );
            }
        }

        let mut organisms: Vec<OrganismEntry> = by_taxid.into_values().collect();
        organisms.sort_by(|a, b| a.species.cmp(&b.species).then(a.taxid.cmp(&b.taxid)));
        Ok(organisms)
    }
}

impl CodonTableSource for TsvCodonDatabase {
    fn table_for_taxon(&self, taxid: u32) -> Result<CodonUsageTable> {
        let counts = self.counts_for_taxon(taxid)?;
        Ok(CodonUsageTable::from_counts(&counts)?.with_label(format!("TaxID: {}", taxid)))
    }
}

/// Process-lifetime cache of tables keyed by taxon id. Tables are immutable
/// and small, so entries are never evicted.
pub struct CachedTableSource<S> {
    inner: S,
    cache: DashMap<u32, Arc<CodonUsageTable>>,
}

impl<S: CodonTableSource> CachedTableSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn get(&self, taxid: u32) -> Result<Arc<CodonUsageTable>> {
        if let Some(entry) = self.cache.get(&taxid) {
            return Ok(Arc::clone(entry.value()));
        }
        let table = Arc::new(self.inner.table_for_taxon(taxid)?);
        self.cache.insert(taxid, Arc::clone(&table));
        Ok(table)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<S: CodonTableSource> CodonTableSource for CachedTableSource<S> {
    fn table_for_taxon(&self, taxid: u32) -> Result<CodonUsageTable> {
        self.get(taxid).map(|table| (*table).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_database(rows: &[(u32, &str, u64, Vec<(&str, u64)>)]) -> NamedTempFile {
        let codons: Vec<String> = genetic_code::all_codons()
            .map(|(_, c)| String::from_utf8_lossy(c).to_string())
            .collect();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Taxid\tSpecies\t# CDS\t{}", codons.join("\t")).unwrap();
        for (taxid, species, cds, overrides) in rows {
            let values: Vec<String> = codons
                .iter()
                .map(|c| {
                    overrides
                        .iter()
                        .find(|(name, _)| *name == c.as_str())
                        .map(|(_, v)| v.to_string())
                        .unwrap_or_else(|| "10".to_string())
                })
                .collect();
            writeln!(file, "{}\t{}\t{}\t{}", taxid, species, cds, values.join("\t")).unwrap();
        }
        file
    }

    #[test]
    fn test_table_for_taxon_picks_largest_row() {
        let file = write_database(&[
            (562, "Escherichia coli", 100, vec![("AGC", 90)]),
            (562, "Escherichia coli", 4000, vec![("AGT", 90)]),
            (9606, "Homo sapiens", 20000, vec![]),
        ]);
        let db = TsvCodonDatabase::new(file.path());
        let table = db.table_for_taxon(562).unwrap();
        assert_eq!(table.best_codon(b'S'), Some(*b"AGT"));
        assert_eq!(table.label(), Some("TaxID: 562"));
    }

    #[test]
    fn test_ties_keep_first_row() {
        let file = write_database(&[
            (562, "Escherichia coli", 4000, vec![("AGC", 90)]),
            (562, "Escherichia coli", 4000, vec![("AGT", 90)]),
        ]);
        let db = TsvCodonDatabase::new(file.path());
        assert_eq!(db.table_for_taxon(562).unwrap().best_codon(b'S'), Some(*b"AGC"));
    }

    #[test]
    fn test_missing_taxon_is_invalid_input() {
        let file = write_database(&[(562, "Escherichia coli", 100, vec![])]);
        let db = TsvCodonDatabase::new(file.path());
        assert!(matches!(
            db.table_for_taxon(4932),
            Err(BaseBuddyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_codon_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Taxid\tSpecies\t# CDS\tAAA").unwrap();
        writeln!(file, "562\tEscherichia coli\t10\t5").unwrap();
        let db = TsvCodonDatabase::new(file.path());
        assert!(matches!(db.table_for_taxon(562), Err(BaseBuddyError::Parse(_))));
    }

    #[test]
    fn test_organisms() {
        let file = write_database(&[
            (9606, "Homo sapiens", 20000, vec![]),
            (562, "Escherichia coli", 100, vec![]),
            (562, "Escherichia coli K-12", 4000, vec![]),
        ]);
        let db = TsvCodonDatabase::new(file.path());
        let organisms = db.organisms().unwrap();
        assert_eq!(organisms.len(), 2);
        assert_eq!(organisms[0].label(), "Escherichia coli K-12 (TaxID: 562)");
        assert_eq!(organisms[1].taxid, 9606);
    }

    struct CountingSource {
        calls: Cell<usize>,
        table: CodonUsageTable,
    }

    impl CodonTableSource for CountingSource {
        fn table_for_taxon(&self, taxid: u32) -> Result<CodonUsageTable> {
            self.calls.set(self.calls.get() + 1);
            if taxid == 562 {
                Ok(self.table.clone())
            } else {
                Err(BaseBuddyError::InvalidInput(format!("taxon {} not found", taxid)))
            }
        }
    }

    #[test]
    fn test_cache_loads_each_taxon_once() {
        let counts: BTreeMap<Codon, f64> = genetic_code::all_codons().map(|(_, c)| (*c, 1.0)).collect();
        let source = CountingSource {
            calls: Cell::new(0),
            table: CodonUsageTable::from_counts(&counts).unwrap(),
        };
        let cached = CachedTableSource::new(source);

        let first = cached.get(562).unwrap();
        let second = cached.get(562).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached.inner().calls.get(), 1);
        assert_eq!(cached.len(), 1);

        // Failures are not cached
        assert!(cached.get(1).is_err());
        assert!(cached.get(1).is_err());
        assert_eq!(cached.inner().calls.get(), 3);
        assert_eq!(cached.len(), 1);
    }
}
