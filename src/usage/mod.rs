//! Codon usage tables and the organism databases they are built from

pub mod database;
pub mod table;

pub use database::{CachedTableSource, CodonTableSource, OrganismEntry, TsvCodonDatabase};
pub use table::CodonUsageTable;
