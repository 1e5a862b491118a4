pub mod fasta;
pub mod genetic_code;
pub mod sequence;

pub use genetic_code::{Codon, STOP};
pub use sequence::SequenceModel;
