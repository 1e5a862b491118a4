use super::{Constraint, HomopolymerConstraint, Span, Violation};
use crate::bio::genetic_code;
use crate::bio::sequence::SequenceModel;
use crate::{BaseBuddyError, Result};

/// Restriction enzymes known by name, with their recognition sites
pub const RESTRICTION_SITES: &[(&str, &str)] = &[
    ("BamHI", "GGATCC"),
    ("BsaI", "GGTCTC"),
    ("BsmBI", "CGTCTC"),
    ("EcoRI", "GAATTC"),
    ("HindIII", "AAGCTT"),
    ("KpnI", "GGTACC"),
    ("NcoI", "CCATGG"),
    ("NdeI", "CATATG"),
    ("NotI", "GCGGCCGC"),
    ("PstI", "CTGCAG"),
    ("SacI", "GAGCTC"),
    ("SpeI", "ACTAGT"),
    ("XbaI", "TCTAGA"),
    ("XhoI", "CTCGAG"),
];

/// Recognition site for an enzyme name, case-insensitive. A trailing
/// `_site` is accepted (`BsaI_site`).
pub fn site_sequence(name: &str) -> Option<&'static str> {
    let name = name.strip_suffix("_site").unwrap_or(name);
    RESTRICTION_SITES
        .iter()
        .find(|(enzyme, _)| enzyme.eq_ignore_ascii_case(name))
        .map(|(_, site)| *site)
}

/// Forbids every occurrence of a DNA pattern on either strand
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    name: Option<String>,
    pattern: Vec<u8>,
    reverse: Vec<u8>,
}

impl PatternConstraint {
    /// Literal pattern over `ACGT`
    pub fn literal(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim().to_ascii_uppercase().into_bytes();
        if pattern.is_empty() {
            return Err(BaseBuddyError::Configuration("empty pattern".to_string()));
        }
        if let Some(&bad) = pattern.iter().find(|b| !matches!(b, b'A' | b'C' | b'G' | b'T')) {
            return Err(BaseBuddyError::Configuration(format!(
                "pattern '{}' contains invalid symbol '{}'",
                String::from_utf8_lossy(&pattern),
                bad as char
            )));
        }
        let reverse = genetic_code::reverse_complement(&pattern);
        Ok(Self {
            name: None,
            pattern,
            reverse,
        })
    }

    pub fn from_site_name(name: &str) -> Result<Self> {
        let site = site_sequence(name).ok_or_else(|| {
            BaseBuddyError::Configuration(format!("unknown restriction enzyme '{}'", name))
        })?;
        let enzyme = name.strip_suffix("_site").unwrap_or(name);
        let canonical = RESTRICTION_SITES
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(enzyme))
            .map(|(e, _)| *e)
            .unwrap_or(enzyme);
        let mut constraint = Self::literal(site)?;
        constraint.name = Some(format!("{}_site", canonical));
        Ok(constraint)
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn is_palindromic(&self) -> bool {
        self.pattern == self.reverse
    }

    fn pattern_str(&self) -> String {
        String::from_utf8_lossy(&self.pattern).to_string()
    }
}

fn occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle)
        .map(|(i, _)| i)
        .collect()
}

impl Constraint for PatternConstraint {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("AvoidPattern({}: {})", name, self.pattern_str()),
            None => format!("AvoidPattern({})", self.pattern_str()),
        }
    }

    fn evaluate(&self, sequence: &SequenceModel) -> Vec<Violation> {
        let nts = sequence.nucleotides();
        let len = self.pattern.len();
        let display = self.name.clone().unwrap_or_else(|| self.pattern_str());

        let mut hits: Vec<(usize, bool)> = occurrences(nts, &self.pattern)
            .into_iter()
            .map(|p| (p, false))
            .collect();
        if !self.is_palindromic() {
            hits.extend(occurrences(nts, &self.reverse).into_iter().map(|p| (p, true)));
            hits.sort_unstable();
        }

        hits.into_iter()
            .map(|(start, reverse)| {
                let strand = if reverse { " (reverse strand)" } else { "" };
                Violation::new(
                    self.label(),
                    Span::new(start, start + len),
                    format!("{} found at {}{}", display, start, strand),
                )
            })
            .collect()
    }
}

/// Parse a pattern specification from configuration.
///
/// Accepts an enzyme name (`BsaI`, `BsaI_site`), a homopolymer shorthand
/// `NxB` meaning "N consecutive B" (so `9xA` forbids runs of 9 or more As),
/// or a literal `ACGT` pattern.
pub fn parse_pattern_constraint(text: &str) -> Result<Box<dyn Constraint>> {
    let text = text.trim();
    if site_sequence(text).is_some() {
        return Ok(Box::new(PatternConstraint::from_site_name(text)?));
    }
    if let Some((count, base)) = text.split_once(|c: char| c == 'x' || c == 'X') {
        if let Ok(count) = count.parse::<usize>() {
            let base = base.to_ascii_uppercase();
            return match base.as_bytes() {
                [b @ (b'A' | b'C' | b'G' | b'T')] if count >= 1 => {
                    Ok(Box::new(HomopolymerConstraint::new(*b, count - 1)))
                }
                _ => Err(BaseBuddyError::Configuration(format!(
                    "invalid homopolymer pattern '{}'",
                    text
                ))),
            };
        }
    }
    Ok(Box::new(PatternConstraint::literal(text)?))
}
