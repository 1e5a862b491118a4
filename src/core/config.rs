use crate::objectives::CodonOptimizationMethod;
use crate::{BaseBuddyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub constraints: ConstraintConfig,
    #[serde(default)]
    pub optimization: OptimizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Longest allowed run of each base
    #[serde(default)]
    pub homopolymer: HomopolymerLimits,
    #[serde(default = "default_hairpin_stem_size")]
    pub hairpin_stem_size: usize,
    #[serde(default = "default_hairpin_window")]
    pub hairpin_window: usize,
    #[serde(default = "default_gc_min")]
    pub gc_min: f64,
    #[serde(default = "default_gc_max")]
    pub gc_max: f64,
    #[serde(default = "default_gc_window")]
    pub gc_window: usize,
    #[serde(default = "default_kmer_size")]
    pub kmer_size: usize,
    #[serde(default = "default_true")]
    pub kmer_include_reverse_complement: bool,
    /// Enzyme names, e.g. "BsaI"
    #[serde(default = "default_restriction_sites")]
    pub restriction_sites: Vec<String>,
    /// Extra patterns: literal sequences, enzyme names or "NxB" runs.
    /// "9xA" forbids nine As in a row, while `homopolymer.a = 9` still
    /// allows a run of nine.
    #[serde(default)]
    pub avoid_patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomopolymerLimits {
    #[serde(default = "default_poly_at")]
    pub a: usize,
    #[serde(default = "default_poly_at")]
    pub t: usize,
    #[serde(default = "default_poly_cg")]
    pub c: usize,
    #[serde(default = "default_poly_cg")]
    pub g: usize,
}

impl HomopolymerLimits {
    /// `(base, max_run)` pairs in A, T, C, G order
    pub fn limits(&self) -> [(u8, usize); 4] {
        [(b'A', self.a), (b'T', self.t), (b'C', self.c), (b'G', self.g)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    #[serde(default)]
    pub method: CodonOptimizationMethod,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_max_random_iters")]
    pub max_random_iters: usize,
    #[serde(default = "default_max_optimization_passes")]
    pub max_optimization_passes: usize,
    /// Abort the whole batch on the first record that cannot be resolved
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_poly_at() -> usize {
    9
}

fn default_poly_cg() -> usize {
    6
}

fn default_hairpin_stem_size() -> usize {
    10
}

fn default_hairpin_window() -> usize {
    100
}

fn default_gc_min() -> f64 {
    0.3
}

fn default_gc_max() -> f64 {
    0.75
}

fn default_gc_window() -> usize {
    50
}

fn default_kmer_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_restriction_sites() -> Vec<String> {
    ["NdeI", "XhoI", "SpeI", "BamHI", "BsaI"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_seed() -> u64 {
    123
}

fn default_max_random_iters() -> usize {
    10000
}

fn default_max_optimization_passes() -> usize {
    20
}

impl Default for HomopolymerLimits {
    fn default() -> Self {
        Self {
            a: default_poly_at(),
            t: default_poly_at(),
            c: default_poly_cg(),
            g: default_poly_cg(),
        }
    }
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            homopolymer: HomopolymerLimits::default(),
            hairpin_stem_size: default_hairpin_stem_size(),
            hairpin_window: default_hairpin_window(),
            gc_min: default_gc_min(),
            gc_max: default_gc_max(),
            gc_window: default_gc_window(),
            kmer_size: default_kmer_size(),
            kmer_include_reverse_complement: true,
            restriction_sites: default_restriction_sites(),
            avoid_patterns: Vec::new(),
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            method: CodonOptimizationMethod::default(),
            seed: default_seed(),
            max_random_iters: default_max_random_iters(),
            max_optimization_passes: default_max_optimization_passes(),
            fail_fast: false,
        }
    }
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(BaseBuddyError::Configuration(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let c = &self.constraints;
        for (base, max_run) in c.homopolymer.limits() {
            check_range(
                &format!("homopolymer limit for {}", base as char),
                max_run,
                1,
                15,
            )?;
        }
        check_range("hairpin_stem_size", c.hairpin_stem_size, 1, 100)?;
        check_range("hairpin_window", c.hairpin_window, 50, 500)?;
        check_range("gc_window", c.gc_window, 1, usize::MAX)?;
        check_range("kmer_size", c.kmer_size, 1, usize::MAX)?;
        if !(0.0..=1.0).contains(&c.gc_min)
            || !(0.0..=1.0).contains(&c.gc_max)
            || c.gc_min > c.gc_max
        {
            return Err(BaseBuddyError::Configuration(format!(
                "GC bounds must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                c.gc_min, c.gc_max
            )));
        }

        let o = &self.optimization;
        check_range("max_random_iters", o.max_random_iters, 1, usize::MAX)?;
        check_range(
            "max_optimization_passes",
            o.max_optimization_passes,
            1,
            usize::MAX,
        )?;
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| BaseBuddyError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| BaseBuddyError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
