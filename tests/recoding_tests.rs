mod common;

use basebuddy::bio::genetic_code;
use basebuddy::bio::sequence::SequenceModel;
use basebuddy::constraints::ConstraintSet;
use basebuddy::objectives::CodonOptimizationMethod;
use basebuddy::usage::{CachedTableSource, TsvCodonDatabase};
use basebuddy::{BaseBuddyError, Config, Recoder, RecordOutcome};
use common::{TestEnvironment, ECOLI, HUMAN};
use pretty_assertions::assert_eq;

fn recoder(env: &TestEnvironment, config: Config, source: Option<u32>) -> Recoder {
    let tables = CachedTableSource::new(TsvCodonDatabase::new(env.codon_database()));
    Recoder::from_source(config, &tables, ECOLI, source)
        .unwrap()
        .with_silent(true)
}

#[test]
fn test_best_codon_scenario() {
    let env = TestEnvironment::new();
    let recoder = recoder(&env, Config::default(), None);
    let record = SequenceModel::new("gene", "ATGAGTAGT").unwrap();

    let recoding = recoder.recode_record(&record).unwrap();
    assert_eq!(recoding.recoded.as_str(), "ATGAGCAGC");
    assert_eq!(recoding.recoded.translation(), record.translation());
    assert_eq!(recoding.notes, "method: use_best_codon, target_taxid: 83333");
}

#[test]
fn test_ten_a_run_is_broken() {
    let env = TestEnvironment::new();
    let recoder = recoder(&env, Config::default(), None);
    // Met Ala Lys Lys Lys Thr Gly Trp: ten As from position 6
    let record = SequenceModel::new("run", "ATGGCCAAAAAAAAAACCGGCTGG").unwrap();

    let recoding = recoder.recode_record(&record).unwrap();
    assert!(!recoding.recoded.as_str().contains(&"A".repeat(10)));
    assert_eq!(recoding.recoded.translation(), record.translation());

    let constraints = ConstraintSet::from_config(&recoder.config().constraints, &record).unwrap();
    assert!(constraints.evaluate(&recoding.recoded).is_empty());
}

#[test]
fn test_fixed_context_site_fails_deterministically() {
    let env = TestEnvironment::new();
    let mut config = Config::default();
    config.constraints.avoid_patterns.push("TGGATG".to_string());
    let recoder = recoder(&env, config, None);
    // Trp and Met have a single codon each
    let record = SequenceModel::new("fixed", "ATGTGGATGTGG").unwrap();

    let first = recoder.recode_record(&record).unwrap_err().to_string();
    let second = recoder.recode_record(&record).unwrap_err().to_string();
    assert_eq!(first, second);
    assert!(first.contains("AvoidPattern(TGGATG)"));
    assert!(matches!(
        recoder.recode_record(&record),
        Err(BaseBuddyError::UnsatisfiableConstraints { .. })
    ));
}

#[test]
fn test_same_seed_same_output() {
    let env = TestEnvironment::new();
    // GFP N-terminus with a BsaI site and an A run spliced in
    let mut nts = common::back_translate(b"MSKGEELFTGVVPILVELDGDVNGHKF");
    nts.push_str("GGTCTCAAAAAAAAAAAG");
    nts.push_str(&common::back_translate(b"SVSGEGEGDATYGKLTLKFICTTGKLPVPW"));
    let record = SequenceModel::new("gfp", &nts).unwrap();

    let recode = || {
        recoder(&env, Config::default(), None)
            .recode_record(&record)
            .unwrap()
    };
    let first = recode();
    let second = recode();
    assert_eq!(first.recoded.as_str(), second.recoded.as_str());

    let recoded = first.recoded;
    assert_eq!(recoded.translation(), record.translation());
    assert!(!recoded.as_str().contains("GGTCTC"));
    assert!(!recoded.as_str().contains("GAGACC"));
    assert!(!recoded.as_str().contains(&"A".repeat(10)));
    let constraints = ConstraintSet::from_config(&Config::default().constraints, &record).unwrap();
    assert!(constraints.evaluate(&recoded).is_empty());
}

#[test]
fn test_batch_order_does_not_change_results() {
    let env = TestEnvironment::new();
    let recoder = recoder(&env, Config::default(), None);
    let a = SequenceModel::new("a", "ATGGCCAAAAAAAAAACCGGCTGG").unwrap();
    let b = SequenceModel::new("b", "ATGAGTAGTGAAGCATGG").unwrap();

    let forward = recoder.recode_all(&[a.clone(), b.clone()]).unwrap();
    let backward = recoder.recode_all(&[b, a]).unwrap();
    let sequence_of = |outcomes: &[RecordOutcome], id: &str| {
        outcomes
            .iter()
            .find(|o| o.id() == id)
            .and_then(|o| o.recoding())
            .map(|r| r.recoded.as_str().to_string())
    };
    assert_eq!(sequence_of(&forward, "a"), sequence_of(&backward, "a"));
    assert_eq!(sequence_of(&forward, "b"), sequence_of(&backward, "b"));
}

#[test]
fn test_use_best_codon_is_idempotent() {
    let env = TestEnvironment::new();
    let recoder = recoder(&env, Config::default(), None);
    let record = SequenceModel::new("run", "ATGGCCAAAAAAAAAACCGGCTGG").unwrap();

    let once = recoder.recode_record(&record).unwrap().recoded;
    let twice = recoder.recode_record(&once).unwrap();
    assert_eq!(twice.recoded.as_str(), once.as_str());
    assert_eq!(twice.changed_codons(), 0);
}

#[test]
fn test_harmonize_rca_follows_source_ranks() {
    let env = TestEnvironment::new();
    let mut config = Config::default();
    config.optimization.method = CodonOptimizationMethod::HarmonizeRca;
    let recoder = recoder(&env, config, Some(HUMAN));
    let record = SequenceModel::new("gene", "ATGAGTAGT").unwrap();

    // AGT is the third most used Ser codon in the source; TCA holds that
    // rank in the target
    let recoding = recoder.recode_record(&record).unwrap();
    assert_eq!(recoding.recoded.as_str(), "ATGTCATCA");
    assert_eq!(
        recoding.notes,
        "method: harmonize_rca, source_taxid: 9606, target_taxid: 83333"
    );
}

#[test]
fn test_match_codon_usage_improves_score() {
    let env = TestEnvironment::new();
    let mut config = Config::default();
    config.optimization.method = CodonOptimizationMethod::MatchCodonUsage;
    let recoder = recoder(&env, config, None);
    // Met Ala Leu Ala Asp Ala Asn Ala Trp, every Ala as GCA
    let record = SequenceModel::new("gene", "ATGGCACTGGCAGATGCAAACGCATGG").unwrap();

    let recoding = recoder.recode_record(&record).unwrap();
    assert!(recoding.stats.final_score > recoding.stats.initial_score);
    assert_eq!(recoding.recoded.translation(), record.translation());
    // The target mixes Ala codons, so neither GCA nor GCT takes all four
    let alanines: Vec<_> = recoding.recoded.codons().skip(1).step_by(2).take(4).collect();
    assert!(alanines.iter().any(|c| c != b"GCA"));
    assert!(alanines.iter().any(|c| c != b"GCT"));
}

#[test]
fn test_reports_list_every_constraint() {
    let env = TestEnvironment::new();
    let recoder = recoder(&env, Config::default(), None);
    let record = SequenceModel::new("gene", "ATGAGTAGT").unwrap();
    let recoding = recoder.recode_record(&record).unwrap();

    // k-mers, hairpins, 4 homopolymers, 5 sites, GC, translation
    let lines: Vec<&str> = recoding.constraints_summary.lines().collect();
    assert_eq!(lines.len(), 13);
    assert!(lines.iter().all(|l| l.starts_with("PASS")));
    assert!(recoding.objectives_summary.contains("method: use_best_codon"));
    assert!(genetic_code::translate(recoding.recoded.nucleotides()).is_some());
}
