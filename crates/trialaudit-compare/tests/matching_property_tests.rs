use proptest::prelude::*;
use std::collections::BTreeSet;

use trialaudit_compare::{assign_passages, MatchWeights, RuleLexicon};
use trialaudit_filing::{Passage, PhaseLabel, PhaseSet, SectionClass};
use trialaudit_registry::RegistryRecord;

const IDS: &[&str] = &["NCT00000001", "NCT00000002", "NCT00000003"];
const CONDITIONS: &[&str] = &["Psoriatic Arthritis", "Uveitis", "Hidradenitis Suppurativa"];
const PHASES: &[&str] = &["PHASE1", "PHASE2", "PHASE3"];
const SUFFIXES: &[&str] = &["", "a", "b"];

const FRAGMENTS: &[&str] = &[
    "NCT00000001",
    "NCT00000002",
    "NCT00000003",
    "in PsA",
    "patients with uveitis",
    "in HS",
    "a Phase 2 trial",
    "our Phase 2b/3 program",
    "Phase 1",
    "enrolled 120 patients",
    "approximately 40 subjects",
    "manufacturing scale-up",
    "quarterly results",
    "hidradenitis suppurativa study",
];

fn passage_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..5).prop_map(|parts| parts.join(" "))
}

fn record_strategy() -> impl Strategy<Value = RegistryRecord> {
    (
        prop::sample::select(IDS),
        prop::sample::select(CONDITIONS),
        prop::sample::select(PHASES),
        prop::option::of(1u64..500),
    )
        .prop_map(|(id, condition, phase, enrollment)| {
            let mut record = RegistryRecord::default();
            record.identification.nct_id = id.to_string();
            record.identification.brief_title = format!("A study in {condition}");
            record.identification.conditions = vec![condition.to_string()];
            record.design.phases = vec![phase.to_string()];
            record.design.enrollment_count = enrollment;
            record
        })
}

fn to_passages(texts: &[String]) -> Vec<Passage> {
    texts
        .iter()
        .enumerate()
        .map(|(idx, text)| Passage {
            section: "BUSINESS".to_string(),
            section_class: SectionClass::Business,
            page_approx: 1,
            char_offset: idx,
            text: text.clone(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn every_passage_lands_in_exactly_one_place(
        texts in prop::collection::vec(passage_strategy(), 0..12),
        records in prop::collection::vec(record_strategy(), 0..4),
    ) {
        let rules = RuleLexicon::new().unwrap();
        let passages = to_passages(&texts);
        let assignment = assign_passages(&passages, &records, &rules, &MatchWeights::default());

        prop_assert_eq!(assignment.buckets.len(), records.len());
        prop_assert_eq!(assignment.assigned() + assignment.unmatched.len(), passages.len());

        let mut offsets: Vec<usize> = assignment
            .buckets
            .iter()
            .flat_map(|b| b.passages.iter().map(|p| p.passage.char_offset))
            .chain(assignment.unmatched.iter().map(|p| p.char_offset))
            .collect();
        offsets.sort_unstable();
        prop_assert_eq!(offsets, (0..passages.len()).collect::<Vec<_>>());
    }

    #[test]
    fn assigned_passages_score_above_zero(
        texts in prop::collection::vec(passage_strategy(), 0..12),
        records in prop::collection::vec(record_strategy(), 1..4),
    ) {
        let rules = RuleLexicon::new().unwrap();
        let passages = to_passages(&texts);
        let assignment = assign_passages(&passages, &records, &rules, &MatchWeights::default());
        for bucket in &assignment.buckets {
            for scored in &bucket.passages {
                prop_assert!(scored.score > 0.0);
                prop_assert_eq!(scored.score, scored.breakdown.total());
            }
        }
    }

    #[test]
    fn matching_is_deterministic(
        texts in prop::collection::vec(passage_strategy(), 0..8),
        records in prop::collection::vec(record_strategy(), 0..4),
    ) {
        let rules = RuleLexicon::new().unwrap();
        let passages = to_passages(&texts);
        let weights = MatchWeights::default();
        let first = assign_passages(&passages, &records, &rules, &weights);
        let second = assign_passages(&passages, &records, &rules, &weights);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn canonical_phases_survive_registry_round_trip(
        first in 1u8..4,
        second in prop::option::of(1u8..5),
        suffix in prop::sample::select(SUFFIXES),
    ) {
        let label = match second {
            Some(n) => format!("Phase {first}{suffix}/{n}"),
            None => format!("Phase {first}{suffix}"),
        };
        let parsed = PhaseLabel::parse(&label).unwrap();
        let canonical = parsed.phases();
        let numbers: BTreeSet<u8> = canonical.numbers();
        prop_assert!(numbers.contains(&first));
        if let Some(n) = second {
            prop_assert!(numbers.contains(&n));
        }
        let again = PhaseSet::from_registry(&canonical.to_registry());
        prop_assert_eq!(again, canonical);
    }
}
