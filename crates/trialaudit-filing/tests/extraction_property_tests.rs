use proptest::prelude::*;
use trialaudit_filing::document::segment;
use trialaudit_filing::{
    dedup_passages, ownership_score, Lexicon, Passage, PhaseLabel, PhaseSet, SectionClass,
};

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("PROSPECTUS SUMMARY".to_string()),
        Just("RISK FACTORS".to_string()),
        Just("BUSINESS".to_string()),
        Just("MANAGEMENT".to_string()),
        Just("RISK FACTORS 14".to_string()),
        Just("Our product candidate ABC-123 is approved for nothing.".to_string()),
        Just("   ".to_string()),
        "[a-zA-Z0-9 ,.é]{0,60}",
    ]
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..30).prop_map(|lines| lines.join("\n"))
}

fn passages_strategy() -> impl Strategy<Value = Vec<Passage>> {
    prop::collection::vec((0usize..5000, 1usize..900), 0..40).prop_map(|spans| {
        spans
            .into_iter()
            .map(|(offset, len)| Passage {
                section: "BUSINESS".to_string(),
                section_class: SectionClass::Business,
                page_approx: 1,
                char_offset: offset,
                text: "p".repeat(len),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn sections_cover_the_document_exactly(text in document_strategy()) {
        let sections = segment(&text);
        prop_assert!(!sections.is_empty());
        prop_assert_eq!(sections[0].start, 0);
        prop_assert_eq!(sections[sections.len() - 1].end, text.len());
        for pair in sections.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn ownership_is_bounded_and_deterministic(text in document_strategy()) {
        let lexicon = Lexicon::new().unwrap();
        let first = ownership_score(&text, "ABC-123", &lexicon, 200);
        let second = ownership_score(&text, "ABC-123", &lexicon, 200);
        prop_assert!((-1.0..=1.0).contains(&first));
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn passage_dedup_is_idempotent(passages in passages_strategy(), tolerance in 0usize..200) {
        let once = dedup_passages(passages, tolerance);
        let twice = dedup_passages(once.clone(), tolerance);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn phase_normalization_is_a_fixed_point(
        first in 1u8..4,
        first_suffix in prop_oneof![Just(""), Just("a"), Just("b")],
        second in proptest::option::of(1u8..5),
    ) {
        let label = match second {
            Some(n) => format!("Phase {first}{first_suffix}/{n}"),
            None => format!("Phase {first}{first_suffix}"),
        };
        let parsed = PhaseLabel::parse(&label).unwrap();
        let canonical = parsed.phases();
        prop_assert!(canonical.numbers().contains(&first));
        if let Some(n) = second {
            prop_assert!(canonical.numbers().contains(&n));
        }
        let again = PhaseSet::from_registry(&canonical.to_registry());
        prop_assert_eq!(again, canonical);
    }
}
