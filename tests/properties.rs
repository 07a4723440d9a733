//! Property tests for the generation engine.
//!
//! Random syllable tables are built from one-letter onsets and one-letter
//! nuclei so syllable names (`onset + nucleus`) are unique by construction.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use reclist::{
    pairs::PhonemePairIndex,
    pattern::enumerate_patterns,
    Fluency, GenerateOptions, Generator, Mode, Policy, SyllableIndex,
};

const ONSETS: &[&str] = &["k", "s", "t", "n", "h", "m", "y", "r", "w", "g", "z", "d"];
const NUCLEI: &[&str] = &["a", "i", "u", "e", "o"];

fn arb_table() -> impl Strategy<Value = SyllableIndex> {
    prop::collection::btree_set((0..ONSETS.len(), 0..NUCLEI.len()), 1..45).prop_map(
        |pairs: BTreeSet<(usize, usize)>| {
            let triples: Vec<(String, &str, &str)> = pairs
                .into_iter()
                .map(|(l, r)| (format!("{}{}", ONSETS[l], NUCLEI[r]), ONSETS[l], NUCLEI[r]))
                .collect();
            SyllableIndex::from_triples(triples.iter().map(|(s, l, r)| (s.as_str(), *l, *r)))
                .unwrap()
        },
    )
}

fn arb_options() -> impl Strategy<Value = GenerateOptions> {
    (
        prop_oneof![Just(Mode::Cvvc), Just(Mode::Vcv), Just(Mode::VcvWithVc)],
        prop_oneof![Just(Policy::Default), Just(Policy::NoInTurn)],
        40u32..240,
        2usize..=8,
        any::<bool>(),
        0usize..40,
        0usize..20,
    )
        .prop_map(|(mode, policy, bpm, max_length, sss_first, iter_depth, max_redundancy)| {
            GenerateOptions { mode, policy, bpm, max_length, sss_first, iter_depth, max_redundancy }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_syllable_covered_exactly_once(table in arb_table(), options in arb_options()) {
        let generation = Generator::new(table.clone()).generate(&options).unwrap();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for line in &generation.lines {
            for syllable in line.syllables() {
                *seen.entry(syllable).or_default() += 1;
            }
        }
        prop_assert_eq!(seen.len(), table.len());
        for (syllable, _) in table.iter() {
            prop_assert_eq!(seen.get(syllable).copied(), Some(1), "syllable {}", syllable);
        }
    }

    #[test]
    fn lines_respect_length_bound(table in arb_table(), options in arb_options()) {
        let generation = Generator::new(table).generate(&options).unwrap();
        for line in &generation.lines {
            prop_assert!(!line.is_empty());
            prop_assert!(line.len() <= options.max_length);
            if line.fluency != Fluency::NotFluent {
                prop_assert_eq!(line.len(), options.max_length);
            }
        }
    }

    #[test]
    fn stats_match_lines(table in arb_table(), options in arb_options()) {
        let generation = Generator::new(table).generate(&options).unwrap();
        let stats = generation.stats;

        let count = |f: Fluency| generation.lines.iter().filter(|l| l.fluency == f).count();
        prop_assert_eq!(stats.perfect_fluent, count(Fluency::Perfect));
        prop_assert_eq!(stats.in_turn_fluent, count(Fluency::InTurn));

        let isolated: usize = generation
            .lines
            .iter()
            .filter(|l| l.fluency == Fluency::NotFluent)
            .map(|l| l.len())
            .sum();
        prop_assert_eq!(stats.not_fluent, isolated);

        let padding: usize = generation.lines.iter().map(|l| l.padding()).sum();
        prop_assert_eq!(stats.redundancy, padding);
        prop_assert!(stats.redundancy <= options.max_redundancy);
        if options.policy == Policy::NoInTurn {
            prop_assert_eq!(stats.redundancy, 0);
            prop_assert_eq!(stats.in_turn_fluent, 0);
        }
    }

    #[test]
    fn generation_is_deterministic(table in arb_table(), options in arb_options()) {
        let generator = Generator::new(table);
        let first = generator.generate(&options).unwrap();
        let second = generator.generate(&options).unwrap();
        prop_assert_eq!(first.script_lines(), second.script_lines());
        prop_assert_eq!(first.oto_lines(), second.oto_lines());
        prop_assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn template_follows_lines(table in arb_table(), options in arb_options()) {
        let generation = Generator::new(table).generate(&options).unwrap();
        prop_assert_eq!(generation.template.len(), generation.lines.len());
        for (line, template) in generation.lines.iter().zip(&generation.template) {
            prop_assert_eq!(line.name(), template.name.clone());
            prop_assert!(!template.entries.is_empty());
            for entry in &template.entries {
                prop_assert!(entry.offset >= 0.0);
                prop_assert!(entry.cutoff < 0.0);
            }
            let boundaries = template.boundaries();
            prop_assert!(boundaries.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn pair_index_stays_consistent(
        table in arb_table(),
        steps in prop::collection::vec((any::<bool>(), 0usize..16, 0usize..5), 0..40),
    ) {
        let mut index = PhonemePairIndex::new(&table);
        prop_assert_eq!(index.len(), table.len());

        for (by_right, key_pick, count) in steps {
            let keys = if by_right { index.all_rights() } else { index.all_lefts() };
            if keys.is_empty() {
                break;
            }
            let key = &keys[key_pick % keys.len()];
            let before = index.len();
            let taken = if by_right {
                index.consume_lefts_for(key, count)
            } else {
                index.consume_rights_for(key, count)
            };
            prop_assert!(taken.len() <= count);
            prop_assert_eq!(index.len(), before - taken.len());
            prop_assert!(index.is_consistent());
        }
    }

    #[test]
    fn patterns_are_valid(max_period in 2usize..=8, divisor in 1usize..=24) {
        let patterns = enumerate_patterns(max_period, divisor);
        for pattern in &patterns {
            prop_assert_eq!(divisor % pattern.period(), 0);
            prop_assert!(pattern.distinct >= 2);
            prop_assert_eq!(pattern.distinct, pattern.labels.iter().max().unwrap() + 1);
        }
        prop_assert!(patterns.windows(2).all(|w| w[0].distinct <= w[1].distinct));
    }
}
