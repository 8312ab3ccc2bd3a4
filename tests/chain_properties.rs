//! Property tests for push chains and the pull adapter.

use cascade_rs::{ChainBuilder, Collector, Observed, Record, Result, build_filters, records};
use proptest::prelude::*;

const STAGES: &[&str] = &[
    "UPPER",
    "LOWER",
    "REVERSE",
    "TRIM",
    "CHANGE /a/ /zz/",
    "DROPEMPTY",
    "LOCATE /a/",
    "NLOCATE /b/",
    "TAKE 3",
    "SKIP 1",
    "DUPLICATE 2",
    "SPLIT / /",
    "COUNT",
];

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-c ]{0,6}\n", 0..16)
}

fn stage_list_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(STAGES), 0..5).prop_map(|s| s.join(" | "))
}

fn to_records(lines: &[String]) -> Vec<Record> {
    lines.iter().map(|s| Record::from_str(s)).collect()
}

fn push_run(stage_text: &str, input: Vec<Record>) -> (Vec<Record>, Vec<Observed>) {
    let sink = Collector::new();
    let out = sink.handle();
    let mut head = ChainBuilder::new()
        .filters(build_filters(stage_text).unwrap())
        .consumer(sink)
        .build()
        .unwrap();
    head.run(records(input)).unwrap();
    (out.records(), out.events())
}

fn pull_run(stage_text: &str, input: Vec<Record>) -> Vec<Record> {
    ChainBuilder::new()
        .filters(build_filters(stage_text).unwrap())
        .into_pull()
        .unwrap()
        .produce_from(records(input))
        .collect::<Result<_>>()
        .unwrap()
}

proptest! {
    #[test]
    fn identity_chain_preserves_input(lines in lines_strategy()) {
        let input = to_records(&lines);
        let (output, _) = push_run("", input.clone());
        prop_assert_eq!(output, input);
    }

    #[test]
    fn one_to_one_filters_compose_in_order(lines in lines_strategy()) {
        let input = to_records(&lines);
        let (output, _) = push_run("CHANGE /a/ /ab/ | UPPER | REVERSE", input.clone());
        let expected: Vec<Record> = input
            .iter()
            .map(|r| r.map_content(|s| s.replace('a', "ab").to_uppercase().chars().rev().collect()))
            .collect();
        prop_assert_eq!(output, expected);
    }

    #[test]
    fn close_seen_once_after_last_record(
        lines in lines_strategy(),
        stages in stage_list_strategy(),
    ) {
        let (_, events) = push_run(&stages, to_records(&lines));
        let closes: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == Observed::Close)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(closes, vec![events.len() - 1]);
    }

    #[test]
    fn pull_matches_push(lines in lines_strategy(), stages in stage_list_strategy()) {
        let input = to_records(&lines);
        let (pushed, _) = push_run(&stages, input.clone());
        let pulled = pull_run(&stages, input);
        prop_assert_eq!(pulled, pushed);
    }

    #[test]
    fn pull_reads_only_what_it_needs(lines in lines_strategy(), want in 0usize..16) {
        let input = to_records(&lines);
        let want = want.min(input.len());
        let mut seq = ChainBuilder::new()
            .filters(build_filters("UPPER").unwrap())
            .into_pull()
            .unwrap()
            .produce_from(records(input));
        for _ in 0..want {
            prop_assert!(seq.next().unwrap().is_ok());
        }
        prop_assert_eq!(seq.units_read(), want);
    }
}

#[test]
fn drop_empty_lines_example() {
    let input = ["x\n", "\n", "y\n"].map(Record::from_str);
    let mut seq = ChainBuilder::new()
        .filters(build_filters("DROPEMPTY").unwrap())
        .into_pull()
        .unwrap()
        .produce_from(records(input));
    assert_eq!(seq.next().unwrap().unwrap().as_str(), "x\n");
    assert_eq!(seq.next().unwrap().unwrap().as_str(), "y\n");
    assert!(seq.next().is_none());
}

#[test]
fn uppercase_into_list_example() {
    let input = ["ab\n", "cd\n"].map(Record::from_str);
    let (output, events) = push_run("UPPER", input.to_vec());
    assert_eq!(output, ["AB\n", "CD\n"].map(Record::from_str));
    assert_eq!(events.iter().filter(|e| **e == Observed::Close).count(), 1);
}
