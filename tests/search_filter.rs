use chrono::{TimeZone, Utc};

use misctags::{
    core::store::RecordStore,
    record::{Record, parse_tags},
    search::{Query, append_tag, drop_last_tag, filter, highlight, sort_recent_first},
};

fn records(sets: &[&[&str]]) -> Vec<Record> {
    let mut store = RecordStore::new();
    for (i, tags) in sets.iter().enumerate() {
        let now = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
        store.create(tags.iter().copied(), now).unwrap();
    }
    store.list()
}

fn tags_of(found: &[Record]) -> Vec<Vec<String>> {
    found.iter().map(|r| r.tags.clone()).collect()
}

#[test]
fn complete_tags_match_exactly_and_last_tag_by_prefix() {
    let recs = records(&[&["alpha", "beta"], &["alpha", "gamma"]]);

    let hits = filter(&recs, "alpha be");
    assert_eq!(tags_of(&hits), vec![vec!["alpha", "beta"]]);

    assert_eq!(filter(&recs, "alpha").len(), 2);
    assert!(filter(&recs, "zz").is_empty());
}

#[test]
fn complete_tag_must_not_match_by_prefix() {
    let recs = records(&[&["alphabet", "beta"]]);
    assert!(filter(&recs, "alpha be").is_empty());
    assert_eq!(filter(&recs, "alph").len(), 1);
}

#[test]
fn matching_ignores_case_and_extra_whitespace() {
    let recs = records(&[&["Coffee", "Beans"]]);
    assert_eq!(filter(&recs, "  COFFEE\t bea ").len(), 1);
    assert_eq!(filter(&recs, "beans coffee").len(), 1);
}

#[test]
fn empty_query_is_identity() {
    let recs = records(&[&["a"], &["b"], &["c"]]);
    assert_eq!(filter(&recs, ""), recs);
    assert_eq!(filter(&recs, "   "), recs);
}

#[test]
fn filter_preserves_input_order() {
    let recs = records(&[&["x", "one"], &["y"], &["x", "two"], &["x", "three"]]);
    let hits = filter(&recs, "x");
    let expected: Vec<_> = recs.iter().filter(|r| r.tags[0] == "x").cloned().collect();
    assert_eq!(hits, expected);
}

#[test]
fn query_parse_splits_complete_and_incomplete() {
    let q = Query::parse("Alpha  Beta ga");
    assert_eq!(q.complete_tags(), &["alpha".to_string(), "beta".to_string()]);
    assert_eq!(q.incomplete_tag(), Some("ga"));
    assert!(Query::parse(" \n").is_empty());
}

#[test]
fn highlight_follows_exact_and_prefix_rule() {
    let recs = records(&[&["alpha", "alphabet", "beta"]]);
    let mask = highlight(&recs[0], &Query::parse("alpha be"));
    assert_eq!(mask, vec![true, false, true]);

    let none = highlight(&recs[0], &Query::parse(""));
    assert_eq!(none, vec![false, false, false]);
}

#[test]
fn sort_recent_first_orders_by_updated_at() {
    let mut recs = records(&[&["old"], &["new"]]);
    recs.reverse();
    sort_recent_first(&mut recs);
    assert_eq!(tags_of(&recs), vec![vec!["new"], vec!["old"]]);
}

#[test]
fn drop_last_tag_keeps_trailing_space() {
    assert_eq!(drop_last_tag("a b c"), "a b ");
    assert_eq!(drop_last_tag("  a   b "), "a ");
    assert_eq!(drop_last_tag("solo"), "");
    assert_eq!(drop_last_tag(""), "");
}

#[test]
fn parse_tags_preserves_case() {
    assert_eq!(parse_tags(" Foo  bar\tBAZ "), vec!["Foo", "bar", "BAZ"]);
    assert!(parse_tags("   ").is_empty());
}

#[test]
fn append_tag_extends_or_starts_the_line() {
    assert_eq!(append_tag("coffee", "morning"), "coffee morning");
    assert_eq!(append_tag("a b ", "c"), "a b  c");
    assert_eq!(append_tag("", "tea"), "tea");
    assert_eq!(append_tag("   ", "tea"), "tea");
}
