//! Property-based tests for the merge rule, inline rendering and codec round trips.

use proptest::prelude::*;
use toml_codec::{decode, encode, from_str, merge, toml_record, TomlTable, TomlValue};

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Inner {
        flag: bool,
        weight: f64,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Outer {
        id: i64,
        name: String,
        scores: Vec<i32>,
        nickname: Option<String>,
        inner: Inner,
        children: Vec<Inner>,
    }
}

fn key() -> impl Strategy<Value = String> {
    "[a-d]{1,2}"
}

fn scalar() -> impl Strategy<Value = TomlValue> {
    prop_oneof![
        any::<i64>().prop_map(TomlValue::Integer),
        any::<bool>().prop_map(TomlValue::Bool),
        "[a-z \"\\\\\n]{0,8}".prop_map(TomlValue::String),
        (-1.0e6f64..1.0e6).prop_map(TomlValue::Float),
    ]
}

fn value() -> impl Strategy<Value = TomlValue> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(TomlValue::Array),
            prop::collection::btree_map(key(), inner, 0..4)
                .prop_map(|entries| TomlValue::Table(entries.into_iter().collect())),
        ]
    })
}

fn table() -> impl Strategy<Value = TomlTable> {
    prop::collection::btree_map(key(), value(), 0..5)
        .prop_map(|entries| entries.into_iter().collect())
}

fn inner() -> impl Strategy<Value = Inner> {
    (any::<bool>(), -1.0e9f64..1.0e9).prop_map(|(flag, weight)| Inner { flag, weight })
}

fn outer() -> impl Strategy<Value = Outer> {
    (
        any::<i64>(),
        ".{0,12}",
        prop::collection::vec(any::<i32>(), 0..6),
        proptest::option::of("[a-z]{1,6}"),
        inner(),
        prop::collection::vec(inner(), 0..3),
    )
        .prop_map(|(id, name, scores, nickname, inner, children)| Outer {
            id,
            name,
            scores,
            nickname,
            inner,
            children,
        })
}

proptest! {
    #[test]
    fn prop_merge_with_empty_is_identity(t in table()) {
        let empty = TomlValue::Table(TomlTable::new());
        let value = TomlValue::Table(t);
        prop_assert_eq!(merge(value.clone(), empty.clone()), value.clone());
        prop_assert_eq!(merge(empty, value.clone()), value);
    }

    #[test]
    fn prop_merge_is_right_biased_for_non_tables(
        a in value().prop_filter("non-table", |v| !v.is_table()),
        b in value().prop_filter("non-table", |v| !v.is_table()),
    ) {
        prop_assert_eq!(merge(a, b.clone()), b);
    }

    #[test]
    fn prop_merge_keeps_every_key(a in table(), b in table()) {
        let merged = merge(TomlValue::Table(a.clone()), TomlValue::Table(b.clone()));
        let merged = merged.as_table().unwrap();
        for key in a.keys().chain(b.keys()) {
            prop_assert!(merged.contains_key(key));
        }
        prop_assert!(merged.len() <= a.len() + b.len());
    }

    #[test]
    fn prop_inline_rendering_parses_back(v in value()) {
        let document = format!("v = {}", v);
        let root = from_str(&document).unwrap();
        prop_assert_eq!(root.get("v"), Some(&v));
    }

    #[test]
    fn prop_record_round_trip(record in outer()) {
        let encoded = encode(&record).unwrap();
        prop_assert_eq!(decode::<Outer>(&encoded).unwrap(), record);
    }

    #[test]
    fn prop_integers_round_trip_through_text(n in any::<i64>()) {
        let root = from_str(&format!("n = {}", n)).unwrap();
        prop_assert_eq!(root.get("n"), Some(&TomlValue::Integer(n)));
    }
}
