//! Document-level checks of the bundled parser and tree builder against
//! the TOML 1.0 grammar.

use chrono::{NaiveDate, NaiveTime};
use toml_codec::{
    from_reader, from_slice, from_str, from_str_with_options, toml, Error, ParseOptions,
    TomlTable, TomlValue,
};

fn parse(source: &str) -> TomlValue {
    match from_str(source) {
        Ok(root) => TomlValue::Table(root),
        Err(err) => panic!("failed to parse {:?}: {}", source, err),
    }
}

fn build_error_path(source: &str) -> String {
    match from_str(source) {
        Err(Error::Build { path, .. }) => path,
        other => panic!("expected a build error for {:?}, got {:?}", source, other),
    }
}

#[test]
fn test_empty_document() {
    assert!(from_str("").unwrap().is_empty());
    assert!(from_str("\n# only a comment\n\n").unwrap().is_empty());
}

#[test]
fn test_bare_and_quoted_keys() {
    let root = parse("bare_key-1 = 1\n\"quoted key\" = 2\n'literal.key' = 3\n1234 = 4");
    let table = root.as_table().unwrap();
    assert_eq!(table.get("bare_key-1"), Some(&TomlValue::Integer(1)));
    assert_eq!(table.get("quoted key"), Some(&TomlValue::Integer(2)));
    assert_eq!(table.get("literal.key"), Some(&TomlValue::Integer(3)));
    assert_eq!(table.get("1234"), Some(&TomlValue::Integer(4)));
}

#[test]
fn test_dotted_keys_build_nested_tables() {
    assert_eq!(
        parse("fruit.name = \"banana\"\nfruit. color = \"yellow\"\nfruit.flavor.sweet = true"),
        toml!({"fruit": {"name": "banana", "color": "yellow", "flavor": {"sweet": true}}})
    );
}

#[test]
fn test_dotted_keys_inside_table_header() {
    assert_eq!(
        parse("[dog.\"tater.man\"]\ntype.name = \"pug\""),
        toml!({"dog": {"tater.man": {"type": {"name": "pug"}}}})
    );
}

#[test]
fn test_super_table_defined_after_sub_table() {
    assert_eq!(
        parse("[x.y.z.w]\na = 1\n[x]\nb = 2"),
        toml!({"x": {"y": {"z": {"w": {"a": 1}}}, "b": 2}})
    );
}

#[test]
fn test_array_of_tables_keeps_order() {
    let root = parse(
        "[[products]]\nname = \"Hammer\"\nsku = 738594937\n\n[[products]]\n\n[[products]]\nname = \"Nail\"\ncolor = \"gray\"",
    );
    assert_eq!(
        root,
        toml!({"products": [
            {"name": "Hammer", "sku": 738594937},
            {},
            {"name": "Nail", "color": "gray"}
        ]})
    );
}

#[test]
fn test_nested_array_of_tables() {
    let root = parse(
        r#"
[[fruits]]
name = "apple"

[fruits.physical]
color = "red"

[[fruits.varieties]]
name = "red delicious"

[[fruits.varieties]]
name = "granny smith"

[[fruits]]
name = "banana"

[[fruits.varieties]]
name = "plantain"
"#,
    );
    assert_eq!(
        root,
        toml!({"fruits": [
            {
                "name": "apple",
                "physical": {"color": "red"},
                "varieties": [{"name": "red delicious"}, {"name": "granny smith"}]
            },
            {"name": "banana", "varieties": [{"name": "plantain"}]}
        ]})
    );
}

#[test]
fn test_key_value_after_table_array_goes_to_last_element() {
    let root = parse("[[a]]\n[[a]]\n[a.b]\nc = 1");
    assert_eq!(root, toml!({"a": [{}, {"b": {"c": 1}}]}));
}

#[test]
fn test_repeated_scalar_key_keeps_the_last_value() {
    assert_eq!(parse("name = \"a\"\nname = \"b\""), toml!({"name": "b"}));
}

#[test]
fn test_scalar_then_table_is_rejected() {
    assert_eq!(build_error_path("a = 1\n[a]"), "a");
    assert_eq!(build_error_path("a = 1\na.b = 2"), "a");
    assert_eq!(build_error_path("[a]\nb = 1\n[a.b.c]"), "a.b");
}

#[test]
fn test_table_then_scalar_is_rejected() {
    assert_eq!(build_error_path("[a.b]\nc = 1\n[a]\nb = 2"), "a.b");
}

#[test]
fn test_static_array_cannot_be_extended() {
    assert_eq!(build_error_path("fruits = []\n[[fruits]]"), "fruits");
    assert_eq!(build_error_path("fruits = [{a = 1}]\n[[fruits]]"), "fruits");
}

#[test]
fn test_array_of_tables_cannot_become_table() {
    assert_eq!(build_error_path("[[fruits]]\n[fruits]"), "fruits");
}

#[test]
fn test_build_error_reports_position() {
    match from_str("a = 1\n\n  [a]") {
        Err(Error::Build { line, col, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(col, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_inline_tables() {
    assert_eq!(
        parse("point = { x = 1, y = 2 }\nanimal = { type.name = \"pug\" }\nempty = {}"),
        toml!({
            "point": {"x": 1, "y": 2},
            "animal": {"type": {"name": "pug"}},
            "empty": {}
        })
    );
}

#[test]
fn test_arrays_may_mix_types() {
    assert_eq!(
        parse("mixed = [1, \"two\", 3.0, [4], { five = 5 }]"),
        toml!({"mixed": [1, "two", 3.0, [4], {"five": 5}]})
    );
}

#[test]
fn test_string_forms() {
    let root = parse(concat!(
        "basic = \"I'm a string. \\\"You can quote me\\\".\"\n",
        "literal = 'C:\\Users\\nodejs\\templates'\n",
        "multi = \"\"\"\nRoses are red\nViolets are blue\"\"\"\n",
        "raw = '''\nThe first newline is\ntrimmed in raw strings.\n'''\n",
    ));
    let table = root.as_table().unwrap();
    assert_eq!(
        table.get("basic").and_then(TomlValue::as_str),
        Some("I'm a string. \"You can quote me\".")
    );
    assert_eq!(
        table.get("literal").and_then(TomlValue::as_str),
        Some(r"C:\Users\nodejs\templates")
    );
    assert_eq!(
        table.get("multi").and_then(TomlValue::as_str),
        Some("Roses are red\nViolets are blue")
    );
    assert_eq!(
        table.get("raw").and_then(TomlValue::as_str),
        Some("The first newline is\ntrimmed in raw strings.\n")
    );
}

#[test]
fn test_invalid_strings() {
    for source in [
        "a = \"unterminated",
        "a = \"bad escape \\q\"",
        "a = \"line\nbreak\"",
        "a = 'never closed",
        "a = \"\\uD800\"",
    ] {
        assert!(
            matches!(from_str(source), Err(Error::Syntax { .. })),
            "accepted {:?}",
            source
        );
    }
}

#[test]
fn test_integers_and_floats() {
    assert_eq!(
        parse("a = +99\nb = 0xff\nc = 1_000\nd = 3.1415\ne = -2E-2\nf = +inf"),
        toml!({"a": 99, "b": 255, "c": 1000, "d": 3.1415, "e": (-0.02), "f": (f64::INFINITY)})
    );
}

#[test]
fn test_integer_overflow_is_a_syntax_error() {
    assert!(matches!(
        from_str("a = 9223372036854775808"),
        Err(Error::Syntax { .. })
    ));
}

#[test]
fn test_booleans_are_lowercase() {
    assert_eq!(parse("a = true\nb = false"), toml!({"a": true, "b": false}));
    assert!(from_str("a = True").is_err());
}

#[test]
fn test_datetime_forms() {
    let root = parse(concat!(
        "odt1 = 1979-05-27T07:32:00Z\n",
        "odt2 = 1979-05-27 07:32:00+05:30\n",
        "ldt = 1979-05-27T07:32:00.5\n",
        "ld = 1979-05-27\n",
        "lt = 00:32:00.999999\n",
    ));
    let table = root.as_table().unwrap();

    let odt1 = table.get("odt1").and_then(TomlValue::as_offset_datetime).unwrap();
    assert_eq!(odt1.offset().local_minus_utc(), 0);
    let odt2 = table.get("odt2").and_then(TomlValue::as_offset_datetime).unwrap();
    assert_eq!(odt2.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    assert_eq!(odt1.timestamp() - odt2.timestamp(), 5 * 3600 + 30 * 60);

    let date = NaiveDate::from_ymd_opt(1979, 5, 27).unwrap();
    assert_eq!(
        table.get("ldt"),
        Some(&TomlValue::LocalDateTime(
            date.and_hms_milli_opt(7, 32, 0, 500).unwrap()
        ))
    );
    assert_eq!(table.get("ld"), Some(&TomlValue::LocalDate(date)));
    assert_eq!(
        table.get("lt"),
        Some(&TomlValue::LocalTime(
            NaiveTime::from_hms_micro_opt(0, 32, 0, 999_999).unwrap()
        ))
    );
}

#[test]
fn test_comments_everywhere() {
    let root = parse(
        "# header\nkey = \"value\" # trailing\n[table] # after header\n# between\nother = [ # in array\n  1,\n]\n",
    );
    assert_eq!(root, toml!({"key": "value", "table": {"other": [1]}}));
}

#[test]
fn test_byte_order_mark_and_crlf() {
    let root = from_slice("\u{FEFF}a = 1\r\n[b]\r\nc = 'x'\r\n".as_bytes()).unwrap();
    assert_eq!(TomlValue::Table(root), toml!({"a": 1, "b": {"c": "x"}}));
}

#[test]
fn test_reader_input() {
    let root = from_reader(std::io::Cursor::new("[server]\nport = 80")).unwrap();
    assert_eq!(TomlValue::Table(root), toml!({"server": {"port": 80}}));
}

#[test]
fn test_missing_value_or_equals() {
    for source in ["a =", "a", "= 1", "a = 1 2", "[a", "[[a]", "[]"] {
        assert!(from_str(source).is_err(), "accepted {:?}", source);
    }
}

#[test]
fn test_syntax_error_location() {
    match from_str("ok = 1\nbad = @") {
        Err(Error::Syntax { line, col, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(col, 7);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_max_depth() {
    let source = "a = [[[[1]]]]";
    assert!(from_str_with_options(source, ParseOptions::new().with_max_depth(4)).is_ok());
    assert!(matches!(
        from_str_with_options(source, ParseOptions::new().with_max_depth(3)),
        Err(Error::Syntax { .. })
    ));
    assert!(from_str_with_options(
        "a = { b = { c = 1 } }",
        ParseOptions::new().with_max_depth(1)
    )
    .is_err());
}

#[test]
fn test_deep_nesting_under_default_limit() {
    let depth = 100;
    let source = format!("a = {}1{}", "[".repeat(depth), "]".repeat(depth));
    let root: TomlTable = from_str(&source).unwrap();
    let mut value = root.get("a").unwrap();
    for _ in 1..depth {
        value = &value.as_array().unwrap()[0];
    }
    assert_eq!(value, &toml!([1]));
}
