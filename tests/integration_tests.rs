use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::thread;

use toml_codec::{
    decode, decode_str, encode, from_str, get, get_grouped, toml, toml_enum, toml_record,
    CodecBuilder, Conversion, Decoder, DecoderBuilder, Encoder, EncoderBuilder, Error, Shape,
    TomlTable, TomlValue,
};

toml_enum! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Role {
        Admin,
        Member,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: u32,
        name: String,
        role: Role,
        tags: Vec<String>,
        email: Option<String>,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Team {
        title: String,
        members: Vec<User>,
        limits: BTreeMap<String, i64>,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }
}

const TEAM: &str = r#"
title = "core"

[limits]
cpu = 4
memory = 2048

[[members]]
id = 1
name = "Alice"
role = "Admin"
tags = ["ops", "dev"]

[[members]]
id = 2
name = "Bob"
role = "Member"
tags = []
email = "bob@example.org"
"#;

fn table(value: TomlValue) -> TomlTable {
    match value {
        TomlValue::Table(table) => table,
        other => panic!("expected a table, got {}", other),
    }
}

#[test]
fn test_decode_nested_records() {
    let team: Team = decode_str(TEAM).unwrap();
    assert_eq!(team.title, "core");
    assert_eq!(team.limits["memory"], 2048);
    assert_eq!(team.members.len(), 2);
    assert_eq!(team.members[0].role, Role::Admin);
    assert_eq!(team.members[0].email, None);
    assert_eq!(team.members[1].email.as_deref(), Some("bob@example.org"));
}

#[test]
fn test_round_trip_through_tree() {
    let team: Team = decode_str(TEAM).unwrap();
    let encoded = encode(&team).unwrap();
    let decoded: Team = decode(&encoded).unwrap();
    assert_eq!(decoded, team);
}

#[test]
fn test_deepest_error_is_reported() {
    let err = decode_str::<Team>(&TEAM.replace("role = \"Member\"", "role = \"Guest\"")).unwrap_err();
    match err {
        Error::Decoding { value, target, .. } => {
            assert_eq!(*value, TomlValue::from("Guest"));
            assert_eq!(target, Shape::constants::<Role>());
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_required_field() {
    let err = decode_str::<User>("id = 1\nrole = \"Admin\"\ntags = []").unwrap_err();
    assert_eq!(err.to_string(), "Missing field `name` for record User");
}

#[test]
fn test_decline_chaining() {
    let decoder = DecoderBuilder::new()
        .with_decoder::<Point, _>(|_, _, _| Ok(Conversion::Declined))
        .with_decoder::<Point, _>(|_, _, value| {
            // "x,y"
            let Some(text) = value.as_str() else {
                return Ok(Conversion::Declined);
            };
            let Some((x, y)) = text.split_once(',') else {
                return Err(Error::custom(format!("bad point `{}`", text)));
            };
            match (x.trim().parse(), y.trim().parse()) {
                (Ok(x), Ok(y)) => Ok(Conversion::Converted(Point { x, y })),
                _ => Err(Error::custom(format!("bad point `{}`", text))),
            }
        })
        .build();

    assert_eq!(
        decoder.decode::<Point>(&toml!("3, 4")).unwrap(),
        Point { x: 3, y: 4 }
    );
    assert_eq!(
        decoder.decode::<Point>(&toml!({"x": 1, "y": 2})).unwrap(),
        Point { x: 1, y: 2 }
    );
    assert!(decoder.decode::<Point>(&toml!(7)).unwrap_err().is_decoding());
}

#[test]
fn test_default_backfill() {
    let decoder = DecoderBuilder::new()
        .with_default(&Point { x: 0, y: 0 })
        .build();
    let point: Point = decoder.decode(&toml!({"x": 42})).unwrap();
    assert_eq!(point, Point { x: 42, y: 0 });
}

#[test]
fn test_mapping_validation_is_eager() {
    let err = DecoderBuilder::new()
        .with_mapping::<Point>(&[("X", "z")])
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = Encoder::new()
        .with_mapping::<Point>(&[("y", "x")])
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_mapping_round_trip() {
    let pairs = [("user_id", "id"), ("display_name", "name")];
    let decoder = Decoder::new().with_mapping::<User>(&pairs).unwrap();
    let encoder = Encoder::new().with_mapping::<User>(&pairs).unwrap();

    let user = User {
        id: 9,
        name: "Zed".into(),
        role: Role::Member,
        tags: vec!["a".into()],
        email: None,
    };
    let encoded = encoder.encode(&user).unwrap();
    let keys: Vec<&String> = encoded.as_table().unwrap().keys().collect();
    assert_eq!(keys, vec!["user_id", "display_name", "role", "tags"]);
    assert_eq!(decoder.decode::<User>(&encoded).unwrap(), user);
}

#[test]
fn test_codec_shares_one_mapping_registration() {
    let codec = CodecBuilder::new()
        .with_mapping::<User>(&[("user_id", "id"), ("display_name", "name")])
        .unwrap()
        .with_default(&User {
            id: 0,
            name: "anonymous".into(),
            role: Role::Member,
            tags: Vec::new(),
            email: None,
        })
        .build();

    let user: User = codec.decode(&toml!({"user_id": 3})).unwrap();
    assert_eq!(user.name, "anonymous");
    let encoded = codec.encode(&user).unwrap();
    assert_eq!(encoded.as_table().unwrap().get("display_name"), Some(&toml!("anonymous")));
    assert_eq!(codec.decode::<User>(&encoded).unwrap(), user);
}

#[test]
fn test_builder_errors_are_debuggable() {
    let err = DecoderBuilder::new()
        .with_mapping::<Point>(&[("X", "x"), ("X", "y")])
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    let builder = EncoderBuilder::new().with_mapping::<Point>(&[("X", "x")]).unwrap();
    assert_eq!(format!("{:?}", builder), "EncoderBuilder { converters: 0, mappings: 1 }");
}

#[test]
fn test_registration_returns_new_engine() {
    let base = Decoder::new();
    let strict = base.with_decoder::<i64, _>(|_, _, value| match value {
        TomlValue::Integer(n) if *n < 0 => Err(Error::custom("negative")),
        _ => Ok(Conversion::Declined),
    });
    assert_eq!(base.decode::<i64>(&toml!((-1))).unwrap(), -1);
    assert!(strict.decode::<i64>(&toml!((-1))).is_err());
    assert_eq!(strict.decode::<i64>(&toml!(1)).unwrap(), 1);
}

#[test]
fn test_engines_are_shared_across_threads() {
    let decoder = Arc::new(
        DecoderBuilder::new()
            .with_default(&Point { x: 0, y: 0 })
            .build(),
    );
    let handles: Vec<_> = (0..4_i64)
        .map(|i| {
            let decoder = Arc::clone(&decoder);
            thread::spawn(move || {
                let mut doc = TomlTable::new();
                doc.insert("x".into(), TomlValue::from(i));
                decoder.decode::<Point>(&TomlValue::Table(doc)).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Point { x: i as i64, y: 0 });
    }
}

#[test]
fn test_encoder_converters_and_omission() {
    let encoder = EncoderBuilder::new()
        .with_encoder::<Role, _>(|_, role| {
            Ok(Conversion::Converted(TomlValue::from(match role {
                Role::Admin => "admin",
                Role::Member => "member",
            })))
        })
        .build();

    let mut by_name: HashMap<String, Option<Role>> = HashMap::new();
    by_name.insert("a".into(), Some(Role::Admin));
    by_name.insert("b".into(), None);
    assert_eq!(encoder.encode(&by_name).unwrap(), toml!({"a": "admin"}));
}

#[test]
fn test_traversal_missing_path() {
    let root = table(toml!({"a": {"b": 1}}));
    assert_eq!(get::<i64>(&root, &["a", "missing"]).unwrap(), None);
    assert_eq!(get::<i64>(&root, &["nothing", "here"]).unwrap(), None);
}

#[test]
fn test_traversal_fan_out() {
    let root = from_str("[[foo]]\na = \"x\"\n[[foo]]\na = \"y\"\nc = \"w\"").unwrap();
    assert_eq!(
        get::<Vec<String>>(&root, &["foo", "a"]).unwrap(),
        Some(vec!["x".to_string(), "y".to_string()])
    );
    assert_eq!(
        get::<Vec<String>>(&root, &["foo", "c"]).unwrap(),
        Some(vec!["w".to_string()])
    );
}

#[test]
fn test_traversal_type_mismatch_is_an_error() {
    let root = from_str("[server]\nhost = \"h\"").unwrap();
    let err = get::<String>(&root, &["server"]).unwrap_err();
    assert!(matches!(err, Error::Decoding { .. }));
}

#[test]
fn test_traversal_into_records() {
    let root = from_str(TEAM).unwrap();
    let members: Vec<User> = get(&root, &["members"]).unwrap().unwrap();
    assert_eq!(members[1].name, "Bob");
    let tags: Vec<Vec<String>> = get_grouped(&root, &["members", "tags"]).unwrap().unwrap();
    assert_eq!(tags, vec![vec!["ops".to_string(), "dev".to_string()], vec![]]);
}

#[test]
fn test_serde_json_interop() {
    let value = toml!({"name": "x", "list": [1, 2.5, true], "nested": {"k": "v"}});
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"name": "x", "list": [1, 2.5, true], "nested": {"k": "v"}})
    );
    let back: TomlValue = serde_json::from_value(json).unwrap();
    assert_eq!(back, value);
    assert!(serde_json::from_str::<TomlValue>("{\"a\": null}").is_err());
}

#[test]
fn test_datetimes_serialize_as_strings() {
    let root = from_str("when = 1979-05-27T07:32:00Z").unwrap();
    let json = serde_json::to_string(&root).unwrap();
    assert_eq!(json, r#"{"when":"1979-05-27T07:32:00+00:00"}"#);
}
