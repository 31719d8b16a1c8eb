use toml_codec::{
    decode, decode_str, encode, toml, toml_enum, toml_record, Constants, Decode, Record, Shape,
    TomlTable, TomlValue,
};

toml_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum Protocol {
        Tcp,
        Udp,
    }
}

toml_record! {
    /// A listening socket.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Listener {
        pub port: u16,
        pub protocol: Protocol = Protocol::Tcp,
        pub backlog: u32 = 128,
        pub label: Option<String>,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Empty {}
}

#[test]
fn test_toml_macro_booleans() {
    assert_eq!(toml!(true), TomlValue::Bool(true));
    assert_eq!(toml!(false), TomlValue::Bool(false));
}

#[test]
fn test_toml_macro_numbers() {
    assert_eq!(toml!(42), TomlValue::Integer(42));
    assert_eq!(toml!(3.5), TomlValue::Float(3.5));
    assert_eq!(toml!(-123), TomlValue::Integer(-123));
    assert_eq!(toml!([(-1), 2]), TomlValue::Array(vec![TomlValue::Integer(-1), TomlValue::Integer(2)]));
}

#[test]
fn test_toml_macro_strings_and_expressions() {
    let name = String::from("dynamic");
    assert_eq!(toml!(name.clone()), TomlValue::String("dynamic".into()));
    assert_eq!(toml!({"n": name}), {
        let mut table = TomlTable::new();
        table.insert("n".into(), TomlValue::from("dynamic"));
        TomlValue::Table(table)
    });
}

#[test]
fn test_toml_macro_nested() {
    let value = toml!({
        "server": {"host": "localhost", "ports": [80, 443]},
        "flags": [],
        "meta": {},
    });
    let server = value
        .as_table()
        .and_then(|t| t.get("server"))
        .and_then(TomlValue::as_table)
        .unwrap();
    assert_eq!(server.get("host").and_then(TomlValue::as_str), Some("localhost"));
    assert_eq!(server.get("ports").and_then(TomlValue::as_array).map(Vec::len), Some(2));
}

#[test]
fn test_record_macro_defaults() {
    let listener: Listener = decode_str("port = 8080").unwrap();
    assert_eq!(
        listener,
        Listener {
            port: 8080,
            protocol: Protocol::Tcp,
            backlog: 128,
            label: None,
        }
    );
}

#[test]
fn test_record_macro_overrides_defaults() {
    let listener: Listener = decode_str("port = 53\nprotocol = \"Udp\"\nbacklog = 16\nlabel = \"dns\"").unwrap();
    assert_eq!(listener.protocol, Protocol::Udp);
    assert_eq!(listener.backlog, 16);
    assert_eq!(listener.label.as_deref(), Some("dns"));
}

#[test]
fn test_record_macro_round_trip() {
    let listener = Listener {
        port: 1,
        protocol: Protocol::Udp,
        backlog: 2,
        label: Some("x".into()),
    };
    assert_eq!(decode::<Listener>(&encode(&listener).unwrap()).unwrap(), listener);
}

#[test]
fn test_record_macro_shape() {
    assert_eq!(Listener::NAME, "Listener");
    assert_eq!(Listener::FIELDS, &["port", "protocol", "backlog", "label"]);
    assert_eq!(Listener::shape().to_string(), "record Listener");
    assert_eq!(<Vec<Listener>>::shape().to_string(), "list<record Listener>");
}

#[test]
fn test_empty_record() {
    assert!(Empty::FIELDS.is_empty());
    assert_eq!(decode::<Empty>(&toml!({"ignored": 1})).unwrap(), Empty::default());
    assert_eq!(encode(&Empty {}).unwrap(), toml!({}));
}

#[test]
fn test_record_requires_table() {
    let err = decode::<Listener>(&toml!("8080")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot decode string `\"8080\"` into record Listener: no applicable conversion"
    );
}

#[test]
fn test_enum_macro() {
    assert_eq!(Protocol::NAMES, &["Tcp", "Udp"]);
    assert_eq!(Protocol::from_name("Udp"), Some(Protocol::Udp));
    assert_eq!(Protocol::from_name("udp"), None);
    assert_eq!(Protocol::Tcp.name(), "Tcp");
    assert_eq!(Protocol::shape(), Shape::constants::<Protocol>());
    assert_eq!(encode(&Protocol::Udp).unwrap(), toml!("Udp"));

    let err = decode::<Protocol>(&toml!("Sctp")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot decode string `\"Sctp\"` into enum Protocol: expected one of Tcp, Udp"
    );
}

#[test]
fn test_enum_in_sets() {
    let set: std::collections::BTreeSet<Protocol> =
        decode(&toml!(["Udp", "Tcp", "Udp"])).unwrap();
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![Protocol::Tcp, Protocol::Udp]);
}
