//! Parse a TOML document and decode it into records.
//!
//! Run with: cargo run --example simple

use std::error::Error;
use toml_codec::{decode_str, encode, toml_enum, toml_record};

toml_enum! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Debug,
        Info,
        Warn,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Logging {
        level: Level = Level::Info,
        file: Option<String>,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }
}

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Config {
        name: String,
        servers: Vec<Server>,
        logging: Logging,
    }
}

const DOCUMENT: &str = r#"
name = "gateway"

[logging]
file = "/var/log/gateway.log"

[[servers]]
host = "10.0.0.1"
port = 8080

[[servers]]
host = "10.0.0.2"
port = 8081
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let config: Config = decode_str(DOCUMENT)?;
    println!("Decoded:\n{:#?}\n", config);
    assert_eq!(config.logging.level, Level::Info);

    // Encode back into a tree and render it inline
    let tree = encode(&config)?;
    println!("Encoded:\n{}\n", tree);

    let config_back: Config = toml_codec::decode(&tree)?;
    assert_eq!(config, config_back);
    println!("✓ Round-trip successful");

    Ok(())
}
