//! Working with `TomlValue` trees directly and merging layered configuration.
//!
//! Run with: cargo run --example dynamic_values

use std::error::Error;
use toml_codec::{from_str, merge, toml, TomlValue};

fn main() -> Result<(), Box<dyn Error>> {
    // Build values with the toml! macro
    let defaults = toml!({
        "name": "service",
        "http": {"port": 8080, "tls": false},
        "features": ["metrics"]
    });

    // Or parse them from text
    let overrides = TomlValue::Table(from_str(
        "# arrays are replaced, not appended\nfeatures = [\"tracing\"]\n\n[http]\ntls = true",
    )?);

    let effective = merge(defaults, overrides);
    println!("Effective configuration:\n{}\n", effective);

    if let TomlValue::Table(table) = &effective {
        for (key, value) in table {
            println!("{key:>8}: {} ({})", value, value.type_name());
        }
    }

    let http = effective
        .as_table()
        .and_then(|t| t.get("http"))
        .and_then(TomlValue::as_table);
    if let Some(http) = http {
        assert_eq!(http.get("port").and_then(TomlValue::as_integer), Some(8080));
        assert_eq!(http.get("tls").and_then(TomlValue::as_bool), Some(true));
    }

    // Values convert to and from JSON through serde
    println!("\nAs JSON: {}", serde_json::to_string_pretty(&effective)?);

    Ok(())
}
