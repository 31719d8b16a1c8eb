//! Converters, decline chaining, name mappings and default instances.
//!
//! Run with: cargo run --example custom_decoders

use std::error::Error;
use std::time::Duration;
use toml_codec::{
    from_str, toml_record, Conversion, DecoderBuilder, EncoderBuilder, Shape, TomlValue,
};

toml_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Endpoint {
        url: String,
        retries: u32,
        verbose: bool,
    }
}

/// Accepts "250ms", "3s" or a bare number of milliseconds.
fn parse_duration(text: &str) -> Option<Duration> {
    if let Some(ms) = text.strip_suffix("ms") {
        return ms.trim().parse().ok().map(Duration::from_millis);
    }
    if let Some(s) = text.strip_suffix('s') {
        return s.trim().parse().ok().map(Duration::from_secs);
    }
    text.trim().parse().ok().map(Duration::from_millis)
}

fn main() -> Result<(), Box<dyn Error>> {
    let decoder = DecoderBuilder::new()
        // Integers are milliseconds; anything else is left to the next converter
        .with_decoder::<Duration, _>(|_, _, value| {
            Ok(value
                .as_integer()
                .and_then(|ms| u64::try_from(ms).ok())
                .map(Duration::from_millis)
                .into())
        })
        .with_decoder::<Duration, _>(|_, _, value| match value.as_str() {
            Some(text) => parse_duration(text)
                .map(Conversion::Converted)
                .ok_or_else(|| toml_codec::Error::custom(format!("bad duration `{}`", text))),
            None => Ok(Conversion::Declined),
        })
        .with_mapping::<Endpoint>(&[("endpoint-url", "url"), ("max-retries", "retries")])?
        .with_default(&Endpoint {
            url: "http://localhost".into(),
            retries: 3,
            verbose: false,
        })
        .build();

    let root = from_str(
        r#"
timeout = "3s"
poll = 250

[service]
endpoint-url = "https://api.example.org"
"#,
    )?;

    let shape = Shape::opaque::<Duration>();
    for key in ["timeout", "poll"] {
        if let Some(value) = root.get(key) {
            let duration: Duration = decoder.convert(&shape, value)?;
            println!("{key:>8} = {:?}", duration);
        }
    }

    let service: Option<Endpoint> = decoder.get(&root, &["service"])?;
    println!("service  = {:?}", service);

    // Converter errors are reported as-is
    let broken = TomlValue::from("soon");
    if let Err(err) = decoder.convert::<Duration>(&shape, &broken) {
        println!("error    = {}", err);
    }

    let encoder = EncoderBuilder::new()
        .with_encoder::<Duration, _>(|_, d| {
            Ok(i64::try_from(d.as_millis()).ok().map(TomlValue::Integer).into())
        })
        .with_mapping::<Endpoint>(&[("endpoint-url", "url"), ("max-retries", "retries")])?
        .build();
    if let Some(service) = service {
        println!("encoded  = {}", encoder.encode(&service)?);
    }
    println!("timeout  = {}", encoder.convert(&Duration::from_secs(3))?);

    Ok(())
}
