//! Key-path lookups across nested tables and arrays of tables.
//!
//! Run with: cargo run --example traversal

use std::error::Error;
use toml_codec::{from_str, get, get_grouped, project, TraversalMode};

const DOCUMENT: &str = r#"
[cluster]
name = "east"

[[cluster.nodes]]
host = "a"
[[cluster.nodes.disks]]
size = 100
[[cluster.nodes.disks]]
size = 200

[[cluster.nodes]]
host = "b"
[[cluster.nodes.disks]]
size = 500
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let root = from_str(DOCUMENT)?;

    let name: Option<String> = get(&root, &["cluster", "name"])?;
    println!("name        = {:?}", name);

    let hosts: Option<Vec<String>> = get(&root, &["cluster", "nodes", "host"])?;
    println!("hosts       = {:?}", hosts);

    let sizes: Option<Vec<u64>> = get(&root, &["cluster", "nodes", "disks", "size"])?;
    println!("sizes       = {:?}", sizes);

    let grouped: Option<Vec<Vec<u64>>> =
        get_grouped(&root, &["cluster", "nodes", "disks", "size"])?;
    println!("per node    = {:?}", grouped);

    let missing: Option<String> = get(&root, &["cluster", "region"])?;
    println!("region      = {:?}", missing);

    // Raw projections without decoding
    for mode in [TraversalMode::Flattened, TraversalMode::Grouped] {
        if let Some(value) = project(&root, &["cluster", "nodes", "disks", "size"], mode) {
            println!("{:<11} = {}", format!("{:?}", mode), value);
        }
    }

    // Asking for the wrong shape is an error, not a miss
    if let Err(err) = get::<String>(&root, &["cluster"]) {
        println!("error       = {}", err);
    }

    Ok(())
}
