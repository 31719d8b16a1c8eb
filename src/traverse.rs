//! Path-based projection into a document.
//!
//! [`project`] walks a key path from the root table. When it meets an array
//! with segments left, it applies the rest of the path to every table
//! element of the array and collects the results in element order. Elements
//! that are not tables, or that lack the path, contribute nothing.
//!
//! ```rust
//! use toml_codec::{from_str, project, toml, TraversalMode};
//!
//! let root = from_str(r#"
//! [[foo]]
//! a = "x"
//! [[foo]]
//! a = "y"
//! c = "w"
//! "#).unwrap();
//!
//! let all = project(&root, &["foo", "a"], TraversalMode::Flattened);
//! assert_eq!(all, Some(toml!(["x", "y"])));
//! assert_eq!(project(&root, &["foo", "c"], TraversalMode::Flattened), Some(toml!(["w"])));
//! assert_eq!(project(&root, &["bar"], TraversalMode::Flattened), None);
//! ```

use crate::{TomlTable, TomlValue};

/// How results of nested array fan-outs are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// One flat sequence, whatever the number of arrays crossed.
    #[default]
    Flattened,
    /// One level of nesting per array crossed.
    Grouped,
}

/// Intermediate result: a document value, or the results of a fan-out.
enum Projection {
    Found(TomlValue),
    FanOut(Vec<Projection>),
}

/// Returns the value at `path` below `root`, or `None` when the path does not
/// exist. An empty path addresses `root` itself.
#[must_use]
pub fn project(root: &TomlTable, path: &[&str], mode: TraversalMode) -> Option<TomlValue> {
    let projection = match path.split_first() {
        None => Projection::Found(TomlValue::Table(root.clone())),
        Some((first, rest)) => walk(root.get(first)?, rest)?,
    };
    Some(match mode {
        TraversalMode::Grouped => grouped(projection),
        TraversalMode::Flattened => match projection {
            Projection::Found(value) => value,
            fan_out => {
                let mut flat = Vec::new();
                flatten(fan_out, &mut flat);
                TomlValue::Array(flat)
            }
        },
    })
}

fn walk(value: &TomlValue, path: &[&str]) -> Option<Projection> {
    let Some((first, rest)) = path.split_first() else {
        return Some(Projection::Found(value.clone()));
    };
    match value {
        TomlValue::Table(table) => walk(table.get(first)?, rest),
        TomlValue::Array(elements) => Some(Projection::FanOut(
            elements
                .iter()
                .filter(|element| element.is_table())
                .filter_map(|element| walk(element, path))
                .collect(),
        )),
        // A scalar cannot hold the remaining segments.
        _ => None,
    }
}

fn grouped(projection: Projection) -> TomlValue {
    match projection {
        Projection::Found(value) => value,
        Projection::FanOut(items) => TomlValue::Array(items.into_iter().map(grouped).collect()),
    }
}

fn flatten(projection: Projection, out: &mut Vec<TomlValue>) {
    match projection {
        Projection::Found(value) => out.push(value),
        Projection::FanOut(items) => {
            for item in items {
                flatten(item, out);
            }
        }
    }
}
