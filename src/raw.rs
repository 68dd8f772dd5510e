// src/raw.rs
//! Decoder output and its one-time classification into [`Node`].
//!
//! Decoders hand us generic ordered key-value containers. Whether such a
//! container is a map or a sequence is decided structurally, from its keys:
//!
//! - map: non-empty, every key is a name (a string that is not a canonical
//!   integer);
//! - sequence: non-empty, keys are exactly `0, 1, …, n-1` in order;
//! - empty: neither, lifted to an empty sequence by convention;
//! - anything else is mixed and has no node shape.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::error::{Result, ShapeError};
use crate::node::{Map, Node, Scalar, Shape};

/// Canonical decimal integers. `"01"`, `"+1"` and `"-0"` stay names.
static INDEX_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|-?[1-9][0-9]*)$").expect("index key pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawKey {
    Index(i64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Scalar(Scalar),
    Container(Vec<(RawKey, Raw)>),
}

// ————————————————————————————————————————————————————————————————————————————
// KEYS
// ————————————————————————————————————————————————————————————————————————————

impl RawKey {
    /// Numeric-looking names are indices; out-of-range ones stay names.
    pub fn from_name(name: String) -> Self {
        if INDEX_KEY.is_match(&name) {
            if let Ok(index) = name.parse::<i64>() {
                return RawKey::Index(index);
            }
        }
        RawKey::Name(name)
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawKey::Index(i) => write!(f, "{i}"),
            RawKey::Name(name) => f.write_str(name),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CLASSIFICATION
// ————————————————————————————————————————————————————————————————————————————

pub fn array_is_map(entries: &[(RawKey, Raw)]) -> bool {
    !entries.is_empty() && entries.iter().all(|(key, _)| matches!(key, RawKey::Name(_)))
}

pub fn array_is_sequence(entries: &[(RawKey, Raw)]) -> bool {
    !entries.is_empty()
        && entries
            .iter()
            .zip(0i64..)
            .all(|((key, _), expected)| *key == RawKey::Index(expected))
}

pub fn classify(entries: &[(RawKey, Raw)]) -> Shape {
    if entries.is_empty() {
        Shape::Empty
    } else if array_is_sequence(entries) {
        Shape::Sequence
    } else if array_is_map(entries) {
        Shape::Map
    } else {
        Shape::Mixed
    }
}

/// Classify a raw tree into a [`Node`] tree.
pub fn lift(raw: Raw) -> std::result::Result<Node, ShapeError> {
    lift_at(raw, "$")
}

fn lift_at(raw: Raw, path: &str) -> std::result::Result<Node, ShapeError> {
    let entries = match raw {
        Raw::Scalar(scalar) => return Ok(Node::Scalar(scalar)),
        Raw::Container(entries) => entries,
    };
    match classify(&entries) {
        Shape::Empty => Ok(Node::empty_seq()),
        Shape::Sequence => entries
            .into_iter()
            .map(|(key, value)| lift_at(value, &child_path(path, &key)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Node::Seq),
        Shape::Map => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let child = child_path(path, &key);
                map.insert(key.to_string(), lift_at(value, &child)?);
            }
            Ok(Node::Map(map))
        }
        Shape::Mixed => {
            log::debug!("refusing to lift mixed-key container at {path}");
            Err(ShapeError::MixedKeys { path: path.to_owned() })
        }
    }
}

fn child_path(parent: &str, key: &RawKey) -> String {
    format!("{parent}.{key}")
}

/// Later duplicates overwrite the earlier value in its original position.
fn push_entry(
    entries: &mut Vec<(RawKey, Raw)>,
    positions: &mut HashMap<RawKey, usize>,
    key: RawKey,
    value: Raw,
) {
    match positions.get(&key) {
        Some(&at) => entries[at].1 = value,
        None => {
            positions.insert(key.clone(), entries.len());
            entries.push((key, value));
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECODERS
// ————————————————————————————————————————————————————————————————————————————

impl Raw {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Raw::Scalar(Scalar::Null),
            Value::Bool(b) => Raw::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Raw::Scalar(Scalar::Number(n)),
            Value::String(s) => Raw::Scalar(Scalar::String(s)),
            Value::Array(items) => Raw::Container(
                items
                    .into_iter()
                    .zip(0i64..)
                    .map(|(item, i)| (RawKey::Index(i), Raw::from_json(item)))
                    .collect(),
            ),
            // object keys are unique and `from_name` keeps them apart
            Value::Object(object) => Raw::Container(
                object
                    .into_iter()
                    .map(|(key, value)| (RawKey::from_name(key), Raw::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Merge keys (`<<`) are expected to be applied by the caller already.
    pub fn from_yaml(value: serde_yaml::Value) -> std::result::Result<Self, ShapeError> {
        from_yaml_at(value, "$")
    }
}

fn from_yaml_at(value: serde_yaml::Value, path: &str) -> std::result::Result<Raw, ShapeError> {
    use serde_yaml::Value as Y;
    Ok(match value {
        Y::Null => Raw::Scalar(Scalar::Null),
        Y::Bool(b) => Raw::Scalar(Scalar::Bool(b)),
        Y::Number(n) => Raw::Scalar(Scalar::Number(yaml_number(&n)?)),
        Y::String(s) => Raw::Scalar(Scalar::String(s)),
        Y::Sequence(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for (item, i) in items.into_iter().zip(0i64..) {
                let child = format!("{path}.{i}");
                entries.push((RawKey::Index(i), from_yaml_at(item, &child)?));
            }
            Raw::Container(entries)
        }
        Y::Mapping(mapping) => {
            // `true`, `1` and `1.0` are distinct YAML keys but the same index
            let mut entries = Vec::with_capacity(mapping.len());
            let mut positions = HashMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = yaml_key(key, path)?;
                let child = child_path(path, &key);
                let value = from_yaml_at(value, &child)?;
                push_entry(&mut entries, &mut positions, key, value);
            }
            Raw::Container(entries)
        }
        Y::Tagged(tagged) => from_yaml_at(tagged.value, path)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> std::result::Result<Number, ShapeError> {
    if let Some(i) = n.as_i64() {
        Ok(i.into())
    } else if let Some(u) = n.as_u64() {
        Ok(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| ShapeError::UnrepresentableNumber(n.to_string()))
    }
}

fn yaml_key(key: serde_yaml::Value, path: &str) -> std::result::Result<RawKey, ShapeError> {
    use serde_yaml::Value as Y;
    match key {
        Y::Null => Ok(RawKey::Name(String::new())),
        Y::Bool(b) => Ok(RawKey::Index(i64::from(b))),
        Y::Number(n) => Ok(match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => RawKey::Index(i),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                RawKey::Index(f as i64)
            }
            _ => RawKey::Name(n.to_string()),
        }),
        Y::String(s) => Ok(RawKey::from_name(s)),
        Y::Tagged(tagged) => yaml_key(tagged.value, path),
        Y::Sequence(_) => Err(ShapeError::UnsupportedKey { path: path.to_owned(), kind: "sequence" }),
        Y::Mapping(_) => Err(ShapeError::UnsupportedKey { path: path.to_owned(), kind: "mapping" }),
    }
}

impl Node {
    /// Decode JSON text and classify it.
    pub fn from_json_str(src: &str) -> Result<Node> {
        let value: Value = serde_json::from_str(src)?;
        Ok(lift(Raw::from_json(value))?)
    }

    /// Decode YAML text, apply merge keys and classify it.
    pub fn from_yaml_str(src: &str) -> Result<Node> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(src)?;
        value.apply_merge()?;
        Ok(lift(Raw::from_yaml(value)?)?)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> RawKey {
        RawKey::Name(s.to_owned())
    }

    fn leaf(n: i64) -> Raw {
        Raw::Scalar(Scalar::Number(n.into()))
    }

    #[test]
    fn predicates_on_empty_container_are_false() {
        assert!(!array_is_map(&[]));
        assert!(!array_is_sequence(&[]));
        assert_eq!(classify(&[]), Shape::Empty);
    }

    #[test]
    fn predicates_follow_keys() {
        let seq = vec![(RawKey::Index(0), leaf(1)), (RawKey::Index(1), leaf(2))];
        assert!(array_is_sequence(&seq));
        assert!(!array_is_map(&seq));

        let gap = vec![(RawKey::Index(0), leaf(1)), (RawKey::Index(2), leaf(2))];
        assert!(!array_is_sequence(&gap));
        assert_eq!(classify(&gap), Shape::Mixed);

        let out_of_order = vec![(RawKey::Index(1), leaf(1)), (RawKey::Index(0), leaf(2))];
        assert_eq!(classify(&out_of_order), Shape::Mixed);

        let map = vec![(name("a"), leaf(1)), (name("b"), leaf(2))];
        assert!(array_is_map(&map));
        assert_eq!(classify(&map), Shape::Map);

        let mixed = vec![(name("a"), leaf(1)), (RawKey::Index(0), leaf(2))];
        assert_eq!(classify(&mixed), Shape::Mixed);
    }

    #[test]
    fn numeric_names_become_indices() {
        assert_eq!(RawKey::from_name("0".into()), RawKey::Index(0));
        assert_eq!(RawKey::from_name("-3".into()), RawKey::Index(-3));
        assert_eq!(RawKey::from_name("01".into()), name("01"));
        assert_eq!(RawKey::from_name("+1".into()), name("+1"));
        assert_eq!(RawKey::from_name("1.5".into()), name("1.5"));
        assert_eq!(RawKey::from_name("99999999999999999999".into()), name("99999999999999999999"));
    }

    #[test]
    fn json_object_with_index_keys_lifts_to_sequence() {
        let n = Node::from_json_str(r#"{"0": "a", "1": "b"}"#).unwrap();
        assert_eq!(n, node!(["a", "b"]));
    }

    #[test]
    fn empty_containers_lift_to_empty_sequence() {
        assert_eq!(Node::from_json_str("{}").unwrap(), Node::empty_seq());
        assert_eq!(Node::from_json_str("[]").unwrap(), Node::empty_seq());
    }

    #[test]
    fn mixed_keys_fail_with_path() {
        let err = Node::from_json_str(r#"{"env": {"0": "x", "name": "y"}}"#).unwrap_err();
        match err {
            crate::Error::Shape(ShapeError::MixedKeys { path }) => assert_eq!(path, "$.env"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn yaml_lifts_in_document_order() {
        let err = Node::from_yaml_str("language: php\nscript:\n  - make\n  - make test\n1: x\n").unwrap_err();
        // integer key next to names is a mixed container
        assert!(matches!(err, crate::Error::Shape(ShapeError::MixedKeys { .. })));

        let n = Node::from_yaml_str("language: php\nscript:\n  - make\n  - make test\n").unwrap();
        assert_eq!(n, node!({"language": "php", "script": ["make", "make test"]}));
    }

    #[test]
    fn yaml_colliding_keys_overwrite_in_place() {
        let n = Node::from_yaml_str("0: a\n1: b\ntrue: c\n").unwrap();
        assert_eq!(n, node!(["a", "c"]));

        let n = Node::from_yaml_str("0: a\n1.0: b\n1: c\nfalse: d\n").unwrap();
        assert_eq!(n, node!(["d", "c"]));
    }

    #[test]
    fn yaml_merge_keys_are_applied() {
        let src = "base: &base\n  os: linux\njob:\n  <<: *base\n  script: make\n";
        let n = Node::from_yaml_str(src).unwrap();
        assert_eq!(
            n,
            node!({"base": {"os": "linux"}, "job": {"script": "make", "os": "linux"}})
        );
    }

    #[test]
    fn yaml_non_finite_float_is_rejected() {
        let err = Node::from_yaml_str("x: .nan\n").unwrap_err();
        assert!(matches!(err, crate::Error::Shape(ShapeError::UnrepresentableNumber(_))));
    }

    #[test]
    fn yaml_sequence_key_is_rejected() {
        let err = Node::from_yaml_str("? [a, b]\n: x\n").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Shape(ShapeError::UnsupportedKey { kind: "sequence", .. })
        ));
    }
}
