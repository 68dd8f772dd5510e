// src/normalize.rs
//! Shape normalization.
//!
//! Each function takes a node of unknown shape and returns the canonical
//! shape a caller asked for. All of them are total: a node that does not fit
//! is wrapped, collapsed to an empty shape, or passed through, never rejected.

use crate::access::item;
use crate::node::{Map, Node, Scalar};

/// Canonical sequence.
///
/// - a non-empty sequence is returned as is;
/// - null and empty containers become `[]`;
/// - anything else (scalars, maps) is wrapped as `[node]`.
///
/// Idempotent.
pub fn normalize_sequence(node: Node) -> Vec<Node> {
    match node {
        Node::Seq(items) => items,
        Node::Scalar(Scalar::Null) => Vec::new(),
        Node::Map(map) if map.is_empty() => Vec::new(),
        other => vec![other],
    }
}

/// Canonical map.
///
/// Without `default_prefix` a node that is not a map yields an empty map and
/// its content is lost. Callers that need the data must pass a prefix.
pub fn normalize_map(node: Node, default_prefix: Option<&str>) -> Map {
    match node {
        Node::Map(map) if !map.is_empty() => map,
        other => match default_prefix {
            Some(prefix) => wrap(prefix, other),
            None => {
                log::trace!("normalize_map: no default prefix, dropping {other}");
                Map::new()
            }
        },
    }
}

/// Map normalization with wrap-vs-merge disambiguation.
///
/// A map handed in for a section with `prefix_key` is either the section's
/// own map (the prefix key sits next to sibling fields) or the whole value of
/// the prefix key. It is the former when the prefix key is present, or when
/// any of `default_keys` other than the prefix key is present; otherwise the
/// map is wrapped under the prefix key. The prefix value always ends up as a
/// sequence.
///
/// Without `prefix_key` the node is returned unchanged, whatever its shape.
pub fn normalize_map_ex(node: Node, prefix_key: Option<&str>, default_keys: &[&str]) -> Node {
    let Some(prefix) = prefix_key else {
        return node;
    };
    let map = match node {
        Node::Map(map) if !map.is_empty() => map,
        other => return Node::Map(wrap(prefix, other)),
    };

    let mut merge = map.contains_key(prefix);
    if !merge && !default_keys.is_empty() {
        merge = default_keys
            .iter()
            .any(|key| *key != prefix && map.contains_key(*key));
    }

    let mut result = if merge {
        map
    } else {
        log::debug!("normalize_map_ex: wrapping map under `{prefix}`");
        let mut wrapped = Map::new();
        wrapped.insert(prefix.to_owned(), Node::Map(map));
        wrapped
    };

    let slot = result.entry(prefix.to_owned()).or_insert_with(Node::empty_seq);
    let value = std::mem::take(slot);
    *slot = Node::Seq(normalize_sequence(value));
    Node::Map(result)
}

/// Single string out of a node.
///
/// A map is first replaced by its `default_prefix` entry, a sequence by its
/// first element. Only a null (or missing) result gives `None`. Scalars
/// coerce to their text; any container that remains, empty or not, is
/// rendered as compact JSON.
pub fn normalize_string(node: &Node, default_prefix: Option<&str>) -> Option<String> {
    let mut buffer = node;
    if buffer.is_map() {
        buffer = item(buffer, default_prefix?)?;
    }
    if let Node::Seq(items) = buffer {
        buffer = items.first()?;
    }
    match buffer {
        Node::Scalar(Scalar::Null) => None,
        Node::Scalar(Scalar::Bool(b)) => Some(b.to_string()),
        Node::Scalar(Scalar::Number(n)) => Some(n.to_string()),
        Node::Scalar(Scalar::String(s)) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn wrap(prefix: &str, node: Node) -> Map {
    let mut map = Map::new();
    map.insert(prefix.to_owned(), Node::Seq(normalize_sequence(node)));
    map
}

// ------------------------------- Tests ------------------------------------ //
