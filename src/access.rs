// src/access.rs
//! Guarded traversal and selective copy/append/remove between maps.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::node::{Map, Node};
use crate::normalize::normalize_sequence;

// ————————————————————————————————————————————————————————————————————————————
// KEYS
// ————————————————————————————————————————————————————————————————————————————

/// One step into a container: a map key or a sequence position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
}

/// Ordered list of keys, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<Key>);

impl KeyPath {
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for KeyPath {
    type Err = Infallible;

    /// Dotted form, `jobs.include.0.script`. All-digit segments are indices.
    fn from_str(dotted: &str) -> Result<Self, Self::Err> {
        Ok(KeyPath(
            dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(|segment| match segment.parse::<usize>() {
                    Ok(i) => Key::Index(i),
                    Err(_) => Key::Name(segment.to_owned()),
                })
                .collect(),
        ))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<Key> for KeyPath {
    fn from(key: Key) -> Self {
        KeyPath(vec![key])
    }
}

impl From<&str> for KeyPath {
    fn from(name: &str) -> Self {
        KeyPath(vec![name.into()])
    }
}

impl From<String> for KeyPath {
    fn from(name: String) -> Self {
        KeyPath(vec![name.into()])
    }
}

impl From<usize> for KeyPath {
    fn from(index: usize) -> Self {
        KeyPath(vec![index.into()])
    }
}

impl<K: Into<Key>, const N: usize> From<[K; N]> for KeyPath {
    fn from(keys: [K; N]) -> Self {
        KeyPath(keys.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Key>> From<Vec<K>> for KeyPath {
    fn from(keys: Vec<K>) -> Self {
        KeyPath(keys.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Key> + Clone> From<&[K]> for KeyPath {
    fn from(keys: &[K]) -> Self {
        KeyPath(keys.iter().cloned().map(Into::into).collect())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TRAVERSAL
// ————————————————————————————————————————————————————————————————————————————

impl Node {
    /// One step down. Names only address maps, indices only sequences.
    pub fn get(&self, key: &Key) -> Option<&Node> {
        match (self, key) {
            (Node::Map(map), Key::Name(name)) => map.get(name),
            (Node::Seq(items), Key::Index(i)) => items.get(*i),
            _ => None,
        }
    }
}

/// Follow `path` through nested containers.
///
/// `None` as soon as a level is missing the next key or holds null; there
/// are no partial results.
pub fn item(from: &Node, path: impl Into<KeyPath>) -> Option<&Node> {
    let path = path.into();
    let mut top = from;
    for key in path.keys() {
        top = match top.get(key) {
            Some(next) if !next.is_null() => next,
            _ => return None,
        };
    }
    Some(top)
}

/// [`item`] with a fallback.
pub fn item_or(from: &Node, path: impl Into<KeyPath>, default: Node) -> Node {
    item(from, path).cloned().unwrap_or(default)
}

// ————————————————————————————————————————————————————————————————————————————
// SELECTIVE OPS
// ————————————————————————————————————————————————————————————————————————————

/// Append the elements of `from[key]` to `into[key]`.
///
/// `into[key]` starts as `[]` when absent or null. Nothing is appended unless
/// both sides are containers. A map source contributes its values to a
/// sequence target and its entries to a non-empty map target, where a key
/// already present is overwritten in place rather than kept twice. A
/// non-empty map target ignores a sequence source.
pub fn append(mut into: Map, key: &str, from: &Map) -> Map {
    let slot = into.entry(key.to_owned()).or_insert_with(Node::empty_seq);
    if slot.is_null() {
        *slot = Node::empty_seq();
    }
    if let Some(source) = from.get(key) {
        append_into(slot, source);
    }
    into
}

fn append_into(target: &mut Node, source: &Node) {
    let incoming: Vec<Node> = match source {
        Node::Seq(items) => items.clone(),
        Node::Map(entries) => {
            if let Node::Map(existing) = target {
                if !existing.is_empty() {
                    existing.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
                    return;
                }
            }
            entries.values().cloned().collect()
        }
        Node::Scalar(_) => return,
    };

    if matches!(target, Node::Map(existing) if existing.is_empty()) {
        *target = Node::Seq(incoming);
        return;
    }
    match target {
        Node::Seq(items) => items.extend(incoming),
        Node::Map(_) => log::trace!("append: positional items cannot extend a keyed map"),
        Node::Scalar(_) => {}
    }
}

/// `into[k] = from[k]` for every listed key present in `from`.
pub fn copy(mut into: Map, keys: &[&str], from: &Map) -> Map {
    for key in keys {
        if let Some(value) = from.get(*key) {
            into.insert((*key).to_owned(), value.clone());
        }
    }
    into
}

/// [`copy`], normalizing each copied value to a sequence.
pub fn copy_normalize_sequence(mut into: Map, keys: &[&str], from: &Map) -> Map {
    for key in keys {
        if let Some(value) = from.get(*key) {
            into.insert((*key).to_owned(), Node::Seq(normalize_sequence(value.clone())));
        }
    }
    into
}

/// Drop the listed keys; the remaining entries keep their order.
pub fn remove(mut from: Map, keys: &[&str]) -> Map {
    for key in keys {
        from.shift_remove(*key);
    }
    from
}

// ------------------------------- Tests ------------------------------------ //
