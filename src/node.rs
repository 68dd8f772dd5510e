// src/node.rs
//! The generic configuration node.
//!
//! A `Node` is the canonical, already-classified form of a decoded config
//! value: a scalar leaf, an ordered sequence, or a string-keyed map whose
//! insertion order is kept. Classification from decoder output happens once,
//! in [`crate::raw::lift`]; everything downstream matches on the variants.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};

/// String-keyed map with stable insertion order.
pub type Map = IndexMap<String, Node>;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Leaf value. Equality is strict: `1`, `1.0` and `"1"` are all different.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    Seq(Vec<Node>),
    Map(Map),
}

/// Shape of a container as seen by the classification predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No entries; neither a map nor a sequence.
    Empty,
    Sequence,
    Map,
    /// Keys are neither all names nor exactly `0..n`.
    Mixed,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for Node {
    fn default() -> Self {
        Node::Scalar(Scalar::Null)
    }
}

impl Node {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn empty_seq() -> Self {
        Node::Seq(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Seq(_) | Node::Map(_))
    }

    /// Non-empty map.
    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(map) if !map.is_empty())
    }

    /// Non-empty sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Seq(items) if !items.is_empty())
    }

    pub fn is_empty_container(&self) -> bool {
        match self {
            Node::Seq(items) => items.is_empty(),
            Node::Map(map) => map.is_empty(),
            Node::Scalar(_) => false,
        }
    }

    /// `None` for scalars. A lifted node never reports [`Shape::Mixed`].
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Node::Scalar(_) => None,
            _ if self.is_empty_container() => Some(Shape::Empty),
            Node::Seq(_) => Some(Shape::Sequence),
            Node::Map(_) => Some(Shape::Map),
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    /// Compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Empty => "empty",
            Shape::Sequence => "sequence",
            Shape::Map => "map",
            Shape::Mixed => "mixed",
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSIONS
// ————————————————————————————————————————————————————————————————————————————

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Node::Scalar(scalar)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Scalar::String(s.to_owned()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Scalar::String(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Scalar(Scalar::Number(n.into()))
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Scalar(Scalar::Number(n.into()))
    }
}

impl From<f64> for Node {
    /// Non-finite floats have no scalar form and become null.
    fn from(f: f64) -> Self {
        Number::from_f64(f)
            .map(|n| Node::Scalar(Scalar::Number(n)))
            .unwrap_or_default()
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Seq(items)
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Node::Map(map)
    }
}

/// Structural conversion: objects become maps and arrays become sequences
/// without looking at the keys. Decoder output should go through
/// [`crate::raw::lift`] instead, which classifies numeric keys.
impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::null(),
            Value::Bool(b) => Node::from(b),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::String(s) => Node::from(s),
            Value::Array(items) => Node::Seq(items.into_iter().map(Node::from).collect()),
            Value::Object(entries) => Node::Map(
                entries.into_iter().map(|(k, v)| (k, Node::from(v))).collect()
            ),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n),
            Node::Scalar(Scalar::String(s)) => Value::String(s),
            Node::Seq(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Map(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
            ),
        }
    }
}

/// Build an ordered node tree from JSON-like literal syntax.
///
/// ```
/// use node_norm::node;
/// let n = node!({"script": ["make", "make test"], "env": {"CI": true}});
/// assert!(n.is_map());
/// ```
#[macro_export]
macro_rules! node {
    ($($json:tt)+) => {
        $crate::Node::from($crate::__private::json!($($json)+))
    };
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_containers_are_neither_map_nor_sequence() {
        let empty_map = Node::Map(Map::new());
        let empty_seq = Node::empty_seq();
        for n in [&empty_map, &empty_seq] {
            assert!(!n.is_map());
            assert!(!n.is_sequence());
            assert!(n.is_empty_container());
            assert_eq!(n.shape(), Some(Shape::Empty));
        }
        assert!(node!({"a": 1}).is_map());
        assert!(node!([1]).is_sequence());
        assert_eq!(node!("x").shape(), None);
    }

    #[test]
    fn scalar_equality_is_strict() {
        assert_ne!(node!(1), node!(1.0));
        assert_ne!(node!(1), node!("1"));
        assert_ne!(node!(false), node!(null));
        assert_eq!(node!(1), Node::from(1i64));
    }

    #[test]
    fn literal_keeps_insertion_order_and_serializes() {
        let n = node!({"z": 1, "a": [true, null], "m": {"k": "v"}});
        let keys: Vec<&str> = n.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(n.to_string(), r#"{"z":1,"a":[true,null],"m":{"k":"v"}}"#);
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert!(Node::from(f64::NAN).is_null());
        assert!(Node::from(f64::INFINITY).is_null());
    }

    #[test]
    fn converts_back_to_json_value() {
        let v = serde_json::json!({"a": [1, "two", {"b": null}]});
        assert_eq!(Value::from(Node::from(v.clone())), v);
    }
}
