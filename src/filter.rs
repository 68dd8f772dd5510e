// src/filter.rs
//! Allow-list filters. Membership is strict: `"1"` is not `1`.

use crate::node::Node;

/// Elements of `sequence` that appear in `allowed`, in their original order,
/// duplicates included.
pub fn filter_sequence(sequence: &[Node], allowed: &[Node]) -> Vec<Node> {
    sequence
        .iter()
        .filter(|item| allowed.contains(item))
        .cloned()
        .collect()
}

pub fn filter_enum(value: Node, allowed: &[Node]) -> Option<Node> {
    allowed.contains(&value).then_some(value)
}
