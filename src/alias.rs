// src/alias.rs
//! Alias keys: alternate or deprecated names that resolve to a canonical key.
//!
//! When both an alias and its canonical key are present, whichever of the two
//! comes later in the map wins, the way a hand-edited file reads top to
//! bottom.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::node::{Map, Node};

/// Alias key → canonical key, applied in insertion order.
pub type Aliases = IndexMap<String, String>;

/// Resolve alias keys of a map into their canonical keys.
///
/// Non-map nodes and an empty alias table pass through unchanged. Positions
/// are taken from the input before anything moves: an alias overwrites (or
/// creates) its canonical key unless the canonical key is declared after it.
/// The alias key never survives, except for an alias mapped to itself,
/// which is skipped and leaves its entry untouched. New canonical keys are
/// appended.
pub fn filter_alias_map(node: Node, aliases: &Aliases) -> Node {
    match node {
        Node::Map(map) if !map.is_empty() && !aliases.is_empty() => {
            Node::Map(resolve_aliases(map, aliases))
        }
        other => other,
    }
}

fn resolve_aliases(map: Map, aliases: &Aliases) -> Map {
    let positions: HashMap<String, usize> = map
        .keys()
        .enumerate()
        .map(|(at, key)| (key.clone(), at))
        .collect();

    let mut resolved = map;
    for (alias, original) in aliases {
        if alias == original {
            continue;
        }
        let Some(&alias_at) = positions.get(alias) else {
            continue;
        };
        let Some(value) = resolved.shift_remove(alias) else {
            continue;
        };
        match positions.get(original) {
            Some(&original_at) if original_at > alias_at => {
                log::debug!("alias `{alias}` dropped, `{original}` is declared after it");
            }
            _ => {
                resolved.insert(original.clone(), value);
            }
        }
    }
    resolved
}

/// Overwrite `into` with the entries of `what`, aliases resolved first.
///
/// Anything but a map in `what` leaves `into` as it is.
pub fn merge_map_with_alias(mut into: Map, what: Node, aliases: &Aliases) -> Map {
    if let Node::Map(entries) = filter_alias_map(what, aliases) {
        into.extend(entries);
    }
    into
}

// ------------------------------- Tests ------------------------------------ //
