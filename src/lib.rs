//! Normalization of loosely-typed configuration nodes.
//!
//! A decoded config file gives every field whatever shape its author chose:
//! a bare scalar, a list, or a map. This crate classifies decoder output once
//! into [`Node`] and then reshapes nodes into the canonical form a schema
//! layer expects.
//!
//! Pipeline:
//! - decode (JSON/YAML) → [`raw::Raw`] → [`raw::lift`] → [`Node`]
//! - [`normalize`]: sequence / map / prefix disambiguation / string
//! - [`alias`]: alias keys and merges
//! - [`access`]: guarded traversal, append/copy/remove
//! - [`filter`]: allow-lists
//! - [`profile`]: per-section settings that drive the above
//!
//! Every operation after `lift` is total and pure.
pub mod access;
pub mod alias;
pub mod error;
pub mod filter;
pub mod node;
pub mod normalize;
pub mod path_de;
pub mod profile;
pub mod raw;

pub use access::{Key, KeyPath, append, copy, copy_normalize_sequence, item, item_or, remove};
pub use alias::{Aliases, filter_alias_map, merge_map_with_alias};
pub use error::{Error, Result, ShapeError};
pub use filter::{filter_enum, filter_sequence};
pub use node::{Map, Node, Scalar, Shape};
pub use normalize::{normalize_map, normalize_map_ex, normalize_sequence, normalize_string};
pub use profile::{Profile, SectionRule, ShapeRule};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}
