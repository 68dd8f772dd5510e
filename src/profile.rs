// src/profile.rs
//! Per-section normalization settings, loaded from a JSON profile.
//!
//! A profile tells the normalizer, for the document root and for each named
//! top-level section, which canonical shape to produce and with which prefix
//! key, default keys, aliases and allow-list.
//!
//! ```json
//! {
//!   "root": { "aliases": { "rvm": "ruby" } },
//!   "sections": {
//!     "script": { "shape": "sequence" },
//!     "env": { "shape": "map_ex", "prefix_key": "jobs", "default_keys": ["global", "jobs"] },
//!     "os": { "shape": "sequence", "allowed": ["linux", "osx"] }
//!   }
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::alias::{Aliases, filter_alias_map};
use crate::error::{Error, Result};
use crate::filter::{filter_enum, filter_sequence};
use crate::node::Node;
use crate::normalize::{normalize_map, normalize_map_ex, normalize_sequence, normalize_string};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeRule {
    /// Aliases only; the shape is left alone.
    #[default]
    Keep,
    Sequence,
    Map,
    MapEx,
    String,
    Enum,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionRule {
    pub shape: ShapeRule,
    pub prefix_key: Option<String>,
    pub default_keys: Vec<String>,
    pub aliases: Aliases,
    #[serde(deserialize_with = "allowed_nodes")]
    pub allowed: Option<Vec<Node>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub root: SectionRule,
    pub sections: IndexMap<String, SectionRule>,
}

fn allowed_nodes<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<Node>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values.map(|values| values.into_iter().map(Node::from).collect()))
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

impl Profile {
    pub fn from_json_str(src: &str) -> Result<Self> {
        let profile: Profile = crate::path_de::from_str_with_path(src)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: Profile = crate::path_de::from_slice_with_path(&bytes)?;
        profile.validate()?;
        log::debug!(
            "loaded profile {} ({} sections)",
            path.display(),
            profile.sections.len()
        );
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        let named = self
            .sections
            .iter()
            .map(|(name, rule)| (format!("sections.{name}"), rule));
        for (path, rule) in std::iter::once(("root".to_owned(), &self.root)).chain(named) {
            if rule.shape == ShapeRule::Enum && rule.allowed.is_none() {
                return Err(Error::Profile {
                    path: format!("{path}.allowed"),
                    message: "enum sections need an `allowed` list".to_owned(),
                });
            }
            if rule.shape == ShapeRule::MapEx && rule.prefix_key.is_none() {
                log::warn!("{path}: map_ex without prefix_key leaves non-map values as they are");
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// APPLICATION
// ————————————————————————————————————————————————————————————————————————————

impl SectionRule {
    /// Resolve aliases, then normalize to the configured shape.
    pub fn apply(&self, node: Node) -> Node {
        let node = filter_alias_map(node, &self.aliases);
        let prefix = self.prefix_key.as_deref();
        match self.shape {
            ShapeRule::Keep => node,
            ShapeRule::Sequence => {
                let items = normalize_sequence(node);
                match &self.allowed {
                    Some(allowed) => Node::Seq(filter_sequence(&items, allowed)),
                    None => Node::Seq(items),
                }
            }
            ShapeRule::Map => Node::Map(normalize_map(node, prefix)),
            ShapeRule::MapEx => {
                let default_keys: Vec<&str> = self.default_keys.iter().map(String::as_str).collect();
                normalize_map_ex(node, prefix, &default_keys)
            }
            ShapeRule::String => normalize_string(&node, prefix).map(Node::from).unwrap_or_default(),
            // the allow-list is matched against the string form
            ShapeRule::Enum => {
                let allowed = self.allowed.as_deref().unwrap_or_default();
                normalize_string(&node, prefix)
                    .map(Node::from)
                    .and_then(|value| filter_enum(value, allowed))
                    .unwrap_or_default()
            }
        }
    }
}

impl Profile {
    /// Root rule first, then every configured section found in the result.
    /// Sections the profile does not name pass through.
    pub fn apply(&self, document: Node) -> Node {
        let mut map = match self.root.apply(document) {
            Node::Map(map) => map,
            other => return other,
        };
        for (name, rule) in &self.sections {
            if let Some(slot) = map.get_mut(name) {
                let value = std::mem::take(slot);
                *slot = rule.apply(value);
            }
        }
        Node::Map(map)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node;
    use pretty_assertions::assert_eq;

    const TRAVIS: &str = r#"{
        "root": { "aliases": { "rvm": "ruby" } },
        "sections": {
            "language": { "shape": "enum", "allowed": ["ruby", "php", "node_js"] },
            "script": { "shape": "sequence" },
            "ruby": { "shape": "sequence" },
            "os": { "shape": "sequence", "allowed": ["linux", "osx"] },
            "dist": { "shape": "string", "prefix_key": "name" },
            "env": {
                "shape": "map_ex",
                "prefix_key": "jobs",
                "default_keys": ["global", "jobs"],
                "aliases": { "matrix": "jobs" }
            },
            "addons": { "shape": "map" }
        }
    }"#;

    fn profile() -> Profile {
        Profile::from_json_str(TRAVIS).unwrap()
    }

    #[test]
    fn parses_shapes_and_tables() {
        let p = profile();
        assert_eq!(p.sections["env"].shape, ShapeRule::MapEx);
        assert_eq!(p.sections["env"].aliases["matrix"], "jobs");
        assert_eq!(p.sections["addons"].prefix_key, None);
        assert_eq!(p.root.shape, ShapeRule::Keep);
        assert_eq!(
            p.sections["language"].allowed.as_deref(),
            Some(&[node!("ruby"), node!("php"), node!("node_js")][..])
        );
    }

    #[test]
    fn applies_every_section() {
        let doc = node!({
            "language": "ruby",
            "rvm": 2.7,
            "script": "bundle exec rake",
            "os": ["linux", "windows", "osx"],
            "dist": {"name": "focal"},
            "env": ["A=1", "B=2"],
            "addons": "apt",
            "notifications": {"email": false}
        });
        let out = profile().apply(doc);
        assert_eq!(
            out,
            node!({
                "language": "ruby",
                "script": ["bundle exec rake"],
                "os": ["linux", "osx"],
                "dist": "focal",
                "env": {"jobs": ["A=1", "B=2"]},
                "addons": {},
                "notifications": {"email": false},
                "ruby": [2.7]
            })
        );
    }

    #[test]
    fn section_aliases_resolve_before_disambiguation() {
        let out = profile().apply(node!({"env": {"global": ["A=1"], "matrix": ["B=2"]}}));
        assert_eq!(out, node!({"env": {"global": ["A=1"], "jobs": ["B=2"]}}));

        let out = profile().apply(node!({"env": {"FOO": "bar"}}));
        assert_eq!(out, node!({"env": {"jobs": [{"FOO": "bar"}]}}));
    }

    #[test]
    fn unknown_enum_value_becomes_null() {
        let out = profile().apply(node!({"language": "java"}));
        assert_eq!(out, node!({"language": null}));
    }

    #[test]
    fn enum_reads_string_out_of_containers() {
        let out = profile().apply(node!({"language": ["ruby"]}));
        assert_eq!(out, node!({"language": "ruby"}));

        let p = Profile::from_json_str(
            r#"{"sections": {"language": {"shape": "enum", "prefix_key": "name", "allowed": ["ruby", "php"]}}}"#,
        )
        .unwrap();
        assert_eq!(p.apply(node!({"language": {"name": "php"}})), node!({"language": "php"}));
        assert_eq!(p.apply(node!({"language": ["java", "ruby"]})), node!({"language": null}));
        assert_eq!(p.apply(node!({"language": {"version": "3"}})), node!({"language": null}));
    }

    #[test]
    fn non_map_document_passes_root_rule_only() {
        assert_eq!(profile().apply(node!(["a"])), node!(["a"]));
    }

    #[test]
    fn root_rule_can_wrap_document() {
        let p = Profile::from_json_str(
            r#"{"root": {"shape": "map_ex", "prefix_key": "script"}, "sections": {}}"#,
        )
        .unwrap();
        assert_eq!(p.apply(node!("make")), node!({"script": ["make"]}));
    }

    #[test]
    fn errors_carry_json_path() {
        let err = Profile::from_json_str(r#"{"sections": {"env": {"shape": "tuple"}}}"#).unwrap_err();
        match err {
            Error::Profile { path, .. } => assert_eq!(path, "sections.env.shape"),
            other => panic!("unexpected error: {other}"),
        }

        let err = Profile::from_json_str(r#"{"sections": {"env": {"prefx_key": "jobs"}}}"#).unwrap_err();
        assert!(matches!(err, Error::Profile { .. }));
    }

    #[test]
    fn enum_without_allowed_is_rejected() {
        let err = Profile::from_json_str(r#"{"sections": {"language": {"shape": "enum"}}}"#).unwrap_err();
        match err {
            Error::Profile { path, .. } => assert_eq!(path, "sections.language.allowed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Profile::load(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
