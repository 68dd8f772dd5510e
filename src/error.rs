//! Boundary errors.
//!
//! Only decoding, classification of decoder output and profile loading can
//! fail. The normalization operations themselves are total.

use std::path::PathBuf;

use thiserror::Error;

/// A decoded container that has no node shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("container at `{path}` mixes sequence indices and map keys")]
    MixedKeys { path: String },

    #[error("unsupported key at `{path}`: {kind} keys are not allowed")]
    UnsupportedKey { path: String, kind: &'static str },

    #[error("number `{0}` cannot be represented as a node scalar")]
    UnrepresentableNumber(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("invalid profile at JSON path {path} → {message}")]
    Profile { path: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
