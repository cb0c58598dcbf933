//! Per-item error taxonomy
//!
//! These errors never abort a run: a failing post, asset or marker is logged
//! and skipped while its siblings carry on. Environment failures (directory
//! creation, manifest write) travel as `anyhow::Error` instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a post produced no manifest record
#[derive(Debug, Error)]
pub enum PostError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid frontmatter: {0}")]
    Frontmatter(String),

    #[error("missing required frontmatter field `{0}`")]
    MissingField(&'static str),

    #[error("converter `{program}` is not available: {source}")]
    ConverterUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("converter exited with {status}: {stderr}")]
    ConverterFailed { status: String, stderr: String },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PostError {
    /// Validation problems are warnings; everything else is an error
    pub fn is_validation(&self) -> bool {
        matches!(self, PostError::MissingField(_) | PostError::Frontmatter(_))
    }
}

/// A sibling asset that could not be copied
#[derive(Debug, Error)]
#[error("failed to copy {from:?} to {to:?}: {source}")]
pub struct AssetError {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A component marker that could not be hydrated as written
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("component `{0}` not found in registry")]
    UnknownComponent(String),

    #[error("invalid props for component `{component}`: {source}")]
    InvalidProps {
        component: String,
        #[source]
        source: serde_json::Error,
    },
}
