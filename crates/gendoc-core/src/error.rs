use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Failures that stop a run outright, as opposed to the per-line
/// [`Diagnostic`]s that are collected and reported at the end.
#[derive(Debug, Error)]
pub enum GendocError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no table of contents detected, no headings in input?")]
    EmptyToc { diagnostics: Vec<Diagnostic> },
    #[error("bad highlight rules in {}: {message}", path.display())]
    RuleSet { path: PathBuf, message: String },
    #[error("invalid highlight pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("malformed rule set: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{format} reader failed: {message}")]
    Format { format: String, message: String },
    #[error("unrecognised image format in {}", path.display())]
    Image { path: PathBuf },
}

impl GendocError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GendocError::Io {
            path: path.into(),
            source,
        }
    }
}
