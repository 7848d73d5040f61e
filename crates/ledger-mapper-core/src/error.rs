use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DocType;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid root {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run cancelled")]
    Cancelled,
}

/// A single entry that could not be read during the walk. Never fatal.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot read metadata for {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn path(&self) -> &Path {
        match self {
            ScanError::Walk { path, .. } | ScanError::Metadata { path, .. } => path,
        }
    }
}

/// Two or more distinct source files resolved to the same destination.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{} files map to {target}: {}", .sources.len(), .sources.join(", "))]
pub struct NamingCollisionError {
    pub target: String,
    pub sources: Vec<String>,
}

/// A multi-file cell whose parts were numbered in discovery order because
/// no part hint told the files apart.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{entity}{} has {} {doc_type} files without distinct part hints", year_suffix(.year), .files.len())]
pub struct AmbiguousGroupingWarning {
    pub entity: String,
    pub year: Option<i32>,
    pub doc_type: DocType,
    pub files: Vec<String>,
}

fn year_suffix(year: &Option<i32>) -> String {
    year.map(|y| format!(" ({y})")).unwrap_or_default()
}
