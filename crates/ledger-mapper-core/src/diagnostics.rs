use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AmbiguousGroupingWarning, NamingCollisionError, ScanError};
use crate::model::DocType;

/// Something in a run that needs a person to look at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// File skipped during the walk.
    ScanError { path: String, message: String },
    /// Parts numbered in discovery order. Rows stay in the plan.
    AmbiguousGrouping(AmbiguousGroupingWarning),
    /// Rows left out of the plan.
    NamingCollision(NamingCollisionError),
    /// Planned row classified below the review threshold.
    LowConfidence {
        path: String,
        doc_type: DocType,
        confidence: f32,
    },
    /// File the classifier could not place.
    Unclassified { path: String },
}

impl Diagnostic {
    /// Collisions leave rows without a destination; everything else is advisory.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Diagnostic::NamingCollision(_))
    }
}

impl From<&ScanError> for Diagnostic {
    fn from(err: &ScanError) -> Self {
        Diagnostic::ScanError {
            path: err.path().to_string_lossy().into_owned(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ScanError { message, .. } => write!(f, "skipped: {}", message),
            Diagnostic::AmbiguousGrouping(warning) => write!(f, "ambiguous parts: {}", warning),
            Diagnostic::NamingCollision(collision) => write!(f, "collision: {}", collision),
            Diagnostic::LowConfidence {
                path,
                doc_type,
                confidence,
            } => write!(f, "low confidence: {} as {} ({:.2})", path, doc_type, confidence),
            Diagnostic::Unclassified { path } => write!(f, "unclassified: {}", path),
        }
    }
}
