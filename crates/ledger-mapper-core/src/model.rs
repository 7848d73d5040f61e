use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Index of a `FileRecord` in the run's record list.
pub type RecordId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    LibroDiario,
    SumasSaldos,
    Otro,
}

impl DocType {
    /// Destination folder and filename suffix. `None` for unclassified files.
    pub fn folder_name(&self) -> Option<&'static str> {
        match self {
            DocType::LibroDiario => Some("libro_diario"),
            DocType::SumasSaldos => Some("sumas_saldos"),
            DocType::Otro => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocType::LibroDiario => "Libro Diario",
            DocType::SumasSaldos => "Sumas y Saldos",
            DocType::Otro => "Otro",
        }
    }

    pub fn short_code(&self) -> &'static str {
        match self {
            DocType::LibroDiario => "LD",
            DocType::SumasSaldos => "SYS",
            DocType::Otro => "OTRO",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocType::LibroDiario => "LIBRO_DIARIO",
            DocType::SumasSaldos => "SUMAS_SALDOS",
            DocType::Otro => "OTRO",
        };
        f.write_str(name)
    }
}

/// Something in a filename that tells one part of a split document from another.
///
/// Serialized through its string form (`2025-01-01..2025-03-31`, `Q2`,
/// `code:4200`, `marker:AA01`) so it fits in a single CSV column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PartHint {
    DateRange { start: NaiveDate, end: NaiveDate },
    Quarter(u8),
    Code(String),
    Marker(String),
}

/// Where a part starts. Not `Ord`: a quarter carries no year, so the two
/// kinds only compare through [`PartOrder::start_in_year`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOrder {
    Date(NaiveDate),
    Quarter(u8),
}

impl PartOrder {
    /// `(month, day)` the part starts on. A quarter starts on the first day of its first month.
    pub fn start_in_year(&self) -> (u32, u32) {
        match self {
            PartOrder::Date(date) => (date.month(), date.day()),
            PartOrder::Quarter(q) => (u32::from(q.saturating_sub(1)) * 3 + 1, 1),
        }
    }
}

impl PartHint {
    pub fn order_key(&self) -> Option<PartOrder> {
        match self {
            PartHint::DateRange { start, .. } => Some(PartOrder::Date(*start)),
            PartHint::Quarter(q) => Some(PartOrder::Quarter(*q)),
            PartHint::Code(_) | PartHint::Marker(_) => None,
        }
    }
}

impl fmt::Display for PartHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartHint::DateRange { start, end } => write!(f, "{}..{}", start, end),
            PartHint::Quarter(q) => write!(f, "Q{}", q),
            PartHint::Code(code) => write!(f, "code:{}", code),
            PartHint::Marker(marker) => write!(f, "marker:{}", marker),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised part hint '{0}'")]
pub struct ParsePartHintError(String);

impl FromStr for PartHint {
    type Err = ParsePartHintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePartHintError(s.to_string());

        if let Some(code) = s.strip_prefix("code:") {
            return Ok(PartHint::Code(code.to_string()));
        }
        if let Some(marker) = s.strip_prefix("marker:") {
            return Ok(PartHint::Marker(marker.to_string()));
        }
        if let Some((start, end)) = s.split_once("..") {
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| err())?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").map_err(|_| err())?;
            return Ok(PartHint::DateRange { start, end });
        }
        match s.strip_prefix('Q').and_then(|q| q.parse::<u8>().ok()) {
            Some(q @ 1..=4) => Ok(PartHint::Quarter(q)),
            _ => Err(err()),
        }
    }
}

impl From<PartHint> for String {
    fn from(hint: PartHint) -> Self {
        hint.to_string()
    }
}

impl TryFrom<String> for PartHint {
    type Error = ParsePartHintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One discovered file.
///
/// Created by the scanner with `doc_type = Otro`, `confidence = 0.0` and no
/// part hint; the classifier and the grouping resolver fill those in.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Path relative to the scan root.
    pub relative_path: PathBuf,
    pub entity_name: String,
    pub year: Option<i32>,
    /// Immediate parent folder when it sits below the entity (and is not the year folder).
    pub parent_folder: Option<String>,
    pub raw_filename: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub discovery_index: usize,
    pub doc_type: DocType,
    pub confidence: f32,
    pub part_hint: Option<PartHint>,
}

impl FileRecord {
    pub fn new(
        relative_path: impl Into<PathBuf>,
        entity_name: impl Into<String>,
        year: Option<i32>,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Self {
        let relative_path = relative_path.into();
        let raw_filename = relative_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            relative_path,
            entity_name: entity_name.into(),
            year,
            parent_folder: None,
            raw_filename,
            size_bytes,
            modified_at,
            discovery_index: 0,
            doc_type: DocType::Otro,
            confidence: 0.0,
            part_hint: None,
        }
    }

    /// Extension without the dot, as found on disk.
    pub fn extension(&self) -> String {
        Path::new(&self.raw_filename)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Relative path with `/` separators, used as the record's identity in reports.
    pub fn source_path(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSource {
    /// Numbered from distinct part hints.
    Hint,
    /// Numbered in discovery order; needs manual review.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartAssignment {
    pub part: u32,
    pub source: PartSource,
}

/// Where one FileRecord goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPlan {
    pub source: RecordId,
    /// Destination tree the folders live under; empty for none.
    pub target_root: String,
    pub target_folder: String,
    pub target_filename: String,
    pub part: Option<PartAssignment>,
}

impl DestinationPlan {
    pub fn target_path(&self) -> String {
        let root = self.target_root.trim_end_matches('/');
        if root.is_empty() {
            format!("{}/{}", self.target_folder, self.target_filename)
        } else {
            format!("{}/{}/{}", root, self.target_folder, self.target_filename)
        }
    }
}
