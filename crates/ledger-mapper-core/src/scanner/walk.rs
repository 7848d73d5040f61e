use chrono::{DateTime, Utc};
use glob::Pattern;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};

use super::year::{year_from_folder, DEFAULT_YEAR_RANGE};
use crate::config::AppConfig;
use crate::error::{Error, ScanError};
use crate::model::FileRecord;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub ignore_patterns: Vec<String>,
    pub year_range: RangeInclusive<i32>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            year_range: DEFAULT_YEAR_RANGE,
        }
    }
}

impl From<&AppConfig> for ScanOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            ignore_patterns: config.ignore_patterns.clone(),
            year_range: config.year_range.0..=config.year_range.1,
        }
    }
}

/// Lazy walk over the entity folders under a root.
///
/// Yields one unclassified `FileRecord` per regular file, entity folder by
/// entity folder in file-name order. Unreadable entries come out as
/// `Err(ScanError)` and the walk carries on.
pub struct ScanIter {
    root: PathBuf,
    walker: walkdir::IntoIter,
    ignore_patterns: Vec<Pattern>,
    year_range: RangeInclusive<i32>,
    next_index: usize,
}

/// Validate `root` and start walking it.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanIter, Error> {
    let invalid = |reason: String| Error::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(root).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    fs::read_dir(root).map_err(|e| invalid(e.to_string()))?;

    let ignore_patterns: Vec<Pattern> = options
        .ignore_patterns
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Ok(ScanIter {
        root: root.to_path_buf(),
        walker,
        ignore_patterns,
        year_range: options.year_range.clone(),
        next_index: 0,
    })
}

impl ScanIter {
    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn build_record(&mut self, entry: &DirEntry) -> Result<Option<FileRecord>, ScanError> {
        let path = entry.path();
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => return Ok(None),
        };

        let components: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if components.len() < 2 {
            debug!("Skipping {}: not inside an entity folder", path.display());
            return Ok(None);
        }

        let entity_name = components[0].clone();
        if entity_name.trim().is_empty() {
            debug!("Skipping {}: blank entity folder name", path.display());
            return Ok(None);
        }

        let depth = components.len();
        let year = if depth >= 3 {
            year_from_folder(&components[1], &self.year_range)
        } else {
            None
        };
        let parent_folder = match (depth, year) {
            (0..=2, _) | (3, Some(_)) => None,
            _ => Some(components[depth - 2].clone()),
        };

        let metadata = entry.metadata().map_err(|source| ScanError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        let modified_at: DateTime<Utc> = metadata
            .modified()
            .map_err(|source| ScanError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .into();

        let mut record = FileRecord::new(relative, entity_name, year, metadata.len(), modified_at);
        record.parent_folder = parent_folder;
        record.discovery_index = self.next_index;
        self.next_index += 1;

        Ok(Some(record))
    }
}

impl Iterator for ScanIter {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(ScanError::Walk { path, source: err }));
                }
            };

            if self.is_ignored(entry.path()) {
                if entry.file_type().is_dir() {
                    self.walker.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            match self.build_record(&entry) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
