//! CSV and JSON exports of a finished plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::diagnostics::Diagnostic;
use crate::engine::PlanResult;
use crate::error::Error;
use crate::grouping::{EntityGroup, GroupStatus};
use crate::model::{DocType, PartHint, PartSource, RecordId};
use crate::summary::PlanSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Planned,
    Review,
    Collision,
    Excluded,
}

/// One exported line per discovered file, planned or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub source_path: String,
    pub entity: String,
    pub year: Option<i32>,
    pub parent_folder: Option<String>,
    pub raw_filename: String,
    pub extension: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub doc_type: DocType,
    pub confidence: f32,
    pub part_hint: Option<PartHint>,
    pub discovery_index: usize,
    pub target_folder: Option<String>,
    pub target_filename: Option<String>,
    pub target_path: Option<String>,
    pub part: Option<u32>,
    pub part_source: Option<PartSource>,
    pub status: RowStatus,
}

impl PlanResult {
    fn row(&self, id: RecordId) -> PlanRow {
        let record = &self.records[id];
        let plan = self.plan_for(id);

        let status = if self.collided.binary_search(&id).is_ok() {
            RowStatus::Collision
        } else if plan.is_none() {
            RowStatus::Excluded
        } else if self.flagged.binary_search(&id).is_ok() {
            RowStatus::Review
        } else {
            RowStatus::Planned
        };

        PlanRow {
            source_path: record.source_path(),
            entity: record.entity_name.clone(),
            year: record.year,
            parent_folder: record.parent_folder.clone(),
            raw_filename: record.raw_filename.clone(),
            extension: record.extension(),
            size_bytes: record.size_bytes,
            modified_at: record.modified_at,
            doc_type: record.doc_type,
            confidence: record.confidence,
            part_hint: record.part_hint.clone(),
            discovery_index: record.discovery_index,
            target_folder: plan.map(|p| p.target_folder.clone()),
            target_filename: plan.map(|p| p.target_filename.clone()),
            target_path: plan.map(|p| p.target_path()),
            part: plan.and_then(|p| p.part).map(|p| p.part),
            part_source: plan.and_then(|p| p.part).map(|p| p.source),
            status,
        }
    }

    /// Rows for every record, in discovery order.
    pub fn rows(&self) -> Vec<PlanRow> {
        (0..self.records.len()).map(|id| self.row(id)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub entity: String,
    pub year: Option<i32>,
    pub complete: bool,
    pub total_size_bytes: u64,
    pub missing: Vec<DocType>,
    pub status: GroupStatus,
    pub rows: Vec<PlanRow>,
}

/// Full JSON document for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub root: String,
    pub generated_at: DateTime<Utc>,
    pub summary: PlanSummary,
    pub groups: Vec<GroupReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanReport {
    pub fn from_result(result: &PlanResult) -> Self {
        let group_report = |group: &EntityGroup| GroupReport {
            entity: group.display_name.clone(),
            year: group.year,
            complete: group.is_complete,
            total_size_bytes: group.total_size_bytes,
            missing: group.missing.clone(),
            status: group.status,
            rows: group.records.iter().map(|&id| result.row(id)).collect(),
        };

        Self {
            root: result.root.to_string_lossy().into_owned(),
            generated_at: Utc::now(),
            summary: result.summary.clone(),
            groups: result.groups.iter().map(group_report).collect(),
            diagnostics: result.diagnostics.clone(),
        }
    }
}

fn create_parent_dir(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_rows<W: Write>(writer: W, rows: &[PlanRow]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<PlanRow>, Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Write the per-file plan as CSV, replacing any existing file.
pub fn write_csv(result: &PlanResult, path: &Path) -> Result<(), Error> {
    create_parent_dir(path)?;
    let rows = result.rows();
    write_rows(File::create(path)?, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<PlanRow>, Error> {
    read_rows(File::open(path)?)
}

/// Write the grouped report as pretty-printed JSON.
pub fn write_json(result: &PlanResult, path: &Path) -> Result<(), Error> {
    create_parent_dir(path)?;
    let report = PlanReport::from_result(result);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &report)?;
    info!(
        "Wrote report for {} groups to {}",
        report.groups.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_row() -> PlanRow {
        PlanRow {
            source_path: "Braide/LD 01.01.2024 a 31.03.2024.XLS".to_string(),
            entity: "Braide".to_string(),
            year: None,
            parent_folder: None,
            raw_filename: "LD 01.01.2024 a 31.03.2024.XLS".to_string(),
            extension: "XLS".to_string(),
            size_bytes: 91_638,
            modified_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap(),
            doc_type: DocType::LibroDiario,
            confidence: 0.95,
            part_hint: Some("2024-01-01..2024-03-31".parse().unwrap()),
            discovery_index: 0,
            target_folder: Some("libro_diario".to_string()),
            target_filename: Some("Braide_libro_diario_parte1.csv".to_string()),
            target_path: Some(
                "datos_tratados/libro_diario/Braide_libro_diario_parte1.csv".to_string(),
            ),
            part: Some(1),
            part_source: Some(PartSource::Hint),
            status: RowStatus::Planned,
        }
    }

    #[test]
    fn test_csv_rows_read_back() {
        let excluded = PlanRow {
            source_path: "Braide/2019/varios/Notas.txt".to_string(),
            year: Some(2019),
            parent_folder: Some("varios".to_string()),
            raw_filename: "Notas.txt".to_string(),
            extension: "txt".to_string(),
            doc_type: DocType::Otro,
            confidence: 0.0,
            part_hint: None,
            discovery_index: 1,
            target_folder: None,
            target_filename: None,
            target_path: None,
            part: None,
            part_source: None,
            status: RowStatus::Excluded,
            ..sample_row()
        };
        let rows = vec![sample_row(), excluded];

        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        let parsed = read_rows(buf.as_slice()).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_csv_header() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[sample_row()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("source_path,entity,year,parent_folder,raw_filename"));
        assert!(header.ends_with("part,part_source,status"));
        assert!(text.contains("LIBRO_DIARIO"));
        assert!(text.contains("2024-01-01..2024-03-31"));
    }
}
