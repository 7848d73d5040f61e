//! Entity grouping and part resolution.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::AmbiguousGroupingWarning;
use crate::model::{DocType, FileRecord, PartAssignment, PartOrder, PartSource, RecordId};
use crate::parts::extract_part_hint;

/// Comparison key for a group: trimmed, lowercased entity name plus year.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub entity: String,
    pub year: Option<i32>,
}

impl GroupKey {
    pub fn of(record: &FileRecord) -> Self {
        Self {
            entity: record.entity_name.trim().to_lowercase(),
            year: record.year,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Planned,
    NeedsReview,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup {
    pub key: GroupKey,
    /// Entity name as first discovered, trimmed.
    pub display_name: String,
    pub year: Option<i32>,
    /// Members in discovery order.
    pub records: Vec<RecordId>,
    pub is_complete: bool,
    pub total_size_bytes: u64,
    pub missing: Vec<DocType>,
    pub status: GroupStatus,
}

/// Outcome of grouping one run's records.
#[derive(Debug, Default)]
pub struct Resolution {
    pub groups: Vec<EntityGroup>,
    /// Indexed by `RecordId`.
    pub parts: Vec<Option<PartAssignment>>,
    pub ambiguous: Vec<AmbiguousGroupingWarning>,
}

/// Cluster records into groups ordered by first discovery.
pub fn group_records(records: &[FileRecord]) -> Vec<EntityGroup> {
    let mut groups: Vec<EntityGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for (id, record) in records.iter().enumerate() {
        let key = GroupKey::of(record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(EntityGroup {
                key,
                display_name: record.entity_name.trim().to_string(),
                year: record.year,
                records: Vec::new(),
                is_complete: false,
                total_size_bytes: 0,
                missing: Vec::new(),
                status: GroupStatus::Planned,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.records.push(id);
        group.total_size_bytes += record.size_bytes;
    }

    for group in &mut groups {
        let has = |doc_type: DocType| group.records.iter().any(|&id| records[id].doc_type == doc_type);
        group.missing = [DocType::LibroDiario, DocType::SumasSaldos]
            .into_iter()
            .filter(|&doc_type| !has(doc_type))
            .collect();
        group.is_complete = group.missing.is_empty();
    }

    groups
}

/// Sort keys for hints that all carry a start. Dates compare in full; once a
/// quarter is in the cell only the position within the year counts.
fn start_keys(orders: &[PartOrder]) -> Vec<(i32, u32, u32)> {
    let all_dates = orders.iter().all(|o| matches!(o, PartOrder::Date(_)));
    orders
        .iter()
        .map(|order| {
            let (month, day) = order.start_in_year();
            match order {
                PartOrder::Date(date) if all_dates => (date.year(), month, day),
                _ => (0, month, day),
            }
        })
        .collect()
}

/// Number the members of one (group, doc type) cell.
///
/// Distinct hints on every member number the cell by ascending start when
/// all hints carry one, otherwise by discovery order. Anything less, or two
/// parts starting on the same day, falls back to discovery order and is
/// reported as ambiguous.
fn number_cell(records: &[FileRecord], cell: &[RecordId]) -> (Vec<(RecordId, PartAssignment)>, bool) {
    let hints: Vec<_> = cell.iter().map(|&id| records[id].part_hint.as_ref()).collect();
    let distinct: HashSet<_> = hints.iter().flatten().collect();
    let mut hinted = hints.iter().all(Option::is_some) && distinct.len() == cell.len();

    let mut ordered: Vec<RecordId> = cell.to_vec();
    if hinted {
        let orders: Option<Vec<PartOrder>> = hints
            .iter()
            .map(|hint| hint.and_then(|h| h.order_key()))
            .collect();
        if let Some(orders) = orders {
            let mut keyed: Vec<_> = start_keys(&orders)
                .into_iter()
                .zip(cell.iter().copied())
                .collect();
            keyed.sort_by_key(|(key, _)| *key);
            if keyed.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                hinted = false;
            } else {
                ordered = keyed.into_iter().map(|(_, id)| id).collect();
            }
        }
    }
    let source = if hinted {
        PartSource::Hint
    } else {
        PartSource::Fallback
    };

    let numbered = ordered
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            (
                id,
                PartAssignment {
                    part: i as u32 + 1,
                    source,
                },
            )
        })
        .collect();

    (numbered, !hinted)
}

/// Extract part hints, group the records, and number multi-file cells.
pub fn resolve(records: &mut [FileRecord]) -> Resolution {
    for record in records.iter_mut() {
        if record.doc_type != DocType::Otro {
            record.part_hint = extract_part_hint(&record.raw_filename);
        }
    }

    let groups = group_records(records);
    let mut parts: Vec<Option<PartAssignment>> = vec![None; records.len()];
    let mut ambiguous = Vec::new();

    for group in &groups {
        for doc_type in [DocType::LibroDiario, DocType::SumasSaldos] {
            let cell: Vec<RecordId> = group
                .records
                .iter()
                .copied()
                .filter(|&id| records[id].doc_type == doc_type)
                .collect();
            if cell.len() < 2 {
                continue;
            }

            let (numbered, fallback) = number_cell(records, &cell);
            for (id, assignment) in numbered {
                debug!(
                    "{} -> part {} ({:?})",
                    records[id].source_path(),
                    assignment.part,
                    assignment.source
                );
                parts[id] = Some(assignment);
            }

            if fallback {
                let warning = AmbiguousGroupingWarning {
                    entity: group.display_name.clone(),
                    year: group.year,
                    doc_type,
                    files: cell.iter().map(|&id| records[id].source_path()).collect(),
                };
                warn!("{}", warning);
                ambiguous.push(warning);
            }
        }
    }

    Resolution {
        groups,
        parts,
        ambiguous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use crate::model::PartHint;
    use std::path::PathBuf;

    fn record(entity: &str, year: Option<i32>, name: &str, doc_type: DocType, size: u64) -> FileRecord {
        let mut path = PathBuf::from(entity);
        if let Some(y) = year {
            path.push(y.to_string());
        }
        path.push(name);
        let mut r = FileRecord::new(path, entity, year, size, Utc::now());
        r.doc_type = doc_type;
        r.confidence = 0.95;
        r
    }

    #[test]
    fn test_groups_by_entity_case_insensitive_and_year() {
        let records = vec![
            record("Argon Hotel", None, "LD.xls", DocType::LibroDiario, 10),
            record("argon hotel ", None, "SYS.xls", DocType::SumasSaldos, 20),
            record("Argon Hotel", Some(2017), "LD.xls", DocType::LibroDiario, 5),
        ];
        let groups = group_records(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].display_name, "Argon Hotel");
        assert_eq!(groups[0].records, vec![0, 1]);
        assert!(groups[0].is_complete);
        assert_eq!(groups[0].total_size_bytes, 30);
        assert_eq!(groups[1].year, Some(2017));
        assert!(!groups[1].is_complete);
        assert_eq!(groups[1].missing, vec![DocType::SumasSaldos]);
    }

    #[test]
    fn test_incomplete_group_size_is_exact() {
        let records = vec![
            record("Solo", None, "LD a.xls", DocType::LibroDiario, 8_650_752),
            record("Solo", None, "notas.txt", DocType::Otro, 91_638),
            record("Solo", None, "LD b.xls", DocType::LibroDiario, 1),
        ];
        let groups = group_records(&records);
        assert!(!groups[0].is_complete);
        assert_eq!(groups[0].total_size_bytes, 8_650_752 + 91_638 + 1);
    }

    #[test]
    fn test_codes_distinguish_parts() {
        let mut records = vec![
            record("Hoteles Turísticos Unidos", None, "LD_4200 ene-mar.XLS", DocType::LibroDiario, 1),
            record("Hoteles Turísticos Unidos", None, "LD_4201 abr-jun.XLS", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        assert!(resolution.ambiguous.is_empty());
        assert_eq!(records[0].part_hint, Some(PartHint::Code("4200".to_string())));
        assert_eq!(records[1].part_hint, Some(PartHint::Code("4201".to_string())));
        assert_eq!(
            resolution.parts[0],
            Some(PartAssignment { part: 1, source: PartSource::Hint })
        );
        assert_eq!(
            resolution.parts[1],
            Some(PartAssignment { part: 2, source: PartSource::Hint })
        );
    }

    #[test]
    fn test_date_ranges_order_parts_regardless_of_discovery() {
        let mut records = vec![
            record("Braide", None, "LD 01.07.2024 a 30.09.2024.XLS", DocType::LibroDiario, 1),
            record("Braide", None, "LD 01.01.2024 a 31.03.2024.XLS", DocType::LibroDiario, 1),
            record("Braide", None, "LD 01.04.2024 a 30.06.2024.XLS", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        let part = |id: usize| resolution.parts[id].map(|p| p.part);
        assert_eq!(part(1), Some(1));
        assert_eq!(part(2), Some(2));
        assert_eq!(part(0), Some(3));
        assert!(resolution.ambiguous.is_empty());
        assert_eq!(
            records[1].part_hint,
            Some(PartHint::DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            })
        );
    }

    #[test]
    fn test_quarter_labels_and_date_ranges_share_one_order() {
        let mut records = vec![
            record("Braide", None, "LD 01.04.2024 a 30.06.2024.xls", DocType::LibroDiario, 1),
            record("Braide", None, "LD Q1.xls", DocType::LibroDiario, 1),
            record("Braide", None, "LD T4.xls", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        assert_eq!(records[1].part_hint, Some(PartHint::Quarter(1)));
        let part = |id: usize| resolution.parts[id].map(|p| p.part);
        assert_eq!(part(1), Some(1));
        assert_eq!(part(0), Some(2));
        assert_eq!(part(2), Some(3));
        assert!(resolution.ambiguous.is_empty());
    }

    #[test]
    fn test_parts_starting_on_the_same_day_fall_back() {
        let mut records = vec![
            record("Braide", None, "LD 01.04.2024 a 30.06.2024.xls", DocType::LibroDiario, 1),
            record("Braide", None, "LD Q2.xls", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        assert_eq!(resolution.ambiguous.len(), 1);
        assert_eq!(
            resolution.parts[0],
            Some(PartAssignment { part: 1, source: PartSource::Fallback })
        );
    }

    #[test]
    fn test_date_ranges_across_years_keep_the_year() {
        let mut records = vec![
            record("Braide", None, "LD 01.01.2025 a 31.03.2025.xls", DocType::LibroDiario, 1),
            record("Braide", None, "LD 01.10.2024 a 31.12.2024.xls", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        assert_eq!(resolution.parts[1].map(|p| p.part), Some(1));
        assert_eq!(resolution.parts[0].map(|p| p.part), Some(2));
    }

    #[test]
    fn test_fallback_numbering_is_ambiguous() {
        let mut records = vec![
            record("Acteon Siglo XXI", None, "LD enero.xls", DocType::LibroDiario, 1),
            record("Acteon Siglo XXI", None, "SYS.xls", DocType::SumasSaldos, 1),
            record("Acteon Siglo XXI", None, "LD copia.xls", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        assert_eq!(
            resolution.parts[0],
            Some(PartAssignment { part: 1, source: PartSource::Fallback })
        );
        assert_eq!(
            resolution.parts[2],
            Some(PartAssignment { part: 2, source: PartSource::Fallback })
        );
        assert_eq!(resolution.parts[1], None);
        assert_eq!(resolution.ambiguous.len(), 1);
        assert_eq!(resolution.ambiguous[0].doc_type, DocType::LibroDiario);
        assert_eq!(resolution.ambiguous[0].files.len(), 2);
    }

    #[test]
    fn test_duplicate_hints_fall_back() {
        let mut records = vec![
            record("Dup", None, "LD_4200.xls", DocType::LibroDiario, 1),
            record("Dup", None, "LD_4200 (copia).xls", DocType::LibroDiario, 1),
        ];
        let resolution = resolve(&mut records);
        assert_eq!(resolution.ambiguous.len(), 1);
        assert_eq!(resolution.parts[0].map(|p| p.source), Some(PartSource::Fallback));
    }

    #[test]
    fn test_otro_files_are_never_numbered() {
        let mut records = vec![
            record("Varios", None, "a.txt", DocType::Otro, 1),
            record("Varios", None, "b.txt", DocType::Otro, 1),
        ];
        let resolution = resolve(&mut records);
        assert!(resolution.parts.iter().all(Option::is_none));
        assert!(resolution.ambiguous.is_empty());
    }
}
