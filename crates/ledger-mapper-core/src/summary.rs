use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::grouping::{EntityGroup, GroupStatus};
use crate::model::{DestinationPlan, DocType, FileRecord};

/// Run-wide counters, built up as the pipeline goes and returned with the result.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_entities: usize,
    pub total_groups: usize,
    pub complete_groups: usize,
    pub incomplete_groups: usize,
    pub groups_needing_attention: usize,
    pub total_files: usize,
    pub libro_diario_files: usize,
    pub sumas_saldos_files: usize,
    pub otro_files: usize,
    pub multi_part_files: usize,
    pub files_with_year: usize,
    pub planned_files: usize,
    pub total_size_bytes: u64,
    pub scan_warnings: usize,
    /// Lowercased extension -> file count. `""` for files without one.
    pub extensions: BTreeMap<String, usize>,
}

impl PlanSummary {
    /// Fill in everything but `scan_warnings`, which the scan phase counts itself.
    pub fn tally(&mut self, records: &[FileRecord], groups: &[EntityGroup], plans: &[DestinationPlan]) {
        let entities: HashSet<&str> = groups.iter().map(|g| g.key.entity.as_str()).collect();
        self.total_entities = entities.len();
        self.total_groups = groups.len();
        self.complete_groups = groups.iter().filter(|g| g.is_complete).count();
        self.incomplete_groups = self.total_groups - self.complete_groups;
        self.groups_needing_attention = groups
            .iter()
            .filter(|g| g.status != GroupStatus::Planned)
            .count();

        self.total_files = records.len();
        self.libro_diario_files = 0;
        self.sumas_saldos_files = 0;
        self.otro_files = 0;
        self.files_with_year = 0;
        self.total_size_bytes = 0;
        self.extensions.clear();

        for record in records {
            match record.doc_type {
                DocType::LibroDiario => self.libro_diario_files += 1,
                DocType::SumasSaldos => self.sumas_saldos_files += 1,
                DocType::Otro => self.otro_files += 1,
            }
            if record.year.is_some() {
                self.files_with_year += 1;
            }
            self.total_size_bytes += record.size_bytes;
            *self
                .extensions
                .entry(record.extension().to_lowercase())
                .or_insert(0) += 1;
        }

        self.multi_part_files = plans.iter().filter(|p| p.part.is_some()).count();
        self.planned_files = plans.len();
    }
}
