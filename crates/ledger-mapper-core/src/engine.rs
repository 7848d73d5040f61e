use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::classify;
use crate::config::AppConfig;
use crate::diagnostics::Diagnostic;
use crate::error::Error;
use crate::grouping::{self, EntityGroup, GroupStatus};
use crate::model::{DestinationPlan, DocType, FileRecord, PartSource, RecordId};
use crate::naming;
use crate::progress::ProgressReporter;
use crate::scanner::{self, ScanOptions};
use crate::summary::PlanSummary;

pub struct PlanEngine {
    config: AppConfig,
    cancel: Arc<AtomicBool>,
}

/// Everything one run produced. Records are indexed by `RecordId`.
#[derive(Debug)]
pub struct PlanResult {
    pub root: PathBuf,
    pub records: Vec<FileRecord>,
    pub groups: Vec<EntityGroup>,
    /// Clean plan: one row per planned record, in record order.
    pub plans: Vec<DestinationPlan>,
    pub diagnostics: Vec<Diagnostic>,
    /// Records involved in a naming collision.
    pub collided: Vec<RecordId>,
    /// Records listed for review (fallback parts, low confidence, unclassified).
    pub flagged: Vec<RecordId>,
    pub summary: PlanSummary,
    pub scan_duration: Duration,
    pub plan_duration: Duration,
}

impl PlanResult {
    pub fn plan_for(&self, id: RecordId) -> Option<&DestinationPlan> {
        self.plans.iter().find(|p| p.source == id)
    }

    pub fn planned_groups(&self) -> impl Iterator<Item = &EntityGroup> {
        self.groups.iter().filter(|g| g.status == GroupStatus::Planned)
    }

    pub fn attention_groups(&self) -> impl Iterator<Item = &EntityGroup> {
        self.groups.iter().filter(|g| g.status != GroupStatus::Planned)
    }
}

impl PlanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.config.root_path = root.to_string();
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Token checked between entity folders; set it to stop the run.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel.load(Ordering::Relaxed) {
            info!("Run cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Run the full planning pipeline:
    /// 1. Walk the root, one record per file
    /// 2. Classify each record
    /// 3. Group by entity/year and number multi-file cells
    /// 4. Compute destinations and pull out collisions
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<PlanResult, Error> {
        let root = PathBuf::from(&self.config.root_path);
        let mut summary = PlanSummary::default();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        self.check_cancelled()?;

        // Phase 1: Scan
        info!("Scanning {}...", root.display());
        reporter.on_scan_start(&self.config.root_path);
        let scan_start = Instant::now();
        let mut records = self.scan(&root, reporter, &mut summary, &mut diagnostics)?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(records.len(), summary.scan_warnings, scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s: {} files, {} skipped",
            scan_duration.as_secs_f64(),
            records.len(),
            summary.scan_warnings,
        );

        // Phase 2-4: Classify, group, name
        reporter.on_plan_start(records.len());
        let plan_start = Instant::now();

        for record in records.iter_mut() {
            classify::classify_record(record);
        }

        let resolution = grouping::resolve(&mut records);
        let mut groups = resolution.groups;
        let mut flagged: HashSet<RecordId> = HashSet::new();
        for (id, part) in resolution.parts.iter().enumerate() {
            if matches!(part, Some(p) if p.source == PartSource::Fallback) {
                flagged.insert(id);
            }
        }
        diagnostics.extend(
            resolution
                .ambiguous
                .into_iter()
                .map(Diagnostic::AmbiguousGrouping),
        );

        let outcome = naming::plan_destinations(&records, &groups, &resolution.parts, &self.config);
        diagnostics.extend(
            outcome
                .collisions
                .into_iter()
                .map(Diagnostic::NamingCollision),
        );

        for plan in &outcome.plans {
            let record = &records[plan.source];
            if record.doc_type != DocType::Otro && record.confidence < self.config.review_threshold {
                flagged.insert(plan.source);
                diagnostics.push(Diagnostic::LowConfidence {
                    path: record.source_path(),
                    doc_type: record.doc_type,
                    confidence: record.confidence,
                });
            }
        }
        for (id, record) in records.iter().enumerate() {
            if record.doc_type == DocType::Otro {
                flagged.insert(id);
                diagnostics.push(Diagnostic::Unclassified {
                    path: record.source_path(),
                });
            }
        }

        // Unclassified files are listed for review but leave their group's status alone.
        let collided: HashSet<RecordId> = outcome.collided.iter().copied().collect();
        let needs_review =
            |id: &RecordId| flagged.contains(id) && records[*id].doc_type != DocType::Otro;
        for group in groups.iter_mut() {
            group.status = if group.records.iter().any(|id| collided.contains(id)) {
                GroupStatus::Unresolved
            } else if group.records.iter().any(|id| needs_review(id)) {
                GroupStatus::NeedsReview
            } else {
                GroupStatus::Planned
            };
        }

        summary.tally(&records, &groups, &outcome.plans);
        let plan_duration = plan_start.elapsed();
        reporter.on_plan_complete(outcome.plans.len(), diagnostics.len(), plan_duration.as_secs_f64());

        info!(
            "{} files in {} groups: {} planned, {} diagnostics",
            summary.total_files,
            summary.total_groups,
            summary.planned_files,
            diagnostics.len(),
        );

        let mut flagged: Vec<RecordId> = flagged.into_iter().collect();
        flagged.sort_unstable();

        Ok(PlanResult {
            root,
            records,
            groups,
            plans: outcome.plans,
            diagnostics,
            collided: outcome.collided,
            flagged,
            summary,
            scan_duration,
            plan_duration,
        })
    }

    fn scan(
        &self,
        root: &std::path::Path,
        reporter: &dyn ProgressReporter,
        summary: &mut PlanSummary,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<FileRecord>, Error> {
        let options = ScanOptions::from(&self.config);
        let mut records: Vec<FileRecord> = Vec::new();
        let mut seen_entities: HashMap<String, usize> = HashMap::new();
        let mut current_entity: Option<String> = None;

        for item in scanner::scan(root, &options)? {
            match item {
                Ok(record) => {
                    if current_entity.as_deref() != Some(record.entity_name.as_str()) {
                        self.check_cancelled()?;
                        current_entity = Some(record.entity_name.clone());
                    }
                    *seen_entities.entry(record.entity_name.clone()).or_insert(0) += 1;
                    reporter.on_scan_progress(records.len() + 1, &record.source_path());
                    records.push(record);
                }
                Err(err) => {
                    warn!("Skipping {}: {}", err.path().display(), err);
                    summary.scan_warnings += 1;
                    diagnostics.push(Diagnostic::from(&err));
                }
            }
        }

        for (entity, count) in &seen_entities {
            debug!("{}: {} files", entity, count);
        }

        Ok(records)
    }
}
