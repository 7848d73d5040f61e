//! Destination folder and filename computation.
//!
//! Accented Latin letters are transliterated to ASCII (`Turísticos` becomes
//! `Turisticos`), anything else outside `[A-Za-z0-9_-]` is dropped.

use std::collections::HashMap;
use tracing::warn;

use crate::config::{AppConfig, UnclassifiedPolicy};
use crate::error::NamingCollisionError;
use crate::grouping::EntityGroup;
use crate::model::{DestinationPlan, DocType, FileRecord, PartAssignment, RecordId};

const TARGET_EXTENSION: &str = "csv";
const EMPTY_ENTITY: &str = "entidad";

fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => "a",
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => "A",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'É' | 'È' | 'Ê' | 'Ë' => "E",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => "o",
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' => "O",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'Ú' | 'Ù' | 'Û' | 'Ü' => "U",
        'ñ' => "n",
        'Ñ' => "N",
        'ç' => "c",
        'Ç' => "C",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        _ => return None,
    };
    Some(ascii)
}

fn sanitize_with(name: &str, keep_dots: bool) -> String {
    let mut kept = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' || (keep_dots && c == '.') {
            kept.push(c);
        } else if c.is_whitespace() {
            kept.push(' ');
        } else if let Some(ascii) = transliterate(c) {
            kept.push_str(ascii);
        }
    }
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Filesystem-safe entity name: `"Hoteles Turísticos Unidos"` -> `"Hoteles_Turisticos_Unidos"`.
///
/// Disallowed characters are dropped before whitespace runs collapse, so
/// `"A & B"` gives `"A_B"`. A name with nothing left becomes `"entidad"`.
pub fn sanitize_entity_name(name: &str) -> String {
    let sanitized = sanitize_with(name, false);
    if sanitized.is_empty() {
        EMPTY_ENTITY.to_string()
    } else {
        sanitized
    }
}

fn name_prefix(entity: &str, year: Option<i32>) -> String {
    let entity = sanitize_entity_name(entity);
    match year {
        Some(year) => format!("{}_{}", year, entity),
        None => entity,
    }
}

/// `[<year>_]<Entity>_<tipo>[_parteN].csv`, or `None` for unclassified files.
pub fn build_filename(
    entity: &str,
    year: Option<i32>,
    doc_type: DocType,
    part: Option<u32>,
) -> Option<String> {
    let tipo = doc_type.folder_name()?;
    let mut name = format!("{}_{}", name_prefix(entity, year), tipo);
    if let Some(part) = part {
        name.push_str(&format!("_parte{}", part));
    }
    Some(format!("{}.{}", name, TARGET_EXTENSION))
}

/// Catch-all rows keep their original filename and extension behind the entity prefix.
pub fn build_catch_all_filename(entity: &str, year: Option<i32>, raw_filename: &str) -> String {
    format!("{}_{}", name_prefix(entity, year), sanitize_with(raw_filename, true))
}

/// Target folder for a doc type under the given policy.
pub fn target_folder(doc_type: DocType, config: &AppConfig) -> Option<String> {
    match (doc_type.folder_name(), config.unclassified) {
        (Some(folder), _) => Some(folder.to_string()),
        (None, UnclassifiedPolicy::CatchAll) => Some(config.catch_all_folder.clone()),
        (None, UnclassifiedPolicy::Exclude) => None,
    }
}

#[derive(Debug, Default)]
pub struct NamingOutcome {
    /// Clean plan, in record order.
    pub plans: Vec<DestinationPlan>,
    pub collisions: Vec<NamingCollisionError>,
    /// Records dropped from the plan because of a collision.
    pub collided: Vec<RecordId>,
}

/// Compute destinations for every record and pull out colliding rows.
///
/// Rows are named after their group's display name, so case variants of one
/// entity folder land on one spelling.
pub fn plan_destinations(
    records: &[FileRecord],
    groups: &[EntityGroup],
    parts: &[Option<PartAssignment>],
    config: &AppConfig,
) -> NamingOutcome {
    let mut entity_of: Vec<Option<&str>> = vec![None; records.len()];
    for group in groups {
        for &id in &group.records {
            if let Some(slot) = entity_of.get_mut(id) {
                *slot = Some(group.display_name.as_str());
            }
        }
    }

    let mut candidates: Vec<DestinationPlan> = Vec::new();
    for (id, record) in records.iter().enumerate() {
        let Some(folder) = target_folder(record.doc_type, config) else {
            continue;
        };
        let entity = entity_of[id].unwrap_or(record.entity_name.as_str());
        let part = parts.get(id).copied().flatten();
        let filename = match build_filename(entity, record.year, record.doc_type, part.map(|p| p.part)) {
            Some(name) => name,
            None => build_catch_all_filename(entity, record.year, &record.raw_filename),
        };

        candidates.push(DestinationPlan {
            source: id,
            target_root: config.destination_root.clone(),
            target_folder: folder,
            target_filename: filename,
            part,
        });
    }

    // Case-insensitive: the destination may live on a case-insensitive filesystem.
    let mut by_target: HashMap<String, Vec<usize>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for (i, plan) in candidates.iter().enumerate() {
        let key = plan.target_path().to_lowercase();
        by_target
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(i);
    }

    let mut outcome = NamingOutcome::default();
    let mut rejected = vec![false; candidates.len()];
    for key in order {
        let members = &by_target[&key];
        if members.len() < 2 {
            continue;
        }
        let collision = NamingCollisionError {
            target: candidates[members[0]].target_path(),
            sources: members
                .iter()
                .map(|&i| records[candidates[i].source].source_path())
                .collect(),
        };
        warn!("Naming collision: {}", collision);
        for &i in members {
            rejected[i] = true;
            outcome.collided.push(candidates[i].source);
        }
        outcome.collisions.push(collision);
    }

    outcome.collided.sort_unstable();
    outcome.plans = candidates
        .into_iter()
        .zip(rejected)
        .filter_map(|(plan, rejected)| (!rejected).then_some(plan))
        .collect();
    outcome
}
