//! Filename based document classification.
//!
//! Classification walks an ordered rule table and stops at the first rule whose
//! predicate matches. Rules are checked against the filename first; only when
//! nothing matches is the parent folder name tried, and a folder match never
//! reports more than [`FOLDER_CONFIDENCE_CAP`].

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::model::{DocType, FileRecord};

pub const FOLDER_CONFIDENCE_CAP: f32 = 0.5;

lazy_static! {
    static ref SUMAS_Y_SALDOS: Regex = Regex::new(r"(?i)sumas[\s_\-]*(?:y[\s_\-]*)?saldos").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub doc_type: DocType,
    pub confidence: f32,
    /// Name of the rule that matched, `"none"` for unclassified.
    pub rule: &'static str,
    pub from_folder: bool,
}

struct Rule {
    name: &'static str,
    doc_type: DocType,
    confidence: f32,
    matches: fn(&NameView) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        name: "sumas-saldos",
        doc_type: DocType::SumasSaldos,
        confidence: 0.95,
        matches: is_sumas_saldos,
    },
    Rule {
        name: "libro-diario",
        doc_type: DocType::LibroDiario,
        confidence: 0.95,
        matches: is_libro_diario,
    },
    Rule {
        name: "balance",
        doc_type: DocType::SumasSaldos,
        confidence: 0.6,
        matches: is_balance,
    },
];

/// Lowercased name plus its alphanumeric tokens.
struct NameView<'a> {
    raw: &'a str,
    lower: String,
    tokens: Vec<String>,
}

impl<'a> NameView<'a> {
    fn new(raw: &'a str) -> Self {
        let lower = raw.to_lowercase();
        let tokens = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { raw, lower, tokens }
    }

    fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

fn is_sumas_saldos(name: &NameView) -> bool {
    name.has_token("sys")
        || name.raw.contains("SyS")
        || SUMAS_Y_SALDOS.is_match(name.raw)
        || (name.lower.contains("balance") && name.lower.contains("sumas"))
}

fn is_libro_diario(name: &NameView) -> bool {
    name.has_token("ld") || name.lower.contains("diario")
}

fn is_balance(name: &NameView) -> bool {
    name.lower.contains("balance")
}

fn first_match(name: &str) -> Option<&'static Rule> {
    let view = NameView::new(name);
    RULES.iter().find(|rule| (rule.matches)(&view))
}

/// Classify a filename, falling back to its parent folder name.
pub fn classify(filename: &str, parent_folder: Option<&str>) -> Classification {
    if let Some(rule) = first_match(filename) {
        return Classification {
            doc_type: rule.doc_type,
            confidence: rule.confidence,
            rule: rule.name,
            from_folder: false,
        };
    }

    if let Some(rule) = parent_folder.and_then(first_match) {
        return Classification {
            doc_type: rule.doc_type,
            confidence: rule.confidence.min(FOLDER_CONFIDENCE_CAP),
            rule: rule.name,
            from_folder: true,
        };
    }

    Classification {
        doc_type: DocType::Otro,
        confidence: 0.0,
        rule: "none",
        from_folder: false,
    }
}

/// Classify a record in place.
pub fn classify_record(record: &mut FileRecord) -> Classification {
    let result = classify(&record.raw_filename, record.parent_folder.as_deref());
    debug!(
        "{} -> {} ({:.2}, rule {}{})",
        record.source_path(),
        result.doc_type,
        result.confidence,
        result.rule,
        if result.from_folder { ", from folder" } else { "" },
    );
    record.doc_type = result.doc_type;
    record.confidence = result.confidence;
    result
}
