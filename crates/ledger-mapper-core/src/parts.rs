//! Part hint extraction.
//!
//! Same shape as the classifier: an ordered table of extractors, first
//! non-empty result wins. Extractors see the filename without its extension.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::Path;
use tracing::trace;

use crate::model::PartHint;

lazy_static! {
    // 01.01.2025 a 31.03.2025, 01-04-2025 al 30-06-2025, 01/07/2025 - 30/09/2025
    static ref DATE_RANGE: Regex = Regex::new(
        r"(?i)(\d{1,2})[./\-](\d{1,2})[./\-](\d{4})\s*(?:a|al|hasta|-|_)\s*(\d{1,2})[./\-](\d{1,2})[./\-](\d{4})"
    )
    .unwrap();
    // LD_4200, SYS 4201, diario-0003
    static ref DOC_CODE: Regex =
        Regex::new(r"(?i)(?:^|[^a-z0-9])(?:ld|sys|diario)[\s_\-]*(\d{3,6})(?:[^0-9]|$)").unwrap();
    static ref AA_MARKER: Regex = Regex::new(r"(?i)aa(\d{2})(?:[^0-9]|$)").unwrap();
    static ref PARTE_MARKER: Regex =
        Regex::new(r"(?i)(?:^|[^a-z])parte?[\s_\-]*(\d{1,3})(?:[^0-9]|$)").unwrap();
}

struct Extractor {
    name: &'static str,
    extract: fn(&str) -> Option<PartHint>,
}

const EXTRACTORS: &[Extractor] = &[
    Extractor {
        name: "date-range",
        extract: date_range,
    },
    Extractor {
        name: "quarter",
        extract: quarter_label,
    },
    Extractor {
        name: "code",
        extract: doc_code,
    },
    Extractor {
        name: "marker",
        extract: part_marker,
    },
];

fn date_at(caps: &Captures, first: usize) -> Option<NaiveDate> {
    let day = caps.get(first)?.as_str().parse().ok()?;
    let month = caps.get(first + 1)?.as_str().parse().ok()?;
    let year = caps.get(first + 2)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn date_range(stem: &str) -> Option<PartHint> {
    let caps = DATE_RANGE.captures(stem)?;
    let start = date_at(&caps, 1)?;
    let end = date_at(&caps, 4)?;
    if end < start {
        return None;
    }
    Some(PartHint::DateRange { start, end })
}

fn quarter_label(stem: &str) -> Option<PartHint> {
    stem.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .find_map(|token| match token.as_bytes() {
            [b'q' | b't', q @ b'1'..=b'4'] => Some(PartHint::Quarter(q - b'0')),
            _ => None,
        })
}

// A bare year after the doc token ("LD 2023") says nothing about the part.
fn doc_code(stem: &str) -> Option<PartHint> {
    DOC_CODE.captures_iter(stem).find_map(|caps| {
        let code = &caps[1];
        let year_like = code.len() == 4 && matches!(code.parse::<u32>(), Ok(1900..=2100));
        (!year_like).then(|| PartHint::Code(code.to_string()))
    })
}

fn part_marker(stem: &str) -> Option<PartHint> {
    if let Some(caps) = AA_MARKER.captures(stem) {
        return Some(PartHint::Marker(format!("AA{}", &caps[1])));
    }
    PARTE_MARKER.captures(stem).and_then(|caps| {
        let n: u32 = caps[1].parse().ok()?;
        Some(PartHint::Marker(format!("parte{}", n)))
    })
}

/// Extract the part hint of a filename, if any.
pub fn extract_part_hint(filename: &str) -> Option<PartHint> {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());

    EXTRACTORS.iter().find_map(|extractor| {
        let hint = (extractor.extract)(&stem)?;
        trace!("{}: part hint {} from {}", filename, hint, extractor.name);
        Some(hint)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarter_date_range() {
        assert_eq!(
            extract_part_hint("LD 01.01.2025 a 31.03.2025.XLS"),
            Some(PartHint::DateRange {
                start: ymd(2025, 1, 1),
                end: ymd(2025, 3, 31)
            })
        );
        assert_eq!(
            extract_part_hint("Diario 01-04-2024 al 30-06-2024.xlsx"),
            Some(PartHint::DateRange {
                start: ymd(2024, 4, 1),
                end: ymd(2024, 6, 30)
            })
        );
    }

    #[test]
    fn test_invalid_dates_fall_through() {
        // 31.02 is not a date; no other extractor matches either.
        assert_eq!(extract_part_hint("LD 01.01.2025 a 31.02.2025.XLS"), None);
    }

    #[test]
    fn test_single_date_is_not_a_part() {
        assert_eq!(extract_part_hint("SYS 30.09.2025.XLS"), None);
        assert_eq!(extract_part_hint("Diario a 31.12.2017.XLS"), None);
    }

    #[test]
    fn test_quarter_labels() {
        assert_eq!(extract_part_hint("SYS Q2 2024.xls"), Some(PartHint::Quarter(2)));
        assert_eq!(extract_part_hint("LD_T4.xls"), Some(PartHint::Quarter(4)));
        assert_eq!(extract_part_hint("LD Q5.xls"), None);
    }

    #[test]
    fn test_code_after_doc_token() {
        assert_eq!(
            extract_part_hint("LD_4200 ene-mar.XLS"),
            Some(PartHint::Code("4200".to_string()))
        );
        assert_eq!(
            extract_part_hint("SYS 4201 abr-jun.XLS"),
            Some(PartHint::Code("4201".to_string()))
        );
    }

    #[test]
    fn test_year_is_not_a_code() {
        assert_eq!(extract_part_hint("LD 2023.XLS"), None);
        assert_eq!(
            extract_part_hint("LD 2023 AA01.XLS"),
            Some(PartHint::Marker("AA01".to_string()))
        );
    }

    #[test]
    fn test_part_markers() {
        assert_eq!(
            extract_part_hint("SYS AA00.XLS"),
            Some(PartHint::Marker("AA00".to_string()))
        );
        assert_eq!(
            extract_part_hint("Diario parte2.xls"),
            Some(PartHint::Marker("parte2".to_string()))
        );
        assert_eq!(
            extract_part_hint("Diario Part 3.xls"),
            Some(PartHint::Marker("parte3".to_string()))
        );
    }

    #[test]
    fn test_date_range_wins_over_code() {
        assert!(matches!(
            extract_part_hint("LD_4200 01.01.2025 a 31.03.2025.XLS"),
            Some(PartHint::DateRange { .. })
        ));
    }
}
