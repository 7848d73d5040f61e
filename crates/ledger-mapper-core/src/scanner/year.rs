use std::ops::RangeInclusive;

pub const DEFAULT_YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;

/// Year of a year-named folder: exactly four ASCII digits inside `range`.
pub fn year_from_folder(name: &str, range: &RangeInclusive<i32>) -> Option<i32> {
    if name.len() != 4 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = name.parse().ok()?;
    range.contains(&year).then_some(year)
}
