// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::ScalarKind;

pub const DATETIME_LAYOUT: &str = "YYYY-MM-DD HH:MM:SS";

const DATETIME_LAYOUTS: [&[BorrowedFormatItem<'static>]; 8] = [
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!(
        "[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute]:[second]"
    ),
    format_description!(
        "[month padding:none]/[day padding:none]/[year] [hour padding:none]:[minute]:[second]"
    ),
];

const DATE_LAYOUTS: [&[BorrowedFormatItem<'static>]; 3] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
];

/// Blank cells represent a null and are valid in every column.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Checks `text` against a column's declared kind without coercing it.
pub fn validate(kind: ScalarKind, text: &str) -> bool {
    if is_blank(text) {
        return true;
    }
    match kind {
        ScalarKind::Integer | ScalarKind::Float => parse_number(text).is_some(),
        ScalarKind::Datetime => parse_datetime(text).is_some(),
        ScalarKind::Text => true,
    }
}

/// Integer columns accept any real number. The text is stored as typed.
/// `NaN` and infinities are not real numbers.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

pub fn parse_datetime(text: &str) -> Option<PrimitiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for layout in DATETIME_LAYOUTS {
        if let Ok(value) = PrimitiveDateTime::parse(trimmed, layout) {
            return Some(value);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = Date::parse(trimmed, layout) {
            return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT));
        }
    }

    OffsetDateTime::parse(trimmed, &Rfc3339).ok().map(|value| {
        let utc = value.to_offset(UtcOffset::UTC);
        PrimitiveDateTime::new(utc.date(), utc.time())
    })
}

pub fn format_datetime(value: PrimitiveDateTime) -> String {
    value
        .format(&format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .expect("datetime format is valid")
}

/// Orders two cell texts under a column kind: blanks first, then parsed
/// values, then unparseable leftovers compared as text.
pub fn compare_cells(kind: ScalarKind, left: &str, right: &str) -> Ordering {
    sort_key(kind, left).cmp(&sort_key(kind, right))
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey<'a> {
    Blank,
    Number(TotalF64),
    Moment(PrimitiveDateTime),
    Text(&'a str),
}

impl Eq for SortKey<'_> {}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

#[derive(Debug, Clone, Copy)]
struct TotalF64(f64);

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.total_cmp(&other.0))
    }
}

fn sort_key(kind: ScalarKind, text: &str) -> SortKey<'_> {
    if is_blank(text) {
        return SortKey::Blank;
    }
    let parsed = match kind {
        ScalarKind::Integer | ScalarKind::Float => parse_number(text).map(|n| SortKey::Number(TotalF64(n))),
        ScalarKind::Datetime => parse_datetime(text).map(SortKey::Moment),
        ScalarKind::Text => None,
    };
    parsed.unwrap_or(SortKey::Text(text))
}
