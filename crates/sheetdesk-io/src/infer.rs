// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use sheetdesk_app::validation::{format_datetime, is_blank, parse_datetime, parse_number};
use sheetdesk_app::{ScalarKind, SheetData};
use std::collections::HashSet;
use time::macros::datetime;
use time::{Duration, PrimitiveDateTime};

/// What a single source cell looks like once rendered, before the column's
/// kind is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Blank,
    Integer,
    Float,
    Datetime,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub text: String,
    pub class: CellClass,
}

impl RenderedCell {
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            class: CellClass::Blank,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        let text = value.into();
        if is_blank(&text) {
            return Self::blank();
        }
        Self {
            text,
            class: CellClass::Text,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            text: value.to_string(),
            class: CellClass::Integer,
        }
    }

    pub fn number(value: f64) -> Self {
        let class = if value.fract() == 0.0 {
            CellClass::Integer
        } else {
            CellClass::Float
        };
        Self {
            text: value.to_string(),
            class,
        }
    }

    pub fn moment(value: PrimitiveDateTime) -> Self {
        Self {
            text: format_datetime(value),
            class: CellClass::Datetime,
        }
    }

    /// Classifies free text, as found in CSV files.
    pub fn parse(value: &str) -> Self {
        if is_blank(value) {
            return Self::blank();
        }
        let class = if let Some(number) = parse_number(value) {
            if number.fract() == 0.0 {
                CellClass::Integer
            } else {
                CellClass::Float
            }
        } else if parse_datetime(value).is_some() {
            CellClass::Datetime
        } else {
            CellClass::Text
        };
        Self {
            text: value.to_owned(),
            class,
        }
    }
}

pub fn infer_kind(cells: impl IntoIterator<Item = CellClass>) -> ScalarKind {
    let mut kind: Option<ScalarKind> = None;
    for class in cells {
        let next = match class {
            CellClass::Blank => continue,
            CellClass::Integer => ScalarKind::Integer,
            CellClass::Float => ScalarKind::Float,
            CellClass::Datetime => ScalarKind::Datetime,
            CellClass::Text => return ScalarKind::Text,
        };
        kind = Some(match (kind, next) {
            (None, next) => next,
            (Some(current), next) if current == next => current,
            (Some(current), next) if current.is_numeric() && next.is_numeric() => {
                ScalarKind::Float
            }
            _ => return ScalarKind::Text,
        });
    }
    kind.unwrap_or(ScalarKind::Text)
}

/// Blank headers become `Unnamed: N` and repeats get a `.1`, `.2` suffix so
/// every column name is unique.
pub fn normalize_headers(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut used = HashSet::new();
    let mut headers = Vec::new();
    for (index, name) in raw.into_iter().enumerate() {
        let base = if is_blank(&name) {
            format!("Unnamed: {index}")
        } else {
            name.trim().to_owned()
        };
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while used.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        used.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}

/// Builds a sheet from a header row and rendered body rows: pads short
/// rows, drops trailing empty rows, and infers a kind per column.
pub fn assemble(
    header: Vec<String>,
    mut body: Vec<Vec<RenderedCell>>,
) -> anyhow::Result<SheetData> {
    let columns = normalize_headers(header);
    let width = columns.len();

    while body
        .last()
        .is_some_and(|row| row.iter().all(|cell| cell.class == CellClass::Blank))
    {
        body.pop();
    }
    for (index, row) in body.iter_mut().enumerate() {
        if row.len() > width {
            if row[width..].iter().all(|cell| cell.class == CellClass::Blank) {
                row.truncate(width);
            } else {
                anyhow::bail!(
                    "row {} has {} cells but the header has {width}",
                    index + 2,
                    row.len()
                );
            }
        }
        row.resize_with(width, RenderedCell::blank);
    }

    let kinds = (0..width)
        .map(|column| infer_kind(body.iter().map(|row| row[column].class)))
        .collect();
    let rows = body
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell.text).collect())
        .collect();
    Ok(SheetData {
        columns,
        kinds,
        rows,
    })
}

const EXCEL_EPOCH: PrimitiveDateTime = datetime!(1899-12-30 0:00);

/// Serials below 61 predate Excel's phantom 1900-02-29 and sit one day later.
const LEAP_BUG_SERIAL: f64 = 61.0;

pub fn serial_to_datetime(serial: f64) -> Option<PrimitiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let adjusted = if serial < LEAP_BUG_SERIAL {
        serial + 1.0
    } else {
        serial
    };
    let seconds = (adjusted * 86_400.0).round();
    if seconds > i64::MAX as f64 {
        return None;
    }
    EXCEL_EPOCH.checked_add(Duration::seconds(seconds as i64))
}

pub fn datetime_to_serial(value: PrimitiveDateTime) -> f64 {
    let elapsed = value - EXCEL_EPOCH;
    let serial = elapsed.as_seconds_f64() / 86_400.0;
    if serial < LEAP_BUG_SERIAL {
        serial - 1.0
    } else {
        serial
    }
}
