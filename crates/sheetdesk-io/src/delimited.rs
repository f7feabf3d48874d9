// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use sheetdesk_app::{NamedSheet, SheetData};
use std::path::Path;
use tracing::debug;

use crate::infer::{RenderedCell, assemble};

/// A CSV file holds exactly one sheet, named after the file stem.
pub fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Sheet1".to_owned())
}

pub fn read(path: &Path) -> Result<SheetData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut records = reader.records();
    let Some(header) = records.next() else {
        return Ok(SheetData::default());
    };
    let header = header
        .context("read header row")?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut body = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record.with_context(|| format!("read row {}", index + 2))?;
        body.push(record.iter().map(RenderedCell::parse).collect());
    }
    let data = assemble(header, body)?;
    debug!(path = %path.display(), rows = data.row_count(), "read csv");
    Ok(data)
}

pub fn write(path: &Path, sheets: &[NamedSheet]) -> Result<()> {
    let [sheet] = sheets else {
        bail!(
            "a csv file holds one sheet, got {}; save as .xlsx to keep every sheet",
            sheets.len()
        );
    };
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    writer
        .write_record(&sheet.data.columns)
        .context("write header row")?;
    for row in &sheet.data.rows {
        writer.write_record(row).context("write row")?;
    }
    writer.flush().context("flush csv")?;
    debug!(path = %path.display(), rows = sheet.data.row_count(), "wrote csv");
    Ok(())
}
