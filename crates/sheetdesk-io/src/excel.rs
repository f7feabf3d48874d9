// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use sheetdesk_app::validation::{is_blank, parse_datetime, parse_number};
use sheetdesk_app::{NamedSheet, ScalarKind, SheetData};
use std::path::Path;
use tracing::debug;

use crate::infer::{RenderedCell, assemble, datetime_to_serial, serial_to_datetime};

const DATETIME_NUMBER_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const MAX_WRITTEN_WIDTH: usize = 60;

pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path)
        .with_context(|| format!("open workbook {}", path.display()))?;
    Ok(workbook.sheet_names().to_vec())
}

pub fn read_sheet(path: &Path, name: &str) -> Result<SheetData> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("open workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range(name)
        .with_context(|| format!("read sheet {name:?}"))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        debug!(path = %path.display(), sheet = name, "sheet is empty");
        return Ok(SheetData::default());
    };
    let header = header.iter().map(|cell| render(cell).text).collect();
    let body = rows
        .map(|row| row.iter().map(render).collect())
        .collect();
    let data = assemble(header, body).with_context(|| format!("sheet {name:?}"))?;
    debug!(
        path = %path.display(),
        sheet = name,
        rows = data.row_count(),
        columns = data.columns.len(),
        "read sheet"
    );
    Ok(data)
}

fn render(cell: &Data) -> RenderedCell {
    match cell {
        Data::Empty => RenderedCell::blank(),
        Data::String(text) => RenderedCell::text(text.as_str()),
        Data::Float(value) => RenderedCell::number(*value),
        Data::Int(value) => RenderedCell::integer(*value),
        Data::Bool(value) => RenderedCell::text(boolean_text(*value)),
        Data::Error(error) => RenderedCell::text(error.to_string()),
        Data::DateTime(value) => match serial_to_datetime(value.as_f64()) {
            Some(moment) => RenderedCell::moment(moment),
            None => RenderedCell::number(value.as_f64()),
        },
        Data::DateTimeIso(text) => match parse_datetime(text) {
            Some(moment) => RenderedCell::moment(moment),
            None => RenderedCell::text(text.as_str()),
        },
        Data::DurationIso(text) => RenderedCell::text(text.as_str()),
    }
}

fn boolean_text(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Exact `TRUE`/`FALSE`, the way boolean cells read back.
fn boolean_literal(text: &str) -> Option<bool> {
    match text {
        "TRUE" => Some(true),
        "FALSE" => Some(false),
        _ => None,
    }
}

/// Writes every sheet to a fresh `.xlsx` workbook with a bold header row.
pub fn write_xlsx(path: &Path, sheets: &[NamedSheet]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_NUMBER_FORMAT);

    for sheet in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .with_context(|| format!("name sheet {:?}", sheet.name))?;
        write_sheet(worksheet, &sheet.data, &header_format, &datetime_format)
            .with_context(|| format!("write sheet {:?}", sheet.name))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    debug!(path = %path.display(), sheets = sheets.len(), "wrote workbook");
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    data: &SheetData,
    header_format: &Format,
    datetime_format: &Format,
) -> Result<()> {
    for (column, name) in data.columns.iter().enumerate() {
        let col = u16::try_from(column).context("too many columns for xlsx")?;
        worksheet.write_string_with_format(0, col, name, header_format)?;

        let widest = data
            .rows
            .iter()
            .map(|row| row[column].chars().count())
            .chain(std::iter::once(name.chars().count()))
            .max()
            .unwrap_or(0);
        worksheet.set_column_width(col, ((widest + 2).min(MAX_WRITTEN_WIDTH)) as f64)?;
    }

    for (index, row) in data.rows.iter().enumerate() {
        let xlsx_row = u32::try_from(index + 1).context("too many rows for xlsx")?;
        for (column, text) in row.iter().enumerate() {
            if is_blank(text) {
                continue;
            }
            let col = u16::try_from(column).context("too many columns for xlsx")?;
            let kind = data.kinds.get(column).copied().unwrap_or(ScalarKind::Text);
            match kind {
                ScalarKind::Integer | ScalarKind::Float => {
                    if let Some(number) = parse_number(text) {
                        worksheet.write_number(xlsx_row, col, number)?;
                        continue;
                    }
                }
                ScalarKind::Datetime => {
                    if let Some(moment) = parse_datetime(text) {
                        worksheet.write_number_with_format(
                            xlsx_row,
                            col,
                            datetime_to_serial(moment),
                            datetime_format,
                        )?;
                        continue;
                    }
                }
                ScalarKind::Text => {
                    if let Some(value) = boolean_literal(text) {
                        worksheet.write_boolean(xlsx_row, col, value)?;
                        continue;
                    }
                }
            }
            worksheet.write_string(xlsx_row, col, text)?;
        }
    }
    Ok(())
}
