// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod delimited;
mod excel;
pub mod infer;

use anyhow::{Result, bail};
use sheetdesk_app::{NamedSheet, SheetData, SpreadsheetBackend};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    /// Read-only workbook formats: xlsm, xlsb, xls, ods.
    Workbook,
    Csv,
}

impl FileFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            "" => bail!(
                "{} has no file extension; use .xlsx, .xls, .ods, or .csv",
                path.display()
            ),
            other => bail!(
                "unsupported file type .{other}; use .xlsx, .xls, .ods, or .csv"
            ),
        }
    }
}

/// Spreadsheet collaborator over files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBackend;

impl FileBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SpreadsheetBackend for FileBackend {
    fn list_sheets(&self, path: &Path) -> Result<Vec<String>> {
        match FileFormat::detect(path)? {
            FileFormat::Xlsx | FileFormat::Workbook => excel::list_sheets(path),
            FileFormat::Csv => {
                if !path.is_file() {
                    bail!("{} does not exist", path.display());
                }
                Ok(vec![delimited::sheet_name(path)])
            }
        }
    }

    fn read_sheet(&self, path: &Path, name: &str) -> Result<SheetData> {
        match FileFormat::detect(path)? {
            FileFormat::Xlsx | FileFormat::Workbook => excel::read_sheet(path, name),
            FileFormat::Csv => {
                let expected = delimited::sheet_name(path);
                if name != expected {
                    bail!("sheet {name:?} not found; a csv file has only {expected:?}");
                }
                delimited::read(path)
            }
        }
    }

    fn write_sheets(&self, path: &Path, sheets: &[NamedSheet]) -> Result<()> {
        match FileFormat::detect(path)? {
            FileFormat::Xlsx => excel::write_xlsx(path, sheets),
            FileFormat::Csv => delimited::write(path, sheets),
            FileFormat::Workbook => bail!(
                "cannot write {}; only .xlsx and .csv can be written, save as .xlsx instead",
                path.display()
            ),
        }
    }
}
