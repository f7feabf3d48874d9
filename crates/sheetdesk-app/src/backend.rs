// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::Path;

use crate::ScalarKind;

/// One sheet as exchanged with the spreadsheet collaborator: header names,
/// the inferred kind per column, and every row rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetData {
    pub columns: Vec<String>,
    pub kinds: Vec<ScalarKind>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSheet {
    pub name: String,
    pub data: SheetData,
}

pub trait SpreadsheetBackend {
    fn list_sheets(&self, path: &Path) -> Result<Vec<String>>;
    fn read_sheet(&self, path: &Path, name: &str) -> Result<SheetData>;
    /// Writes a complete workbook, replacing whatever is at `path`.
    fn write_sheets(&self, path: &Path, sheets: &[NamedSheet]) -> Result<()>;

    fn write_sheet(&self, path: &Path, name: &str, data: &SheetData) -> Result<()> {
        self.write_sheets(
            path,
            &[NamedSheet {
                name: name.to_owned(),
                data: data.clone(),
            }],
        )
    }
}

impl<T: SpreadsheetBackend + ?Sized> SpreadsheetBackend for &T {
    fn list_sheets(&self, path: &Path) -> Result<Vec<String>> {
        (**self).list_sheets(path)
    }

    fn read_sheet(&self, path: &Path, name: &str) -> Result<SheetData> {
        (**self).read_sheet(path, name)
    }

    fn write_sheets(&self, path: &Path, sheets: &[NamedSheet]) -> Result<()> {
        (**self).write_sheets(path, sheets)
    }
}
