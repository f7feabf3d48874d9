// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, bail};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::validation::{compare_cells, validate};
use crate::{
    Record, ScalarKind, SheetData, SheetError, SheetResult, SortDirection, SpreadsheetBackend,
};

/// One loaded sheet. Rows are stored positionally, aligned with `columns`;
/// a row's identity is its index and changes on every delete or sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    sheet: String,
    columns: Vec<String>,
    kinds: Vec<ScalarKind>,
    rows: Vec<Vec<String>>,
}

impl TableModel {
    pub fn load<B: SpreadsheetBackend + ?Sized>(
        backend: &B,
        path: &Path,
        sheet: &str,
    ) -> SheetResult<Self> {
        backend
            .read_sheet(path, sheet)
            .with_context(|| format!("read sheet {sheet:?}"))
            .and_then(|data| Self::from_sheet(sheet, data))
            .map_err(|error| SheetError::load(path, &error))
    }

    pub fn from_sheet(name: impl Into<String>, data: SheetData) -> anyhow::Result<Self> {
        let SheetData {
            columns,
            kinds,
            rows,
        } = data;

        if kinds.len() != columns.len() {
            bail!(
                "sheet reports {} column kinds for {} columns",
                kinds.len(),
                columns.len()
            );
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                bail!("duplicate column name {column:?}");
            }
        }
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            bail!(
                "row {} has {} cells, expected {}",
                index + 1,
                row.len(),
                columns.len()
            );
        }

        Ok(Self {
            sheet: name.into(),
            columns,
            kinds,
            rows,
        })
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn kinds(&self) -> &[ScalarKind] {
        &self.kinds
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn kind_of(&self, column: &str) -> Option<ScalarKind> {
        self.column_index(column).map(|index| self.kinds[index])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> Option<&[String]> {
        self.rows.get(position).map(Vec::as_slice)
    }

    pub fn value(&self, position: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(position).map(|row| row[index].as_str())
    }

    pub fn record(&self, position: usize) -> Option<Record> {
        let row = self.rows.get(position)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    pub fn validate_field(&self, column: &str, text: &str) -> SheetResult<()> {
        let kind = self
            .kind_of(column)
            .ok_or_else(|| SheetError::UnknownColumn(column.to_owned()))?;
        if validate(kind, text) {
            Ok(())
        } else {
            Err(SheetError::Validation {
                column: column.to_owned(),
                expected: kind,
            })
        }
    }

    /// Appends a row. Columns missing from `record` are stored blank. Nothing
    /// is written unless every field validates.
    pub fn insert(&mut self, record: &Record) -> SheetResult<()> {
        self.reject_unknown_columns(record)?;
        let mut row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let text = record.get(column).map(String::as_str).unwrap_or("");
            self.validate_field(column, text)?;
            row.push(text.to_owned());
        }
        self.rows.push(row);
        Ok(())
    }

    /// Removes the rows at `positions`, ignoring any that do not exist, and
    /// returns how many were removed.
    pub fn delete_at(&mut self, positions: &BTreeSet<usize>) -> usize {
        if positions.is_empty() {
            return 0;
        }
        let before = self.rows.len();
        let mut index = 0usize;
        self.rows.retain(|_| {
            let keep = !positions.contains(&index);
            index += 1;
            keep
        });
        before - self.rows.len()
    }

    pub fn update_cell(&mut self, position: usize, column: &str, text: &str) -> SheetResult<()> {
        let len = self.rows.len();
        let index = self
            .column_index(column)
            .ok_or_else(|| SheetError::UnknownColumn(column.to_owned()))?;
        if position >= len {
            return Err(SheetError::RowOutOfRange { position, len });
        }
        self.validate_field(column, text)?;
        self.rows[position][index] = text.to_owned();
        Ok(())
    }

    /// Rewrites the supplied fields of one row. Fields absent from `record`
    /// keep their value; nothing is written unless every field validates.
    pub fn modify_row(&mut self, position: usize, record: &Record) -> SheetResult<()> {
        let len = self.rows.len();
        if position >= len {
            return Err(SheetError::RowOutOfRange { position, len });
        }
        self.reject_unknown_columns(record)?;
        for (column, text) in record {
            self.validate_field(column, text)?;
        }
        for (column, text) in record {
            if let Some(index) = self.column_index(column) {
                self.rows[position][index] = text.clone();
            }
        }
        Ok(())
    }

    pub fn sort_by(&mut self, column: &str, direction: SortDirection) -> SheetResult<()> {
        let index = self
            .column_index(column)
            .ok_or_else(|| SheetError::UnknownColumn(column.to_owned()))?;
        let kind = self.kinds[index];
        match direction {
            SortDirection::Asc => self
                .rows
                .sort_by(|left, right| compare_cells(kind, &left[index], &right[index])),
            SortDirection::Desc => self
                .rows
                .sort_by(|left, right| compare_cells(kind, &right[index], &left[index])),
        }
        Ok(())
    }

    /// Appends every row of `other`, which must have exactly the same column
    /// names in the same order. Returns the number of rows appended.
    pub fn merge(&mut self, other: TableModel) -> SheetResult<usize> {
        if other.columns != self.columns {
            return Err(SheetError::SchemaMismatch {
                expected: self.columns.clone(),
                found: other.columns,
            });
        }
        let appended = other.rows.len();
        self.rows.extend(other.rows);
        Ok(appended)
    }

    /// Swaps in another table's columns and rows wholesale, keeping this
    /// table's sheet name.
    pub fn replace_with(&mut self, other: TableModel) {
        self.columns = other.columns;
        self.kinds = other.kinds;
        self.rows = other.rows;
    }

    pub fn to_sheet_data(&self) -> SheetData {
        SheetData {
            columns: self.columns.clone(),
            kinds: self.kinds.clone(),
            rows: self.rows.clone(),
        }
    }

    fn reject_unknown_columns(&self, record: &Record) -> SheetResult<()> {
        match record.keys().find(|key| self.column_index(key).is_none()) {
            Some(unknown) => Err(SheetError::UnknownColumn(unknown.clone())),
            None => Ok(()),
        }
    }
}
