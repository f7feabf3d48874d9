// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{
    GridView, ImportMode, NamedSheet, Record, SheetError, SheetResult, SpreadsheetBackend,
    TableModel, WorkbookHandle, display_file_name,
};

/// One user-level request from the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Open(PathBuf),
    SelectSheet(String),
    Save,
    Import {
        path: PathBuf,
        sheet: String,
        mode: ImportMode,
    },
    Export(PathBuf),
    Add(Record),
    Delete(BTreeSet<usize>),
    Modify {
        position: usize,
        record: Record,
    },
    Sort(String),
    CellEdit {
        position: usize,
        column: String,
        text: String,
    },
    BeginEdit {
        position: usize,
        column: String,
    },
    CommitEdit(String),
    CancelEdit,
    FocusLost,
}

impl Intent {
    const fn drives_edit_session(&self) -> bool {
        matches!(
            self,
            Self::BeginEdit { .. } | Self::CommitEdit(_) | Self::CancelEdit | Self::FocusLost
        )
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Open(_) => "open",
            Self::SelectSheet(_) => "load sheet",
            Self::Save => "save",
            Self::Import { .. } => "import",
            Self::Export(_) => "export",
            Self::Add(_) => "add",
            Self::Delete(_) => "delete",
            Self::Modify { .. } => "modify",
            Self::Sort(_) => "sort",
            Self::CellEdit { .. } | Self::CommitEdit(_) | Self::FocusLost => "edit",
            Self::BeginEdit { .. } => "begin edit",
            Self::CancelEdit => "cancel edit",
        }
    }
}

/// What a handler reports back: a status line, plus the error when the
/// request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: String,
    pub error: Option<SheetError>,
}

impl Outcome {
    pub fn ok(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            error: None,
        }
    }

    pub fn failed(action: &str, error: SheetError) -> Self {
        Self {
            status: format!("{action} failed: {error}"),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Owns the single live table and its grid projection. Every handler runs
/// to completion before returning; on error the model and view are left as
/// they were.
pub struct Session<B> {
    backend: B,
    workbook: Option<WorkbookHandle>,
    model: Option<TableModel>,
    grid: GridView,
    status_line: Option<String>,
}

impl<B: SpreadsheetBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self::with_grid(backend, GridView::default())
    }

    pub fn with_grid(backend: B, grid: GridView) -> Self {
        Self {
            backend,
            workbook: None,
            model: None,
            grid,
            status_line: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn workbook(&self) -> Option<&WorkbookHandle> {
        self.workbook.as_ref()
    }

    pub fn model(&self) -> Option<&TableModel> {
        self.model.as_ref()
    }

    pub fn grid(&self) -> &GridView {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridView {
        &mut self.grid
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status_line = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_line = Some(message.into());
    }

    /// Sheet names of another workbook, for the import dialog.
    pub fn list_sheets(&self, path: &Path) -> SheetResult<Vec<String>> {
        self.backend
            .list_sheets(path)
            .map_err(|error| SheetError::load(path, &error))
    }

    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        let label = intent.label();
        let result = if intent.drives_edit_session() {
            self.apply(intent)
        } else {
            self.settle_pending_edit()
                .and_then(|()| self.apply(intent))
        };

        let outcome = match result {
            Ok(status) => {
                info!(action = label, %status, "intent applied");
                Outcome::ok(status)
            }
            Err(error) => {
                warn!(action = label, %error, "intent refused");
                Outcome::failed(label, error)
            }
        };
        self.status_line = Some(outcome.status.clone());
        outcome
    }

    fn apply(&mut self, intent: Intent) -> SheetResult<String> {
        match intent {
            Intent::Open(path) => self.open(path),
            Intent::SelectSheet(name) => self.select_sheet(&name),
            Intent::Save => self.save(),
            Intent::Import { path, sheet, mode } => self.import(&path, &sheet, mode),
            Intent::Export(path) => self.export(&path),
            Intent::Add(record) => self.add(&record),
            Intent::Delete(positions) => self.delete(&positions),
            Intent::Modify { position, record } => self.modify(position, &record),
            Intent::Sort(column) => self.sort(&column),
            Intent::CellEdit {
                position,
                column,
                text,
            } => self.edit_cell(position, &column, &text),
            Intent::BeginEdit { position, column } => self.begin_edit(position, &column),
            Intent::CommitEdit(text) => self.commit_edit(&text),
            Intent::CancelEdit => {
                self.grid.cancel_edit();
                Ok("edit cancelled".to_owned())
            }
            Intent::FocusLost => self.commit_pending(),
        }
    }

    fn settle_pending_edit(&mut self) -> SheetResult<()> {
        if !self.grid.is_editing() {
            return Ok(());
        }
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        self.grid.focus_lost(model)
    }

    fn open(&mut self, path: PathBuf) -> SheetResult<String> {
        let sheets = self
            .backend
            .list_sheets(&path)
            .map_err(|error| SheetError::load(&path, &error))?;
        let model = match sheets.first() {
            Some(first) => Some(TableModel::load(&self.backend, &path, first)?),
            None => None,
        };

        let handle = WorkbookHandle::new(path, sheets);
        let status = format!(
            "opened {} ({} sheets)",
            handle.file_name(),
            handle.sheets.len()
        );
        self.workbook = Some(handle);
        self.install(model);
        Ok(status)
    }

    fn select_sheet(&mut self, name: &str) -> SheetResult<String> {
        let handle = self.workbook.as_ref().ok_or(SheetError::NoWorkbook)?;
        if handle.sheet_index(name).is_none() {
            return Err(SheetError::Load {
                path: handle.path.clone(),
                reason: format!("sheet {name:?} not found"),
            });
        }
        let model = TableModel::load(&self.backend, &handle.path, name)?;
        let status = format!("loaded sheet {name}: {} rows", model.len());
        self.install(Some(model));
        Ok(status)
    }

    fn save(&mut self) -> SheetResult<String> {
        let (Some(handle), Some(model)) = (&self.workbook, &self.model) else {
            return Err(SheetError::NothingToSave);
        };

        let mut sheets = Vec::with_capacity(handle.sheets.len().max(1));
        for name in &handle.sheets {
            let data = if name == model.sheet() {
                model.to_sheet_data()
            } else {
                self.backend
                    .read_sheet(&handle.path, name)
                    .map_err(|error| SheetError::save(&handle.path, &error))?
            };
            sheets.push(NamedSheet {
                name: name.clone(),
                data,
            });
        }
        if handle.sheet_index(model.sheet()).is_none() {
            sheets.push(NamedSheet {
                name: model.sheet().to_owned(),
                data: model.to_sheet_data(),
            });
        }

        self.backend
            .write_sheets(&handle.path, &sheets)
            .map_err(|error| SheetError::save(&handle.path, &error))?;
        Ok(format!("saved {}", handle.file_name()))
    }

    fn import(&mut self, path: &Path, sheet: &str, mode: ImportMode) -> SheetResult<String> {
        let imported = TableModel::load(&self.backend, path, sheet)?;
        let imported_rows = imported.len();
        match mode {
            ImportMode::Merge => {
                let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
                model.merge(imported)?;
                let total = model.len();
                self.grid.refresh(model);
                Ok(format!("imported {imported_rows} rows; {total} rows total"))
            }
            ImportMode::NewSheet => {
                match self.model.as_mut() {
                    Some(model) => model.replace_with(imported),
                    None => self.model = Some(imported),
                }
                self.refresh_grid();
                Ok(format!("replaced sheet with {imported_rows} imported rows"))
            }
        }
    }

    fn export(&mut self, path: &Path) -> SheetResult<String> {
        let model = self.model.as_ref().ok_or(SheetError::NoTableLoaded)?;
        self.backend
            .write_sheet(path, model.sheet(), &model.to_sheet_data())
            .map_err(|error| SheetError::save(path, &error))?;
        Ok(format!("exported {}", display_file_name(path)))
    }

    fn add(&mut self, record: &Record) -> SheetResult<String> {
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        model.insert(record)?;
        let total = model.len();
        self.grid.refresh(model);
        Ok(format!("added 1 row; {total} rows total"))
    }

    fn delete(&mut self, positions: &BTreeSet<usize>) -> SheetResult<String> {
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        if positions.is_empty() {
            return Ok("no rows selected".to_owned());
        }
        let removed = model.delete_at(positions);
        let remaining = model.len();
        self.grid.refresh(model);
        Ok(format!("deleted {removed} rows; {remaining} remaining"))
    }

    fn modify(&mut self, position: usize, record: &Record) -> SheetResult<String> {
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        model.modify_row(position, record)?;
        self.grid.refresh(model);
        Ok(format!("modified row {}", position + 1))
    }

    fn sort(&mut self, column: &str) -> SheetResult<String> {
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        let direction = self.grid.activate_header(model, column)?;
        Ok(format!("sort {column} {}", direction.as_str()))
    }

    fn edit_cell(&mut self, position: usize, column: &str, text: &str) -> SheetResult<String> {
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        model.update_cell(position, column, text)?;
        self.grid.patch_cell(model, position, column, text);
        Ok(format!("cell updated: row {}, {column}", position + 1))
    }

    fn begin_edit(&mut self, position: usize, column: &str) -> SheetResult<String> {
        self.settle_pending_edit()?;
        let model = self.model.as_ref().ok_or(SheetError::NoTableLoaded)?;
        self.grid.begin_edit(model, position, column)?;
        Ok(format!("editing row {}, {column}", position + 1))
    }

    fn commit_edit(&mut self, text: &str) -> SheetResult<String> {
        let Some((position, column)) = self
            .grid
            .pending()
            .map(|pending| (pending.position, pending.column.clone()))
        else {
            return Ok("nothing to commit".to_owned());
        };
        let model = self.model.as_mut().ok_or(SheetError::NoTableLoaded)?;
        self.grid.commit_edit(model, text)?;
        Ok(format!("cell updated: row {}, {column}", position + 1))
    }

    fn commit_pending(&mut self) -> SheetResult<String> {
        let Some(text) = self.grid.pending().map(|pending| pending.text.clone()) else {
            return Ok("nothing to commit".to_owned());
        };
        self.commit_edit(&text)
    }

    fn install(&mut self, model: Option<TableModel>) {
        self.model = model;
        self.refresh_grid();
    }

    fn refresh_grid(&mut self) {
        match &self.model {
            Some(model) => self.grid.refresh(model),
            None => self.grid.clear(),
        }
    }
}
