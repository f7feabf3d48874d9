// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{SheetError, SheetResult, SortDirection, TableModel};

pub const MIN_COLUMN_WIDTH: usize = 8;
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;
const COLUMN_PADDING: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub name: String,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub position: usize,
    pub column: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing(PendingEdit),
}

/// Display projection of the live [`TableModel`]. It holds rendered text
/// only and is rebuilt after every structural mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    columns: Vec<GridColumn>,
    rows: Vec<Vec<String>>,
    sort: Option<SortState>,
    edit: EditSession,
    max_column_width: usize,
}

impl Default for GridView {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COLUMN_WIDTH)
    }
}

impl GridView {
    pub fn new(max_column_width: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            sort: None,
            edit: EditSession::Idle,
            max_column_width: max_column_width.max(MIN_COLUMN_WIDTH),
        }
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, position: usize, column_index: usize) -> Option<&str> {
        self.rows
            .get(position)
            .and_then(|row| row.get(column_index))
            .map(String::as_str)
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.edit, EditSession::Editing(_))
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        match &self.edit {
            EditSession::Editing(pending) => Some(pending),
            EditSession::Idle => None,
        }
    }

    pub fn edit_input_mut(&mut self) -> Option<&mut String> {
        match &mut self.edit {
            EditSession::Editing(pending) => Some(&mut pending.text),
            EditSession::Idle => None,
        }
    }

    /// Full rebuild from the model. Drops the sort indicator and any pending
    /// edit.
    pub fn refresh(&mut self, model: &TableModel) {
        self.rows = model.rows().to_vec();
        self.columns = model
            .columns()
            .iter()
            .enumerate()
            .map(|(index, name)| GridColumn {
                name: name.clone(),
                width: self.column_width(name, self.rows.iter().map(|row| row[index].as_str())),
            })
            .collect();
        self.sort = None;
        self.edit = EditSession::Idle;
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.sort = None;
        self.edit = EditSession::Idle;
    }

    pub fn header_label(&self, column_index: usize) -> Option<String> {
        let column = self.columns.get(column_index)?;
        let mut label = column.name.clone();
        if let Some(sort) = &self.sort
            && sort.column == column.name
        {
            label.push(' ');
            label.push_str(sort.direction.arrow());
        }
        Some(label)
    }

    /// Header activation: the same column flips direction, any other column
    /// starts ascending.
    pub fn activate_header(
        &mut self,
        model: &mut TableModel,
        column: &str,
    ) -> SheetResult<SortDirection> {
        let direction = match &self.sort {
            Some(sort) if sort.column == column => sort.direction.flipped(),
            _ => SortDirection::Asc,
        };
        model.sort_by(column, direction)?;
        self.refresh(model);
        self.sort = Some(SortState {
            column: column.to_owned(),
            direction,
        });
        Ok(direction)
    }

    pub fn begin_edit(
        &mut self,
        model: &TableModel,
        position: usize,
        column: &str,
    ) -> SheetResult<()> {
        let current = model.value(position, column).ok_or_else(|| {
            if model.column_index(column).is_none() {
                SheetError::UnknownColumn(column.to_owned())
            } else {
                SheetError::RowOutOfRange {
                    position,
                    len: model.len(),
                }
            }
        })?;
        self.edit = EditSession::Editing(PendingEdit {
            position,
            column: column.to_owned(),
            text: current.to_owned(),
        });
        Ok(())
    }

    /// Commits `text` into the model. On failure the session stays in
    /// editing with `text` retained.
    pub fn commit_edit(&mut self, model: &mut TableModel, text: &str) -> SheetResult<()> {
        let EditSession::Editing(pending) = &mut self.edit else {
            return Ok(());
        };
        pending.text = text.to_owned();
        let position = pending.position;
        let column = pending.column.clone();

        model.update_cell(position, &column, text)?;
        self.edit = EditSession::Idle;
        self.patch_cell(model, position, &column, text);
        Ok(())
    }

    pub fn commit_pending(&mut self, model: &mut TableModel) -> SheetResult<()> {
        let Some(text) = self.pending().map(|pending| pending.text.clone()) else {
            return Ok(());
        };
        self.commit_edit(model, &text)
    }

    /// Losing focus commits rather than cancels.
    pub fn focus_lost(&mut self, model: &mut TableModel) -> SheetResult<()> {
        self.commit_pending(model)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditSession::Idle;
    }

    /// Updates one displayed cell after a successful edit, widening its column
    /// if the new text needs it.
    pub fn patch_cell(&mut self, model: &TableModel, position: usize, column: &str, text: &str) {
        let Some(index) = model.column_index(column) else {
            return;
        };
        if let Some(cell) = self.rows.get_mut(position).and_then(|row| row.get_mut(index)) {
            *cell = text.to_owned();
        }
        let wanted = self.clamp_width(text.chars().count() + COLUMN_PADDING);
        if let Some(grid_column) = self.columns.get_mut(index)
            && grid_column.width < wanted
        {
            grid_column.width = wanted;
        }
    }

    fn column_width<'a>(&self, header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
        let widest = cells
            .map(|cell| cell.chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        self.clamp_width(widest + COLUMN_PADDING)
    }

    fn clamp_width(&self, width: usize) -> usize {
        width.clamp(MIN_COLUMN_WIDTH, self.max_column_width)
    }
}
