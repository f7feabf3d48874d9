// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::validation::validate;
use crate::{Record, ScalarKind, SheetError, TableModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddRecord,
    ModifyRecord { position: usize },
}

impl FormKind {
    pub fn title(self) -> String {
        match self {
            Self::AddRecord => "add record".to_owned(),
            Self::ModifyRecord { position } => format!("modify row {}", position + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub column: String,
    pub kind: ScalarKind,
    pub value: String,
}

/// Field-per-column editor behind the add and modify dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub cursor: usize,
}

impl RecordForm {
    pub fn blank(model: &TableModel) -> Self {
        Self {
            kind: FormKind::AddRecord,
            fields: model
                .columns()
                .iter()
                .zip(model.kinds())
                .map(|(column, kind)| FormField {
                    column: column.clone(),
                    kind: *kind,
                    value: String::new(),
                })
                .collect(),
            cursor: 0,
        }
    }

    pub fn for_row(model: &TableModel, position: usize) -> Option<Self> {
        let row = model.row(position)?;
        Some(Self {
            kind: FormKind::ModifyRecord { position },
            fields: model
                .columns()
                .iter()
                .zip(model.kinds())
                .zip(row)
                .map(|((column, kind), value)| FormField {
                    column: column.clone(),
                    kind: *kind,
                    value: value.clone(),
                })
                .collect(),
            cursor: 0,
        })
    }

    pub fn current(&self) -> Option<&FormField> {
        self.fields.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    pub fn push_char(&mut self, value: char) {
        if let Some(field) = self.fields.get_mut(self.cursor) {
            field.value.push(value);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.cursor) {
            field.value.pop();
        }
    }

    /// First field whose text does not fit its column kind, checked the same
    /// way the model checks on submit.
    pub fn first_invalid(&self) -> Option<SheetError> {
        self.fields
            .iter()
            .find(|field| !validate(field.kind, &field.value))
            .map(|field| SheetError::Validation {
                column: field.column.clone(),
                expected: field.kind,
            })
    }

    pub fn to_record(&self) -> Record {
        self.fields
            .iter()
            .map(|field| (field.column.clone(), field.value.clone()))
            .collect()
    }
}
