// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::PathBuf;
use thiserror::Error;

use crate::ScalarKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
    #[error("column {column:?} expects {expected} values")]
    Validation {
        column: String,
        expected: ScalarKind,
    },
    #[error(
        "imported columns [{}] do not match current columns [{}]",
        .found.join(", "),
        .expected.join(", ")
    )]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("save {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error("row {} is out of range ({len} rows)", .position + 1)]
    RowOutOfRange { position: usize, len: usize },
    #[error("no workbook is open; open a file first")]
    NoWorkbook,
    #[error("no sheet is loaded; open a file first")]
    NoTableLoaded,
    #[error("nothing to save; open a file first")]
    NothingToSave,
}

impl SheetError {
    pub fn load(path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        Self::Load {
            path: path.into(),
            reason: format!("{error:#}"),
        }
    }

    pub fn save(path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        Self::Save {
            path: path.into(),
            reason: format!("{error:#}"),
        }
    }
}

pub type SheetResult<T> = std::result::Result<T, SheetError>;

#[cfg(test)]
mod tests {
    use super::SheetError;
    use crate::ScalarKind;
    use anyhow::{Context, anyhow};

    #[test]
    fn validation_message_names_column_and_kind() {
        let error = SheetError::Validation {
            column: "Age".to_owned(),
            expected: ScalarKind::Integer,
        };
        assert_eq!(error.to_string(), "column \"Age\" expects integer values");
    }

    #[test]
    fn load_keeps_full_context_chain() {
        let source = Err::<(), _>(anyhow!("zip header missing"))
            .context("open workbook")
            .expect_err("error expected");
        let error = SheetError::load("/tmp/broken.xlsx", &source);
        let message = error.to_string();
        assert!(message.contains("/tmp/broken.xlsx"), "got {message}");
        assert!(message.contains("open workbook: zip header missing"), "got {message}");
    }

    #[test]
    fn row_out_of_range_reports_one_based_row() {
        let error = SheetError::RowOutOfRange {
            position: 4,
            len: 2,
        };
        assert_eq!(error.to_string(), "row 5 is out of range (2 rows)");
    }
}
