// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Column name to cell text, as entered in the add/modify forms.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Integer,
    Float,
    Text,
    Datetime,
}

impl ScalarKind {
    pub const ALL: [Self; 4] = [Self::Integer, Self::Float, Self::Text, Self::Datetime];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Datetime => "datetime",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "text" => Some(Self::Text),
            "datetime" => Some(Self::Datetime),
            _ => None,
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportMode {
    /// Append rows to the current sheet; columns must match exactly.
    Merge,
    /// Replace the current sheet in memory with the imported one.
    NewSheet,
}

impl ImportMode {
    pub const ALL: [Self; 2] = [Self::Merge, Self::NewSheet];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Merge => "merge into current sheet",
            Self::NewSheet => "replace as new sheet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookHandle {
    pub path: PathBuf,
    pub sheets: Vec<String>,
}

impl WorkbookHandle {
    pub fn new(path: impl Into<PathBuf>, sheets: Vec<String>) -> Self {
        Self {
            path: path.into(),
            sheets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        display_file_name(&self.path)
    }

    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|sheet| sheet == name)
    }
}

pub fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
