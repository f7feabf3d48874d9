// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use sheetdesk_app::{NamedSheet, ScalarKind, SheetData, SpreadsheetBackend};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];

const CITIES: [&str; 10] = [
    "Austin", "Seattle", "Denver", "Madison", "Raleigh", "Portland", "Tucson", "Boise", "Omaha",
    "Richmond",
];

const REFERENCE_YEAR: i32 = 2026;

/// The two-row sheet most scenarios start from.
pub fn people_sheet() -> SheetData {
    SheetData {
        columns: vec!["Name".to_owned(), "Age".to_owned()],
        kinds: vec![ScalarKind::Text, ScalarKind::Integer],
        rows: vec![
            vec!["Ann".to_owned(), "30".to_owned()],
            vec!["Bo".to_owned(), "25".to_owned()],
        ],
    }
}

pub fn named(name: &str, data: SheetData) -> NamedSheet {
    NamedSheet {
        name: name.to_owned(),
        data,
    }
}

pub fn temp_workbook_path(file_name: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join(file_name);
    Ok((dir, path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19 12:34:56"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    List,
    Read,
    Write,
}

/// In-memory workbook store keyed by path. Writes replace the whole
/// workbook, like the file backend does.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    workbooks: RefCell<HashMap<PathBuf, Vec<NamedSheet>>>,
    failure: Cell<Option<Failure>>,
    writes: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workbook(path: impl Into<PathBuf>, sheets: Vec<NamedSheet>) -> Self {
        let backend = Self::new();
        backend.put(path, sheets);
        backend
    }

    pub fn put(&self, path: impl Into<PathBuf>, sheets: Vec<NamedSheet>) {
        self.workbooks.borrow_mut().insert(path.into(), sheets);
    }

    pub fn workbook(&self, path: &Path) -> Option<Vec<NamedSheet>> {
        self.workbooks.borrow().get(path).cloned()
    }

    pub fn sheet(&self, path: &Path, name: &str) -> Option<SheetData> {
        self.workbooks
            .borrow()
            .get(path)?
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| sheet.data.clone())
    }

    /// Makes every later call of the given kind fail until cleared.
    pub fn fail_on(&self, failure: Option<Failure>) {
        self.failure.set(failure);
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn check(&self, failure: Failure, path: &Path) -> Result<()> {
        if self.failure.get() == Some(failure) {
            bail!("injected {failure:?} failure for {}", path.display());
        }
        Ok(())
    }
}

impl SpreadsheetBackend for MemoryBackend {
    fn list_sheets(&self, path: &Path) -> Result<Vec<String>> {
        self.check(Failure::List, path)?;
        let workbooks = self.workbooks.borrow();
        let sheets = workbooks
            .get(path)
            .ok_or_else(|| anyhow!("no workbook at {}", path.display()))?;
        Ok(sheets.iter().map(|sheet| sheet.name.clone()).collect())
    }

    fn read_sheet(&self, path: &Path, name: &str) -> Result<SheetData> {
        self.check(Failure::Read, path)?;
        let workbooks = self.workbooks.borrow();
        let sheets = workbooks
            .get(path)
            .ok_or_else(|| anyhow!("no workbook at {}", path.display()))?;
        sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| sheet.data.clone())
            .ok_or_else(|| anyhow!("sheet {name:?} not found"))
    }

    fn write_sheets(&self, path: &Path, sheets: &[NamedSheet]) -> Result<()> {
        self.check(Failure::Write, path)?;
        self.put(path, sheets.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for wider sheets covering every column kind.
#[derive(Debug, Clone)]
pub struct SheetFaker {
    rng: DeterministicRng,
}

impl SheetFaker {
    pub const COLUMNS: [&'static str; 5] = ["Name", "City", "Age", "Score", "Joined"];
    pub const KINDS: [ScalarKind; 5] = [
        ScalarKind::Text,
        ScalarKind::Text,
        ScalarKind::Integer,
        ScalarKind::Float,
        ScalarKind::Datetime,
    ];

    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn row(&mut self) -> Vec<String> {
        let name = self.pick(&FIRST_NAMES).to_owned();
        let city = self.pick(&CITIES).to_owned();
        let age = 18 + self.rng.int_n(60);
        let score = format!("{}.{}", self.rng.int_n(100), 1 + self.rng.int_n(9));
        vec![name, city, age.to_string(), score, self.joined()]
    }

    /// Rows may carry a blank Age so sorting has blanks to order.
    pub fn sheet(&mut self, rows: usize) -> SheetData {
        let rows = (0..rows)
            .map(|_| {
                let mut row = self.row();
                if self.rng.int_n(8) == 0 {
                    row[2].clear();
                }
                row
            })
            .collect();
        SheetData {
            columns: Self::COLUMNS.iter().map(|name| (*name).to_owned()).collect(),
            kinds: Self::KINDS.to_vec(),
            rows,
        }
    }

    fn joined(&mut self) -> String {
        let start = reference_start();
        let moment = start
            + Duration::days(self.rng.int_n(365) as i64)
            + Duration::minutes(self.rng.int_n(24 * 60) as i64);
        let date_only = self.rng.bool();
        let (year, month, day) = (moment.year(), u8::from(moment.month()), moment.day());
        if date_only {
            format!("{year:04}-{month:02}-{day:02}")
        } else {
            format!(
                "{year:04}-{month:02}-{day:02} {:02}:{:02}:00",
                moment.hour(),
                moment.minute()
            )
        }
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

fn reference_start() -> PrimitiveDateTime {
    let date = Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1)
        .expect("valid calendar date");
    PrimitiveDateTime::new(date, Time::MIDNIGHT)
}

#[cfg(test)]
mod tests {
    use super::{Failure, MemoryBackend, SheetFaker, named, people_sheet};
    use sheetdesk_app::SpreadsheetBackend;
    use std::path::Path;

    #[test]
    fn faker_is_deterministic_per_seed() {
        let mut left = SheetFaker::new(42);
        let mut right = SheetFaker::new(42);
        assert_eq!(left.sheet(20), right.sheet(20));
    }

    #[test]
    fn faker_rows_match_columns() {
        let mut faker = SheetFaker::new(7);
        let sheet = faker.sheet(50);
        assert_eq!(sheet.columns.len(), sheet.kinds.len());
        for row in &sheet.rows {
            assert_eq!(row.len(), sheet.columns.len());
            assert!(!row[0].is_empty());
            assert!(row[4].starts_with("2026-") || row[4].starts_with("2027-"));
        }
    }

    #[test]
    fn memory_backend_round_trips_and_counts_writes() -> anyhow::Result<()> {
        let path = Path::new("/tmp/people.xlsx");
        let backend = MemoryBackend::with_workbook(path, vec![named("People", people_sheet())]);
        assert_eq!(backend.list_sheets(path)?, vec!["People".to_owned()]);
        assert_eq!(backend.read_sheet(path, "People")?, people_sheet());
        assert!(backend.read_sheet(path, "Nope").is_err());

        backend.write_sheet(path, "Copy", &people_sheet())?;
        assert_eq!(backend.write_count(), 1);
        assert_eq!(backend.list_sheets(path)?, vec!["Copy".to_owned()]);
        Ok(())
    }

    #[test]
    fn injected_failures_hit_only_their_call() {
        let path = Path::new("/tmp/people.xlsx");
        let backend = MemoryBackend::with_workbook(path, vec![named("People", people_sheet())]);
        backend.fail_on(Some(Failure::Write));
        assert!(backend.list_sheets(path).is_ok());
        assert!(backend.write_sheet(path, "People", &people_sheet()).is_err());
        backend.fail_on(None);
        assert!(backend.write_sheet(path, "People", &people_sheet()).is_ok());
    }
}
