// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use sheetdesk_app::{
    ImportMode, Intent, Record, ScalarKind, Session, SheetData, SheetError, SortDirection,
};
use sheetdesk_testkit::{Failure, MemoryBackend, SheetFaker, named, people_sheet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const PEOPLE: &str = "/work/people.xlsx";
const EXTRA: &str = "/work/extra.xlsx";

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(column, text)| ((*column).to_owned(), (*text).to_owned()))
        .collect()
}

fn names<B: sheetdesk_app::SpreadsheetBackend>(session: &Session<B>) -> Vec<String> {
    session
        .model()
        .map(|model| model.rows().iter().map(|row| row[0].clone()).collect())
        .unwrap_or_default()
}

fn notes_sheet() -> SheetData {
    SheetData {
        columns: vec!["Note".to_owned()],
        kinds: vec![ScalarKind::Text],
        rows: vec![vec!["keep me".to_owned()]],
    }
}

fn people_backend() -> MemoryBackend {
    MemoryBackend::with_workbook(
        PEOPLE,
        vec![named("People", people_sheet()), named("Notes", notes_sheet())],
    )
}

fn opened(backend: &MemoryBackend) -> Session<&MemoryBackend> {
    let mut session = Session::new(backend);
    let outcome = session.dispatch(Intent::Open(PathBuf::from(PEOPLE)));
    assert!(outcome.is_ok(), "{outcome:?}");
    session
}

#[test]
fn header_sort_then_edit_insert_and_delete() -> Result<()> {
    let backend = people_backend();
    let mut session = opened(&backend);

    let outcome = session.dispatch(Intent::Sort("Age".to_owned()));
    assert_eq!(outcome.status, "sort Age asc");
    assert_eq!(names(&session), vec!["Bo", "Ann"]);
    assert_eq!(
        session.grid().sort().map(|sort| sort.direction),
        Some(SortDirection::Asc)
    );

    let outcome = session.dispatch(Intent::CellEdit {
        position: 0,
        column: "Age".to_owned(),
        text: "abc".to_owned(),
    });
    assert_eq!(
        outcome.error,
        Some(SheetError::Validation {
            column: "Age".to_owned(),
            expected: ScalarKind::Integer,
        })
    );
    assert_eq!(
        outcome.status,
        "edit failed: column \"Age\" expects integer values"
    );
    assert_eq!(session.model().and_then(|m| m.value(0, "Age")), Some("25"));

    let outcome = session.dispatch(Intent::Add(record(&[("Name", "Cy"), ("Age", "40")])));
    assert_eq!(outcome.status, "added 1 row; 3 rows total");
    assert_eq!(session.grid().row_count(), 3);
    assert!(session.grid().sort().is_none());

    let outcome = session.dispatch(Intent::Delete(BTreeSet::from([0])));
    assert_eq!(outcome.status, "deleted 1 rows; 2 remaining");
    assert_eq!(names(&session), vec!["Ann", "Cy"]);
    assert_eq!(session.grid().cell(1, 0), Some("Cy"));
    Ok(())
}

#[test]
fn second_header_activation_sorts_descending() {
    let backend = people_backend();
    let mut session = opened(&backend);
    session.dispatch(Intent::Sort("Age".to_owned()));
    let outcome = session.dispatch(Intent::Sort("Age".to_owned()));
    assert_eq!(outcome.status, "sort Age desc");
    assert_eq!(names(&session), vec!["Ann", "Bo"]);
    assert_eq!(session.grid().header_label(1), Some("Age ↓".to_owned()));
}

#[test]
fn open_lists_sheets_and_loads_first() {
    let backend = people_backend();
    let session = opened(&backend);
    let workbook = session.workbook().expect("workbook is open");
    assert_eq!(workbook.sheets, vec!["People".to_owned(), "Notes".to_owned()]);
    assert_eq!(session.model().map(|m| m.sheet()), Some("People"));
    assert_eq!(session.status_line(), Some("opened people.xlsx (2 sheets)"));
}

#[test]
fn failed_open_keeps_previous_workbook() {
    let backend = people_backend();
    let mut session = opened(&backend);
    let outcome = session.dispatch(Intent::Open(PathBuf::from("/work/absent.xlsx")));
    assert!(matches!(outcome.error, Some(SheetError::Load { .. })));
    assert_eq!(
        session.workbook().map(|w| w.path.clone()),
        Some(PathBuf::from(PEOPLE))
    );
    assert_eq!(session.model().map(|m| m.len()), Some(2));
}

#[test]
fn select_sheet_switches_table_and_rejects_unknown_names() {
    let backend = people_backend();
    let mut session = opened(&backend);

    let outcome = session.dispatch(Intent::SelectSheet("Notes".to_owned()));
    assert_eq!(outcome.status, "loaded sheet Notes: 1 rows");
    assert_eq!(session.grid().columns()[0].name, "Note");

    let outcome = session.dispatch(Intent::SelectSheet("Ghost".to_owned()));
    assert!(matches!(outcome.error, Some(SheetError::Load { .. })));
    assert_eq!(session.model().map(|m| m.sheet()), Some("Notes"));
}

#[test]
fn select_sheet_requires_workbook() {
    let backend = people_backend();
    let mut session = Session::new(&backend);
    let outcome = session.dispatch(Intent::SelectSheet("People".to_owned()));
    assert_eq!(outcome.error, Some(SheetError::NoWorkbook));
}

#[test]
fn save_rewrites_current_sheet_and_preserves_others_in_order() -> Result<()> {
    let backend = people_backend();
    let mut session = opened(&backend);
    session.dispatch(Intent::Modify {
        position: 1,
        record: record(&[("Age", "26")]),
    });

    let outcome = session.dispatch(Intent::Save);
    assert_eq!(outcome.status, "saved people.xlsx");
    let saved = backend.workbook(Path::new(PEOPLE)).expect("workbook saved");
    assert_eq!(
        saved.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["People", "Notes"]
    );
    assert_eq!(saved[0].data.rows[1], vec!["Bo".to_owned(), "26".to_owned()]);
    assert_eq!(saved[1].data, notes_sheet());
    Ok(())
}

#[test]
fn failed_save_reports_and_keeps_edits() {
    let backend = people_backend();
    let mut session = opened(&backend);
    session.dispatch(Intent::Add(record(&[("Name", "Cy")])));
    backend.fail_on(Some(Failure::Write));

    let outcome = session.dispatch(Intent::Save);
    assert!(matches!(outcome.error, Some(SheetError::Save { .. })));
    assert!(outcome.status.starts_with("save failed: save /work/people.xlsx"));
    assert_eq!(session.model().map(|m| m.len()), Some(3));
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn save_without_workbook_has_nothing_to_save() {
    let backend = MemoryBackend::new();
    let mut session = Session::new(&backend);
    let outcome = session.dispatch(Intent::Save);
    assert_eq!(outcome.error, Some(SheetError::NothingToSave));
}

#[test]
fn merge_import_requires_identical_columns() {
    let backend = people_backend();
    backend.put(
        EXTRA,
        vec![
            named(
                "More",
                SheetData {
                    rows: vec![vec!["Cy".to_owned(), "40".to_owned()]],
                    ..people_sheet()
                },
            ),
            named("Notes", notes_sheet()),
        ],
    );
    let mut session = opened(&backend);

    let outcome = session.dispatch(Intent::Import {
        path: PathBuf::from(EXTRA),
        sheet: "Notes".to_owned(),
        mode: ImportMode::Merge,
    });
    assert!(matches!(
        outcome.error,
        Some(SheetError::SchemaMismatch { .. })
    ));
    assert_eq!(names(&session), vec!["Ann", "Bo"]);

    let outcome = session.dispatch(Intent::Import {
        path: PathBuf::from(EXTRA),
        sheet: "More".to_owned(),
        mode: ImportMode::Merge,
    });
    assert_eq!(outcome.status, "imported 1 rows; 3 rows total");
    assert_eq!(names(&session), vec!["Ann", "Bo", "Cy"]);
}

#[test]
fn merge_import_without_table_is_refused() {
    let backend = people_backend();
    let mut session = Session::new(&backend);
    let outcome = session.dispatch(Intent::Import {
        path: PathBuf::from(PEOPLE),
        sheet: "People".to_owned(),
        mode: ImportMode::Merge,
    });
    assert_eq!(outcome.error, Some(SheetError::NoTableLoaded));
}

#[test]
fn new_sheet_import_replaces_current_table_under_its_name() {
    let backend = people_backend();
    let mut faker = SheetFaker::new(9);
    backend.put(EXTRA, vec![named("Members", faker.sheet(12))]);
    let mut session = opened(&backend);

    let outcome = session.dispatch(Intent::Import {
        path: PathBuf::from(EXTRA),
        sheet: "Members".to_owned(),
        mode: ImportMode::NewSheet,
    });
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(session.model().map(|m| m.sheet()), Some("People"));
    assert_eq!(session.model().map(|m| m.len()), Some(12));
    assert_eq!(session.grid().column_count(), SheetFaker::COLUMNS.len());

    session.dispatch(Intent::Save);
    let saved = backend
        .sheet(Path::new(PEOPLE), "People")
        .expect("people sheet saved");
    assert_eq!(saved.columns[1], "City");
}

#[test]
fn export_writes_only_the_current_sheet() {
    let backend = people_backend();
    let mut session = opened(&backend);
    let outcome = session.dispatch(Intent::Export(PathBuf::from("/work/copy.xlsx")));
    assert_eq!(outcome.status, "exported copy.xlsx");

    let exported = backend
        .workbook(Path::new("/work/copy.xlsx"))
        .expect("export written");
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].name, "People");
    assert_eq!(exported[0].data, people_sheet());
}

#[test]
fn modify_is_all_or_nothing() {
    let backend = people_backend();
    let mut session = opened(&backend);
    let outcome = session.dispatch(Intent::Modify {
        position: 0,
        record: record(&[("Name", "Annie"), ("Age", "old")]),
    });
    assert!(matches!(outcome.error, Some(SheetError::Validation { .. })));
    assert_eq!(names(&session), vec!["Ann", "Bo"]);

    let outcome = session.dispatch(Intent::Modify {
        position: 5,
        record: record(&[("Name", "Annie")]),
    });
    assert_eq!(
        outcome.error,
        Some(SheetError::RowOutOfRange {
            position: 5,
            len: 2
        })
    );
}

#[test]
fn delete_with_empty_selection_changes_nothing() {
    let backend = people_backend();
    let mut session = opened(&backend);
    let outcome = session.dispatch(Intent::Delete(BTreeSet::new()));
    assert_eq!(outcome.status, "no rows selected");
    assert_eq!(names(&session), vec!["Ann", "Bo"]);
}

#[test]
fn cell_edit_lifecycle_through_intents() {
    let backend = people_backend();
    let mut session = opened(&backend);

    session.dispatch(Intent::BeginEdit {
        position: 1,
        column: "Name".to_owned(),
    });
    assert!(session.grid().is_editing());

    let outcome = session.dispatch(Intent::CancelEdit);
    assert_eq!(outcome.status, "edit cancelled");
    assert!(!session.grid().is_editing());

    session.dispatch(Intent::BeginEdit {
        position: 1,
        column: "Age".to_owned(),
    });
    let outcome = session.dispatch(Intent::CommitEdit("x".to_owned()));
    assert!(outcome.error.is_some());
    assert_eq!(
        session.grid().pending().map(|p| p.text.as_str()),
        Some("x")
    );

    let outcome = session.dispatch(Intent::CommitEdit("27".to_owned()));
    assert_eq!(outcome.status, "cell updated: row 2, Age");
    assert_eq!(session.grid().cell(1, 1), Some("27"));
    assert!(!session.grid().is_editing());
}

#[test]
fn list_sheets_wraps_backend_errors() {
    let backend = people_backend();
    let session = Session::new(&backend);
    assert_eq!(
        session.list_sheets(Path::new(PEOPLE)),
        Ok(vec!["People".to_owned(), "Notes".to_owned()])
    );
    assert!(matches!(
        session.list_sheets(Path::new("/nowhere.xlsx")),
        Err(SheetError::Load { .. })
    ));
}
