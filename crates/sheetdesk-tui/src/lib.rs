// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs};
use sheetdesk_app::{
    FormKind, GridView, ImportMode, Intent, Outcome, RecordForm, Session, SheetError,
    SpreadsheetBackend, display_file_name,
};
use std::collections::BTreeSet;
use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const EDIT_CARET: &str = "▏";
const COLUMN_SPACING: usize = 1;
const NAV_HINTS: &str =
    "hjkl move | enter edit | s sort | space select | a/m/d rows | o/w/i/e files | tab sheets | ? help | q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridCommand {
    MoveRow(isize),
    MoveColumn(isize),
    JumpFirstRow,
    JumpLastRow,
    BeginEdit,
    Sort,
    ToggleSelection,
    AddRecord,
    ModifyRecord,
    DeleteRows,
    OpenFile,
    Save,
    ImportFile,
    ExportFile,
    NextSheet,
    PreviousSheet,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPurpose {
    Open,
    Import,
    Export,
}

impl PromptPurpose {
    const fn title(self) -> &'static str {
        match self {
            Self::Open => "open file",
            Self::Import => "import from",
            Self::Export => "export to",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPrompt {
    purpose: PromptPurpose,
    input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportChoice {
    path: PathBuf,
    sheets: Vec<String>,
    sheet_cursor: usize,
    mode: ImportMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Overlay {
    #[default]
    None,
    Help,
    Prompt(PathPrompt),
    Form(RecordForm),
    ImportOptions(ImportChoice),
    ConfirmDelete(BTreeSet<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct GridCursor {
    row: usize,
    col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: GridCursor,
    selected_rows: BTreeSet<usize>,
    overlay: Overlay,
    status_token: u64,
}

pub fn run_app<B: SpreadsheetBackend>(session: &mut Session<B>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    if session.status_line().is_some() {
        track_status(&mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(session, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, session, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(session, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                session.clear_status();
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Starts the clear timer for whatever status line the session now shows.
fn track_status(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    session.set_status(message);
    track_status(view_data, internal_tx);
}

fn dispatch_intent<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    intent: Intent,
) -> Outcome {
    let reshapes_rows = !matches!(
        intent,
        Intent::BeginEdit { .. }
            | Intent::CommitEdit(_)
            | Intent::CancelEdit
            | Intent::FocusLost
            | Intent::CellEdit { .. }
            | Intent::Save
            | Intent::Export(_)
    );
    let outcome = session.dispatch(intent);
    if outcome.is_ok() && reshapes_rows {
        view_data.selected_rows.clear();
    }
    clamp_cursor(&mut view_data.cursor, session.grid());
    track_status(view_data, internal_tx);
    outcome
}

fn handle_key_event<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.overlay != Overlay::None {
        handle_overlay_key(session, view_data, internal_tx, key);
        return false;
    }

    if session.grid().is_editing() {
        handle_edit_key(session, view_data, internal_tx, key);
        return false;
    }

    let Some(command) = grid_command_for_key(key) else {
        return false;
    };
    apply_grid_command(session, view_data, internal_tx, command)
}

fn grid_command_for_key(key: KeyEvent) -> Option<GridCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(GridCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(GridCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(GridCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(GridCommand::MoveColumn(1)),
        (KeyCode::Char('g'), _) => Some(GridCommand::JumpFirstRow),
        (KeyCode::Char('G'), _) => Some(GridCommand::JumpLastRow),
        (KeyCode::Enter, _) => Some(GridCommand::BeginEdit),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(GridCommand::Sort),
        (KeyCode::Char(' '), _) => Some(GridCommand::ToggleSelection),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(GridCommand::AddRecord),
        (KeyCode::Char('m'), KeyModifiers::NONE) => Some(GridCommand::ModifyRecord),
        (KeyCode::Char('d'), KeyModifiers::NONE) => Some(GridCommand::DeleteRows),
        (KeyCode::Char('o'), KeyModifiers::NONE) => Some(GridCommand::OpenFile),
        (KeyCode::Char('w'), KeyModifiers::NONE) => Some(GridCommand::Save),
        (KeyCode::Char('i'), KeyModifiers::NONE) => Some(GridCommand::ImportFile),
        (KeyCode::Char('e'), KeyModifiers::NONE) => Some(GridCommand::ExportFile),
        (KeyCode::Tab, _) => Some(GridCommand::NextSheet),
        (KeyCode::BackTab, _) => Some(GridCommand::PreviousSheet),
        (KeyCode::Char('?'), _) => Some(GridCommand::Help),
        (KeyCode::Char('q'), KeyModifiers::NONE) => Some(GridCommand::Quit),
        _ => None,
    }
}

fn apply_grid_command<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: GridCommand,
) -> bool {
    match command {
        GridCommand::MoveRow(_)
        | GridCommand::MoveColumn(_)
        | GridCommand::JumpFirstRow
        | GridCommand::JumpLastRow => move_cursor(&mut view_data.cursor, session.grid(), command),
        GridCommand::BeginEdit => {
            let Some(column) = cursor_column(session.grid(), view_data.cursor) else {
                emit_status(session, view_data, internal_tx, "no cell to edit");
                return false;
            };
            if view_data.cursor.row >= session.grid().row_count() {
                emit_status(session, view_data, internal_tx, "no cell to edit");
                return false;
            }
            let position = view_data.cursor.row;
            dispatch_intent(
                session,
                view_data,
                internal_tx,
                Intent::BeginEdit { position, column },
            );
        }
        GridCommand::Sort => {
            let Some(column) = cursor_column(session.grid(), view_data.cursor) else {
                emit_status(session, view_data, internal_tx, "sort unavailable");
                return false;
            };
            dispatch_intent(session, view_data, internal_tx, Intent::Sort(column));
        }
        GridCommand::ToggleSelection => {
            if session.grid().row_count() == 0 {
                return false;
            }
            let row = view_data.cursor.row;
            if !view_data.selected_rows.remove(&row) {
                view_data.selected_rows.insert(row);
            }
            let count = view_data.selected_rows.len();
            emit_status(session, view_data, internal_tx, format!("{count} rows selected"));
        }
        GridCommand::AddRecord => match session.model() {
            Some(model) => view_data.overlay = Overlay::Form(RecordForm::blank(model)),
            None => emit_status(
                session,
                view_data,
                internal_tx,
                SheetError::NoTableLoaded.to_string(),
            ),
        },
        GridCommand::ModifyRecord => {
            match session
                .model()
                .and_then(|model| RecordForm::for_row(model, view_data.cursor.row))
            {
                Some(form) => view_data.overlay = Overlay::Form(form),
                None => emit_status(session, view_data, internal_tx, "no row to modify"),
            }
        }
        GridCommand::DeleteRows => {
            let positions = if view_data.selected_rows.is_empty() {
                if session.grid().row_count() == 0 {
                    BTreeSet::new()
                } else {
                    BTreeSet::from([view_data.cursor.row])
                }
            } else {
                view_data.selected_rows.clone()
            };
            if positions.is_empty() {
                emit_status(session, view_data, internal_tx, "no rows to delete");
            } else {
                view_data.overlay = Overlay::ConfirmDelete(positions);
            }
        }
        GridCommand::OpenFile => view_data.overlay = prompt(PromptPurpose::Open),
        GridCommand::Save => {
            dispatch_intent(session, view_data, internal_tx, Intent::Save);
        }
        GridCommand::ImportFile => view_data.overlay = prompt(PromptPurpose::Import),
        GridCommand::ExportFile => view_data.overlay = prompt(PromptPurpose::Export),
        GridCommand::NextSheet => cycle_sheet(session, view_data, internal_tx, 1),
        GridCommand::PreviousSheet => cycle_sheet(session, view_data, internal_tx, -1),
        GridCommand::Help => view_data.overlay = Overlay::Help,
        GridCommand::Quit => return true,
    }
    false
}

fn prompt(purpose: PromptPurpose) -> Overlay {
    Overlay::Prompt(PathPrompt {
        purpose,
        input: String::new(),
    })
}

fn cursor_column(grid: &GridView, cursor: GridCursor) -> Option<String> {
    grid.columns()
        .get(cursor.col)
        .map(|column| column.name.clone())
}

fn move_cursor(cursor: &mut GridCursor, grid: &GridView, command: GridCommand) {
    let last_row = grid.row_count().saturating_sub(1);
    let last_col = grid.column_count().saturating_sub(1);
    match command {
        GridCommand::MoveRow(delta) => cursor.row = step(cursor.row, delta).min(last_row),
        GridCommand::MoveColumn(delta) => cursor.col = step(cursor.col, delta).min(last_col),
        GridCommand::JumpFirstRow => cursor.row = 0,
        GridCommand::JumpLastRow => cursor.row = last_row,
        _ => {}
    }
}

fn step(current: usize, delta: isize) -> usize {
    if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    }
}

fn clamp_cursor(cursor: &mut GridCursor, grid: &GridView) {
    cursor.row = cursor.row.min(grid.row_count().saturating_sub(1));
    cursor.col = cursor.col.min(grid.column_count().saturating_sub(1));
}

fn cycle_sheet<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let Some(workbook) = session.workbook() else {
        emit_status(
            session,
            view_data,
            internal_tx,
            SheetError::NoWorkbook.to_string(),
        );
        return;
    };
    if workbook.sheets.len() < 2 {
        emit_status(session, view_data, internal_tx, "workbook has one sheet");
        return;
    }
    let current = session
        .model()
        .and_then(|model| workbook.sheet_index(model.sheet()))
        .unwrap_or(0);
    let len = workbook.sheets.len() as isize;
    let next = (current as isize + delta).rem_euclid(len) as usize;
    let name = workbook.sheets[next].clone();

    let outcome = dispatch_intent(session, view_data, internal_tx, Intent::SelectSheet(name));
    if outcome.is_ok() {
        view_data.cursor = GridCursor::default();
    }
}

fn handle_edit_key<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            let text = session
                .grid()
                .pending()
                .map(|pending| pending.text.clone())
                .unwrap_or_default();
            dispatch_intent(session, view_data, internal_tx, Intent::CommitEdit(text));
        }
        KeyCode::Esc => {
            dispatch_intent(session, view_data, internal_tx, Intent::CancelEdit);
        }
        KeyCode::Backspace => {
            if let Some(input) = session.grid_mut().edit_input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(value) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(input) = session.grid_mut().edit_input_mut() {
                input.push(value);
            }
        }
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            let outcome = dispatch_intent(session, view_data, internal_tx, Intent::FocusLost);
            if outcome.is_ok()
                && let Some(command) = grid_command_for_key(key)
            {
                move_cursor(&mut view_data.cursor, session.grid(), command);
            }
        }
        _ => {}
    }
}

fn handle_overlay_key<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let overlay = std::mem::take(&mut view_data.overlay);
    view_data.overlay = match overlay {
        Overlay::None => Overlay::None,
        Overlay::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Overlay::None,
            _ => Overlay::Help,
        },
        Overlay::Prompt(prompt) => handle_prompt_key(session, view_data, internal_tx, prompt, key),
        Overlay::Form(form) => handle_form_key(session, view_data, internal_tx, form, key),
        Overlay::ImportOptions(choice) => {
            handle_import_key(session, view_data, internal_tx, choice, key)
        }
        Overlay::ConfirmDelete(positions) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                dispatch_intent(session, view_data, internal_tx, Intent::Delete(positions));
                Overlay::None
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                emit_status(session, view_data, internal_tx, "delete cancelled");
                Overlay::None
            }
            _ => Overlay::ConfirmDelete(positions),
        },
    };
}

fn handle_prompt_key<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut prompt: PathPrompt,
    key: KeyEvent,
) -> Overlay {
    match key.code {
        KeyCode::Esc => {
            let message = format!("{} cancelled", prompt.purpose.title());
            emit_status(session, view_data, internal_tx, message);
            Overlay::None
        }
        KeyCode::Backspace => {
            prompt.input.pop();
            Overlay::Prompt(prompt)
        }
        KeyCode::Char(value) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.input.push(value);
            Overlay::Prompt(prompt)
        }
        KeyCode::Enter => {
            let input = prompt.input.trim();
            if input.is_empty() {
                emit_status(session, view_data, internal_tx, "enter a file path");
                return Overlay::Prompt(prompt);
            }
            let path = PathBuf::from(input);
            match prompt.purpose {
                PromptPurpose::Open => {
                    let outcome = dispatch_intent(session, view_data, internal_tx, Intent::Open(path));
                    if outcome.is_ok() {
                        view_data.cursor = GridCursor::default();
                        Overlay::None
                    } else {
                        Overlay::Prompt(prompt)
                    }
                }
                PromptPurpose::Export => {
                    let outcome =
                        dispatch_intent(session, view_data, internal_tx, Intent::Export(path));
                    if outcome.is_ok() {
                        Overlay::None
                    } else {
                        Overlay::Prompt(prompt)
                    }
                }
                PromptPurpose::Import => match session.list_sheets(&path) {
                    Ok(sheets) if sheets.is_empty() => {
                        let message = format!("no sheets in {}", display_file_name(&path));
                        emit_status(session, view_data, internal_tx, message);
                        Overlay::Prompt(prompt)
                    }
                    Ok(sheets) => Overlay::ImportOptions(ImportChoice {
                        path,
                        sheets,
                        sheet_cursor: 0,
                        mode: ImportMode::Merge,
                    }),
                    Err(error) => {
                        emit_status(
                            session,
                            view_data,
                            internal_tx,
                            format!("import failed: {error}"),
                        );
                        Overlay::Prompt(prompt)
                    }
                },
            }
        }
        _ => Overlay::Prompt(prompt),
    }
}

fn handle_form_key<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut form: RecordForm,
    key: KeyEvent,
) -> Overlay {
    match key.code {
        KeyCode::Esc => {
            emit_status(session, view_data, internal_tx, "form cancelled");
            return Overlay::None;
        }
        KeyCode::Tab | KeyCode::Down => form.move_cursor(1),
        KeyCode::BackTab | KeyCode::Up => form.move_cursor(-1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(value) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.push_char(value);
        }
        KeyCode::Enter => {
            if let Some(error) = form.first_invalid() {
                emit_status(session, view_data, internal_tx, error.to_string());
                return Overlay::Form(form);
            }
            let record = form.to_record();
            let intent = match form.kind {
                FormKind::AddRecord => Intent::Add(record),
                FormKind::ModifyRecord { position } => Intent::Modify { position, record },
            };
            let outcome = dispatch_intent(session, view_data, internal_tx, intent);
            if !outcome.is_ok() {
                return Overlay::Form(form);
            }
            if form.kind == FormKind::AddRecord {
                view_data.cursor.row = session.grid().row_count().saturating_sub(1);
            }
            return Overlay::None;
        }
        _ => {}
    }
    Overlay::Form(form)
}

fn handle_import_key<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut choice: ImportChoice,
    key: KeyEvent,
) -> Overlay {
    match key.code {
        KeyCode::Esc => {
            emit_status(session, view_data, internal_tx, "import cancelled");
            return Overlay::None;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            choice.sheet_cursor = choice.sheet_cursor.saturating_sub(1);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            choice.sheet_cursor = (choice.sheet_cursor + 1).min(choice.sheets.len() - 1);
        }
        KeyCode::Char('m') | KeyCode::Tab => {
            choice.mode = match choice.mode {
                ImportMode::Merge => ImportMode::NewSheet,
                ImportMode::NewSheet => ImportMode::Merge,
            };
        }
        KeyCode::Enter => {
            let intent = Intent::Import {
                path: choice.path.clone(),
                sheet: choice.sheets[choice.sheet_cursor].clone(),
                mode: choice.mode,
            };
            let outcome = dispatch_intent(session, view_data, internal_tx, intent);
            if outcome.is_ok() {
                return Overlay::None;
            }
        }
        _ => {}
    }
    Overlay::ImportOptions(choice)
}

fn render<B: SpreadsheetBackend>(
    frame: &mut ratatui::Frame<'_>,
    session: &Session<B>,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_sheet_tabs(frame, layout[0], session);
    render_grid(frame, layout[1], session, view_data);

    let status_widget = Paragraph::new(status_text(session, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    match &view_data.overlay {
        Overlay::None => {}
        Overlay::Help => render_overlay(frame, 70, 60, "help", help_overlay_text().to_owned()),
        Overlay::Prompt(prompt) => render_overlay(
            frame,
            60,
            20,
            prompt.purpose.title(),
            render_prompt_overlay_text(prompt),
        ),
        Overlay::Form(form) => render_overlay(
            frame,
            60,
            60,
            &form.kind.title(),
            render_form_overlay_text(form),
        ),
        Overlay::ImportOptions(choice) => {
            render_overlay(frame, 60, 50, "import", render_import_overlay_text(choice));
        }
        Overlay::ConfirmDelete(positions) => {
            render_overlay(frame, 50, 20, "delete", render_delete_overlay_text(positions));
        }
    }
}

fn render_overlay(
    frame: &mut ratatui::Frame<'_>,
    percent_x: u16,
    percent_y: u16,
    title: &str,
    body: String,
) {
    let area = centered_rect(percent_x, percent_y, frame.area());
    frame.render_widget(Clear, area);
    let widget = Paragraph::new(body).block(
        Block::default()
            .title(title.to_owned())
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, area);
}

fn render_sheet_tabs<B: SpreadsheetBackend>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    session: &Session<B>,
) {
    let block = Block::default()
        .title(window_title(session))
        .borders(Borders::ALL);
    match session.workbook() {
        Some(workbook) if !workbook.sheets.is_empty() => {
            let selected = session
                .model()
                .and_then(|model| workbook.sheet_index(model.sheet()))
                .unwrap_or(0);
            let tabs = Tabs::new(workbook.sheets.clone())
                .block(block)
                .style(Style::default().fg(Color::White))
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .select(selected);
            frame.render_widget(tabs, area);
        }
        _ => {
            let empty = Paragraph::new("no workbook open; press o to open a file").block(block);
            frame.render_widget(empty, area);
        }
    }
}

fn window_title<B: SpreadsheetBackend>(session: &Session<B>) -> String {
    match session.workbook() {
        Some(workbook) => format!("sheetdesk | {}", workbook.file_name()),
        None => "sheetdesk".to_owned(),
    }
}

fn render_grid<B: SpreadsheetBackend>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    session: &Session<B>,
    view_data: &ViewData,
) {
    let grid = session.grid();
    let Some(model) = session.model() else {
        let empty = Paragraph::new(String::new())
            .block(Block::default().borders(Borders::ALL).title("grid"));
        frame.render_widget(empty, area);
        return;
    };

    let widths = grid
        .columns()
        .iter()
        .map(|column| column.width)
        .collect::<Vec<_>>();
    let visible = visible_column_range(
        &widths,
        view_data.cursor.col,
        usize::from(area.width.saturating_sub(2)),
    );
    let constraints = visible
        .clone()
        .map(|index| Constraint::Length(u16::try_from(widths[index]).unwrap_or(u16::MAX)))
        .collect::<Vec<_>>();

    let header = Row::new(visible.clone().map(|index| {
        Cell::from(grid.header_label(index).unwrap_or_default()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let editing_cell = grid.pending().and_then(|pending| {
        model
            .column_index(&pending.column)
            .map(|column| (pending.position, column, pending.text.as_str()))
    });

    let rows = grid.rows().iter().enumerate().map(|(row_index, row)| {
        let cursor_row = row_index == view_data.cursor.row;
        let selected = view_data.selected_rows.contains(&row_index);
        let cells = visible
            .clone()
            .map(|column_index| {
                let mut text = row.get(column_index).cloned().unwrap_or_default();
                let mut style = Style::default();
                if selected {
                    style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
                }
                if cursor_row {
                    style = style.bg(Color::DarkGray);
                }
                if cursor_row && column_index == view_data.cursor.col {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                if let Some((position, column, pending)) = editing_cell
                    && position == row_index
                    && column == column_index
                {
                    text = format!("{pending}{EDIT_CARET}");
                    style = Style::default().fg(Color::Black).bg(Color::Yellow);
                }
                Cell::from(text).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(rows, constraints)
        .header(header)
        .column_spacing(COLUMN_SPACING as u16)
        .block(
            Block::default()
                .title(grid_title(session, view_data))
                .borders(Borders::ALL),
        );
    let mut table_state = TableState::default().with_selected(Some(view_data.cursor.row));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn grid_title<B: SpreadsheetBackend>(session: &Session<B>, view_data: &ViewData) -> String {
    let Some(model) = session.model() else {
        return "grid".to_owned();
    };
    let mut title = format!("{} | {} rows", model.sheet(), model.len());
    if !view_data.selected_rows.is_empty() {
        title.push_str(&format!(" | {} selected", view_data.selected_rows.len()));
    }
    title
}

/// Columns that fit in `available` cells, scrolled so the cursor column is
/// always shown.
fn visible_column_range(widths: &[usize], cursor: usize, available: usize) -> Range<usize> {
    if widths.is_empty() {
        return 0..0;
    }
    let cursor = cursor.min(widths.len() - 1);
    let mut start = cursor;
    let mut used = widths[cursor];
    while start > 0 && used + COLUMN_SPACING + widths[start - 1] <= available {
        start -= 1;
        used += COLUMN_SPACING + widths[start];
    }
    let mut end = cursor + 1;
    while end < widths.len() && used + COLUMN_SPACING + widths[end] <= available {
        used += COLUMN_SPACING + widths[end];
        end += 1;
    }
    start..end
}

fn status_text<B: SpreadsheetBackend>(session: &Session<B>, view_data: &ViewData) -> String {
    let mode = match &view_data.overlay {
        Overlay::Form(_) => "FORM",
        _ if session.grid().is_editing() => "EDIT",
        _ => "NAV",
    };
    let hints = match &view_data.overlay {
        Overlay::Form(_) => "tab/shift+tab field | enter submit | esc cancel",
        Overlay::Prompt(_) => "type a path | enter confirm | esc cancel",
        Overlay::ImportOptions(_) => "j/k sheet | m mode | enter import | esc cancel",
        Overlay::ConfirmDelete(_) => "y delete | n keep",
        Overlay::Help => "esc close",
        Overlay::None if session.grid().is_editing() => {
            "enter commit | esc cancel | arrows commit and move"
        }
        Overlay::None => NAV_HINTS,
    };
    match session.status_line() {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn render_prompt_overlay_text(prompt: &PathPrompt) -> String {
    format!(
        "{}{EDIT_CARET}\n\nxlsx, xlsm, xlsb, xls, ods, or csv",
        prompt.input
    )
}

fn render_form_overlay_text(form: &RecordForm) -> String {
    form.fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let (marker, caret) = if index == form.cursor {
                (">", EDIT_CARET)
            } else {
                (" ", "")
            };
            format!(
                "{marker} {} ({}): {}{caret}",
                field.column, field.kind, field.value
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_import_overlay_text(choice: &ImportChoice) -> String {
    let mut lines = vec![
        format!("file: {}", display_file_name(&choice.path)),
        String::new(),
        "sheet:".to_owned(),
    ];
    for (index, sheet) in choice.sheets.iter().enumerate() {
        let marker = if index == choice.sheet_cursor { ">" } else { " " };
        lines.push(format!("{marker} {sheet}"));
    }
    lines.push(String::new());
    lines.push(format!("mode: {} (m to switch)", choice.mode.label()));
    lines.join("\n")
}

fn render_delete_overlay_text(positions: &BTreeSet<usize>) -> String {
    let rows = positions
        .iter()
        .map(|position| (position + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "delete {} rows ({rows})?\n\ny confirm | n cancel",
        positions.len()
    )
}

fn help_overlay_text() -> &'static str {
    "grid: h/j/k/l or arrows move | g/G first/last row | space select row\n\
cells: enter edit | enter commit | esc cancel | arrows commit and move\n\
rows: a add | m modify | d delete selected (or cursor row) | s sort column\n\
files: o open | w save | i import | e export | tab/shift+tab sheet\n\
form: tab/shift+tab field | enter submit | esc cancel\n\
import: j/k sheet | m merge or replace | enter import | esc cancel\n\
global: ? help | q quit | ctrl+q quit anywhere"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
