// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, bail};
use clap::Parser;
use config::Config;
use sheetdesk_app::{GridView, Intent, Session, SpreadsheetBackend};
use sheetdesk_io::FileBackend;
use std::path::{Path, PathBuf};
use tracing::info;

/// Edit spreadsheet files in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "sheetdesk", version, about = "Edit spreadsheet files in the terminal")]
struct CliOptions {
    /// Workbook (.xlsx, .xlsm, .xlsb, .xls, .ods) or .csv file to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Sheet to load instead of the first one
    #[arg(long, value_name = "NAME", requires = "file")]
    sheet: Option<String>,

    /// Use a specific config path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the resolved config path
    #[arg(long)]
    print_config_path: bool,

    /// Print a v1 config template
    #[arg(long)]
    print_example_config: bool,

    /// Validate the config and FILE, print a summary, and exit
    #[arg(long)]
    check: bool,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse();
    let config_path = match &options.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if options.print_config_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if options.print_example_config {
        print!("{}", Config::example_config(&config_path));
        return Ok(());
    }

    let config = Config::load(&config_path).with_context(|| {
        format!(
            "load config {}; run `sheetdesk --print-example-config` to generate a v1 template",
            config_path.display()
        )
    })?;
    let _log_guard = logging::init(&config)?;

    let mut session = Session::with_grid(
        FileBackend::new(),
        GridView::new(config.max_column_width()),
    );

    if options.check {
        let Some(file) = &options.file else {
            println!("config ok: {}", config_path.display());
            return Ok(());
        };
        open_file(&mut session, file, options.sheet.as_deref())?;
        if let Some(summary) = check_summary(&session) {
            println!("{summary}");
        }
        return Ok(());
    }

    if let Some(file) = &options.file
        && let Err(error) = open_file(&mut session, file, options.sheet.as_deref())
    {
        // Startup failures stay on the status line; the shell still opens.
        info!(%error, "starting without a workbook");
    }

    info!(config = %config_path.display(), "starting terminal session");
    sheetdesk_tui::run_app(&mut session)
}

fn open_file<B: SpreadsheetBackend>(
    session: &mut Session<B>,
    file: &Path,
    sheet: Option<&str>,
) -> Result<()> {
    let outcome = session.dispatch(Intent::Open(file.to_path_buf()));
    if !outcome.is_ok() {
        bail!("{}", outcome.status);
    }
    if let Some(sheet) = sheet {
        let outcome = session.dispatch(Intent::SelectSheet(sheet.to_owned()));
        if !outcome.is_ok() {
            bail!("{}", outcome.status);
        }
    }
    Ok(())
}

fn check_summary<B: SpreadsheetBackend>(session: &Session<B>) -> Option<String> {
    let workbook = session.workbook()?;
    let model = session.model()?;
    Some(format!(
        "{}: {} sheets, {} rows in {}",
        workbook.file_name(),
        workbook.sheets.len(),
        model.len(),
        model.sheet()
    ))
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, check_summary, open_file};
    use anyhow::Result;
    use clap::Parser;
    use sheetdesk_app::{ScalarKind, Session, SheetData};
    use sheetdesk_testkit::{MemoryBackend, named, people_sheet};
    use std::path::{Path, PathBuf};

    fn parse(args: &[&str]) -> Result<CliOptions> {
        Ok(CliOptions::try_parse_from(
            std::iter::once("sheetdesk").chain(args.iter().copied()),
        )?)
    }

    fn people_backend() -> MemoryBackend {
        let pets = SheetData {
            columns: vec!["Pet".to_owned()],
            kinds: vec![ScalarKind::Text],
            rows: Vec::new(),
        };
        MemoryBackend::with_workbook(
            "/data/people.xlsx",
            vec![named("People", people_sheet()), named("Pets", pets)],
        )
    }

    #[test]
    fn defaults_have_no_file_and_no_flags() -> Result<()> {
        let options = parse(&[])?;
        assert_eq!(
            options,
            CliOptions {
                file: None,
                sheet: None,
                config: None,
                print_config_path: false,
                print_example_config: false,
                check: false,
            }
        );
        Ok(())
    }

    #[test]
    fn file_sheet_and_config_are_parsed() -> Result<()> {
        let options = parse(&[
            "book.xlsx",
            "--sheet",
            "Pets",
            "--config",
            "/custom/config.toml",
            "--check",
        ])?;
        assert_eq!(options.file, Some(PathBuf::from("book.xlsx")));
        assert_eq!(options.sheet.as_deref(), Some("Pets"));
        assert_eq!(options.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(options.check);
        Ok(())
    }

    #[test]
    fn sheet_without_file_is_rejected() {
        assert!(parse(&["--sheet", "Pets"]).is_err());
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert!(parse(&["--wat"]).is_err());
    }

    #[test]
    fn print_flags_are_parsed() -> Result<()> {
        let options = parse(&["--print-config-path", "--print-example-config"])?;
        assert!(options.print_config_path);
        assert!(options.print_example_config);
        assert!(!options.check);
        Ok(())
    }

    #[test]
    fn check_summary_reports_sheets_and_rows() -> Result<()> {
        let mut session = Session::new(people_backend());
        assert_eq!(check_summary(&session), None);

        open_file(&mut session, Path::new("/data/people.xlsx"), None)?;
        assert_eq!(
            check_summary(&session).as_deref(),
            Some("people.xlsx: 2 sheets, 2 rows in People")
        );

        open_file(&mut session, Path::new("/data/people.xlsx"), Some("Pets"))?;
        assert_eq!(
            check_summary(&session).as_deref(),
            Some("people.xlsx: 2 sheets, 0 rows in Pets")
        );
        Ok(())
    }

    #[test]
    fn open_file_surfaces_session_failures() {
        let mut session = Session::new(people_backend());
        let error = open_file(&mut session, Path::new("/data/people.xlsx"), Some("Nope"))
            .expect_err("unknown sheet should fail");
        assert!(error.to_string().starts_with("load sheet failed"));

        let error = open_file(&mut session, Path::new("/data/gone.xlsx"), None)
            .expect_err("missing workbook should fail");
        assert!(error.to_string().starts_with("open failed"));
    }
}
