//! Argument parsing and the import command.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use timetable_core::config::Settings;
use timetable_service::ingest::{IngestReport, Orchestrator, deliver};
use timetable_service::script::ExecuteOptions;

use crate::error::AppResult;
use crate::sections::SectionTable;
use crate::sink::JsonSink;

/// How the input file is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// ICS if the text holds a calendar, otherwise JSON then the bundled scraper.
    #[default]
    Auto,
    /// Exchange JSON, falling back to the bundled scraper.
    Text,
    Ics,
}

/// Import a timetable and print it as canonical courses.
#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    /// Input file; standard input when omitted.
    #[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub path: Option<PathBuf>,

    /// Output file; standard output when omitted.
    #[clap(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[clap(short, long, value_enum, default_value_t = InputFormat::Auto)]
    pub format: InputFormat,

    /// Scraping script to run instead of the bundled one.
    #[clap(short, long, value_hint = clap::ValueHint::FilePath)]
    pub script: Option<PathBuf>,

    /// Token passed to `scheduleHtmlProvider`.
    #[clap(long, default_value = "")]
    pub token: String,

    /// Section table as JSON: `[{"section": 1, "start": "08:00", "end": "08:45"}]`.
    #[clap(long, value_hint = clap::ValueHint::FilePath)]
    pub sections: Option<PathBuf>,

    #[clap(long, default_value = "default")]
    pub semester: String,

    /// Report conflicting session pairs.
    #[clap(long)]
    pub check_conflicts: bool,
}

/// ## Summary
/// Runs one import as described by `args`.
///
/// ## Errors
/// Returns an error if reading the input or section table fails, if nothing
/// is recognized in the input, or if writing the output fails.
pub fn run(args: &Args, settings: &Settings) -> AppResult<IngestReport> {
    let raw = read_input(args.path.as_ref())?;
    let table = match &args.sections {
        Some(path) => SectionTable::from_json(&fs::read_to_string(path)?, settings.ics.period_minutes)?,
        None => SectionTable::empty(settings.ics.period_minutes),
    };
    let orchestrator = Orchestrator::new(settings);

    let report = if let Some(script_path) = &args.script {
        let script = fs::read_to_string(script_path)?;
        let options = ExecuteOptions {
            auth_token: args.token.clone(),
            extra: String::new(),
        };
        orchestrator.ingest_with_script(&script, &raw, &options)?
    } else {
        match args.format {
            InputFormat::Auto => orchestrator.ingest_auto_with(&raw, &table)?,
            InputFormat::Text => orchestrator.ingest_text(&raw)?,
            InputFormat::Ics => orchestrator.ingest_ics_with(&raw, &table)?,
        }
    };

    // The output is only opened once there is something to write
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut sink = JsonSink::new(writer, args.semester.clone(), args.check_conflicts);
    deliver(&report, &mut sink, &table)?;

    tracing::info!(
        source = %report.source,
        sessions = report.sessions.len(),
        max_period = report.max_period,
        max_week = report.max_week,
        "Import finished"
    );
    Ok(report)
}

fn read_input(path: Option<&PathBuf>) -> AppResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}
