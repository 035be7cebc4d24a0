//! Purpose: `concatcsv` CLI entry point and merge pipeline orchestration.
//! Role: Binary crate root; parses args, runs the pipeline, reports on stdout.
//! Invariants: The run is linear: discover, census, summarize, merge, describe, write.
//! Invariants: Both directories are validated before any file is read.
//! Invariants: Non-interactive errors and notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use concatcsv::config::MergeConfig;
use concatcsv::core::census::ColumnCensus;
use concatcsv::core::describe::describe;
use concatcsv::core::discover::{CSV_EXTENSION, DirRole, discover_files, ensure_directory};
use concatcsv::core::loader::TableLoader;
use concatcsv::core::merge::{ColumnPolicy, Level, MergePlan, concat_tables};
use concatcsv::core::summary::CoverageSummary;
use concatcsv::core::writer::write_table;
use concatcsv::notice::{Notice, notice_json};
use concatcsv::{Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::with_code(0));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `concatcsv --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let report = ReportOptions {
        summarize: cli.summarize,
        format: cli.format,
        color_mode,
    };
    let config = cli.into_config();

    run_merge(&config, report)
        .map_err(add_not_a_directory_hint)
        .map_err(add_parse_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

/// Accepts the single-dash `-summarize` spelling alongside `--summarize`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let replacement = arg.to_str().and_then(|value| match value {
                "-summarize" => Some("--summarize"),
                _ => None,
            });
            replacement.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

#[derive(Parser, Debug)]
#[command(
    name = "concatcsv",
    version,
    about = "Merge CSVs on header row names",
    long_about = None,
    after_help = r#"COLUMN FILTERING
  Each column's coverage is the fraction of input files containing it, rounded
  to two decimals. By default only columns whose coverage is at least --level
  are written: 1.0 keeps the column intersection, 0.0 keeps the union.
  --no-filter writes every column and treats --level as informational.

EXAMPLES
  $ concatcsv --dir data --outdir out -summarize
  $ concatcsv --dir data --level 0.5 --output_name combined
  $ concatcsv --dir data --no-filter"#
)]
struct Cli {
    #[arg(
        long,
        default_value = ".",
        help = "Directory to look for CSV files",
        value_hint = ValueHint::DirPath
    )]
    dir: PathBuf,
    #[arg(
        long,
        default_value = ".",
        help = "Directory to put the merged CSV file",
        value_hint = ValueHint::DirPath
    )]
    outdir: PathBuf,
    #[arg(
        long = "output_name",
        default_value = "merged",
        help = "Name of the output CSV file, without extension"
    )]
    output_name: String,
    #[arg(
        long,
        default_value = "1.0",
        value_parser = parse_level,
        help = "Min fraction of files that must contain a column for it to be kept (0.0-1.0)"
    )]
    level: Level,
    #[arg(
        long,
        help = "Print column names and the count of files containing each column (also -summarize)"
    )]
    summarize: bool,
    #[arg(
        long = "no-filter",
        help = "Keep every column; --level only changes the printed label"
    )]
    no_filter: bool,
    #[arg(
        long,
        default_value = "human",
        value_enum,
        help = "Coverage report format: human|json"
    )]
    format: ReportFormat,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,
}

impl Cli {
    fn into_config(self) -> MergeConfig {
        MergeConfig {
            input_dir: self.dir,
            output_dir: self.outdir,
            output_name: self.output_name,
            extension: CSV_EXTENSION.to_string(),
            level: self.level,
            policy: if self.no_filter {
                ColumnPolicy::Informational
            } else {
                ColumnPolicy::Apply
            },
        }
    }
}

fn parse_level(input: &str) -> Result<Level, Error> {
    input.parse()
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug)]
struct ReportOptions {
    summarize: bool,
    format: ReportFormat,
    color_mode: ColorMode,
}

fn run_merge(config: &MergeConfig, report: ReportOptions) -> Result<RunOutcome, Error> {
    ensure_directory(&config.input_dir, DirRole::Input)?;
    ensure_directory(&config.output_dir, DirRole::Output)?;

    let files = discover_files(&config.input_dir, &config.extension)?;
    let total_files = files.len();
    if total_files == 0 {
        emit_notice(&no_inputs_notice(config), report.color_mode);
        return Ok(RunOutcome::ok());
    }

    info!(total_files, "counting columns");
    let census = ColumnCensus::from_tables(TableLoader::new(&config.input_dir, &files))?;
    let summary = CoverageSummary::new(&census, total_files)?;
    if report.summarize {
        emit_summary(&summary, report.format);
    }

    let plan = MergePlan::new(&summary, config.level, config.policy);
    println!("{}", min_percent_line(plan.level()));
    if let Some(label) = plan.level().label() {
        println!("({label})\n");
    }
    if !plan.dropped().is_empty() {
        info!(dropped = ?plan.dropped(), "columns below coverage level");
    }

    info!(columns = plan.schema().len(), "concatenating tables");
    let combined = concat_tables(TableLoader::new(&config.input_dir, &files), plan.schema())?;
    println!("\nOUTPUT CSV\n");
    println!("{}", describe(&combined).render_human());

    write_table(&combined, &config.output_dir, &config.output_name)?;
    let output_dir = std::path::absolute(&config.output_dir).map_err(|err| {
        Error::from_io(err, "failed to resolve output directory").with_path(&config.output_dir)
    })?;
    println!("Combined CSV saved to {}", output_dir.display());
    Ok(RunOutcome::ok())
}

fn min_percent_line(level: Level) -> String {
    format!("Min percent needed to be included: {:?}%", level.percent())
}

fn emit_summary(summary: &CoverageSummary, format: ReportFormat) {
    match format {
        ReportFormat::Human => {
            println!("TOTAL COUNT OF CSV FILES: {}", summary.total_files());
            println!("{}", summary.render_human());
        }
        ReportFormat::Json => emit_json(summary.to_json()),
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn no_inputs_notice(config: &MergeConfig) -> Notice {
    let mut details = Map::new();
    details.insert(
        "dir".to_string(),
        json!(config.input_dir.display().to_string()),
    );
    details.insert("extension".to_string(), json!(config.extension));
    Notice {
        kind: "no_inputs".to_string(),
        time: notice_time_now().unwrap_or_default(),
        cmd: "concatcsv".to_string(),
        message: "No CSVs to concatenate, exiting.".to_string(),
        details,
    }
}

fn add_not_a_directory_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotADirectory || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check that --dir and --outdir name existing directories.")
}

fn add_parse_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Parse || err.hint().is_some() {
        return err;
    }
    err.with_hint("Each input must be UTF-8 CSV with a header row; fix or move the file and retry.")
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check file permissions or use --outdir to a writable location.",
        ),
        ErrorKind::NotFound => err.with_hint("A file disappeared during the run. Retry."),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share the command if it persists.",
    )
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::NotADirectory => "not a directory".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Parse => "malformed csv".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
