use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use percent_calc::calc_engine::{Calculator, EvaluationTrace};
use percent_calc::helpers::format_with_spaces;
use percent_calc::keypad::format_result;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "percent-calc", version, about = "Arithmetic calculator with percentages")]
struct Cli {
    /// Expression to evaluate once, e.g. `200 * 10%`. Starts an interactive
    /// mode when omitted.
    #[arg(allow_hyphen_values = true)]
    expression: Vec<String>,

    /// Print each evaluation step (one-shot only).
    #[arg(long)]
    details: bool,

    /// Interactive front-end.
    #[arg(long, value_enum, default_value_t = Mode::Tui)]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr. The TUI only logs when set.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Tui,
    Line,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive_tui = cli.expression.is_empty() && cli.mode == Mode::Tui;
    init_logging(&cli, interactive_tui)?;

    if !cli.expression.is_empty() {
        let expression = cli.expression.join(" ");
        if !run_once(&expression, cli.details) {
            std::process::exit(1);
        }
        return Ok(());
    }

    match cli.mode {
        Mode::Tui => run_tui(),
        Mode::Line => run_line(),
    }
}

fn init_logging(cli: &Cli, interactive_tui: bool) -> Result<()> {
    let level = LevelFilter::from(cli.log_level);
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if interactive_tui => {}
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Prints the result (and steps when asked); returns false on error.
fn run_once(expression: &str, details: bool) -> bool {
    let mut trace = EvaluationTrace::new(details);
    match Calculator::new().calculate_traced(expression, &mut trace) {
        Ok(value) => {
            for (i, step) in trace.steps.iter().enumerate() {
                println!("Step {}: {} = {}", i + 1, step.operation, format_result(step.result));
            }
            println!("{}", format_result(value));
            true
        }
        Err(err) => {
            tracing::info!(%err, expression = %format_with_spaces(expression), "rejected");
            eprintln!("Error: {}", err);
            false
        }
    }
}

#[cfg(feature = "tui")]
fn run_tui() -> Result<()> {
    percent_calc::tui_mode::run_tui()
}

#[cfg(not(feature = "tui"))]
fn run_tui() -> Result<()> {
    anyhow::bail!("this build has no TUI mode; rebuild with `--features tui`")
}

#[cfg(feature = "line")]
fn run_line() -> Result<()> {
    percent_calc::line_mode::run_line()
}

#[cfg(not(feature = "line"))]
fn run_line() -> Result<()> {
    anyhow::bail!("this build has no line mode; rebuild with `--features line`")
}
