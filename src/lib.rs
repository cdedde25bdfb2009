pub mod config;
pub mod dispatch;
pub mod events;
pub mod session;
pub mod ui;

use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use config::{ConfigError, Settings};
use dispatch::GrammarError;
use session::SessionParser;
use ui::{JsonSink, OutputSink, TerminalRenderer, UiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub ascii: bool,
    pub print_time: Option<u64>,
    pub color: Option<ui::OutputMode>,
    pub json: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliParseError {
    MissingValue(String),
    InvalidPrintTime(String),
    InvalidColor(String),
    UnknownArgument(String),
}

impl Display for CliParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliParseError::MissingValue(flag) => write!(f, "{flag} requires a value"),
            CliParseError::InvalidPrintTime(value) => write!(
                f,
                "--print-time expects a non-negative number of milliseconds, got `{value}`"
            ),
            CliParseError::InvalidColor(value) => write!(
                f,
                "--color expects one of auto, always, never, got `{value}`"
            ),
            CliParseError::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliParseError {}

pub fn parse_command<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ascii" => parsed.ascii = true,
            "--json" => parsed.json = true,
            "--print-time" | "--print_time" => {
                let Some(value) = args.next() else {
                    return Err(CliParseError::MissingValue(arg));
                };
                let Ok(ms) = value.parse::<u64>() else {
                    return Err(CliParseError::InvalidPrintTime(value));
                };
                parsed.print_time = Some(ms);
            }
            "--color" => {
                let Some(value) = args.next() else {
                    return Err(CliParseError::MissingValue(arg));
                };
                let Some(mode) = ui::OutputMode::parse(&value) else {
                    return Err(CliParseError::InvalidColor(value));
                };
                parsed.color = Some(mode);
            }
            "--config" => {
                let Some(path) = args.next() else {
                    return Err(CliParseError::MissingValue(arg));
                };
                parsed.config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(CliParseError::UnknownArgument(other.to_owned())),
        }
    }

    Ok(Command::Run(parsed))
}

pub fn print_usage() {
    eprintln!(
        "gtest-pretty\n\nUSAGE:\n  <test binary> | gtest-pretty [OPTIONS]\n\nReads verbose googletest output on stdin and shows one live line per test case.\nOutput that is not a test marker is passed through unchanged.\n\nOPTIONS:\n  --ascii               Use ASCII status tokens instead of Unicode glyphs\n  --print-time <MS>     Only show case times of at least MS milliseconds (default 100)\n  --color <MODE>        auto, always or never (env: GTEST_PRETTY_COLOR, NO_COLOR)\n  --json                Write one JSON event per line instead of the live view\n  --config <PATH>       Read defaults for the options above from a TOML file\n\nGENERAL:\n  -h, --help            Print help\n"
    );
}

#[derive(Debug)]
pub enum AppError {
    Cli(CliParseError),
    Config(ConfigError),
    Grammar(GrammarError),
    Input(std::io::Error),
    Ui(UiError),
}

impl AppError {
    /// The reader of our output exited early, e.g. `| head`.
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            AppError::Ui(error) => error.is_broken_pipe(),
            _ => false,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Cli(err) => write!(f, "{err}"),
            AppError::Config(err) => write!(f, "{err}"),
            AppError::Grammar(err) => write!(f, "{err}"),
            AppError::Input(err) => write!(f, "failed to read input: {err}"),
            AppError::Ui(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<CliParseError> for AppError {
    fn from(value: CliParseError) -> Self {
        Self::Cli(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<GrammarError> for AppError {
    fn from(value: GrammarError) -> Self {
        Self::Grammar(value)
    }
}

impl From<UiError> for AppError {
    fn from(value: UiError) -> Self {
        Self::Ui(value)
    }
}

/// Feeds every line of `reader` to `parser`, terminators included, until EOF.
pub fn run<R, S>(mut reader: R, parser: &mut SessionParser<S>) -> Result<(), AppError>
where
    R: BufRead,
    S: OutputSink,
{
    let mut buf = Vec::new();
    let mut lines = 0usize;
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(AppError::Input)?;
        if read == 0 {
            break;
        }
        lines += 1;
        let line = String::from_utf8_lossy(&buf);
        parser.process(&line)?;
    }
    log::debug!("input exhausted after {lines} lines");
    Ok(())
}

/// Builds the sink `settings` ask for and streams `reader` through it.
pub fn execute<R, W>(
    reader: R,
    writer: W,
    color_enabled: bool,
    settings: &Settings,
) -> Result<W, AppError>
where
    R: BufRead,
    W: Write,
{
    if settings.json {
        let mut parser = SessionParser::new(JsonSink::new(writer))?;
        run(reader, &mut parser)?;
        return Ok(parser.into_sink().into_inner());
    }

    let renderer = TerminalRenderer::new(writer, color_enabled)
        .with_theme(settings.theme())
        .with_print_time(settings.print_time);
    let mut parser = SessionParser::new(renderer)?;
    run(reader, &mut parser)?;
    Ok(parser.into_sink().into_inner())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
