//! Arguments, logging and output handling shared by all commands.

use super::Host;
use super::config::Config;
use crate::Result;
use crate::query::{QueryOutcome, Record};
use crate::reports::{generate_console, generate_csv, generate_json};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use directories::BaseDirs;
use ohno::IntoAppError;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

/// Name of the application directory under the platform data directory.
const APP_DIR_NAME: &str = "callejero";

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    #[must_use]
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_terminal,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// How query results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// An aligned table
    Console,

    /// A JSON array of objects
    Json,

    /// CSV with a header row
    Csv,
}

/// Arguments accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to configuration file (default is `callejero.toml` in the current directory)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding snapshots and downloads (default is the platform data directory)
    #[arg(long, value_name = "PATH", env = "CALLEJERO_DATA_DIR", global = true)]
    pub data_dir: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

/// Output arguments of the commands that print records
#[derive(Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, short = 'f', value_name = "FORMAT", default_value = "console")]
    pub format: OutputFormat,
}

/// Where a command keeps its files.
#[derive(Debug, Clone)]
pub struct DataDirs {
    root: PathBuf,
}

impl DataDirs {
    pub fn resolve(data_dir: Option<&Utf8Path>) -> Result<Self> {
        let root = if let Some(path) = data_dir {
            path.as_std_path().to_path_buf()
        } else {
            BaseDirs::new()
                .into_app_err("could not determine the data directory")?
                .data_dir()
                .join(APP_DIR_NAME)
        };
        Ok(Self { root })
    }

    /// Published snapshot versions and `CURRENT`.
    #[must_use]
    pub fn snapshots(&self) -> PathBuf {
        self.root.join("snapshots")
    }

    /// Downloads, extracted files and intermediate tables.
    #[must_use]
    pub fn work(&self) -> PathBuf {
        self.root.join("work")
    }
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Loads the configuration named by `--config`, or `callejero.toml` in the current directory.
pub fn load_config(args: &GlobalArgs) -> Result<Config> {
    Config::load(Utf8Path::new("."), args.config.as_deref())
}

/// Prints the records of a found outcome; any other outcome goes to the error stream and
/// sets the matching exit code.
pub fn emit<H: Host, R: Record>(host: &mut H, outcome: &QueryOutcome<R>, format: OutputFormat, color: ColorMode) -> Result<()> {
    let QueryOutcome::Found(records) = outcome else {
        let _ = writeln!(host.error(), "{outcome}");
        host.exit(outcome.exit_code());
        return Ok(());
    };

    match format {
        OutputFormat::Console => {
            let mut text = String::new();
            generate_console(records, color.enabled(std::io::stdout().is_terminal()), &mut text)?;
            let _ = write!(host.output(), "{text}");
        }
        OutputFormat::Json => {
            let mut text = String::new();
            generate_json(records, &mut text)?;
            let _ = write!(host.output(), "{text}");
        }
        OutputFormat::Csv => {
            let mut bytes = Vec::new();
            generate_csv(records, &mut bytes)?;
            let _ = host.output().write_all(&bytes);
        }
    }

    Ok(())
}
