//! CLI argument definitions for the exchange tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ldx",
    version,
    about = "Layer definition exchange - move map layers between projects",
    long_about = "Move map layers between projects as portable definition document pairs.\n\n\
                  Exported layers carry their styling, relations, dependencies and layer\n\
                  tree placement; importing restores all of it into another project."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export layers and their dependencies as definition pairs.
    Export(ExportArgs),

    /// Import definition pairs into a project document.
    Import(ImportArgs),

    /// List the definition pairs in a directory.
    List(ListArgs),
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Path to the project document to export from.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Registry ids of the layers to export.
    #[arg(value_name = "LAYER_ID", required = true)]
    pub layers: Vec<String>,

    /// Directory for the definition pairs (default: definitions/ next to PROJECT).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Directory holding the definition pairs.
    #[arg(value_name = "DIR")]
    pub definitions_dir: PathBuf,

    /// Identities of the definitions to import.
    #[arg(value_name = "IDENTITY", required = true)]
    pub identities: Vec<String>,

    /// Project document to update; created when it does not exist.
    #[arg(long = "project", value_name = "PROJECT")]
    pub project: PathBuf,

    /// Rewrite imported datasources to connect through this service.
    #[arg(long = "service", value_name = "SERVICE")]
    pub service: Option<String>,

    /// Qt Linguist file used to translate layer names and field aliases.
    #[arg(long = "translations", value_name = "TS_FILE")]
    pub translations: Option<PathBuf>,

    /// Locale applied when translating (the first two letters pick the language).
    #[arg(long = "locale", value_name = "LOCALE", default_value = "en")]
    pub locale: String,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Directory holding the definition pairs.
    #[arg(value_name = "DIR")]
    pub definitions_dir: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
