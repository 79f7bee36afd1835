//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "entityset",
    version,
    about = "Export stored entities as ARFF datasets",
    long_about = "Turn the entities of a JSON store into a Weka ARFF dataset.\n\n\
                  Scalar fields become numeric, string or date columns and \
                  many-to-one references become nominal columns whose categories \
                  are every entity of the referenced type."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
    /// Build the dataset of one entity type and write it as ARFF.
    Export(ExportArgs),

    /// Show the column plan of one entity type without exporting rows.
    Inspect(InspectArgs),

    /// List the entity types of a store with their record counts.
    Types(TypesArgs),
}

#[derive(Args)]
pub struct EntityArgs {
    /// Path to the JSON store document.
    #[arg(value_name = "STORE")]
    pub store: PathBuf,

    /// Entity type to export, by full or simple name.
    #[arg(long = "entity", short = 'e', value_name = "NAME")]
    pub entity: String,

    /// TOML build spec (options, extras, sentinels, labels, fan-outs).
    #[arg(long = "spec", value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// Drop repeated labels from reference domains.
    #[arg(long = "dedupe-domains")]
    pub dedupe_domains: bool,

    /// Encode null values as zero instead of marking them missing.
    #[arg(long = "keep-nulls")]
    pub keep_nulls: bool,

    /// Accept types that are not declared persistent.
    #[arg(long = "non-entity")]
    pub non_entity: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub entity: EntityArgs,

    /// Output ARFF file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Date format for date columns, as a Weka pattern and matching strftime format.
    #[arg(
        long = "date-format",
        value_names = ["PATTERN", "STRFTIME"],
        num_args = 2
    )]
    pub date_format: Option<Vec<String>>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub entity: EntityArgs,
}

#[derive(Args)]
pub struct TypesArgs {
    /// Path to the JSON store document.
    #[arg(value_name = "STORE")]
    pub store: PathBuf,
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
