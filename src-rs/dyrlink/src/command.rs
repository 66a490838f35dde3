use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dyrlink dynamic-data resolver CLI
#[derive(Parser)]
#[command(name = "dyrlink")]
#[command(version, about = "Resolve PSS/E dynamic-data records into linked devices", long_about = None)]
pub struct CliCommand {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a record file into a device index
    Import {
        /// Path to the JSON record file
        #[arg(value_name = "RECORDS")]
        records: PathBuf,

        /// Path to a JSON file of devices registered before the first record
        #[arg(long, value_name = "FILE")]
        seed: Option<PathBuf>,

        /// Stop at the first record that fails to resolve
        #[arg(long)]
        strict: bool,

        /// Stop once this many records have failed
        #[arg(long, value_name = "N")]
        max_failures: Option<usize>,

        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the registered rule sets
    Schema {
        /// Print only the rule set for this model type
        #[arg(value_name = "MODEL")]
        model: Option<String>,

        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Where rule sets come from
#[derive(Args)]
pub struct SchemaArgs {
    /// Path to a JSON file of additional groups and rule sets
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Do not register the builtin rule sets
    #[arg(long)]
    pub no_builtins: bool,
}

/// How output is printed
#[derive(Args)]
pub struct OutputArgs {
    /// Print the output in debug format
    #[arg(long)]
    pub print_debug: bool,

    /// Disable colors in the output
    #[arg(long)]
    pub no_colors: bool,

    /// Minimum level of log messages written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
