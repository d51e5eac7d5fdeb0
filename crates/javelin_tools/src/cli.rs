//! CLI interface for javelin-tools

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "javelin")]
#[command(about = "Parse Javelin sources and inspect the parser tables")]
#[command(version)]
pub struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse source files and report problems
    Parse(ParseArgs),

    /// Print statistics about the LALR(1) tables
    Tables {
        /// List every resolved conflict
        #[arg(short, long)]
        conflicts: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
pub struct ParseArgs {
    /// Files to parse
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Skip method bodies
    #[arg(long)]
    pub diet: bool,

    /// Accept module descriptors
    #[arg(long)]
    pub module_info: bool,

    /// Stop at the first syntax error instead of recovering
    #[arg(long)]
    pub no_recovery: bool,

    /// Recover whole declarations only, never single statements
    #[arg(long)]
    pub no_statement_recovery: bool,

    /// Abort a file after this many problems
    #[arg(long)]
    pub max_problems: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Supported: text, json")),
        }
    }
}
