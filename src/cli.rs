//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// C++ header semantic model extractor
#[derive(Parser, Debug)]
#[command(name = "cpp-header-model")]
#[command(about = "Extracts a class/property/method model from C++ headers as JSON")]
#[command(version)]
pub struct Cli {
    /// Header files to process
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty", value_enum)]
    pub format: OutputFormat,

    /// Print the parsed syntax tree to stderr (for debugging)
    #[arg(long)]
    pub print_ast: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON (default)
    #[default]
    Pretty,
    /// Compact single-line JSON
    Json,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
