//! cpp-header-model CLI entry point

use std::process::ExitCode;

use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use cpp_header_model::cli::{Cli, OutputFormat};
use cpp_header_model::{parse_header_with_options, HeaderModel, ModelError};

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> cpp_header_model::Result<String> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    // fail fast on a bad path before doing any parsing work
    for file in &cli.files {
        if !file.exists() {
            return Err(ModelError::FileNotFound {
                path: file.display().to_string(),
            });
        }
    }

    let models: Vec<HeaderModel> = cli
        .files
        .par_iter()
        .map(|file| parse_header_with_options(file, cli.print_ast))
        .collect::<cpp_header_model::Result<Vec<_>>>()?;

    // one file serializes as a single object, several as an array
    let output = match (cli.format, models.as_slice()) {
        (OutputFormat::Pretty, [single]) => to_json_pretty(single)?,
        (OutputFormat::Pretty, _) => to_json_pretty(&models)?,
        (OutputFormat::Json, [single]) => to_json(single)?,
        (OutputFormat::Json, _) => to_json(&models)?,
    };

    Ok(format!("{}\n", output))
}

fn to_json_pretty<T: serde::Serialize>(value: &T) -> cpp_header_model::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ModelError::ExtractionFailure {
        message: format!("JSON serialization failed: {}", e),
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> cpp_header_model::Result<String> {
    serde_json::to_string(value).map_err(|e| ModelError::ExtractionFailure {
        message: format!("JSON serialization failed: {}", e),
    })
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
