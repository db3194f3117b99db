mod agent;
mod annotate;
mod configs;
mod converse;
mod display;

use std::path::{Path, PathBuf};

use clap::Parser;
use synth_dialogue::records::read_files_from_directory;

use crate::args::{CliArgs, Command};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let _logger = init_logging(&args.log_level, args.log_file.as_deref())?;

    match args.command {
        Command::Converse(converse) => converse::run_converse(converse).await,
        Command::Annotate(annotate) => annotate::run_annotate(annotate).await,
        Command::ConvConfigs(configs) => configs::run_conv_configs(configs),
        Command::AnnotatorConfigs(configs) => configs::run_annotator_configs(configs),
    }
}

/// A single file as given, or every `extension` file directly inside a directory.
fn collect_inputs(input: &Path, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_dir() {
        Ok(read_files_from_directory(input, extension)?)
    } else {
        Ok(vec![input.to_path_buf()])
    }
}

/// Logs each failure and turns any into an overall error.
fn summarize(kind: &str, results: Vec<anyhow::Result<PathBuf>>) -> anyhow::Result<()> {
    let total = results.len();
    let mut failures = 0;
    for result in results {
        match result {
            Ok(path) => log::info!("{kind} saved to {}", path.display()),
            Err(err) => {
                failures += 1;
                log::error!("{err:#}");
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {total} {kind}s failed");
    }
    Ok(())
}
