use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

const ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const ROTATE_KEEP: usize = 5;

/// Starts logging to stderr, or to a rotating file when `log_file` is set.
/// The returned handle must stay alive for the duration of the program.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> anyhow::Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)?;
    let handle = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            let basename = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("synth-dialogue")
                .to_string();
            logger
                .log_to_file(FileSpec::default().directory(directory).basename(basename))
                .rotate(
                    Criterion::Size(ROTATE_SIZE),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(ROTATE_KEEP),
                )
                .start()?
        }
        None => logger.log_to_stderr().start()?,
    };
    Ok(handle)
}
