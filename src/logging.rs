//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup. `RUST_LOG` wins over the level passed in.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::error::UploadError;

/// Initialise the global subscriber, writing to stderr and, when `log_dir`
/// is given, also to `hockey-upload.log` in that directory.
///
/// Keep the returned guard alive until exit so buffered file output is flushed.
pub fn init(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, UploadError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| UploadError::Config(format!("invalid log level '{level}': {e}")))?;

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| UploadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let appender = tracing_appender::rolling::never(dir, "hockey-upload.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(file_writer))
                .try_init()
                .map_err(|e| UploadError::Config(format!("failed to set subscriber: {e}")))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| UploadError::Config(format!("failed to set subscriber: {e}")))?;
            Ok(None)
        }
    }
}
