use crate::error;
use crate::{Logger, Result};

/// Sets the logger for the log records emitted via `log` crate.
///
/// The logger becomes the `slog-scope` global logger for the rest of the
/// process, so records emitted by `log` macros go through its routes. The
/// target of a `log` record becomes its logger name.
/// Calling this function twice fails, as `log` accepts a single logger.
pub fn set_stdlog_logger(logger: &Logger) -> Result<()> {
    let guard = slog_scope::set_global_logger(logger.inner().clone());
    guard.cancel_reset();
    track!(slog_stdlog::init().map_err(error::other))
}
