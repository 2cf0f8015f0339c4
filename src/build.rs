use crate::encoder::{Encoder, EncoderKind};
use crate::hook::Hook;
use crate::options::{Loggable, LogOption};
use crate::sink::Sink;
use crate::types::{Severity, TimeZone};
use crate::{Logger, Result};
use std::path::PathBuf;
use std::process;

/// This trait allows to build a logger instance.
pub trait Build {
    /// Builds a logger.
    fn build(&self) -> Result<Logger>;

    /// Builds a logger, terminating the process if that fails.
    ///
    /// The error is printed to the standard error before exiting with status `1`.
    fn must_build(&self) -> Logger {
        match self.build() {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Cannot build a logger: {}", e);
                process::exit(1);
            }
        }
    }
}

/// A builder accumulating options, applied in insertion order after the default options.
///
/// # Examples
///
/// ```
/// use routelog::types::Severity;
/// use routelog::{Build, LoggerBuilder};
///
/// let mut builder = LoggerBuilder::new();
/// builder.level(Severity::Debug);
/// builder.console_separator("\t");
/// builder.without_file();
///
/// let logger = builder.build().unwrap();
/// logger.debugf(format_args!("Hello World!"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggerBuilder {
    options: Vec<LogOption>,
}
impl LoggerBuilder {
    /// Makes a new `LoggerBuilder` instance.
    pub fn new() -> Self {
        LoggerBuilder::default()
    }

    /// Appends an arbitrary option.
    pub fn option(&mut self, option: LogOption) -> &mut Self {
        self.options.push(option);
        self
    }

    /// Returns the options added so far.
    pub fn options(&self) -> &[LogOption] {
        &self.options
    }

    /// Sets the minimum severity.
    pub fn level(&mut self, severity: Severity) -> &mut Self {
        self.option(LogOption::level(severity))
    }

    /// Sets the `strftime`-like layout of timestamps.
    pub fn time_layout(&mut self, layout: &str) -> &mut Self {
        self.option(LogOption::time_layout(layout))
    }

    /// Sets the time zone of timestamps.
    pub fn timezone(&mut self, timezone: TimeZone) -> &mut Self {
        self.option(LogOption::timezone(timezone))
    }

    /// Enables or disables the console sinks.
    pub fn disable_console(&mut self, disable: bool) -> &mut Self {
        self.option(LogOption::disable_console(disable))
    }

    /// Sets the separator of console lines.
    pub fn console_separator(&mut self, sep: &str) -> &mut Self {
        self.option(LogOption::console_separator(sep))
    }

    /// Writes to a plain append-mode file.
    pub fn file<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.option(LogOption::file_writer(path))
    }

    /// Writes to a rotating file.
    pub fn rotation_file<P: Into<PathBuf>>(
        &mut self,
        path: P,
        max_size: u64,
        max_age: u64,
        max_backups: usize,
        compress: bool,
    ) -> &mut Self {
        self.option(LogOption::rotation_file_writer(
            path,
            max_size,
            max_age,
            max_backups,
            compress,
        ))
    }

    /// Removes the file sink.
    pub fn without_file(&mut self) -> &mut Self {
        self.option(LogOption::without_file())
    }

    /// Sets the encoder instance.
    pub fn encoder<E: Encoder + 'static>(&mut self, encoder: E) -> &mut Self {
        self.option(LogOption::encoder(encoder))
    }

    /// Selects a built-in encoder.
    pub fn encoder_kind(&mut self, kind: EncoderKind) -> &mut Self {
        self.option(LogOption::SampleEncoder(kind))
    }

    /// Sets the hooks.
    pub fn hooks<I: IntoIterator<Item = Hook>>(&mut self, hooks: I) -> &mut Self {
        self.option(LogOption::hooks(hooks))
    }

    /// Sets the static fields.
    pub fn fields<L: Loggable + ?Sized>(&mut self, source: &L) -> &mut Self {
        self.option(LogOption::fields(source))
    }

    /// Sets the sinks used in place of the standard output and standard error streams.
    pub fn console_sinks<O, E>(&mut self, stdout: O, stderr: E) -> &mut Self
    where
        O: Sink + 'static,
        E: Sink + 'static,
    {
        self.option(LogOption::console_sinks(stdout, stderr))
    }

    /// Enables or disables development mode.
    pub fn development(&mut self, development: bool) -> &mut Self {
        self.option(LogOption::development(development))
    }

    /// Sets the minimum severity at which stacktraces are captured.
    pub fn stacktrace_level(&mut self, level: Option<Severity>) -> &mut Self {
        self.option(LogOption::stacktrace_level(level))
    }
}
impl Build for LoggerBuilder {
    fn build(&self) -> Result<Logger> {
        track!(Logger::new(self.options.clone()))
    }
}
