//! Options and the state they are applied to.
//!
//! A logger is constructed by applying the [default options] and then the
//! caller's options, in order, to a fresh [`BuilderState`]. An option
//! overrides exactly one field of the state, so a later option always wins
//! over an earlier one.
//!
//! [default options]: fn.default_options.html
//! [`BuilderState`]: struct.BuilderState.html
use crate::encoder::{Encoder, EncoderConfig, EncoderKind};
use crate::file::{FileSpec, Rotation};
use crate::hook::Hook;
use crate::sink::Sink;
use crate::terminal::Destination;
use crate::types::{Severity, TimeZone};
use crate::{ErrorKind, Result};
use chrono::format::{Item, StrftimeItems};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::sync::Arc;

/// The default minimum severity.
pub const DEFAULT_LEVEL: Severity = Severity::Info;

/// `strftime`-like layout of RFC 3339 timestamps.
pub const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// The default separator of console lines.
pub const DEFAULT_CONSOLE_SEPARATOR: &str = " | ";

/// Whether the console sinks are disabled by default.
pub const DEFAULT_DISABLE_CONSOLE: bool = false;

/// The default path of the log file.
pub const DEFAULT_FILE: &str = "logs/log.log";

/// The default maximum size of the log file in megabytes.
///
/// This is a tunable, not an invariant: pass another value to
/// `LogOption::rotation_file_writer` to change it.
pub const DEFAULT_MAX_SIZE: u64 = 10;

/// The default number of days rotated files are retained.
pub const DEFAULT_MAX_AGE: u64 = 7;

/// The default number of rotated files that are retained.
pub const DEFAULT_MAX_BACKUPS: usize = 3;

/// Whether rotated files are compressed by default.
pub const DEFAULT_COMPRESS: bool = true;

/// A source of static fields.
pub trait Loggable {
    /// Returns the fields to attach to every record.
    fn loggable(&self) -> BTreeMap<String, String>;
}
impl Loggable for BTreeMap<String, String> {
    fn loggable(&self) -> BTreeMap<String, String> {
        self.clone()
    }
}
impl<S: BuildHasher> Loggable for HashMap<String, String, S> {
    fn loggable(&self) -> BTreeMap<String, String> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
impl<K: AsRef<str>, V: AsRef<str>> Loggable for [(K, V)] {
    fn loggable(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect()
    }
}
impl<K: AsRef<str>, V: AsRef<str>, const N: usize> Loggable for [(K, V); N] {
    fn loggable(&self) -> BTreeMap<String, String> {
        self[..].loggable()
    }
}

/// The encoder selected by the options.
#[derive(Debug, Clone)]
pub enum EncoderChoice {
    /// A built-in encoder, made at build time from the final time layout, time zone and separator.
    Kind(EncoderKind),

    /// An encoder instance supplied by the caller.
    Custom(Arc<dyn Encoder>),
}

/// The mutable state of a logger under construction.
///
/// It is created by [`BuilderState::resolve`] and consumed by the router.
///
/// [`BuilderState::resolve`]: #method.resolve
#[derive(Debug, Clone)]
pub struct BuilderState {
    pub(crate) level: Severity,
    pub(crate) time_layout: String,
    pub(crate) timezone: TimeZone,
    pub(crate) disable_console: bool,
    pub(crate) console_separator: String,
    pub(crate) encoder: EncoderChoice,
    pub(crate) file: Option<FileSpec>,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) stdout: Arc<dyn Sink>,
    pub(crate) stderr: Arc<dyn Sink>,
    pub(crate) development: bool,
    pub(crate) stacktrace_level: Option<Severity>,
}
impl BuilderState {
    /// Applies the default options and then `options`, in order.
    pub fn resolve<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = LogOption>,
    {
        let mut state = BuilderState::empty();
        for option in default_options().into_iter().chain(options) {
            track!(option.apply(&mut state))?;
        }
        Ok(state)
    }

    fn empty() -> Self {
        BuilderState {
            level: Severity::default(),
            time_layout: String::new(),
            timezone: TimeZone::default(),
            disable_console: false,
            console_separator: String::new(),
            encoder: EncoderChoice::Kind(EncoderKind::default()),
            file: None,
            hooks: Vec::new(),
            fields: BTreeMap::new(),
            stdout: Destination::Stdout.to_sink(),
            stderr: Destination::Stderr.to_sink(),
            development: false,
            stacktrace_level: None,
        }
    }

    /// Minimum severity of records written to the sinks.
    pub fn level(&self) -> Severity {
        self.level
    }

    /// Layout of timestamps.
    pub fn time_layout(&self) -> &str {
        &self.time_layout
    }

    /// Time zone of timestamps.
    pub fn timezone(&self) -> TimeZone {
        self.timezone
    }

    /// Whether the console sinks are disabled.
    pub fn disable_console(&self) -> bool {
        self.disable_console
    }

    /// Separator of console lines.
    pub fn console_separator(&self) -> &str {
        &self.console_separator
    }

    /// The selected encoder.
    pub fn encoder(&self) -> &EncoderChoice {
        &self.encoder
    }

    /// The file sink, if any.
    pub fn file(&self) -> Option<&FileSpec> {
        self.file.as_ref()
    }

    /// Number of registered hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Static fields.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Whether `DPanic` records panic.
    pub fn development(&self) -> bool {
        self.development
    }

    /// Minimum severity at which stacktraces are captured.
    pub fn stacktrace_level(&self) -> Option<Severity> {
        self.stacktrace_level
    }

    pub(crate) fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            time_layout: self.time_layout.clone(),
            timezone: self.timezone,
            separator: self.console_separator.clone(),
        }
    }
}

/// A configuration mutation of a logger under construction.
///
/// # Examples
///
/// ```
/// use routelog::options::LogOption;
/// use routelog::types::Severity;
/// use routelog::Logger;
///
/// let logger = Logger::new(vec![
///     LogOption::level(Severity::Debug),
///     LogOption::sample_encoder("console"),
///     LogOption::without_file(),
/// ])
/// .unwrap();
/// logger.debugw("Hello", &[("key1", &"value")]);
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub enum LogOption {
    /// Sets the minimum severity.
    Level(Severity),

    /// Sets the `strftime`-like layout of timestamps.
    TimeLayout(String),

    /// Sets the time zone of timestamps.
    Timezone(TimeZone),

    /// Enables or disables the console sinks.
    DisableConsole(bool),

    /// Sets the separator of console lines.
    ConsoleSeparator(String),

    /// Sets the file sink.
    File(FileSpec),

    /// Removes the file sink.
    WithoutFile,

    /// Sets the encoder instance.
    Encoder(Arc<dyn Encoder>),

    /// Selects a built-in encoder.
    SampleEncoder(EncoderKind),

    /// Selects a built-in encoder by name (`json` or `console`).
    SampleEncoderName(String),

    /// Sets the hooks.
    Hooks(Vec<Hook>),

    /// Sets the static fields.
    Fields(BTreeMap<String, String>),

    /// Sets the sinks used in place of the standard output and standard error streams.
    ///
    /// The second sink also receives the logger's own error reports.
    ConsoleSinks(Arc<dyn Sink>, Arc<dyn Sink>),

    /// Enables or disables development mode, in which `DPanic` records panic.
    Development(bool),

    /// Sets the minimum severity at which stacktraces are captured (`None` disables them).
    StacktraceLevel(Option<Severity>),
}
impl LogOption {
    /// Sets the minimum severity.
    pub fn level(level: Severity) -> Self {
        LogOption::Level(level)
    }

    /// Sets the `strftime`-like layout of timestamps.
    pub fn time_layout<S: Into<String>>(layout: S) -> Self {
        LogOption::TimeLayout(layout.into())
    }

    /// Sets the time zone of timestamps.
    pub fn timezone(timezone: TimeZone) -> Self {
        LogOption::Timezone(timezone)
    }

    /// Enables or disables the console sinks.
    pub fn disable_console(disable: bool) -> Self {
        LogOption::DisableConsole(disable)
    }

    /// Sets the separator of console lines.
    pub fn console_separator<S: Into<String>>(sep: S) -> Self {
        LogOption::ConsoleSeparator(sep.into())
    }

    /// Writes to a plain append-mode file.
    ///
    /// An empty path makes the construction fail.
    pub fn file_writer<P: Into<PathBuf>>(path: P) -> Self {
        LogOption::File(FileSpec::Plain(path.into()))
    }

    /// Writes to a rotating file.
    ///
    /// `max_size` is in megabytes, `max_age` in days.
    pub fn rotation_file_writer<P: Into<PathBuf>>(
        path: P,
        max_size: u64,
        max_age: u64,
        max_backups: usize,
        compress: bool,
    ) -> Self {
        LogOption::File(FileSpec::Rotating(
            path.into(),
            Rotation {
                max_size,
                max_age,
                max_backups,
                compress,
            },
        ))
    }

    /// Removes the file sink.
    pub fn without_file() -> Self {
        LogOption::WithoutFile
    }

    /// Sets the encoder instance.
    pub fn encoder<E: Encoder + 'static>(encoder: E) -> Self {
        LogOption::Encoder(Arc::new(encoder))
    }

    /// Selects a built-in encoder by name (`json` or `console`).
    ///
    /// An unknown name makes the construction fail.
    pub fn sample_encoder<S: Into<String>>(name: S) -> Self {
        LogOption::SampleEncoderName(name.into())
    }

    /// Sets the hooks.
    ///
    /// An empty list makes the construction fail.
    pub fn hooks<I: IntoIterator<Item = Hook>>(hooks: I) -> Self {
        LogOption::Hooks(hooks.into_iter().collect())
    }

    /// Sets the static fields.
    pub fn fields<L: Loggable + ?Sized>(source: &L) -> Self {
        LogOption::Fields(source.loggable())
    }

    /// Sets the sinks used in place of the standard output and standard error streams.
    pub fn console_sinks<O, E>(stdout: O, stderr: E) -> Self
    where
        O: Sink + 'static,
        E: Sink + 'static,
    {
        LogOption::ConsoleSinks(Arc::new(stdout), Arc::new(stderr))
    }

    /// Enables or disables development mode.
    pub fn development(development: bool) -> Self {
        LogOption::Development(development)
    }

    /// Sets the minimum severity at which stacktraces are captured.
    pub fn stacktrace_level(level: Option<Severity>) -> Self {
        LogOption::StacktraceLevel(level)
    }

    /// Applies this option to `state`.
    pub fn apply(self, state: &mut BuilderState) -> Result<()> {
        match self {
            LogOption::Level(level) => state.level = level,
            LogOption::TimeLayout(layout) => {
                track!(validate_time_layout(&layout))?;
                state.time_layout = layout;
            }
            LogOption::Timezone(timezone) => state.timezone = timezone,
            LogOption::DisableConsole(disable) => state.disable_console = disable,
            LogOption::ConsoleSeparator(sep) => state.console_separator = sep,
            LogOption::File(spec) => {
                track!(spec.validate())?;
                state.file = Some(spec);
            }
            LogOption::WithoutFile => state.file = None,
            LogOption::Encoder(encoder) => state.encoder = EncoderChoice::Custom(encoder),
            LogOption::SampleEncoder(kind) => state.encoder = EncoderChoice::Kind(kind),
            LogOption::SampleEncoderName(name) => {
                let kind = track!(name.parse::<EncoderKind>())?;
                state.encoder = EncoderChoice::Kind(kind);
            }
            LogOption::Hooks(hooks) => {
                track_assert!(!hooks.is_empty(), ErrorKind::Invalid, "hooks can not be empty");
                state.hooks = hooks;
            }
            LogOption::Fields(fields) => state.fields = fields,
            LogOption::ConsoleSinks(stdout, stderr) => {
                state.stdout = stdout;
                state.stderr = stderr;
            }
            LogOption::Development(development) => state.development = development,
            LogOption::StacktraceLevel(level) => state.stacktrace_level = level,
        }
        Ok(())
    }
}
impl fmt::Debug for LogOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LogOption::Level(ref x) => f.debug_tuple("Level").field(x).finish(),
            LogOption::TimeLayout(ref x) => f.debug_tuple("TimeLayout").field(x).finish(),
            LogOption::Timezone(ref x) => f.debug_tuple("Timezone").field(x).finish(),
            LogOption::DisableConsole(ref x) => f.debug_tuple("DisableConsole").field(x).finish(),
            LogOption::ConsoleSeparator(ref x) => {
                f.debug_tuple("ConsoleSeparator").field(x).finish()
            }
            LogOption::File(ref x) => f.debug_tuple("File").field(x).finish(),
            LogOption::WithoutFile => f.write_str("WithoutFile"),
            LogOption::Encoder(ref x) => f.debug_tuple("Encoder").field(x).finish(),
            LogOption::SampleEncoder(ref x) => f.debug_tuple("SampleEncoder").field(x).finish(),
            LogOption::SampleEncoderName(ref x) => {
                f.debug_tuple("SampleEncoderName").field(x).finish()
            }
            LogOption::Hooks(ref x) => f.debug_tuple("Hooks").field(&x.len()).finish(),
            LogOption::Fields(ref x) => f.debug_tuple("Fields").field(x).finish(),
            LogOption::ConsoleSinks(ref o, ref e) => {
                f.debug_tuple("ConsoleSinks").field(o).field(e).finish()
            }
            LogOption::Development(ref x) => f.debug_tuple("Development").field(x).finish(),
            LogOption::StacktraceLevel(ref x) => {
                f.debug_tuple("StacktraceLevel").field(x).finish()
            }
        }
    }
}

/// Returns the options applied before the caller's options.
///
/// Info level, RFC 3339 timestamps, `" | "` console separator, console
/// enabled, JSON encoder, and a rotating file at `logs/log.log` (10 MB,
/// 7 days, 3 backups, compressed).
pub fn default_options() -> Vec<LogOption> {
    vec![
        LogOption::level(DEFAULT_LEVEL),
        LogOption::time_layout(RFC3339),
        LogOption::disable_console(DEFAULT_DISABLE_CONSOLE),
        LogOption::console_separator(DEFAULT_CONSOLE_SEPARATOR),
        LogOption::SampleEncoder(EncoderKind::Json),
        LogOption::rotation_file_writer(
            DEFAULT_FILE,
            DEFAULT_MAX_SIZE,
            DEFAULT_MAX_AGE,
            DEFAULT_MAX_BACKUPS,
            DEFAULT_COMPRESS,
        ),
    ]
}

fn validate_time_layout(layout: &str) -> Result<()> {
    track_assert!(!layout.is_empty(), ErrorKind::Invalid, "time layout can not be empty");
    let invalid = StrftimeItems::new(layout).any(|item| matches!(item, Item::Error));
    track_assert!(!invalid, ErrorKind::Invalid, "Invalid time layout: {:?}", layout);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Buffer;

    #[test]
    fn defaults() {
        let state = BuilderState::resolve(vec![]).unwrap();
        assert_eq!(state.level(), Severity::Info);
        assert_eq!(state.time_layout(), RFC3339);
        assert_eq!(state.console_separator(), " | ");
        assert!(!state.disable_console());
        assert!(!state.development());
        assert_eq!(state.stacktrace_level(), None);
        assert!(matches!(
            state.encoder(),
            EncoderChoice::Kind(EncoderKind::Json)
        ));
        assert_eq!(
            state.file(),
            Some(&FileSpec::Rotating(
                PathBuf::from("logs/log.log"),
                Rotation {
                    max_size: 10,
                    max_age: 7,
                    max_backups: 3,
                    compress: true,
                }
            ))
        );
        assert_eq!(state.hook_count(), 0);
        assert!(state.fields().is_empty());
    }

    #[test]
    fn later_options_override_earlier_ones() {
        let state = BuilderState::resolve(vec![
            LogOption::level(Severity::Debug),
            LogOption::console_separator("\t"),
            LogOption::sample_encoder("console"),
            LogOption::level(Severity::Warn),
            LogOption::file_writer("a.log"),
            LogOption::without_file(),
        ])
        .unwrap();
        assert_eq!(state.level(), Severity::Warn);
        assert_eq!(state.console_separator(), "\t");
        assert!(matches!(
            state.encoder(),
            EncoderChoice::Kind(EncoderKind::Console)
        ));
        assert_eq!(state.file(), None);
    }

    #[test]
    fn invalid_options_fail_fast() {
        let cases = vec![
            LogOption::file_writer(""),
            LogOption::rotation_file_writer("", 1, 1, 1, false),
            LogOption::rotation_file_writer("a.log", 0, 1, 1, false),
            LogOption::hooks(vec![]),
            LogOption::sample_encoder("xml"),
            LogOption::time_layout(""),
            LogOption::time_layout("%Y-%"),
        ];
        for option in cases {
            let e = BuilderState::resolve(vec![option.clone()]).err();
            let e = e.unwrap_or_else(|| panic!("{:?} should fail", option));
            assert_eq!(*e.kind(), ErrorKind::Invalid, "{:?}", option);
        }
    }

    #[test]
    fn fields_from_loggable_sources() {
        let state =
            BuilderState::resolve(vec![LogOption::fields(&[("name", "robin")])]).unwrap();
        assert_eq!(state.fields().get("name").map(String::as_str), Some("robin"));

        let mut map = HashMap::new();
        map.insert("a".to_owned(), "1".to_owned());
        map.insert("b".to_owned(), "2".to_owned());
        let state = BuilderState::resolve(vec![LogOption::fields(&map)]).unwrap();
        assert_eq!(state.fields().len(), 2);
    }

    #[test]
    fn console_sinks_and_hooks() {
        let state = BuilderState::resolve(vec![
            LogOption::console_sinks(Buffer::new(), Buffer::new()),
            LogOption::hooks(vec![Hook::new(|_| Ok(())), Hook::new(|_| Ok(()))]),
        ])
        .unwrap();
        assert_eq!(state.hook_count(), 2);
        assert!(format!("{:?}", state.stdout).contains("Buffer"));
    }
}
