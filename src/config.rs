use crate::encoder::EncoderKind;
use crate::file::Rotation;
use crate::options::{self, LogOption};
use crate::types::{Severity, TimeZone};
use crate::{Build, Logger, LoggerBuilder, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration of a logger builder.
pub trait Config {
    /// Logger builder.
    type Builder: Build;

    /// Makes a logger builder associated with this configuration.
    fn try_to_builder(&self) -> Result<Self::Builder>;

    /// Builds a logger with this configuration.
    fn build_logger(&self) -> Result<Logger> {
        let builder = track!(self.try_to_builder())?;
        let logger = track!(builder.build())?;
        Ok(logger)
    }
}

/// The configuration of `LoggerBuilder`.
///
/// Omitted entries take the values of the default options.
///
/// # Examples
///
/// ```
/// use routelog::{Config, LoggerConfig};
///
/// let toml = r#"
/// level = "debug"
/// encoder = "console"
/// console_separator = "\t"
///
/// [file]
/// type = "rotating"
/// path = "/var/log/app/app.log"
/// max_size = 100
///
/// [fields]
/// service = "api"
/// "#;
/// let config: LoggerConfig = serdeconv::from_toml_str(toml).unwrap();
/// let builder = config.try_to_builder().unwrap();
/// assert_eq!(builder.options().len(), 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(default)]
pub struct LoggerConfig {
    /// Log level.
    pub level: Severity,

    /// `strftime`-like layout of timestamps.
    pub time_layout: String,

    /// Time Zone.
    pub timezone: TimeZone,

    /// Whether to disable the standard output and standard error sinks.
    pub disable_console: bool,

    /// Separator of console lines.
    pub console_separator: String,

    /// Encoder, `json` or `console`.
    pub encoder: EncoderKind,

    /// File sink.
    pub file: FileConfig,

    /// Fields attached to every record.
    pub fields: BTreeMap<String, String>,

    /// Whether `dpanic` records panic.
    pub development: bool,

    /// Minimum severity at which stacktraces are captured.
    pub stacktrace_level: Option<Severity>,
}
impl LoggerConfig {
    /// Creates a new `LoggerConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }
}
impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: options::DEFAULT_LEVEL,
            time_layout: options::RFC3339.to_owned(),
            timezone: TimeZone::default(),
            disable_console: options::DEFAULT_DISABLE_CONSOLE,
            console_separator: options::DEFAULT_CONSOLE_SEPARATOR.to_owned(),
            encoder: EncoderKind::default(),
            file: FileConfig::default(),
            fields: BTreeMap::new(),
            development: false,
            stacktrace_level: None,
        }
    }
}
impl Config for LoggerConfig {
    type Builder = LoggerBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = LoggerBuilder::new();
        builder.level(self.level);
        builder.time_layout(&self.time_layout);
        builder.timezone(self.timezone);
        builder.disable_console(self.disable_console);
        builder.console_separator(&self.console_separator);
        builder.encoder_kind(self.encoder);
        builder.option(self.file.to_option());
        builder.fields(&self.fields);
        builder.development(self.development);
        builder.stacktrace_level(self.stacktrace_level);
        Ok(builder)
    }
}

/// The configuration of the file sink.
///
/// The default value is a rotating file at `logs/log.log`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum FileConfig {
    /// No file sink.
    None,

    /// A plain append-mode file.
    Plain { path: PathBuf },

    /// A rotating file.
    Rotating {
        path: PathBuf,
        #[serde(flatten)]
        rotation: Rotation,
    },
}
impl FileConfig {
    fn to_option(&self) -> LogOption {
        match *self {
            FileConfig::None => LogOption::without_file(),
            FileConfig::Plain { ref path } => LogOption::file_writer(path.clone()),
            FileConfig::Rotating { ref path, rotation } => LogOption::rotation_file_writer(
                path.clone(),
                rotation.max_size,
                rotation.max_age,
                rotation.max_backups,
                rotation.compress,
            ),
        }
    }
}
impl Default for FileConfig {
    fn default() -> Self {
        FileConfig::Rotating {
            path: PathBuf::from(options::DEFAULT_FILE),
            rotation: Rotation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn defaults_match_default_options() {
        let config: LoggerConfig = serdeconv::from_toml_str("").unwrap();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.time_layout, options::RFC3339);
        assert_eq!(config.console_separator, " | ");
        assert_eq!(config.encoder, EncoderKind::Json);
        assert_eq!(config.file, FileConfig::default());
    }

    #[test]
    fn rotating_file_takes_default_rotation() {
        let toml = r#"
[file]
type = "rotating"
path = "a.log"
max_backups = 9
"#;
        let config: LoggerConfig = serdeconv::from_toml_str(toml).unwrap();
        assert_eq!(
            config.file,
            FileConfig::Rotating {
                path: PathBuf::from("a.log"),
                rotation: Rotation {
                    max_backups: 9,
                    ..Rotation::default()
                }
            }
        );
    }

    #[test]
    fn invalid_file_fails_to_build() {
        let toml = r#"
[file]
type = "plain"
path = ""
"#;
        let config: LoggerConfig = serdeconv::from_toml_str(toml).unwrap();
        let e = config.build_logger().err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn unknown_encoder_is_rejected_by_the_deserializer() {
        assert!(serdeconv::from_toml_str::<LoggerConfig>(r#"encoder = "xml""#).is_err());
    }
}
