//! Commonly used types.
use crate::{Error, ErrorKind};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use slog::Level;
use std::fmt;
use std::str::FromStr;

/// The severity of a log record.
///
/// Severities are totally ordered: `Debug < Info < Warn < Error < DPanic < Fatal`.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use routelog::types::Severity;
///
/// assert_eq!(Severity::default(), Severity::Info);
/// assert!(Severity::DPanic > Severity::Error);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,

    /// Panics in development mode, otherwise behaves like `Error`.
    DPanic,

    /// Terminates the process after the record has been written.
    Fatal,
}
impl Severity {
    /// Converts `Severity` to `Level`.
    ///
    /// `slog` has only one level above `Error`, so both `DPanic` and `Fatal` map to `Critical`.
    pub fn as_level(self) -> Level {
        match self {
            Severity::Debug => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warn => Level::Warning,
            Severity::Error => Level::Error,
            Severity::DPanic | Severity::Fatal => Level::Critical,
        }
    }

    /// Converts `Level` to `Severity`.
    ///
    /// Records logged through plain `slog` never terminate the process,
    /// hence `Critical` is mapped to `DPanic` rather than `Fatal`.
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Trace | Level::Debug => Severity::Debug,
            Level::Info => Severity::Info,
            Level::Warning => Severity::Warn,
            Level::Error => Severity::Error,
            Level::Critical => Severity::DPanic,
        }
    }

    /// Returns the lowercase name of this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::DPanic => "dpanic",
            Severity::Fatal => "fatal",
        }
    }
}
impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}
impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for Severity {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "dpanic" => Ok(Severity::DPanic),
            "fatal" => Ok(Severity::Fatal),
            _ => track_panic!(ErrorKind::Invalid, "Undefined severity: {:?}", s),
        }
    }
}

/// Time Zone.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use routelog::types::TimeZone;
///
/// assert_eq!(TimeZone::default(), TimeZone::Local);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZone {
    Utc,
    Local,
}
impl TimeZone {
    pub(crate) fn format(self, time: &DateTime<Local>, layout: &str) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let result = match self {
            TimeZone::Local => write!(s, "{}", time.format(layout)),
            TimeZone::Utc => write!(s, "{}", time.with_timezone(&Utc).format(layout)),
        };
        if result.is_err() {
            // Layouts are validated at construction, this is unreachable in practice.
            s.clear();
            s.push_str(&time.to_rfc3339());
        }
        s
    }
}
impl Default for TimeZone {
    fn default() -> Self {
        TimeZone::Local
    }
}
