//! The rendered form of a log record, shared by encoders and hooks.
use crate::types::Severity;
use chrono::{DateTime, Local};
use slog::Record;
use std::backtrace::Backtrace;
use std::fmt;

/// A log record after rendering.
///
/// One `Entry` is created per emitted record. Every encoder and every hook
/// sees the same timestamp, caller and message.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    /// Severity of the record.
    pub severity: Severity,

    /// The time at which the record was emitted.
    pub time: DateTime<Local>,

    /// Dot-joined logger name, if the logger was derived by `Logger::named`.
    pub logger_name: Option<&'a str>,

    /// Source location of the logging call.
    pub caller: Caller,

    /// The formatted message.
    pub message: String,

    /// Captured stacktrace, present only at or above the configured stacktrace level.
    pub stack: Option<String>,
}
impl<'a> Entry<'a> {
    pub(crate) fn new(severity: Severity, record: &'a Record<'a>, capture_stack: bool) -> Self {
        let tag = record.tag();
        Entry {
            severity,
            time: Local::now(),
            logger_name: if tag.is_empty() { None } else { Some(tag) },
            caller: Caller {
                file: record.file(),
                line: record.line(),
            },
            message: record.msg().to_string(),
            stack: if capture_stack {
                Some(Backtrace::force_capture().to_string())
            } else {
                None
            },
        }
    }
}

/// Source location of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Source file path as reported by the compiler.
    pub file: &'static str,

    /// Line number.
    pub line: u32,
}
impl Caller {
    /// Returns the file path trimmed to its last directory and file name.
    pub fn short_file(&self) -> &'static str {
        let file = self.file;
        let mut separators = file.rmatch_indices(|c| c == '/' || c == '\\');
        match (separators.next(), separators.next()) {
            (Some(_), Some((i, _))) => &file[i + 1..],
            _ => file,
        }
    }
}
impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.short_file(), self.line)
    }
}
