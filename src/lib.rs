//! This crate provides a [slog](https://github.com/slog-rs/slog) based
//! logger that routes leveled records to the console and to a rotating file.
//!
//! A logger is built from a list of options applied, in order, after the
//! default options. Records below `error` go to the standard output,
//! records at or above it to the standard error, and every record at or
//! above the minimum severity to the file.
//!
//! # Examples
//!
//! Creates a logger from options:
//!
//! ```
//! use routelog::options::LogOption;
//! use routelog::types::Severity;
//! use routelog::Logger;
//!
//! let logger = Logger::new(vec![
//!     LogOption::level(Severity::Debug),
//!     LogOption::sample_encoder("console"),
//!     LogOption::console_separator("\t"),
//!     LogOption::without_file(),
//! ])
//! .unwrap();
//! logger.debugw("Hello World!", &[("key1", &"value")]);
//! ```
//!
//! Creates a logger from configuration text (TOML):
//!
//! ```
//! use routelog::{Config, LoggerConfig};
//!
//! let config: LoggerConfig = serdeconv::from_toml_str(r#"
//! level = "debug"
//! encoder = "console"
//!
//! [file]
//! type = "none"
//! "#).unwrap();
//!
//! let logger = config.build_logger().unwrap();
//! logger.infof(format_args!("Hello {}!", "World"));
//! ```
#![warn(missing_docs)]
#[cfg(test)]
#[macro_use]
extern crate slog;
#[macro_use]
extern crate trackable;

pub use build::{Build, LoggerBuilder};
pub use config::{Config, FileConfig, LoggerConfig};
pub use error::{Error, ErrorKind};
pub use logger::Logger;
pub use misc::set_stdlog_logger;

pub mod encoder;
pub mod entry;
pub mod file;
pub mod hook;
pub mod options;
pub mod sink;
pub mod terminal;
pub mod types;

mod build;
mod config;
mod error;
mod logger;
mod misc;
mod permissions;
mod router;

/// A specialized `Result` type for this crate.
pub type Result<T> = ::std::result::Result<T, Error>;
