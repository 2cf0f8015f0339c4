//! Standard stream sinks.
use crate::sink::{Locked, Sink};
use once_cell::sync::Lazy;
use std::io;
use std::sync::Arc;

static STDOUT: Lazy<Arc<Locked<io::Stdout>>> = Lazy::new(|| Arc::new(Locked::new(io::stdout())));
static STDERR: Lazy<Arc<Locked<io::Stderr>>> = Lazy::new(|| Arc::new(Locked::new(io::stderr())));

/// The standard stream to which log records will be outputted.
///
/// Each stream is wrapped once per process: every logger writing to the same
/// destination shares the same locked writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,

    /// Standard error.
    Stderr,
}
impl Destination {
    /// Returns the process-wide sink of this stream.
    pub fn to_sink(self) -> Arc<dyn Sink> {
        match self {
            Destination::Stdout => STDOUT.clone(),
            Destination::Stderr => STDERR.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_are_shared() {
        let a = Destination::Stdout.to_sink();
        let b = Destination::Stdout.to_sink();
        assert!(Arc::ptr_eq(&a, &b));

        let c = Destination::Stderr.to_sink();
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
