//! Level routing of records to sinks.
use crate::encoder::Encoder;
use crate::entry::Entry;
use crate::hook::Hook;
use crate::options::{BuilderState, EncoderChoice};
use crate::sink::Sink;
use crate::types::Severity;
use crate::Result;
use chrono::Local;
use slog::{Drain, Key, Never, OwnedKV, OwnedKVList, Record, Serializer, KV};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The set of severities accepted by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enabler {
    /// `[min, Error)`.
    Low(Severity),

    /// At or above both `min` and `Error`.
    High(Severity),

    /// At or above `min`.
    AtLeast(Severity),
}
impl Enabler {
    pub(crate) fn enabled(self, severity: Severity) -> bool {
        match self {
            Enabler::Low(min) => severity >= min && severity < Severity::Error,
            Enabler::High(min) => severity >= min && severity >= Severity::Error,
            Enabler::AtLeast(min) => severity >= min,
        }
    }
}

#[derive(Debug)]
struct Route {
    enabler: Enabler,
    sink: Arc<dyn Sink>,
}

/// The routed pipeline shared by a logger and all of its named descendants.
#[derive(Debug)]
pub(crate) struct Pipeline {
    level: Severity,
    encoder: Arc<dyn Encoder>,
    routes: Vec<Route>,
    hooks: Vec<Hook>,
    error_output: Arc<dyn Sink>,
    development: bool,
    stacktrace_level: Option<Severity>,
}
impl Pipeline {
    fn new(state: BuilderState) -> Result<Self> {
        let config = state.encoder_config();
        let encoder = match state.encoder {
            EncoderChoice::Kind(kind) => kind.to_encoder(config),
            EncoderChoice::Custom(encoder) => encoder,
        };

        let level = state.level;
        let mut routes = Vec::new();
        if !state.disable_console {
            routes.push(Route {
                enabler: Enabler::Low(level),
                sink: Arc::clone(&state.stdout),
            });
            routes.push(Route {
                enabler: Enabler::High(level),
                sink: Arc::clone(&state.stderr),
            });
        }
        if let Some(ref spec) = state.file {
            let sink = track!(spec.open())?;
            routes.push(Route {
                enabler: Enabler::AtLeast(level),
                sink,
            });
        }

        Ok(Pipeline {
            level,
            encoder,
            routes,
            hooks: state.hooks,
            error_output: state.stderr,
            development: state.development,
            stacktrace_level: state.stacktrace_level,
        })
    }

    pub(crate) fn level(&self) -> Severity {
        self.level
    }

    pub(crate) fn development(&self) -> bool {
        self.development
    }

    /// Encodes the record once, writes it to every accepting sink and then runs the hooks.
    pub(crate) fn dispatch(&self, severity: Severity, record: &Record, values: &OwnedKVList) {
        let capture_stack = self
            .stacktrace_level
            .map_or(false, |min| severity >= min);
        let entry = Entry::new(severity, record, capture_stack);

        let mut targets = self
            .routes
            .iter()
            .filter(|r| r.enabler.enabled(severity))
            .peekable();
        if targets.peek().is_some() {
            let mut buf = Vec::with_capacity(256);
            match self.encoder.encode(&mut buf, &entry, record, values) {
                Ok(()) => {
                    for route in targets {
                        if let Err(e) = route.sink.write_all(&buf) {
                            self.report("write error", &e);
                        }
                    }
                }
                Err(e) => self.report("write error", &e),
            }
        }

        for hook in &self.hooks {
            if let Err(e) = hook.call(&entry) {
                self.report("hook error", &e);
            }
        }
    }

    /// Flushes every sink, returning the first failure.
    pub(crate) fn sync(&self) -> io::Result<()> {
        let mut result = Ok(());
        for route in &self.routes {
            if let Err(e) = route.sink.flush() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    fn report(&self, what: &str, error: &dyn fmt::Display) {
        let line = format!("{} {}: {}\n", Local::now().to_rfc3339(), what, error);
        // Nowhere left to report to.
        let _ = self.error_output.write_all(line.as_bytes());
    }
}
impl Drain for Pipeline {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, values: &OwnedKVList) -> ::std::result::Result<(), Never> {
        self.dispatch(Severity::from_level(record.level()), record, values);
        Ok(())
    }
}

/// The static fields of a logger.
#[derive(Debug, Clone)]
struct StaticFields(BTreeMap<String, String>);
impl KV for StaticFields {
    fn serialize(&self, _record: &Record, serializer: &mut dyn Serializer) -> slog::Result {
        for (key, value) in &self.0 {
            serializer.emit_str(Key::from(key.clone()), value)?;
        }
        Ok(())
    }
}

/// Builds the pipeline described by `state` and the root `slog` logger over it.
///
/// Opening the file sink happens here.
pub(crate) fn build(state: BuilderState) -> Result<(slog::Logger, Arc<Pipeline>)> {
    let fields = StaticFields(state.fields.clone());
    let pipeline = Arc::new(track!(Pipeline::new(state))?);
    let root = slog::Logger::root(Arc::clone(&pipeline), OwnedKV(fields));
    Ok((root, pipeline))
}
