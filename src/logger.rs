//! The logger facade.
use crate::error;
use crate::options::{BuilderState, LogOption};
use crate::router::{self, Pipeline};
use crate::types::Severity;
use crate::Result;
use slog::{BorrowedKV, Key, Record, RecordLocation, RecordStatic, Serializer, Value, KV};
use std::fmt;
use std::panic::Location;
use std::process;
use std::sync::Arc;

/// A routed, leveled logger.
///
/// Every severity has three call shapes:
///
/// - `xxxw`: a message followed by key-value pairs,
/// - `xxxf`: a message built with `format_args!`,
/// - `xxxln`: values joined by a single space.
///
/// Loggers are cheap to clone and can be shared between threads.
/// [`named`](#method.named) derives a logger that tags its records with a
/// name while sharing the sinks, fields and hooks of its parent.
///
/// # Examples
///
/// ```
/// use routelog::options::LogOption;
/// use routelog::Logger;
///
/// let logger = Logger::new(vec![LogOption::without_file()]).unwrap();
/// logger.infow("Hello", &[("user", &"alice"), ("attempt", &3)]);
/// logger.warnf(format_args!("{} retries left", 2));
/// logger.errorln(&[&"connection", &"lost"]);
///
/// let db = logger.named("db");
/// db.infof(format_args!("connected"));
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: slog::Logger,
    pipeline: Arc<Pipeline>,
    name: Option<Arc<str>>,
}

macro_rules! leveled {
    ($severity:expr, $name:literal, $w:ident, $f:ident, $ln:ident) => {
        #[doc = concat!("Logs a `", $name, "` record with a message and key-value pairs.")]
        #[track_caller]
        pub fn $w(&self, msg: &str, kvs: &[(&str, &dyn Value)]) {
            self.emit($severity, format_args!("{}", msg), &Pairs(kvs));
        }

        #[doc = concat!("Logs a `", $name, "` record with a formatted message.")]
        #[track_caller]
        pub fn $f(&self, args: fmt::Arguments) {
            self.emit($severity, args, &());
        }

        #[doc = concat!("Logs a `", $name, "` record whose message is the space-joined `values`.")]
        #[track_caller]
        pub fn $ln(&self, values: &[&dyn fmt::Display]) {
            self.emit($severity, format_args!("{}", Joined(values)), &());
        }
    };
}

impl Logger {
    /// Makes a new logger from the default options followed by `options`.
    ///
    /// Fails if an option is invalid or the file sink can not be opened.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = LogOption>,
    {
        let state = track!(BuilderState::resolve(options))?;
        track!(Logger::from_state(state))
    }

    /// Makes a new logger from a resolved state.
    pub fn from_state(state: BuilderState) -> Result<Self> {
        let (inner, pipeline) = track!(router::build(state))?;
        Ok(Logger {
            inner,
            pipeline,
            name: None,
        })
    }

    /// Returns a logger whose records carry `name`, appended to this logger's name with a dot.
    ///
    /// An empty `name` returns an equivalent logger.
    pub fn named(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let name: Arc<str> = match self.name {
            Some(ref parent) => format!("{}.{}", parent, name).into(),
            None => name.into(),
        };
        Logger {
            inner: self.inner.clone(),
            pipeline: Arc::clone(&self.pipeline),
            name: Some(name),
        }
    }

    /// Returns the name of this logger.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the minimum severity of records written to the sinks.
    pub fn level(&self) -> Severity {
        self.pipeline.level()
    }

    /// Returns the `slog` logger writing through the same routes.
    ///
    /// Records logged with `slog` macros take their tag (empty unless given
    /// with `#"tag"`) as the logger name, and `Critical` records are handled
    /// as `dpanic` without panicking.
    pub fn inner(&self) -> &slog::Logger {
        &self.inner
    }

    /// Flushes every sink.
    pub fn sync(&self) -> Result<()> {
        track!(self.pipeline.sync().map_err(error::other))
    }

    leveled!(Severity::Debug, "debug", debugw, debugf, debugln);
    leveled!(Severity::Info, "info", infow, infof, infoln);
    leveled!(Severity::Warn, "warn", warnw, warnf, warnln);
    leveled!(Severity::Error, "error", errorw, errorf, errorln);
    leveled!(Severity::DPanic, "dpanic", dpanicw, dpanicf, dpanicln);
    leveled!(Severity::Fatal, "fatal", fatalw, fatalf, fatalln);

    #[track_caller]
    fn emit(&self, severity: Severity, msg: fmt::Arguments, kv: &dyn KV) {
        let caller = Location::caller();
        let location = RecordLocation {
            file: caller.file(),
            line: caller.line(),
            column: caller.column(),
            function: "",
            module: "",
        };
        let rs = RecordStatic {
            location: &location,
            level: severity.as_level(),
            tag: self.name.as_deref().unwrap_or(""),
        };
        let record = Record::new(&rs, &msg, BorrowedKV(kv));
        self.pipeline.dispatch(severity, &record, self.inner.list());

        match severity {
            Severity::DPanic if self.pipeline.development() => panic!("{}", msg),
            Severity::Fatal => {
                let _ = self.pipeline.sync();
                process::exit(1);
            }
            _ => {}
        }
    }
}
impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .finish()
    }
}

struct Pairs<'a, 'b>(&'a [(&'b str, &'b dyn Value)]);
impl<'a, 'b> KV for Pairs<'a, 'b> {
    fn serialize(&self, record: &Record, serializer: &mut dyn Serializer) -> slog::Result {
        for &(key, value) in self.0 {
            value.serialize(record, Key::from(key.to_owned()), serializer)?;
        }
        Ok(())
    }
}

struct Joined<'a, 'b>(&'a [&'b dyn fmt::Display]);
impl<'a, 'b> fmt::Display for Joined<'a, 'b> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Hook;
    use crate::sink::Buffer;
    use std::sync::Mutex;
    use std::thread;

    fn logger_with(options: Vec<LogOption>) -> (Logger, Buffer, Buffer) {
        let stdout = Buffer::new();
        let stderr = Buffer::new();
        let mut all = vec![
            LogOption::without_file(),
            LogOption::console_sinks(stdout.clone(), stderr.clone()),
        ];
        all.extend(options);
        (Logger::new(all).unwrap(), stdout, stderr)
    }

    fn json(line: &str) -> serde_json::Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn call_shapes() {
        let (logger, stdout, _) = logger_with(vec![LogOption::level(Severity::Debug)]);
        logger.debugw("keyed", &[("a", &1), ("b", &"two"), ("c", &true)]);
        logger.infof(format_args!("formatted {}-{}", 1, 2));
        logger.warnln(&[&"joined", &3, &'x']);

        let lines = stdout.lines();
        assert_eq!(lines.len(), 3);

        let keyed = json(&lines[0]);
        assert_eq!(keyed["level"], "debug");
        assert_eq!(keyed["msg"], "keyed");
        assert_eq!(keyed["a"], 1);
        assert_eq!(keyed["b"], "two");
        assert_eq!(keyed["c"], true);

        assert_eq!(json(&lines[1])["msg"], "formatted 1-2");
        assert_eq!(json(&lines[2])["msg"], "joined 3 x");
        assert_eq!(json(&lines[2])["level"], "warn");
    }

    #[test]
    fn caller_is_the_call_site() {
        let (logger, stdout, _) = logger_with(vec![]);
        let line = line!() + 1;
        logger.infof(format_args!("here"));
        let caller = json(&stdout.lines()[0])["caller"].as_str().unwrap().to_owned();
        assert_eq!(caller, format!("src/logger.rs:{}", line));
    }

    #[test]
    fn named_loggers_join_names() {
        let (logger, stdout, _) = logger_with(vec![]);
        assert_eq!(logger.name(), None);
        assert_eq!(logger.named("").name(), None);

        let ab = logger.named("a").named("b");
        assert_eq!(ab.name(), Some("a.b"));
        assert_eq!(ab.named("").name(), Some("a.b"));

        ab.infof(format_args!("nested"));
        logger.named("a.b").infof(format_args!("flat"));
        logger.infof(format_args!("root"));

        let lines = stdout.lines();
        assert_eq!(json(&lines[0])["app"], "a.b");
        assert_eq!(json(&lines[1])["app"], "a.b");
        assert!(json(&lines[2]).get("app").is_none());
    }

    #[test]
    fn dpanic_is_an_error_outside_development() {
        let (logger, stdout, stderr) = logger_with(vec![]);
        logger.dpanicf(format_args!("not fatal"));
        assert!(stdout.contents().is_empty());
        assert_eq!(json(&stderr.lines()[0])["level"], "dpanic");
    }

    #[test]
    #[should_panic(expected = "in development")]
    fn dpanic_panics_in_development() {
        let (logger, _, _) = logger_with(vec![LogOption::development(true)]);
        logger.dpanicf(format_args!("in development"));
    }

    #[test]
    fn stacktraces_at_or_above_level() {
        let (logger, stdout, stderr) =
            logger_with(vec![LogOption::stacktrace_level(Some(Severity::Error))]);
        logger.infof(format_args!("no trace"));
        logger.errorf(format_args!("trace"));
        assert!(json(&stdout.lines()[0]).get("stacktrace").is_none());
        assert!(json(&stderr.lines()[0])["stacktrace"].is_string());
    }

    #[test]
    fn hooks_see_the_entry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let (logger, _, _) = logger_with(vec![LogOption::hooks(vec![Hook::new(move |entry| {
            let name = entry.logger_name.unwrap_or("").to_owned();
            s.lock()
                .unwrap()
                .push((entry.severity, name, entry.message.clone()));
            Ok(())
        })])]);

        logger.named("svc").debugw("below level", &[]);
        logger.errorln(&[&"a", &"b"]);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Severity::Debug, "svc".to_owned(), "below level".to_owned()),
                (Severity::Error, String::new(), "a b".to_owned()),
            ]
        );
    }

    #[test]
    fn shared_between_threads() {
        let (logger, stdout, _) = logger_with(vec![]);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let logger = logger.named(&format!("t{}", i));
                thread::spawn(move || {
                    for j in 0..25 {
                        logger.infow("tick", &[("j", &j)]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let lines = stdout.lines();
        assert_eq!(lines.len(), 100);
        for line in lines {
            assert_eq!(json(&line)["msg"], "tick");
        }
        logger.sync().unwrap();
    }
}
