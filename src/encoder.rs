//! Ways to render log records into bytes.
//!
//! See [`Encoder`] for more details.
//!
//! [`Encoder`]: trait.Encoder.html
use crate::entry::Entry;
use crate::types::TimeZone;
use crate::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use slog::{Key, OwnedKVList, Record, KV};
use std::fmt::{self, Debug};
use std::io::{self, Write};
use std::panic::RefUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;

/// A way to render a log record, with its structured data, into bytes.
///
/// The same encoder instance is shared by every sink of a logger, so
/// implementations must be usable from many threads at once.
pub trait Encoder: Sync + Send + RefUnwindSafe + Debug {
    /// Appends the encoded form of the record to `buf`, including the trailing line ending.
    ///
    /// `values` are the static fields of the logger, `record.kv()` the fields of the call.
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result;
}

impl<T: Encoder + ?Sized> Encoder for &T {
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result {
        Encoder::encode(&**self, buf, entry, record, values)
    }
}

impl<T: Encoder + ?Sized> Encoder for Box<T> {
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result {
        Encoder::encode(&**self, buf, entry, record, values)
    }
}

impl<T: Encoder + ?Sized> Encoder for Arc<T> {
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result {
        Encoder::encode(&**self, buf, entry, record, values)
    }
}

/// The rendering parameters shared by the built-in encoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// `strftime`-like layout of timestamps.
    pub time_layout: String,

    /// Time zone of timestamps.
    pub timezone: TimeZone,

    /// Separator placed between the elements of a console line.
    pub separator: String,
}
impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            time_layout: crate::options::RFC3339.to_owned(),
            timezone: TimeZone::default(),
            separator: crate::options::DEFAULT_CONSOLE_SEPARATOR.to_owned(),
        }
    }
}
impl EncoderConfig {
    fn format_time(&self, entry: &Entry) -> String {
        self.timezone.format(&entry.time, &self.time_layout)
    }
}

/// An [`Encoder`] producing one JSON object per line.
///
/// The header keys are emitted in the order `time`, `level`, `app` (only for
/// named loggers), `caller`, `msg` and `stacktrace` (only when captured),
/// followed by the logger's static fields and then the fields of the call.
///
/// # Example output
///
/// ```text
/// {"time":"2021-03-04T05:06:07+09:00","level":"info","caller":"src/main.rs:10","msg":"Hello","key1":"value1"}
/// ```
///
/// [`Encoder`]: trait.Encoder.html
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    config: EncoderConfig,
}
impl JsonEncoder {
    /// Makes a new `JsonEncoder` instance.
    pub fn new(config: EncoderConfig) -> Self {
        JsonEncoder { config }
    }
}
impl Encoder for JsonEncoder {
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result {
        let mut serializer = JsonSerializer { buf };
        serializer.open("time", &self.config.format_time(entry))?;
        serializer.string("level", entry.severity.as_str())?;
        if let Some(name) = entry.logger_name {
            serializer.string("app", name)?;
        }
        serializer.string("caller", &entry.caller.to_string())?;
        serializer.string("msg", &entry.message)?;
        if let Some(ref stack) = entry.stack {
            serializer.string("stacktrace", stack)?;
        }
        values.serialize(record, &mut serializer)?;
        record.kv().serialize(record, &mut serializer)?;
        serializer.buf.extend_from_slice(b"}\n");
        Ok(())
    }
}

struct JsonSerializer<'a> {
    buf: &'a mut Vec<u8>,
}
impl<'a> JsonSerializer<'a> {
    fn open(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.buf.push(b'{');
        self.json(&key)?;
        self.buf.push(b':');
        self.json(&value)
    }

    fn string(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.key(key)?;
        self.json(&value)
    }

    fn key(&mut self, key: &str) -> io::Result<()> {
        self.buf.push(b',');
        self.json(&key)?;
        self.buf.push(b':');
        Ok(())
    }

    fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut *self.buf, value).map_err(io::Error::from)
    }
}
macro_rules! emit_json {
    ($name:ident, $t:ty) => {
        fn $name(&mut self, key: Key, val: $t) -> slog::Result {
            self.key(key.as_ref())?;
            self.json(&val)?;
            Ok(())
        }
    };
}
impl<'a> slog::Serializer for JsonSerializer<'a> {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.key(key.as_ref())?;
        self.json(&val.to_string())?;
        Ok(())
    }

    fn emit_str(&mut self, key: Key, val: &str) -> slog::Result {
        self.string(key.as_ref(), val)?;
        Ok(())
    }

    fn emit_unit(&mut self, key: Key) -> slog::Result {
        self.key(key.as_ref())?;
        self.buf.extend_from_slice(b"null");
        Ok(())
    }

    fn emit_none(&mut self, key: Key) -> slog::Result {
        self.emit_unit(key)
    }

    emit_json!(emit_bool, bool);
    emit_json!(emit_char, char);
    emit_json!(emit_usize, usize);
    emit_json!(emit_isize, isize);
    emit_json!(emit_u8, u8);
    emit_json!(emit_i8, i8);
    emit_json!(emit_u16, u16);
    emit_json!(emit_i16, i16);
    emit_json!(emit_u32, u32);
    emit_json!(emit_i32, i32);
    emit_json!(emit_u64, u64);
    emit_json!(emit_i64, i64);
    emit_json!(emit_f32, f32);
    emit_json!(emit_f64, f64);
}

/// An [`Encoder`] producing human-readable lines.
///
/// The time, level, logger name (only for named loggers), caller and message
/// are joined by the configured separator. Each field follows as
/// `<separator>key<separator>value`. A captured stacktrace is written on the
/// lines after the record.
///
/// # Example output
///
/// With the separator `" | "`:
///
/// ```text
/// 2021-03-04T05:06:07+09:00 | info | src/main.rs:10 | Hello | key1 | value1
/// ```
///
/// [`Encoder`]: trait.Encoder.html
#[derive(Debug, Clone, Default)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}
impl ConsoleEncoder {
    /// Makes a new `ConsoleEncoder` instance.
    pub fn new(config: EncoderConfig) -> Self {
        ConsoleEncoder { config }
    }
}
impl Encoder for ConsoleEncoder {
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result {
        let sep = &self.config.separator;
        write!(
            buf,
            "{}{}{}",
            self.config.format_time(entry),
            sep,
            entry.severity
        )?;
        if let Some(name) = entry.logger_name {
            write!(buf, "{}{}", sep, name)?;
        }
        write!(buf, "{}{}{}{}", sep, entry.caller, sep, entry.message)?;
        {
            let mut serializer = ConsoleSerializer { buf: &mut *buf, sep };
            values.serialize(record, &mut serializer)?;
            record.kv().serialize(record, &mut serializer)?;
        }
        if let Some(ref stack) = entry.stack {
            write!(buf, "\n{}", stack.trim_end())?;
        }
        buf.push(b'\n');
        Ok(())
    }
}

struct ConsoleSerializer<'a> {
    buf: &'a mut Vec<u8>,
    sep: &'a str,
}
impl<'a> slog::Serializer for ConsoleSerializer<'a> {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        write!(self.buf, "{}{}{}{}", self.sep, key, self.sep, val)?;
        Ok(())
    }
}

/// An [`Encoder`] implementation that calls a closure to perform the encoding.
///
/// # Example
///
/// ```
/// use routelog::encoder::CustomEncoder;
/// use routelog::options::LogOption;
/// use routelog::Logger;
/// use std::io::Write;
///
/// let logger = Logger::new(vec![
///     LogOption::without_file(),
///     LogOption::encoder(CustomEncoder(|buf, entry, _, _| {
///         writeln!(buf, "[{}] {}", entry.severity, entry.message)?;
///         Ok(())
///     })),
/// ])
/// .unwrap();
/// logger.infof(format_args!("Hello {}", "World"));
/// ```
///
/// [`Encoder`]: trait.Encoder.html
pub struct CustomEncoder<T>(pub T)
where
    T: Fn(&mut Vec<u8>, &Entry, &Record, &OwnedKVList) -> slog::Result
        + Send
        + Sync
        + RefUnwindSafe;
impl<T> Encoder for CustomEncoder<T>
where
    T: Fn(&mut Vec<u8>, &Entry, &Record, &OwnedKVList) -> slog::Result
        + Send
        + Sync
        + RefUnwindSafe,
{
    fn encode(
        &self,
        buf: &mut Vec<u8>,
        entry: &Entry,
        record: &Record,
        values: &OwnedKVList,
    ) -> slog::Result {
        self.0(buf, entry, record, values)
    }
}
impl<T> Debug for CustomEncoder<T>
where
    T: Fn(&mut Vec<u8>, &Entry, &Record, &OwnedKVList) -> slog::Result
        + Send
        + Sync
        + RefUnwindSafe,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEncoder").finish()
    }
}

/// Enumeration of built-in encoders, selectable by name.
///
/// # Examples
///
/// ```
/// use routelog::encoder::EncoderKind;
///
/// assert_eq!(EncoderKind::default(), EncoderKind::Json);
/// assert_eq!("console".parse::<EncoderKind>().ok(), Some(EncoderKind::Console));
/// assert!("xml".parse::<EncoderKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    /// [`JsonEncoder`](struct.JsonEncoder.html).
    Json,

    /// [`ConsoleEncoder`](struct.ConsoleEncoder.html).
    Console,
}
impl EncoderKind {
    /// Makes the encoder of this kind.
    pub fn to_encoder(self, config: EncoderConfig) -> Arc<dyn Encoder> {
        match self {
            EncoderKind::Json => Arc::new(JsonEncoder::new(config)),
            EncoderKind::Console => Arc::new(ConsoleEncoder::new(config)),
        }
    }
}
impl Default for EncoderKind {
    fn default() -> Self {
        EncoderKind::Json
    }
}
impl FromStr for EncoderKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "json" => Ok(EncoderKind::Json),
            "console" => Ok(EncoderKind::Console),
            _ => track_panic!(ErrorKind::Invalid, "Undefined encoder: {:?}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use slog::{Level, RecordStatic};

    fn encode(encoder: &dyn Encoder, entry_name: Option<&str>, stack: bool) -> String {
        static RS: RecordStatic<'static> = record_static!(Level::Info, "");
        let values: OwnedKVList = o!("static" => "yes").into();
        let mut buf = Vec::new();
        encode_record(
            encoder,
            &mut buf,
            &Record::new(
                &RS,
                &format_args!("Hello, world!"),
                b!("key1" => "value1", "n" => 3),
            ),
            &values,
            entry_name,
            stack,
        );
        String::from_utf8(buf).unwrap()
    }

    fn encode_record(
        encoder: &dyn Encoder,
        buf: &mut Vec<u8>,
        record: &Record,
        values: &OwnedKVList,
        entry_name: Option<&str>,
        stack: bool,
    ) {
        let mut entry = Entry::new(Severity::Info, record, stack);
        entry.logger_name = entry_name;
        encoder
            .encode(buf, &entry, record, values)
            .expect("encoding failed");
    }

    #[test]
    fn json_shape() {
        let line = encode(&JsonEncoder::default(), Some("a.b"), false);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "info");
        assert_eq!(value["app"], "a.b");
        assert_eq!(value["msg"], "Hello, world!");
        assert_eq!(value["static"], "yes");
        assert_eq!(value["key1"], "value1");
        assert_eq!(value["n"], 3);
        assert!(value["time"].is_string());
        assert!(value["caller"].as_str().unwrap().contains("encoder.rs:"));
        assert!(value.get("stacktrace").is_none());

        // header keys come first, in a fixed order
        let time = line.find("\"time\"").unwrap();
        let level = line.find("\"level\"").unwrap();
        let msg = line.find("\"msg\"").unwrap();
        let key1 = line.find("\"key1\"").unwrap();
        assert!(time < level && level < msg && msg < key1);
    }

    #[test]
    fn json_escapes_and_stacktrace() {
        let line = encode(&JsonEncoder::default(), None, true);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("app").is_none());
        assert!(value["stacktrace"].is_string());
    }

    #[test]
    fn console_shape() {
        let config = EncoderConfig {
            separator: "\t".to_owned(),
            ..EncoderConfig::default()
        };
        let line = encode(&ConsoleEncoder::new(config), Some("svc"), false);
        let columns: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(columns[1], "info");
        assert_eq!(columns[2], "svc");
        assert!(columns[3].contains("encoder.rs:"));
        assert_eq!(columns[4], "Hello, world!");

        // static fields first, then the fields of the call in slog's serialization order
        assert_eq!(&columns[5..7], &["static", "yes"]);
        let mut call_fields: Vec<&[&str]> = columns[7..].chunks(2).collect();
        call_fields.sort();
        assert_eq!(call_fields, vec![&["key1", "value1"][..], &["n", "3"][..]]);
    }

    #[test]
    fn custom_time_layout() {
        let config = EncoderConfig {
            time_layout: "%Y".to_owned(),
            timezone: TimeZone::Utc,
            separator: " ".to_owned(),
        };
        let line = encode(&ConsoleEncoder::new(config), None, false);
        let year = line.split(' ').next().unwrap();
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }
}
