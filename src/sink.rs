//! Destinations of encoded log records.
use std::fmt::Debug;
use std::io::{self, Write};
use std::panic::RefUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

/// A byte-stream destination for encoded records.
///
/// A sink may be shared by several routes and several loggers, so it is
/// responsible for its own mutual exclusion: one call to `write_all` must
/// not interleave with another.
pub trait Sink: Send + Sync + RefUnwindSafe + Debug {
    /// Writes one encoded record.
    fn write_all(&self, buf: &[u8]) -> io::Result<()>;

    /// Flushes buffered data, if any.
    fn flush(&self) -> io::Result<()>;
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        (**self).write_all(buf)
    }
    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }
}

/// A [`Sink`] that serializes writes to an `io::Write` with a mutex.
///
/// [`Sink`]: trait.Sink.html
#[derive(Debug)]
pub struct Locked<W> {
    inner: Mutex<W>,
}
impl<W: Write> Locked<W> {
    /// Makes a new `Locked` instance.
    pub fn new(inner: W) -> Self {
        Locked {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> MutexGuard<W> {
        // A panic while holding the lock leaves at worst a partial line behind.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
impl<W: Write + Send + Debug> Sink for Locked<W> {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let mut inner = self.lock();
        inner.write_all(buf)?;
        inner.flush()
    }
    fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// An in-memory [`Sink`].
///
/// Clones share the same buffer, which makes it convenient for capturing
/// the output of a logger.
///
/// # Examples
///
/// ```
/// use routelog::options::LogOption;
/// use routelog::sink::Buffer;
/// use routelog::Logger;
///
/// let stdout = Buffer::new();
/// let stderr = Buffer::new();
/// let logger = Logger::new(vec![
///     LogOption::without_file(),
///     LogOption::console_sinks(stdout.clone(), stderr.clone()),
/// ])
/// .unwrap();
///
/// logger.infof(format_args!("Hello"));
/// assert!(stdout.contents().contains("Hello"));
/// assert!(stderr.contents().is_empty());
/// ```
///
/// [`Sink`]: trait.Sink.html
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    inner: Arc<Mutex<Vec<u8>>>,
}
impl Buffer {
    /// Makes a new empty `Buffer` instance.
    pub fn new() -> Self {
        Buffer::default()
    }

    /// Returns the written bytes as a (lossily decoded) string.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Returns a copy of the written bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Returns the written lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(ToOwned::to_owned).collect()
    }

    /// Discards the written bytes.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<Vec<u8>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
impl Sink for Buffer {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        self.lock().extend_from_slice(buf);
        Ok(())
    }
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
