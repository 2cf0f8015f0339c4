//! File sinks.
use crate::permissions::{create_log_dir, open_append};
use crate::sink::{Locked, Sink};
use crate::error;
use crate::{ErrorKind, Result};
use libflate::gzip;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

const MEGABYTE: u64 = 1024 * 1024;
const DAY_SECS: u64 = 24 * 60 * 60;

/// The rotation policy of a file sink.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use routelog::file::Rotation;
///
/// let rotation = Rotation::default();
/// assert_eq!(rotation.max_size, 10);
/// assert_eq!(rotation.max_age, 7);
/// assert_eq!(rotation.max_backups, 3);
/// assert!(rotation.compress);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    /// Maximum size of the current file in megabytes before it gets rotated.
    pub max_size: u64,

    /// Maximum number of days to retain a rotated file (`0` retains regardless of age).
    pub max_age: u64,

    /// Maximum number of rotated files to retain (`0` retains all of them).
    pub max_backups: usize,

    /// Whether rotated files are compressed with gzip.
    pub compress: bool,
}
impl Default for Rotation {
    fn default() -> Self {
        Rotation {
            max_size: crate::options::DEFAULT_MAX_SIZE,
            max_age: crate::options::DEFAULT_MAX_AGE,
            max_backups: crate::options::DEFAULT_MAX_BACKUPS,
            compress: crate::options::DEFAULT_COMPRESS,
        }
    }
}

/// The file sink of a logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSpec {
    /// A plain append-mode file.
    Plain(PathBuf),

    /// A file rotated by size, with retention by age and count.
    Rotating(PathBuf, Rotation),
}
impl FileSpec {
    /// Returns the path of the (current) log file.
    pub fn path(&self) -> &Path {
        match *self {
            FileSpec::Plain(ref path) | FileSpec::Rotating(ref path, _) => path,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        track_assert!(
            !self.path().as_os_str().is_empty(),
            ErrorKind::Invalid,
            "file path can not be empty"
        );
        if let FileSpec::Rotating(_, ref rotation) = *self {
            track_assert!(
                rotation.max_size > 0,
                ErrorKind::Invalid,
                "max size of {:?} must be positive",
                self.path()
            );
        }
        Ok(())
    }

    /// Creates the parent directories, opens the file and wraps it into a sink.
    pub(crate) fn open(&self) -> Result<Arc<dyn Sink>> {
        track!(self.validate())?;
        let rotation = match *self {
            FileSpec::Plain(_) => None,
            FileSpec::Rotating(_, rotation) => Some(rotation),
        };
        let appender = track!(
            FileAppender::new(self.path(), rotation).map_err(error::other),
            "path={:?}",
            self.path()
        )?;
        Ok(Arc::new(Locked::new(appender)))
    }
}

#[derive(Debug)]
struct RotationState {
    max_bytes: u64,
    max_age: Option<Duration>,
    max_backups: usize,
    compress: bool,
    backup_name: Regex,
}

/// An append-mode file writer, optionally rotating the file.
///
/// The file is reopened when it has been removed or renamed by someone else.
#[derive(Debug)]
pub struct FileAppender {
    path: PathBuf,
    file: Option<File>,
    written_size: u64,
    rotation: Option<RotationState>,
}
impl FileAppender {
    /// Makes a new `FileAppender` instance and opens the file eagerly.
    pub fn new<P: AsRef<Path>>(path: P, rotation: Option<Rotation>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let rotation = match rotation {
            None => None,
            Some(r) => {
                let file_name = path
                    .file_name()
                    .ok_or_else(|| {
                        io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name")
                    })?
                    .to_string_lossy();
                let pattern = format!(r"^{}\.(\d+)(\.gz)?$", regex::escape(&file_name));
                let backup_name = Regex::new(&pattern)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                Some(RotationState {
                    max_bytes: r.max_size.saturating_mul(MEGABYTE),
                    max_age: if r.max_age == 0 {
                        None
                    } else {
                        Some(Duration::from_secs(r.max_age.saturating_mul(DAY_SECS)))
                    },
                    max_backups: r.max_backups,
                    compress: r.compress,
                    backup_name,
                })
            }
        };
        let mut appender = FileAppender {
            path,
            file: None,
            written_size: 0,
            rotation,
        };
        appender.reopen_if_needed()?;
        Ok(appender)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn reopen_if_needed(&mut self) -> io::Result<()> {
        if self.file.is_none() || !self.path.exists() {
            create_log_dir(self.dir())?;
            let file = open_append(&self.path)?;
            self.written_size = file.metadata()?.len();
            self.file = Some(file);
        }
        Ok(())
    }

    fn needs_rotation(&self, incoming: usize) -> bool {
        match self.rotation {
            Some(ref r) => {
                self.written_size > 0 && self.written_size + incoming as u64 > r.max_bytes
            }
            None => false,
        }
    }

    fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        if compressed {
            name.push(".gz");
        }
        PathBuf::from(name)
    }

    /// Returns the rotated files, newest first.
    fn backups(&self) -> io::Result<Vec<Backup>> {
        let rotation = match self.rotation {
            Some(ref r) => r,
            None => return Ok(Vec::new()),
        };
        let mut backups = Vec::new();
        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(captures) = rotation.backup_name.captures(&name) {
                if let Ok(index) = captures[1].parse() {
                    backups.push(Backup {
                        index,
                        compressed: captures.get(2).is_some(),
                        path: entry.path(),
                    });
                }
            }
        }
        backups.sort_by(|a, b| b.index.cmp(&a.index));
        Ok(backups)
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        let (max_backups, compress) = match self.rotation {
            Some(ref r) => (r.max_backups, r.compress),
            None => return Ok(()),
        };

        for backup in self.backups()? {
            let next = backup.index + 1;
            if max_backups != 0 && next > max_backups {
                fs::remove_file(&backup.path)?;
            } else {
                fs::rename(&backup.path, self.backup_path(next, backup.compressed))?;
            }
        }

        let first = self.backup_path(1, false);
        fs::rename(&self.path, &first)?;
        if compress {
            compress_file(&first, &self.backup_path(1, true))?;
        }
        self.written_size = 0;
        self.remove_expired_backups()
    }

    fn remove_expired_backups(&self) -> io::Result<()> {
        let max_age = match self.rotation {
            Some(RotationState {
                max_age: Some(max_age),
                ..
            }) => max_age,
            _ => return Ok(()),
        };
        let now = SystemTime::now();
        for backup in self.backups()? {
            let modified = fs::metadata(&backup.path)?.modified()?;
            let expired = now
                .duration_since(modified)
                .map(|age| age > max_age)
                .unwrap_or(false);
            if expired {
                fs::remove_file(&backup.path)?;
            }
        }
        Ok(())
    }
}
impl Write for FileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.reopen_if_needed()?;
        if self.needs_rotation(buf.len()) {
            self.rotate()?;
            self.reopen_if_needed()?;
        }
        if let Some(ref mut f) = self.file {
            f.write_all(buf)?;
            self.written_size += buf.len() as u64;
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Cannot open file: {:?}", self.path),
            ))
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(ref mut f) = self.file {
            f.flush()?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Backup {
    index: usize,
    compressed: bool,
    path: PathBuf,
}

fn compress_file(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = File::open(src)?;
    let mut encoder = gzip::Encoder::new(File::create(dst)?)?;
    io::copy(&mut input, &mut encoder)?;
    encoder.finish().into_result()?;
    fs::remove_file(src)
}
