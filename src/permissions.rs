//! Cross platform functions to create log directories and files with restricted permissions.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Unix mode of created log directories (owner and group may read, write and traverse).
#[cfg(unix)]
const DIR_MODE: u32 = 0o770;

/// Unix mode of created log files (owner and group may read and write).
#[cfg(unix)]
const FILE_MODE: u32 = 0o660;

/// Creates `dir` and all of its missing parents.
pub fn create_log_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir)
}

/// Opens `path` for appending, creating it if needed.
pub fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_dirs_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        create_log_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // idempotent
        create_log_dir(&nested).unwrap();

        let path = nested.join("x.log");
        {
            use std::io::Write;
            open_append(&path).unwrap().write_all(b"foo\n").unwrap();
            open_append(&path).unwrap().write_all(b"bar\n").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "foo\nbar\n");
    }

    #[cfg(unix)]
    #[test]
    fn file_is_not_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        let file = open_append(&path).unwrap();
        let mode = file.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o007, 0);
    }
}
