use routelog::options::LogOption;
use routelog::{Build, Logger, LoggerBuilder};
use std::env;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

// Set in the child process; holds the directory the child writes into.
const CHILD_DIR: &str = "ROUTELOG_EXIT_TEST_DIR";

fn run_as_child(test: &str, dir: &Path) -> Output {
    Command::new(env::current_exe().unwrap())
        .args(&["--exact", test, "--nocapture", "--test-threads=1"])
        .env(CHILD_DIR, dir)
        .output()
        .unwrap()
}

#[test]
fn fatal_writes_then_exits_with_status_one() {
    if let Some(dir) = env::var_os(CHILD_DIR) {
        let logger = Logger::new(vec![
            LogOption::disable_console(true),
            LogOption::file_writer(Path::new(&dir).join("fatal.log")),
        ])
        .unwrap();
        logger.fatalf(format_args!("bye"));
        panic!("fatal returned");
    }

    let dir = tempfile::tempdir().unwrap();
    let output = run_as_child("fatal_writes_then_exits_with_status_one", dir.path());
    assert_eq!(output.status.code(), Some(1));

    let content = fs::read_to_string(dir.path().join("fatal.log")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["level"], "fatal");
    assert_eq!(value["msg"], "bye");
}

#[test]
fn must_build_exits_on_invalid_options() {
    if env::var_os(CHILD_DIR).is_some() {
        let mut builder = LoggerBuilder::new();
        builder.file("");
        let _ = builder.must_build();
        panic!("must_build returned");
    }

    let dir = tempfile::tempdir().unwrap();
    let output = run_as_child("must_build_exits_on_invalid_options", dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot build a logger"), "{}", stderr);
}
