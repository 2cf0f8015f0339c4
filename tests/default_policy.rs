use routelog::options::LogOption;
use routelog::sink::Buffer;
use routelog::Logger;
use std::env;
use std::fs;

// The default file sink is relative to the working directory, so this file
// holds a single test.
#[test]
fn error_goes_to_stderr_and_default_file() {
    let dir = tempfile::tempdir().unwrap();
    env::set_current_dir(dir.path()).unwrap();

    let stdout = Buffer::new();
    let stderr = Buffer::new();
    let logger = Logger::new(vec![LogOption::console_sinks(stdout.clone(), stderr.clone())]).unwrap();
    logger.errorf(format_args!("disk full"));
    logger.sync().unwrap();

    assert!(stdout.contents().is_empty());
    let lines = stderr.lines();
    assert_eq!(lines.len(), 1);

    let file = fs::read_to_string(dir.path().join("logs").join("log.log")).unwrap();
    assert_eq!(file.lines().collect::<Vec<_>>(), lines);

    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["level"], "error");
    assert_eq!(value["msg"], "disk full");
    assert!(value["time"].is_string());
}
