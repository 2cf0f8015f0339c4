use routelog::options::LogOption;
use routelog::sink::Buffer;
use routelog::{set_stdlog_logger, Logger};

#[test]
fn log_records_go_through_the_routes() {
    let stdout = Buffer::new();
    let stderr = Buffer::new();
    let logger = Logger::new(vec![
        LogOption::without_file(),
        LogOption::console_sinks(stdout.clone(), stderr.clone()),
    ])
    .unwrap();
    set_stdlog_logger(&logger).unwrap();

    log::info!("from log");
    log::error!("failed in log");

    assert!(stdout.contents().contains("from log"));
    assert!(stderr.contents().contains("failed in log"));
    assert!(set_stdlog_logger(&logger).is_err());
}
