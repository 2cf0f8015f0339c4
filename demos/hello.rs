#[macro_use]
extern crate slog;
#[macro_use]
extern crate trackable;

use clap::{Arg, Command};
use routelog::{Config, LoggerConfig};

fn main() {
    let matches = Command::new("hello")
        .arg(Arg::new("CONFIG_FILE").index(1).required(true))
        .get_matches();
    let config_file = matches
        .get_one::<String>("CONFIG_FILE")
        .expect("required argument");

    let config: LoggerConfig = track_try_unwrap!(serdeconv::from_toml_file(config_file));
    let logger = track_try_unwrap!(config.build_logger());

    logger.infow("Hello", &[("config", &config_file.as_str())]);
    logger.named("demo").warnln(&[&"Hello", &"again"]);
    info!(logger.inner(), "Hello from slog"; "macro" => true);
    track_try_unwrap!(logger.sync());
}
