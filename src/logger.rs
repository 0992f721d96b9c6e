//! log4rs setup. Application messages go to `app.log`; access decisions logged through
//! [`audit!`](crate::audit) go to `audit.log` under the `consolecache::audit` target.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

pub const AUDIT_TARGET: &str = "consolecache::audit";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

/// Logs an access decision to the audit target.
#[macro_export]
macro_rules! audit {
    ($($arg:tt)*) => {
        log::info!(target: $crate::logger::AUDIT_TARGET, $($arg)*)
    };
}

/// Initializes logging from `log4rs.yaml` in the working directory.
///
/// # Errors
/// Returns an error if the file is missing or malformed, or a logger is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    init_file(Path::new("log4rs.yaml"))
}

/// Initializes logging from a log4rs YAML file.
///
/// # Errors
/// As for [`init`].
pub fn init_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder().build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?)
}

/// Builds the rolling-file configuration without installing it.
///
/// # Errors
/// Returns an error if the directory or the log files cannot be created.
pub fn build_config(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir.map_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")), PathBuf::from);
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, LevelFilter::Info))
        .build(Root::builder().appender("app").build(lvl))?;
    Ok(config)
}

/// Configures process-wide logging.
/// - dir: base directory for logs; current directory when `None`
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// Only the first successful call installs a logger; later calls are ignored.
///
/// # Errors
/// Returns an error if the directory or the log files cannot be created.
pub fn configure_logging(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, level, retention)?;
    if log4rs::init_config(config).is_err() {
        log::debug!("logger already installed");
    }
    Ok(())
}

/// Configures logging from `CONSOLECACHE_LOG_DIR`, `CONSOLECACHE_LOG_LEVEL` and `CONSOLECACHE_LOG_RETENTION`.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("CONSOLECACHE_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("CONSOLECACHE_LOG_LEVEL").ok();
    let retention = std::env::var("CONSOLECACHE_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("bogus")), LevelFilter::Info);
        assert_eq!(parse_level(None), LevelFilter::Info);
    }
}
