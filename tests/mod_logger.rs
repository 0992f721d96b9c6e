use consolecache::logger::{self, AUDIT_TARGET};
use tempfile::tempdir;

#[test]
fn test_build_config_creates_log_dir() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("nested").join("logs");
    let config = logger::build_config(Some(&base), Some("debug"), Some(3)).unwrap();
    assert!(base.is_dir());
    assert!(base.join("app.log").exists());
    assert!(base.join("audit.log").exists());
    assert!(config.loggers().iter().any(|l| l.name() == AUDIT_TARGET));
    assert_eq!(config.root().level(), log::LevelFilter::Debug);
}

#[test]
fn test_configure_logging_routes_audit_messages() {
    let dir = tempdir().unwrap();
    logger::configure_logging(Some(dir.path()), Some("info"), None).unwrap();
    consolecache::audit!("read list enmasse.io/addresses namespace='ns': allowed");
    log::logger().flush();
    let audit = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
    assert!(audit.contains("namespace='ns': allowed"));
    let app = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
    assert!(!app.contains("namespace='ns'"));
}

#[test]
fn test_init_file_reports_bad_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log4rs.yaml");
    std::fs::write(&path, "appenders: [unclosed\n  root: {").unwrap();
    assert!(logger::init_file(&path).is_err());
    assert!(logger::init_file(&dir.path().join("missing.yaml")).is_err());
}
