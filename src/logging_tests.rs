use super::*;

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.log_level, Level::INFO);
    assert!(!config.json_format);
    assert!(config.log_dir.ends_with("logs"));
}

#[test]
fn test_log_config_default_log_dir_contains_gridbase() {
    let config = LogConfig::default();
    let path_str = config.log_dir.to_string_lossy();
    assert!(path_str.contains(".gridbase"));
}

#[test]
fn test_parse_rotation_hourly() {
    let rotation = parse_rotation("hourly");
    // Rotation doesn't impl PartialEq, so use debug
    let debug = format!("{rotation:?}");
    assert!(debug.contains("Hourly") || debug.contains("hourly") || debug.contains("3600"));
}

#[test]
fn test_parse_rotation_never() {
    let rotation = parse_rotation("never");
    let debug = format!("{rotation:?}");
    assert!(debug.contains("Never") || debug.contains("never"));
}

#[test]
fn test_parse_rotation_unknown_defaults_to_daily() {
    let rotation = parse_rotation("weekly");
    let debug = format!("{rotation:?}");
    let daily = format!("{:?}", parse_rotation("daily"));
    assert_eq!(debug, daily);
}

#[test]
fn test_log_filename_constant() {
    assert_eq!(LOG_FILENAME, "gridbase-core.log");
}

#[test]
fn test_init_logging_creates_log_dir() {
    use tempfile::tempdir;

    let temp = tempdir().expect("should create temp dir");
    let log_dir = temp.path().join("logs");
    let config = LogConfig {
        log_dir: log_dir.clone(),
        ..LogConfig::default()
    };
    init_logging(config).expect("logging init should succeed");
    assert!(log_dir.exists());
}
