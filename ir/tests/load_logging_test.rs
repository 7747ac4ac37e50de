#![cfg(test)]

use std::fs;

use protoboil_ir::{Config, Ir};
use tempfile::TempDir;
use tracing::info;

#[test]
fn test_load_sends_events_to_the_configured_file() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        logging_file: "logs/boil.log".to_string(),
        path:         dir.path().to_path_buf(),
        ..Config::default()
    };
    let snapshot = config.snapshot_path();
    Ir::new(config).save(&snapshot).unwrap();

    let log = dir.path().join("logs").join("boil.log");
    fs::create_dir_all(log.parent().unwrap()).unwrap();
    fs::write(&log, "INFO from the plugin\n").unwrap();

    let ir = Ir::load(&snapshot).unwrap();
    assert!(ir.snapshot_path().is_some());
    info!("generator says hello");

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.starts_with("INFO from the plugin\n"), "{}", text);
    assert!(text.contains("generator says hello"), "{}", text);
}
