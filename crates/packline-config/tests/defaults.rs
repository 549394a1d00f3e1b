//! Default values of a freshly loaded configuration.

use std::fs;
use std::path::PathBuf;

use packline_config::{ConfigDiscovery, PacklineConfig, UnmatchedPolicy, CONFIG_FILE};
use tempfile::TempDir;

#[test]
fn default_config_shape() {
    let config = PacklineConfig::default();

    assert!(config.entry.is_empty());
    assert_eq!(config.src_dir, PathBuf::from("src"));
    assert_eq!(config.output.path, PathBuf::from("build"));
    assert_eq!(config.output.filename, "js/[name].js");
    assert!(config.output.public_path.is_none());
    assert!(config.rules.is_empty());
    assert!(config.plugins.is_empty());
    assert_eq!(config.unmatched, UnmatchedPolicy::Warn);
    assert!(config.devtool.is_none());
}

#[test]
fn default_dev_section_matches_conventions() {
    let dev = PacklineConfig::default().dev;

    assert_eq!(dev.host, "127.0.0.1");
    assert_eq!(dev.port, 3000);
    assert!(dev.open);
    assert!(dev.hot);
    assert!(dev.compress);
    assert_eq!(dev.debounce_ms, 100);
}

#[test]
fn minimal_file_inherits_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE), "entry = [\"src/index.js\"]\n").unwrap();

    let config = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(config.entry, vec![PathBuf::from("src/index.js")]);
    assert_eq!(config.output.path, PathBuf::from("build"));
    assert_eq!(config.dev.port, 3000);
}
