use std::fs;
use std::path::PathBuf;

use img_intake::config::types::LogLevel;
use img_intake::config::{load_config_from_xml_path, WATCH_DIR_DEFAULT};
use tempfile::tempdir;

#[test]
fn full_config_is_read() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        r#"<config>
  <watch_dir>/srv/drop</watch_dir>
  <dest_dir>/srv/library</dest_dir>
  <log_level>debug</log_level>
  <log_file>/var/log/img_intake.log</log_file>
</config>"#,
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.watch_dir, PathBuf::from("/srv/drop"));
    assert_eq!(cfg.dest_dir, PathBuf::from("/srv/library"));
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file, Some(PathBuf::from("/var/log/img_intake.log")));
}

#[test]
fn whitespace_around_values_is_trimmed() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        "<config>\n  <watch_dir>  /srv/drop  </watch_dir>\n  <dest_dir>\n    /srv/library\n  </dest_dir>\n</config>",
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.watch_dir, PathBuf::from("/srv/drop"));
    assert_eq!(cfg.dest_dir, PathBuf::from("/srv/library"));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        "<config>\n  <dest_dir>/srv/library</dest_dir>\n</config>",
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.watch_dir, PathBuf::from(WATCH_DIR_DEFAULT));
    assert_eq!(cfg.dest_dir, PathBuf::from("/srv/library"));
    assert_eq!(cfg.log_level, LogLevel::Normal);
}

#[test]
fn empty_log_file_means_default() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        "<config>\n  <log_file>   </log_file>\n</config>",
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    // blank value is treated as unset; the default path (if any) stays
    assert_ne!(cfg.log_file, Some(PathBuf::from("")));
}

#[test]
fn malformed_xml_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><watch_dir>/srv/drop").unwrap();

    assert!(load_config_from_xml_path(&cfg_path).is_err());
}

#[test]
fn unknown_fields_are_rejected() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        "<config>\n  <watch_dir>/srv/drop</watch_dir>\n  <surprise>1</surprise>\n</config>",
    )
    .unwrap();

    assert!(load_config_from_xml_path(&cfg_path).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("never-written.xml");
    assert!(load_config_from_xml_path(&cfg_path).is_err());
}
