use std::fs;

use img_intake::config::Config;
use tempfile::tempdir;

#[test]
fn valid_directories_pass() {
    let td = tempdir().unwrap();
    let watch = td.path().join("drop");
    let dest = td.path().join("library");
    fs::create_dir_all(&watch).unwrap();
    fs::create_dir_all(&dest).unwrap();

    let cfg = Config::new(&watch, &dest);
    cfg.validate().expect("validation should pass");
}

#[test]
fn missing_watch_dir_is_rejected() {
    let td = tempdir().unwrap();
    let watch = td.path().join("not-there");
    let dest = td.path().join("library");

    let cfg = Config::new(&watch, &dest);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("does not exist"));
}

#[test]
fn watch_dir_must_be_a_directory() {
    let td = tempdir().unwrap();
    let watch = td.path().join("actually-a-file");
    fs::write(&watch, b"x").unwrap();
    let dest = td.path().join("library");

    let cfg = Config::new(&watch, &dest);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("not a directory"));
}

#[test]
fn dest_dir_is_created_when_missing() {
    let td = tempdir().unwrap();
    let watch = td.path().join("drop");
    fs::create_dir_all(&watch).unwrap();
    let dest = td.path().join("deep").join("library");

    let cfg = Config::new(&watch, &dest);
    cfg.validate().expect("validation should create dest_dir");
    assert!(dest.is_dir());
}

#[test]
fn identical_directories_are_rejected() {
    let td = tempdir().unwrap();
    let dir = td.path().join("both");
    fs::create_dir_all(&dir).unwrap();

    let cfg = Config::new(&dir, &dir);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("same path"));
}

#[test]
fn dest_inside_watch_dir_is_allowed() {
    let td = tempdir().unwrap();
    let watch = td.path().join("drop");
    let dest = watch.join("library");
    fs::create_dir_all(&watch).unwrap();

    let cfg = Config::new(&watch, &dest);
    cfg.validate()
        .expect("nested destination is a supported layout");
    assert!(dest.is_dir());
}
