use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use img_intake::watcher;
use tempfile::tempdir;

#[test]
fn new_file_is_forwarded() {
    let td = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let handle = watcher::spawn(td.path(), tx).expect("start watcher");

    // give the backend a moment to register the watch
    thread::sleep(Duration::from_millis(200));
    fs::write(td.path().join("shot.png"), b"data").unwrap();

    let path = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("watcher should forward the create event");
    assert!(path.ends_with("shot.png"));

    handle.stop();
}

#[test]
fn directories_are_not_forwarded() {
    let td = tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let handle = watcher::spawn(td.path(), tx).expect("start watcher");

    thread::sleep(Duration::from_millis(200));
    fs::create_dir(td.path().join("subdir")).unwrap();

    assert!(
        rx.recv_timeout(Duration::from_millis(800)).is_err(),
        "directory creation must not produce a candidate"
    );

    handle.stop();
}

#[test]
fn missing_directory_fails_fast() {
    let td = tempdir().unwrap();
    let gone = td.path().join("nope");
    let (tx, _rx) = mpsc::channel();
    assert!(watcher::spawn(&gone, tx).is_err());
}

#[test]
fn stop_returns_promptly() {
    let td = tempdir().unwrap();
    let (tx, _rx) = mpsc::channel();
    let handle = watcher::spawn(td.path(), tx).expect("start watcher");

    thread::sleep(Duration::from_millis(100));
    let start = std::time::Instant::now();
    handle.stop();
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "stop took too long"
    );
}
