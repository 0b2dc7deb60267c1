use std::fs;

use img_intake::sequence::SequenceCounter;
use tempfile::tempdir;

#[test]
fn empty_library_starts_at_zero() {
    let td = tempdir().unwrap();
    let counter = SequenceCounter::scan_library(td.path()).unwrap();
    assert_eq!(counter.current(), 0);
}

#[test]
fn counter_resumes_from_highest_suffix() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("post-img01.png"), b"a").unwrap();
    fs::write(td.path().join("post-img03.jpg"), b"b").unwrap();
    fs::write(td.path().join("post-img02.gif"), b"c").unwrap();

    let counter = SequenceCounter::scan_library(td.path()).unwrap();
    assert_eq!(counter.current(), 3);
}

#[test]
fn foreign_names_are_ignored() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("banner.png"), b"x").unwrap();
    fs::write(td.path().join("post-img.png"), b"x").unwrap();
    fs::write(td.path().join("post-img5-draft.png"), b"x").unwrap();
    fs::write(td.path().join("post-img99.txt"), b"x").unwrap();
    fs::write(td.path().join("post-img02.png"), b"x").unwrap();

    let counter = SequenceCounter::scan_library(td.path()).unwrap();
    assert_eq!(counter.current(), 2);
}

#[test]
fn uppercase_extensions_still_count() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("post-img07.PNG"), b"x").unwrap();

    let counter = SequenceCounter::scan_library(td.path()).unwrap();
    assert_eq!(counter.current(), 7);
}

#[test]
fn suffixes_past_two_digits_are_honored() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("post-img104.webp"), b"x").unwrap();

    let mut counter = SequenceCounter::scan_library(td.path()).unwrap();
    assert_eq!(counter.current(), 104);
    assert_eq!(counter.next_file_name("png"), "post-img105.png");
}

#[test]
fn missing_library_directory_is_an_error() {
    let td = tempdir().unwrap();
    let gone = td.path().join("nope");
    assert!(SequenceCounter::scan_library(&gone).is_err());
}
