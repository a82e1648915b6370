use std::fs;
use std::time::{Duration, SystemTime};

use super::output::write_if_changed;

#[test]
fn writes_new_file_and_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gen/usb_descriptors.c");

    assert!(write_if_changed(&path, "a").unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a");
}

#[test]
fn identical_contents_leave_the_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usb_descriptors.h");
    fs::write(&path, "same").unwrap();
    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(old)
        .unwrap();

    assert!(!write_if_changed(&path, "same").unwrap());
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), old);
}

#[test]
fn changed_contents_are_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usb_descriptors.d");
    fs::write(&path, "old").unwrap();

    assert!(write_if_changed(&path, "new").unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
}
