//! Handle lifetime tests: reference counting across clones, equality,
//! object classes, and downcasts.

use easyhdf5::{File, Node, ObjectType};
use tempfile::TempDir;

fn simple_file() -> (TempDir, File) {
    let dir = tempfile::tempdir().expect("unable to create temp dir");
    let file = File::create(dir.path().join("obj.h5")).unwrap();
    file.create_dataset_from("data", &vec![1.0f64, 2.0]).unwrap();
    (dir, file)
}

#[test]
fn clone_increments_and_drop_decrements_the_refcount() {
    let (_dir, file) = simple_file();
    let ds = file.dataset("data").unwrap();
    let before = ds.info().unwrap().ref_count();

    let copy = ds.clone();
    assert_eq!(copy.info().unwrap().ref_count(), before + 1);
    assert_eq!(ds.info().unwrap().ref_count(), before + 1);

    drop(copy);
    assert_eq!(ds.info().unwrap().ref_count(), before);
}

#[test]
fn clones_compare_equal_by_handle() {
    let (_dir, file) = simple_file();
    let ds = file.dataset("data").unwrap();
    let copy = ds.clone();
    assert_eq!(ds, copy);

    // A second open of the same path is a distinct handle.
    let reopened = file.dataset("data").unwrap();
    assert_ne!(ds, reopened);
}

#[test]
fn object_types_are_reported() {
    let (_dir, file) = simple_file();
    assert_eq!(file.object_type().unwrap(), ObjectType::File);

    let group = file.create_group("g").unwrap();
    assert_eq!(group.object_type().unwrap(), ObjectType::Group);

    let ds = file.dataset("data").unwrap();
    assert_eq!(ds.object_type().unwrap(), ObjectType::Dataset);
    assert_eq!(ds.space().unwrap().object_type().unwrap(), ObjectType::Dataspace);
    assert_eq!(ds.dtype().unwrap().object_type().unwrap(), ObjectType::Datatype);
}

#[test]
fn open_object_downcasts_by_class() {
    let (_dir, file) = simple_file();
    file.create_group("g").unwrap();

    let obj = file.object("g").unwrap();
    assert!(obj.into_group().is_ok());

    let obj = file.object("data").unwrap();
    let err = obj.into_group().unwrap_err();
    assert_eq!(err.kind(), easyhdf5::ErrorKind::Object);

    let obj = file.object("data").unwrap();
    let ds = obj.into_dataset().unwrap();
    assert_eq!(ds.read::<Vec<f64>>().unwrap(), vec![1.0, 2.0]);
}

#[test]
fn handles_stay_valid_while_any_clone_lives() {
    let (_dir, file) = simple_file();
    let ds = file.dataset("data").unwrap();
    let copy = ds.clone();
    drop(ds);

    assert!(copy.is_valid());
    assert_eq!(copy.read::<Vec<f64>>().unwrap(), vec![1.0, 2.0]);
}
