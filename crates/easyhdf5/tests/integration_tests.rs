//! End-to-end tests against a real native library: dataset and attribute
//! round-trips for nested containers, zero-copy-eligible data, strings,
//! chunked+compressed layouts, references, and error-kind coverage.
//!
//! These tests create scratch files under a temporary directory and
//! require a working HDF5 installation.

use easyhdf5::{
    AccessMode, Annotate, DatasetCreateProps, Dataspace, DataspaceClass, DatatypeClass, ErrorKind,
    File, Node, ObjectReference,
};
use tempfile::TempDir;

fn scratch(name: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("unable to create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

// ---------------------------------------------------------------------------
// 1. Dataset round-trips
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_vec_f64() {
    let (_dir, path) = scratch("vec_f64.h5");
    let original = vec![1.1f64, 2.2, 3.3, 4.4, 5.5];
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("data", &original).unwrap();
    }
    let file = File::open(&path).unwrap();
    let values: Vec<f64> = file.dataset("data").unwrap().read().unwrap();
    assert_eq!(values, original);
}

#[test]
fn roundtrip_nested_two_by_three() {
    // Row 0 lands before row 1; each row keeps its column order.
    let (_dir, path) = scratch("nested.h5");
    let original = vec![vec![1.0f64, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("table", &original).unwrap();
    }
    let file = File::open(&path).unwrap();
    let ds = file.dataset("table").unwrap();
    assert_eq!(ds.shape().unwrap(), vec![2, 3]);

    // Flat row-major content, via the 1-D view of the same data.
    let flat: Vec<f64> = {
        let mut out = vec![0.0f64; 6];
        let view: &mut [f64] = &mut out;
        // rank 1 cannot pair with the 2-D dataspace
        assert!(ds.read_into(view).is_err());
        let nested: Vec<Vec<f64>> = ds.read().unwrap();
        nested.into_iter().flatten().collect()
    };
    assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    let back: Vec<Vec<f64>> = ds.read().unwrap();
    assert_eq!(back, original);
}

#[test]
fn roundtrip_fixed_size_arrays() {
    let (_dir, path) = scratch("arrays.h5");
    let original = [[1i32, 2, 3], [4, 5, 6]];
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("matrix", &original).unwrap();
    }
    let file = File::open(&path).unwrap();
    let back: [[i32; 3]; 2] = file.dataset("matrix").unwrap().read().unwrap();
    assert_eq!(back, original);
}

#[test]
fn roundtrip_scalar_dataset() {
    let (_dir, path) = scratch("scalar.h5");
    {
        let file = File::create(&path).unwrap();
        let space = Dataspace::scalar().unwrap();
        let ds = file.create_dataset::<f64>("answer", &space).unwrap();
        ds.write(&42.5f64).unwrap();
    }
    let file = File::open(&path).unwrap();
    let ds = file.dataset("answer").unwrap();
    assert_eq!(ds.space().unwrap().class().unwrap(), DataspaceClass::Scalar);
    let value: f64 = ds.read().unwrap();
    assert_eq!(value, 42.5);
}

#[test]
fn roundtrip_integer_types() {
    let (_dir, path) = scratch("ints.h5");
    let signed = vec![i64::MIN, -1, 0, 1, i64::MAX];
    let unsigned = vec![0u16, 1, u16::MAX];
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("signed", &signed).unwrap();
        file.create_dataset_from("unsigned", &unsigned).unwrap();
    }
    let file = File::open(&path).unwrap();
    assert_eq!(file.dataset("signed").unwrap().read::<Vec<i64>>().unwrap(), signed);
    assert_eq!(file.dataset("unsigned").unwrap().read::<Vec<u16>>().unwrap(), unsigned);
}

#[test]
fn read_converts_between_scalar_types() {
    // The native library converts stored f64 to requested f32.
    let (_dir, path) = scratch("convert.h5");
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("data", &vec![1.5f64, 2.5]).unwrap();
    }
    let file = File::open(&path).unwrap();
    let values: Vec<f32> = file.dataset("data").unwrap().read().unwrap();
    assert_eq!(values, vec![1.5f32, 2.5]);
}

#[test]
fn read_into_existing_slice() {
    let (_dir, path) = scratch("read_into.h5");
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("data", &vec![7.0f64, 8.0, 9.0]).unwrap();
    }
    let file = File::open(&path).unwrap();
    let ds = file.dataset("data").unwrap();

    let mut target = [0.0f64; 3];
    let view: &mut [f64] = &mut target;
    ds.read_into(view).unwrap();
    assert_eq!(target, [7.0, 8.0, 9.0]);
}

#[test]
fn empty_dataset_roundtrip() {
    let (_dir, path) = scratch("empty.h5");
    {
        let file = File::create(&path).unwrap();
        let space = Dataspace::simple(&[0]).unwrap();
        let ds = file.create_dataset::<f64>("empty", &space).unwrap();
        ds.write(&Vec::<f64>::new()).unwrap();
    }
    let file = File::open(&path).unwrap();
    let values: Vec<f64> = file.dataset("empty").unwrap().read().unwrap();
    assert!(values.is_empty());
}

// ---------------------------------------------------------------------------
// 2. ndarray round-trips
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_ndarray_2d() {
    let (_dir, path) = scratch("nd2.h5");
    let original = ndarray::arr2(&[[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("grid", &original).unwrap();
    }
    let file = File::open(&path).unwrap();
    let back: ndarray::Array2<f64> = file.dataset("grid").unwrap().read().unwrap();
    assert_eq!(back, original);
}

#[test]
fn write_strided_ndarray_view() {
    let (_dir, path) = scratch("ndview.h5");
    let base = ndarray::arr2(&[[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let view = base.slice(ndarray::s![.., ..;2]);
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("cols", &view).unwrap();
    }
    let file = File::open(&path).unwrap();
    let back: ndarray::Array2<f64> = file.dataset("cols").unwrap().read().unwrap();
    assert_eq!(back, ndarray::arr2(&[[1.0, 3.0], [4.0, 6.0]]));
}

#[test]
fn roundtrip_ndarray_dynamic_rank() {
    let (_dir, path) = scratch("nddyn.h5");
    let original = ndarray::ArrayD::<i32>::from_shape_vec(
        ndarray::IxDyn(&[2, 2, 2]),
        vec![1, 2, 3, 4, 5, 6, 7, 8],
    )
    .unwrap();
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("cube", &original).unwrap();
    }
    let file = File::open(&path).unwrap();
    let back: ndarray::ArrayD<i32> = file.dataset("cube").unwrap().read().unwrap();
    assert_eq!(back, original);
}

// ---------------------------------------------------------------------------
// 3. Groups and links
// ---------------------------------------------------------------------------

#[test]
fn nested_groups_and_paths() {
    let (_dir, path) = scratch("groups.h5");
    {
        let file = File::create(&path).unwrap();
        let sensors = file.create_group("sensors").unwrap();
        sensors
            .create_dataset_from("temperature", &vec![20.5f64, 21.0])
            .unwrap();
        // Intermediate groups come into being on demand.
        file.create_group("a/b/c").unwrap();
    }
    let file = File::open(&path).unwrap();
    let values: Vec<f64> = file.dataset("sensors/temperature").unwrap().read().unwrap();
    assert_eq!(values, vec![20.5, 21.0]);
    assert!(file.group("a/b/c").is_ok());
    assert!(file.exists("sensors").unwrap());
    assert!(!file.exists("nonexistent").unwrap());
}

#[test]
fn unlink_and_rename() {
    let (_dir, path) = scratch("links.h5");
    let file = File::create(&path).unwrap();
    file.create_dataset_from("old", &vec![1.0f64]).unwrap();
    assert_eq!(file.num_objects().unwrap(), 1);

    file.rename("old", "renamed/new").unwrap();
    assert!(!file.exists("old").unwrap());
    let values: Vec<f64> = file.dataset("renamed/new").unwrap().read().unwrap();
    assert_eq!(values, vec![1.0]);

    file.unlink("renamed/new").unwrap();
    assert!(!file.exists("renamed/new").unwrap());
}

// ---------------------------------------------------------------------------
// 4. Attributes
// ---------------------------------------------------------------------------

#[test]
fn attributes_on_all_holders() {
    let (_dir, path) = scratch("attrs.h5");
    {
        let file = File::create(&path).unwrap();
        file.write_attr("version", &3i64).unwrap();

        let group = file.create_group("g").unwrap();
        group.write_attr("coords", &vec![1.0f64, 2.0, 3.0]).unwrap();

        let ds = file.create_dataset_from("d", &vec![0.0f64]).unwrap();
        ds.write_str_attr("units", "meters").unwrap();
    }
    let file = File::open(&path).unwrap();
    let version: i64 = file.attr("version").unwrap().read().unwrap();
    assert_eq!(version, 3);

    let coords: Vec<f64> = file.group("g").unwrap().attr("coords").unwrap().read().unwrap();
    assert_eq!(coords, vec![1.0, 2.0, 3.0]);

    let units = file.dataset("d").unwrap().attr("units").unwrap().read_string().unwrap();
    assert_eq!(units, "meters");
}

#[test]
fn attribute_management() {
    let (_dir, path) = scratch("attr_mgmt.h5");
    let file = File::create(&path).unwrap();
    file.write_attr("a", &1i32).unwrap();
    file.write_attr("b", &2i32).unwrap();

    assert!(file.has_attr("a").unwrap());
    assert_eq!(file.attr_names().unwrap(), vec!["a", "b"]);

    file.delete_attr("a").unwrap();
    assert!(!file.has_attr("a").unwrap());
    assert_eq!(file.attr_names().unwrap(), vec!["b"]);
}

#[test]
fn attribute_shape_mismatch_is_a_dataspace_error() {
    let (_dir, path) = scratch("attr_shape.h5");
    let file = File::create(&path).unwrap();
    let space = Dataspace::simple(&[3]).unwrap();
    let attr = file.create_attr::<f64>("vals", &space).unwrap();
    let err = attr.write(&vec![1.0f64, 2.0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dataspace);
}

// ---------------------------------------------------------------------------
// 5. Strings
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_string_dataset() {
    let (_dir, path) = scratch("strings.h5");
    let names = ["alpha", "beta", "gamma"];
    {
        let file = File::create(&path).unwrap();
        let space = Dataspace::simple(&[3]).unwrap();
        let ds = file.create_str_dataset("names", &space).unwrap();
        ds.write_strings(&names).unwrap();
    }
    let file = File::open(&path).unwrap();
    let ds = file.dataset("names").unwrap();
    assert_eq!(ds.dtype().unwrap().class().unwrap(), DatatypeClass::String);
    assert_eq!(ds.read_strings().unwrap(), names);
}

#[test]
fn string_count_mismatch_is_a_dataspace_error() {
    let (_dir, path) = scratch("strcount.h5");
    let file = File::create(&path).unwrap();
    let space = Dataspace::simple(&[2]).unwrap();
    let ds = file.create_str_dataset("names", &space).unwrap();
    let err = ds.write_strings(&["only-one"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dataspace);
}

// ---------------------------------------------------------------------------
// 6. Chunking, compression, resizing
// ---------------------------------------------------------------------------

#[test]
fn chunked_deflate_roundtrip() {
    let (_dir, path) = scratch("chunked.h5");
    let original: Vec<f64> = (0..10_000).map(|i| (i % 17) as f64).collect();
    {
        let file = File::create(&path).unwrap();
        let space = Dataspace::simple(&[10_000]).unwrap();
        let props = DatasetCreateProps::new()
            .unwrap()
            .chunk(&[1_000])
            .unwrap()
            .shuffle()
            .unwrap()
            .deflate(6)
            .unwrap();
        assert_eq!(props.chunk_dims(), Some(vec![1_000]));
        let ds = file
            .create_dataset_with::<f64>("data", &space, &props)
            .unwrap();
        ds.write(&original).unwrap();
    }
    let file = File::open(&path).unwrap();
    let ds = file.dataset("data").unwrap();
    assert_eq!(ds.read::<Vec<f64>>().unwrap(), original);
    // Repetitive data compresses well below its raw 80 kB.
    assert!(ds.storage_size() < 40_000);
}

#[test]
fn resize_extendable_dataset() {
    let (_dir, path) = scratch("resize.h5");
    let file = File::open_as(&path, AccessMode::OpenOrCreate).unwrap();
    let space = Dataspace::with_max(&[3], &[None]).unwrap();
    let props = DatasetCreateProps::new().unwrap().chunk(&[8]).unwrap();
    let ds = file.create_dataset_with::<i32>("grow", &space, &props).unwrap();
    ds.write(&vec![1, 2, 3]).unwrap();

    ds.resize(&[5]).unwrap();
    assert_eq!(ds.shape().unwrap(), vec![5]);
    let back: Vec<i32> = ds.read().unwrap();
    assert_eq!(back, vec![1, 2, 3, 0, 0]);
}

// ---------------------------------------------------------------------------
// 7. References
// ---------------------------------------------------------------------------

#[test]
fn object_references_resolve_and_roundtrip() {
    let (_dir, path) = scratch("refs.h5");
    {
        let file = File::create(&path).unwrap();
        file.create_dataset_from("a", &vec![1.0f64]).unwrap();
        file.create_dataset_from("b", &vec![2.0f64]).unwrap();

        let refs = vec![
            ObjectReference::create(&file, "a").unwrap(),
            ObjectReference::create(&file, "b").unwrap(),
        ];
        file.create_dataset_from("refs", &refs).unwrap();
    }
    let file = File::open(&path).unwrap();
    let refs: Vec<ObjectReference> = file.dataset("refs").unwrap().read().unwrap();
    assert_eq!(refs.len(), 2);

    let b = refs[1].dereference_dataset(&file).unwrap();
    assert_eq!(b.read::<Vec<f64>>().unwrap(), vec![2.0]);

    // A dataset reference refuses to downcast into a group.
    let err = refs[0].dereference_group(&file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Object);
}

// ---------------------------------------------------------------------------
// 8. Error cases
// ---------------------------------------------------------------------------

#[test]
fn missing_paths_report_their_subsystem() {
    let (_dir, path) = scratch("missing.h5");
    let file = File::create(&path).unwrap();

    let err = file.dataset("nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dataset);
    assert!(err.to_string().contains("nope"));

    let err = file.group("nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Group);

    let err = file.attr("nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Attribute);
}

#[test]
fn opening_a_missing_file_is_a_file_error() {
    let (_dir, path) = scratch("does_not_exist.h5");
    let err = File::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::File);
    // Native failures carry the library's error codes.
    assert!(err.err_major() != 0 || err.err_minor() != 0);
}

#[test]
fn write_shape_mismatch_is_a_dataspace_error_and_writes_nothing() {
    let (_dir, path) = scratch("mismatch.h5");
    let file = File::create(&path).unwrap();
    let original = vec![1.0f64, 2.0, 3.0];
    let ds = file.create_dataset_from("data", &original).unwrap();

    let err = ds.write(&vec![9.0f64, 9.0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dataspace);

    let back: Vec<f64> = ds.read().unwrap();
    assert_eq!(back, original);
}

#[test]
fn rank_mismatch_on_read_is_a_dataspace_error() {
    let (_dir, path) = scratch("rank.h5");
    let file = File::create(&path).unwrap();
    file.create_dataset_from("flat", &vec![1.0f64, 2.0]).unwrap();

    let err = file.dataset("flat").unwrap().read::<Vec<Vec<f64>>>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dataspace);
    assert!(err.to_string().contains("impossible to pair"));
}

#[test]
fn exclusive_create_refuses_existing_file() {
    let (_dir, path) = scratch("excl.h5");
    File::create(&path).unwrap();
    let err = File::open_as(&path, AccessMode::Exclusive).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::File);
}
