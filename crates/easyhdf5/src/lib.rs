//! Ergonomic, RAII-based veneer over the HDF5 C library.
//!
//! This crate wraps the native library's object model — files, groups,
//! datasets, attributes, dataspaces, datatypes, property lists, and object
//! references — behind handle-owning Rust types. Every native call that
//! reports failure is translated into a typed [`Error`] at the call site;
//! handle lifetimes ride the library's own reference counting through
//! `Clone`/`Drop`.
//!
//! Dataset and attribute I/O is generic over the container adapters from
//! [`easyhdf5_shape`]: vectors, nested vectors, fixed-size arrays, slices,
//! and (with the `ndarray` feature, on by default) `ndarray` arrays and
//! views all read and write without hand-packed flat buffers.
//!
//! # Reading
//!
//! ```no_run
//! use easyhdf5::{File, Node};
//!
//! let file = File::open("data.h5").unwrap();
//! let ds = file.dataset("sensors/temperature").unwrap();
//! let values: Vec<f64> = ds.read().unwrap();
//! println!("shape: {:?}, data: {:?}", ds.shape().unwrap(), values);
//! ```
//!
//! # Writing
//!
//! ```no_run
//! use easyhdf5::{Annotate, File, Node};
//!
//! let file = File::create("output.h5").unwrap();
//! let table = vec![vec![1.0f64, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
//! file.create_dataset_from("table", &table).unwrap();
//! file.write_str_attr("description", "example file").unwrap();
//! ```

mod attribute;
mod dataset;
mod dataspace;
mod datatype;
mod error;
mod file;
mod group;
mod iterate;
mod object;
mod plist;
mod reference;
mod util;

pub use attribute::{Annotate, Attribute};
pub use dataset::Dataset;
pub use dataspace::{Dataspace, DataspaceClass};
pub use datatype::{Datatype, DatatypeClass, NativeScalar};
pub use error::{Error, ErrorKind, Result};
pub use file::{AccessMode, File};
pub use group::{Group, Node};
pub use object::{Located, Object, ObjectInfo, ObjectType};
pub use plist::{DatasetCreateProps, LinkCreateProps};
pub use reference::ObjectReference;

// Re-export the adapter layer so callers need only one dependency.
pub use easyhdf5_shape::{Build, Shape, ShapeError, ShapeMut};
pub use easyhdf5_shape::MAX_SUPPORTED_RANK as MAX_RANK;

use std::sync::Once;

static LIB_INIT: Once = Once::new();

/// Initialize the native library once per process and silence its
/// automatic error-stack printing; errors surface through [`Error`]
/// instead.
pub(crate) fn lib_init() {
    LIB_INIT.call_once(|| unsafe {
        hdf5_sys::h5::H5open();
        hdf5_sys::h5e::H5Eset_auto2(hdf5_sys::h5e::H5E_DEFAULT, None, std::ptr::null_mut());
    });
}
