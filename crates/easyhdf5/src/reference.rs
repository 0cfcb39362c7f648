//! Object references: stable pointers to objects within a file.
//!
//! A reference is a plain `Pod` value, so it doubles as a dataset element
//! type: datasets of references round-trip through the same generic
//! adapter machinery as numeric data.

use std::os::raw::c_void;

use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5r::{hobj_ref_t, H5R_type_t, H5Rcreate, H5Rdereference2};

use crate::datatype::{Datatype, NativeScalar};
use crate::error::{ensure, ensure_id, ErrorKind, Result};
use crate::object::{Located, Object};
use crate::util::to_cstring;

/// A reference to an object (group, dataset, or named datatype) in a
/// file.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectReference(hobj_ref_t);

// SAFETY: `hobj_ref_t` is a plain fixed-width integer address and the
// wrapper is `repr(transparent)`.
unsafe impl bytemuck::Zeroable for ObjectReference {}
unsafe impl bytemuck::Pod for ObjectReference {}

// SAFETY: the native object-reference type describes exactly this wire
// representation.
unsafe impl NativeScalar for ObjectReference {
    fn native_type() -> Result<Datatype> {
        Datatype::copy_from(*hdf5_sys::h5t::H5T_STD_REF_OBJ, "object reference")
    }
}

// A reference is a leaf value for the container adapters.
easyhdf5_shape::impl_leaf!(ObjectReference);

impl ObjectReference {
    /// Create a reference to the object at `path` relative to `loc`.
    pub fn create<L: Located>(loc: &L, path: &str) -> Result<Self> {
        let name = to_cstring(path)?;
        let mut raw: hobj_ref_t = 0;
        ensure(
            ErrorKind::Reference,
            unsafe {
                H5Rcreate(
                    (&mut raw) as *mut hobj_ref_t as *mut c_void,
                    loc.loc_id(),
                    name.as_ptr(),
                    H5R_type_t::H5R_OBJECT,
                    -1,
                )
            },
            || format!("unable to create reference to \"{path}\""),
        )?;
        Ok(ObjectReference(raw))
    }

    /// Resolve this reference through any location in the same file.
    pub fn dereference<L: Located>(&self, loc: &L) -> Result<Object> {
        let hid = ensure_id(
            ErrorKind::Reference,
            unsafe {
                H5Rdereference2(
                    loc.loc_id(),
                    H5P_DEFAULT,
                    H5R_type_t::H5R_OBJECT,
                    (&self.0) as *const hobj_ref_t as *const c_void,
                )
            },
            || "unable to dereference object reference".into(),
        )?;
        Ok(Object::from_id(hid))
    }

    /// Resolve this reference, expecting a dataset.
    pub fn dereference_dataset<L: Located>(&self, loc: &L) -> Result<crate::Dataset> {
        self.dereference(loc)?.into_dataset()
    }

    /// Resolve this reference, expecting a group.
    pub fn dereference_group<L: Located>(&self, loc: &L) -> Result<crate::Group> {
        self.dereference(loc)?.into_group()
    }
}
