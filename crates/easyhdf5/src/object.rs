//! Native handle ownership and the common object surface.
//!
//! Every wrapped entity (file, group, dataset, ...) holds exactly one
//! native handle through [`Object`]. Cloning increments the library's own
//! reference count, moving transfers ownership without touching it, and
//! dropping decrements it — close failures in `Drop` are swallowed since
//! destructors cannot propagate errors.

use hdf5_sys::h5i::{
    hid_t, H5I_type_t, H5Idec_ref, H5Iget_ref, H5Iget_type, H5Iinc_ref, H5Iis_valid,
    H5I_INVALID_HID,
};

use crate::error::{Error, ErrorKind, Result};

/// The fundamental class of a native object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// An open file.
    File,
    /// A group.
    Group,
    /// A (possibly committed) datatype.
    Datatype,
    /// A dataspace.
    Dataspace,
    /// A dataset.
    Dataset,
    /// An attribute.
    Attribute,
}

/// Owner of a single native handle.
pub struct Object {
    hid: hid_t,
}

impl Object {
    /// Take ownership of a native handle. The handle's reference count is
    /// not modified; this object will decrement it on drop.
    pub(crate) fn from_id(hid: hid_t) -> Self {
        Object { hid }
    }

    /// The underlying native identifier, for C API interoperability.
    pub fn id(&self) -> hid_t {
        self.hid
    }

    /// Whether this object currently references a live native handle.
    pub fn is_valid(&self) -> bool {
        self.hid >= 0 && unsafe { H5Iis_valid(self.hid) } > 0
    }

    /// The fundamental type of the referenced object.
    ///
    /// Fails with an object-kind error when the handle is invalid or the
    /// native class is not one the wrapper recognizes.
    pub fn object_type(&self) -> Result<ObjectType> {
        let class = unsafe { H5Iget_type(self.hid) };
        match class {
            H5I_type_t::H5I_FILE => Ok(ObjectType::File),
            H5I_type_t::H5I_GROUP => Ok(ObjectType::Group),
            H5I_type_t::H5I_DATATYPE => Ok(ObjectType::Datatype),
            H5I_type_t::H5I_DATASPACE => Ok(ObjectType::Dataspace),
            H5I_type_t::H5I_DATASET => Ok(ObjectType::Dataset),
            H5I_type_t::H5I_ATTR => Ok(ObjectType::Attribute),
            _ => Err(Error::from_stack(
                ErrorKind::Object,
                format!("unrecognized object type for handle {}", self.hid),
            )),
        }
    }

    /// Library-side bookkeeping for this handle.
    pub fn info(&self) -> Result<ObjectInfo> {
        let count = unsafe { H5Iget_ref(self.hid) };
        if count < 0 {
            return Err(Error::from_stack(
                ErrorKind::Object,
                format!("unable to obtain info for handle {}", self.hid),
            ));
        }
        Ok(ObjectInfo {
            ref_count: count as usize,
        })
    }

    /// Downcast into a [`Group`](crate::Group), verifying the native class.
    pub fn into_group(self) -> Result<crate::Group> {
        match self.object_type()? {
            ObjectType::Group => Ok(crate::Group::from_object(self)),
            other => Err(Error::new(
                ErrorKind::Object,
                format!("expected a group, found a {other:?}"),
            )),
        }
    }

    /// Downcast into a [`Dataset`](crate::Dataset), verifying the native
    /// class.
    pub fn into_dataset(self) -> Result<crate::Dataset> {
        match self.object_type()? {
            ObjectType::Dataset => Ok(crate::Dataset::from_object(self)),
            other => Err(Error::new(
                ErrorKind::Object,
                format!("expected a dataset, found a {other:?}"),
            )),
        }
    }
}

impl Clone for Object {
    /// Copying shares the native handle: the library's reference count is
    /// incremented so both objects independently keep it alive. If the
    /// increment fails the clone is left invalid rather than panicking.
    fn clone(&self) -> Self {
        if self.is_valid() && unsafe { H5Iinc_ref(self.hid) } >= 0 {
            Object { hid: self.hid }
        } else {
            Object {
                hid: H5I_INVALID_HID,
            }
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        // Close failures cannot propagate out of a destructor; the status
        // is deliberately discarded.
        if self.is_valid() {
            unsafe {
                H5Idec_ref(self.hid);
            }
        }
    }
}

impl PartialEq for Object {
    /// Two objects are equal when they refer to the same native handle.
    fn eq(&self, other: &Self) -> bool {
        self.hid == other.hid
    }
}

impl Eq for Object {}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.hid)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Bookkeeping info for an open object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectInfo {
    ref_count: usize,
}

impl ObjectInfo {
    /// Number of references the native library holds for the handle.
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }
}

/// Anything that can serve as a location for path-based native calls.
pub trait Located {
    /// The native identifier used as the location argument.
    fn loc_id(&self) -> hid_t;
}

/// Stamps out the shared surface of a handle-owning wrapper type:
/// construction from a raw id, `Deref` to [`Object`], equality by handle,
/// and [`Located`].
macro_rules! wrap_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            obj: $crate::object::Object,
        }

        impl $name {
            pub(crate) fn from_id(hid: ::hdf5_sys::h5i::hid_t) -> Self {
                Self {
                    obj: $crate::object::Object::from_id(hid),
                }
            }

            #[allow(dead_code)]
            pub(crate) fn from_object(obj: $crate::object::Object) -> Self {
                Self { obj }
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::object::Object;

            fn deref(&self) -> &$crate::object::Object {
                &self.obj
            }
        }

        impl $crate::object::Located for $name {
            fn loc_id(&self) -> ::hdf5_sys::h5i::hid_t {
                self.obj.id()
            }
        }
    };
}

pub(crate) use wrap_handle;
