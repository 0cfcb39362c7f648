//! Datatype wrapper and the mapping from Rust scalars to native in-memory
//! types.

use hdf5_sys::h5t::{
    H5T_class_t, H5T_cset_t, H5Tcopy, H5Tequal, H5Tget_class, H5Tget_size, H5Tis_variable_str,
    H5Tset_cset, H5Tset_size, H5T_VARIABLE,
};

use crate::error::{ensure, ensure_id, ensure_tri, Error, ErrorKind, Result};
use crate::object::wrap_handle;

/// Class of a native datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatatypeClass {
    /// Fixed-point (integer) types.
    Integer,
    /// Floating-point types.
    Float,
    /// Time types.
    Time,
    /// Fixed or variable-length strings.
    String,
    /// Bit fields.
    Bitfield,
    /// Opaque blobs.
    Opaque,
    /// Compound (record) types.
    Compound,
    /// Object and region references.
    Reference,
    /// Enumerations.
    Enum,
    /// Variable-length sequences.
    VarLen,
    /// Fixed-extent array members.
    Array,
}

wrap_handle! {
    /// A native datatype handle.
    Datatype
}

impl Datatype {
    /// The in-memory datatype of a Rust scalar.
    pub fn of<T: NativeScalar>() -> Result<Self> {
        T::native_type()
    }

    /// A modifiable copy of an existing native datatype.
    pub(crate) fn copy_from(src: hdf5_sys::h5i::hid_t, what: &str) -> Result<Self> {
        crate::lib_init();
        let hid = ensure_id(ErrorKind::Datatype, unsafe { H5Tcopy(src) }, || {
            format!("unable to copy the native {what} datatype")
        })?;
        Ok(Self::from_id(hid))
    }

    /// A variable-length UTF-8 string datatype.
    pub fn var_string() -> Result<Self> {
        let dtype = Self::copy_from(*hdf5_sys::h5t::H5T_C_S1, "string")?;
        ensure(
            ErrorKind::Datatype,
            unsafe { H5Tset_size(dtype.id(), H5T_VARIABLE) },
            || "unable to make the string datatype variable-length".into(),
        )?;
        ensure(
            ErrorKind::Datatype,
            unsafe { H5Tset_cset(dtype.id(), H5T_cset_t::H5T_CSET_UTF8) },
            || "unable to set the string character set".into(),
        )?;
        Ok(dtype)
    }

    /// Size of one instance in bytes. Variable-length types report the
    /// size of their in-memory descriptor.
    pub fn size(&self) -> Result<usize> {
        let size = unsafe { H5Tget_size(self.id()) };
        if size == 0 {
            return Err(Error::from_stack(
                ErrorKind::Datatype,
                "unable to query datatype size".to_string(),
            ));
        }
        Ok(size)
    }

    /// The datatype class.
    pub fn class(&self) -> Result<DatatypeClass> {
        let class = unsafe { H5Tget_class(self.id()) };
        match class {
            H5T_class_t::H5T_INTEGER => Ok(DatatypeClass::Integer),
            H5T_class_t::H5T_FLOAT => Ok(DatatypeClass::Float),
            H5T_class_t::H5T_TIME => Ok(DatatypeClass::Time),
            H5T_class_t::H5T_STRING => Ok(DatatypeClass::String),
            H5T_class_t::H5T_BITFIELD => Ok(DatatypeClass::Bitfield),
            H5T_class_t::H5T_OPAQUE => Ok(DatatypeClass::Opaque),
            H5T_class_t::H5T_COMPOUND => Ok(DatatypeClass::Compound),
            H5T_class_t::H5T_REFERENCE => Ok(DatatypeClass::Reference),
            H5T_class_t::H5T_ENUM => Ok(DatatypeClass::Enum),
            H5T_class_t::H5T_VLEN => Ok(DatatypeClass::VarLen),
            H5T_class_t::H5T_ARRAY => Ok(DatatypeClass::Array),
            _ => Err(Error::from_stack(
                ErrorKind::Datatype,
                "unrecognized datatype class".to_string(),
            )),
        }
    }

    /// Whether two datatypes describe the same type.
    pub fn equal(&self, other: &Datatype) -> Result<bool> {
        ensure_tri(
            ErrorKind::Datatype,
            unsafe { H5Tequal(self.id(), other.id()) },
            || "unable to compare datatypes".into(),
        )
    }

    /// Whether this is a variable-length string type.
    pub fn is_variable_string(&self) -> Result<bool> {
        ensure_tri(
            ErrorKind::Datatype,
            unsafe { H5Tis_variable_str(self.id()) },
            || "unable to query string datatype layout".into(),
        )
    }
}

/// Rust scalars with a fixed native in-memory datatype.
///
/// # Safety
///
/// Implementors guarantee that [`native_type`](NativeScalar::native_type)
/// describes exactly the implementing type's in-memory representation, so
/// the native library may read and write buffers of `Self` through it.
pub unsafe trait NativeScalar: bytemuck::Pod {
    /// A fresh handle describing this type in memory.
    fn native_type() -> Result<Datatype>;
}

macro_rules! impl_native_scalar {
    ($($ty:ty => $global:ident, $name:literal;)*) => {$(
        // SAFETY: the named native type is defined by the library to match
        // this exact fixed-width representation.
        unsafe impl NativeScalar for $ty {
            fn native_type() -> Result<Datatype> {
                Datatype::copy_from(*hdf5_sys::h5t::$global, $name)
            }
        }
    )*};
}

impl_native_scalar! {
    i8 => H5T_NATIVE_INT8, "i8";
    i16 => H5T_NATIVE_INT16, "i16";
    i32 => H5T_NATIVE_INT32, "i32";
    i64 => H5T_NATIVE_INT64, "i64";
    u8 => H5T_NATIVE_UINT8, "u8";
    u16 => H5T_NATIVE_UINT16, "u16";
    u32 => H5T_NATIVE_UINT32, "u32";
    u64 => H5T_NATIVE_UINT64, "u64";
    f32 => H5T_NATIVE_FLOAT, "f32";
    f64 => H5T_NATIVE_DOUBLE, "f64";
}
