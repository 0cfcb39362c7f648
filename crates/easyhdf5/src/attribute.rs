//! Attributes and the shared annotation surface of files, groups, and
//! datasets.

use std::os::raw::{c_char, c_void};

use bytemuck::Zeroable;
use hdf5_sys::h5a::{
    H5Acreate2, H5Adelete, H5Aexists, H5Aget_space, H5Aget_type, H5Aopen, H5Aread, H5Awrite,
};
use hdf5_sys::h5d::H5Dvlen_reclaim;
use hdf5_sys::h5p::H5P_DEFAULT;

use easyhdf5_shape::{total_elements, Build, Shape, ShapeMut};

use crate::dataset::{pair_extents, pair_rank};
use crate::dataspace::Dataspace;
use crate::datatype::{Datatype, NativeScalar};
use crate::error::{ensure, ensure_id, ensure_tri, Error, ErrorKind, Result};
use crate::iterate::{collect_names, visit_attr_names};
use crate::object::{wrap_handle, Located};
use crate::util::to_cstring;

wrap_handle! {
    /// An open attribute.
    Attribute
}

impl Attribute {
    /// The attribute's dataspace.
    pub fn space(&self) -> Result<Dataspace> {
        let hid = ensure_id(
            ErrorKind::Attribute,
            unsafe { H5Aget_space(self.id()) },
            || "unable to obtain attribute dataspace".into(),
        )?;
        Ok(Dataspace::from_id(hid))
    }

    /// The attribute's on-file datatype.
    pub fn dtype(&self) -> Result<Datatype> {
        let hid = ensure_id(
            ErrorKind::Attribute,
            unsafe { H5Aget_type(self.id()) },
            || "unable to obtain attribute datatype".into(),
        )?;
        Ok(Datatype::from_id(hid))
    }

    /// Current extents; empty for scalar attributes.
    pub fn shape(&self) -> Result<Vec<u64>> {
        self.space()?.dims()
    }

    /// Read the whole attribute into a freshly allocated container.
    pub fn read<T>(&self) -> Result<T>
    where
        T: Build,
        T::Elem: NativeScalar,
    {
        let dims = self.space()?.dims()?;
        pair_rank::<T>(&dims)?;
        let mut value = T::with_shape(&dims)?;
        let n = total_elements(&dims);
        if n == 0 {
            return Ok(value);
        }
        let dtype = T::Elem::native_type()?;
        if T::TRIVIAL {
            if let Some(flat) = value.as_flat_mut()? {
                self.read_raw(&dtype, flat.as_mut_ptr().cast())?;
                return Ok(value);
            }
        }
        let mut buf = vec![T::Elem::zeroed(); n];
        self.read_raw(&dtype, buf.as_mut_ptr().cast())?;
        value.unflatten(&dims, &buf)?;
        Ok(value)
    }

    /// Read into an existing container or view whose shape must already
    /// match.
    pub fn read_into<T>(&self, value: &mut T) -> Result<()>
    where
        T: ShapeMut + ?Sized,
        T::Elem: NativeScalar,
    {
        let dims = self.space()?.dims()?;
        value.check(&dims)?;
        let n = total_elements(&dims);
        if n == 0 {
            return Ok(());
        }
        let dtype = T::Elem::native_type()?;
        if T::TRIVIAL {
            if let Some(flat) = value.as_flat_mut()? {
                return self.read_raw(&dtype, flat.as_mut_ptr().cast());
            }
        }
        let mut buf = vec![T::Elem::zeroed(); n];
        self.read_raw(&dtype, buf.as_mut_ptr().cast())?;
        value.unflatten(&dims, &buf)?;
        Ok(())
    }

    /// Write a container to the whole attribute.
    pub fn write<T>(&self, value: &T) -> Result<()>
    where
        T: Shape + ?Sized,
        T::Elem: NativeScalar,
    {
        let dims = self.space()?.dims()?;
        value.check(&dims)?;
        pair_extents(&value.dims(), &dims)?;
        let n = total_elements(&dims);
        if n == 0 {
            return Ok(());
        }
        let dtype = T::Elem::native_type()?;
        if T::TRIVIAL {
            if let Some(flat) = value.as_flat()? {
                return self.write_raw(&dtype, flat.as_ptr().cast());
            }
        }
        let mut buf = vec![T::Elem::zeroed(); n];
        value.flatten(&dims, &mut buf)?;
        self.write_raw(&dtype, buf.as_ptr().cast())
    }

    /// Write one string per attribute element.
    pub fn write_strings<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        let n = self.space()?.num_elements()? as usize;
        if n != values.len() {
            return Err(Error::new(
                ErrorKind::Dataspace,
                format!(
                    "attribute holds {n} element(s) but {} string(s) were supplied",
                    values.len()
                ),
            ));
        }
        if n == 0 {
            return Ok(());
        }
        let dtype = Datatype::var_string()?;
        let owned: Vec<std::ffi::CString> = values
            .iter()
            .map(|s| to_cstring(s.as_ref()))
            .collect::<Result<_>>()?;
        let ptrs: Vec<*const c_char> = owned.iter().map(|c| c.as_ptr()).collect();
        self.write_raw(&dtype, ptrs.as_ptr().cast())
    }

    /// Write a single string to a scalar attribute.
    pub fn write_str(&self, value: &str) -> Result<()> {
        self.write_strings(&[value])
    }

    /// Read every element as a string.
    pub fn read_strings(&self) -> Result<Vec<String>> {
        let space = self.space()?;
        let n = space.num_elements()? as usize;
        if n == 0 {
            return Ok(Vec::new());
        }
        let dtype = Datatype::var_string()?;
        let mut ptrs: Vec<*mut c_char> = vec![std::ptr::null_mut(); n];
        self.read_raw(&dtype, ptrs.as_mut_ptr().cast())?;

        let mut out = Vec::with_capacity(n);
        for &p in &ptrs {
            if p.is_null() {
                out.push(String::new());
            } else {
                // SAFETY: each element points at a NUL-terminated buffer
                // owned by the library until reclaimed below.
                out.push(unsafe { std::ffi::CStr::from_ptr(p) }.to_string_lossy().into_owned());
            }
        }
        unsafe {
            H5Dvlen_reclaim(
                dtype.id(),
                space.id(),
                H5P_DEFAULT,
                ptrs.as_mut_ptr().cast::<c_void>(),
            );
        }
        Ok(out)
    }

    /// Read a single string from a scalar attribute.
    pub fn read_string(&self) -> Result<String> {
        let mut strings = self.read_strings()?;
        match strings.len() {
            1 => Ok(strings.remove(0)),
            n => Err(Error::new(
                ErrorKind::Attribute,
                format!("expected a single string element, found {n}"),
            )),
        }
    }

    fn read_raw(&self, mem_type: &Datatype, buf: *mut c_void) -> Result<()> {
        ensure(
            ErrorKind::Attribute,
            unsafe { H5Aread(self.id(), mem_type.id(), buf) },
            || "unable to read attribute".into(),
        )
    }

    fn write_raw(&self, mem_type: &Datatype, buf: *const c_void) -> Result<()> {
        ensure(
            ErrorKind::Attribute,
            unsafe { H5Awrite(self.id(), mem_type.id(), buf) },
            || "unable to write attribute".into(),
        )
    }
}

/// Attribute CRUD shared by files, groups, and datasets.
pub trait Annotate: Located {
    /// Create an attribute of the scalar type `T` over `space`.
    fn create_attr<T: NativeScalar>(&self, name: &str, space: &Dataspace) -> Result<Attribute> {
        let dtype = T::native_type()?;
        self.create_attr_raw(name, &dtype, space)
    }

    /// Create a variable-length string attribute over `space`.
    fn create_str_attr(&self, name: &str, space: &Dataspace) -> Result<Attribute> {
        let dtype = Datatype::var_string()?;
        self.create_attr_raw(name, &dtype, space)
    }

    #[doc(hidden)]
    fn create_attr_raw(
        &self,
        name: &str,
        dtype: &Datatype,
        space: &Dataspace,
    ) -> Result<Attribute> {
        let cname = to_cstring(name)?;
        let hid = ensure_id(
            ErrorKind::Attribute,
            unsafe {
                H5Acreate2(
                    self.loc_id(),
                    cname.as_ptr(),
                    dtype.id(),
                    space.id(),
                    H5P_DEFAULT,
                    H5P_DEFAULT,
                )
            },
            || format!("unable to create attribute \"{name}\""),
        )?;
        Ok(Attribute::from_id(hid))
    }

    /// Create an attribute shaped after `value` and write it in one step.
    fn write_attr<T>(&self, name: &str, value: &T) -> Result<Attribute>
    where
        T: Shape + ?Sized,
        T::Elem: NativeScalar,
    {
        let space = Dataspace::simple(&value.dims())?;
        let attr = self.create_attr::<T::Elem>(name, &space)?;
        attr.write(value)?;
        Ok(attr)
    }

    /// Create a scalar string attribute and write it in one step.
    fn write_str_attr(&self, name: &str, value: &str) -> Result<Attribute> {
        let space = Dataspace::scalar()?;
        let attr = self.create_str_attr(name, &space)?;
        attr.write_str(value)?;
        Ok(attr)
    }

    /// Open the attribute named `name`.
    fn attr(&self, name: &str) -> Result<Attribute> {
        let cname = to_cstring(name)?;
        let hid = ensure_id(
            ErrorKind::Attribute,
            unsafe { H5Aopen(self.loc_id(), cname.as_ptr(), H5P_DEFAULT) },
            || format!("unable to open attribute \"{name}\""),
        )?;
        Ok(Attribute::from_id(hid))
    }

    /// Whether an attribute named `name` exists.
    fn has_attr(&self, name: &str) -> Result<bool> {
        let cname = to_cstring(name)?;
        ensure_tri(
            ErrorKind::Attribute,
            unsafe { H5Aexists(self.loc_id(), cname.as_ptr()) },
            || format!("unable to check existence of attribute \"{name}\""),
        )
    }

    /// Delete the attribute named `name`.
    fn delete_attr(&self, name: &str) -> Result<()> {
        let cname = to_cstring(name)?;
        ensure(
            ErrorKind::Attribute,
            unsafe { H5Adelete(self.loc_id(), cname.as_ptr()) },
            || format!("unable to delete attribute \"{name}\""),
        )
    }

    /// Names of all attributes on this object, in increasing name order.
    fn attr_names(&self) -> Result<Vec<String>> {
        collect_names(|visit| visit_attr_names(self.loc_id(), visit))
    }

    /// Invoke `visit` once per attribute name; a failure aborts the
    /// iteration.
    fn for_each_attr(&self, visit: &mut dyn FnMut(&str) -> Result<()>) -> Result<()> {
        visit_attr_names(self.loc_id(), visit)
    }
}

impl Annotate for crate::File {}
impl Annotate for crate::Group {}
impl Annotate for crate::Dataset {}
