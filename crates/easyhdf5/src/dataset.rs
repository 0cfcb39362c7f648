//! Datasets and generic, adapter-driven I/O.
//!
//! `read`/`write` accept any type with a shape adapter. When the adapter
//! reports a trivially-copyable layout the transfer goes straight between
//! the container's backing storage and the native call; otherwise the data
//! is staged through a flat scratch buffer by the adapter's
//! flatten/unflatten traversal.

use std::os::raw::{c_char, c_void};

use bytemuck::Zeroable;
use hdf5_sys::h5d::{
    H5Dget_space, H5Dget_storage_size, H5Dget_type, H5Dread, H5Dset_extent, H5Dvlen_reclaim,
    H5Dwrite,
};
use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5s::H5S_ALL;

use easyhdf5_shape::{total_elements, Build, Shape, ShapeError, ShapeMut};

use crate::datatype::{Datatype, NativeScalar};
use crate::dataspace::Dataspace;
use crate::error::{ensure, ensure_id, Error, ErrorKind, Result};
use crate::object::wrap_handle;
use crate::util::to_cstring;

wrap_handle! {
    /// An open dataset.
    Dataset
}

impl Dataset {
    /// The dataset's dataspace.
    pub fn space(&self) -> Result<Dataspace> {
        let hid = ensure_id(ErrorKind::Dataset, unsafe { H5Dget_space(self.id()) }, || {
            "unable to obtain dataset dataspace".into()
        })?;
        Ok(Dataspace::from_id(hid))
    }

    /// The dataset's on-file datatype.
    pub fn dtype(&self) -> Result<Datatype> {
        let hid = ensure_id(ErrorKind::Dataset, unsafe { H5Dget_type(self.id()) }, || {
            "unable to obtain dataset datatype".into()
        })?;
        Ok(Datatype::from_id(hid))
    }

    /// Current extents, outermost dimension first.
    pub fn shape(&self) -> Result<Vec<u64>> {
        self.space()?.dims()
    }

    /// Bytes the dataset occupies in the file.
    pub fn storage_size(&self) -> u64 {
        unsafe { H5Dget_storage_size(self.id()) }
    }

    /// Change the current extents of a chunked dataset created with
    /// maximum extents allowing it.
    pub fn resize(&self, dims: &[u64]) -> Result<()> {
        ensure(
            ErrorKind::Dataset,
            unsafe { H5Dset_extent(self.id(), dims.as_ptr()) },
            || format!("unable to resize dataset to {dims:?}"),
        )
    }

    /// Read the whole dataset into a freshly allocated container.
    ///
    /// The dataspace rank must fall inside the container's supported
    /// range; the container takes the dataspace's shape. The native
    /// library converts between the stored and in-memory scalar type.
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

    /// Read the whole dataset into an existing container or view whose
    /// shape must already match the dataspace.
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

    /// Write a container to the whole dataset.
    ///
    /// Every extent of the value must equal the corresponding dataspace
    /// extent; a mismatch names the offending dimension index.
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

    // -----------------------------------------------------------------------
    // Variable-length strings
    // -----------------------------------------------------------------------

    /// Write one string per dataspace element.
    ///
    /// Strings use a separate wire representation (a pointer per element,
    /// reclaimed by the library), so they sit outside the generic adapter
    /// path.
    pub fn write_strings<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        let n = self.space()?.num_elements()? as usize;
        if n != values.len() {
            return Err(Error::new(
                ErrorKind::Dataspace,
                format!(
                    "dataset holds {n} element(s) but {} string(s) were supplied",
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

    /// Write a single string to a scalar dataset.
    pub fn write_str(&self, value: &str) -> Result<()> {
        self.write_strings(&[value])
    }

    /// Read every element as a string. The stored type must be a string
    /// type.
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
                // SAFETY: the library allocated a NUL-terminated buffer
                // for each element; it stays valid until reclaimed below.
                out.push(unsafe { std::ffi::CStr::from_ptr(p) }.to_string_lossy().into_owned());
            }
        }

        // Hand the element buffers back to the library allocator.
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

    /// Read a single string from a scalar (or one-element) dataset.
    pub fn read_string(&self) -> Result<String> {
        let mut strings = self.read_strings()?;
        match strings.len() {
            1 => Ok(strings.remove(0)),
            n => Err(Error::new(
                ErrorKind::Dataset,
                format!("expected a single string element, found {n}"),
            )),
        }
    }

    fn read_raw(&self, mem_type: &Datatype, buf: *mut c_void) -> Result<()> {
        ensure(
            ErrorKind::Dataset,
            unsafe { H5Dread(self.id(), mem_type.id(), H5S_ALL, H5S_ALL, H5P_DEFAULT, buf) },
            || "unable to read dataset".into(),
        )
    }

    fn write_raw(&self, mem_type: &Datatype, buf: *const c_void) -> Result<()> {
        ensure(
            ErrorKind::Dataset,
            unsafe { H5Dwrite(self.id(), mem_type.id(), H5S_ALL, H5S_ALL, H5P_DEFAULT, buf) },
            || "unable to write dataset".into(),
        )
    }
}

/// Rank-compatibility check for whole-dataset pairing.
pub(crate) fn pair_rank<T: Shape + ?Sized>(dims: &[u64]) -> Result<()> {
    if dims.len() < T::MIN_RANK || dims.len() > T::MAX_RANK {
        return Err(ShapeError::RankMismatch {
            min: T::MIN_RANK,
            max: T::MAX_RANK,
            provided: dims.len(),
        }
        .into());
    }
    Ok(())
}

/// Per-dimension equality check between a value's extents and the target
/// dataspace extents.
pub(crate) fn pair_extents(value_dims: &[u64], space_dims: &[u64]) -> Result<()> {
    if value_dims.len() != space_dims.len() {
        return Err(Error::new(
            ErrorKind::Dataspace,
            format!(
                "value has rank {} but the dataspace has rank {}",
                value_dims.len(),
                space_dims.len()
            ),
        ));
    }
    for (dim, (&have, &want)) in value_dims.iter().zip(space_dims.iter()).enumerate() {
        if have != want {
            return Err(ShapeError::ExtentMismatch {
                dim,
                expected: have,
                actual: want,
            }
            .into());
        }
    }
    Ok(())
}
