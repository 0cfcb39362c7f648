//! Dataspace wrapper: rank and per-dimension extents.

use hdf5_sys::h5s::{
    H5S_class_t, H5Screate, H5Screate_simple, H5Sget_simple_extent_dims,
    H5Sget_simple_extent_ndims, H5Sget_simple_extent_npoints, H5Sget_simple_extent_type,
    H5S_UNLIMITED,
};

use crate::error::{ensure_id, Error, ErrorKind, Result};
use crate::object::wrap_handle;
use crate::MAX_RANK;

/// Type of dataspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataspaceClass {
    /// Scalar (single element, rank 0).
    Scalar,
    /// Simple (N-dimensional array).
    Simple,
    /// Null (no data).
    Null,
}

wrap_handle! {
    /// The native library's description of an array's rank and extents.
    Dataspace
}

impl Dataspace {
    /// A scalar dataspace holding exactly one element.
    pub fn scalar() -> Result<Self> {
        crate::lib_init();
        let hid = ensure_id(
            ErrorKind::Dataspace,
            unsafe { H5Screate(H5S_class_t::H5S_SCALAR) },
            || "unable to create scalar dataspace".into(),
        )?;
        Ok(Self::from_id(hid))
    }

    /// A simple dataspace with the given extents. The empty slice creates
    /// a scalar dataspace, matching the pairing rules of the container
    /// adapters.
    pub fn simple(dims: &[u64]) -> Result<Self> {
        crate::lib_init();
        if dims.is_empty() {
            return Self::scalar();
        }
        if dims.len() > MAX_RANK {
            return Err(Error::new(
                ErrorKind::Dataspace,
                format!("rank {} exceeds the maximum of {MAX_RANK}", dims.len()),
            ));
        }
        let hid = ensure_id(
            ErrorKind::Dataspace,
            unsafe { H5Screate_simple(dims.len() as i32, dims.as_ptr(), std::ptr::null()) },
            || format!("unable to create dataspace with dimensions {dims:?}"),
        )?;
        Ok(Self::from_id(hid))
    }

    /// A simple dataspace with distinct current and maximum extents.
    /// `None` in `max_dims` means unlimited along that dimension, enabling
    /// later [`Dataset::resize`](crate::Dataset::resize) on chunked data.
    pub fn with_max(dims: &[u64], max_dims: &[Option<u64>]) -> Result<Self> {
        crate::lib_init();
        if dims.is_empty() {
            return Err(Error::new(
                ErrorKind::Dataspace,
                "an extendable dataspace requires at least one dimension",
            ));
        }
        if dims.len() != max_dims.len() {
            return Err(Error::new(
                ErrorKind::Dataspace,
                format!(
                    "mismatching rank between dimensions ({}) and maximum dimensions ({})",
                    dims.len(),
                    max_dims.len()
                ),
            ));
        }
        if dims.len() > MAX_RANK {
            return Err(Error::new(
                ErrorKind::Dataspace,
                format!("rank {} exceeds the maximum of {MAX_RANK}", dims.len()),
            ));
        }
        let max: Vec<u64> = max_dims.iter().map(|m| m.unwrap_or(H5S_UNLIMITED)).collect();
        let hid = ensure_id(
            ErrorKind::Dataspace,
            unsafe { H5Screate_simple(dims.len() as i32, dims.as_ptr(), max.as_ptr()) },
            || format!("unable to create dataspace with dimensions {dims:?}"),
        )?;
        Ok(Self::from_id(hid))
    }

    /// The dataspace class.
    pub fn class(&self) -> Result<DataspaceClass> {
        let class = unsafe { H5Sget_simple_extent_type(self.id()) };
        match class {
            H5S_class_t::H5S_SCALAR => Ok(DataspaceClass::Scalar),
            H5S_class_t::H5S_SIMPLE => Ok(DataspaceClass::Simple),
            H5S_class_t::H5S_NULL => Ok(DataspaceClass::Null),
            _ => Err(Error::from_stack(
                ErrorKind::Dataspace,
                "unable to determine dataspace class".to_string(),
            )),
        }
    }

    /// Number of dimensions. Scalar dataspaces have rank 0.
    pub fn rank(&self) -> Result<usize> {
        let ndims = unsafe { H5Sget_simple_extent_ndims(self.id()) };
        if ndims < 0 {
            return Err(Error::from_stack(
                ErrorKind::Dataspace,
                "unable to query dataspace rank".to_string(),
            ));
        }
        Ok(ndims as usize)
    }

    /// Current extents, outermost dimension first. Empty for scalar
    /// dataspaces.
    pub fn dims(&self) -> Result<Vec<u64>> {
        let rank = self.rank()?;
        let mut dims = vec![0u64; rank];
        if rank > 0 {
            let got = unsafe {
                H5Sget_simple_extent_dims(self.id(), dims.as_mut_ptr(), std::ptr::null_mut())
            };
            if got < 0 {
                return Err(Error::from_stack(
                    ErrorKind::Dataspace,
                    "unable to query dataspace dimensions".to_string(),
                ));
            }
        }
        Ok(dims)
    }

    /// Maximum extents; `None` along unlimited dimensions.
    pub fn max_dims(&self) -> Result<Vec<Option<u64>>> {
        let rank = self.rank()?;
        let mut dims = vec![0u64; rank];
        let mut max = vec![0u64; rank];
        if rank > 0 {
            let got = unsafe {
                H5Sget_simple_extent_dims(self.id(), dims.as_mut_ptr(), max.as_mut_ptr())
            };
            if got < 0 {
                return Err(Error::from_stack(
                    ErrorKind::Dataspace,
                    "unable to query dataspace maximum dimensions".to_string(),
                ));
            }
        }
        Ok(max
            .into_iter()
            .map(|m| if m == H5S_UNLIMITED { None } else { Some(m) })
            .collect())
    }

    /// Total number of selectable elements. Scalar is 1, null is 0.
    pub fn num_elements(&self) -> Result<u64> {
        if self.class()? == DataspaceClass::Null {
            return Ok(0);
        }
        let n = unsafe { H5Sget_simple_extent_npoints(self.id()) };
        if n < 0 {
            return Err(Error::from_stack(
                ErrorKind::Dataspace,
                "unable to query dataspace element count".to_string(),
            ));
        }
        Ok(n as u64)
    }
}
