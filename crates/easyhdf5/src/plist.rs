//! Property-list builders.
//!
//! These configure the native library's own machinery (chunked layout,
//! deflate, shuffle, link creation); the pipeline itself lives entirely in
//! the native library.

use std::os::raw::{c_int, c_uint};

use hdf5_sys::h5p::{
    H5Pcreate, H5Pget_chunk, H5Pset_chunk, H5Pset_create_intermediate_group, H5Pset_deflate,
    H5Pset_shuffle, H5P_CLS_DATASET_CREATE, H5P_CLS_LINK_CREATE,
};

use crate::error::{ensure, ensure_id, ErrorKind, Result};
use crate::object::wrap_handle;
use crate::MAX_RANK;

wrap_handle! {
    /// Creation properties for datasets: chunked layout and the native
    /// filter pipeline knobs.
    DatasetCreateProps
}

impl DatasetCreateProps {
    /// A fresh dataset-creation property list with library defaults.
    pub fn new() -> Result<Self> {
        crate::lib_init();
        let hid = ensure_id(
            ErrorKind::Property,
            unsafe { H5Pcreate(*H5P_CLS_DATASET_CREATE) },
            || "unable to create dataset creation property list".into(),
        )?;
        Ok(Self::from_id(hid))
    }

    /// Store the dataset in chunks of the given extents. Required for
    /// compression and for extendable datasets.
    pub fn chunk(self, dims: &[u64]) -> Result<Self> {
        ensure(
            ErrorKind::Property,
            unsafe { H5Pset_chunk(self.id(), dims.len() as c_int, dims.as_ptr()) },
            || format!("unable to set chunk dimensions {dims:?}"),
        )?;
        Ok(self)
    }

    /// Enable the native deflate (gzip) filter, level 0-9.
    pub fn deflate(self, level: u8) -> Result<Self> {
        ensure(
            ErrorKind::Property,
            unsafe { H5Pset_deflate(self.id(), level as c_uint) },
            || format!("unable to enable deflate at level {level}"),
        )?;
        Ok(self)
    }

    /// Enable the native byte-shuffle filter, typically paired with
    /// deflate.
    pub fn shuffle(self) -> Result<Self> {
        ensure(
            ErrorKind::Property,
            unsafe { H5Pset_shuffle(self.id()) },
            || "unable to enable the shuffle filter".into(),
        )?;
        Ok(self)
    }

    /// The configured chunk extents, or `None` when the layout is not
    /// chunked.
    pub fn chunk_dims(&self) -> Option<Vec<u64>> {
        let mut dims = vec![0u64; MAX_RANK];
        let rank = unsafe { H5Pget_chunk(self.id(), MAX_RANK as c_int, dims.as_mut_ptr()) };
        if rank < 0 {
            return None;
        }
        dims.truncate(rank as usize);
        Some(dims)
    }
}

wrap_handle! {
    /// Creation properties for links, shared by group creation and
    /// renames.
    LinkCreateProps
}

impl LinkCreateProps {
    /// A fresh link-creation property list with library defaults.
    pub fn new() -> Result<Self> {
        crate::lib_init();
        let hid = ensure_id(
            ErrorKind::Property,
            unsafe { H5Pcreate(*H5P_CLS_LINK_CREATE) },
            || "unable to create link creation property list".into(),
        )?;
        Ok(Self::from_id(hid))
    }

    /// Create missing intermediate groups when a multi-component path is
    /// linked.
    pub fn intermediate_groups(self) -> Result<Self> {
        ensure(
            ErrorKind::Property,
            unsafe { H5Pset_create_intermediate_group(self.id(), 1) },
            || "unable to enable intermediate group creation".into(),
        )?;
        Ok(self)
    }
}
