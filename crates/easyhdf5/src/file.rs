//! File open/create and file-level operations.

use std::path::Path;

use hdf5_sys::h5f::{
    H5F_scope_t, H5Fcreate, H5Fflush, H5Fget_filesize, H5Fopen, H5F_ACC_EXCL, H5F_ACC_RDONLY,
    H5F_ACC_RDWR, H5F_ACC_TRUNC,
};
use hdf5_sys::h5p::H5P_DEFAULT;

use crate::error::{ensure, ensure_id, ErrorKind, Result};
use crate::object::wrap_handle;
use crate::util::path_to_cstring;

/// How to open or create a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Open an existing file for reading.
    ReadOnly,
    /// Open an existing file for reading and writing.
    ReadWrite,
    /// Create a new file, truncating any existing one.
    Truncate,
    /// Create a new file, failing if one already exists.
    Exclusive,
    /// Open read-write if the file exists, otherwise create it.
    OpenOrCreate,
}

wrap_handle! {
    /// An open HDF5 file.
    ///
    /// A `File` is also a [`Node`](crate::Node) rooted at `/` and an
    /// attribute holder ([`Annotate`](crate::Annotate)).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use easyhdf5::{File, Node};
    ///
    /// let file = File::create("data.h5").unwrap();
    /// let space = easyhdf5::Dataspace::simple(&[3]).unwrap();
    /// let ds = file.create_dataset::<f64>("values", &space).unwrap();
    /// ds.write(&vec![1.0, 2.0, 3.0]).unwrap();
    /// ```
    File
}

impl File {
    /// Open an existing file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_as(path, AccessMode::ReadOnly)
    }

    /// Create a file, truncating any existing one.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_as(path, AccessMode::Truncate)
    }

    /// Open or create a file with an explicit [`AccessMode`].
    pub fn open_as<P: AsRef<Path>>(path: P, mode: AccessMode) -> Result<Self> {
        crate::lib_init();
        let path = path.as_ref();
        let cpath = path_to_cstring(path)?;

        let hid = match mode {
            AccessMode::ReadOnly => unsafe {
                H5Fopen(cpath.as_ptr(), H5F_ACC_RDONLY, H5P_DEFAULT)
            },
            AccessMode::ReadWrite => unsafe {
                H5Fopen(cpath.as_ptr(), H5F_ACC_RDWR, H5P_DEFAULT)
            },
            AccessMode::Truncate => unsafe {
                H5Fcreate(cpath.as_ptr(), H5F_ACC_TRUNC, H5P_DEFAULT, H5P_DEFAULT)
            },
            AccessMode::Exclusive => unsafe {
                H5Fcreate(cpath.as_ptr(), H5F_ACC_EXCL, H5P_DEFAULT, H5P_DEFAULT)
            },
            AccessMode::OpenOrCreate => {
                let opened = unsafe { H5Fopen(cpath.as_ptr(), H5F_ACC_RDWR, H5P_DEFAULT) };
                if opened >= 0 {
                    opened
                } else {
                    unsafe { H5Fcreate(cpath.as_ptr(), H5F_ACC_EXCL, H5P_DEFAULT, H5P_DEFAULT) }
                }
            }
        };

        let hid = ensure_id(ErrorKind::File, hid, || {
            format!("unable to open file \"{}\"", path.display())
        })?;
        Ok(Self::from_id(hid))
    }

    /// Flush buffered data for this file to storage.
    pub fn flush(&self) -> Result<()> {
        ensure(
            ErrorKind::File,
            unsafe { H5Fflush(self.id(), H5F_scope_t::H5F_SCOPE_LOCAL) },
            || "unable to flush file".into(),
        )
    }

    /// Current size of the file image in bytes.
    pub fn size(&self) -> Result<u64> {
        let mut size = 0u64;
        ensure(
            ErrorKind::File,
            unsafe { H5Fget_filesize(self.id(), &mut size) },
            || "unable to query file size".into(),
        )?;
        Ok(size)
    }
}
