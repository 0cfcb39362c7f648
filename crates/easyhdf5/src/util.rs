//! Small string-conversion helpers shared by the wrapper modules.

use std::ffi::CString;
use std::path::Path;

use crate::error::{Error, ErrorKind, Result};

/// Convert a Rust string into a NUL-terminated C string for the native API.
pub(crate) fn to_cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| {
        Error::new(
            ErrorKind::Object,
            format!("name {s:?} contains an interior NUL byte"),
        )
    })
}

/// Convert a filesystem path; the native API expects UTF-8 on all
/// platforms this crate targets.
pub(crate) fn path_to_cstring(path: &Path) -> Result<CString> {
    let s = path.to_str().ok_or_else(|| {
        Error::new(
            ErrorKind::File,
            format!("path {} is not valid UTF-8", path.display()),
        )
    })?;
    to_cstring(s)
}
