//! Error types for the veneer.
//!
//! Every native call that reports failure through a negative status is
//! translated at the call site into an [`Error`] carrying the subsystem
//! [`ErrorKind`], a message naming the failing operation, and the major and
//! minor error codes harvested from the native error stack. Additional
//! stack entries become a chain of nested errors reachable through
//! [`Error::next`] and [`std::error::Error::source`].

use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_uint, c_void};

use hdf5_sys::h5::herr_t;
use hdf5_sys::h5e::{H5E_direction_t, H5E_error2_t, H5Ewalk2, H5E_DEFAULT};
use hdf5_sys::h5i::hid_t;

use easyhdf5_shape::ShapeError;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The subsystem an error originated from, one kind per wrapped native
/// interface area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic object/handle operations.
    Object,
    /// Datatype operations.
    Datatype,
    /// File open/create/flush.
    File,
    /// Dataspace pairing and extent queries.
    Dataspace,
    /// Attribute CRUD and I/O.
    Attribute,
    /// Dataset CRUD and I/O.
    Dataset,
    /// Group and link operations.
    Group,
    /// Property list construction and settings.
    Property,
    /// Object references.
    Reference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Object => "object",
            ErrorKind::Datatype => "datatype",
            ErrorKind::File => "file",
            ErrorKind::Dataspace => "dataspace",
            ErrorKind::Attribute => "attribute",
            ErrorKind::Dataset => "dataset",
            ErrorKind::Group => "group",
            ErrorKind::Property => "property list",
            ErrorKind::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// An error from the veneer or the native library.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    major: hid_t,
    minor: hid_t,
    next: Option<Box<Error>>,
}

impl Error {
    /// An error with no native stack context.
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            major: 0,
            minor: 0,
            next: None,
        }
    }

    /// An error built from the current native error stack. The deepest
    /// stack entry supplies the detail appended to `message` and the
    /// major/minor codes; further entries become the `next` chain.
    pub(crate) fn from_stack(kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut entries: Vec<StackEntry> = Vec::new();
        unsafe {
            // Any return status is acceptable here: on failure we simply
            // report without native context.
            H5Ewalk2(
                H5E_DEFAULT,
                H5E_direction_t::H5E_WALK_DOWNWARD,
                Some(collect_stack_entry),
                (&mut entries) as *mut Vec<StackEntry> as *mut c_void,
            );
        }

        let mut message = message.into();
        let (mut major, mut minor) = (0, 0);
        if let Some(first) = entries.first() {
            if !first.desc.is_empty() {
                message = format!("{message}: {}", first.desc);
            }
            major = first.major;
            minor = first.minor;
        }

        // Chain the remaining stack entries, innermost last.
        let mut next = None;
        for entry in entries.into_iter().skip(1).rev() {
            next = Some(Box::new(Error {
                kind,
                message: entry.desc,
                major: entry.major,
                minor: entry.minor,
                next,
            }));
        }

        Error { kind, message, major, minor, next }
    }

    /// The subsystem this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description of the failing operation.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The native library's major error code, or 0 when the error did not
    /// come out of a native call.
    pub fn err_major(&self) -> hid_t {
        self.major
    }

    /// The native library's minor error code, or 0.
    pub fn err_minor(&self) -> hid_t {
        self.minor
    }

    /// The next error in the chain for multi-error contexts.
    pub fn next(&self) -> Option<&Error> {
        self.next.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.next.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ShapeError> for Error {
    fn from(e: ShapeError) -> Self {
        let kind = match e {
            // Requesting a flat view of a non-contiguous container is a
            // misuse of the dataset fast path.
            ShapeError::NotFlat => ErrorKind::Dataset,
            _ => ErrorKind::Dataspace,
        };
        Error::new(kind, e.to_string())
    }
}

struct StackEntry {
    desc: String,
    major: hid_t,
    minor: hid_t,
}

extern "C" fn collect_stack_entry(
    _n: c_uint,
    err_desc: *const H5E_error2_t,
    client_data: *mut c_void,
) -> herr_t {
    if err_desc.is_null() || client_data.is_null() {
        return -1;
    }
    // SAFETY: the native library hands back the pointer we passed to
    // H5Ewalk2, and err_desc points at a live stack entry for the duration
    // of the callback.
    let entries = unsafe { &mut *(client_data as *mut Vec<StackEntry>) };
    let entry = unsafe { &*err_desc };
    let desc = if entry.desc.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(entry.desc) }
            .to_string_lossy()
            .into_owned()
    };
    entries.push(StackEntry {
        desc,
        major: entry.maj_num,
        minor: entry.min_num,
    });
    0
}

/// Translate a native identifier return value: negative means failure.
pub(crate) fn ensure_id(
    kind: ErrorKind,
    hid: hid_t,
    message: impl FnOnce() -> String,
) -> Result<hid_t> {
    if hid < 0 {
        Err(Error::from_stack(kind, message()))
    } else {
        Ok(hid)
    }
}

/// Translate a native status return value: negative means failure.
pub(crate) fn ensure(
    kind: ErrorKind,
    status: herr_t,
    message: impl FnOnce() -> String,
) -> Result<()> {
    if status < 0 {
        Err(Error::from_stack(kind, message()))
    } else {
        Ok(())
    }
}

/// Translate a native tri-state return value: positive is `true`, zero is
/// `false`, negative means failure.
pub(crate) fn ensure_tri(
    kind: ErrorKind,
    tri: herr_t,
    message: impl FnOnce() -> String,
) -> Result<bool> {
    if tri < 0 {
        Err(Error::from_stack(kind, message()))
    } else {
        Ok(tri > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::new(ErrorKind::Dataset, "unable to open dataset \"x\"");
        assert_eq!(err.to_string(), "dataset error: unable to open dataset \"x\"");
    }

    #[test]
    fn shape_error_maps_to_dataspace_kind() {
        let err: Error = ShapeError::RankMismatch { min: 2, max: 2, provided: 1 }.into();
        assert_eq!(err.kind(), ErrorKind::Dataspace);
    }

    #[test]
    fn not_flat_maps_to_dataset_kind() {
        let err: Error = ShapeError::NotFlat.into();
        assert_eq!(err.kind(), ErrorKind::Dataset);
    }

    #[test]
    fn fresh_error_has_no_native_codes_or_chain() {
        let err = Error::new(ErrorKind::File, "x");
        assert_eq!(err.err_major(), 0);
        assert_eq!(err.err_minor(), 0);
        assert!(err.next().is_none());
    }
}
