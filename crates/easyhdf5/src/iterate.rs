//! Bridge between the native C iteration callbacks and Rust visitors.
//!
//! The native library invokes a C callback once per child name. A Rust
//! visitor may fail — or panic — and neither may unwind through the native
//! frames. The trampoline therefore captures the first failure on a
//! side-channel carrier, signals abort to the library by returning `-1`
//! for that invocation, and the wrapper rethrows once the native call has
//! returned: errors come back as `Err`, panics are resumed.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use hdf5_sys::h5::{hsize_t, H5_index_t, H5_iter_order_t};
use hdf5_sys::h5::herr_t;
use hdf5_sys::h5a::{H5A_info_t, H5Aiterate2};
use hdf5_sys::h5i::hid_t;
use hdf5_sys::h5l::{H5L_info_t, H5Literate};

use crate::error::{ensure, Error, ErrorKind, Result};

enum Failure {
    Visitor(Error),
    Panic(Box<dyn std::any::Any + Send + 'static>),
}

struct VisitCarrier<'a> {
    visit: &'a mut dyn FnMut(&str) -> Result<()>,
    failure: Option<Failure>,
}

fn dispatch(name: *const c_char, op_data: *mut c_void) -> herr_t {
    // SAFETY: op_data is the VisitCarrier we passed to the iterate call,
    // alive for the whole iteration; `name` is a NUL-terminated string the
    // library keeps valid for the duration of this callback.
    let carrier = unsafe { &mut *(op_data as *mut VisitCarrier<'_>) };
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
        (carrier.visit)(&name)
    }));
    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            carrier.failure = Some(Failure::Visitor(err));
            -1
        }
        Err(payload) => {
            carrier.failure = Some(Failure::Panic(payload));
            -1
        }
    }
}

extern "C" fn link_name_cb(
    _group: hid_t,
    name: *const c_char,
    _info: *const H5L_info_t,
    op_data: *mut c_void,
) -> herr_t {
    dispatch(name, op_data)
}

extern "C" fn attr_name_cb(
    _location: hid_t,
    name: *const c_char,
    _info: *const H5A_info_t,
    op_data: *mut c_void,
) -> herr_t {
    dispatch(name, op_data)
}

fn rethrow(status: herr_t, failure: Option<Failure>, what: &str) -> Result<()> {
    match failure {
        Some(Failure::Panic(payload)) => resume_unwind(payload),
        Some(Failure::Visitor(err)) => Err(err),
        None => ensure(ErrorKind::Object, status, || {
            format!("unable to iterate over {what} names")
        }),
    }
}

/// Invoke `visit` once per link name under `loc`, in increasing name
/// order. A visitor failure aborts the iteration and is returned after
/// the native call unwinds normally.
pub(crate) fn visit_link_names(
    loc: hid_t,
    visit: &mut dyn FnMut(&str) -> Result<()>,
) -> Result<()> {
    let mut carrier = VisitCarrier { visit, failure: None };
    let mut idx: hsize_t = 0;
    let status = unsafe {
        H5Literate(
            loc,
            H5_index_t::H5_INDEX_NAME,
            H5_iter_order_t::H5_ITER_INC,
            &mut idx,
            Some(link_name_cb),
            (&mut carrier) as *mut VisitCarrier<'_> as *mut c_void,
        )
    };
    rethrow(status, carrier.failure, "link")
}

/// Invoke `visit` once per attribute name on `loc`, in increasing name
/// order, with the same failure contract as [`visit_link_names`].
pub(crate) fn visit_attr_names(
    loc: hid_t,
    visit: &mut dyn FnMut(&str) -> Result<()>,
) -> Result<()> {
    let mut carrier = VisitCarrier { visit, failure: None };
    let mut idx: hsize_t = 0;
    let status = unsafe {
        H5Aiterate2(
            loc,
            H5_index_t::H5_INDEX_NAME,
            H5_iter_order_t::H5_ITER_INC,
            &mut idx,
            Some(attr_name_cb),
            (&mut carrier) as *mut VisitCarrier<'_> as *mut c_void,
        )
    };
    rethrow(status, carrier.failure, "attribute")
}

/// Collect all names a visitor-driven iteration yields.
pub(crate) fn collect_names(
    iterate: impl FnOnce(&mut dyn FnMut(&str) -> Result<()>) -> Result<()>,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    iterate(&mut |name: &str| {
        names.push(name.to_owned());
        Ok(())
    })?;
    Ok(names)
}
