//! Shape extraction and flat-buffer serialization for nested container types.
//!
//! HDF5 datasets and attributes exchange data as a single contiguous,
//! row-major buffer whose length is the product of the dataspace extents.
//! Application data rarely lives in that form: it sits in `Vec<Vec<f64>>`,
//! `[[f64; 3]; 2]`, `ndarray` views, and other nested containers. This crate
//! provides the adapter layer that walks such types at compile time to
//! determine rank and per-dimension extents, and converts between the nested
//! representation and the flat buffer — copying element by element when it
//! must, handing out the container's own backing storage when the in-memory
//! layout already is a valid flat buffer.
//!
//! The three traits form a capability ladder:
//!
//! - [`Shape`]: rank/extent queries, shape checking, flattening (write side).
//! - [`ShapeMut`]: unflattening into an existing container (read-into-view).
//! - [`Build`]: allocating a fresh container of a given shape (read side).
//!
//! No HDF5 code lives here; the crate is pure logic and can be tested
//! without a native library installation.
//!
//! # Example
//!
//! ```
//! use easyhdf5_shape::{Shape, Build};
//!
//! let nested = vec![vec![1.0f64, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
//! let dims = nested.dims();
//! assert_eq!(dims, vec![2, 3]);
//!
//! let mut flat = vec![0.0; 6];
//! nested.flatten(&dims, &mut flat).unwrap();
//! assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//!
//! let back = <Vec<Vec<f64>>>::from_flat(&dims, &flat).unwrap();
//! assert_eq!(back, nested);
//! ```

use core::fmt;

use bytemuck::Pod;

// Re-exported for use by the `impl_leaf!` macro in downstream crates.
#[doc(hidden)]
pub use bytemuck;

mod containers;
mod scalar;

#[cfg(feature = "ndarray")]
mod nd;

/// Largest rank the adapters support, matching the native library's own
/// dataspace limit. Dynamic-rank adapters report this as their `MAX_RANK`.
pub const MAX_SUPPORTED_RANK: usize = 32;

// ---------------------------------------------------------------------------
// ShapeError
// ---------------------------------------------------------------------------

/// Errors raised while pairing a container with a shape descriptor or while
/// moving data between the nested and the flat representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The descriptor's dimension count cannot be paired with the
    /// container's supported rank range.
    RankMismatch {
        /// Smallest rank the container can represent.
        min: usize,
        /// Largest rank the container can represent.
        max: usize,
        /// Number of dimensions in the descriptor.
        provided: usize,
    },
    /// A fixed extent of the container disagrees with the descriptor, or an
    /// element of a nested container does not have the homogeneous extent
    /// the descriptor promises.
    ExtentMismatch {
        /// Dimension index, local to the adapter reporting the mismatch.
        dim: usize,
        /// Extent the container holds.
        expected: u64,
        /// Extent the descriptor asked for.
        actual: u64,
    },
    /// `as_flat` was called on an adapter whose layout is not a valid flat
    /// buffer. Callers must consult [`Shape::TRIVIAL`] first.
    NotFlat,
    /// A flat buffer's length does not equal the product of the descriptor
    /// extents.
    BufferSize {
        /// Element count the descriptor implies.
        expected: usize,
        /// Element count the buffer holds.
        actual: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::RankMismatch { min, max, provided } => {
                if min == max {
                    write!(
                        f,
                        "impossible to pair {provided} dimension(s) with a container of rank {min}"
                    )
                } else {
                    write!(
                        f,
                        "impossible to pair {provided} dimension(s) with a container of rank {min}..={max}"
                    )
                }
            }
            ShapeError::ExtentMismatch { dim, expected, actual } => {
                write!(
                    f,
                    "mismatching extents: expected {expected} for dimension {dim}, but got {actual}"
                )
            }
            ShapeError::NotFlat => {
                write!(f, "container layout is not a contiguous flat buffer")
            }
            ShapeError::BufferSize { expected, actual } => {
                write!(
                    f,
                    "flat buffer holds {actual} element(s) but the shape requires {expected}"
                )
            }
        }
    }
}

impl std::error::Error for ShapeError {}

/// Total number of elements implied by a shape descriptor.
///
/// The empty descriptor describes a scalar and yields 1.
pub fn total_elements(dims: &[u64]) -> usize {
    dims.iter().product::<u64>() as usize
}

// ---------------------------------------------------------------------------
// Shape / ShapeMut / Build
// ---------------------------------------------------------------------------

/// Adapter from a (possibly nested) container type to flat row-major
/// storage.
///
/// # Safety
///
/// The two layout flags carry obligations the zero-copy fast path relies
/// on when reinterpreting memory:
///
/// - `NESTABLE` asserts that `Self` is layout-identical to
///   `[Self::Elem; size_of::<Self>() / size_of::<Self::Elem>()]`, with no
///   padding, so a contiguous run of `Self` values may be viewed as a
///   contiguous run of elements.
/// - `TRIVIAL` asserts that, when `as_flat` returns `Ok(Some(..))`, the
///   returned slice aliases the container's own backing storage and covers
///   exactly `rank`/`dims` worth of elements in row-major order.
pub unsafe trait Shape {
    /// The leaf element type ultimately stored in the flat buffer.
    type Elem: Pod;

    /// Smallest rank a value of this type can represent (static nesting
    /// plus the minimum contributed by the element type).
    const MIN_RANK: usize;
    /// Largest rank a value of this type can represent.
    const MAX_RANK: usize;
    /// Whether the in-memory layout is already a valid flat buffer, making
    /// zero-copy access through [`Shape::as_flat`] legal.
    const TRIVIAL: bool;
    /// Whether values of this type may be embedded contiguously inside an
    /// outer container's flat storage.
    const NESTABLE: bool;

    /// Runtime rank. Empty containers fall back to [`Shape::MIN_RANK`]
    /// since there is no element to inspect.
    fn rank(&self) -> usize;

    /// Per-dimension extents, own static dimensions first, then the
    /// sub-shape of the first element (homogeneity across elements is
    /// assumed here and enforced during [`Shape::flatten`]).
    fn dims(&self) -> Vec<u64>;

    /// Validate that this container can be paired with the given shape
    /// descriptor: enough dimensions, and every fixed extent equal to the
    /// corresponding descriptor extent. Performs no mutation.
    fn check(&self, dims: &[u64]) -> Result<(), ShapeError>;

    /// Zero-copy view of the backing storage.
    ///
    /// Returns `Ok(Some(..))` when the container is non-empty and its
    /// memory is row-major contiguous, `Ok(None)` when it is empty or
    /// (for runtime-layout types) not contiguous — callers then fall back
    /// to [`Shape::flatten`]. Calling this on a non-[`TRIVIAL`] adapter is
    /// a programming error and fails with [`ShapeError::NotFlat`].
    ///
    /// [`TRIVIAL`]: Shape::TRIVIAL
    fn as_flat(&self) -> Result<Option<&[Self::Elem]>, ShapeError>;

    /// Serialize into `out` in row-major order, iterating the outermost
    /// dimension slowest and advancing the cursor by the product of all
    /// deeper extents after each leaf. Each element's extent along the
    /// traversed dimension is validated against `dims`; ragged input fails
    /// with [`ShapeError::ExtentMismatch`].
    fn flatten(&self, dims: &[u64], out: &mut [Self::Elem]) -> Result<(), ShapeError>;
}

/// Containers whose contents can be overwritten from a flat buffer.
pub unsafe trait ShapeMut: Shape {
    /// Mutable variant of [`Shape::as_flat`], with the same contract.
    fn as_flat_mut(&mut self) -> Result<Option<&mut [Self::Elem]>, ShapeError>;

    /// The mirror of [`Shape::flatten`]: read elements out of `buf` in the
    /// same nested iteration order and store them into this container.
    /// Resizable containers take the descriptor's shape; fixed-extent
    /// containers fail on any mismatch before mutating that subtree.
    fn unflatten(&mut self, dims: &[u64], buf: &[Self::Elem]) -> Result<(), ShapeError>;
}

/// Owned containers that can be allocated to a given shape.
pub unsafe trait Build: ShapeMut + Clone + Sized {
    /// Allocate a container of the given shape with zero-filled leaves.
    fn with_shape(dims: &[u64]) -> Result<Self, ShapeError>;

    /// Allocate and fill from a flat buffer in one step.
    fn from_flat(dims: &[u64], buf: &[Self::Elem]) -> Result<Self, ShapeError> {
        let mut value = Self::with_shape(dims)?;
        value.unflatten(dims, buf)?;
        Ok(value)
    }
}

#[doc(hidden)]
pub fn rank_guard<T: Shape + ?Sized>(provided: usize) -> Result<(), ShapeError> {
    if provided < T::MIN_RANK || provided > T::MAX_RANK {
        return Err(ShapeError::RankMismatch {
            min: T::MIN_RANK,
            max: T::MAX_RANK,
            provided,
        });
    }
    Ok(())
}

#[doc(hidden)]
pub fn buffer_guard(expected: usize, actual: usize) -> Result<(), ShapeError> {
    if expected != actual {
        return Err(ShapeError::BufferSize { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_elements_scalar_is_one() {
        assert_eq!(total_elements(&[]), 1);
    }

    #[test]
    fn total_elements_product() {
        assert_eq!(total_elements(&[2, 3, 4]), 24);
        assert_eq!(total_elements(&[5, 0]), 0);
    }

    #[test]
    fn error_display() {
        let err = ShapeError::RankMismatch { min: 2, max: 2, provided: 1 };
        assert_eq!(
            err.to_string(),
            "impossible to pair 1 dimension(s) with a container of rank 2"
        );

        let err = ShapeError::ExtentMismatch { dim: 1, expected: 3, actual: 4 };
        assert_eq!(
            err.to_string(),
            "mismatching extents: expected 3 for dimension 1, but got 4"
        );

        let err = ShapeError::BufferSize { expected: 6, actual: 5 };
        assert!(err.to_string().contains("requires 6"));
    }
}
