//! Adapters for `ndarray` arrays and views.
//!
//! Unlike slices and fixed-size arrays, an `ndarray` view carries its
//! strides at runtime, so zero-copy eligibility is a runtime property:
//! `as_flat` hands out the backing storage only for row-major contiguous
//! data and returns `Ok(None)` otherwise, leaving strided views to the
//! element-by-element copy path.

use ndarray::{Array, ArrayBase, Data, DataMut, Dimension, IxDyn};

use crate::containers::{flat_view, flat_view_mut};
use crate::{buffer_guard, total_elements, Build, Shape, ShapeError, ShapeMut};

fn own_extent_check(shape: &[usize], dims: &[u64]) -> Result<(), ShapeError> {
    for (r, (&have, &want)) in shape.iter().zip(dims.iter()).enumerate() {
        if have as u64 != want {
            return Err(ShapeError::ExtentMismatch {
                dim: r,
                expected: have as u64,
                actual: want,
            });
        }
    }
    Ok(())
}

// SAFETY: `TRIVIAL` defers to the element's `NESTABLE` guarantee and
// `as_flat` additionally demands standard (row-major contiguous) layout at
// runtime before exposing storage; an ndarray is never `NESTABLE` itself.
unsafe impl<A, S, D> Shape for ArrayBase<S, D>
where
    A: Shape + 'static,
    S: Data<Elem = A>,
    D: Dimension,
{
    type Elem = A::Elem;

    const MIN_RANK: usize = (match D::NDIM {
        Some(n) => n,
        None => 0,
    }) + A::MIN_RANK;
    const MAX_RANK: usize = match D::NDIM {
        Some(n) => n + A::MAX_RANK,
        None => crate::MAX_SUPPORTED_RANK,
    };
    const TRIVIAL: bool = A::NESTABLE;
    const NESTABLE: bool = false;

    fn rank(&self) -> usize {
        match self.iter().next() {
            Some(first) => self.ndim() + first.rank(),
            None => Self::MIN_RANK,
        }
    }

    fn dims(&self) -> Vec<u64> {
        let mut dims: Vec<u64> = self.shape().iter().map(|&n| n as u64).collect();
        if let Some(first) = self.iter().next() {
            dims.extend(first.dims());
        }
        dims
    }

    fn check(&self, dims: &[u64]) -> Result<(), ShapeError> {
        if dims.len() < self.ndim() {
            return Err(ShapeError::RankMismatch {
                min: Self::MIN_RANK,
                max: Self::MAX_RANK,
                provided: dims.len(),
            });
        }
        own_extent_check(self.shape(), dims)?;
        if let Some(first) = self.iter().next() {
            first.check(&dims[self.ndim()..])?;
        }
        Ok(())
    }

    fn as_flat(&self) -> Result<Option<&[Self::Elem]>, ShapeError> {
        if !A::NESTABLE {
            return Err(ShapeError::NotFlat);
        }
        match self.as_slice() {
            // `flat_view` also maps the empty case to `None`.
            Some(slice) => flat_view(slice),
            None => Ok(None),
        }
    }

    fn flatten(&self, dims: &[u64], out: &mut [Self::Elem]) -> Result<(), ShapeError> {
        let ndim = self.ndim();
        if dims.len() < ndim {
            return Err(ShapeError::RankMismatch {
                min: Self::MIN_RANK,
                max: Self::MAX_RANK,
                provided: dims.len(),
            });
        }
        let (own, sub) = dims.split_at(ndim);
        own_extent_check(self.shape(), own)?;
        let subsize = total_elements(sub);
        buffer_guard(self.len() * subsize, out.len())?;
        if subsize == 0 {
            for elem in self.iter() {
                elem.flatten(sub, &mut [])?;
            }
            return Ok(());
        }
        // `iter()` visits elements in logical (row-major) order regardless
        // of the underlying strides.
        for (elem, chunk) in self.iter().zip(out.chunks_exact_mut(subsize)) {
            elem.flatten(sub, chunk)?;
        }
        Ok(())
    }
}

unsafe impl<A, S, D> ShapeMut for ArrayBase<S, D>
where
    A: ShapeMut + 'static,
    S: DataMut<Elem = A>,
    D: Dimension,
{
    fn as_flat_mut(&mut self) -> Result<Option<&mut [Self::Elem]>, ShapeError> {
        if !A::NESTABLE {
            return Err(ShapeError::NotFlat);
        }
        match self.as_slice_mut() {
            Some(slice) => flat_view_mut(slice),
            None => Ok(None),
        }
    }

    fn unflatten(&mut self, dims: &[u64], buf: &[Self::Elem]) -> Result<(), ShapeError> {
        let ndim = self.ndim();
        if dims.len() < ndim {
            return Err(ShapeError::RankMismatch {
                min: Self::MIN_RANK,
                max: Self::MAX_RANK,
                provided: dims.len(),
            });
        }
        let (own, sub) = dims.split_at(ndim);
        own_extent_check(self.shape(), own)?;
        let subsize = total_elements(sub);
        buffer_guard(self.len() * subsize, buf.len())?;
        if subsize == 0 {
            for elem in self.iter_mut() {
                elem.unflatten(sub, &[])?;
            }
            return Ok(());
        }
        for (elem, chunk) in self.iter_mut().zip(buf.chunks_exact(subsize)) {
            elem.unflatten(sub, chunk)?;
        }
        Ok(())
    }
}

// Owned arrays can be allocated to a shape. When the dimensionality is
// dynamic (`IxDyn`), the element's static rank decides how many trailing
// descriptor dimensions belong to the element type.
unsafe impl<A, D> Build for Array<A, D>
where
    A: Build + 'static,
    D: Dimension,
{
    fn with_shape(dims: &[u64]) -> Result<Self, ShapeError> {
        let own_n = match D::NDIM {
            Some(n) => n,
            None => dims.len().saturating_sub(A::MIN_RANK),
        };
        if dims.len() < own_n + A::MIN_RANK {
            return Err(ShapeError::RankMismatch {
                min: Self::MIN_RANK,
                max: Self::MAX_RANK,
                provided: dims.len(),
            });
        }
        let shape: Vec<usize> = dims[..own_n].iter().map(|&d| d as usize).collect();
        let proto = A::with_shape(&dims[own_n..])?;
        Array::from_elem(IxDyn(&shape), proto)
            .into_dimensionality::<D>()
            .map_err(|_| ShapeError::RankMismatch {
                min: Self::MIN_RANK,
                max: Self::MAX_RANK,
                provided: dims.len(),
            })
    }
}
