//! Leaf adapters for primitive numeric scalars.
//!
//! A leaf contributes rank 0, is its own flat buffer, and may be embedded
//! in any outer container's storage. The [`impl_leaf!`](crate::impl_leaf)
//! macro is exported so downstream crates can register additional `Pod`
//! wire types (e.g. object references) as leaves.

/// Implement [`Shape`](crate::Shape), [`ShapeMut`](crate::ShapeMut), and
/// [`Build`](crate::Build) for a `Pod` type acting as a rank-0 leaf.
#[macro_export]
macro_rules! impl_leaf {
    ($($ty:ty),* $(,)?) => {$(
        // SAFETY: a leaf is trivially its own single-element flat buffer;
        // the caller guarantees `Pod`, which rules out padding.
        unsafe impl $crate::Shape for $ty {
            type Elem = $ty;

            const MIN_RANK: usize = 0;
            const MAX_RANK: usize = 0;
            const TRIVIAL: bool = true;
            const NESTABLE: bool = true;

            fn rank(&self) -> usize {
                0
            }

            fn dims(&self) -> Vec<u64> {
                Vec::new()
            }

            fn check(&self, _dims: &[u64]) -> Result<(), $crate::ShapeError> {
                Ok(())
            }

            fn as_flat(&self) -> Result<Option<&[Self::Elem]>, $crate::ShapeError> {
                Ok(Some(core::slice::from_ref(self)))
            }

            fn flatten(
                &self,
                _dims: &[u64],
                out: &mut [Self::Elem],
            ) -> Result<(), $crate::ShapeError> {
                $crate::buffer_guard(1, out.len())?;
                out[0] = *self;
                Ok(())
            }
        }

        unsafe impl $crate::ShapeMut for $ty {
            fn as_flat_mut(&mut self) -> Result<Option<&mut [Self::Elem]>, $crate::ShapeError> {
                Ok(Some(core::slice::from_mut(self)))
            }

            fn unflatten(
                &mut self,
                _dims: &[u64],
                buf: &[Self::Elem],
            ) -> Result<(), $crate::ShapeError> {
                $crate::buffer_guard(1, buf.len())?;
                *self = buf[0];
                Ok(())
            }
        }

        unsafe impl $crate::Build for $ty {
            fn with_shape(dims: &[u64]) -> Result<Self, $crate::ShapeError> {
                $crate::rank_guard::<$ty>(dims.len())?;
                Ok(<$ty as $crate::bytemuck::Zeroable>::zeroed())
            }
        }
    )*};
}

impl_leaf!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

#[cfg(test)]
mod tests {
    use crate::{Build, Shape, ShapeError, ShapeMut};

    #[test]
    fn scalar_rank_and_dims() {
        let x = 42.0f64;
        assert_eq!(x.rank(), 0);
        assert!(x.dims().is_empty());
        assert_eq!(f64::MIN_RANK, 0);
        assert_eq!(f64::MAX_RANK, 0);
        assert!(f64::TRIVIAL);
        assert!(f64::NESTABLE);
    }

    #[test]
    fn scalar_flat_view_is_self() {
        let x = 7i32;
        let flat = x.as_flat().unwrap().unwrap();
        assert_eq!(flat, &[7]);
        assert_eq!(flat.as_ptr(), &x as *const i32);
    }

    #[test]
    fn scalar_roundtrip() {
        let x = 2.5f32;
        let mut buf = [0.0f32];
        x.flatten(&[], &mut buf).unwrap();
        assert_eq!(buf, [2.5]);

        let y = f32::from_flat(&[], &buf).unwrap();
        assert_eq!(y, 2.5);
    }

    #[test]
    fn scalar_unflatten_overwrites() {
        let mut x = 0u64;
        x.unflatten(&[], &[99]).unwrap();
        assert_eq!(x, 99);
    }

    #[test]
    fn scalar_rejects_wrong_buffer_len() {
        let x = 1u8;
        let mut buf = [0u8; 2];
        let err = x.flatten(&[], &mut buf).unwrap_err();
        assert_eq!(err, ShapeError::BufferSize { expected: 1, actual: 2 });
    }

    #[test]
    fn scalar_with_shape_rejects_dimensions() {
        let err = f64::with_shape(&[3]).unwrap_err();
        assert!(matches!(err, ShapeError::RankMismatch { provided: 1, .. }));
    }
}
