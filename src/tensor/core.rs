//! Core Tensor type

use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;

/// N-dimensional array stored on a compute device
///
/// `Tensor` consists of:
/// - **Storage**: Reference-counted device memory
/// - **Layout**: Shape, strides, and offset defining the view into storage
/// - **DType**: Element type (determined at runtime, from storage)
///
/// Operations like `transpose` create new tensors that share the same
/// underlying storage through Arc-wrapped storage and a modified layout.
pub struct Tensor<R: Runtime> {
    /// Device memory
    storage: Storage<R>,
    /// Shape, strides, offset
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape`
    /// dimensions. For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let storage = Storage::from_slice(data, device)?;
        let layout = Layout::contiguous(shape);

        Ok(Self { storage, layout })
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::try_zeros(shape, dtype, device).expect("Tensor::zeros failed")
    }

    /// Create a tensor filled with zeros (fallible version)
    pub fn try_zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        let storage = Storage::new(len, dtype, device)?;
        let layout = Layout::contiguous(shape);

        Ok(Self { storage, layout })
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if memory is contiguous (row-major order)
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Product of all dimensions after the first
    ///
    /// This is the flattened per-row feature length. Returns 1 for a 1-D
    /// tensor.
    #[inline]
    pub fn feat_len(&self) -> usize {
        self.shape().iter().skip(1).product()
    }

    // ===== Views =====

    /// Create a transposed view (swap two dimensions, zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let layout = self
            .layout
            .transpose(dim0, dim1)
            .ok_or_else(|| Error::invalid_arg("dim", "transpose dimension out of range"))?;

        Ok(Self {
            storage: self.storage.clone(),
            layout,
        })
    }

    // ===== Host transfer =====

    /// Copy the tensor contents to a host `Vec`
    ///
    /// The tensor must be contiguous; views must be materialized first.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        debug_assert!(self.is_contiguous());
        self.storage.to_vec()
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone shares the storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::CpuRuntime;
    use crate::runtime::Runtime as _;

    #[test]
    fn test_from_slice_roundtrip() {
        let device = CpuRuntime::default_device();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.numel(), 4);
        assert!(t.is_contiguous());
        assert_eq!(t.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_slice_shape_mismatch() {
        let device = CpuRuntime::default_device();
        let r = Tensor::<CpuRuntime>::try_from_slice(&[1.0f32, 2.0, 3.0], &[2, 2], &device);
        assert!(r.is_err());
    }

    #[test]
    fn test_zeros() {
        let device = CpuRuntime::default_device();
        let t = Tensor::<CpuRuntime>::zeros(&[3, 2], DType::F64, &device);
        assert_eq!(t.to_vec::<f64>(), vec![0.0; 6]);
    }

    #[test]
    fn test_transpose_view() {
        let device = CpuRuntime::default_device();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        let v = t.transpose(0, 1).unwrap();
        assert!(!v.is_contiguous());
        assert_eq!(v.shape(), &[2, 2]);
    }

    #[test]
    fn test_feat_len() {
        let device = CpuRuntime::default_device();
        let t = Tensor::<CpuRuntime>::zeros(&[5, 2, 3], DType::F32, &device);
        assert_eq!(t.feat_len(), 6);
    }
}
