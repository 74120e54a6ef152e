//! CSR topology view: struct, creation, getters

use crate::dtype::{DType, IdElement};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::format::SparseFormat;

/// CSR (Compressed Sparse Row) topology view over one edge set
///
/// `indptr` has length `num_rows + 1` and is monotonically non-decreasing
/// with `indptr[0] == 0`; `indices` holds the column index of each physical
/// edge position. The optional `data` tensor maps a physical position to its
/// logical edge id; when absent, position `p` is edge `p` itself.
///
/// Index tensors share one integer dtype (I64 or I32).
#[derive(Debug, Clone)]
pub struct CsrMatrix<R: Runtime> {
    pub(crate) indptr: Tensor<R>,
    pub(crate) indices: Tensor<R>,
    pub(crate) data: Option<Tensor<R>>,
    pub(crate) shape: [usize; 2],
}

impl<R: Runtime> CsrMatrix<R> {
    /// Create a new CSR view from components
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `indptr` length != num_rows + 1
    /// - `data` (when present) and `indices` have different lengths
    /// - index tensors are not all of one integer dtype
    pub fn new(
        indptr: Tensor<R>,
        indices: Tensor<R>,
        data: Option<Tensor<R>>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let [num_rows, _num_cols] = shape;

        if indptr.numel() != num_rows + 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![num_rows + 1],
                got: vec![indptr.numel()],
            });
        }

        let idtype = indptr.dtype();
        if !idtype.is_index() {
            return Err(Error::unsupported_dtype(idtype, "csr indptr"));
        }
        if indices.dtype() != idtype {
            return Err(Error::DTypeMismatch {
                lhs: idtype,
                rhs: indices.dtype(),
            });
        }

        if let Some(ref d) = data {
            if d.numel() != indices.numel() {
                return Err(Error::ShapeMismatch {
                    expected: vec![indices.numel()],
                    got: vec![d.numel()],
                });
            }
            if d.dtype() != idtype {
                return Err(Error::DTypeMismatch {
                    lhs: idtype,
                    rhs: d.dtype(),
                });
            }
        }

        if indptr.ndim() != 1 || indices.ndim() != 1 {
            return Err(Error::Internal(format!(
                "Expected 1D index tensors, got indptr: {}D, indices: {}D",
                indptr.ndim(),
                indices.ndim()
            )));
        }

        Ok(Self {
            indptr,
            indices,
            data,
            shape,
        })
    }

    /// Create a CSR view from host slices
    ///
    /// Validates that `indptr` is well-formed and that every column index is
    /// in range.
    pub fn from_slices<I: IdElement>(
        indptr: &[I],
        indices: &[I],
        data: Option<&[I]>,
        shape: [usize; 2],
        device: &R::Device,
    ) -> Result<Self> {
        let [num_rows, num_cols] = shape;

        if indptr.len() != num_rows + 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![num_rows + 1],
                got: vec![indptr.len()],
            });
        }

        let nnz = indices.len();
        if indptr[0].to_usize() != 0 || indptr[num_rows].to_usize() != nnz {
            return Err(Error::Internal(format!(
                "Invalid indptr: expected [0]=0 and [{}]={}, got [0]={} and [{}]={}",
                num_rows,
                nnz,
                indptr[0].to_usize(),
                num_rows,
                indptr[num_rows].to_usize()
            )));
        }
        for w in indptr.windows(2) {
            if w[1] < w[0] {
                return Err(Error::Internal(
                    "Invalid indptr: not monotonically non-decreasing".to_string(),
                ));
            }
        }

        for &c in indices {
            if c.to_usize() >= num_cols {
                return Err(Error::IndexOutOfBounds {
                    index: c.to_usize(),
                    size: num_cols,
                });
            }
        }

        let indptr_tensor = Tensor::try_from_slice(indptr, &[indptr.len()], device)?;
        let indices_tensor = Tensor::try_from_slice(indices, &[indices.len()], device)?;
        let data_tensor = match data {
            Some(d) => Some(Tensor::try_from_slice(d, &[d.len()], device)?),
            None => None,
        };

        Self::new(indptr_tensor, indices_tensor, data_tensor, shape)
    }

    /// Returns the format tag
    pub fn format(&self) -> SparseFormat {
        SparseFormat::Csr
    }

    /// Returns the shape as [num_rows, num_cols]
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Returns the number of rows
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.shape[0]
    }

    /// Returns the number of columns
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.shape[1]
    }

    /// Returns the number of edges (nonzeros)
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.numel()
    }

    /// Returns the row pointers tensor
    pub fn indptr(&self) -> &Tensor<R> {
        &self.indptr
    }

    /// Returns the column indices tensor
    pub fn indices(&self) -> &Tensor<R> {
        &self.indices
    }

    /// Returns the edge-id mapping tensor, if any
    ///
    /// Absent means the identity mapping: physical position `p` is edge `p`.
    pub fn data(&self) -> Option<&Tensor<R>> {
        self.data.as_ref()
    }

    /// Returns the integer dtype of the index tensors
    #[inline]
    pub fn index_dtype(&self) -> DType {
        self.indptr.dtype()
    }
}
