//! COO topology view: struct, creation, getters

use crate::dtype::{DType, IdElement};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::format::SparseFormat;

/// COO (Coordinate) topology view over one edge set
///
/// `row` and `col` are parallel arrays of length nnz. The optional `data`
/// tensor carries the same identity-or-permutation edge-id contract as
/// [`CsrMatrix`](super::CsrMatrix): position `p` is edge `data[p]` when
/// present, else edge `p`.
#[derive(Debug, Clone)]
pub struct CooMatrix<R: Runtime> {
    pub(crate) row: Tensor<R>,
    pub(crate) col: Tensor<R>,
    pub(crate) data: Option<Tensor<R>>,
    pub(crate) shape: [usize; 2],
}

impl<R: Runtime> CooMatrix<R> {
    /// Create a new COO view from components
    ///
    /// # Errors
    ///
    /// Returns an error if the arrays have different lengths or the index
    /// tensors do not share one integer dtype.
    pub fn new(
        row: Tensor<R>,
        col: Tensor<R>,
        data: Option<Tensor<R>>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let nnz = row.numel();
        if col.numel() != nnz {
            return Err(Error::ShapeMismatch {
                expected: vec![nnz],
                got: vec![col.numel()],
            });
        }

        let idtype = row.dtype();
        if !idtype.is_index() {
            return Err(Error::unsupported_dtype(idtype, "coo row"));
        }
        if col.dtype() != idtype {
            return Err(Error::DTypeMismatch {
                lhs: idtype,
                rhs: col.dtype(),
            });
        }

        if let Some(ref d) = data {
            if d.numel() != nnz {
                return Err(Error::ShapeMismatch {
                    expected: vec![nnz],
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

        if row.ndim() != 1 || col.ndim() != 1 {
            return Err(Error::Internal(format!(
                "Expected 1D index tensors, got row: {}D, col: {}D",
                row.ndim(),
                col.ndim()
            )));
        }

        Ok(Self {
            row,
            col,
            data,
            shape,
        })
    }

    /// Create a COO view from host slices
    ///
    /// Validates that every index is in range for `shape`.
    pub fn from_slices<I: IdElement>(
        rows: &[I],
        cols: &[I],
        data: Option<&[I]>,
        shape: [usize; 2],
        device: &R::Device,
    ) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![rows.len()],
                got: vec![cols.len()],
            });
        }

        for (&r, &c) in rows.iter().zip(cols.iter()) {
            if r.to_usize() >= shape[0] {
                return Err(Error::IndexOutOfBounds {
                    index: r.to_usize(),
                    size: shape[0],
                });
            }
            if c.to_usize() >= shape[1] {
                return Err(Error::IndexOutOfBounds {
                    index: c.to_usize(),
                    size: shape[1],
                });
            }
        }

        let row_tensor = Tensor::try_from_slice(rows, &[rows.len()], device)?;
        let col_tensor = Tensor::try_from_slice(cols, &[cols.len()], device)?;
        let data_tensor = match data {
            Some(d) => Some(Tensor::try_from_slice(d, &[d.len()], device)?),
            None => None,
        };

        Self::new(row_tensor, col_tensor, data_tensor, shape)
    }

    /// Returns the format tag
    pub fn format(&self) -> SparseFormat {
        SparseFormat::Coo
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
        self.row.numel()
    }

    /// Returns the row indices tensor
    pub fn row(&self) -> &Tensor<R> {
        &self.row
    }

    /// Returns the column indices tensor
    pub fn col(&self) -> &Tensor<R> {
        &self.col
    }

    /// Returns the edge-id mapping tensor, if any
    pub fn data(&self) -> Option<&Tensor<R>> {
        self.data.as_ref()
    }

    /// Returns the integer dtype of the index tensors
    #[inline]
    pub fn index_dtype(&self) -> DType {
        self.row.dtype()
    }
}
