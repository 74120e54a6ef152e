//! Single-relation graph snapshot exposing CSR/COO topology views
//!
//! The kernels operate on one relation at a time; heterogeneous graphs must
//! be decomposed by the caller beforehand. A `Graph` owns the relation's COO
//! triples (in edge-id order) and derives row-compressed views on demand:
//! [`Graph::csr`] is source-oriented (rows are source nodes) and
//! [`Graph::csc`] is destination-oriented. Derived views carry an explicit
//! edge-id permutation so physical order never changes which logical edge an
//! output slot belongs to.

use crate::dtype::{DType, IdElement};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::sparse::{CooMatrix, CsrMatrix};
use crate::dispatch_id_dtype;
use std::sync::OnceLock;

/// A single-relation directed multigraph snapshot
#[derive(Debug)]
pub struct Graph<R: Runtime> {
    coo: CooMatrix<R>,
    csr: OnceLock<CsrMatrix<R>>,
    csc: OnceLock<CsrMatrix<R>>,
}

impl<R: Runtime> Graph<R> {
    /// Build a graph from (source, destination) edge endpoint lists
    ///
    /// Edge `e` connects `src[e] -> dst[e]`; the position in the lists is the
    /// logical edge id.
    pub fn from_edges<I: IdElement>(
        src: &[I],
        dst: &[I],
        num_src_nodes: usize,
        num_dst_nodes: usize,
        device: &R::Device,
    ) -> Result<Self> {
        let coo =
            CooMatrix::from_slices(src, dst, None, [num_src_nodes, num_dst_nodes], device)?;
        Ok(Self::from_coo(coo))
    }

    /// Build a graph from an existing COO view
    pub fn from_coo(coo: CooMatrix<R>) -> Self {
        Self {
            coo,
            csr: OnceLock::new(),
            csc: OnceLock::new(),
        }
    }

    /// Number of relations in this snapshot (always 1)
    #[inline]
    pub fn num_relations(&self) -> usize {
        1
    }

    /// Number of source nodes
    #[inline]
    pub fn num_src_nodes(&self) -> usize {
        self.coo.num_rows()
    }

    /// Number of destination nodes
    #[inline]
    pub fn num_dst_nodes(&self) -> usize {
        self.coo.num_cols()
    }

    /// Number of edges
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.coo.nnz()
    }

    /// Integer dtype of the topology tensors
    #[inline]
    pub fn index_dtype(&self) -> DType {
        self.coo.index_dtype()
    }

    /// Device the topology tensors live on
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.coo.row().device()
    }

    /// The COO view (source in `row`, destination in `col`)
    pub fn coo(&self) -> &CooMatrix<R> {
        &self.coo
    }

    /// The source-oriented CSR view (rows are source nodes)
    ///
    /// Derived from the COO triples on first use and cached.
    pub fn csr(&self) -> Result<&CsrMatrix<R>> {
        if let Some(csr) = self.csr.get() {
            return Ok(csr);
        }
        let built = self.compress(false)?;
        Ok(self.csr.get_or_init(|| built))
    }

    /// The destination-oriented CSR view (rows are destination nodes)
    ///
    /// Rows walk incoming edges; `indices` holds source nodes. Derived from
    /// the COO triples on first use and cached.
    pub fn csc(&self) -> Result<&CsrMatrix<R>> {
        if let Some(csc) = self.csc.get() {
            return Ok(csc);
        }
        let built = self.compress(true)?;
        Ok(self.csc.get_or_init(|| built))
    }

    fn compress(&self, transpose: bool) -> Result<CsrMatrix<R>> {
        dispatch_id_dtype!(self.index_dtype(), I => {
            compress_coo::<R, I>(&self.coo, transpose)
        }, "graph compress")
    }
}

/// Row-compress COO triples by counting sort, preserving logical edge ids
/// through an explicit `data` permutation.
fn compress_coo<R: Runtime, I: IdElement>(
    coo: &CooMatrix<R>,
    transpose: bool,
) -> Result<CsrMatrix<R>> {
    let device = coo.row().device().clone();
    let (keys, vals): (Vec<I>, Vec<I>) = if transpose {
        (coo.col().to_vec(), coo.row().to_vec())
    } else {
        (coo.row().to_vec(), coo.col().to_vec())
    };
    let eids: Option<Vec<I>> = coo.data().map(|d| d.to_vec::<I>());

    let (num_rows, num_cols) = if transpose {
        (coo.num_cols(), coo.num_rows())
    } else {
        (coo.num_rows(), coo.num_cols())
    };
    let nnz = keys.len();

    let mut indptr = vec![0usize; num_rows + 1];
    for &k in &keys {
        indptr[k.to_usize() + 1] += 1;
    }
    for r in 0..num_rows {
        indptr[r + 1] += indptr[r];
    }

    let mut indices = vec![I::zero(); nnz];
    let mut data = vec![I::zero(); nnz];
    let mut next: Vec<usize> = indptr[..num_rows].to_vec();
    for p in 0..nnz {
        let r = keys[p].to_usize();
        let slot = next[r];
        next[r] += 1;
        indices[slot] = vals[p];
        data[slot] = match &eids {
            Some(ids) => ids[p],
            None => I::from_usize(p),
        };
    }

    let indptr_typed: Vec<I> = indptr.iter().map(|&v| I::from_usize(v)).collect();
    CsrMatrix::from_slices(
        &indptr_typed,
        &indices,
        Some(&data),
        [num_rows, num_cols],
        &device,
    )
}
