//! Sparse topology views over one graph's edge set
//!
//! CSR and COO are two encodings of the same directed multigraph: both
//! enumerate the identical multiset of (row, col, edge-id) triples, possibly
//! in different physical order. Physical position `p` resolves to logical
//! edge id `data[p]` when the optional `data` tensor is present, else to `p`
//! itself.

mod coo;
mod csr;
mod format;

pub use coo::CooMatrix;
pub use csr::CsrMatrix;
pub use format::SparseFormat;
