//! Typed CPU kernel drivers
//!
//! Drivers are monomorphized over the index type, the element type, and the
//! operator (plus the reducer for comparing aggregation). They operate on
//! host slices; the dispatch layer above resolves dtypes and operator names
//! and hands them raw feature data.

pub mod sddmm;
pub mod spmm;
