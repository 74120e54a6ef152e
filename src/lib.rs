//! # gspmm
//!
//! **Generalized sparse kernels for graph message passing.**
//!
//! gspmm implements the two operations that cover most message-passing
//! computations on graphs:
//!
//! - **SDDMM** ([`kernel::sddmm`]): combine the endpoint features of every
//!   edge into a per-edge output (sampled dense-dense matrix multiplication)
//! - **SpMM** ([`kernel::spmm`]): combine source-node and edge features
//!   along every incoming edge and aggregate them into a per-node output
//!   (sparse-dense matrix multiplication)
//!
//! Both are parameterized by a named binary operator (`add`, `sub`, `mul`,
//! `div`, `copy_lhs`, `copy_rhs`, `dot`) and, for SpMM, a reducer (`sum`,
//! `max`, `min`). Operand feature shapes broadcast NumPy-style over trailing
//! dimensions without materialization.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gspmm::prelude::*;
//!
//! let device = CpuRuntime::default_device();
//! // edges: 0->1, 1->2, 0->2
//! let graph = Graph::<CpuRuntime>::from_edges(&[0i64, 1, 0], &[1i64, 2, 2], 3, 3, &device)?;
//!
//! let u = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1], &device);
//! let v = Tensor::from_slice(&[10.0f32, 20.0, 30.0], &[3, 1], &device);
//! let mut out = Tensor::zeros(&[3, 1], DType::F32, &device);
//! gspmm::kernel::sddmm(&graph, "mul", Some(&u), Some(&v), &mut out)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded CPU kernels
//! - `f16`: Half-precision floats (F16, BF16)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub mod graph;
pub mod kernel;
pub mod ops;
pub mod runtime;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::graph::Graph;
    pub use crate::kernel::{sddmm, spmm, BcastOff, GraphKernels};
    pub use crate::ops::ReduceOp;
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::sparse::{CooMatrix, CsrMatrix, SparseFormat};
    pub use crate::tensor::{Layout, Tensor};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::CpuRuntime;
}

/// Default runtime based on enabled features
#[cfg(feature = "cpu")]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
