//! Runtime abstraction layer
//!
//! The trait family decouples tensors and kernels from a concrete compute
//! device. The CPU backend is the reference implementation; a second backend
//! implements the same traits plus [`GraphKernels`](crate::kernel::GraphKernels).

mod traits;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use traits::{Device, Runtime, RuntimeClient};
