//! CPU runtime backend
//!
//! Kernels run over host memory, parallelized with rayon when the feature is
//! enabled. The dispatch layer lives here: runtime dtypes and operator names
//! become concrete type parameters of the typed drivers in [`kernels`].

pub mod client;
pub mod device;
pub mod kernels;
pub mod runtime;

pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;

use crate::dtype::Element;
use crate::error::Result;
use crate::kernel::{BcastOff, GraphKernels};
use crate::ops::{Max, Min, ReduceOp};
use crate::sparse::{CooMatrix, CsrMatrix};
use crate::tensor::Tensor;
use crate::{dispatch_float_dtype, dispatch_id_dtype, switch_op};

/// View a CPU tensor's storage as a typed host slice
///
/// # Safety
///
/// The tensor must be contiguous and its dtype must correspond to `T`.
unsafe fn host_slice<T: Element>(t: &Tensor<CpuRuntime>) -> &[T] {
    debug_assert_eq!(t.dtype(), T::DTYPE);
    debug_assert!(t.is_contiguous());
    std::slice::from_raw_parts(t.storage().ptr() as *const T, t.numel())
}

/// Mutable variant of [`host_slice`]
///
/// # Safety
///
/// Same as [`host_slice`]; additionally the storage must not be shared with
/// another live view.
unsafe fn host_slice_mut<T: Element>(t: &mut Tensor<CpuRuntime>) -> &mut [T] {
    debug_assert_eq!(t.dtype(), T::DTYPE);
    debug_assert!(t.is_contiguous());
    std::slice::from_raw_parts_mut(t.storage().ptr() as *mut T, t.numel())
}

impl GraphKernels<CpuRuntime> for CpuClient {
    fn sddmm_csr(
        &self,
        csr: &CsrMatrix<CpuRuntime>,
        op: &str,
        ufeat: Option<&Tensor<CpuRuntime>>,
        vfeat: Option<&Tensor<CpuRuntime>>,
        out: &mut Tensor<CpuRuntime>,
        bcast: &BcastOff,
    ) -> Result<()> {
        dispatch_id_dtype!(csr.index_dtype(), I => {
            dispatch_float_dtype!(out.dtype(), T => {
                switch_op!(op, Op => {
                    let indptr = unsafe { host_slice::<I>(csr.indptr()) };
                    let indices = unsafe { host_slice::<I>(csr.indices()) };
                    let edges = csr.data().map(|d| unsafe { host_slice::<I>(d) });
                    let u: &[T] = ufeat.map_or(&[], |t| unsafe { host_slice::<T>(t) });
                    let v: &[T] = vfeat.map_or(&[], |t| unsafe { host_slice::<T>(t) });
                    let o = unsafe { host_slice_mut::<T>(out) };
                    kernels::sddmm::sddmm_csr::<I, T, Op>(indptr, indices, edges, u, v, o, bcast);
                    Ok(())
                })
            }, "sddmm")
        }, "sddmm")
    }

    fn sddmm_coo(
        &self,
        coo: &CooMatrix<CpuRuntime>,
        op: &str,
        ufeat: Option<&Tensor<CpuRuntime>>,
        vfeat: Option<&Tensor<CpuRuntime>>,
        out: &mut Tensor<CpuRuntime>,
        bcast: &BcastOff,
    ) -> Result<()> {
        dispatch_id_dtype!(coo.index_dtype(), I => {
            dispatch_float_dtype!(out.dtype(), T => {
                switch_op!(op, Op => {
                    let row = unsafe { host_slice::<I>(coo.row()) };
                    let col = unsafe { host_slice::<I>(coo.col()) };
                    let edges = coo.data().map(|d| unsafe { host_slice::<I>(d) });
                    let u: &[T] = ufeat.map_or(&[], |t| unsafe { host_slice::<T>(t) });
                    let v: &[T] = vfeat.map_or(&[], |t| unsafe { host_slice::<T>(t) });
                    let o = unsafe { host_slice_mut::<T>(out) };
                    kernels::sddmm::sddmm_coo::<I, T, Op>(row, col, edges, u, v, o, bcast);
                    Ok(())
                })
            }, "sddmm")
        }, "sddmm")
    }

    fn spmm_csr(
        &self,
        csr: &CsrMatrix<CpuRuntime>,
        op: &str,
        reduce: ReduceOp,
        ufeat: Option<&Tensor<CpuRuntime>>,
        efeat: Option<&Tensor<CpuRuntime>>,
        out: &mut Tensor<CpuRuntime>,
        argu: Option<&mut Tensor<CpuRuntime>>,
        arge: Option<&mut Tensor<CpuRuntime>>,
        bcast: &BcastOff,
    ) -> Result<()> {
        dispatch_id_dtype!(csr.index_dtype(), I => {
            dispatch_float_dtype!(out.dtype(), T => {
                switch_op!(op, Op => {
                    let indptr = unsafe { host_slice::<I>(csr.indptr()) };
                    let indices = unsafe { host_slice::<I>(csr.indices()) };
                    let edges = csr.data().map(|d| unsafe { host_slice::<I>(d) });
                    let u: &[T] = ufeat.map_or(&[], |t| unsafe { host_slice::<T>(t) });
                    let e: &[T] = efeat.map_or(&[], |t| unsafe { host_slice::<T>(t) });
                    let o = unsafe { host_slice_mut::<T>(out) };
                    match reduce {
                        ReduceOp::Sum => {
                            kernels::spmm::spmm_sum_csr::<I, T, Op>(
                                indptr, indices, edges, u, e, o, bcast,
                            );
                        }
                        ReduceOp::Max => {
                            let au = argu.map(|t| unsafe { host_slice_mut::<I>(t) });
                            let ae = arge.map(|t| unsafe { host_slice_mut::<I>(t) });
                            kernels::spmm::spmm_cmp_csr::<I, T, Op, Max>(
                                indptr, indices, edges, u, e, o, au, ae, bcast,
                            );
                        }
                        ReduceOp::Min => {
                            let au = argu.map(|t| unsafe { host_slice_mut::<I>(t) });
                            let ae = arge.map(|t| unsafe { host_slice_mut::<I>(t) });
                            kernels::spmm::spmm_cmp_csr::<I, T, Op, Min>(
                                indptr, indices, edges, u, e, o, au, ae, bcast,
                            );
                        }
                    }
                    Ok(())
                })
            }, "spmm")
        }, "spmm")
    }
}
