//! CPU SpMM kernels: per-edge values aggregated into per-node outputs
//!
//! Drivers walk a destination-oriented CSR view (rows are destination nodes,
//! `indices` holds sources), so each output row is owned by exactly one row
//! iteration and row-parallel execution needs no synchronization.
//!
//! The comparing drivers use strict comparison against the running
//! accumulator, so among equal extreme contributions the first edge in row
//! walk order wins, and its endpoints land in the auxiliary index outputs.

use crate::dtype::{Element, IdElement};
use crate::kernel::BcastOff;
use crate::ops::{BinaryOp, Reducer};

/// Accumulate all incoming edges of one destination row
///
/// # Safety
///
/// `out` must be valid for `num_rows * bcast.out_len` elements; no other
/// concurrent iteration may process the same `rid`.
#[inline]
unsafe fn sum_row<I: IdElement, T: Element, Op: BinaryOp<T>>(
    rid: usize,
    indptr: &[I],
    indices: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    efeat: &[T],
    out: *mut T,
    bcast: &BcastOff,
) {
    let dim = bcast.out_len;
    let lhs_dim = bcast.lhs_len;
    let rhs_dim = bcast.rhs_len;
    let reduce_size = bcast.reduce_size;

    let out_row = out.add(rid * dim);
    for k in 0..dim {
        *out_row.add(k) = T::zero();
    }
    let start = indptr[rid].to_usize();
    let end = indptr[rid + 1].to_usize();
    for j in start..end {
        let cid = indices[j].to_usize();
        let eid = match edges {
            Some(e) => e[j].to_usize(),
            None => j,
        };
        for k in 0..dim {
            let lhs_add = if bcast.use_bcast { bcast.lhs_offset[k] } else { k };
            let rhs_add = if bcast.use_bcast { bcast.rhs_offset[k] } else { k };
            let lhs = if Op::USE_LHS {
                let base = cid * lhs_dim + lhs_add * reduce_size;
                &ufeat[base..base + reduce_size]
            } else {
                &[]
            };
            let rhs = if Op::USE_RHS {
                let base = eid * rhs_dim + rhs_add * reduce_size;
                &efeat[base..base + reduce_size]
            } else {
                &[]
            };
            *out_row.add(k) = *out_row.add(k) + Op::call(lhs, rhs, reduce_size);
        }
    }
}

/// Sum-aggregated SpMM over a destination-oriented CSR view
///
/// `ufeat` is indexed by source node (the `indices` entries), `efeat` by
/// logical edge id, the output by destination node (row). Rows with no
/// incoming edges produce zeros.
pub fn spmm_sum_csr<I: IdElement, T: Element, Op: BinaryOp<T>>(
    indptr: &[I],
    indices: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    efeat: &[T],
    out: &mut [T],
    bcast: &BcastOff,
) {
    let num_rows = indptr.len() - 1;
    let out_addr = out.as_mut_ptr() as usize;

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..num_rows).into_par_iter().for_each(|rid| unsafe {
            sum_row::<I, T, Op>(
                rid,
                indptr,
                indices,
                edges,
                ufeat,
                efeat,
                out_addr as *mut T,
                bcast,
            );
        });
    }

    #[cfg(not(feature = "rayon"))]
    for rid in 0..num_rows {
        unsafe {
            sum_row::<I, T, Op>(
                rid,
                indptr,
                indices,
                edges,
                ufeat,
                efeat,
                out_addr as *mut T,
                bcast,
            );
        }
    }
}

/// Compare-aggregate all incoming edges of one destination row
///
/// # Safety
///
/// `out` (and `argu`/`arge` when non-null) must be valid for
/// `num_rows * bcast.out_len` elements; no other concurrent iteration may
/// process the same `rid`.
#[inline]
#[allow(clippy::too_many_arguments)]
unsafe fn cmp_row<I: IdElement, T: Element, Op: BinaryOp<T>, Cmp: Reducer<T>>(
    rid: usize,
    indptr: &[I],
    indices: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    efeat: &[T],
    out: *mut T,
    argu: *mut I,
    arge: *mut I,
    bcast: &BcastOff,
) {
    let dim = bcast.out_len;
    let lhs_dim = bcast.lhs_len;
    let rhs_dim = bcast.rhs_len;
    let reduce_size = bcast.reduce_size;

    let out_row = out.add(rid * dim);
    for k in 0..dim {
        *out_row.add(k) = Cmp::init();
    }
    if !argu.is_null() {
        for k in 0..dim {
            *argu.add(rid * dim + k) = I::zero();
        }
    }
    if !arge.is_null() {
        for k in 0..dim {
            *arge.add(rid * dim + k) = I::zero();
        }
    }

    let start = indptr[rid].to_usize();
    let end = indptr[rid + 1].to_usize();
    for j in start..end {
        let cid = indices[j].to_usize();
        let eid = match edges {
            Some(e) => e[j].to_usize(),
            None => j,
        };
        for k in 0..dim {
            let lhs_add = if bcast.use_bcast { bcast.lhs_offset[k] } else { k };
            let rhs_add = if bcast.use_bcast { bcast.rhs_offset[k] } else { k };
            let lhs = if Op::USE_LHS {
                let base = cid * lhs_dim + lhs_add * reduce_size;
                &ufeat[base..base + reduce_size]
            } else {
                &[]
            };
            let rhs = if Op::USE_RHS {
                let base = eid * rhs_dim + rhs_add * reduce_size;
                &efeat[base..base + reduce_size]
            } else {
                &[]
            };
            let val = Op::call(lhs, rhs, reduce_size);
            if Cmp::better(val, *out_row.add(k)) {
                *out_row.add(k) = val;
                if Op::USE_LHS && !argu.is_null() {
                    *argu.add(rid * dim + k) = I::from_usize(cid);
                }
                if Op::USE_RHS && !arge.is_null() {
                    *arge.add(rid * dim + k) = I::from_usize(eid);
                }
            }
        }
    }
}

/// Max/min-aggregated SpMM over a destination-oriented CSR view
///
/// When present, `argu` receives the source node and `arge` the edge id of
/// the winning contribution per output channel. An argument output is only
/// filled when the operator reads the corresponding side; otherwise it is
/// zeroed. Rows with no incoming edges keep the reducer's identity value and
/// zeroed argument slots.
#[allow(clippy::too_many_arguments)]
pub fn spmm_cmp_csr<I: IdElement, T: Element, Op: BinaryOp<T>, Cmp: Reducer<T>>(
    indptr: &[I],
    indices: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    efeat: &[T],
    out: &mut [T],
    argu: Option<&mut [I]>,
    arge: Option<&mut [I]>,
    bcast: &BcastOff,
) {
    let num_rows = indptr.len() - 1;
    let out_addr = out.as_mut_ptr() as usize;
    let argu_addr = argu.map_or(0usize, |s| s.as_mut_ptr() as usize);
    let arge_addr = arge.map_or(0usize, |s| s.as_mut_ptr() as usize);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..num_rows).into_par_iter().for_each(|rid| unsafe {
            cmp_row::<I, T, Op, Cmp>(
                rid,
                indptr,
                indices,
                edges,
                ufeat,
                efeat,
                out_addr as *mut T,
                argu_addr as *mut I,
                arge_addr as *mut I,
                bcast,
            );
        });
    }

    #[cfg(not(feature = "rayon"))]
    for rid in 0..num_rows {
        unsafe {
            cmp_row::<I, T, Op, Cmp>(
                rid,
                indptr,
                indices,
                edges,
                ufeat,
                efeat,
                out_addr as *mut T,
                argu_addr as *mut I,
                arge_addr as *mut I,
                bcast,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{self, Add, CopyLhs, CopyRhs, Max, Min, Mul};

    fn plan(op: &str, lhs_shape: &[usize], rhs_shape: &[usize]) -> BcastOff {
        BcastOff::calc(ops::op_desc(op).unwrap(), lhs_shape, rhs_shape).unwrap()
    }

    // incoming edges per destination: node 0 none, node 1 from 0 (e0),
    // node 2 from 0 (e1) and 1 (e2)
    const INDPTR: [i64; 4] = [0, 0, 1, 3];
    const INDICES: [i64; 3] = [0, 0, 1];
    const EIDS: [i64; 3] = [0, 1, 2];

    #[test]
    fn test_sum_copy_lhs() {
        let u = [10.0f64, 20.0, 30.0];
        let bcast = plan("copy_lhs", &[3, 1], &[3, 1]);
        let mut out = [9.0f64; 3];
        spmm_sum_csr::<i64, f64, CopyLhs>(&INDPTR, &INDICES, Some(&EIDS), &u, &[], &mut out, &bcast);
        // dst0 has no in-edges and is zeroed, dst2 = u[0] + u[1]
        assert_eq!(out, [0.0, 10.0, 30.0]);
    }

    #[test]
    fn test_sum_mul_edge_weights() {
        let u = [10.0f64, 20.0, 30.0];
        let w = [2.0f64, 3.0, 5.0]; // per-edge
        let bcast = plan("mul", &[3, 1], &[3, 1]);
        let mut out = [0.0f64; 3];
        spmm_sum_csr::<i64, f64, Mul>(&INDPTR, &INDICES, Some(&EIDS), &u, &w, &mut out, &bcast);
        // dst1 = 10*2, dst2 = 10*3 + 20*5
        assert_eq!(out, [0.0, 20.0, 130.0]);
    }

    #[test]
    fn test_max_with_arguments() {
        let u = [10.0f64, 20.0, 30.0];
        let bcast = plan("copy_lhs", &[3, 1], &[3, 1]);
        let mut out = [0.0f64; 3];
        let mut argu = [7i64; 3];
        let mut arge = [7i64; 3];
        spmm_cmp_csr::<i64, f64, CopyLhs, Max>(
            &INDPTR,
            &INDICES,
            Some(&EIDS),
            &u,
            &[],
            &mut out,
            Some(&mut argu),
            Some(&mut arge),
            &bcast,
        );
        assert_eq!(out, [f64::NEG_INFINITY, 10.0, 20.0]);
        assert_eq!(argu, [0, 0, 1]);
        // copy_lhs never reads the edge side, so arge is zeroed, not filled
        assert_eq!(arge, [0, 0, 0]);
    }

    #[test]
    fn test_min_first_wins_on_tie() {
        // both in-edges of dst2 carry the value 5
        let w = [9.0f64, 5.0, 5.0];
        let bcast = plan("copy_rhs", &[3, 1], &[3, 1]);
        let mut out = [0.0f64; 3];
        let mut arge = [0i64; 3];
        spmm_cmp_csr::<i64, f64, CopyRhs, Min>(
            &INDPTR,
            &INDICES,
            Some(&EIDS),
            &[],
            &w,
            &mut out,
            None,
            Some(&mut arge),
            &bcast,
        );
        assert_eq!(out[2], 5.0);
        // e1 comes first in walk order and keeps the slot
        assert_eq!(arge[2], 1);
    }

    #[test]
    fn test_sum_add_broadcast() {
        let u = [1.0f64, 2.0, 3.0]; // [3, 1]
        let w = [10.0f64, 20.0, 30.0, 40.0, 50.0, 60.0]; // [3, 2]
        let bcast = plan("add", &[3, 1], &[3, 2]);
        let mut out = [0.0f64; 6];
        spmm_sum_csr::<i64, f64, Add>(&INDPTR, &INDICES, Some(&EIDS), &u, &w, &mut out, &bcast);
        // dst1 = u[0] + w[e0], dst2 = (u[0] + w[e1]) + (u[1] + w[e2])
        assert_eq!(out, [0.0, 0.0, 11.0, 21.0, 83.0, 103.0]);
    }
}
