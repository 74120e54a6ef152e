//! CPU SDDMM kernels: per-edge outputs from endpoint features
//!
//! Each physical edge position owns exactly one logical edge id, so every
//! output row is written by exactly one iteration and the loops need no
//! synchronization. The CSR driver parallelizes over rows, the COO driver
//! over edges; both write bit-identical results for equivalent topologies
//! because per-edge arithmetic does not depend on traversal order.

use crate::dtype::{Element, IdElement};
use crate::kernel::BcastOff;
use crate::ops::BinaryOp;

/// Process all edges of one CSR row
///
/// # Safety
///
/// `out` must be valid for `nnz * bcast.out_len` elements and the edge ids
/// reachable from row `rid` must not be reachable from any other row
/// processed concurrently.
#[inline]
unsafe fn csr_row<I: IdElement, T: Element, Op: BinaryOp<T>>(
    rid: usize,
    indptr: &[I],
    indices: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    vfeat: &[T],
    out: *mut T,
    bcast: &BcastOff,
) {
    let dim = bcast.out_len;
    let lhs_dim = bcast.lhs_len;
    let rhs_dim = bcast.rhs_len;
    let reduce_size = bcast.reduce_size;

    let start = indptr[rid].to_usize();
    let end = indptr[rid + 1].to_usize();
    for j in start..end {
        let cid = indices[j].to_usize();
        let eid = match edges {
            Some(e) => e[j].to_usize(),
            None => j,
        };
        let out_row = out.add(eid * dim);
        for k in 0..dim {
            let lhs_add = if bcast.use_bcast { bcast.lhs_offset[k] } else { k };
            let rhs_add = if bcast.use_bcast { bcast.rhs_offset[k] } else { k };
            let lhs = if Op::USE_LHS {
                let base = rid * lhs_dim + lhs_add * reduce_size;
                &ufeat[base..base + reduce_size]
            } else {
                &[]
            };
            let rhs = if Op::USE_RHS {
                let base = cid * rhs_dim + rhs_add * reduce_size;
                &vfeat[base..base + reduce_size]
            } else {
                &[]
            };
            *out_row.add(k) = Op::call(lhs, rhs, reduce_size);
        }
    }
}

/// SDDMM over a CSR topology (rows are source nodes)
///
/// `ufeat` is indexed by row (source), `vfeat` by column (destination), the
/// output by logical edge id.
pub fn sddmm_csr<I: IdElement, T: Element, Op: BinaryOp<T>>(
    indptr: &[I],
    indices: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    vfeat: &[T],
    out: &mut [T],
    bcast: &BcastOff,
) {
    let num_rows = indptr.len() - 1;
    let out_addr = out.as_mut_ptr() as usize;

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..num_rows).into_par_iter().for_each(|rid| unsafe {
            csr_row::<I, T, Op>(
                rid,
                indptr,
                indices,
                edges,
                ufeat,
                vfeat,
                out_addr as *mut T,
                bcast,
            );
        });
    }

    #[cfg(not(feature = "rayon"))]
    for rid in 0..num_rows {
        unsafe {
            csr_row::<I, T, Op>(
                rid,
                indptr,
                indices,
                edges,
                ufeat,
                vfeat,
                out_addr as *mut T,
                bcast,
            );
        }
    }
}

/// Process one COO edge position
///
/// # Safety
///
/// `out` must be valid for `nnz * bcast.out_len` elements and logical edge
/// ids must be unique across positions processed concurrently.
#[inline]
unsafe fn coo_edge<I: IdElement, T: Element, Op: BinaryOp<T>>(
    p: usize,
    row: &[I],
    col: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    vfeat: &[T],
    out: *mut T,
    bcast: &BcastOff,
) {
    let dim = bcast.out_len;
    let lhs_dim = bcast.lhs_len;
    let rhs_dim = bcast.rhs_len;
    let reduce_size = bcast.reduce_size;

    let rid = row[p].to_usize();
    let cid = col[p].to_usize();
    let eid = match edges {
        Some(e) => e[p].to_usize(),
        None => p,
    };
    let out_row = out.add(eid * dim);
    for k in 0..dim {
        let lhs_add = if bcast.use_bcast { bcast.lhs_offset[k] } else { k };
        let rhs_add = if bcast.use_bcast { bcast.rhs_offset[k] } else { k };
        let lhs = if Op::USE_LHS {
            let base = rid * lhs_dim + lhs_add * reduce_size;
            &ufeat[base..base + reduce_size]
        } else {
            &[]
        };
        let rhs = if Op::USE_RHS {
            let base = cid * rhs_dim + rhs_add * reduce_size;
            &vfeat[base..base + reduce_size]
        } else {
            &[]
        };
        *out_row.add(k) = Op::call(lhs, rhs, reduce_size);
    }
}

/// SDDMM over a COO topology
///
/// `ufeat` is indexed by `row` (source), `vfeat` by `col` (destination), the
/// output by logical edge id.
pub fn sddmm_coo<I: IdElement, T: Element, Op: BinaryOp<T>>(
    row: &[I],
    col: &[I],
    edges: Option<&[I]>,
    ufeat: &[T],
    vfeat: &[T],
    out: &mut [T],
    bcast: &BcastOff,
) {
    let nnz = row.len();
    let out_addr = out.as_mut_ptr() as usize;

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..nnz).into_par_iter().for_each(|p| unsafe {
            coo_edge::<I, T, Op>(
                p,
                row,
                col,
                edges,
                ufeat,
                vfeat,
                out_addr as *mut T,
                bcast,
            );
        });
    }

    #[cfg(not(feature = "rayon"))]
    for p in 0..nnz {
        unsafe {
            coo_edge::<I, T, Op>(
                p,
                row,
                col,
                edges,
                ufeat,
                vfeat,
                out_addr as *mut T,
                bcast,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{self, Add, CopyLhs, Dot, Mul};

    fn plan(op: &str, lhs_shape: &[usize], rhs_shape: &[usize]) -> BcastOff {
        BcastOff::calc(ops::op_desc(op).unwrap(), lhs_shape, rhs_shape).unwrap()
    }

    // edges: 0->1 (e0), 0->2 (e1), 1->2 (e2)
    const INDPTR: [i64; 4] = [0, 2, 3, 3];
    const INDICES: [i64; 3] = [1, 2, 2];
    const ROW: [i64; 3] = [0, 0, 1];
    const COL: [i64; 3] = [1, 2, 2];

    #[test]
    fn test_csr_add_scalar_feature() {
        let u = [10.0f64, 20.0, 30.0];
        let v = [1.0f64, 2.0, 3.0];
        let bcast = plan("add", &[3, 1], &[3, 1]);
        let mut out = [0.0f64; 3];
        sddmm_csr::<i64, f64, Add>(&INDPTR, &INDICES, None, &u, &v, &mut out, &bcast);
        assert_eq!(out, [12.0, 13.0, 23.0]);
    }

    #[test]
    fn test_coo_matches_csr() {
        let u = [10.0f64, 20.0, 30.0];
        let v = [1.0f64, 2.0, 3.0];
        let bcast = plan("mul", &[3, 1], &[3, 1]);

        let mut csr_out = [0.0f64; 3];
        sddmm_csr::<i64, f64, Mul>(&INDPTR, &INDICES, None, &u, &v, &mut csr_out, &bcast);

        let mut coo_out = [0.0f64; 3];
        sddmm_coo::<i64, f64, Mul>(&ROW, &COL, None, &u, &v, &mut coo_out, &bcast);

        assert_eq!(csr_out, coo_out);
        assert_eq!(csr_out, [20.0, 30.0, 90.0]);
    }

    #[test]
    fn test_edge_id_indirection() {
        let u = [10.0f64, 20.0, 30.0];
        let v = [0.0f64; 3];
        // physical order differs from logical ids: positions hold e1, e0, e2
        let row_p = [0i64, 0, 1];
        let col_p = [2i64, 1, 2];
        let eids = [1i64, 0, 2];
        let bcast = plan("copy_lhs", &[3, 1], &[3, 1]);
        let mut out = [0.0f64; 3];
        sddmm_coo::<i64, f64, CopyLhs>(&row_p, &col_p, Some(&eids), &u, &v, &mut out, &bcast);
        // e0 = 0->1 reads u[0], e2 = 1->2 reads u[1]
        assert_eq!(out, [10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_broadcast_lhs_scalar() {
        let u = [2.0f64, 3.0, 4.0]; // [3, 1]
        #[rustfmt::skip]
        let v = [
            1.0f64, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            9.0, 10.0, 11.0, 12.0,
        ]; // [3, 4]
        let bcast = plan("mul", &[3, 1], &[3, 4]);
        let mut out = [0.0f64; 12];
        sddmm_csr::<i64, f64, Mul>(&INDPTR, &INDICES, None, &u, &v, &mut out, &bcast);
        // e0: u[0]=2 * v[1] row, e1: u[0]=2 * v[2] row, e2: u[1]=3 * v[2] row
        assert_eq!(
            out,
            [
                10.0, 12.0, 14.0, 16.0, //
                18.0, 20.0, 22.0, 24.0, //
                27.0, 30.0, 33.0, 36.0,
            ]
        );
    }

    #[test]
    fn test_dot_contraction() {
        let u = [1.0f64, 2.0, 3.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0]; // [3, 3]
        let v = [1.0f64, 1.0, 1.0, 4.0, 5.0, 6.0, 2.0, 0.0, 2.0]; // [3, 3]
        let bcast = plan("dot", &[3, 3], &[3, 3]);
        let mut out = [0.0f64; 3];
        sddmm_csr::<i64, f64, Dot>(&INDPTR, &INDICES, None, &u, &v, &mut out, &bcast);
        // e0: u0 . v1 = 4 + 10 + 18 = 32
        // e1: u0 . v2 = 2 + 0 + 6 = 8
        // e2: u1 . v2 = 0 + 0 + 0 = 0
        assert_eq!(out, [32.0, 8.0, 0.0]);
    }
}
