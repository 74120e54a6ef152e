//! Broadcast plan for binary edge operators
//!
//! NumPy-style trailing-dimension broadcasting between the two operand
//! feature shapes, computed once per call and consulted per output lane
//! inside the kernels. Neither operand is ever materialized to the broadcast
//! shape: the plan maps each flattened output lane to a flattened input lane
//! on both sides.

use crate::error::{Error, Result};
use crate::ops::OpDesc;

/// Precomputed broadcast offsets for one (op, lhs, rhs) combination
///
/// `lhs_len`/`rhs_len` count *scalars* per feature row and double as the
/// kernels' row strides; they include the axis `dot` contracts. `out_len`
/// and the offset tables count *lanes*: one lane is `reduce_size` contiguous
/// scalars, so kernels scale lane offsets by `reduce_size` when forming
/// addresses. For every op but `dot`, `reduce_size == 1` and the distinction
/// vanishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcastOff {
    /// Per-row flattened feature length of the lhs operand, in scalars
    pub lhs_len: usize,
    /// Per-row flattened feature length of the rhs operand, in scalars
    pub rhs_len: usize,
    /// Per-row flattened output feature length, in lanes
    pub out_len: usize,
    /// Trailing-axis extent contracted by `dot`; 1 otherwise
    pub reduce_size: usize,
    /// Whether the offset tables below must be consulted
    pub use_bcast: bool,
    /// Output lane -> lhs lane, length `out_len` when `use_bcast`
    pub lhs_offset: Vec<usize>,
    /// Output lane -> rhs lane, length `out_len` when `use_bcast`
    pub rhs_offset: Vec<usize>,
}

impl BcastOff {
    /// Compute the broadcast plan for an operator and two operand shapes
    ///
    /// `lhs_shape` and `rhs_shape` are the full tensor shapes; dimension 0 is
    /// the row (node or edge) dimension and takes no part in broadcasting.
    /// For a partial op the façade passes the present operand's shape on both
    /// sides, which makes the shapes trivially equal and disables the tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BroadcastError`] when a trailing dimension pair is
    /// incompatible (neither equal nor 1), and for `dot` when the contracted
    /// trailing dimensions differ.
    pub fn calc(op: &OpDesc, lhs_shape: &[usize], rhs_shape: &[usize]) -> Result<Self> {
        let lhs_len: usize = lhs_shape.iter().skip(1).product();
        let rhs_len: usize = rhs_shape.iter().skip(1).product();

        let is_copy = !(op.use_lhs && op.use_rhs);
        let use_bcast = !is_copy && lhs_shape[1..] != rhs_shape[1..];

        let mut rst = BcastOff {
            lhs_len,
            rhs_len,
            out_len: 0,
            reduce_size: 1,
            use_bcast,
            lhs_offset: Vec::new(),
            rhs_offset: Vec::new(),
        };

        if op.is_reduction {
            let ld = lhs_shape[lhs_shape.len() - 1];
            let rd = rhs_shape[rhs_shape.len() - 1];
            if ld != rd {
                return Err(Error::broadcast(lhs_shape, rhs_shape));
            }
            rst.reduce_size = ld;
        }

        if use_bcast {
            // Walk trailing dims right to left, replicating the partial
            // offset tables each time one side's extent exceeds the other's.
            // The contracted axis of dot is consumed before the walk starts.
            let max_ndim = lhs_shape.len().max(rhs_shape.len()) - 1;
            let mut j = usize::from(op.is_reduction);
            let mut out_len = 1usize;
            let mut stride_l = 1usize;
            let mut stride_r = 1usize;
            rst.lhs_offset.push(0);
            rst.rhs_offset.push(0);
            while j < max_ndim {
                let dl = if lhs_shape.len() - 1 < j + 1 {
                    1
                } else {
                    lhs_shape[lhs_shape.len() - 1 - j]
                };
                let dr = if rhs_shape.len() - 1 < j + 1 {
                    1
                } else {
                    rhs_shape[rhs_shape.len() - 1 - j]
                };
                if dl != dr && dl != 1 && dr != 1 {
                    return Err(Error::broadcast(lhs_shape, rhs_shape));
                }
                for i in 1..dl.max(dr) {
                    for k in 0..out_len {
                        let l_add = if i < dl { i * stride_l } else { 0 };
                        let r_add = if i < dr { i * stride_r } else { 0 };
                        rst.lhs_offset.push(rst.lhs_offset[k] + l_add);
                        rst.rhs_offset.push(rst.rhs_offset[k] + r_add);
                    }
                }
                out_len *= dl.max(dr);
                stride_l *= dl;
                stride_r *= dr;
                j += 1;
            }
            rst.out_len = out_len;
        } else {
            rst.out_len = if op.use_lhs { lhs_len } else { rhs_len };
            if op.is_reduction {
                rst.out_len /= rst.reduce_size;
            }
        }

        Ok(rst)
    }
}
