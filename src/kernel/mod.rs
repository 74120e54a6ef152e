//! Generalized graph kernel entry points
//!
//! Two operations cover the message-passing computations on a single-relation
//! graph:
//!
//! - [`sddmm`] produces one output row per *edge* by combining the features
//!   of the edge's endpoints (sampled dense-dense matrix multiplication).
//! - [`spmm`] produces one output row per *destination node* by combining
//!   source-node and edge features along each incoming edge and aggregating
//!   them with a reducer (sparse-dense matrix multiplication).
//!
//! Both take the operator by name, optional operand tensors, and a
//! caller-allocated output. All argument validation happens here, before any
//! backend is touched and in a fixed order: operator resolution, device,
//! contiguity, shape, dtype, broadcast compatibility. Edge-wise kernels run
//! on the COO view; node-aggregating kernels run on the
//! destination-oriented CSR view, where every output row is owned by one row
//! iteration.

pub mod bcast;

pub use bcast::BcastOff;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::ops::{op_desc, OpDesc, ReduceOp};
use crate::runtime::{Device, Runtime, RuntimeClient};
use crate::sparse::{CooMatrix, CsrMatrix};
use crate::tensor::Tensor;

/// Backend seam for the graph kernels
///
/// A runtime's client implements the per-format kernels; the free functions
/// in this module validate arguments, compute the broadcast plan, pick the
/// topology view, and forward here. Implementations may assume every
/// argument has already passed validation.
pub trait GraphKernels<R: Runtime>: RuntimeClient<R> {
    /// Edge-output kernel over a CSR view (rows are source nodes)
    fn sddmm_csr(
        &self,
        csr: &CsrMatrix<R>,
        op: &str,
        ufeat: Option<&Tensor<R>>,
        vfeat: Option<&Tensor<R>>,
        out: &mut Tensor<R>,
        bcast: &BcastOff,
    ) -> Result<()>;

    /// Edge-output kernel over a COO view
    fn sddmm_coo(
        &self,
        coo: &CooMatrix<R>,
        op: &str,
        ufeat: Option<&Tensor<R>>,
        vfeat: Option<&Tensor<R>>,
        out: &mut Tensor<R>,
        bcast: &BcastOff,
    ) -> Result<()>;

    /// Node-output kernel over a destination-oriented CSR view
    #[allow(clippy::too_many_arguments)]
    fn spmm_csr(
        &self,
        csr: &CsrMatrix<R>,
        op: &str,
        reduce: ReduceOp,
        ufeat: Option<&Tensor<R>>,
        efeat: Option<&Tensor<R>>,
        out: &mut Tensor<R>,
        argu: Option<&mut Tensor<R>>,
        arge: Option<&mut Tensor<R>>,
        bcast: &BcastOff,
    ) -> Result<()>;
}

fn check_ctx<R: Runtime>(
    device: &R::Device,
    t: Option<&Tensor<R>>,
    name: &'static str,
) -> Result<()> {
    if let Some(t) = t {
        if !t.device().is_same(device) {
            return Err(Error::DeviceMismatch { tensor: name });
        }
    }
    Ok(())
}

fn check_contiguous<R: Runtime>(t: Option<&Tensor<R>>, name: &'static str) -> Result<()> {
    if let Some(t) = t {
        if !t.is_contiguous() {
            return Err(Error::NotContiguous { tensor: name });
        }
    }
    Ok(())
}

/// Check rank and leading dimension of each present feature tensor
///
/// `gdim` is `[num_src, num_edges, num_dst]`; `uev_idx[i]` selects which of
/// the three the leading dimension of `arrays[i]` must equal.
fn check_shape<R: Runtime>(
    gdim: &[usize; 3],
    uev_idx: &[usize],
    arrays: &[Option<&Tensor<R>>],
    names: &[&'static str],
) -> Result<()> {
    for ((&idx, &arr), &name) in uev_idx.iter().zip(arrays.iter()).zip(names.iter()) {
        if let Some(t) = arr {
            if t.ndim() < 2 {
                return Err(Error::invalid_arg(
                    name,
                    "expected a feature tensor with at least 2 dimensions",
                ));
            }
            if t.shape()[0] != gdim[idx] {
                return Err(Error::ShapeMismatch {
                    expected: vec![gdim[idx]],
                    got: vec![t.shape()[0]],
                });
            }
        }
    }
    Ok(())
}

fn check_dtype<R: Runtime>(t: Option<&Tensor<R>>, out: &Tensor<R>) -> Result<()> {
    if let Some(t) = t {
        if t.dtype() != out.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: t.dtype(),
                rhs: out.dtype(),
            });
        }
    }
    Ok(())
}

fn require_operand<'a, R: Runtime>(
    used: bool,
    t: Option<&'a Tensor<R>>,
    name: &'static str,
    op: &str,
) -> Result<Option<&'a Tensor<R>>> {
    if used && t.is_none() {
        return Err(Error::invalid_arg(
            name,
            format!("operator '{op}' reads this operand but none was given"),
        ));
    }
    Ok(t)
}

/// Resolve the two broadcast input shapes, substituting the present side for
/// an absent one so partial ops see trivially equal shapes.
fn operand_shapes<'a, R: Runtime>(
    desc: &OpDesc,
    lhs: Option<&'a Tensor<R>>,
    rhs: Option<&'a Tensor<R>>,
) -> Result<(&'a [usize], &'a [usize])> {
    let primary = if desc.use_lhs { lhs } else { rhs };
    let primary =
        primary.ok_or_else(|| Error::invalid_arg("op", "operator reads no present operand"))?;
    let lhs_shape = lhs.map_or(primary.shape(), |t| t.shape());
    let rhs_shape = rhs.map_or(primary.shape(), |t| t.shape());
    Ok((lhs_shape, rhs_shape))
}

/// Compute one output row per edge from the edge's endpoint features
///
/// `ufeat` holds source-node features (leading dimension `num_src_nodes`),
/// `vfeat` destination-node features (`num_dst_nodes`); `out` must be a
/// contiguous tensor with leading dimension `num_edges` and feature width
/// equal to the broadcast output width. Operands unused by `op` may be
/// `None`. Row `e` of the output belongs to logical edge `e` regardless of
/// the topology's physical edge order.
pub fn sddmm<R>(
    graph: &Graph<R>,
    op: &str,
    ufeat: Option<&Tensor<R>>,
    vfeat: Option<&Tensor<R>>,
    out: &mut Tensor<R>,
) -> Result<()>
where
    R: Runtime,
    R::Client: GraphKernels<R>,
{
    let desc = op_desc(op)?;
    let ufeat = require_operand(desc.use_lhs, ufeat, "ufeat", op)?;
    let vfeat = require_operand(desc.use_rhs, vfeat, "vfeat", op)?;

    let device = graph.device();
    check_ctx(device, ufeat, "ufeat")?;
    check_ctx(device, vfeat, "vfeat")?;
    check_ctx(device, Some(out), "out")?;
    check_contiguous(ufeat, "ufeat")?;
    check_contiguous(vfeat, "vfeat")?;
    check_contiguous(Some(out), "out")?;

    let gdim = [
        graph.num_src_nodes(),
        graph.num_edges(),
        graph.num_dst_nodes(),
    ];
    check_shape(
        &gdim,
        &[0, 2, 1],
        &[ufeat, vfeat, Some(&*out)],
        &["ufeat", "vfeat", "out"],
    )?;
    check_dtype(ufeat, out)?;
    check_dtype(vfeat, out)?;

    let (lhs_shape, rhs_shape) = operand_shapes(desc, ufeat, vfeat)?;
    let bcast = BcastOff::calc(desc, lhs_shape, rhs_shape)?;
    if out.feat_len() != bcast.out_len {
        return Err(Error::ShapeMismatch {
            expected: vec![gdim[1], bcast.out_len],
            got: out.shape().to_vec(),
        });
    }

    let client = R::default_client(device);
    client.sddmm_coo(graph.coo(), op, ufeat, vfeat, out, &bcast)
}

/// Aggregate per-edge contributions into one output row per destination node
///
/// `ufeat` holds source-node features (leading dimension `num_src_nodes`),
/// `efeat` per-edge features (`num_edges`, indexed by logical edge id);
/// `out` must be contiguous with leading dimension `num_dst_nodes`. For
/// `max`/`min` aggregation, `argu`/`arge` (when given) receive the source
/// node and edge id of the winning contribution per output channel; they
/// must match the output's shape and use the graph's index dtype. Rows with
/// no incoming edges produce zeros under `sum` and the reducer's identity
/// otherwise.
#[allow(clippy::too_many_arguments)]
pub fn spmm<R>(
    graph: &Graph<R>,
    op: &str,
    reduce: &str,
    ufeat: Option<&Tensor<R>>,
    efeat: Option<&Tensor<R>>,
    out: &mut Tensor<R>,
    argu: Option<&mut Tensor<R>>,
    arge: Option<&mut Tensor<R>>,
) -> Result<()>
where
    R: Runtime,
    R::Client: GraphKernels<R>,
{
    let desc = op_desc(op)?;
    let reduce = ReduceOp::from_name(reduce)?;
    let ufeat = require_operand(desc.use_lhs, ufeat, "ufeat", op)?;
    let efeat = require_operand(desc.use_rhs, efeat, "efeat", op)?;
    if !reduce.has_args() && (argu.is_some() || arge.is_some()) {
        return Err(Error::invalid_arg(
            "argu",
            "sum aggregation produces no argument outputs",
        ));
    }

    let device = graph.device();
    check_ctx(device, ufeat, "ufeat")?;
    check_ctx(device, efeat, "efeat")?;
    check_ctx(device, Some(out), "out")?;
    check_ctx(device, argu.as_deref(), "argu")?;
    check_ctx(device, arge.as_deref(), "arge")?;
    check_contiguous(ufeat, "ufeat")?;
    check_contiguous(efeat, "efeat")?;
    check_contiguous(Some(out), "out")?;
    check_contiguous(argu.as_deref(), "argu")?;
    check_contiguous(arge.as_deref(), "arge")?;

    let gdim = [
        graph.num_src_nodes(),
        graph.num_edges(),
        graph.num_dst_nodes(),
    ];
    check_shape(
        &gdim,
        &[0, 1, 2, 2, 2],
        &[
            ufeat,
            efeat,
            Some(&*out),
            argu.as_deref(),
            arge.as_deref(),
        ],
        &["ufeat", "efeat", "out", "argu", "arge"],
    )?;
    check_dtype(ufeat, out)?;
    check_dtype(efeat, out)?;
    for (arg, name) in [(argu.as_deref(), "argu"), (arge.as_deref(), "arge")] {
        if let Some(t) = arg {
            if t.dtype() != graph.index_dtype() {
                return Err(Error::DTypeMismatch {
                    lhs: t.dtype(),
                    rhs: graph.index_dtype(),
                });
            }
            if t.shape() != out.shape() {
                return Err(Error::invalid_arg(
                    name,
                    "argument output must match the output shape",
                ));
            }
        }
    }

    let (lhs_shape, rhs_shape) = operand_shapes(desc, ufeat, efeat)?;
    let bcast = BcastOff::calc(desc, lhs_shape, rhs_shape)?;
    if out.feat_len() != bcast.out_len {
        return Err(Error::ShapeMismatch {
            expected: vec![gdim[2], bcast.out_len],
            got: out.shape().to_vec(),
        });
    }

    let csc = graph.csc()?;
    let client = R::default_client(device);
    client.spmm_csr(csc, op, reduce, ufeat, efeat, out, argu, arge, &bcast)
}
