//! Integration tests for the edge-output (SDDMM) kernel
//!
//! Covers operator semantics, broadcasting, edge-id indirection, CSR/COO
//! agreement, index dtype parity, and argument validation.

mod common;

use common::{create_cpu_client, triangle_graph, triangle_graph_i32};
use gspmm::dtype::DType;
use gspmm::error::Error;
use gspmm::graph::Graph;
use gspmm::kernel::{self, BcastOff, GraphKernels};
use gspmm::ops::op_desc;
use gspmm::runtime::cpu::{CpuDevice, CpuRuntime};
use gspmm::sparse::CooMatrix;
use gspmm::tensor::Tensor;

fn t64(data: &[f64], shape: &[usize], device: &CpuDevice) -> Tensor<CpuRuntime> {
    Tensor::from_slice(data, shape, device)
}

#[test]
fn test_sddmm_mul_end_to_end() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap();
    // e0: u[0]*v[1], e1: u[1]*v[2], e2: u[0]*v[2]
    assert_eq!(out.to_vec::<f64>(), vec![20.0, 60.0, 30.0]);
}

#[test]
fn test_sddmm_add_and_sub() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);

    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);
    kernel::sddmm(&g, "add", Some(&u), Some(&v), &mut out).unwrap();
    assert_eq!(out.to_vec::<f64>(), vec![21.0, 32.0, 31.0]);

    kernel::sddmm(&g, "sub", Some(&u), Some(&v), &mut out).unwrap();
    assert_eq!(out.to_vec::<f64>(), vec![-19.0, -28.0, -29.0]);
}

#[test]
fn test_sddmm_copy_ops_tolerate_missing_operand() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);
    kernel::sddmm(&g, "copy_lhs", Some(&u), None, &mut out).unwrap();
    // per-edge copy of the source node feature
    assert_eq!(out.to_vec::<f64>(), vec![1.0, 2.0, 1.0]);

    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);
    kernel::sddmm(&g, "copy_rhs", None, Some(&v), &mut out).unwrap();
    // per-edge copy of the destination node feature
    assert_eq!(out.to_vec::<f64>(), vec![20.0, 30.0, 30.0]);
}

#[test]
fn test_sddmm_dot() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    #[rustfmt::skip]
    let u = t64(&[
        1.0, 2.0, 3.0,
        0.0, 1.0, 0.0,
        1.0, 1.0, 1.0,
    ], &[3, 3], &device);
    #[rustfmt::skip]
    let v = t64(&[
        1.0, 1.0, 1.0,
        4.0, 5.0, 6.0,
        2.0, 0.0, 2.0,
    ], &[3, 3], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    kernel::sddmm(&g, "dot", Some(&u), Some(&v), &mut out).unwrap();
    // e0: u0.v1 = 32, e1: u1.v2 = 0, e2: u0.v2 = 8
    assert_eq!(out.to_vec::<f64>(), vec![32.0, 0.0, 8.0]);
}

#[test]
fn test_sddmm_broadcast_scalar_lhs() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[2.0, 3.0, 4.0], &[3, 1], &device);
    #[rustfmt::skip]
    let v = t64(&[
        1.0, 2.0, 3.0, 4.0,
        5.0, 6.0, 7.0, 8.0,
        9.0, 10.0, 11.0, 12.0,
    ], &[3, 4], &device);
    let mut out = Tensor::zeros(&[3, 4], DType::F64, &device);

    kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap();
    assert_eq!(
        out.to_vec::<f64>(),
        vec![
            10.0, 12.0, 14.0, 16.0, // e0: 2 * v[1]
            27.0, 30.0, 33.0, 36.0, // e1: 3 * v[2]
            18.0, 20.0, 22.0, 24.0, // e2: 2 * v[2]
        ]
    );
}

#[test]
fn test_sddmm_edge_id_indirection() {
    let (_client, device) = create_cpu_client();
    // same triangle topology but stored in a different physical order:
    // positions hold logical edges e2, e0, e1
    let coo = CooMatrix::from_slices(
        &[0i64, 0, 1],
        &[2i64, 1, 2],
        Some(&[2i64, 0, 1]),
        [3, 3],
        &device,
    )
    .unwrap();
    let g = Graph::<CpuRuntime>::from_coo(coo);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap();
    // logical edges are still e0: 0->1, e1: 1->2, e2: 0->2
    assert_eq!(out.to_vec::<f64>(), vec![20.0, 60.0, 30.0]);
}

#[test]
fn test_sddmm_csr_matches_coo() {
    let (client, device) = create_cpu_client();
    // physical order permuted so the derived CSR carries a real permutation
    let coo = CooMatrix::from_slices(
        &[1i64, 0, 0],
        &[2i64, 2, 1],
        Some(&[1i64, 2, 0]),
        [3, 3],
        &device,
    )
    .unwrap();
    let g = Graph::<CpuRuntime>::from_coo(coo);

    let u = t64(&[1.5, 2.5, 3.5], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);

    let mut coo_out = Tensor::zeros(&[3, 1], DType::F64, &device);
    kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut coo_out).unwrap();

    let desc = op_desc("mul").unwrap();
    let bcast = BcastOff::calc(desc, u.shape(), v.shape()).unwrap();
    let mut csr_out = Tensor::zeros(&[3, 1], DType::F64, &device);
    client
        .sddmm_csr(g.csr().unwrap(), "mul", Some(&u), Some(&v), &mut csr_out, &bcast)
        .unwrap();

    // bit-identical: per-edge arithmetic is independent of traversal order
    assert_eq!(coo_out.to_vec::<f64>(), csr_out.to_vec::<f64>());
}

#[test]
fn test_sddmm_i32_topology_parity() {
    let (_client, device) = create_cpu_client();
    let g64 = triangle_graph(&device);
    let g32 = triangle_graph_i32(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);

    let mut out64 = Tensor::zeros(&[3, 1], DType::F64, &device);
    let mut out32 = Tensor::zeros(&[3, 1], DType::F64, &device);
    kernel::sddmm(&g64, "add", Some(&u), Some(&v), &mut out64).unwrap();
    kernel::sddmm(&g32, "add", Some(&u), Some(&v), &mut out32).unwrap();

    assert_eq!(out64.to_vec::<f64>(), out32.to_vec::<f64>());
}

#[test]
fn test_sddmm_f32_features() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1], &device);
    let v = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F32, &device);

    kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap();
    assert_eq!(out.to_vec::<f32>(), vec![20.0, 60.0, 30.0]);
}

#[test]
fn test_sddmm_rejects_unknown_op() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    let err = kernel::sddmm(&g, "pow", Some(&u), Some(&u), &mut out).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "op", .. }));
}

#[test]
fn test_sddmm_rejects_missing_operand() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    let err = kernel::sddmm(&g, "add", Some(&u), None, &mut out).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_sddmm_rejects_non_contiguous_output() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);
    let base = Tensor::<CpuRuntime>::zeros(&[1, 3], DType::F64, &device);
    let mut out = base.transpose(0, 1).unwrap();

    let err = kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::NotContiguous { tensor: "out" }));
}

#[test]
fn test_sddmm_rejects_wrong_leading_dim() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    // four feature rows for a three-node side
    let u = t64(&[1.0, 2.0, 3.0, 4.0], &[4, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    let err = kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn test_sddmm_rejects_wrong_output_width() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], &device);
    let v = t64(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0], &[3, 2], &device);
    let mut out = Tensor::zeros(&[3, 3], DType::F64, &device);

    let err = kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn test_sddmm_rejects_incompatible_broadcast() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = t64(&[0.0; 6], &[3, 2], &device);
    let v = t64(&[0.0; 9], &[3, 3], &device);
    let mut out = Tensor::zeros(&[3, 6], DType::F64, &device);

    let err = kernel::sddmm(&g, "add", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::BroadcastError { .. }));

    // dot additionally requires equal trailing dims
    let err = kernel::sddmm(&g, "dot", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::BroadcastError { .. }));
}

#[test]
fn test_sddmm_rejects_integer_features() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3], &[3, 1], &device);
    let v = Tensor::<CpuRuntime>::from_slice(&[10i64, 20, 30], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::I64, &device);

    let err = kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDType { .. }));
}

#[test]
fn test_sddmm_rejects_dtype_mismatch() {
    let (_client, device) = create_cpu_client();
    let g = triangle_graph(&device);

    let u = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[3, 1], &device);
    let v = t64(&[10.0, 20.0, 30.0], &[3, 1], &device);
    let mut out = Tensor::zeros(&[3, 1], DType::F64, &device);

    let err = kernel::sddmm(&g, "mul", Some(&u), Some(&v), &mut out).unwrap_err();
    assert!(matches!(err, Error::DTypeMismatch { .. }));
}
