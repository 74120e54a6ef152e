//! Common test utilities
#![allow(dead_code)]

use gspmm::graph::Graph;
use gspmm::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use gspmm::runtime::Runtime;

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// A small fixed graph used across tests
///
/// Three nodes, three edges: 0->1 (e0), 1->2 (e1), 0->2 (e2).
pub fn triangle_graph(device: &CpuDevice) -> Graph<CpuRuntime> {
    Graph::from_edges(&[0i64, 1, 0], &[1i64, 2, 2], 3, 3, device)
        .expect("triangle graph construction failed")
}

/// The triangle graph with I32 topology
pub fn triangle_graph_i32(device: &CpuDevice) -> Graph<CpuRuntime> {
    Graph::from_edges(&[0i32, 1, 0], &[1i32, 2, 2], 3, 3, device)
        .expect("triangle graph construction failed")
}
