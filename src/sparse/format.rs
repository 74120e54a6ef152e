//! Sparse format definitions

/// Sparse topology storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate format (COO)
    ///
    /// Stores explicit (row, col) pairs per edge.
    /// Best for: edge-parallel traversal, construction
    Coo,

    /// Compressed Sparse Row (CSR)
    ///
    /// Row pointers + column indices.
    /// Best for: row-parallel traversal, per-row accumulation
    Csr,
}

impl SparseFormat {
    /// Returns the format name as a string
    pub const fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csr => "CSR",
        }
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
