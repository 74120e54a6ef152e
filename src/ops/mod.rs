//! Binary feature-combination operators and reducers
//!
//! The operator family is a closed set resolved once per call from its name:
//! `add`, `sub`, `mul`, `div`, `copy_lhs`, `copy_rhs`, `dot`. Each operator
//! is a zero-sized type implementing [`BinaryOp`], so kernel drivers are
//! monomorphized per operator with no per-element indirection. The
//! [`switch_op!`](crate::switch_op) macro maps a name to its type inside a
//! dispatch context.
//!
//! `lhs`/`rhs` name the first and second operand lane. Which tensor a lane
//! comes from is decided by the caller: SDDMM passes source-node and
//! destination-node features, SpMM passes source-node and edge features. The
//! operators copy or combine whatever is passed; they carry no node-vs-edge
//! meaning of their own.

pub mod dispatch;
mod reduce;

pub use reduce::{Max, Min, ReduceOp, Reducer};

use crate::dtype::Element;
use crate::error::{Error, Result};

/// A binary operator combining one lane from each operand
///
/// A lane is `reduce_size` contiguous scalars within a feature row
/// (`reduce_size == 1` for elementwise operators). An operator only
/// dereferences the side(s) its capability flags declare; the driver passes
/// an empty slice for an unused side.
pub trait BinaryOp<T: Element> {
    /// Operator name as used in dispatch tables
    const NAME: &'static str;
    /// Whether the operator reads the left operand
    const USE_LHS: bool;
    /// Whether the operator reads the right operand
    const USE_RHS: bool;

    /// Combine one lane from each side into a single output scalar
    fn call(lhs: &[T], rhs: &[T], reduce_size: usize) -> T;
}

/// Elementwise addition: `lhs[0] + rhs[0]`
pub struct Add;

/// Elementwise subtraction: `lhs[0] - rhs[0]`
pub struct Sub;

/// Elementwise multiplication: `lhs[0] * rhs[0]`
pub struct Mul;

/// Elementwise division: `lhs[0] / rhs[0]`
pub struct Div;

/// Copy of the first operand: `lhs[0]`
pub struct CopyLhs;

/// Copy of the second operand: `rhs[0]`
pub struct CopyRhs;

/// Lane dot product: `sum(lhs[i] * rhs[i] for i in 0..reduce_size)`
pub struct Dot;

impl<T: Element> BinaryOp<T> for Add {
    const NAME: &'static str = "add";
    const USE_LHS: bool = true;
    const USE_RHS: bool = true;

    #[inline]
    fn call(lhs: &[T], rhs: &[T], _reduce_size: usize) -> T {
        lhs[0] + rhs[0]
    }
}

impl<T: Element> BinaryOp<T> for Sub {
    const NAME: &'static str = "sub";
    const USE_LHS: bool = true;
    const USE_RHS: bool = true;

    #[inline]
    fn call(lhs: &[T], rhs: &[T], _reduce_size: usize) -> T {
        lhs[0] - rhs[0]
    }
}

impl<T: Element> BinaryOp<T> for Mul {
    const NAME: &'static str = "mul";
    const USE_LHS: bool = true;
    const USE_RHS: bool = true;

    #[inline]
    fn call(lhs: &[T], rhs: &[T], _reduce_size: usize) -> T {
        lhs[0] * rhs[0]
    }
}

impl<T: Element> BinaryOp<T> for Div {
    const NAME: &'static str = "div";
    const USE_LHS: bool = true;
    const USE_RHS: bool = true;

    #[inline]
    fn call(lhs: &[T], rhs: &[T], _reduce_size: usize) -> T {
        lhs[0] / rhs[0]
    }
}

impl<T: Element> BinaryOp<T> for CopyLhs {
    const NAME: &'static str = "copy_lhs";
    const USE_LHS: bool = true;
    const USE_RHS: bool = false;

    #[inline]
    fn call(lhs: &[T], _rhs: &[T], _reduce_size: usize) -> T {
        lhs[0]
    }
}

impl<T: Element> BinaryOp<T> for CopyRhs {
    const NAME: &'static str = "copy_rhs";
    const USE_LHS: bool = false;
    const USE_RHS: bool = true;

    #[inline]
    fn call(_lhs: &[T], rhs: &[T], _reduce_size: usize) -> T {
        rhs[0]
    }
}

impl<T: Element> BinaryOp<T> for Dot {
    const NAME: &'static str = "dot";
    const USE_LHS: bool = true;
    const USE_RHS: bool = true;

    // Accumulation iterates lanes in increasing index order; results are
    // deterministic for fixed inputs.
    #[inline]
    fn call(lhs: &[T], rhs: &[T], reduce_size: usize) -> T {
        let mut acc = T::zero();
        for i in 0..reduce_size {
            acc = acc + lhs[i] * rhs[i];
        }
        acc
    }
}

/// Capability descriptor for a named binary operator
///
/// The capability flags let validation skip requirements on a side the
/// operator never reads, so e.g. `copy_lhs` tolerates an absent right-hand
/// tensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpDesc {
    /// Operator name
    pub name: &'static str,
    /// Whether the operator reads the left operand
    pub use_lhs: bool,
    /// Whether the operator reads the right operand
    pub use_rhs: bool,
    /// Whether the operator contracts the trailing feature axis
    pub is_reduction: bool,
}

/// The full operator table, immutable after construction
pub const OP_TABLE: &[OpDesc] = &[
    OpDesc {
        name: "add",
        use_lhs: true,
        use_rhs: true,
        is_reduction: false,
    },
    OpDesc {
        name: "sub",
        use_lhs: true,
        use_rhs: true,
        is_reduction: false,
    },
    OpDesc {
        name: "mul",
        use_lhs: true,
        use_rhs: true,
        is_reduction: false,
    },
    OpDesc {
        name: "div",
        use_lhs: true,
        use_rhs: true,
        is_reduction: false,
    },
    OpDesc {
        name: "copy_lhs",
        use_lhs: true,
        use_rhs: false,
        is_reduction: false,
    },
    OpDesc {
        name: "copy_rhs",
        use_lhs: false,
        use_rhs: true,
        is_reduction: false,
    },
    OpDesc {
        name: "dot",
        use_lhs: true,
        use_rhs: true,
        is_reduction: true,
    },
];

/// Look up the descriptor for a named operator
///
/// Unknown names are a configuration error reported before any tensor is
/// touched.
pub fn op_desc(name: &str) -> Result<&'static OpDesc> {
    OP_TABLE
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| Error::invalid_arg("op", format!("unsupported binary operator '{name}'")))
}

/// Map an operator name to its zero-sized type and run `$body` with `$Op`
/// bound to it
///
/// Unknown names return an `InvalidArgument` error from the enclosing
/// function.
#[macro_export]
macro_rules! switch_op {
    ($op:expr, $Op:ident => $body:block) => {
        match $op {
            "add" => {
                type $Op = $crate::ops::Add;
                $body
            }
            "sub" => {
                type $Op = $crate::ops::Sub;
                $body
            }
            "mul" => {
                type $Op = $crate::ops::Mul;
                $body
            }
            "div" => {
                type $Op = $crate::ops::Div;
                $body
            }
            "copy_lhs" => {
                type $Op = $crate::ops::CopyLhs;
                $body
            }
            "copy_rhs" => {
                type $Op = $crate::ops::CopyRhs;
                $body
            }
            "dot" => {
                type $Op = $crate::ops::Dot;
                $body
            }
            unknown => {
                return Err($crate::error::Error::invalid_arg(
                    "op",
                    format!("unsupported binary operator '{unknown}'"),
                ))
            }
        }
    };
}
