//! Reducers for the aggregation kernel

use crate::dtype::Element;
use crate::error::{Error, Result};

/// Aggregation mode of the node-output kernel, resolved once per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Accumulate into a zero-initialized output
    Sum,
    /// Keep the largest contribution, recording its endpoints
    Max,
    /// Keep the smallest contribution, recording its endpoints
    Min,
}

impl ReduceOp {
    /// Resolve a reducer from its name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sum" => Ok(ReduceOp::Sum),
            "max" => Ok(ReduceOp::Max),
            "min" => Ok(ReduceOp::Min),
            other => Err(Error::invalid_arg(
                "reduce",
                format!("unsupported reducer '{other}'"),
            )),
        }
    }

    /// Reducer name
    pub const fn name(&self) -> &'static str {
        match self {
            ReduceOp::Sum => "sum",
            ReduceOp::Max => "max",
            ReduceOp::Min => "min",
        }
    }

    /// Whether this reducer produces auxiliary argument outputs
    #[inline]
    pub const fn has_args(&self) -> bool {
        !matches!(self, ReduceOp::Sum)
    }
}

/// A comparing reducer selecting one edge contribution per output channel
///
/// Used by the SpMM kernel for `max`/`min` aggregation. The running
/// accumulator starts at [`Reducer::init`] and is replaced whenever
/// [`Reducer::better`] holds, so the first edge (in row walk order) attaining
/// the extreme value wins ties.
pub trait Reducer<T: Element> {
    /// Reducer name as used in dispatch tables
    const NAME: &'static str;

    /// Identity value the accumulator starts from
    fn init() -> T;

    /// Whether `new` strictly beats the current accumulator
    fn better(new: T, current: T) -> bool;
}

/// Maximum reducer
pub struct Max;

/// Minimum reducer
pub struct Min;

impl<T: Element> Reducer<T> for Max {
    const NAME: &'static str = "max";

    #[inline]
    fn init() -> T {
        T::from_f64(f64::NEG_INFINITY)
    }

    #[inline]
    fn better(new: T, current: T) -> bool {
        new > current
    }
}

impl<T: Element> Reducer<T> for Min {
    const NAME: &'static str = "min";

    #[inline]
    fn init() -> T {
        T::from_f64(f64::INFINITY)
    }

    #[inline]
    fn better(new: T, current: T) -> bool {
        new < current
    }
}
