//! Data type system for gspmm tensors
//!
//! This module provides the `DType` enum representing all supported element
//! types, plus the `Element` and `IdElement` traits connecting Rust types to
//! the runtime dtype system.

mod element;

pub use element::{Element, IdElement};

use std::fmt;

/// Data types supported by gspmm tensors
///
/// This enum represents the element type of a tensor at runtime.
/// Using an enum (rather than generics) allows runtime type selection
/// at the kernel dispatch boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 16-bit brain floating point
    BF16 = 3,
    /// 64-bit signed integer (graph indices)
    I64 = 10,
    /// 32-bit signed integer (graph indices)
    I32 = 11,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 | Self::I64 => 8,
            Self::F32 | Self::I32 => 4,
            Self::F16 | Self::BF16 => 2,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Returns true if this is an integer (graph index) type
    #[inline]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::I64 | Self::I32)
    }

    /// Returns the dtype name as a string
    pub const fn name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::I64 => "i64",
            Self::I32 => "i32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::F16.size_in_bytes(), 2);
        assert_eq!(DType::I64.size_in_bytes(), 8);
        assert_eq!(DType::I32.size_in_bytes(), 4);
    }

    #[test]
    fn test_dtype_classes() {
        assert!(DType::F32.is_float());
        assert!(!DType::F32.is_index());
        assert!(DType::I32.is_index());
        assert!(!DType::I64.is_float());
    }
}
