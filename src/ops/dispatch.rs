//! DType dispatch utilities
//!
//! These macros convert a runtime [`DType`](crate::dtype::DType) into a
//! concrete generic type at the kernel dispatch boundary.
//!
//! # Usage
//!
//! ```ignore
//! dispatch_float_dtype!(out.dtype(), T => {
//!     dispatch_id_dtype!(graph.index_dtype(), I => {
//!         run_kernel::<I, T>(...)
//!     }, "sddmm")
//! }, "sddmm")
//! ```
//!
//! Feature tensors dispatch over floating point types only; an integer or
//! unsupported dtype yields an `UnsupportedDType` error naming the
//! operation. Graph index tensors dispatch over I64/I32.

/// Internal helper macro to dispatch types requiring the "f16" feature.
/// Parameterized by type to avoid duplicating the macro for F16 vs BF16.
#[macro_export]
#[doc(hidden)]
macro_rules! dispatch_f16_type {
    ($T:ident, $body:block, $dtype:expr, $feature_ty:ty) => {{
        #[cfg(feature = "f16")]
        {
            type $T = $feature_ty;
            $body
        }
        #[cfg(not(feature = "f16"))]
        {
            return Err($crate::error::Error::FeatureRequired {
                dtype: $dtype,
                feature: "f16",
            });
        }
    }};
}

/// Runtime dispatch over floating point feature dtypes
///
/// Executes `$body` with `$T` bound to the concrete Rust type for the given
/// dtype. Non-float dtypes return an `UnsupportedDType` error.
#[macro_export]
macro_rules! dispatch_float_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F16 => {
                $crate::dispatch_f16_type!($T, $body, $crate::dtype::DType::F16, half::f16)
            }
            $crate::dtype::DType::BF16 => {
                $crate::dispatch_f16_type!($T, $body, $crate::dtype::DType::BF16, half::bf16)
            }
            other => {
                return Err($crate::error::Error::UnsupportedDType {
                    dtype: other,
                    op: $error_op,
                })
            }
        }
    };
}

/// Runtime dispatch over graph index dtypes (I64, I32)
#[macro_export]
macro_rules! dispatch_id_dtype {
    ($dtype:expr, $I:ident => $body:block, $error_op:expr) => {
        match $dtype {
            $crate::dtype::DType::I64 => {
                type $I = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $I = i32;
                $body
            }
            other => {
                return Err($crate::error::Error::UnsupportedDType {
                    dtype: other,
                    op: $error_op,
                })
            }
        }
    };
}
