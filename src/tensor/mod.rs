//! Tensor types: dense n-dimensional arrays over a runtime

mod core;
mod layout;
mod storage;

pub use self::core::Tensor;
pub use layout::{Layout, Shape, Strides};
pub use storage::Storage;
