#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `drr-tensor` is a small owned, row-major, N-dimensional array. It carries the
//! scan volumes `(D, H, W)` and the rendered image batches `(B, C, H, W)` that
//! flow through the renderer, with the dimension count checked at compile time.
//!
//! ```rust
//! use drr_tensor::Tensor4;
//!
//! let image = Tensor4::from_shape_val([2, 1, 3, 4], 0.0f32).unwrap();
//! assert_eq!(image.shape, [2, 1, 3, 4]);
//! assert_eq!(image.strides, [12, 12, 4, 1]);
//! assert_eq!(image.numel(), 24);
//! ```

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

pub use crate::tensor::{Tensor, TensorError};

/// Type alias for a 3-dimensional tensor, used for volumes `(D, H, W)`.
pub type Tensor3<T> = Tensor<T, 3>;

/// Type alias for a 4-dimensional tensor, used for image batches `(B, C, H, W)`.
pub type Tensor4<T> = Tensor<T, 4>;
