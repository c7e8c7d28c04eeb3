#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `chromia-tensor` provides [`Tensor`], an owned multi-dimensional array with a
//! compile-time rank and row-major strides. It is the exchange format between the
//! image pipeline and the opaque model backends: luminance planes are wrapped into
//! `[batch, channel, height, width]` tensors before the forward pass, and the raw
//! model output is unwrapped from the same layout.
//!
//! ```rust
//! use chromia_tensor::Tensor;
//!
//! let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let tensor = Tensor::<f32, 2>::from_shape_vec([2, 3], data).unwrap();
//!
//! assert_eq!(tensor.get([1, 2]), Some(&6.0));
//!
//! let nchw = tensor.reshape([1, 1, 2, 3]).unwrap();
//! assert_eq!(nchw.shape, [1, 1, 2, 3]);
//! ```

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

pub use crate::tensor::{get_strides_from_shape, Tensor, TensorError};

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T> = Tensor<T, 2>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T> = Tensor<T, 3>;

/// Type alias for a 4-dimensional tensor.
pub type Tensor4<T> = Tensor<T, 4>;
