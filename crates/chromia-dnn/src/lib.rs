#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// The opaque model capability the pipeline runs against.
pub mod backend;

/// Error type for the dnn module.
pub mod error;

/// Colorization network adapter.
pub mod net;

/// ONNX Runtime backend (feature-gated).
///
/// Pre-requisites:
/// - `ORT_DYLIB_PATH` environment variable must point to the onnxruntime library.
#[cfg(feature = "ort")]
pub mod ort;

/// Chrominance cluster centers injected into the network.
pub mod prior;

pub use crate::backend::{Blob, ModelBackend, ModelLoader};
pub use crate::error::DnnError;
pub use crate::net::ColorizationNet;
pub use crate::prior::ClusterPrior;
