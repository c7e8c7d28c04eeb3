#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// channel split, merge and offset utilities.
pub mod channels;

/// color transformations module.
pub mod color;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// utilities to stack images next to each other.
pub mod stack;
