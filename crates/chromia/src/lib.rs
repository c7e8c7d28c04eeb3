#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use chromia_tensor as tensor;

#[doc(inline)]
pub use chromia_image as image;

#[doc(inline)]
pub use chromia_imgproc as imgproc;

#[doc(inline)]
pub use chromia_io as io;

#[doc(inline)]
pub use chromia_dnn as dnn;

#[doc(inline)]
pub use chromia_colorize as colorize;
