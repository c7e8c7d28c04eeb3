mod convert;
mod lab;

pub use convert::ConvertColor;
pub use lab::{lab_from_rgb, rgb_from_lab};
