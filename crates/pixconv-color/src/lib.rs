//! pixconv Color - Color-space and palette conversions
//!
//! This crate builds on [`pixconv_core`] with the conversions that deal in
//! color rather than depth:
//!
//! - **Color space** ([`colorspace`]): RGB <-> HSV on whole images, in place
//!   or as a copy, and single-component extractors
//! - **Coloring** ([`coloring`]): tinting gray images, false color
//! - **Quantization** ([`quantize`]): RGB to colormapped, exact when the
//!   image has at most 256 colors, and small-palette quantization of
//!   images with few colors

pub mod coloring;
pub mod colorspace;
pub mod error;
pub mod quantize;

// Re-export core types
pub use pixconv_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

pub use colorspace::{
    pix_convert_hsv_to_rgb, pix_convert_hsv_to_rgb_in_place, pix_convert_rgb_to_hsv,
    pix_convert_rgb_to_hsv_in_place, pix_convert_rgb_to_hue, pix_convert_rgb_to_saturation,
    pix_convert_rgb_to_value,
};

pub use coloring::{pix_colorize_gray, pix_convert_gray_to_false_color};

pub use quantize::{
    DEFAULT_MAX_FEW_COLORS, DEFAULT_MIN_GRAY_COLORS, MedianCutQuantizer, QUANTIZED_COLORS,
    pix_convert_rgb_to_colormap, pix_quantize_if_few_colors,
};
