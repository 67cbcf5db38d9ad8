//! pixconv - Pixel-format conversion for packed raster images
//!
//! Converts rasters between the depths 1, 2, 4, 8, 16 and 32 bpp, between
//! colormapped and direct representations, and between RGB, gray and HSV.
//!
//! - Core raster model and depth conversions are re-exported at the top
//!   level from `pixconv-core`
//! - Color-space, false-color and palette conversions live in [`color`]
//!
//! # Example
//!
//! ```
//! use pixconv::{Pix, PixelDepth};
//!
//! let pix = Pix::new(64, 48, PixelDepth::Bit4).unwrap();
//! let gray = pix.convert_to_8(false).unwrap();
//! assert_eq!(gray.depth(), PixelDepth::Bit8);
//! assert_eq!(gray.width(), 64);
//! ```

pub use pixconv_core::*;

pub use pixconv_color as color;
