//! Pixel format conversion
//!
//! Engines that reshape a raster between depths and representations:
//!
//! - [`remove`] - indexed to direct (colormap removal)
//! - [`unpack`] - depth widening and narrowing, lossless repacking
//! - [`gray`] - RGB to gray reductions
//! - [`gray_cmap`] - attaching gray colormaps to 8 bpp images
//! - [`dispatch`] - `convert_to_*` entry points that route on [`PixFormat`]
//!   through the table in [`policy`]
//!
//! Every conversion reads its source and returns a new raster, or a
//! shared view of the source where noted. Lookup tables are built per
//! call and dropped on return.
//!
//! [`PixFormat`]: super::PixFormat

pub mod dispatch;
pub mod gray;
pub mod gray_cmap;
pub mod policy;
pub mod remove;
pub mod unpack;

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};
use tracing::warn;

/// Default red weight for RGB-to-gray conversion.
pub const DEFAULT_RED_WEIGHT: f32 = 0.3;
/// Default green weight for RGB-to-gray conversion.
pub const DEFAULT_GREEN_WEIGHT: f32 = 0.5;
/// Default blue weight for RGB-to-gray conversion.
pub const DEFAULT_BLUE_WEIGHT: f32 = 0.2;

/// Target representation for colormap removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoveColormapTarget {
    /// 1 bpp without a colormap; only valid for 1 bpp sources
    ToBinary,
    /// 8 bpp gray, `(R + 2G + B) / 4` per entry
    ToGrayscale,
    /// 32 bpp RGB
    ToFullColor,
    /// Binary, gray or full color depending on depth and palette content
    BasedOnSource,
}

/// Selection for per-pixel min/max gray conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinMaxType {
    /// Minimum of R, G, B
    Min,
    /// Maximum of R, G, B
    Max,
}

/// Channel selector for [`Pix::convert_rgb_to_gray_general`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrayConversionType {
    Red,
    Green,
    Blue,
    Min,
    Max,
    /// Equal weights
    Average,
    /// Default weights {0.3, 0.5, 0.2}
    Weighted,
}

/// Byte selection for 16 bpp to 8 bpp conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convert16To8Type {
    /// Least significant byte
    LsByte,
    /// Most significant byte
    MsByte,
}

/// Channel weights for weighted-average gray conversion.
///
/// The default is {0.3, 0.5, 0.2}, the split used throughout this crate
/// when no weights are given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayWeights {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Default for GrayWeights {
    fn default() -> Self {
        Self::new(DEFAULT_RED_WEIGHT, DEFAULT_GREEN_WEIGHT, DEFAULT_BLUE_WEIGHT)
    }
}

impl GrayWeights {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Equal thirds.
    pub const fn equal() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Validate and normalize for use.
    ///
    /// All-zero weights become the default. Weights that do not sum to 1
    /// (within 1e-4) are rescaled, keeping their ratios, with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if any weight is negative or
    /// not finite.
    pub fn normalized(self, op: &'static str) -> Result<Self> {
        let Self { red, green, blue } = self;
        if [red, green, blue].iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidParameter(format!(
                "weights must be finite and non-negative: ({red}, {green}, {blue})"
            )));
        }
        if red == 0.0 && green == 0.0 && blue == 0.0 {
            return Ok(Self::default());
        }
        let sum = red + green + blue;
        if !sum.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "weights overflow: ({red}, {green}, {blue})"
            )));
        }
        if (sum - 1.0).abs() > 1e-4 {
            warn!(op, sum, "weights don't sum to 1; rescaling");
            return Ok(Self::new(red / sum, green / sum, blue / sum));
        }
        Ok(self)
    }

    /// Weighted gray value of one pixel, rounded to nearest.
    #[inline]
    pub fn apply(&self, r: u8, g: u8, b: u8) -> u8 {
        let val = self.red * r as f32 + self.green * g as f32 + self.blue * b as f32 + 0.5;
        val.min(255.0) as u8
    }
}

/// Adaptive palette selection for RGB images with many colors.
///
/// Implementations take a 32 bpp RGB image and return an indexed image
/// of the same size with at most `max_colors` palette entries.
pub trait ColorQuantizer {
    fn quantize(&self, pix: &Pix, max_colors: u32, dither: bool) -> Result<Pix>;
}

/// Check that `pix` has one of the allowed depths.
pub(crate) fn require_depth(pix: &Pix, allowed: &[PixelDepth]) -> Result<()> {
    if allowed.contains(&pix.depth()) {
        Ok(())
    } else {
        Err(Error::UnsupportedDepth(pix.depth().bits()))
    }
}

/// Fail if `pix` carries a colormap.
pub(crate) fn require_no_colormap(pix: &Pix) -> Result<()> {
    if pix.has_colormap() {
        Err(Error::ColormapPresent)
    } else {
        Ok(())
    }
}

/// Zeroed destination with the size and resolution of `src`.
pub(crate) fn dest_like(src: &Pix, depth: PixelDepth) -> Result<PixMut> {
    let mut pm = PixMut::new(src.width(), src.height(), depth)?;
    pm.copy_resolution_from(src);
    Ok(pm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_default_and_zero() {
        let w = GrayWeights::new(0.0, 0.0, 0.0).normalized("test").unwrap();
        assert_eq!(w, GrayWeights::default());
        assert_eq!(w.apply(255, 0, 0), 77);
        assert_eq!(w.apply(255, 255, 255), 255);
    }

    #[test]
    fn test_weights_rescaled() {
        let w = GrayWeights::new(1.0, 1.0, 2.0).normalized("test").unwrap();
        assert!((w.red - 0.25).abs() < 1e-6);
        assert!((w.blue - 0.5).abs() < 1e-6);
        assert_eq!(w.apply(0, 0, 200), 100);
    }

    #[test]
    fn test_weights_negative_rejected() {
        assert!(GrayWeights::new(-0.1, 0.6, 0.5).normalized("test").is_err());
        assert!(GrayWeights::new(f32::NAN, 0.5, 0.5).normalized("test").is_err());
        assert!(GrayWeights::new(0.3, f32::INFINITY, 0.2).normalized("test").is_err());
        assert!(GrayWeights::new(f32::NEG_INFINITY, 0.5, 0.5).normalized("test").is_err());
        assert!(GrayWeights::new(f32::MAX, f32::MAX, 0.0).normalized("test").is_err());
    }

    #[test]
    fn test_equal_weights() {
        let w = GrayWeights::equal().normalized("test").unwrap();
        assert_eq!(w.apply(30, 60, 90), 60);
    }
}
