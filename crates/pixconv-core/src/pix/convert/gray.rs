//! RGB to gray reductions

use super::{GrayConversionType, GrayWeights, MinMaxType, dest_like, require_depth};
use crate::color;
use crate::error::Result;
use crate::pix::{Pix, PixelDepth, set_data_byte};

impl Pix {
    /// Reduce 32 bpp RGB to 8 bpp gray with a per-pixel function.
    fn map_rgb_to_gray(&self, f: impl Fn(u8, u8, u8) -> u8) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit32])?;
        let mut pm = dest_like(self, PixelDepth::Bit8)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for (x, &pixel) in src.iter().enumerate() {
                let (r, g, b) = color::extract_rgb(pixel);
                set_data_byte(dst, x as u32, f(r, g, b) as u32);
            }
        }
        Ok(pm.into())
    }

    /// Luminance with the default weights {0.3, 0.5, 0.2}.
    pub fn convert_rgb_to_luminance(&self) -> Result<Pix> {
        self.convert_rgb_to_gray(GrayWeights::default())
    }

    /// Weighted average of R, G and B, rounded to nearest.
    ///
    /// All-zero weights select the default; weights that don't sum to 1
    /// are rescaled with a warning.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnsupportedDepth`] unless the source is 32 bpp
    /// - [`crate::Error::InvalidParameter`] for a negative or non-finite weight
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_core::{GrayWeights, PixMut, Pix, PixelDepth};
    ///
    /// let mut pm = PixMut::new(1, 1, PixelDepth::Bit32).unwrap();
    /// pm.set_rgb(0, 0, 255, 0, 0).unwrap();
    /// let pix: Pix = pm.into();
    /// let gray = pix.convert_rgb_to_gray(GrayWeights::default()).unwrap();
    /// assert_eq!(gray.get_pixel(0, 0), Some(77));
    /// ```
    pub fn convert_rgb_to_gray(&self, weights: GrayWeights) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit32])?;
        let weights = weights.normalized("convert_rgb_to_gray")?;
        self.map_rgb_to_gray(|r, g, b| weights.apply(r, g, b))
    }

    /// Fast approximation: the green channel.
    pub fn convert_rgb_to_gray_fast(&self) -> Result<Pix> {
        self.map_rgb_to_gray(|_, g, _| g)
    }

    /// Per-pixel minimum or maximum of R, G and B.
    pub fn convert_rgb_to_gray_min_max(&self, which: MinMaxType) -> Result<Pix> {
        match which {
            MinMaxType::Min => self.map_rgb_to_gray(|r, g, b| r.min(g).min(b)),
            MinMaxType::Max => self.map_rgb_to_gray(|r, g, b| r.max(g).max(b)),
        }
    }

    /// Gray from a single channel, an extremum, or an average.
    pub fn convert_rgb_to_gray_general(&self, kind: GrayConversionType) -> Result<Pix> {
        match kind {
            GrayConversionType::Red => self.map_rgb_to_gray(|r, _, _| r),
            GrayConversionType::Green => self.convert_rgb_to_gray_fast(),
            GrayConversionType::Blue => self.map_rgb_to_gray(|_, _, b| b),
            GrayConversionType::Min => self.convert_rgb_to_gray_min_max(MinMaxType::Min),
            GrayConversionType::Max => self.convert_rgb_to_gray_min_max(MinMaxType::Max),
            GrayConversionType::Average => self.convert_rgb_to_gray(GrayWeights::equal()),
            GrayConversionType::Weighted => self.convert_rgb_to_luminance(),
        }
    }
}
