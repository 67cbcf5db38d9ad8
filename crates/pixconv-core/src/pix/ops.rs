//! Whole-image operations used by the conversion layer
//!
//! Bitwise inversion, fixed-threshold binarization and integer-factor
//! subsampling. The last two stand in for the thresholding and rescaling
//! collaborators that the `convert_to_1` and `*_by_sampling` paths call.

use super::{Pix, PixMut, PixelDepth, get_data, set_data, set_data_bit};
use crate::error::{Error, Result};

impl PixMut {
    /// Complement every bit of the image data.
    ///
    /// Pad bits past the last pixel of a row are flipped too; nothing reads
    /// them.
    pub fn invert(&mut self) {
        for word in self.data_mut() {
            *word = !*word;
        }
    }
}

impl Pix {
    /// Binarize a 4 or 8 bpp gray image: pixels below `thresh` become 1
    /// (foreground), the rest 0.
    ///
    /// # Errors
    ///
    /// - [`Error::ColormapPresent`] for indexed input
    /// - [`Error::UnsupportedDepth`] for depths other than 4 and 8
    /// - [`Error::InvalidParameter`] if `thresh` exceeds `2^depth`
    pub fn threshold_to_binary(&self, thresh: u32) -> Result<Pix> {
        super::convert::require_no_colormap(self)?;
        super::convert::require_depth(self, &[PixelDepth::Bit4, PixelDepth::Bit8])?;
        let depth = self.depth();
        if thresh > depth.max_value() + 1 {
            return Err(Error::InvalidParameter(format!(
                "threshold {thresh} out of range for {depth}"
            )));
        }

        let mut pm = super::convert::dest_like(self, PixelDepth::Bit1)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for x in 0..self.width() {
                if get_data(src, x, depth) < thresh {
                    set_data_bit(dst, x, 1);
                }
            }
        }
        Ok(pm.into())
    }

    /// Subsample by an integer `factor`, taking the pixel nearest the
    /// center of each `factor x factor` cell.
    ///
    /// Depth and colormap are kept; resolution is divided by `factor`.
    /// A factor of 1 returns an independent copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `factor` is 0.
    pub fn scale_by_sampling(&self, factor: u32) -> Result<Pix> {
        if factor == 0 {
            return Err(Error::InvalidParameter("sampling factor must be >= 1".into()));
        }
        if factor == 1 {
            return self.duplicate();
        }

        let (w, h) = (self.width(), self.height());
        let wd = ((w + factor / 2) / factor).max(1);
        let hd = ((h + factor / 2) / factor).max(1);
        let depth = self.depth();

        let mut pm = PixMut::new(wd, hd, depth)?;
        pm.set_resolution(self.xres() / factor as i32, self.yres() / factor as i32);
        if let Some(cmap) = self.colormap() {
            pm.set_colormap(Some(cmap.clone()))?;
        }
        for yd in 0..hd {
            let ys = (yd * factor + factor / 2).min(h - 1);
            let src = self.row_data(ys);
            let dst = pm.row_data_mut(yd);
            for xd in 0..wd {
                let xs = (xd * factor + factor / 2).min(w - 1);
                set_data(dst, xd, depth, get_data(src, xs, depth));
            }
        }
        Ok(pm.into())
    }
}
