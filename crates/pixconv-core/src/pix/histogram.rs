//! Gray-level histogram

use super::{Pix, PixelDepth, get_data};
use crate::error::{Error, Result};
use crate::pix::convert::RemoveColormapTarget;

impl Pix {
    /// Count pixels per gray level, sampling every `step`-th row and
    /// column.
    ///
    /// Direct images of 1, 2, 4 or 8 bpp give `2^depth` bins. An indexed
    /// image is first reduced to 8 bpp gray and gives 256 bins.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] if `step` is 0
    /// - [`Error::UnsupportedDepth`] for 16 and 32 bpp
    pub fn gray_histogram(&self, step: u32) -> Result<Vec<u32>> {
        if step == 0 {
            return Err(Error::InvalidParameter("sampling step must be >= 1".into()));
        }
        if self.has_colormap() {
            return self
                .remove_colormap(RemoveColormapTarget::ToGrayscale)?
                .gray_histogram(step);
        }
        let depth = self.depth();
        if depth > PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(depth.bits()));
        }

        let mut hist = vec![0u32; 1 << depth.bits()];
        for y in (0..self.height()).step_by(step as usize) {
            let line = self.row_data(y);
            for x in (0..self.width()).step_by(step as usize) {
                hist[get_data(line, x, depth) as usize] += 1;
            }
        }
        Ok(hist)
    }
}
