//! Gray colormaps for 2, 4 and 8 bpp images
//!
//! Lossless conversion of direct gray images to indexed form.

use super::{RemoveColormapTarget, dest_like, require_depth};
use crate::colormap::{PixColormap, RgbColor};
use crate::error::Result;
use crate::pix::{Pix, PixMut, PixelDepth, get_data_byte, set_data};
use tracing::warn;

impl PixMut {
    /// Attach a 256-level linear gray colormap to an 8 bpp image.
    ///
    /// Pixel values are unchanged. An image that already has a colormap is
    /// left alone.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedDepth`] unless the image is 8 bpp.
    pub fn add_gray_colormap_8(&mut self) -> Result<()> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(crate::Error::UnsupportedDepth(self.depth().bits()));
        }
        if self.has_colormap() {
            return Ok(());
        }
        self.set_colormap(Some(PixColormap::create_linear(8, 256)?))
    }
}

/// Gray levels present in an 8 bpp direct image, ascending, and the
/// reverse map from level to colormap index.
fn present_levels(pix: &Pix) -> Result<(Vec<u8>, [u32; 256])> {
    let hist = pix.gray_histogram(1)?;
    let mut levels = Vec::new();
    let mut revmap = [0u32; 256];
    for (level, &count) in hist.iter().enumerate() {
        if count > 0 {
            revmap[level] = levels.len() as u32;
            levels.push(level as u8);
        }
    }
    Ok((levels, revmap))
}

impl Pix {
    /// 8 bpp copy with a colormap listing only the gray levels present,
    /// in ascending order; pixels become indices into it.
    ///
    /// A colormapped source whose every entry is in use is returned as a
    /// copy. Other colormapped sources are reduced to gray first. A direct
    /// image using all 256 levels gets the full linear ramp.
    pub fn add_minimal_gray_colormap_8(&self) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit8])?;

        let gray = match self.colormap() {
            Some(cmap) => {
                let used = count_distinct_bytes(self);
                if used == cmap.len() {
                    return self.duplicate();
                }
                self.remove_colormap(RemoveColormapTarget::ToGrayscale)?
            }
            None => self.share(),
        };

        let (levels, revmap) = present_levels(&gray)?;
        if levels.len() == 256 {
            let mut pm = gray.to_mut()?;
            pm.add_gray_colormap_8()?;
            return Ok(pm.into());
        }
        gray.reindex_gray(PixelDepth::Bit8, &levels, &revmap)
    }

    /// Attach a gray colormap to a 2, 4 or 8 bpp gray image.
    ///
    /// 8 bpp goes through [`Pix::convert_gray_to_colormap_8`] with a
    /// minimum depth of 2, which may shrink the image. 2 and 4 bpp keep
    /// their pixels and get an evenly spaced ramp of `2^depth` levels.
    /// A source that already has a colormap is copied with a warning.
    pub fn convert_gray_to_colormap(&self) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit2, PixelDepth::Bit4, PixelDepth::Bit8])?;
        if self.has_colormap() {
            warn!(op = "convert_gray_to_colormap", "source already has a colormap; copying");
            return self.duplicate();
        }
        let depth = self.depth();
        if depth == PixelDepth::Bit8 {
            return self.convert_gray_to_colormap_8(2);
        }
        let mut pm = self.to_mut()?;
        pm.set_colormap(Some(PixColormap::create_linear(
            depth.bits(),
            1 << depth.bits(),
        )?))?;
        Ok(pm.into())
    }

    /// Losslessly convert 8 bpp gray to an indexed image.
    ///
    /// The colormap lists the gray levels present, ascending. The output
    /// depth is the smallest of 2, 4 and 8 that holds them, but never
    /// below `min_depth`. An invalid `min_depth` (not 2, 4 or 8) is
    /// replaced by 8 with a warning; a colormapped source is copied with a
    /// warning.
    pub fn convert_gray_to_colormap_8(&self, min_depth: u32) -> Result<Pix> {
        const OP: &str = "convert_gray_to_colormap_8";
        require_depth(self, &[PixelDepth::Bit8])?;
        let min_depth = if matches!(min_depth, 2 | 4 | 8) {
            min_depth
        } else {
            warn!(op = OP, min_depth, "invalid min_depth; using 8");
            8
        };
        if self.has_colormap() {
            warn!(op = OP, "source already has a colormap; copying");
            return self.duplicate();
        }

        let (levels, revmap) = present_levels(self)?;
        let ncolors = levels.len();
        let depth = if min_depth == 8 || ncolors > 16 {
            PixelDepth::Bit8
        } else if min_depth == 4 || ncolors > 4 {
            PixelDepth::Bit4
        } else {
            PixelDepth::Bit2
        };
        self.reindex_gray(depth, &levels, &revmap)
    }

    /// Build an indexed image of `depth` from 8 bpp gray `self`.
    fn reindex_gray(&self, depth: PixelDepth, levels: &[u8], revmap: &[u32; 256]) -> Result<Pix> {
        let colors: Vec<RgbColor> = levels.iter().map(|&g| RgbColor::gray(g)).collect();
        let mut pm = dest_like(self, depth)?;
        pm.set_colormap(Some(PixColormap::from_colors(depth.bits(), &colors)?))?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for x in 0..self.width() {
                set_data(dst, x, depth, revmap[get_data_byte(src, x) as usize]);
            }
        }
        Ok(pm.into())
    }
}

/// Number of distinct byte values in an 8 bpp image, read as raw values.
fn count_distinct_bytes(pix: &Pix) -> usize {
    let mut seen = [false; 256];
    for y in 0..pix.height() {
        let line = pix.row_data(y);
        for x in 0..pix.width() {
            seen[get_data_byte(line, x) as usize] = true;
        }
    }
    seen.iter().filter(|&&s| s).count()
}
