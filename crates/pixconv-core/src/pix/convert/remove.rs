//! Colormap removal
//!
//! Turns an indexed image into an equivalent colormap-free one: binary,
//! 8 bpp gray or 32 bpp RGB.

use super::{RemoveColormapTarget, dest_like};
use crate::colormap::{PixColormap, RgbColor};
use crate::error::Result;
use crate::pix::{Pix, PixelDepth, get_data, set_data_byte};
use tracing::{debug, warn};

const OP: &str = "remove_colormap";

/// Choose the concrete removal mode for a colormapped source.
///
/// `ToBinary` on anything but 1 bpp falls back to `BasedOnSource` with a
/// warning. `BasedOnSource` picks binary for a gray 1 bpp palette, gray
/// for any other gray palette, and full color otherwise.
pub(crate) fn resolve_target(
    depth: PixelDepth,
    cmap: &PixColormap,
    target: RemoveColormapTarget,
) -> RemoveColormapTarget {
    let target = if target == RemoveColormapTarget::ToBinary && depth != PixelDepth::Bit1 {
        warn!(op = OP, depth = depth.bits(), "not 1 bpp; can't remove colormap to binary");
        RemoveColormapTarget::BasedOnSource
    } else {
        target
    };

    match target {
        RemoveColormapTarget::BasedOnSource => {
            if cmap.has_color() {
                RemoveColormapTarget::ToFullColor
            } else if depth == PixelDepth::Bit1 {
                RemoveColormapTarget::ToBinary
            } else {
                RemoveColormapTarget::ToGrayscale
            }
        }
        other => other,
    }
}

impl Pix {
    /// Remove the colormap, producing an equivalent direct image.
    ///
    /// Without a colormap this returns a shared view of `self`.
    ///
    /// - `ToBinary`: 1 bpp copy with the colormap dropped. The bits are
    ///   inverted when entry 0 is black, so that 1 means black afterwards.
    /// - `ToGrayscale`: 8 bpp, each entry reduced to `(R + 2G + B) / 4`.
    /// - `ToFullColor`: 32 bpp RGB. Pixel values past the end of the
    ///   colormap are left at 0 and reported in a single warning.
    /// - `BasedOnSource`: one of the above, from depth and palette content.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_core::{Pix, PixColormap, PixelDepth, RemoveColormapTarget};
    ///
    /// let mut pm = Pix::new(4, 1, PixelDepth::Bit2).unwrap().to_mut().unwrap();
    /// pm.set_colormap(Some(PixColormap::create_linear(2, 4).unwrap())).unwrap();
    /// pm.set_pixel(3, 0, 2).unwrap();
    /// let pix: Pix = pm.into();
    ///
    /// let gray = pix.remove_colormap(RemoveColormapTarget::ToGrayscale).unwrap();
    /// assert_eq!(gray.depth(), PixelDepth::Bit8);
    /// assert_eq!(gray.get_pixel(3, 0), Some(170));
    /// ```
    pub fn remove_colormap(&self, target: RemoveColormapTarget) -> Result<Pix> {
        let Some(cmap) = self.colormap() else {
            return Ok(self.share());
        };

        let target = resolve_target(self.depth(), cmap, target);
        debug!(op = OP, format = %self.format(), ?target, "removing colormap");
        match target {
            RemoveColormapTarget::ToBinary => self.remove_colormap_to_binary(cmap),
            RemoveColormapTarget::ToGrayscale => self.remove_colormap_to_gray(cmap),
            _ => self.remove_colormap_to_full_color(cmap),
        }
    }

    fn remove_colormap_to_binary(&self, cmap: &PixColormap) -> Result<Pix> {
        let mut pm = self.to_mut()?;
        pm.take_colormap();
        if cmap.get(0) == Some(&RgbColor::BLACK) {
            pm.invert();
        }
        Ok(pm.into())
    }

    fn remove_colormap_to_gray(&self, cmap: &PixColormap) -> Result<Pix> {
        let depth = self.depth();
        let mut table = [0u8; 256];
        for (slot, g) in table.iter_mut().zip(cmap.to_gray_table()) {
            *slot = g;
        }

        let mut pm = dest_like(self, PixelDepth::Bit8)?;
        for y in 0..self.height() {
            map_row_to_bytes(self.row_data(y), pm.row_data_mut(y), self.width(), depth, &table);
        }
        Ok(pm.into())
    }

    fn remove_colormap_to_full_color(&self, cmap: &PixColormap) -> Result<Pix> {
        let depth = self.depth();
        let lut = cmap.to_rgb_table();
        let ncolors = lut.len() as u32;
        let mut bad_count = 0usize;
        let mut first_bad = None;

        let mut pm = dest_like(self, PixelDepth::Bit32)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for x in 0..self.width() {
                let val = get_data(src, x, depth);
                match lut.get(val as usize) {
                    Some(&rgb) => dst[x as usize] = rgb,
                    None => {
                        bad_count += 1;
                        first_bad.get_or_insert(val);
                    }
                }
            }
        }

        if let Some(first) = first_bad {
            warn!(
                op = OP,
                count = bad_count,
                first_index = first,
                ncolors,
                "pixel values out of colormap range; left unset"
            );
        }
        Ok(pm.into())
    }
}

/// Map each `depth`-bit pixel of `src` through `table` into 8 bpp `dst`.
///
/// Whole source words are expanded into whole destination words; the
/// pixels of a trailing partial word are handled one at a time.
pub(crate) fn map_row_to_bytes(
    src: &[u32],
    dst: &mut [u32],
    width: u32,
    depth: PixelDepth,
    table: &[u8; 256],
) {
    let d = depth.bits();
    let ppw = depth.pixels_per_word();
    let mask = depth.max_value();
    let out_per_word = (ppw / 4) as usize;
    let nfull = (width / ppw) as usize;

    for (j, &sword) in src[..nfull].iter().enumerate() {
        for q in 0..out_per_word {
            let mut dword = 0u32;
            for k in 0..4 {
                let idx = (q * 4 + k) as u32;
                let val = (sword >> (32 - d * (idx + 1))) & mask;
                dword = (dword << 8) | table[val as usize] as u32;
            }
            dst[j * out_per_word + q] = dword;
        }
    }
    for x in (nfull as u32 * ppw)..width {
        let val = get_data(src, x, depth);
        set_data_byte(dst, x, table[val as usize] as u32);
    }
}
