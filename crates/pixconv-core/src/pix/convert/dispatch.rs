//! Top-level conversions to a requested depth
//!
//! Each entry point looks up its steps in [`super::policy::plan`] and runs
//! them in order, handing every intermediate raster to the next step.

use super::policy::{Step, Target, plan};
use super::{Convert16To8Type, RemoveColormapTarget};
use crate::colormap::{PixColormap, RgbColor};
use crate::error::{Error, Result};
use crate::pix::{Pix, PixelDepth};
use tracing::{debug, warn};

/// Run `steps` on `src`. The first step sees a shared view of `src`.
fn run(src: &Pix, target: Target, op: &'static str) -> Result<Pix> {
    let steps = plan(target, src.format())?;
    debug!(op, format = %src.format(), ?steps, "dispatching conversion");
    let mut cur = src.share();
    for &step in &steps {
        cur = apply(step, cur)?;
    }
    Ok(cur)
}

fn apply(step: Step, pix: Pix) -> Result<Pix> {
    match step {
        Step::Share => Ok(pix),
        Step::Copy => pix.duplicate(),
        Step::RemoveColormap(target) => pix.remove_colormap(target),
        Step::RemoveColormapMultilevel => {
            let target = match pix.colormap() {
                Some(cmap) if cmap.has_color() => RemoveColormapTarget::ToFullColor,
                _ => RemoveColormapTarget::ToGrayscale,
            };
            pix.remove_colormap(target)
        }
        Step::StripBinaryColormap => strip_binary_colormap(pix),
        Step::AddGrayColormap => {
            let mut pm = pix.into_mut()?;
            pm.add_gray_colormap_8()?;
            Ok(pm.into())
        }
        Step::Unpack1 { depth, val0, val1 } => match depth {
            PixelDepth::Bit2 => pix.convert_1_to_2(val0, val1),
            PixelDepth::Bit4 => pix.convert_1_to_4(val0, val1),
            PixelDepth::Bit8 => pix.convert_1_to_8(val0, val1),
            PixelDepth::Bit16 => pix.convert_1_to_16(val0, val1),
            PixelDepth::Bit32 => pix.convert_1_to_32(val0, val1),
            PixelDepth::Bit1 => pix.duplicate(),
        },
        Step::Unpack1To8Indexed => {
            let cmap = match pix.colormap() {
                Some(cmap) => cmap.with_depth(8)?,
                None => PixColormap::from_colors(8, &[RgbColor::WHITE, RgbColor::BLACK])?,
            };
            let mut pm = pix.convert_1_to_8(0, 1)?.into_mut()?;
            pm.set_colormap(Some(cmap))?;
            Ok(pm.into())
        }
        Step::Widen2To8 { vals, with_colormap } => pix.convert_2_to_8(vals, with_colormap),
        Step::Widen4To8 { with_colormap } => pix.convert_4_to_8(with_colormap),
        Step::Narrow16To8 => pix.convert_16_to_8(Convert16To8Type::MsByte),
        Step::Widen8To16 { left_shift } => pix.convert_8_to_16(left_shift),
        Step::Widen8To32 => pix.convert_8_to_32(),
        Step::RgbToGray => pix.convert_rgb_to_luminance(),
        Step::Threshold(thresh) => pix.threshold_to_binary(thresh),
    }
}

/// Copy of a 1 bpp colormapped image with the colormap dropped, inverted
/// when entry 1 is brighter than entry 0 so that 1 reads as dark.
fn strip_binary_colormap(pix: Pix) -> Result<Pix> {
    let brightness = |i| {
        pix.colormap()
            .and_then(|c| c.get(i))
            .map_or(0, |c: &RgbColor| c.sum())
    };
    let invert = brightness(1) > brightness(0);
    let mut pm = pix.into_mut()?;
    pm.take_colormap();
    if invert {
        pm.invert();
    }
    Ok(pm.into())
}

fn check_factor(factor: u32) -> Result<()> {
    if factor == 0 {
        return Err(Error::InvalidParameter("sampling factor must be >= 1".into()));
    }
    Ok(())
}

impl Pix {
    /// Convert to 1 bpp.
    ///
    /// A 1 bpp source is copied; a colormapped one loses its colormap and
    /// is inverted if entry 1 is brighter than entry 0. Every other source
    /// goes through [`Pix::convert_to_8`] without a colormap and is then
    /// binarized: gray below `threshold` becomes 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_core::{Pix, PixMut, PixelDepth};
    ///
    /// let mut pm = PixMut::new(2, 1, PixelDepth::Bit8).unwrap();
    /// pm.set_pixel(0, 0, 20).unwrap();
    /// pm.set_pixel(1, 0, 220).unwrap();
    /// let bin = Pix::from(pm).convert_to_1(128).unwrap();
    /// assert_eq!(bin.get_pixel(0, 0), Some(1));
    /// assert_eq!(bin.get_pixel(1, 0), Some(0));
    /// ```
    pub fn convert_to_1(&self, threshold: u32) -> Result<Pix> {
        run(self, Target::Binary { threshold }, "convert_to_1")
    }

    /// Subsample by `factor`, then [`Pix::convert_to_1`].
    pub fn convert_to_1_by_sampling(&self, factor: u32, threshold: u32) -> Result<Pix> {
        check_factor(factor)?;
        self.scale_by_sampling(factor)?.convert_to_1(threshold)
    }

    /// Convert to 8 bpp, with a gray colormap if `with_colormap`.
    ///
    /// | source | result |
    /// |---|---|
    /// | 1 bpp | 0 -> 255, 1 -> 0; indexed: values 0/1 with a white/black colormap |
    /// | 2 bpp | gray {0, 85, 170, 255}, or indices with the source or a gray colormap |
    /// | 4 bpp | nibble replication, or indices with the source or a gray colormap |
    /// | 8 bpp | copy, with the colormap added or removed as needed |
    /// | 16 bpp | most significant byte |
    /// | 32 bpp | default weighted gray |
    ///
    /// A colormapped source converted without a colormap is reduced to
    /// gray.
    pub fn convert_to_8(&self, with_colormap: bool) -> Result<Pix> {
        run(self, Target::Gray8 { with_colormap }, "convert_to_8")
    }

    /// Subsample by `factor`, then [`Pix::convert_to_8`].
    pub fn convert_to_8_by_sampling(&self, factor: u32, with_colormap: bool) -> Result<Pix> {
        check_factor(factor)?;
        self.scale_by_sampling(factor)?.convert_to_8(with_colormap)
    }

    /// Convert a 1 or 8 bpp image to 16 bpp.
    ///
    /// 1 bpp maps 0 to 0xffff and 1 to 0; 8 bpp replicates each byte into
    /// both halves. A colormapped source is reduced to gray first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] for 2, 4, 16 and 32 bpp.
    pub fn convert_to_16(&self) -> Result<Pix> {
        run(self, Target::Gray16, "convert_to_16")
    }

    /// Convert to 32 bpp RGB.
    ///
    /// 1 bpp maps 0 to white and 1 to black. 2 and 4 bpp are widened
    /// through 8 bpp indices, 16 bpp through its most significant byte.
    /// Colormapped sources take their colors from the colormap; 32 bpp is
    /// copied.
    pub fn convert_to_32(&self) -> Result<Pix> {
        run(self, Target::Rgb32, "convert_to_32")
    }

    /// Subsample by `factor`, then [`Pix::convert_to_32`].
    pub fn convert_to_32_by_sampling(&self, factor: u32) -> Result<Pix> {
        check_factor(factor)?;
        self.scale_by_sampling(factor)?.convert_to_32()
    }

    /// Convert to colormap-free 8 or 32 bpp.
    ///
    /// A colormap is removed to gray, or to RGB if any entry has color,
    /// with a warning when `warn` is set. An uncolormapped 8 or 32 bpp
    /// source is copied if `copy`, else shared. Other depths go through
    /// [`Pix::convert_to_8`].
    pub fn convert_to_8_or_32(&self, copy: bool, warn: bool) -> Result<Pix> {
        const OP: &str = "convert_to_8_or_32";
        if warn && self.has_colormap() {
            warn!(op = OP, "pix has colormap; removing");
        }
        let pixd = run(self, Target::Gray8OrRgb32 { copy }, OP)?;
        match pixd.depth() {
            PixelDepth::Bit8 | PixelDepth::Bit32 => Ok(pixd),
            d => Err(Error::UnsupportedDepth(d.bits())),
        }
    }

    /// Convert to a depth a PostScript wrapper can embed: 1 bpp, 8 bpp
    /// gray or 32 bpp RGB.
    ///
    /// 1 and 32 bpp are shared unchanged. A colormapped 2, 4 or 8 bpp image
    /// loses its colormap the way [`RemoveColormapTarget::BasedOnSource`]
    /// decides; other 2 and 4 bpp images are widened to 8 bpp gray and
    /// 16 bpp keeps its most significant byte.
    pub fn convert_for_ps_wrap(&self) -> Result<Pix> {
        run(self, Target::PsWrap, "convert_for_ps_wrap")
    }
}
