//! Tinting and false color for gray images
//!
//! Both operations attach a 256-entry colormap to an 8 bpp gray image, or
//! with [`pix_colorize_gray`], optionally push that colormap through to
//! 32 bpp RGB.

use crate::{ColorError, ColorResult};
use pixconv_core::pix::get_data_byte;
use pixconv_core::{
    Convert16To8Type, Pix, PixColormap, PixMut, PixelDepth, RemoveColormapTarget, RgbColor,
};
use tracing::debug;

/// 8 bpp gray version of `pix`: colormapped images are reduced to gray,
/// direct 8 bpp is copied.
fn gray_copy(pix: &Pix, expected: &'static str) -> ColorResult<Pix> {
    if pix.has_colormap() {
        return Ok(pix.remove_colormap(RemoveColormapTarget::ToGrayscale)?);
    }
    if pix.depth() != PixelDepth::Bit8 {
        return Err(ColorError::UnsupportedDepth {
            expected,
            actual: pix.depth().bits(),
        });
    }
    Ok(pix.duplicate()?)
}

/// Tint a gray image toward `tint`.
///
/// Gray 0 becomes `tint` and gray 255 stays white, with a linear blend in
/// between (see [`PixColormap::gray_to_color`]). With `with_colormap` the
/// result is 8 bpp carrying that ramp; otherwise it is 32 bpp RGB, the ramp
/// applied once per pixel through a 256-entry table.
///
/// A colormapped source of any depth is reduced to gray first.
///
/// # Errors
///
/// Returns [`ColorError::UnsupportedDepth`] for a direct image that isn't
/// 8 bpp.
pub fn pix_colorize_gray(pix: &Pix, tint: RgbColor, with_colormap: bool) -> ColorResult<Pix> {
    let gray = gray_copy(pix, "8 bpp or colormapped")?;
    let cmap = PixColormap::gray_to_color(tint);
    debug!(op = "pix_colorize_gray", ?tint, with_colormap, "colorizing");

    if with_colormap {
        let mut pm = gray.into_mut()?;
        pm.set_colormap(Some(cmap))?;
        return Ok(pm.into());
    }

    let table = cmap.to_rgb_table();
    let mut pm = PixMut::new(gray.width(), gray.height(), PixelDepth::Bit32)?;
    pm.copy_resolution_from(pix);
    for y in 0..gray.height() {
        let src = gray.row_data(y);
        let dst = pm.row_data_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            *out = table[get_data_byte(src, x as u32) as usize];
        }
    }
    Ok(pm.into())
}

/// Attach a blue-to-red false-color colormap to a gray image.
///
/// 16 bpp input keeps its most significant byte; colormapped 8 bpp input
/// is reduced to gray first. See [`PixColormap::gray_to_false_color`] for
/// the palette and `gamma`.
///
/// # Errors
///
/// - [`ColorError::UnsupportedDepth`] unless the source is 8 or 16 bpp
/// - [`ColorError::Core`] for a negative or non-finite `gamma`
pub fn pix_convert_gray_to_false_color(pix: &Pix, gamma: f32) -> ColorResult<Pix> {
    let cmap = PixColormap::gray_to_false_color(gamma)?;
    let gray = match pix.depth() {
        PixelDepth::Bit16 => pix.convert_16_to_8(Convert16To8Type::MsByte)?,
        PixelDepth::Bit8 => gray_copy(pix, "8 or 16 bpp")?,
        d => {
            return Err(ColorError::UnsupportedDepth {
                expected: "8 or 16 bpp",
                actual: d.bits(),
            });
        }
    };
    let mut pm = gray.into_mut()?;
    pm.set_colormap(Some(cmap))?;
    Ok(pm.into())
}
