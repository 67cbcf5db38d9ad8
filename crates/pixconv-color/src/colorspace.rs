//! RGB <-> HSV conversion for whole images
//!
//! HSV pixels reuse the RGB layout: hue in the red byte, saturation in the
//! green byte and value in the blue byte. Hue runs over `[0, 240)`, 40
//! units per 60 degrees; saturation and value over `[0, 255]`. The scalar
//! transforms live in [`pixconv_core::color`].
//!
//! Each transform comes in two forms. The `_in_place` form rewrites the
//! buffer of a [`PixMut`] it is handed; the other leaves its source alone
//! and returns a converted copy. On an indexed image only the colormap
//! entries are transformed.

use crate::{ColorError, ColorResult};
use pixconv_core::color::{self, Hsv};
use pixconv_core::pix::set_data_byte;
use pixconv_core::{Pix, PixMut, PixelDepth, RemoveColormapTarget};
use tracing::debug;

fn require_rgb_or_colormap(format_ok: bool, depth: PixelDepth) -> ColorResult<()> {
    if format_ok {
        Ok(())
    } else {
        Err(ColorError::UnsupportedDepth {
            expected: "32 bpp or colormapped",
            actual: depth.bits(),
        })
    }
}

/// Convert RGB to HSV in place.
///
/// # Errors
///
/// Returns [`ColorError::UnsupportedDepth`] unless the image is 32 bpp or
/// colormapped.
pub fn pix_convert_rgb_to_hsv_in_place(pix: &mut PixMut) -> ColorResult<()> {
    let depth = pix.depth();
    require_rgb_or_colormap(pix.has_colormap() || depth == PixelDepth::Bit32, depth)?;
    if let Some(cmap) = pix.colormap_mut() {
        debug!(op = "pix_convert_rgb_to_hsv", ncolors = cmap.len(), "converting colormap");
        cmap.convert_to_hsv();
        return Ok(());
    }

    let w = pix.width() as usize;
    for y in 0..pix.height() {
        for word in &mut pix.row_data_mut(y)[..w] {
            let (r, g, b) = color::extract_rgb(*word);
            *word = color::rgb_to_hsv(r, g, b).to_pixel();
        }
    }
    Ok(())
}

/// Copy of `pix` with RGB replaced by HSV.
///
/// # Examples
///
/// ```
/// use pixconv_color::pix_convert_rgb_to_hsv;
/// use pixconv_core::{Pix, PixMut, PixelDepth};
///
/// let mut pm = PixMut::new(1, 1, PixelDepth::Bit32).unwrap();
/// pm.set_rgb(0, 0, 0, 0, 255).unwrap();
/// let hsv = pix_convert_rgb_to_hsv(&Pix::from(pm)).unwrap();
/// // blue: h = 160, s = 255, v = 255
/// assert_eq!(hsv.get_rgb(0, 0), Some((160, 255, 255)));
/// ```
pub fn pix_convert_rgb_to_hsv(pix: &Pix) -> ColorResult<Pix> {
    let mut pm = pix.to_mut()?;
    pix_convert_rgb_to_hsv_in_place(&mut pm)?;
    Ok(pm.into())
}

/// Convert HSV back to RGB in place.
///
/// The image is checked before anything is written, so a failed call
/// leaves it untouched.
///
/// # Errors
///
/// - [`ColorError::UnsupportedDepth`] unless the image is 32 bpp or
///   colormapped
/// - [`ColorError::InvalidHue`] for a chromatic pixel with hue above 240
/// - [`ColorError::Core`] for such an entry in a colormap
pub fn pix_convert_hsv_to_rgb_in_place(pix: &mut PixMut) -> ColorResult<()> {
    let depth = pix.depth();
    require_rgb_or_colormap(pix.has_colormap() || depth == PixelDepth::Bit32, depth)?;
    if let Some(cmap) = pix.colormap_mut() {
        debug!(op = "pix_convert_hsv_to_rgb", ncolors = cmap.len(), "converting colormap");
        cmap.convert_to_rgb()?;
        return Ok(());
    }

    let w = pix.width() as usize;
    for y in 0..pix.height() {
        for (x, &word) in pix.row_data(y)[..w].iter().enumerate() {
            let Hsv { h, s, .. } = Hsv::from_pixel(word);
            if s > 0 && h as i32 > color::HUE_RANGE {
                return Err(ColorError::InvalidHue { hue: h, x: x as u32, y });
            }
        }
    }
    for y in 0..pix.height() {
        for word in &mut pix.row_data_mut(y)[..w] {
            let (r, g, b) = color::hsv_to_rgb(Hsv::from_pixel(*word))?;
            *word = color::compose_rgb(r, g, b);
        }
    }
    Ok(())
}

/// Copy of `pix` with HSV replaced by RGB.
pub fn pix_convert_hsv_to_rgb(pix: &Pix) -> ColorResult<Pix> {
    let mut pm = pix.to_mut()?;
    pix_convert_hsv_to_rgb_in_place(&mut pm)?;
    Ok(pm.into())
}

/// 8 bpp image of one HSV component, computed per pixel from RGB.
fn extract_component(pix: &Pix, op: &'static str, f: fn(u8, u8, u8) -> u8) -> ColorResult<Pix> {
    let depth = pix.depth();
    require_rgb_or_colormap(pix.has_colormap() || depth == PixelDepth::Bit32, depth)?;
    let rgb = pix.remove_colormap(RemoveColormapTarget::ToFullColor)?;
    debug!(op, format = %pix.format(), "extracting component");

    let mut pm = PixMut::new(pix.width(), pix.height(), PixelDepth::Bit8)?;
    pm.copy_resolution_from(pix);
    for y in 0..rgb.height() {
        let src = rgb.row_data(y);
        let dst = pm.row_data_mut(y);
        for (x, &word) in src.iter().take(rgb.width() as usize).enumerate() {
            let (r, g, b) = color::extract_rgb(word);
            set_data_byte(dst, x as u32, f(r, g, b) as u32);
        }
    }
    Ok(pm.into())
}

/// 8 bpp hue image in `[0, 240)`; gray pixels get 0.
///
/// Accepts 32 bpp RGB or any colormapped image.
pub fn pix_convert_rgb_to_hue(pix: &Pix) -> ColorResult<Pix> {
    extract_component(pix, "pix_convert_rgb_to_hue", color::hue)
}

/// 8 bpp saturation image; gray pixels get 0.
pub fn pix_convert_rgb_to_saturation(pix: &Pix) -> ColorResult<Pix> {
    extract_component(pix, "pix_convert_rgb_to_saturation", color::saturation)
}

/// 8 bpp value image, the largest of R, G and B.
pub fn pix_convert_rgb_to_value(pix: &Pix) -> ColorResult<Pix> {
    extract_component(pix, "pix_convert_rgb_to_value", color::value)
}
