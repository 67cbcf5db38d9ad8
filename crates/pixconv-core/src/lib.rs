//! pixconv Core - Raster model and pixel-format conversion
//!
//! This crate provides the fundamental data structures and the conversion
//! engines that reshape a raster between bit depths, between indexed and
//! direct representations, and from color to gray:
//!
//! - [`Pix`] / [`PixMut`] - The image container (shared / exclusively owned)
//! - [`PixColormap`] - Color palette for indexed images
//! - [`PixFormat`] - `{depth, has_colormap}` descriptor used for dispatch
//! - [`pix::convert`] - Colormap removal, depth widening/narrowing,
//!   RGB-to-gray reductions and the top-level `convert_to_*` functions
//!
//! # Pixel layout
//!
//! Rows are padded to whole 32-bit words and pixels are packed MSB first.
//! 32-bit pixels hold red in the most significant byte, then green, then
//! blue; the least significant byte is unused and written as zero.

pub mod colormap;
pub mod error;
pub mod pix;

pub use colormap::{ColormapArrays, PixColormap, RgbColor};
pub use error::{Error, ErrorKind, Result};
pub use pix::convert::{
    ColorQuantizer, Convert16To8Type, GrayConversionType, GrayWeights, MinMaxType,
    RemoveColormapTarget,
};
pub use pix::{Pix, PixFormat, PixMut, PixelDepth};

/// Color channel helpers for 32-bit RGB pixels and the integer HSV space.
///
/// # Pixel format
///
/// 32-bit pixels are stored as `0xRRGGBB00`: red in the MSB, the low byte
/// unused.
pub mod color {
    use crate::error::{Error, Result};

    /// Red channel (MSB, byte 0)
    pub const RED: usize = 0;
    /// Green channel (byte 1)
    pub const GREEN: usize = 1;
    /// Blue channel (byte 2)
    pub const BLUE: usize = 2;

    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 24;
    pub const GREEN_SHIFT: u32 = 16;
    pub const BLUE_SHIFT: u32 = 8;

    /// Number of hue units in a full turn; 40 units per 60 degrees.
    pub const HUE_RANGE: i32 = 240;

    /// Extract red component from a 32-bit pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a 32-bit pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a 32-bit pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Compose a 32-bit RGB pixel. The unused low byte is zero.
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << RED_SHIFT) | ((g as u32) << GREEN_SHIFT) | ((b as u32) << BLUE_SHIFT)
    }

    /// Extract RGB values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// HSV color values.
    ///
    /// Ranges: h [0..239], s [0..255], v [0..255]. Hue wraps, so h = 240 is
    /// accepted on input and read as 0.
    ///
    /// Hue correspondence:
    /// - 0: red
    /// - 40: yellow
    /// - 80: green
    /// - 120: cyan
    /// - 160: blue
    /// - 200: magenta
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Hsv {
        pub h: u8,
        pub s: u8,
        pub v: u8,
    }

    impl Hsv {
        pub fn new(h: u8, s: u8, v: u8) -> Self {
            Self { h, s, v }
        }

        /// Pack into the three most significant bytes of a 32-bit word,
        /// in the slots that hold R, G and B for an RGB pixel.
        #[inline]
        pub fn to_pixel(self) -> u32 {
            compose_rgb(self.h, self.s, self.v)
        }

        /// Read h, s, v back out of a packed word.
        #[inline]
        pub fn from_pixel(pixel: u32) -> Self {
            let (h, s, v) = extract_rgb(pixel);
            Self { h, s, v }
        }
    }

    /// Raw hue from the channel holding the max.
    ///
    /// Returns `None` for achromatic input. The result is in hue units,
    /// already wrapped into `[0, 240)` and rounded, with values within 0.5
    /// of 240 snapped to 0.
    #[inline]
    fn hue_units(r: i32, g: i32, b: i32, max: i32, delta: i32) -> Option<u8> {
        if delta == 0 {
            return None;
        }
        let sector = if r == max {
            (g - b) as f32 / delta as f32
        } else if g == max {
            2.0 + (b - r) as f32 / delta as f32
        } else {
            4.0 + (r - g) as f32 / delta as f32
        };
        let mut h = sector * 40.0;
        if h < 0.0 {
            h += HUE_RANGE as f32;
        }
        if h >= HUE_RANGE as f32 - 0.5 {
            h = 0.0;
        }
        Some((h + 0.5) as u8)
    }

    /// Hue of an RGB triple, 0 for gray.
    #[inline]
    pub fn hue(r: u8, g: u8, b: u8) -> u8 {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        hue_units(r, g, b, max, max - min).unwrap_or(0)
    }

    /// Saturation of an RGB triple, 0 for gray.
    #[inline]
    pub fn saturation(r: u8, g: u8, b: u8) -> u8 {
        let max = r.max(g).max(b) as i32;
        let min = r.min(g).min(b) as i32;
        if max == min {
            0
        } else {
            (255.0 * (max - min) as f32 / max as f32 + 0.5) as u8
        }
    }

    /// Value of an RGB triple: the largest component.
    #[inline]
    pub fn value(r: u8, g: u8, b: u8) -> u8 {
        r.max(g).max(b)
    }

    /// Convert RGB to the integer HSV space.
    ///
    /// Gray input (r = g = b) gets h = 0 and s = 0.
    pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
        let (ri, gi, bi) = (r as i32, g as i32, b as i32);
        let max = ri.max(gi).max(bi);
        let min = ri.min(gi).min(bi);
        let delta = max - min;

        match hue_units(ri, gi, bi, max, delta) {
            None => Hsv {
                h: 0,
                s: 0,
                v: max as u8,
            },
            Some(h) => Hsv {
                h,
                s: (255.0 * delta as f32 / max as f32 + 0.5) as u8,
                v: max as u8,
            },
        }
    }

    /// Convert from the integer HSV space back to RGB.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the pixel is chromatic
    /// (s > 0) and h lies outside `[0, 240]`.
    pub fn hsv_to_rgb(hsv: Hsv) -> Result<(u8, u8, u8)> {
        let Hsv { h, s, v } = hsv;
        if s == 0 {
            return Ok((v, v, v));
        }
        if h as i32 > HUE_RANGE {
            return Err(Error::InvalidParameter(format!(
                "hue {h} outside [0, {HUE_RANGE}]"
            )));
        }

        let h = if h as i32 == HUE_RANGE { 0 } else { h };
        let hf = h as f32 / 40.0;
        let sector = hf as u32;
        let f = hf - sector as f32;
        let sf = s as f32 / 255.0;
        let vf = v as f32;
        let x = (vf * (1.0 - sf) + 0.5) as u8;
        let y = (vf * (1.0 - sf * f) + 0.5) as u8;
        let z = (vf * (1.0 - sf * (1.0 - f)) + 0.5) as u8;

        let rgb = match sector {
            0 => (v, z, x),
            1 => (y, v, x),
            2 => (x, v, z),
            3 => (x, y, v),
            4 => (z, x, v),
            _ => (v, x, y),
        };
        Ok(rgb)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_compose_leaves_low_byte_zero() {
            assert_eq!(compose_rgb(0x12, 0x34, 0x56), 0x1234_5600);
            assert_eq!(extract_rgb(0x1234_56ff), (0x12, 0x34, 0x56));
        }

        #[test]
        fn test_primary_hues() {
            assert_eq!(rgb_to_hsv(255, 0, 0), Hsv::new(0, 255, 255));
            assert_eq!(rgb_to_hsv(255, 255, 0).h, 40);
            assert_eq!(rgb_to_hsv(0, 255, 0).h, 80);
            assert_eq!(rgb_to_hsv(0, 255, 255).h, 120);
            assert_eq!(rgb_to_hsv(0, 0, 255).h, 160);
            assert_eq!(rgb_to_hsv(255, 0, 255).h, 200);
        }

        #[test]
        fn test_achromatic_fixed_hue() {
            for v in [0u8, 1, 128, 255] {
                let hsv = rgb_to_hsv(v, v, v);
                assert_eq!(hsv, Hsv::new(0, 0, v));
                assert_eq!(hsv_to_rgb(hsv).unwrap(), (v, v, v));
            }
        }

        #[test]
        fn test_hue_snaps_near_full_turn() {
            // (255, 0, 1): sector -1/255 -> h = 239.84 -> snapped to 0
            assert_eq!(rgb_to_hsv(255, 0, 1).h, 0);
            assert_eq!(hue(255, 0, 1), 0);
        }

        #[test]
        fn test_hsv_rejects_out_of_range_hue() {
            assert!(hsv_to_rgb(Hsv::new(241, 100, 100)).is_err());
            // gray ignores hue
            assert_eq!(hsv_to_rgb(Hsv::new(250, 0, 77)).unwrap(), (77, 77, 77));
            // 240 wraps to 0
            assert_eq!(
                hsv_to_rgb(Hsv::new(240, 255, 255)).unwrap(),
                hsv_to_rgb(Hsv::new(0, 255, 255)).unwrap()
            );
        }

        #[test]
        fn test_single_channel_helpers_agree() {
            for &(r, g, b) in &[(10u8, 200u8, 30u8), (255, 128, 0), (3, 3, 9), (90, 90, 90)] {
                let hsv = rgb_to_hsv(r, g, b);
                assert_eq!(hue(r, g, b), hsv.h);
                assert_eq!(saturation(r, g, b), hsv.s);
                assert_eq!(value(r, g, b), hsv.v);
            }
        }

        #[test]
        fn test_hsv_roundtrip_whole_cube() {
            // 40 hue units per sector round hue to within 0.5 unit, which
            // moves the middle channel by up to 3 levels.
            let mut worst = 0;
            for rgb in 0..1u32 << 24 {
                let (r, g, b) = ((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
                let (r2, g2, b2) = hsv_to_rgb(rgb_to_hsv(r, g, b)).unwrap();
                let err = (r as i32 - r2 as i32)
                    .abs()
                    .max((g as i32 - g2 as i32).abs())
                    .max((b as i32 - b2 as i32).abs());
                if r == g && g == b {
                    assert_eq!(err, 0, "gray ({r},{g},{b}) not exact");
                }
                worst = worst.max(err);
            }
            assert_eq!(worst, 3);
        }

        #[test]
        fn test_hsv_roundtrip_worst_cases() {
            assert_eq!(rgb_to_hsv(0, 3, 220), Hsv::new(159, 255, 220));
            assert_eq!(hsv_to_rgb(Hsv::new(159, 255, 220)).unwrap(), (0, 6, 220));
            assert_eq!(hsv_to_rgb(rgb_to_hsv(0, 34, 209)).unwrap(), (0, 37, 209));
        }

        #[test]
        fn test_pixel_packing() {
            let hsv = Hsv::new(80, 255, 200);
            assert_eq!(hsv.to_pixel(), 0x50ff_c800);
            assert_eq!(Hsv::from_pixel(hsv.to_pixel()), hsv);
        }
    }
}
