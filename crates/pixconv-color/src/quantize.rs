//! RGB to colormapped conversion
//!
//! [`pix_convert_rgb_to_colormap`] keeps every color exactly when an
//! image has few enough of them, and otherwise hands the image to a
//! [`ColorQuantizer`]. [`pix_quantize_if_few_colors`] quantizes only
//! images that need a small palette, and refuses the rest.
//! [`MedianCutQuantizer`] is a simple quantizer for callers without their
//! own.

use crate::{ColorError, ColorResult};
use pixconv_core::pix::{get_data_byte, set_data};
use pixconv_core::{
    ColorQuantizer, Error, Pix, PixColormap, PixMut, PixelDepth, RgbColor, color,
};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, info, warn};

/// Palette size requested from the quantizer when an image has more than
/// 256 colors.
pub const QUANTIZED_COLORS: u32 = 240;

/// Distinct colors of a 32 bpp image in first-appearance order, with each
/// pixel's palette index. `None` if there are more than 256.
fn exact_palette(pix: &Pix) -> Option<(Vec<RgbColor>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(pix.width() as usize * pix.height() as usize);
    for y in 0..pix.height() {
        for &word in &pix.row_data(y)[..pix.width() as usize] {
            let key = word & 0xffff_ff00;
            let index = match lookup.get(&key) {
                Some(&i) => i,
                None => {
                    if palette.len() == 256 {
                        return None;
                    }
                    let (r, g, b) = color::extract_rgb(key);
                    palette.push(RgbColor::new(r, g, b));
                    let i = (palette.len() - 1) as u8;
                    lookup.insert(key, i);
                    i
                }
            };
            indices.push(index);
        }
    }
    Some((palette, indices))
}

/// Convert 32 bpp RGB to a colormapped image.
///
/// With at most 256 distinct colors the conversion is exact: the colormap
/// lists them in order of first appearance (scanning rows top to bottom)
/// and the output depth is the smallest of 2, 4 and 8 that can index them.
/// Otherwise `quantizer` is asked for [`QUANTIZED_COLORS`] colors, passing
/// `dither` through.
///
/// # Errors
///
/// - [`ColorError::UnsupportedDepth`] unless the source is 32 bpp
/// - whatever `quantizer` returns
pub fn pix_convert_rgb_to_colormap(
    pix: &Pix,
    dither: bool,
    quantizer: &dyn ColorQuantizer,
) -> ColorResult<Pix> {
    const OP: &str = "pix_convert_rgb_to_colormap";
    if pix.depth() != PixelDepth::Bit32 {
        return Err(ColorError::UnsupportedDepth {
            expected: "32 bpp",
            actual: pix.depth().bits(),
        });
    }

    let Some((palette, indices)) = exact_palette(pix) else {
        info!(op = OP, "more than 256 colors; quantizing");
        return Ok(quantizer.quantize(pix, QUANTIZED_COLORS, dither)?);
    };

    let cmap = PixColormap::from_colors(8, &palette)?;
    let depth = PixelDepth::from_bits(cmap.min_depth())?;
    debug!(op = OP, ncolors = palette.len(), depth = depth.bits(), "exact colormap");

    let mut pm = PixMut::new(pix.width(), pix.height(), depth)?;
    pm.copy_resolution_from(pix);
    pm.set_colormap(Some(cmap.with_depth(depth.bits())?))?;
    let w = pix.width() as usize;
    for (y, row) in indices.chunks(w).enumerate() {
        let line = pm.row_data_mut(y as u32);
        for (x, &i) in row.iter().enumerate() {
            set_data(line, x as u32, depth, i as u32);
        }
    }
    Ok(pm.into())
}

/// Default `max_colors` for [`pix_quantize_if_few_colors`].
pub const DEFAULT_MAX_FEW_COLORS: u32 = 15;

/// Default `min_gray_colors` for [`pix_quantize_if_few_colors`].
pub const DEFAULT_MIN_GRAY_COLORS: u32 = 10;

// Pixels with max <= DARK_THRESH or min >= LIGHT_THRESH carry no usable
// color.
const DARK_THRESH: u8 = 20;
const LIGHT_THRESH: u8 = 248;
// Channel spread at which a pixel counts as colored.
const COLOR_DIFF_THRESH: u8 = 30;
// Share of colored pixels that makes an image color.
const MIN_COLOR_FRACTION: f64 = 0.00025;
// Share of pixels a gray level needs to count as significant.
const MIN_GRAY_FRACTION: f64 = 0.0001;
const GRAY_LIGHT_THRESH: usize = 236;

/// True if enough pixels of a 32 bpp image are clearly colored.
fn has_significant_color(pix: &Pix) -> bool {
    let w = pix.width() as usize;
    let mut colored = 0u64;
    for y in 0..pix.height() {
        for &word in &pix.row_data(y)[..w] {
            let (r, g, b) = color::extract_rgb(word);
            let (max, min) = (r.max(g).max(b), r.min(g).min(b));
            if max > DARK_THRESH && min < LIGHT_THRESH && max - min >= COLOR_DIFF_THRESH {
                colored += 1;
            }
        }
    }
    let total = w as u64 * pix.height() as u64;
    colored > 0 && colored as f64 >= MIN_COLOR_FRACTION * total as f64
}

/// Number of occupied cubes with 16 levels per channel.
fn count_color_cubes(pix: &Pix) -> u32 {
    let mut occupied = vec![false; 1 << 12];
    let w = pix.width() as usize;
    for y in 0..pix.height() {
        for &word in &pix.row_data(y)[..w] {
            let (r, g, b) = color::extract_rgb(word);
            let cube = ((r as usize >> 4) << 8) | ((g as usize >> 4) << 4) | (b as usize >> 4);
            occupied[cube] = true;
        }
    }
    occupied.iter().filter(|&&o| o).count() as u32
}

/// Gray levels between the dark and light limits holding a significant
/// share of an 8 bpp image, plus two for black and white.
fn count_significant_grays(pix: &Pix) -> ColorResult<u32> {
    let hist = pix.gray_histogram(1)?;
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    let min_count = ((MIN_GRAY_FRACTION * total as f64).ceil() as u64).max(1);
    let mid = hist[DARK_THRESH as usize..=GRAY_LIGHT_THRESH]
        .iter()
        .filter(|&&c| c as u64 >= min_count)
        .count();
    Ok(mid as u32 + 2)
}

/// Map 8 bpp gray onto `nlevels` evenly spaced levels with a gray
/// colormap: 4 bpp below 16 levels, 8 bpp otherwise.
fn quantize_gray_levels(pix: &Pix, nlevels: u32) -> ColorResult<Pix> {
    let depth = if nlevels < 16 {
        PixelDepth::Bit4
    } else {
        PixelDepth::Bit8
    };
    let top = nlevels - 1;
    let table: Vec<u32> = (0..256u32).map(|v| (v * top + 127) / 255).collect();

    let (w, h) = (pix.width(), pix.height());
    let mut pm = PixMut::new(w, h, depth)?;
    pm.copy_resolution_from(pix);
    pm.set_colormap(Some(PixColormap::create_linear(
        depth.bits(),
        nlevels as usize,
    )?))?;
    for y in 0..h {
        let src = pix.row_data(y);
        let line = pm.row_data_mut(y);
        for x in 0..w {
            set_data(line, x, depth, table[get_data_byte(src, x) as usize]);
        }
    }
    Ok(pm.into())
}

/// Quantize an image that can be shown well with a small palette.
///
/// An already colormapped source comes back as a shared view. Otherwise
/// the colors are counted: for a color image, occupied cubes of 16 levels
/// per channel; for a gray one (8 bpp, or 32 bpp without significant
/// color), significant gray levels plus black and white.
///
/// - More than `max_colors` is an error.
/// - A color image goes to `quantizer` asking for that many colors.
/// - A gray image (reduced by luminance if 32 bpp) is mapped onto
///   `max(min_gray_colors, 1.5 * count)` evenly spaced levels, at 4 bpp
///   below 16 levels and 8 bpp otherwise.
///
/// `max_colors` of 0 selects [`DEFAULT_MAX_FEW_COLORS`] and
/// `min_gray_colors` of 0 selects [`DEFAULT_MIN_GRAY_COLORS`].
///
/// # Errors
///
/// - [`ColorError::UnsupportedDepth`] unless the source is 8 or 32 bpp
/// - [`ColorError::TooManyColors`] if the image needs more than
///   `max_colors`
/// - whatever `quantizer` returns
pub fn pix_quantize_if_few_colors(
    pix: &Pix,
    max_colors: u32,
    min_gray_colors: u32,
    quantizer: &dyn ColorQuantizer,
) -> ColorResult<Pix> {
    const OP: &str = "pix_quantize_if_few_colors";
    let depth = pix.depth();
    if depth != PixelDepth::Bit8 && depth != PixelDepth::Bit32 {
        return Err(ColorError::UnsupportedDepth {
            expected: "8 or 32 bpp",
            actual: depth.bits(),
        });
    }
    if pix.has_colormap() {
        return Ok(pix.share());
    }

    let max_colors = if max_colors == 0 {
        DEFAULT_MAX_FEW_COLORS
    } else {
        max_colors
    };
    if max_colors > 50 {
        warn!(op = OP, max_colors, "max_colors > 50; very large");
    }
    let min_gray_colors = if min_gray_colors == 0 {
        DEFAULT_MIN_GRAY_COLORS
    } else {
        min_gray_colors
    };
    if min_gray_colors > 30 {
        warn!(op = OP, min_gray_colors, "min_gray_colors > 30; very large");
    }

    if depth == PixelDepth::Bit32 && has_significant_color(pix) {
        let ncolors = count_color_cubes(pix);
        if ncolors > max_colors {
            return Err(ColorError::TooManyColors {
                count: ncolors,
                max: max_colors,
            });
        }
        debug!(op = OP, ncolors, "color image");
        return Ok(quantizer.quantize(pix, ncolors.min(256), false)?);
    }

    let gray = if depth == PixelDepth::Bit32 {
        pix.convert_rgb_to_luminance()?
    } else {
        pix.share()
    };
    let ncolors = count_significant_grays(&gray)?;
    if ncolors > max_colors {
        return Err(ColorError::TooManyColors {
            count: ncolors,
            max: max_colors,
        });
    }
    let nlevels = min_gray_colors.max(ncolors * 3 / 2).min(256);
    debug!(op = OP, ncolors, nlevels, "gray image");
    quantize_gray_levels(&gray, nlevels)
}

/// Median-cut palette selection.
///
/// The color box with the largest (pixel count x volume) is split at the
/// median of its widest channel until `max_colors` boxes exist or no box
/// can be split. Each box contributes its mean color. Dithering is not
/// performed; the `dither` flag is ignored.
#[derive(Debug, Clone, Copy)]
pub struct MedianCutQuantizer {
    /// Boxes with this many pixels or fewer are not split
    pub min_box_pixels: usize,
}

impl Default for MedianCutQuantizer {
    fn default() -> Self {
        Self { min_box_pixels: 1 }
    }
}

impl ColorQuantizer for MedianCutQuantizer {
    fn quantize(&self, pix: &Pix, max_colors: u32, _dither: bool) -> pixconv_core::Result<Pix> {
        if pix.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(pix.depth().bits()));
        }
        if !(1..=256).contains(&max_colors) {
            return Err(Error::InvalidParameter(format!(
                "max_colors {max_colors} not in [1, 256]"
            )));
        }

        let (w, h) = (pix.width(), pix.height());
        let pixels: Vec<[u8; 3]> = (0..h)
            .flat_map(|y| pix.row_data(y)[..w as usize].iter())
            .map(|&word| {
                let (r, g, b) = color::extract_rgb(word);
                [r, g, b]
            })
            .collect();

        let mut heap = BinaryHeap::new();
        heap.push(ColorBox::new(&pixels, (0..pixels.len()).collect()));
        let mut done = Vec::new();
        while heap.len() + done.len() < max_colors as usize {
            let Some(cbox) = heap.pop() else { break };
            if cbox.indices.len() <= self.min_box_pixels {
                done.push(cbox);
                continue;
            }
            match cbox.split(&pixels) {
                Ok((a, b)) => {
                    heap.push(a);
                    heap.push(b);
                }
                Err(unsplittable) => done.push(unsplittable),
            }
        }
        done.extend(heap.into_vec());

        let palette: Vec<RgbColor> = done.iter().map(|b| b.mean(&pixels)).collect();
        let mut index_of = vec![0u8; pixels.len()];
        for (i, cbox) in done.iter().enumerate() {
            for &p in &cbox.indices {
                index_of[p] = i as u8;
            }
        }

        let mut pm = PixMut::new(w, h, PixelDepth::Bit8)?;
        pm.copy_resolution_from(pix);
        pm.set_colormap(Some(PixColormap::from_colors(8, &palette)?))?;
        for (y, row) in index_of.chunks(w as usize).enumerate() {
            let line = pm.row_data_mut(y as u32);
            for (x, &i) in row.iter().enumerate() {
                set_data(line, x as u32, PixelDepth::Bit8, i as u32);
            }
        }
        Ok(pm.into())
    }
}

/// Pixels (by index) inside an axis-aligned RGB box.
struct ColorBox {
    indices: Vec<usize>,
    lo: [u8; 3],
    hi: [u8; 3],
}

impl ColorBox {
    fn new(pixels: &[[u8; 3]], indices: Vec<usize>) -> Self {
        let mut lo = [255u8; 3];
        let mut hi = [0u8; 3];
        for &i in &indices {
            for c in 0..3 {
                lo[c] = lo[c].min(pixels[i][c]);
                hi[c] = hi[c].max(pixels[i][c]);
            }
        }
        Self { indices, lo, hi }
    }

    fn volume(&self) -> u64 {
        (0..3)
            .map(|c| (self.hi[c].saturating_sub(self.lo[c])) as u64 + 1)
            .product()
    }

    fn priority(&self) -> u64 {
        self.indices.len() as u64 * self.volume()
    }

    /// Split at the median of the widest channel. A box holding a single
    /// color can't be split and is handed back.
    fn split(mut self, pixels: &[[u8; 3]]) -> Result<(ColorBox, ColorBox), ColorBox> {
        let widest = (0..3)
            .max_by_key(|&c| (self.hi[c].saturating_sub(self.lo[c]), std::cmp::Reverse(c)))
            .unwrap_or(0);
        if self.hi[widest] == self.lo[widest] {
            return Err(self);
        }
        self.indices.sort_by_key(|&i| pixels[i][widest]);
        let upper = self.indices.split_off(self.indices.len() / 2);
        Ok((ColorBox::new(pixels, self.indices), ColorBox::new(pixels, upper)))
    }

    fn mean(&self, pixels: &[[u8; 3]]) -> RgbColor {
        let n = self.indices.len().max(1) as u64;
        let mut sum = [0u64; 3];
        for &i in &self.indices {
            for c in 0..3 {
                sum[c] += pixels[i][c] as u64;
            }
        }
        RgbColor::new((sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8)
    }
}

impl PartialEq for ColorBox {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority()
    }
}

impl Eq for ColorBox {}

impl Ord for ColorBox {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for ColorBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
