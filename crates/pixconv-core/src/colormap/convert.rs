//! Colormap construction and conversion
//!
//! Derived colormaps (tint ramps, false color), parallel-array and packed
//! table views used to build per-call lookup tables, and the in-place HSV
//! transforms applied entry by entry.

use super::{PixColormap, RgbColor};
use crate::color::{self, Hsv};
use crate::error::{Error, Result};

/// Colormap entries split into parallel channel arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColormapArrays {
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
}

impl ColormapArrays {
    /// Number of entries, or `None` if the arrays disagree in length.
    pub fn len(&self) -> Option<usize> {
        let n = self.red.len();
        (self.green.len() == n && self.blue.len() == n).then_some(n)
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.green.is_empty() && self.blue.is_empty()
    }
}

impl PixColormap {
    /// Split the entries into three parallel arrays.
    pub fn to_arrays(&self) -> ColormapArrays {
        let mut arrays = ColormapArrays {
            red: Vec::with_capacity(self.len()),
            green: Vec::with_capacity(self.len()),
            blue: Vec::with_capacity(self.len()),
        };
        for c in self.colors() {
            arrays.red.push(c.red);
            arrays.green.push(c.green);
            arrays.blue.push(c.blue);
        }
        arrays
    }

    /// Build a colormap from parallel channel arrays.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] if the arrays have different lengths
    /// - [`Error::ColormapFull`] if they hold more than `2^depth` entries
    pub fn from_arrays(depth: u32, arrays: &ColormapArrays) -> Result<Self> {
        let n = arrays.len().ok_or_else(|| {
            Error::InvalidParameter(format!(
                "channel arrays differ in length: {}/{}/{}",
                arrays.red.len(),
                arrays.green.len(),
                arrays.blue.len()
            ))
        })?;
        let colors: Vec<RgbColor> = (0..n)
            .map(|i| RgbColor::new(arrays.red[i], arrays.green[i], arrays.blue[i]))
            .collect();
        Self::from_colors(depth, &colors)
    }

    /// Entries packed as 32-bit RGB pixels (`0xRRGGBB00`), one per index.
    pub fn to_rgb_table(&self) -> Vec<u32> {
        self.colors()
            .iter()
            .map(|c| color::compose_rgb(c.red, c.green, c.blue))
            .collect()
    }

    /// Gray value of each entry: `(R + 2G + B) / 4`, truncated.
    pub fn to_gray_table(&self) -> Vec<u8> {
        self.colors()
            .iter()
            .map(|c| ((c.red as u32 + 2 * c.green as u32 + c.blue as u32) / 4) as u8)
            .collect()
    }

    /// Create a 256-entry tint ramp.
    ///
    /// Gray 0 maps to `tint` and gray 255 to white, with each channel
    /// interpolated linearly in between.
    pub fn gray_to_color(tint: RgbColor) -> Self {
        let ramp = |c: u8, i: u32| (c as u32 + (i * (255 - c as u32)) / 255) as u8;
        let colors = (0..256u32)
            .map(|i| RgbColor::new(ramp(tint.red, i), ramp(tint.green, i), ramp(tint.blue, i)))
            .collect();
        Self { colors, depth: 8 }
    }

    /// Create a 256-entry false-color colormap.
    ///
    /// Gray levels sweep blue, cyan, green, yellow, red across five bands.
    /// Every transition is read from one 64-entry curve
    /// `255 * (i / 64)^(1 / gamma)`. A `gamma` of 0 is read as 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a negative or non-finite
    /// `gamma`.
    pub fn gray_to_false_color(gamma: f32) -> Result<Self> {
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "gamma must be >= 0; got {gamma}"
            )));
        }
        let gamma = if gamma == 0.0 { 1.0 } else { gamma };
        let inv_gamma = 1.0 / gamma;

        let mut curve = [0u8; 64];
        for (i, entry) in curve.iter_mut().enumerate() {
            let x = i as f32 / 64.0;
            *entry = (255.0 * x.powf(inv_gamma) + 0.5) as u8;
        }

        let colors = (0..256usize)
            .map(|i| match i {
                0..32 => RgbColor::new(0, 0, curve[i + 32]),
                32..96 => RgbColor::new(0, curve[i - 32], 255),
                96..160 => RgbColor::new(curve[i - 96], 255, curve[159 - i]),
                160..224 => RgbColor::new(255, curve[223 - i], 0),
                _ => RgbColor::new(curve[287 - i], 0, 0),
            })
            .collect();
        Ok(Self { colors, depth: 8 })
    }

    /// Replace every entry (r, g, b) by its (h, s, v).
    pub fn convert_to_hsv(&mut self) {
        for c in &mut self.colors {
            let Hsv { h, s, v } = color::rgb_to_hsv(c.red, c.green, c.blue);
            *c = RgbColor::new(h, s, v);
        }
    }

    /// Replace every entry (h, s, v) by its (r, g, b).
    ///
    /// # Errors
    ///
    /// Fails without modifying the colormap if a chromatic entry has a hue
    /// above 240.
    pub fn convert_to_rgb(&mut self) -> Result<()> {
        let converted = self
            .colors
            .iter()
            .map(|c| {
                color::hsv_to_rgb(Hsv::new(c.red, c.green, c.blue))
                    .map(|(r, g, b)| RgbColor::new(r, g, b))
            })
            .collect::<Result<Vec<_>>>()?;
        self.colors = converted;
        Ok(())
    }
}
