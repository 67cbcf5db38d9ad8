//! PixColormap - Color palette for indexed images
//!
//! A colormap is used with 1, 2, 4, and 8 bpp images to map
//! pixel values to RGB colors. Its capacity is `2^depth` entries.

mod convert;
mod query;

pub use convert::ColormapArrays;

use crate::error::{Error, Result};

/// RGB color entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);

    /// Create a new RGB color
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a grayscale color
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// True if the three components are equal.
    #[inline]
    pub fn is_gray(&self) -> bool {
        self.red == self.green && self.green == self.blue
    }

    /// Sum of the three components.
    #[inline]
    pub fn sum(&self) -> u32 {
        self.red as u32 + self.green as u32 + self.blue as u32
    }
}

/// Colormap for indexed images
///
/// # Examples
///
/// ```
/// use pixconv_core::PixColormap;
///
/// let mut cmap = PixColormap::new(2).unwrap();
/// cmap.add_rgb(255, 0, 0).unwrap();
/// cmap.add_rgb(0, 0, 255).unwrap();
/// assert_eq!(cmap.len(), 2);
/// assert!(cmap.has_color());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixColormap {
    colors: Vec<RgbColor>,
    depth: u32,
}

impl PixColormap {
    /// Create an empty colormap for the specified depth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDepth`] unless depth is 1, 2, 4 or 8.
    pub fn new(depth: u32) -> Result<Self> {
        if !matches!(depth, 1 | 2 | 4 | 8) {
            return Err(Error::InvalidDepth(depth));
        }
        Ok(Self {
            colors: Vec::with_capacity(1 << depth),
            depth,
        })
    }

    /// Create a gray ramp of `levels` entries evenly spaced from 0 to 255.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `levels` is not in
    /// `[2, 2^depth]`.
    pub fn create_linear(depth: u32, levels: usize) -> Result<Self> {
        let mut cmap = Self::new(depth)?;
        if levels < 2 || levels > cmap.max_entries() {
            return Err(Error::InvalidParameter(format!(
                "levels {levels} not in [2, {}]",
                cmap.max_entries()
            )));
        }
        for i in 0..levels {
            let val = (255 * i) / (levels - 1);
            cmap.colors.push(RgbColor::gray(val as u8));
        }
        Ok(cmap)
    }

    /// Build a colormap from a list of colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColormapFull`] if there are more than `2^depth`
    /// colors.
    pub fn from_colors(depth: u32, colors: &[RgbColor]) -> Result<Self> {
        let mut cmap = Self::new(depth)?;
        if colors.len() > cmap.max_entries() {
            return Err(Error::ColormapFull {
                capacity: cmap.max_entries(),
            });
        }
        cmap.colors.extend_from_slice(colors);
        Ok(cmap)
    }

    /// The same entries under a different depth.
    ///
    /// Used when an indexed image is widened and its palette travels with
    /// it unchanged.
    pub fn with_depth(&self, depth: u32) -> Result<Self> {
        Self::from_colors(depth, &self.colors)
    }

    /// Get the depth
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Get the number of colors
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Capacity, `2^depth`.
    #[inline]
    pub fn max_entries(&self) -> usize {
        1 << self.depth
    }

    /// Get a color by index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&RgbColor> {
        self.colors.get(index)
    }

    /// Append a color and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColormapFull`] when the colormap already holds
    /// `2^depth` entries.
    pub fn add_color(&mut self, color: RgbColor) -> Result<usize> {
        if self.colors.len() >= self.max_entries() {
            return Err(Error::ColormapFull {
                capacity: self.max_entries(),
            });
        }
        self.colors.push(color);
        Ok(self.colors.len() - 1)
    }

    /// Append an RGB color and return its index.
    pub fn add_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<usize> {
        self.add_color(RgbColor::new(r, g, b))
    }

    /// Replace the color at `index`.
    pub fn set_color(&mut self, index: usize, color: RgbColor) -> Result<()> {
        let len = self.colors.len();
        let slot = self
            .colors
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = color;
        Ok(())
    }

    /// Get RGB values at index
    #[inline]
    pub fn get_rgb(&self, index: usize) -> Option<(u8, u8, u8)> {
        self.colors.get(index).map(|c| (c.red, c.green, c.blue))
    }

    /// Get all colors as a slice
    #[inline]
    pub fn colors(&self) -> &[RgbColor] {
        &self.colors
    }
}
