//! Colormap queries

use super::{PixColormap, RgbColor};

impl PixColormap {
    /// True if any entry has R != G or G != B.
    pub fn has_color(&self) -> bool {
        self.colors().iter().any(|c| !c.is_gray())
    }

    /// True if the colormap has exactly two entries, one black and one
    /// white, in either order.
    pub fn is_black_and_white(&self) -> bool {
        match self.colors() {
            [a, b] => {
                (*a == RgbColor::BLACK && *b == RgbColor::WHITE)
                    || (*a == RgbColor::WHITE && *b == RgbColor::BLACK)
            }
            _ => false,
        }
    }

    /// Smallest indexed depth (2, 4 or 8) able to hold every entry.
    pub fn min_depth(&self) -> u32 {
        match self.len() {
            0..=4 => 2,
            5..=16 => 4,
            _ => 8,
        }
    }
}
