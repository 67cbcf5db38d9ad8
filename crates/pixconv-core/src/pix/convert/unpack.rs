//! Depth widening and narrowing
//!
//! Binary expansion to every wider depth, 2/4 bpp to 8 bpp with or
//! without a colormap, 8 <-> 16 bpp, 8 bpp to RGB, and lossless repacking
//! of colormap-free 1/2/4/8 bpp images.
//!
//! The binary expanders look up several source bits at once and emit
//! whole destination words; the tables are rebuilt on every call.

use super::remove::map_row_to_bytes;
use super::{Convert16To8Type, RemoveColormapTarget, dest_like, require_depth, require_no_colormap};
use crate::colormap::{PixColormap, RgbColor};
use crate::error::{Error, Result};
use crate::pix::{
    Pix, PixMut, PixelDepth, get_data, get_data_byte, get_data_two_bytes, set_data,
    set_data_two_bytes,
};
use tracing::debug;

/// Table for expanding `key_bits` binary pixels into `key_bits` pixels of
/// depth `dd`, packed MSB first into the low `key_bits * dd` bits.
fn binary_expansion_table(key_bits: u32, dd: u32, val0: u32, val1: u32) -> Vec<u32> {
    (0..1u32 << key_bits)
        .map(|key| {
            let mut entry = 0u64;
            for b in (0..key_bits).rev() {
                let v = if (key >> b) & 1 == 1 { val1 } else { val0 };
                entry = (entry << dd) | v as u64;
            }
            entry as u32
        })
        .collect()
}

fn check_value(val: u32, depth: PixelDepth, name: &str) -> Result<()> {
    if val > depth.max_value() {
        return Err(Error::InvalidParameter(format!(
            "{name} = {val} does not fit in {depth}"
        )));
    }
    Ok(())
}

/// Build the 256-entry gray table used to expand a 2 bpp image.
fn dibit_table(vals: [u8; 4]) -> [u8; 256] {
    let mut table = [0u8; 256];
    table[..4].copy_from_slice(&vals);
    table
}

/// Nibble replication, `(q << 4) | q`: 0 -> 0x00, 0xf -> 0xff.
fn nibble_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (q, slot) in table.iter_mut().take(16).enumerate() {
        *slot = ((q << 4) | q) as u8;
    }
    table
}

fn identity_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = i as u8;
    }
    table
}

impl Pix {
    /// Expand a 1 bpp image to `depth`, mapping 0 to 0 and 1 to the
    /// largest value of `depth`, or the reverse when `invert` is set.
    ///
    /// Any colormap on the source is ignored; the raw bit values are
    /// expanded.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedDepth`] if the source is not 1 bpp
    /// - [`Error::InvalidParameter`] if `depth` is 1 bpp
    pub fn unpack_binary(&self, depth: PixelDepth, invert: bool) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit1])?;
        if depth == PixelDepth::Bit1 {
            return Err(Error::InvalidParameter(
                "unpack_binary target must be wider than 1 bpp".into(),
            ));
        }
        let max = depth.max_value();
        let (val0, val1) = if invert { (max, 0) } else { (0, max) };
        self.convert_1_to(depth, val0, val1)
    }

    /// Expand 1 bpp to 2 bpp: bit 0 becomes `val0`, bit 1 becomes `val1`.
    pub fn convert_1_to_2(&self, val0: u32, val1: u32) -> Result<Pix> {
        self.convert_1_to(PixelDepth::Bit2, val0, val1)
    }

    /// Expand 1 bpp to 4 bpp: bit 0 becomes `val0`, bit 1 becomes `val1`.
    pub fn convert_1_to_4(&self, val0: u32, val1: u32) -> Result<Pix> {
        self.convert_1_to(PixelDepth::Bit4, val0, val1)
    }

    /// Expand 1 bpp to 8 bpp: bit 0 becomes `val0`, bit 1 becomes `val1`.
    pub fn convert_1_to_8(&self, val0: u32, val1: u32) -> Result<Pix> {
        self.convert_1_to(PixelDepth::Bit8, val0, val1)
    }

    /// Expand 1 bpp to 16 bpp: bit 0 becomes `val0`, bit 1 becomes `val1`.
    pub fn convert_1_to_16(&self, val0: u32, val1: u32) -> Result<Pix> {
        self.convert_1_to(PixelDepth::Bit16, val0, val1)
    }

    /// Expand 1 bpp to 32 bpp: bit 0 becomes `val0`, bit 1 becomes `val1`.
    pub fn convert_1_to_32(&self, val0: u32, val1: u32) -> Result<Pix> {
        self.convert_1_to(PixelDepth::Bit32, val0, val1)
    }

    /// Expand 1 bpp to 2 bpp with a white/black colormap (0 -> white,
    /// 1 -> black).
    pub fn convert_1_to_2_cmap(&self) -> Result<Pix> {
        self.convert_1_to_cmap(PixelDepth::Bit2)
    }

    /// Expand 1 bpp to 4 bpp with a white/black colormap (0 -> white,
    /// 1 -> black).
    pub fn convert_1_to_4_cmap(&self) -> Result<Pix> {
        self.convert_1_to_cmap(PixelDepth::Bit4)
    }

    pub(crate) fn convert_1_to_cmap(&self, depth: PixelDepth) -> Result<Pix> {
        let mut pm = self.expand_binary(depth, 0, 1)?;
        let cmap = PixColormap::from_colors(depth.bits(), &[RgbColor::WHITE, RgbColor::BLACK])?;
        pm.set_colormap(Some(cmap))?;
        Ok(pm.into())
    }

    fn convert_1_to(&self, depth: PixelDepth, val0: u32, val1: u32) -> Result<Pix> {
        Ok(self.expand_binary(depth, val0, val1)?.into())
    }

    /// Table-driven 1 bpp expansion into a colormap-free `PixMut`.
    fn expand_binary(&self, depth: PixelDepth, val0: u32, val1: u32) -> Result<PixMut> {
        require_depth(self, &[PixelDepth::Bit1])?;
        check_value(val0, depth, "val0")?;
        check_value(val1, depth, "val1")?;

        let dd = depth.bits();
        // bits consumed per lookup; one lookup fills at most one word
        let key_bits = (32 / dd).min(8);
        let key_mask = (1u32 << key_bits) - 1;
        let lookups_per_word = (32 / dd) / key_bits;
        let table = binary_expansion_table(key_bits, dd, val0, val1);
        debug!(op = "unpack_binary", dd, key_bits, "expanding binary image");

        let mut pm = dest_like(self, depth)?;
        let ppw = depth.pixels_per_word();
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for (j, dword) in dst.iter_mut().enumerate() {
                let start = j as u32 * ppw;
                let mut word = 0u64;
                for l in 0..lookups_per_word {
                    let p = start + l * key_bits;
                    let key = (src[(p / 32) as usize] >> (32 - key_bits - p % 32)) & key_mask;
                    word = (word << (key_bits * dd)) | table[key as usize] as u64;
                }
                *dword = word as u32;
            }
        }
        Ok(pm)
    }

    /// Widen 2 bpp to 8 bpp.
    ///
    /// With `with_colormap`, pixel values are kept as indices: the source
    /// colormap is carried over, or a gray colormap is built from `vals`.
    /// Without it, a colormapped source is reduced to gray and a direct
    /// source is mapped through `vals`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the source is not 2 bpp.
    pub fn convert_2_to_8(&self, vals: [u8; 4], with_colormap: bool) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit2])?;
        if with_colormap {
            let cmap = match self.colormap() {
                Some(cmap) => cmap.with_depth(8)?,
                None => {
                    let grays: Vec<RgbColor> = vals.iter().map(|&v| RgbColor::gray(v)).collect();
                    PixColormap::from_colors(8, &grays)?
                }
            };
            return self.widen_indices_to_8(cmap);
        }
        if self.has_colormap() {
            return self.remove_colormap(RemoveColormapTarget::ToGrayscale);
        }
        self.map_to_8(&dibit_table(vals))
    }

    /// Widen 4 bpp to 8 bpp.
    ///
    /// With `with_colormap`, pixel values are kept as indices: the source
    /// colormap is carried over, or a 16-level gray ramp (`17 * i`) is
    /// attached. Without it, a colormapped source is reduced to gray and a
    /// direct source has each nibble replicated, `(q << 4) | q`.
    pub fn convert_4_to_8(&self, with_colormap: bool) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit4])?;
        if with_colormap {
            let cmap = match self.colormap() {
                Some(cmap) => cmap.with_depth(8)?,
                None => {
                    let grays: Vec<RgbColor> =
                        (0..16u8).map(|i| RgbColor::gray(17 * i)).collect();
                    PixColormap::from_colors(8, &grays)?
                }
            };
            return self.widen_indices_to_8(cmap);
        }
        if self.has_colormap() {
            return self.remove_colormap(RemoveColormapTarget::ToGrayscale);
        }
        self.map_to_8(&nibble_table())
    }

    fn widen_indices_to_8(&self, cmap: PixColormap) -> Result<Pix> {
        let mut pm = self.map_to_8_mut(&identity_table())?;
        pm.set_colormap(Some(cmap))?;
        Ok(pm.into())
    }

    fn map_to_8(&self, table: &[u8; 256]) -> Result<Pix> {
        Ok(self.map_to_8_mut(table)?.into())
    }

    fn map_to_8_mut(&self, table: &[u8; 256]) -> Result<PixMut> {
        let mut pm = dest_like(self, PixelDepth::Bit8)?;
        for y in 0..self.height() {
            map_row_to_bytes(self.row_data(y), pm.row_data_mut(y), self.width(), self.depth(), table);
        }
        Ok(pm)
    }

    /// Narrow 16 bpp to 8 bpp by keeping one byte of each sample.
    pub fn convert_16_to_8(&self, which: Convert16To8Type) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit16])?;
        let shift = match which {
            Convert16To8Type::MsByte => 8,
            Convert16To8Type::LsByte => 0,
        };
        let mut pm = dest_like(self, PixelDepth::Bit8)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for x in 0..self.width() {
                let val = (get_data_two_bytes(src, x) >> shift) & 0xff;
                set_data(dst, x, PixelDepth::Bit8, val);
            }
        }
        Ok(pm.into())
    }

    /// Widen 8 bpp to 16 bpp by shifting each sample left.
    ///
    /// A shift of 8 also copies the byte into the low half, so 0xff maps
    /// to 0xffff. A colormapped source is reduced to gray first.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedDepth`] if the source is not 8 bpp
    /// - [`Error::InvalidParameter`] if `left_shift > 8`
    pub fn convert_8_to_16(&self, left_shift: u32) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit8])?;
        if left_shift > 8 {
            return Err(Error::InvalidParameter(format!(
                "left_shift {left_shift} not in [0, 8]"
            )));
        }
        if self.has_colormap() {
            return self
                .remove_colormap(RemoveColormapTarget::ToGrayscale)?
                .convert_8_to_16(left_shift);
        }

        let mut pm = dest_like(self, PixelDepth::Bit16)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for x in 0..self.width() {
                let v = get_data_byte(src, x);
                let val = if left_shift == 8 { v | (v << 8) } else { v << left_shift };
                set_data_two_bytes(dst, x, val);
            }
        }
        Ok(pm.into())
    }

    /// Widen 8 bpp gray to 32 bpp RGB by replicating the byte into R, G
    /// and B. A colormapped source is converted to full color instead.
    pub fn convert_8_to_32(&self) -> Result<Pix> {
        require_depth(self, &[PixelDepth::Bit8])?;
        if self.has_colormap() {
            return self.remove_colormap(RemoveColormapTarget::ToFullColor);
        }

        let table: Vec<u32> = (0..256u32).map(|i| (i << 24) | (i << 16) | (i << 8)).collect();
        let mut pm = dest_like(self, PixelDepth::Bit32)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for (x, out) in dst.iter_mut().enumerate() {
                *out = table[get_data_byte(src, x as u32) as usize];
            }
        }
        Ok(pm.into())
    }

    /// Unpack a colormap-free 1, 2, 4 or 8 bpp image to depth `depth`
    /// (2, 4 or 8) without changing any pixel value.
    ///
    /// # Errors
    ///
    /// - [`Error::ColormapPresent`] for indexed input
    /// - [`Error::UnsupportedDepth`] for 16 and 32 bpp sources
    /// - [`Error::InvalidParameter`] if `depth` is not 2, 4 or 8
    /// - [`Error::DepthNarrowing`] if `depth` is below the source depth
    pub fn convert_lossless(&self, depth: PixelDepth) -> Result<Pix> {
        require_no_colormap(self)?;
        require_depth(
            self,
            &[PixelDepth::Bit1, PixelDepth::Bit2, PixelDepth::Bit4, PixelDepth::Bit8],
        )?;
        if !matches!(depth, PixelDepth::Bit2 | PixelDepth::Bit4 | PixelDepth::Bit8) {
            return Err(Error::InvalidParameter(format!(
                "lossless target must be 2, 4 or 8 bpp; got {depth}"
            )));
        }
        let ds = self.depth();
        if depth < ds {
            return Err(Error::DepthNarrowing {
                from: ds.bits(),
                to: depth.bits(),
            });
        }
        if depth == ds {
            return self.duplicate();
        }

        let mut pm = dest_like(self, depth)?;
        for y in 0..self.height() {
            let src = self.row_data(y);
            let dst = pm.row_data_mut(y);
            for x in 0..self.width() {
                set_data(dst, x, depth, get_data(src, x, ds));
            }
        }
        Ok(pm.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_pattern(w: u32) -> (Pix, Vec<u32>) {
        let bits: Vec<u32> = (0..w).map(|x| ((x * 7 + x / 3) % 2)).collect();
        let mut pm = PixMut::new(w, 2, PixelDepth::Bit1).unwrap();
        for (x, &b) in bits.iter().enumerate() {
            pm.set_pixel(x as u32, 1, b).unwrap();
        }
        (pm.into(), bits)
    }

    #[test]
    fn test_expansion_table() {
        let t = binary_expansion_table(8, 2, 0, 3);
        assert_eq!(t[0b1000_0001], 0b1100_0000_0000_0011);
        let t = binary_expansion_table(1, 32, 7, 0xffff_ffff);
        assert_eq!(t, vec![7, 0xffff_ffff]);
    }

    #[test]
    fn test_convert_1_to_every_depth() {
        let (pix, bits) = binary_pattern(45);
        for (depth, v0, v1) in [
            (PixelDepth::Bit2, 1, 2),
            (PixelDepth::Bit4, 0xf, 3),
            (PixelDepth::Bit8, 255, 0),
            (PixelDepth::Bit16, 0x1234, 0xffff),
            (PixelDepth::Bit32, 0xffff_ff00, 0x00ff_0000),
        ] {
            let out = pix.convert_1_to(depth, v0, v1).unwrap();
            assert_eq!(out.depth(), depth);
            for (x, &b) in bits.iter().enumerate() {
                let want = if b == 1 { v1 } else { v0 };
                assert_eq!(out.get_pixel(x as u32, 1), Some(want), "{depth} x={x}");
                assert_eq!(out.get_pixel(x as u32, 0), Some(v0));
            }
        }
    }

    #[test]
    fn test_convert_1_value_range() {
        let (pix, _) = binary_pattern(8);
        assert!(pix.convert_1_to_2(0, 4).is_err());
        assert!(pix.convert_1_to_8(256, 0).is_err());
        let gray = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        assert!(matches!(
            gray.convert_1_to_8(0, 255),
            Err(Error::UnsupportedDepth(8))
        ));
    }

    #[test]
    fn test_unpack_binary() {
        let (pix, bits) = binary_pattern(33);
        let out = pix.unpack_binary(PixelDepth::Bit16, false).unwrap();
        let inv = pix.unpack_binary(PixelDepth::Bit16, true).unwrap();
        for (x, &b) in bits.iter().enumerate() {
            assert_eq!(out.get_pixel(x as u32, 1), Some(b * 0xffff));
            assert_eq!(inv.get_pixel(x as u32, 1), Some((1 - b) * 0xffff));
        }
        let out32 = pix.unpack_binary(PixelDepth::Bit32, false).unwrap();
        assert_eq!(out32.get_pixel(1, 1), Some(bits[1] * u32::MAX));
        assert!(pix.unpack_binary(PixelDepth::Bit1, false).is_err());
    }

    #[test]
    fn test_convert_1_cmap() {
        let (pix, bits) = binary_pattern(20);
        for out in [pix.convert_1_to_2_cmap().unwrap(), pix.convert_1_to_4_cmap().unwrap()] {
            let cmap = out.colormap().unwrap();
            assert_eq!(cmap.get_rgb(0), Some((255, 255, 255)));
            assert_eq!(cmap.get_rgb(1), Some((0, 0, 0)));
            for (x, &b) in bits.iter().enumerate() {
                assert_eq!(out.get_pixel(x as u32, 1), Some(b));
            }
        }
    }

    #[test]
    fn test_convert_2_to_8() {
        let mut pm = PixMut::new(21, 1, PixelDepth::Bit2).unwrap();
        for x in 0..21 {
            pm.set_pixel(x, 0, x % 4).unwrap();
        }
        let pix: Pix = pm.into();

        let direct = pix.convert_2_to_8([0, 85, 170, 255], false).unwrap();
        assert!(!direct.has_colormap());
        let indexed = pix.convert_2_to_8([10, 20, 30, 40], true).unwrap();
        assert_eq!(indexed.colormap().unwrap().get_rgb(2), Some((30, 30, 30)));
        for x in 0..21 {
            assert_eq!(direct.get_pixel(x, 0), Some([0, 85, 170, 255][(x % 4) as usize]));
            assert_eq!(indexed.get_pixel(x, 0), Some(x % 4));
        }
    }

    #[test]
    fn test_convert_2_to_8_carries_colormap() {
        let mut pm = PixMut::new(3, 1, PixelDepth::Bit2).unwrap();
        let cmap = PixColormap::from_colors(
            2,
            &[RgbColor::new(255, 0, 0), RgbColor::new(0, 0, 255), RgbColor::gray(40)],
        )
        .unwrap();
        pm.set_colormap(Some(cmap.clone())).unwrap();
        pm.set_pixel(1, 0, 2).unwrap();
        pm.set_pixel(2, 0, 1).unwrap();
        let pix: Pix = pm.into();

        let kept = pix.convert_2_to_8([0; 4], true).unwrap();
        assert_eq!(kept.colormap().unwrap().colors(), cmap.colors());
        assert_eq!(kept.get_pixel(1, 0), Some(2));

        let gray = pix.convert_2_to_8([0; 4], false).unwrap();
        assert!(!gray.has_colormap());
        assert_eq!(gray.get_pixel(0, 0), Some(63));
        assert_eq!(gray.get_pixel(1, 0), Some(40));
    }

    #[test]
    fn test_convert_4_to_8() {
        let mut pm = PixMut::new(17, 1, PixelDepth::Bit4).unwrap();
        for x in 0..17 {
            pm.set_pixel(x, 0, x % 16).unwrap();
        }
        let pix: Pix = pm.into();
        let direct = pix.convert_4_to_8(false).unwrap();
        let indexed = pix.convert_4_to_8(true).unwrap();
        assert_eq!(direct.get_pixel(15, 0), Some(0xff));
        assert_eq!(direct.get_pixel(16, 0), Some(0));
        assert_eq!(direct.get_pixel(10, 0), Some(0xaa));
        assert_eq!(indexed.get_pixel(10, 0), Some(10));
        assert_eq!(indexed.colormap().unwrap().get_rgb(10), Some((170, 170, 170)));
    }

    #[test]
    fn test_16_to_8() {
        let mut pm = PixMut::new(3, 1, PixelDepth::Bit16).unwrap();
        pm.set_pixel(0, 0, 0xabcd).unwrap();
        pm.set_pixel(2, 0, 0x00ff).unwrap();
        let pix: Pix = pm.into();
        let msb = pix.convert_16_to_8(Convert16To8Type::MsByte).unwrap();
        let lsb = pix.convert_16_to_8(Convert16To8Type::LsByte).unwrap();
        assert_eq!(msb.get_pixel(0, 0), Some(0xab));
        assert_eq!(lsb.get_pixel(0, 0), Some(0xcd));
        assert_eq!(msb.get_pixel(2, 0), Some(0));
        assert_eq!(lsb.get_pixel(2, 0), Some(0xff));
    }

    #[test]
    fn test_8_to_16_replication() {
        let mut pm = PixMut::new(3, 1, PixelDepth::Bit8).unwrap();
        pm.set_pixel(0, 0, 0xff).unwrap();
        pm.set_pixel(1, 0, 0x80).unwrap();
        let pix: Pix = pm.into();
        let out = pix.convert_8_to_16(8).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(0xffff));
        assert_eq!(out.get_pixel(1, 0), Some(0x8080));
        assert_eq!(out.get_pixel(2, 0), Some(0));
        let out = pix.convert_8_to_16(4).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(0x0ff0));
        assert!(pix.convert_8_to_16(9).is_err());
    }

    #[test]
    fn test_8_to_32() {
        let mut pm = PixMut::new(2, 1, PixelDepth::Bit8).unwrap();
        pm.set_pixel(1, 0, 0x5a).unwrap();
        let pix: Pix = pm.into();
        let out = pix.convert_8_to_32().unwrap();
        assert_eq!(out.get_pixel(1, 0), Some(0x5a5a_5a00));
        assert_eq!(out.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_lossless_every_path() {
        for ds in [PixelDepth::Bit1, PixelDepth::Bit2, PixelDepth::Bit4, PixelDepth::Bit8] {
            let mut pm = PixMut::new(19, 2, ds).unwrap();
            for x in 0..19 {
                pm.set_pixel(x, 1, (x * 5) & ds.max_value()).unwrap();
            }
            let pix: Pix = pm.into();
            for dd in [PixelDepth::Bit2, PixelDepth::Bit4, PixelDepth::Bit8] {
                let res = pix.convert_lossless(dd);
                if dd < ds {
                    assert!(matches!(res, Err(Error::DepthNarrowing { .. })));
                    continue;
                }
                let out = res.unwrap();
                assert_eq!(out.depth(), dd);
                for x in 0..19 {
                    assert_eq!(out.get_pixel(x, 1), pix.get_pixel(x, 1), "{ds} -> {dd}");
                }
            }
        }
    }

    #[test]
    fn test_lossless_4_to_8_reads_nibbles() {
        let mut pm = PixMut::new(2, 1, PixelDepth::Bit4).unwrap();
        pm.set_pixel(0, 0, 0xd).unwrap();
        pm.set_pixel(1, 0, 0x6).unwrap();
        let out = Pix::from(pm).convert_lossless(PixelDepth::Bit8).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(0xd));
        assert_eq!(out.get_pixel(1, 0), Some(0x6));
    }

    #[test]
    fn test_lossless_rejects() {
        let mut pm = PixMut::new(2, 2, PixelDepth::Bit2).unwrap();
        pm.set_colormap(Some(PixColormap::create_linear(2, 4).unwrap()))
            .unwrap();
        let pix: Pix = pm.into();
        assert!(matches!(
            pix.convert_lossless(PixelDepth::Bit8),
            Err(Error::ColormapPresent)
        ));
        let pix = Pix::new(2, 2, PixelDepth::Bit2).unwrap();
        assert!(pix.convert_lossless(PixelDepth::Bit16).is_err());
        assert!(pix.convert_lossless(PixelDepth::Bit1).is_err());
    }
}
