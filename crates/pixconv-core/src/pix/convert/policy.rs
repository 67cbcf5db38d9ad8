//! Routing table for the `convert_to_*` entry points
//!
//! [`plan`] maps a requested [`Target`] and a source [`PixFormat`] to the
//! ordered engine [`Step`]s that realize it. The table is pure data so it
//! can be read and tested without touching pixels; [`super::dispatch`]
//! executes the steps.

use super::RemoveColormapTarget;
use crate::error::{Error, Result};
use crate::pix::{PixFormat, PixelDepth};

/// Representative gray values for 2 bpp widening.
pub const DIBIT_GRAYS: [u8; 4] = [0, 85, 170, 255];

/// Requested output representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// 1 bpp; gray sources are binarized at `threshold`
    Binary { threshold: u32 },
    /// 8 bpp, indexed through a gray colormap if `with_colormap`
    Gray8 { with_colormap: bool },
    /// 16 bpp gray
    Gray16,
    /// 32 bpp RGB
    Rgb32,
    /// 8 bpp gray or 32 bpp RGB, whichever loses nothing; never colormapped
    Gray8OrRgb32 { copy: bool },
    /// 1, 8 or 32 bpp without a colormap, as a PostScript wrapper expects
    PsWrap,
}

/// One engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Shared view of the input
    Share,
    /// Independent copy of the input
    Copy,
    /// [`crate::Pix::remove_colormap`] with a fixed target
    RemoveColormap(RemoveColormapTarget),
    /// Gray if the palette has no color, full color otherwise; never binary
    RemoveColormapMultilevel,
    /// Drop a 1 bpp colormap, inverting when entry 1 is brighter than entry 0
    StripBinaryColormap,
    /// Copy and attach a 256-level gray colormap
    AddGrayColormap,
    /// 1 bpp expansion with explicit values for bits 0 and 1
    Unpack1 { depth: PixelDepth, val0: u32, val1: u32 },
    /// 1 bpp to 8 bpp keeping bit values as indices; the source colormap is
    /// carried, or a white/black one attached
    Unpack1To8Indexed,
    Widen2To8 { vals: [u8; 4], with_colormap: bool },
    Widen4To8 { with_colormap: bool },
    /// Keep the most significant byte of each 16 bpp sample
    Narrow16To8,
    Widen8To16 { left_shift: u32 },
    Widen8To32,
    /// Default-weighted RGB to gray
    RgbToGray,
    /// 8 bpp gray to 1 bpp: value below threshold becomes 1
    Threshold(u32),
}

/// Steps realizing `target` for a source of format `src`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedDepth`] when `target` can't be reached from
/// `src` (only [`Target::Gray16`] is partial: it accepts 1 and 8 bpp).
pub fn plan(target: Target, src: PixFormat) -> Result<Vec<Step>> {
    use PixelDepth::*;

    let PixFormat { depth, has_colormap: cmap } = src;
    let steps = match target {
        Target::Binary { threshold } => match (depth, cmap) {
            (Bit1, false) => vec![Step::Copy],
            (Bit1, true) => vec![Step::StripBinaryColormap],
            _ => {
                let mut steps = plan(Target::Gray8 { with_colormap: false }, src)?;
                steps.retain(|&s| s != Step::Copy);
                steps.push(Step::Threshold(threshold));
                steps
            }
        },

        Target::Gray8 { with_colormap } => match (depth, cmap, with_colormap) {
            (Bit1, _, true) => vec![Step::Unpack1To8Indexed],
            (Bit1, true, false) => {
                vec![Step::RemoveColormap(RemoveColormapTarget::ToGrayscale)]
            }
            (Bit1, false, false) => vec![Step::Unpack1 { depth: Bit8, val0: 255, val1: 0 }],
            (Bit2, ..) => vec![Step::Widen2To8 { vals: DIBIT_GRAYS, with_colormap }],
            (Bit4, ..) => vec![Step::Widen4To8 { with_colormap }],
            (Bit8, true, true) | (Bit8, false, false) => vec![Step::Copy],
            (Bit8, true, false) => {
                vec![Step::RemoveColormap(RemoveColormapTarget::ToGrayscale)]
            }
            (Bit8, false, true) => vec![Step::AddGrayColormap],
            (Bit16, ..) => with_gray_colormap(vec![Step::Narrow16To8], with_colormap),
            (Bit32, ..) => with_gray_colormap(vec![Step::RgbToGray], with_colormap),
        },

        Target::Gray16 => match (depth, cmap) {
            (Bit1, false) => vec![Step::Unpack1 { depth: Bit16, val0: 0xffff, val1: 0 }],
            (Bit1, true) => vec![
                Step::RemoveColormap(RemoveColormapTarget::ToGrayscale),
                Step::Widen8To16 { left_shift: 8 },
            ],
            (Bit8, _) => vec![Step::Widen8To16 { left_shift: 8 }],
            _ => return Err(Error::UnsupportedDepth(depth.bits())),
        },

        Target::Rgb32 => match (depth, cmap) {
            (Bit1, false) => vec![Step::Unpack1 { depth: Bit32, val0: 0xffff_ffff, val1: 0 }],
            (Bit1, true) => vec![Step::RemoveColormap(RemoveColormapTarget::ToFullColor)],
            (Bit2, _) => vec![
                Step::Widen2To8 { vals: DIBIT_GRAYS, with_colormap: true },
                Step::Widen8To32,
            ],
            (Bit4, _) => vec![Step::Widen4To8 { with_colormap: true }, Step::Widen8To32],
            (Bit8, _) => vec![Step::Widen8To32],
            (Bit16, _) => vec![Step::Narrow16To8, Step::Widen8To32],
            (Bit32, _) => vec![Step::Copy],
        },

        Target::Gray8OrRgb32 { copy } => match (depth, cmap) {
            (_, true) => vec![Step::RemoveColormapMultilevel],
            (Bit8 | Bit32, false) => vec![if copy { Step::Copy } else { Step::Share }],
            _ => plan(Target::Gray8 { with_colormap: false }, src)?,
        },

        Target::PsWrap => match (depth, cmap) {
            (Bit1 | Bit32, _) => vec![Step::Share],
            (Bit2 | Bit4 | Bit8, true) => {
                vec![Step::RemoveColormap(RemoveColormapTarget::BasedOnSource)]
            }
            (Bit2, false) => vec![Step::Widen2To8 { vals: DIBIT_GRAYS, with_colormap: false }],
            (Bit4, false) => vec![Step::Widen4To8 { with_colormap: false }],
            (Bit8, false) => vec![Step::Share],
            (Bit16, _) => vec![Step::Narrow16To8],
        },
    };
    Ok(steps)
}

fn with_gray_colormap(mut steps: Vec<Step>, with_colormap: bool) -> Vec<Step> {
    if with_colormap {
        steps.push(Step::AddGrayColormap);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use PixelDepth::*;

    const ALL: [PixelDepth; 6] = [Bit1, Bit2, Bit4, Bit8, Bit16, Bit32];

    fn formats() -> Vec<PixFormat> {
        ALL.iter()
            .flat_map(|&d| {
                let mut v = vec![PixFormat::direct(d)];
                if d.colormap_allowed() {
                    v.push(PixFormat::indexed(d));
                }
                v
            })
            .collect()
    }

    #[test]
    fn test_every_format_reaches_gray8_rgb32_and_binary() {
        for fmt in formats() {
            for target in [
                Target::Gray8 { with_colormap: false },
                Target::Gray8 { with_colormap: true },
                Target::Rgb32,
                Target::Binary { threshold: 128 },
                Target::Gray8OrRgb32 { copy: false },
                Target::PsWrap,
            ] {
                let steps = plan(target, fmt).unwrap();
                assert!(!steps.is_empty(), "{target:?} from {fmt}");
            }
        }
    }

    #[test]
    fn test_gray16_only_from_1_and_8() {
        assert!(plan(Target::Gray16, PixFormat::direct(Bit1)).is_ok());
        assert!(plan(Target::Gray16, PixFormat::indexed(Bit8)).is_ok());
        for d in [Bit2, Bit4, Bit16, Bit32] {
            assert!(matches!(
                plan(Target::Gray16, PixFormat::direct(d)),
                Err(Error::UnsupportedDepth(_))
            ));
        }
    }

    #[test]
    fn test_gray8_table() {
        let g8 = |d, cmap, with_colormap| {
            let fmt = if cmap { PixFormat::indexed(d) } else { PixFormat::direct(d) };
            plan(Target::Gray8 { with_colormap }, fmt).unwrap()
        };
        assert_eq!(
            g8(Bit1, false, false),
            vec![Step::Unpack1 { depth: Bit8, val0: 255, val1: 0 }]
        );
        assert_eq!(g8(Bit1, false, true), vec![Step::Unpack1To8Indexed]);
        assert_eq!(g8(Bit8, false, false), vec![Step::Copy]);
        assert_eq!(g8(Bit8, true, true), vec![Step::Copy]);
        assert_eq!(g8(Bit8, false, true), vec![Step::AddGrayColormap]);
        assert_eq!(
            g8(Bit8, true, false),
            vec![Step::RemoveColormap(RemoveColormapTarget::ToGrayscale)]
        );
        assert_eq!(g8(Bit16, false, false), vec![Step::Narrow16To8]);
        assert_eq!(g8(Bit32, false, true), vec![Step::RgbToGray, Step::AddGrayColormap]);
    }

    #[test]
    fn test_binary_goes_through_gray8() {
        assert_eq!(
            plan(Target::Binary { threshold: 9 }, PixFormat::direct(Bit1)).unwrap(),
            vec![Step::Copy]
        );
        assert_eq!(
            plan(Target::Binary { threshold: 9 }, PixFormat::indexed(Bit1)).unwrap(),
            vec![Step::StripBinaryColormap]
        );
        let steps = plan(Target::Binary { threshold: 9 }, PixFormat::direct(Bit32)).unwrap();
        assert_eq!(steps, vec![Step::RgbToGray, Step::Threshold(9)]);
        let steps = plan(Target::Binary { threshold: 9 }, PixFormat::direct(Bit8)).unwrap();
        assert_eq!(steps, vec![Step::Threshold(9)]);
    }

    #[test]
    fn test_gray8_or_rgb32_never_keeps_colormap() {
        for fmt in formats().into_iter().filter(|f| f.has_colormap) {
            assert_eq!(
                plan(Target::Gray8OrRgb32 { copy: true }, fmt).unwrap(),
                vec![Step::RemoveColormapMultilevel]
            );
        }
        assert_eq!(
            plan(Target::Gray8OrRgb32 { copy: false }, PixFormat::direct(Bit32)).unwrap(),
            vec![Step::Share]
        );
        assert_eq!(
            plan(Target::Gray8OrRgb32 { copy: true }, PixFormat::direct(Bit8)).unwrap(),
            vec![Step::Copy]
        );
    }

    #[test]
    fn test_ps_wrap_table() {
        let ps = |f| plan(Target::PsWrap, f).unwrap();
        assert_eq!(ps(PixFormat::indexed(Bit1)), vec![Step::Share]);
        assert_eq!(ps(PixFormat::direct(Bit32)), vec![Step::Share]);
        assert_eq!(
            ps(PixFormat::direct(Bit2)),
            vec![Step::Widen2To8 { vals: [0, 0x55, 0xaa, 0xff], with_colormap: false }]
        );
        assert_eq!(
            ps(PixFormat::indexed(Bit4)),
            vec![Step::RemoveColormap(RemoveColormapTarget::BasedOnSource)]
        );
        assert_eq!(ps(PixFormat::direct(Bit16)), vec![Step::Narrow16To8]);
    }
}
