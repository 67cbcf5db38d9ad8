//! Colormap removal regression test
//!
//! Removes colormaps to binary, gray and full color and checks the
//! per-entry reductions, the binary polarity rule and the handling of
//! pixel values that index past the end of the colormap.

use pixconv_core::{Pix, PixColormap, PixMut, PixelDepth, RemoveColormapTarget, RgbColor, color};
use pixconv_test::RegParams;

const CUBE_CORNERS: [RgbColor; 8] = [
    RgbColor::new(0, 0, 0),
    RgbColor::new(255, 0, 0),
    RgbColor::new(0, 255, 0),
    RgbColor::new(0, 0, 255),
    RgbColor::new(255, 255, 0),
    RgbColor::new(0, 255, 255),
    RgbColor::new(255, 0, 255),
    RgbColor::new(255, 255, 255),
];

/// One pixel per value in `vals`, laid out on a single row.
fn indexed_row(depth: PixelDepth, colors: &[RgbColor], vals: &[u32]) -> Pix {
    let mut pm = PixMut::new(vals.len() as u32, 1, depth).unwrap();
    pm.set_colormap(Some(PixColormap::from_colors(depth.bits(), colors).unwrap()))
        .unwrap();
    for (x, &v) in vals.iter().enumerate() {
        pm.set_pixel(x as u32, 0, v).unwrap();
    }
    pm.into()
}

fn row(pix: &Pix) -> Vec<u32> {
    (0..pix.width()).map(|x| pix.get_pixel(x, 0).unwrap()).collect()
}

#[test]
fn colormap_removal_reg_gray() {
    let mut rp = RegParams::new("colormap_removal_gray");

    let pix = indexed_row(PixelDepth::Bit4, &CUBE_CORNERS, &[0, 1, 2, 3, 4, 5, 6, 7]);
    let gray = pix.remove_colormap(RemoveColormapTarget::ToGrayscale).unwrap();
    rp.compare_values(8.0, gray.depth().bits() as f64, 0.0);
    rp.compare_values(0.0, gray.has_colormap() as u32 as f64, 0.0);

    // (R + 2G + B) / 4, truncated
    let expected = [0u32, 63, 127, 63, 191, 191, 127, 255];
    for (x, (&want, got)) in expected.iter().zip(row(&gray)).enumerate() {
        if !rp.compare_values(want as f64, got as f64, 0.0) {
            eprintln!("corner {x}: {:?}", CUBE_CORNERS[x]);
        }
    }

    // Same reduction at 8 bpp, across a word boundary
    let vals: Vec<u32> = (0..11).map(|x| x % 8).collect();
    let pix = indexed_row(PixelDepth::Bit8, &CUBE_CORNERS, &vals);
    let gray = pix.remove_colormap(RemoveColormapTarget::ToGrayscale).unwrap();
    for (x, got) in row(&gray).into_iter().enumerate() {
        rp.compare_values(expected[x % 8] as f64, got as f64, 0.0);
    }

    assert!(rp.cleanup(), "colormap_removal gray tests failed");
}

#[test]
fn colormap_removal_reg_full_color() {
    let mut rp = RegParams::new("colormap_removal_full_color");

    let pix = indexed_row(PixelDepth::Bit4, &CUBE_CORNERS, &[7, 1, 2, 3]);
    let rgb = pix.remove_colormap(RemoveColormapTarget::ToFullColor).unwrap();
    rp.compare_values(32.0, rgb.depth().bits() as f64, 0.0);
    for (x, &idx) in [7usize, 1, 2, 3].iter().enumerate() {
        let c = CUBE_CORNERS[idx];
        let want = color::compose_rgb(c.red, c.green, c.blue);
        rp.compare_values(want as f64, rgb.get_pixel(x as u32, 0).unwrap() as f64, 0.0);
    }

    // Values past the last entry come out black
    let colors = [RgbColor::new(10, 20, 30), RgbColor::new(40, 50, 60)];
    let pix = indexed_row(PixelDepth::Bit2, &colors, &[1, 3, 0, 2]);
    let rgb = pix.remove_colormap(RemoveColormapTarget::ToFullColor).unwrap();
    let expected = [color::compose_rgb(40, 50, 60), 0, color::compose_rgb(10, 20, 30), 0];
    for (want, got) in expected.into_iter().zip(row(&rgb)) {
        rp.compare_values(want as f64, got as f64, 0.0);
    }

    assert!(rp.cleanup(), "colormap_removal full color tests failed");
}

#[test]
fn colormap_removal_reg_binary() {
    let mut rp = RegParams::new("colormap_removal_binary");
    let bits = [0u32, 1, 1, 0, 1];

    // Entry 0 black: bits are inverted so that 1 means black
    let pix = indexed_row(PixelDepth::Bit1, &[RgbColor::BLACK, RgbColor::WHITE], &bits);
    let bin = pix.remove_colormap(RemoveColormapTarget::ToBinary).unwrap();
    rp.compare_values(1.0, bin.depth().bits() as f64, 0.0);
    rp.compare_values(0.0, bin.has_colormap() as u32 as f64, 0.0);
    let inverted: Vec<u32> = bits.iter().map(|b| 1 - b).collect();
    rp.compare_strings(
        &row(&bin).iter().map(|&v| v as u8).collect::<Vec<_>>(),
        &inverted.iter().map(|&v| v as u8).collect::<Vec<_>>(),
    );

    // Entry 0 white: bits are kept
    let pix = indexed_row(PixelDepth::Bit1, &[RgbColor::WHITE, RgbColor::BLACK], &bits);
    let bin = pix.remove_colormap(RemoveColormapTarget::ToBinary).unwrap();
    let kept: Vec<u8> = row(&bin).iter().map(|&v| v as u8).collect();
    rp.compare_strings(&kept, &bits.map(|b| b as u8));

    // Based on source: gray 1 bpp goes binary, colored goes full color
    let pix = indexed_row(PixelDepth::Bit1, &[RgbColor::WHITE, RgbColor::BLACK], &bits);
    let out = pix.remove_colormap(RemoveColormapTarget::BasedOnSource).unwrap();
    rp.compare_values(1.0, out.depth().bits() as f64, 0.0);
    let pix = indexed_row(PixelDepth::Bit1, &[RgbColor::WHITE, RgbColor::new(255, 0, 0)], &bits);
    let out = pix.remove_colormap(RemoveColormapTarget::BasedOnSource).unwrap();
    rp.compare_values(32.0, out.depth().bits() as f64, 0.0);

    // Binary on a deeper image falls back to source-based removal
    let gray = PixColormap::create_linear(2, 4).unwrap();
    let mut pm = PixMut::new(3, 1, PixelDepth::Bit2).unwrap();
    pm.set_colormap(Some(gray)).unwrap();
    let out = Pix::from(pm).remove_colormap(RemoveColormapTarget::ToBinary).unwrap();
    rp.compare_values(8.0, out.depth().bits() as f64, 0.0);

    assert!(rp.cleanup(), "colormap_removal binary tests failed");
}

#[test]
fn colormap_removal_reg_no_colormap() {
    let mut rp = RegParams::new("colormap_removal_no_colormap");

    let mut pm = PixMut::new(6, 2, PixelDepth::Bit8).unwrap();
    pm.set_pixel(5, 1, 99).unwrap();
    let pix: Pix = pm.into();
    for target in [
        RemoveColormapTarget::ToBinary,
        RemoveColormapTarget::ToGrayscale,
        RemoveColormapTarget::ToFullColor,
        RemoveColormapTarget::BasedOnSource,
    ] {
        let out = pix.remove_colormap(target).unwrap();
        rp.compare_pix(&pix, &out);
    }

    assert!(rp.cleanup(), "colormap_removal no-colormap tests failed");
}
