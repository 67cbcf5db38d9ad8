//! PIX - The raster container
//!
//! `Pix` holds a width x height grid of pixels at one of the depths
//! 1, 2, 4, 8, 16 or 32 bpp, plus an optional colormap.
//!
//! # Pixel layout
//!
//! - Image data is stored in 32-bit words
//! - Every row starts on a 32-bit boundary
//! - Pixels are packed MSB to LSB within each word
//! - For 32-bit images the byte order is R, G, B, unused (red in MSB)
//!
//! # Ownership model
//!
//! `Pix` is a reference-counted, immutable handle. [`Pix::share`] hands out
//! another view of the same buffer; [`Pix::duplicate`] makes an independent
//! copy. To modify pixel data, convert to `PixMut` via [`Pix::try_into_mut`]
//! or [`Pix::to_mut`], then convert back with `Into<Pix>`.

mod access;
pub mod convert;
mod histogram;
mod ops;

pub use access::*;

use crate::colormap::PixColormap;
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Pixel depth (bits per pixel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum PixelDepth {
    /// 1-bit binary image
    Bit1 = 1,
    /// 2-bit image (4 levels)
    Bit2 = 2,
    /// 4-bit image (16 levels)
    Bit4 = 4,
    /// 8-bit grayscale or indexed color
    Bit8 = 8,
    /// 16-bit grayscale
    Bit16 = 16,
    /// 32-bit RGB
    Bit32 = 32,
}

impl PixelDepth {
    /// Create `PixelDepth` from a raw bit count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDepth`] if `bits` is not 1, 2, 4, 8, 16, or 32.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            1 => Ok(PixelDepth::Bit1),
            2 => Ok(PixelDepth::Bit2),
            4 => Ok(PixelDepth::Bit4),
            8 => Ok(PixelDepth::Bit8),
            16 => Ok(PixelDepth::Bit16),
            32 => Ok(PixelDepth::Bit32),
            _ => Err(Error::InvalidDepth(bits)),
        }
    }

    /// Get the number of bits per pixel.
    #[inline]
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Check if a colormap is allowed for this depth.
    ///
    /// Colormaps are supported for 1, 2, 4, and 8 bpp images only.
    pub fn colormap_allowed(self) -> bool {
        matches!(
            self,
            PixelDepth::Bit1 | PixelDepth::Bit2 | PixelDepth::Bit4 | PixelDepth::Bit8
        )
    }

    /// Get the maximum pixel value representable at this depth.
    pub fn max_value(self) -> u32 {
        match self {
            PixelDepth::Bit32 => u32::MAX,
            _ => (1u32 << self.bits()) - 1,
        }
    }

    /// Number of pixels packed into one 32-bit word.
    #[inline]
    pub fn pixels_per_word(self) -> u32 {
        32 / self.bits()
    }
}

impl fmt::Display for PixelDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpp", self.bits())
    }
}

/// Storage format of a raster: depth plus colormap presence.
///
/// This is the key the conversion layer dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixFormat {
    pub depth: PixelDepth,
    pub has_colormap: bool,
}

impl PixFormat {
    pub const fn new(depth: PixelDepth, has_colormap: bool) -> Self {
        Self {
            depth,
            has_colormap,
        }
    }

    /// Colormap-free format at `depth`.
    pub const fn direct(depth: PixelDepth) -> Self {
        Self::new(depth, false)
    }

    /// Colormapped format at `depth`.
    pub const fn indexed(depth: PixelDepth) -> Self {
        Self::new(depth, true)
    }
}

impl fmt::Display for PixFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_colormap {
            write!(f, "{} (colormapped)", self.depth)
        } else {
            write!(f, "{}", self.depth)
        }
    }
}

/// Internal PIX data
#[derive(Debug, Clone)]
struct PixData {
    width: u32,
    height: u32,
    depth: PixelDepth,
    /// 32-bit words per line
    wpl: u32,
    /// X resolution (ppi), 0 if unknown
    xres: i32,
    /// Y resolution (ppi), 0 if unknown
    yres: i32,
    colormap: Option<PixColormap>,
    data: Vec<u32>,
}

/// Allocate a zeroed pixel buffer, reporting failure instead of aborting.
fn alloc_data(wpl: u32, height: u32) -> Result<Vec<u32>> {
    let size = (wpl as usize)
        .checked_mul(height as usize)
        .ok_or(Error::AllocationFailed)?;
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| Error::AllocationFailed)?;
    data.resize(size, 0);
    Ok(data)
}

/// PIX - Raster container
///
/// # Examples
///
/// ```
/// use pixconv_core::{Pix, PixelDepth};
///
/// let pix = Pix::new(640, 480, PixelDepth::Bit8).unwrap();
/// assert_eq!(pix.width(), 640);
/// assert_eq!(pix.height(), 480);
/// assert_eq!(pix.wpl(), 160);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a new PIX with the specified dimensions and depth.
    ///
    /// The image data is initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0, and
    /// [`Error::AllocationFailed`] if the buffer cannot be reserved.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let wpl = Self::compute_wpl(width, depth)?;
        let data = alloc_data(wpl, height)?;

        Ok(Pix {
            inner: Arc::new(PixData {
                width,
                height,
                depth,
                wpl,
                xres: 0,
                yres: 0,
                colormap: None,
                data,
            }),
        })
    }

    /// Compute words per line for given width and depth.
    #[inline]
    fn compute_wpl(width: u32, depth: PixelDepth) -> Result<u32> {
        let bits_per_line = u64::from(width) * u64::from(depth.bits());
        u32::try_from(bits_per_line.div_ceil(32)).map_err(|_| Error::AllocationFailed)
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get the words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Get the X resolution (ppi).
    #[inline]
    pub fn xres(&self) -> i32 {
        self.inner.xres
    }

    /// Get the Y resolution (ppi).
    #[inline]
    pub fn yres(&self) -> i32 {
        self.inner.yres
    }

    /// Get the storage format descriptor.
    #[inline]
    pub fn format(&self) -> PixFormat {
        PixFormat::new(self.inner.depth, self.inner.colormap.is_some())
    }

    /// Check whether this image has a colormap attached.
    #[inline]
    pub fn has_colormap(&self) -> bool {
        self.inner.colormap.is_some()
    }

    /// Get a reference to the image's colormap, if present.
    #[inline]
    pub fn colormap(&self) -> Option<&PixColormap> {
        self.inner.colormap.as_ref()
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get the number of handles sharing this buffer.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Get the words of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = y as usize * self.inner.wpl as usize;
        let end = start + self.inner.wpl as usize;
        &self.inner.data[start..end]
    }

    /// Another handle on the same buffer. No pixel data is copied.
    #[inline]
    pub fn share(&self) -> Pix {
        Pix {
            inner: Arc::clone(&self.inner),
        }
    }

    /// An independent copy of this image, including its colormap and
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the buffer cannot be reserved.
    pub fn duplicate(&self) -> Result<Pix> {
        Ok(self.to_mut()?.into())
    }

    /// Create a zeroed PIX with the same dimensions, depth, resolution and
    /// colormap as the source.
    pub fn create_template(&self) -> Result<Pix> {
        let data = alloc_data(self.inner.wpl, self.inner.height)?;
        Ok(Pix {
            inner: Arc::new(PixData {
                data,
                ..self.metadata()
            }),
        })
    }

    /// Check if two PIX have the same width, height, and depth.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.inner.width == other.inner.width
            && self.inner.height == other.inner.height
            && self.inner.depth == other.inner.depth
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one handle on the buffer.
    pub fn try_into_mut(self) -> std::result::Result<PixMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(PixMut { inner: data }),
            Err(arc) => Err(Pix { inner: arc }),
        }
    }

    /// Create a mutable copy of this PIX.
    pub fn to_mut(&self) -> Result<PixMut> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.inner.data.len())
            .map_err(|_| Error::AllocationFailed)?;
        data.extend_from_slice(&self.inner.data);
        Ok(PixMut {
            inner: PixData {
                data,
                ..self.metadata()
            },
        })
    }

    /// Mutable access without copying when this is the only handle,
    /// otherwise a mutable copy.
    pub fn into_mut(self) -> Result<PixMut> {
        match self.try_into_mut() {
            Ok(pm) => Ok(pm),
            Err(shared) => shared.to_mut(),
        }
    }

    fn metadata(&self) -> PixData {
        PixData {
            width: self.inner.width,
            height: self.inner.height,
            depth: self.inner.depth,
            wpl: self.inner.wpl,
            xres: self.inner.xres,
            yres: self.inner.yres,
            colormap: self.inner.colormap.clone(),
            data: Vec::new(),
        }
    }
}

/// Mutable PIX
///
/// Exclusive owner of a pixel buffer. Convert back to an immutable
/// [`Pix`] using `Into<Pix>`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Create a new zeroed, exclusively owned PIX.
    ///
    /// # Errors
    ///
    /// Same as [`Pix::new`].
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Pix::new(width, height, depth)?.into_mut()
    }

    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Get the X resolution (ppi).
    #[inline]
    pub fn xres(&self) -> i32 {
        self.inner.xres
    }

    /// Get the Y resolution (ppi).
    #[inline]
    pub fn yres(&self) -> i32 {
        self.inner.yres
    }

    /// Get the storage format descriptor.
    #[inline]
    pub fn format(&self) -> PixFormat {
        PixFormat::new(self.inner.depth, self.inner.colormap.is_some())
    }

    /// Set both resolutions.
    pub fn set_resolution(&mut self, xres: i32, yres: i32) {
        self.inner.xres = xres;
        self.inner.yres = yres;
    }

    /// Copy resolution (xres, yres) from another PIX.
    pub fn copy_resolution_from(&mut self, src: &Pix) {
        self.inner.xres = src.inner.xres;
        self.inner.yres = src.inner.yres;
    }

    /// Get raw access to the image data.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get mutable access to the image data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    /// Get the words of row `y`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = y as usize * self.inner.wpl as usize;
        let end = start + self.inner.wpl as usize;
        &self.inner.data[start..end]
    }

    /// Get mutable access to row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let start = y as usize * self.inner.wpl as usize;
        let end = start + self.inner.wpl as usize;
        &mut self.inner.data[start..end]
    }

    /// Check whether this image has a colormap attached.
    #[inline]
    pub fn has_colormap(&self) -> bool {
        self.inner.colormap.is_some()
    }

    /// Get a reference to the image's colormap, if present.
    #[inline]
    pub fn colormap(&self) -> Option<&PixColormap> {
        self.inner.colormap.as_ref()
    }

    /// Get mutable access to the colormap entries, if present.
    #[inline]
    pub fn colormap_mut(&mut self) -> Option<&mut PixColormap> {
        self.inner.colormap.as_mut()
    }

    /// Set or remove the colormap.
    ///
    /// # Errors
    ///
    /// - [`Error::ColormapNotAllowed`] for 16 and 32 bpp images
    /// - [`Error::InvalidParameter`] if the colormap depth differs from the
    ///   image depth
    /// - [`Error::ColormapFull`] if the colormap holds more than 2^depth
    ///   entries
    pub fn set_colormap(&mut self, cmap: Option<PixColormap>) -> Result<()> {
        if let Some(ref cm) = cmap {
            let depth = self.inner.depth;
            if !depth.colormap_allowed() {
                return Err(Error::ColormapNotAllowed(depth.bits()));
            }
            if cm.depth() != depth.bits() {
                return Err(Error::InvalidParameter(format!(
                    "colormap depth {} does not match image depth {}",
                    cm.depth(),
                    depth.bits()
                )));
            }
            if cm.len() > cm.max_entries() {
                return Err(Error::ColormapFull {
                    capacity: cm.max_entries(),
                });
            }
        }
        self.inner.colormap = cmap;
        Ok(())
    }

    /// Detach and return the colormap, leaving the image colormap-free.
    pub fn take_colormap(&mut self) -> Option<PixColormap> {
        self.inner.colormap.take()
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_depth() {
        assert_eq!(PixelDepth::from_bits(1).unwrap(), PixelDepth::Bit1);
        assert_eq!(PixelDepth::from_bits(8).unwrap(), PixelDepth::Bit8);
        assert_eq!(PixelDepth::from_bits(32).unwrap(), PixelDepth::Bit32);
        assert!(PixelDepth::from_bits(3).is_err());

        assert_eq!(PixelDepth::Bit8.bits(), 8);
        assert_eq!(PixelDepth::Bit8.max_value(), 255);
        assert_eq!(PixelDepth::Bit4.pixels_per_word(), 8);
        assert!(PixelDepth::Bit8.colormap_allowed());
        assert!(!PixelDepth::Bit32.colormap_allowed());
    }

    #[test]
    fn test_pix_creation() {
        let pix = Pix::new(100, 200, PixelDepth::Bit8).unwrap();
        assert_eq!(pix.width(), 100);
        assert_eq!(pix.height(), 200);
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        // 100 * 8 = 800 bits = 25 words
        assert_eq!(pix.wpl(), 25);
        assert_eq!(pix.format(), PixFormat::direct(PixelDepth::Bit8));
    }

    #[test]
    fn test_pix_creation_invalid() {
        assert!(matches!(
            Pix::new(0, 100, PixelDepth::Bit8),
            Err(Error::InvalidDimension { .. })
        ));
        assert!(Pix::new(100, 0, PixelDepth::Bit8).is_err());
    }

    #[test]
    fn test_wpl_calculation() {
        let pix = Pix::new(32, 1, PixelDepth::Bit1).unwrap();
        assert_eq!(pix.wpl(), 1);
        let pix = Pix::new(33, 1, PixelDepth::Bit1).unwrap();
        assert_eq!(pix.wpl(), 2);
        let pix = Pix::new(3, 1, PixelDepth::Bit16).unwrap();
        assert_eq!(pix.wpl(), 2);
        let pix = Pix::new(10, 1, PixelDepth::Bit32).unwrap();
        assert_eq!(pix.wpl(), 10);
    }

    #[test]
    fn test_row_offsets_cover_buffer() {
        let mut pm = PixMut::new(33, 300, PixelDepth::Bit16).unwrap();
        pm.set_pixel(32, 299, 0xbeef).unwrap();
        let last = pm.row_data_mut(299).as_ptr() as usize;
        let first = pm.row_data_mut(0).as_ptr() as usize;
        assert_eq!((last - first) / 4, 299 * 17);
        let pix: Pix = pm.into();
        assert_eq!(pix.row_data(299).len(), 17);
        assert_eq!(pix.row_data(299)[16] >> 16, 0xbeef);
    }

    #[test]
    fn test_share_vs_duplicate() {
        let pix = Pix::new(16, 16, PixelDepth::Bit8).unwrap();
        let view = pix.share();
        assert_eq!(pix.ref_count(), 2);
        assert_eq!(pix.data().as_ptr(), view.data().as_ptr());

        let copy = pix.duplicate().unwrap();
        assert_eq!(copy.ref_count(), 1);
        assert_ne!(pix.data().as_ptr(), copy.data().as_ptr());
        assert_eq!(pix.data(), copy.data());
    }

    #[test]
    fn test_try_into_mut_requires_unique_handle() {
        let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
        let view = pix.share();
        let pix = pix.try_into_mut().unwrap_err();
        drop(view);
        let mut pm = pix.try_into_mut().unwrap();
        pm.set_resolution(300, 150);
        let pix: Pix = pm.into();
        assert_eq!((pix.xres(), pix.yres()), (300, 150));
    }

    #[test]
    fn test_create_template_keeps_metadata() {
        let mut pm = Pix::new(20, 10, PixelDepth::Bit8).unwrap().to_mut().unwrap();
        pm.set_resolution(72, 96);
        pm.set_colormap(Some(PixColormap::create_linear(8, 256).unwrap()))
            .unwrap();
        pm.set_pixel(5, 5, 42).unwrap();
        let src: Pix = pm.into();

        let tmpl = src.create_template().unwrap();
        assert!(tmpl.sizes_equal(&src));
        assert_eq!((tmpl.xres(), tmpl.yres()), (72, 96));
        assert_eq!(tmpl.colormap().map(|c| c.len()), Some(256));
        assert!(tmpl.data().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_set_colormap_validation() {
        let mut pm = Pix::new(4, 4, PixelDepth::Bit32).unwrap().to_mut().unwrap();
        let cmap = PixColormap::create_linear(8, 2).unwrap();
        assert!(matches!(
            pm.set_colormap(Some(cmap)),
            Err(Error::ColormapNotAllowed(32))
        ));

        let mut pm = Pix::new(4, 4, PixelDepth::Bit2).unwrap().to_mut().unwrap();
        let cmap = PixColormap::create_linear(8, 2).unwrap();
        assert!(pm.set_colormap(Some(cmap)).is_err());
        let cmap = PixColormap::create_linear(2, 4).unwrap();
        pm.set_colormap(Some(cmap)).unwrap();
        assert_eq!(pm.format(), PixFormat::indexed(PixelDepth::Bit2));
        assert!(pm.take_colormap().is_some());
        assert!(!pm.has_colormap());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(PixFormat::indexed(PixelDepth::Bit4).to_string(), "4 bpp (colormapped)");
        assert_eq!(PixFormat::direct(PixelDepth::Bit32).to_string(), "32 bpp");
    }
}
