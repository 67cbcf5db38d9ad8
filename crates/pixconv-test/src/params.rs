//! Regression test parameters and operations

use crate::error::TestError;
use pixconv_core::Pix;
use tracing::{error, info};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Check results, report failures (default)
    #[default]
    Compare,
    /// Also log every passing check
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("REGTEST_MODE").unwrap_or_default())
    }

    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and recorded failures.
pub struct RegParams {
    /// Name of the test (e.g., "convert")
    pub test_name: String,
    /// Current test index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Recorded failures
    failures: Vec<TestError>,
}

impl RegParams {
    /// Start a regression test, installing test logging.
    pub fn new(test_name: &str) -> Self {
        crate::init_logging();
        let mode = RegTestMode::from_env();
        info!(test = test_name, ?mode, "starting {test_name}_reg");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn record(&mut self, failure: TestError) -> bool {
        error!(test = %self.test_name, "{failure}");
        self.failures.push(failure);
        false
    }

    fn pass(&self, what: &str) -> bool {
        if self.display() {
            info!(test = %self.test_name, index = self.index, "{what} ok");
        }
        true
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        if (expected - actual).abs() > delta {
            return self.record(TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            });
        }
        self.pass("value")
    }

    /// Compare two images for exact equality of size, depth, colormap and
    /// every pixel value.
    pub fn compare_pix(&mut self, pix1: &Pix, pix2: &Pix) -> bool {
        self.index += 1;
        if let Some(reason) = pix_difference(pix1, pix2) {
            return self.record(TestError::PixMismatch {
                index: self.index,
                reason,
            });
        }
        self.pass("pix")
    }

    /// Compare two byte strings
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;
        if data1 != data2 {
            return self.record(TestError::StringMismatch {
                index: self.index,
                len1: data1.len(),
                len2: data2.len(),
            });
        }
        self.pass("string")
    }

    /// Report results
    ///
    /// Returns `true` if every check passed.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            info!(test = %self.test_name, checks = self.index, "SUCCESS: {}_reg", self.test_name);
            return true;
        }
        error!(
            test = %self.test_name,
            failed = self.failures.len(),
            checks = self.index,
            "FAILURE: {}_reg",
            self.test_name
        );
        for failure in &self.failures {
            eprintln!("  {failure}");
        }
        false
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get list of failures
    pub fn failures(&self) -> &[TestError] {
        &self.failures
    }
}

/// First difference found between two images, if any.
fn pix_difference(pix1: &Pix, pix2: &Pix) -> Option<String> {
    if !pix1.sizes_equal(pix2) {
        return Some(format!(
            "size mismatch: {}x{} {} vs {}x{} {}",
            pix1.width(),
            pix1.height(),
            pix1.depth(),
            pix2.width(),
            pix2.height(),
            pix2.depth()
        ));
    }
    if pix1.colormap() != pix2.colormap() {
        return Some("colormap mismatch".to_string());
    }
    for y in 0..pix1.height() {
        for x in 0..pix1.width() {
            let (p1, p2) = (pix1.get_pixel(x, y), pix2.get_pixel(x, y));
            if p1 != p2 {
                return Some(format!("pixel mismatch at ({x}, {y}): {p1:?} vs {p2:?}"));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixconv_core::{PixColormap, PixMut, PixelDepth};

    #[test]
    fn test_mode_parse() {
        assert_eq!(RegTestMode::parse("DISPLAY"), RegTestMode::Display);
        assert_eq!(RegTestMode::parse("compare"), RegTestMode::Compare);
        assert_eq!(RegTestMode::parse(""), RegTestMode::Compare);
    }

    #[test]
    fn test_compare_values() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert_eq!(
            rp.failures(),
            &[TestError::ValueMismatch {
                index: 2,
                expected: 100.0,
                actual: 200.0,
                delta: 0.0
            }]
        );
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_pix() {
        let mut rp = RegParams::new("test");
        let a = Pix::new(5, 3, PixelDepth::Bit4).unwrap();
        assert!(rp.compare_pix(&a, &a.duplicate().unwrap()));

        let mut pm = a.to_mut().unwrap();
        pm.set_pixel(4, 2, 9).unwrap();
        let b: Pix = pm.into();
        assert!(!rp.compare_pix(&a, &b));

        let mut pm = a.to_mut().unwrap();
        pm.set_colormap(Some(PixColormap::create_linear(4, 16).unwrap()))
            .unwrap();
        assert!(!rp.compare_pix(&a, &pm.into()));

        let c = PixMut::new(5, 3, PixelDepth::Bit8).unwrap().into();
        assert!(!rp.compare_pix(&a, &c));
        assert_eq!(rp.failures().len(), 3);
    }

    #[test]
    fn test_compare_strings() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_strings(b"abc", b"abc"));
        assert!(!rp.compare_strings(b"abc", b"ab"));
        assert_eq!(rp.index(), 2);
    }
}
