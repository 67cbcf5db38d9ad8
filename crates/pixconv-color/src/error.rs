//! Error types for pixconv-color

use pixconv_core::ErrorKind;
use thiserror::Error;

/// Errors that can occur during color conversions
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] pixconv_core::Error),

    /// Unsupported pixel depth for this operation
    #[error("unsupported depth: expected {expected}, got {actual}")]
    UnsupportedDepth { expected: &'static str, actual: u32 },

    /// A packed HSV pixel or colormap entry with hue outside [0, 240]
    #[error("invalid hue {hue} at ({x}, {y})")]
    InvalidHue { hue: u8, x: u32, y: u32 },

    /// The image needs a larger palette than the caller allowed
    #[error("too many colors: {count} > {max}")]
    TooManyColors { count: u32, max: u32 },
}

impl ColorError {
    /// Classification shared with [`pixconv_core::Error::kind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            ColorError::Core(e) => e.kind(),
            ColorError::TooManyColors { .. } => ErrorKind::ConstraintViolation,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_passes_through_core() {
        let e: ColorError = pixconv_core::Error::AllocationFailed.into();
        assert_eq!(e.kind(), ErrorKind::AllocationFailure);
        let e = ColorError::UnsupportedDepth {
            expected: "32 bpp",
            actual: 8,
        };
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        assert_eq!(e.to_string(), "unsupported depth: expected 32 bpp, got 8");
        let e = ColorError::TooManyColors { count: 16, max: 15 };
        assert_eq!(e.kind(), ErrorKind::ConstraintViolation);
    }
}
