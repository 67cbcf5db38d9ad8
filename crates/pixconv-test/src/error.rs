//! Failure records for the test framework

use thiserror::Error;

/// A failed check, numbered by its position in the test
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestError {
    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Pix comparison failed
    #[error("pix comparison failed at index {index}: {reason}")]
    PixMismatch { index: usize, reason: String },

    /// Byte string comparison failed
    #[error("string comparison failed at index {index}: sizes {len1} vs {len2}")]
    StringMismatch {
        index: usize,
        len1: usize,
        len2: usize,
    },
}
