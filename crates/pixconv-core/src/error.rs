//! Error types for pixconv-core
//!
//! Every fallible operation in this crate returns [`Result`]. A failed
//! conversion never produces a partial raster: the destination is either
//! returned whole or not at all.
//!
//! Conditions that have a sane fallback (an unsupported colormap-removal
//! mode, a palette index past the end of the colormap) are not errors.
//! They are reported through `tracing` warnings and the call succeeds.

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A depth, dimension, enum or scalar argument the operation cannot accept
    InvalidArgument,
    /// The arguments are individually valid but break a structural rule
    /// (narrowing in a lossless repack, a full colormap, ...)
    ConstraintViolation,
    /// A pixel buffer could not be allocated
    AllocationFailure,
}

/// pixconv error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Invalid pixel depth
    #[error("invalid pixel depth: {0} bpp")]
    InvalidDepth(u32),

    /// Unsupported pixel depth for this operation
    #[error("unsupported pixel depth: {0} bpp")]
    UnsupportedDepth(u32),

    /// The source carries a colormap the operation cannot handle
    #[error("colormap present; operation requires a colormap-free image")]
    ColormapPresent,

    /// Colormap not allowed for this depth
    #[error("colormap not allowed for depth {0} bpp")]
    ColormapNotAllowed(u32),

    /// The colormap already holds 2^depth entries
    #[error("colormap full: {capacity} entries")]
    ColormapFull { capacity: usize },

    /// A lossless repack was asked to drop bits
    #[error("cannot narrow from {from} bpp to {to} bpp losslessly")]
    DepthNarrowing { from: u32, to: u32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Memory allocation failed
    #[error("memory allocation failed")]
    AllocationFailed,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ColormapFull { .. } | Error::DepthNarrowing { .. } | Error::ColormapPresent => {
                ErrorKind::ConstraintViolation
            }
            Error::AllocationFailed => ErrorKind::AllocationFailure,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type alias for pixconv operations
pub type Result<T> = std::result::Result<T, Error>;
