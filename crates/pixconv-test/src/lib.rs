//! pixconv-test - Regression test framework for pixconv
//!
//! Regression tests build their inputs in memory, run conversions and
//! check the results through [`RegParams`], which numbers every check,
//! records failures and reports them together at the end.
//!
//! # Usage
//!
//! ```
//! use pixconv_test::RegParams;
//!
//! let mut rp = RegParams::new("example");
//! rp.compare_values(77.0, 77.0, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: `compare` (default) or `display`; display mode also
//!   logs every passing check
//! - `RUST_LOG`: filter for [`init_logging`], default `info`

mod error;
mod params;

pub use error::TestError;
pub use params::{RegParams, RegTestMode};

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a `tracing` subscriber writing through the test harness's
/// captured output.
///
/// Safe to call from every test; only the first call in a process
/// installs anything.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_test_writer();
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
