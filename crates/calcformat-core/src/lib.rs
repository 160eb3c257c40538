//! # calcformat-core
//!
//! Core configuration types for calcformat.
//!
//! This crate provides the validated building blocks shared by the formula
//! and grading crates:
//! - [`NumberFormatSpec`] - numeral base, digit widths, grouping and prefix
//! - [`Unit`] and [`UnitTable`] - units an answer may be given in
//! - [`ToleranceSpec`] - how a correct value widens into an acceptance interval
//! - [`AnswerRecord`] / [`AnswerConfig`] - the stored per-answer record and its
//!   validated form
//!
//! ## Example
//!
//! ```rust
//! use calcformat_core::{NumberFormatSpec, ToleranceSpec};
//!
//! let spec = NumberFormatSpec::new(16, 4, 0).unwrap().with_base_prefix(true);
//! assert_eq!(spec.base_prefix(), Some("0x"));
//!
//! let tolerance = ToleranceSpec::nominal(0.01).unwrap();
//! assert!(tolerance.interval(6.0).contains(6.005));
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod locale;
pub mod tolerance;
pub mod units;

// Re-exports for convenience
pub use config::{AnswerConfig, AnswerRecord};
pub use error::{Error, ErrorKind, Result};
pub use format::{base_from_prefix, base_prefix, DisplayMode, NumberFormatSpec};
pub use locale::NumberLocale;
pub use tolerance::{ToleranceInterval, ToleranceKind, ToleranceSpec};
pub use units::{Unit, UnitTable};

/// Maximum number of integer or fraction digits in a format
pub const MAX_DIGITS: u32 = 64;

/// Largest supported numeral base
pub const MAX_BASE: u32 = 36;

/// Digit alphabet for bases up to [`MAX_BASE`]
pub const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
