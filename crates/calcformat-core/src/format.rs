//! Number format types

use crate::error::{Error, Result};
use crate::MAX_DIGITS;

/// How the digit counts of a [`NumberFormatSpec`] are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisplayMode {
    /// Fixed integer and fraction widths
    #[default]
    Decimal,
    /// `integer_digits` is the total number of significant digits
    SignificantFigures,
}

/// Display and parsing format for a numeric answer.
///
/// The fields are validated on construction, so a `NumberFormatSpec` value
/// always describes a usable format:
///
/// - `base` is 0 (unrestricted, displayed as decimal) or in `2..=36`
/// - `integer_digits` and `fraction_digits` are at most [`MAX_DIGITS`]
/// - significant-figures mode has at least one significant digit
///
/// ```rust
/// use calcformat_core::NumberFormatSpec;
///
/// let hex = NumberFormatSpec::new(16, 2, 0).unwrap().with_base_prefix(true);
/// assert_eq!(hex.base(), 16);
/// assert_eq!(hex.radix(), 16);
///
/// let any = NumberFormatSpec::new(1, 0, 2).unwrap();
/// assert!(any.is_unrestricted());
/// assert_eq!(any.radix(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberFormatSpec {
    base: u32,
    integer_digits: u32,
    fraction_digits: u32,
    exact_digits: bool,
    group_digits: bool,
    show_base_prefix: bool,
    mode: DisplayMode,
}

impl Default for NumberFormatSpec {
    fn default() -> Self {
        Self {
            base: 10,
            integer_digits: 0,
            fraction_digits: 0,
            exact_digits: false,
            group_digits: false,
            show_base_prefix: false,
            mode: DisplayMode::Decimal,
        }
    }
}

impl NumberFormatSpec {
    /// Create a fixed-width format.
    ///
    /// Bases 0 and 1 both mean "unrestricted": responses may carry any
    /// base prefix, and values are displayed in decimal.
    pub fn new(base: u32, integer_digits: u32, fraction_digits: u32) -> Result<Self> {
        let base = match base {
            0 | 1 => 0,
            2..=36 => base,
            _ => return Err(Error::IllegalBase(base)),
        };
        for length in [integer_digits, fraction_digits] {
            if length > MAX_DIGITS {
                return Err(Error::IllegalLength(length));
            }
        }

        Ok(Self {
            base,
            integer_digits,
            fraction_digits,
            ..Self::default()
        })
    }

    /// Create a significant-figures format with `digits` significant digits
    pub fn significant_figures(base: u32, digits: u32) -> Result<Self> {
        Self::new(base, digits, 0)?.with_mode(DisplayMode::SignificantFigures)
    }

    /// Switch the display mode.
    ///
    /// Fails with [`Error::ZeroSignificantFigures`] when switching to
    /// significant figures with `integer_digits == 0`.
    pub fn with_mode(mut self, mode: DisplayMode) -> Result<Self> {
        if mode == DisplayMode::SignificantFigures && self.integer_digits == 0 {
            return Err(Error::ZeroSignificantFigures);
        }
        self.mode = mode;
        Ok(self)
    }

    /// Require responses to use exactly the configured digit counts
    pub fn with_exact_digits(mut self, exact: bool) -> Self {
        self.exact_digits = exact;
        self
    }

    /// Group integer digits when displaying
    pub fn with_group_digits(mut self, group: bool) -> Self {
        self.group_digits = group;
        self
    }

    /// Prefix displayed values with `0b`/`0o`/`0d`/`0x`
    pub fn with_base_prefix(mut self, show: bool) -> Self {
        self.show_base_prefix = show;
        self
    }

    /// Configured base, 0 when unrestricted
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Base actually used for display (10 when unrestricted)
    pub fn radix(&self) -> u32 {
        if self.base == 0 {
            10
        } else {
            self.base
        }
    }

    /// Whether responses may use any base prefix
    pub fn is_unrestricted(&self) -> bool {
        self.base == 0
    }

    pub fn integer_digits(&self) -> u32 {
        self.integer_digits
    }

    pub fn fraction_digits(&self) -> u32 {
        self.fraction_digits
    }

    /// Whether exact digit counts are enforced.
    ///
    /// Only effective when an integer width is configured; a zero integer
    /// width means "no constraint" and cannot be matched exactly.
    pub fn exact_digits(&self) -> bool {
        self.exact_digits && self.integer_digits > 0
    }

    pub fn group_digits(&self) -> bool {
        self.group_digits
    }

    pub fn show_base_prefix(&self) -> bool {
        self.show_base_prefix
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Number of significant digits in significant-figures mode
    pub fn significant_digits(&self) -> Option<u32> {
        match self.mode {
            DisplayMode::SignificantFigures => Some(self.integer_digits),
            DisplayMode::Decimal => None,
        }
    }

    /// Whether fixed-width values are masked to the integer width
    ///
    /// Only the power-of-two bases behave like bit fields.
    pub fn is_masked(&self) -> bool {
        self.mode == DisplayMode::Decimal
            && self.integer_digits > 0
            && matches!(self.base, 2 | 8 | 16)
    }

    /// Display prefix for the configured base, if it has one
    pub fn base_prefix(&self) -> Option<&'static str> {
        base_prefix(self.radix())
    }
}

/// The conventional prefix for a numeral base (`0b`, `0o`, `0d`, `0x`)
pub fn base_prefix(base: u32) -> Option<&'static str> {
    match base {
        2 => Some("0b"),
        8 => Some("0o"),
        10 => Some("0d"),
        16 => Some("0x"),
        _ => None,
    }
}

/// The base denoted by a (case-insensitive) prefix, if it is one
pub fn base_from_prefix(prefix: &str) -> Option<u32> {
    match prefix.to_ascii_lowercase().as_str() {
        "" => Some(10),
        "0b" => Some(2),
        "0o" => Some(8),
        "0d" => Some(10),
        "0x" => Some(16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_base() {
        assert!(NumberFormatSpec::new(0, 0, 0).unwrap().is_unrestricted());
        assert!(NumberFormatSpec::new(1, 0, 0).unwrap().is_unrestricted());
        assert_eq!(NumberFormatSpec::new(1, 0, 0).unwrap().base(), 0);
        assert!(!NumberFormatSpec::new(2, 0, 0).unwrap().is_unrestricted());
    }

    #[test]
    fn test_illegal_base() {
        assert_eq!(NumberFormatSpec::new(37, 0, 0), Err(Error::IllegalBase(37)));
        assert!(NumberFormatSpec::new(36, 0, 0).is_ok());
    }

    #[test]
    fn test_illegal_length() {
        assert_eq!(NumberFormatSpec::new(10, 65, 0), Err(Error::IllegalLength(65)));
        assert_eq!(NumberFormatSpec::new(10, 0, 100), Err(Error::IllegalLength(100)));
        assert!(NumberFormatSpec::new(10, 64, 64).is_ok());
    }

    #[test]
    fn test_zero_significant_figures() {
        assert_eq!(
            NumberFormatSpec::significant_figures(10, 0),
            Err(Error::ZeroSignificantFigures)
        );
        let spec = NumberFormatSpec::new(10, 0, 0).unwrap().with_exact_digits(true);
        assert_eq!(
            spec.with_mode(DisplayMode::SignificantFigures),
            Err(Error::ZeroSignificantFigures)
        );
        let spec = NumberFormatSpec::significant_figures(10, 3).unwrap();
        assert_eq!(spec.significant_digits(), Some(3));
    }

    #[test]
    fn test_exact_digits_needs_integer_width() {
        let spec = NumberFormatSpec::new(10, 0, 2).unwrap().with_exact_digits(true);
        assert!(!spec.exact_digits());
        let spec = NumberFormatSpec::new(10, 3, 2).unwrap().with_exact_digits(true);
        assert!(spec.exact_digits());
    }

    #[test]
    fn test_masking() {
        assert!(NumberFormatSpec::new(16, 2, 0).unwrap().is_masked());
        assert!(!NumberFormatSpec::new(16, 0, 0).unwrap().is_masked());
        assert!(!NumberFormatSpec::new(10, 4, 0).unwrap().is_masked());
        assert!(!NumberFormatSpec::new(3, 4, 0).unwrap().is_masked());
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(base_prefix(16), Some("0x"));
        assert_eq!(base_prefix(3), None);
        assert_eq!(base_from_prefix("0X"), Some(16));
        assert_eq!(base_from_prefix("0d"), Some(10));
        assert_eq!(base_from_prefix(""), Some(10));
        assert_eq!(base_from_prefix("0z"), None);
    }
}
