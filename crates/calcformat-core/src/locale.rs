//! Separators used when displaying and reading decimal numbers

use crate::error::{Error, Result};

/// Decimal and thousands separators of the active locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub thousands_separator: char,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            thousands_separator: ',',
        }
    }
}

impl NumberLocale {
    /// Create a locale.
    ///
    /// The separators must differ, and neither may be a character a numeral
    /// is written with (ASCII letters and digits, `_`, `+`, `-`). The decimal
    /// separator may not be whitespace, which responses are stripped of.
    pub fn new(decimal_separator: char, thousands_separator: char) -> Result<Self> {
        Self {
            decimal_separator,
            thousands_separator,
        }
        .validate()
    }

    /// Check the separators of a locale built field by field (for example
    /// a deserialized one)
    pub fn validate(self) -> Result<Self> {
        let reserved = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-');
        if self.decimal_separator == self.thousands_separator
            || reserved(self.decimal_separator)
            || reserved(self.thousands_separator)
            || self.decimal_separator.is_whitespace()
        {
            return Err(Error::IllegalLocale {
                decimal: self.decimal_separator,
                thousands: self.thousands_separator,
            });
        }
        Ok(self)
    }

    /// Comma decimals with dot grouping (e.g. `1.234,5`)
    pub fn comma_decimal() -> Self {
        Self {
            decimal_separator: ',',
            thousands_separator: '.',
        }
    }

    /// Separator inserted between digit groups for a base.
    ///
    /// Decimal numbers use the locale separator; other bases use `_` so that
    /// grouped hex or binary never looks like a decimal number.
    pub fn group_separator(&self, base: u32) -> char {
        if base == 10 {
            self.thousands_separator
        } else {
            '_'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators() {
        let locale = NumberLocale::default();
        assert_eq!(locale.group_separator(10), ',');
        assert_eq!(locale.group_separator(16), '_');
        assert_eq!(NumberLocale::comma_decimal().group_separator(10), '.');
    }

    #[test]
    fn test_validate() {
        assert_eq!(NumberLocale::new('.', ','), Ok(NumberLocale::default()));
        assert_eq!(NumberLocale::new(',', '.'), Ok(NumberLocale::comma_decimal()));
        assert!(NumberLocale::new(',', ' ').is_ok());
        assert!(NumberLocale::new('.', '\'').is_ok());

        for (decimal, thousands) in [
            (',', ','),
            ('.', '.'),
            ('.', '0'),
            ('a', ','),
            ('.', '_'),
            ('-', ','),
            (' ', ','),
        ] {
            assert_eq!(
                NumberLocale::new(decimal, thousands),
                Err(Error::IllegalLocale { decimal, thousands })
            );
        }
    }
}
