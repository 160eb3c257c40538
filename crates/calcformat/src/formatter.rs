//! Base conversion formatting
//!
//! Renders numbers as positional numerals in bases 2 to 36 following a
//! [`NumberFormatSpec`]: fixed integer and fraction widths, digit grouping,
//! an optional base prefix, or a number of significant figures.
//!
//! Rounding is always half away from zero at the last displayed digit.
//! Values shown in bases 2, 8 and 16 with a fixed integer width are masked
//! to that width, like a register of that many digits.

use calcformat_core::{DisplayMode, NumberFormatSpec, NumberLocale, DIGITS, MAX_DIGITS};

/// Formats values for one number format and locale
#[derive(Debug, Clone, Copy)]
pub struct BaseFormatter<'a> {
    spec: &'a NumberFormatSpec,
    locale: NumberLocale,
}

impl<'a> BaseFormatter<'a> {
    pub fn new(spec: &'a NumberFormatSpec) -> Self {
        Self {
            spec,
            locale: NumberLocale::default(),
        }
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Render a value
    ///
    /// Non-finite values render as `NaN`.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "NaN".to_string();
        }

        let base = self.spec.radix();
        let value = mask_value(value, self.spec);
        let magnitude = value.abs();

        let places = match self.spec.mode() {
            DisplayMode::Decimal => self.spec.fraction_digits() as i32,
            DisplayMode::SignificantFigures => {
                significant_places(magnitude, base, self.spec.integer_digits())
            }
        };

        let (mut int_digits, frac_digits) = rounded_digits(magnitude, base, places);

        if self.spec.mode() == DisplayMode::Decimal {
            let width = self.spec.integer_digits() as usize;
            if self.spec.is_masked() && int_digits.len() > width {
                // Rounding carried past the masked width
                int_digits.drain(..int_digits.len() - width);
            }
            if int_digits.len() < width {
                let mut padded = vec![b'0'; width - int_digits.len()];
                padded.extend_from_slice(&int_digits);
                int_digits = padded;
            }
        }

        let is_zero = int_digits
            .iter()
            .chain(frac_digits.iter())
            .all(|&d| d == b'0');

        let mut out = String::with_capacity(int_digits.len() + frac_digits.len() + 4);
        if value < 0.0 && !is_zero {
            out.push('-');
        }
        if self.spec.show_base_prefix() {
            if let Some(prefix) = self.spec.base_prefix() {
                out.push_str(prefix);
            }
        }

        let int_text: String = int_digits.iter().map(|&d| d as char).collect();
        if self.spec.group_digits() {
            out.push_str(&group(
                &int_text,
                group_size(base),
                self.locale.group_separator(base),
            ));
        } else {
            out.push_str(&int_text);
        }

        if !frac_digits.is_empty() {
            out.push(self.locale.decimal_separator);
            out.extend(frac_digits.iter().map(|&d| d as char));
        }

        out
    }

    /// Render a value followed by a space and the unit symbol (if any)
    pub fn format_with_unit(&self, value: f64, unit: &str) -> String {
        let text = self.format(value);
        if unit.is_empty() {
            text
        } else {
            format!("{} {}", text, unit)
        }
    }
}

/// Render `value` following `spec`, with the default locale
///
/// ```rust
/// use calcformat::{format_in_base, NumberFormatSpec};
///
/// let spec = NumberFormatSpec::new(16, 2, 0).unwrap().with_base_prefix(true);
/// assert_eq!(format_in_base(255.0, &spec), "0xff");
///
/// let spec = NumberFormatSpec::new(2, 4, 0).unwrap();
/// assert_eq!(format_in_base(-5.0, &spec), "-0101");
/// ```
pub fn format_in_base(value: f64, spec: &NumberFormatSpec) -> String {
    BaseFormatter::new(spec).format(value)
}

/// [`format_in_base`] followed by a space and `unit` when it is non-empty
pub fn format_with_unit(value: f64, spec: &NumberFormatSpec, unit: &str) -> String {
    BaseFormatter::new(spec).format_with_unit(value, unit)
}

/// The value a masked format can actually show
///
/// For bases 2, 8 and 16 with a fixed integer width the magnitude is rounded
/// to the displayed fraction digits and then reduced modulo
/// `base^integer_digits`, keeping the sign, so 255.9 in two hex digits is 0
/// (shown as `00`). Every other format returns the value unchanged.
pub fn mask_value(value: f64, spec: &NumberFormatSpec) -> f64 {
    if !spec.is_masked() || !value.is_finite() {
        return value;
    }
    let b = f64::from(spec.radix());
    let scale = b.powi(spec.fraction_digits() as i32);
    let scaled = value.abs() * scale;
    let magnitude = if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value.abs()
    };

    let modulus = b.powi(spec.integer_digits() as i32);
    let masked = magnitude % modulus;
    if value < 0.0 {
        -masked
    } else {
        masked
    }
}

fn group_size(base: u32) -> usize {
    match base {
        2 | 8 | 16 => 4,
        _ => 3,
    }
}

/// Insert `separator` between groups of `size` digits, counted from the right
fn group(digits: &str, size: usize, separator: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % size == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Number of fraction places that leaves `sig` significant digits, at most
/// [`MAX_DIGITS`]
fn significant_places(magnitude: f64, base: u32, sig: u32) -> i32 {
    let sig = sig as i32;
    if magnitude == 0.0 {
        return sig - 1;
    }

    let b = f64::from(base);
    let mut exponent = (magnitude.ln() / b.ln()).floor() as i32;
    while b.powi(exponent) > magnitude {
        exponent -= 1;
    }
    while b.powi(exponent + 1) <= magnitude {
        exponent += 1;
    }

    let places = (sig - 1 - exponent).min(MAX_DIGITS as i32);
    // 9.96 to two figures is 10, not 10.0
    if (magnitude * b.powi(places)).round() >= b.powi(sig) {
        places - 1
    } else {
        places
    }
}

/// Digits of `magnitude` rounded to `places` fraction digits in `base`.
///
/// A negative `places` rounds to a power of the base left of the point.
/// Returns the integer digits (at least one) and exactly `max(places, 0)`
/// fraction digits, as ASCII.
fn rounded_digits(magnitude: f64, base: u32, places: i32) -> (Vec<u8>, Vec<u8>) {
    let b = f64::from(base);
    let frac_len = places.max(0) as usize;
    let scaled = magnitude * b.powi(places);

    if !scaled.is_finite() {
        // Only reachable for magnitudes without a fractional part
        let mut int_digits = integer_to_digits(magnitude.trunc(), base);
        if int_digits.is_empty() {
            int_digits.push(b'0');
        }
        return (int_digits, vec![b'0'; frac_len]);
    }

    let mut digits = integer_to_digits(scaled.round(), base);
    if places < 0 && !digits.is_empty() {
        digits.extend(std::iter::repeat(b'0').take(places.unsigned_abs() as usize));
    }
    if digits.len() < frac_len + 1 {
        let mut padded = vec![b'0'; frac_len + 1 - digits.len()];
        padded.extend_from_slice(&digits);
        digits = padded;
    }

    let frac_digits = digits.split_off(digits.len() - frac_len);
    (digits, frac_digits)
}

/// Digits of a non-negative integral `n`, most significant first (empty for 0)
fn integer_to_digits(mut n: f64, base: u32) -> Vec<u8> {
    let b = f64::from(base);
    let mut digits = Vec::new();
    while n >= 1.0 {
        let d = n % b;
        digits.push(DIGITS[d as usize]);
        n = (n - d) / b;
    }
    digits.reverse();
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(base: u32, int: u32, frac: u32) -> NumberFormatSpec {
        NumberFormatSpec::new(base, int, frac).unwrap()
    }

    #[test]
    fn test_decimal() {
        assert_eq!(format_in_base(3.14159, &spec(10, 0, 2)), "3.14");
        assert_eq!(format_in_base(2.5, &spec(10, 0, 0)), "3");
        assert_eq!(format_in_base(-2.5, &spec(10, 0, 0)), "-3");
        assert_eq!(format_in_base(7.0, &spec(10, 3, 1)), "007.0");
        assert_eq!(format_in_base(0.5, &spec(0, 0, 3)), "0.500");
        assert_eq!(format_in_base(12345.0, &spec(10, 2, 0)), "12345");
    }

    #[test]
    fn test_other_bases() {
        assert_eq!(format_in_base(255.0, &spec(16, 0, 0)), "ff");
        assert_eq!(format_in_base(0.5, &spec(2, 0, 2)), "0.10");
        assert_eq!(format_in_base(0.75, &spec(8, 0, 1)), "0.6");
        assert_eq!(format_in_base(35.0, &spec(36, 0, 0)), "z");
        assert_eq!(format_in_base(100.0, &spec(3, 0, 0)), "10201");
    }

    #[test]
    fn test_prefix_and_sign() {
        let hex = spec(16, 2, 0).with_base_prefix(true);
        assert_eq!(format_in_base(255.0, &hex), "0xff");
        assert_eq!(format_in_base(-15.0, &hex), "-0x0f");
        assert_eq!(format_in_base(-5.0, &spec(2, 4, 0)), "-0101");
        // Bases without a conventional prefix show none
        assert_eq!(
            format_in_base(5.0, &spec(7, 0, 0).with_base_prefix(true)),
            "5"
        );
    }

    #[test]
    fn test_zero_has_no_sign() {
        assert_eq!(format_in_base(-0.0, &spec(10, 0, 0)), "0");
        assert_eq!(format_in_base(-0.0001, &spec(10, 0, 2)), "0.00");
    }

    #[test]
    fn test_masking() {
        assert_eq!(format_in_base(256.0 + 15.0, &spec(16, 2, 0)), "0f");
        assert_eq!(format_in_base(18.0, &spec(2, 4, 0)), "0010");
        // Base 10 pads but never truncates
        assert_eq!(format_in_base(12345.0, &spec(10, 2, 0)), "12345");
        // Rounding up past the width wraps around
        assert_eq!(format_in_base(255.9, &spec(16, 2, 0)), "00");

        assert_eq!(mask_value(271.0, &spec(16, 2, 0)), 15.0);
        assert_eq!(mask_value(255.9, &spec(16, 2, 0)), 0.0);
        assert_eq!(mask_value(255.4, &spec(16, 2, 0)), 255.0);
        assert_eq!(mask_value(5.7, &spec(2, 4, 1)), 5.5);
        assert_eq!(mask_value(15.75, &spec(2, 4, 1)), 0.0);
        assert_eq!(format_in_base(15.75, &spec(2, 4, 1)), "0000.0");
        assert_eq!(mask_value(-18.0, &spec(2, 4, 0)), -2.0);
        assert_eq!(mask_value(271.0, &spec(10, 2, 0)), 271.0);
        assert_eq!(mask_value(271.0, &spec(16, 0, 0)), 271.0);
    }

    #[test]
    fn test_grouping() {
        let dec = spec(10, 0, 2).with_group_digits(true);
        assert_eq!(format_in_base(1234567.891, &dec), "1,234,567.89");
        assert_eq!(format_in_base(123.0, &dec), "123.00");

        let bin = spec(2, 8, 0).with_group_digits(true);
        assert_eq!(format_in_base(5.0, &bin), "0000_0101");

        let other = spec(3, 0, 0).with_group_digits(true);
        assert_eq!(format_in_base(100.0, &other), "10_201");

        let comma = BaseFormatter::new(&dec).with_locale(NumberLocale::comma_decimal());
        assert_eq!(comma.format(1234.5), "1.234,50");
    }

    #[test]
    fn test_significant_figures() {
        let sig = NumberFormatSpec::significant_figures(10, 3).unwrap();
        assert_eq!(format_in_base(3.14159, &sig), "3.14");
        assert_eq!(format_in_base(0.0012345, &sig), "0.00123");
        assert_eq!(format_in_base(123456.0, &sig), "123000");
        assert_eq!(format_in_base(9.996, &sig), "10.0");
        assert_eq!(format_in_base(0.0, &sig), "0.00");

        let sig2 = NumberFormatSpec::significant_figures(2, 2).unwrap();
        assert_eq!(format_in_base(7.0, &sig2), "1000");
        assert_eq!(format_in_base(5.0, &sig2), "110");
    }

    #[test]
    fn test_significant_figures_tiny_values() {
        let zeros = format!("0.{}", "0".repeat(MAX_DIGITS as usize));
        let bin = NumberFormatSpec::significant_figures(2, 3).unwrap();
        assert_eq!(format_in_base(5e-324, &bin), zeros);
        assert_eq!(format_in_base(-f64::MIN_POSITIVE, &bin), zeros);

        let dec = NumberFormatSpec::significant_figures(10, 3).unwrap();
        assert_eq!(format_in_base(1e-310, &dec), zeros);
        assert_eq!(format_in_base(1.5e-60, &dec), format!("0.{}150", "0".repeat(59)));
    }

    #[test]
    fn test_units_and_non_finite() {
        assert_eq!(format_with_unit(1.5, &spec(10, 0, 1), "m"), "1.5 m");
        assert_eq!(format_with_unit(1.5, &spec(10, 0, 1), ""), "1.5");
        assert_eq!(format_in_base(f64::NAN, &spec(10, 0, 1)), "NaN");
        assert_eq!(format_in_base(f64::INFINITY, &spec(16, 0, 0)), "NaN");
    }

    #[test]
    fn test_huge_values() {
        let text = format_in_base(1e300, &spec(16, 0, 64));
        assert!(text.ends_with(&"0".repeat(64)));
        assert_eq!(format_in_base(2f64.powi(70), &spec(2, 0, 0)).len(), 71);
    }
}
