//! Learner response parsing
//!
//! [`AnswerProcessor`] reads a typed response back into a number: an
//! optional sign, an optional base prefix, digits in the configured base with
//! optional grouping and a decimal separator, and a unit before or after the
//! numeral.

use crate::error::Result;
use calcformat_core::{
    base_from_prefix, base_prefix, AnswerConfig, DisplayMode, NumberFormatSpec, NumberLocale,
    UnitTable,
};
use regex::Regex;
use tracing::trace;

/// The pieces of a response that matched the numeral grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub negative: bool,
    /// `0b`, `0o`, `0d`, `0x` (as typed) or empty
    pub base_prefix: String,
    /// Integer digits with separators removed
    pub integer_part: String,
    /// Fraction digits with separators removed
    pub fraction_part: String,
    /// Remaining text, trimmed
    pub unit: String,
}

/// A parsed response value together with its unit
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUnits {
    /// Value as typed, before any unit conversion
    pub value: f64,
    pub unit: String,
    /// Factor converting `value` to the default unit, when the unit is known
    pub multiplier: Option<f64>,
    pub integer_part: String,
    pub fraction_part: String,
}

impl AppliedUnits {
    /// The value expressed in the default unit
    pub fn normalized(&self) -> f64 {
        self.value * self.multiplier.unwrap_or(1.0)
    }
}

/// Parses responses for one answer configuration
#[derive(Debug, Clone)]
pub struct AnswerProcessor {
    spec: NumberFormatSpec,
    units: UnitTable,
    locale: NumberLocale,
    grammar: Regex,
}

impl AnswerProcessor {
    /// Build a processor; fails when the locale separators cannot delimit a
    /// numeral
    pub fn new(spec: NumberFormatSpec, units: UnitTable, locale: NumberLocale) -> Result<Self> {
        let locale = locale.validate()?;
        let thousands = regex::escape(&locale.thousands_separator.to_string());
        let decimal = regex::escape(&locale.decimal_separator.to_string());
        let number = format!(
            r"([+-]?)((?:0[bodxBODX])?)([{thousands}0-9a-zA-Z_]*)(?:{decimal}([0-9a-zA-Z_]*))?",
            thousands = thousands,
            decimal = decimal,
        );
        let pattern = if units.units_left() {
            format!("{}$", number)
        } else {
            format!("^{}", number)
        };

        Ok(Self {
            spec,
            units,
            locale,
            grammar: Regex::new(&pattern)?,
        })
    }

    /// Build a processor from a validated answer configuration
    pub fn from_config(config: &AnswerConfig) -> Result<Self> {
        Self::new(config.format.clone(), config.units.clone(), config.locale)
    }

    pub fn spec(&self) -> &NumberFormatSpec {
        &self.spec
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn locale(&self) -> NumberLocale {
        self.locale
    }

    /// Split a response into sign, prefix, digits and unit.
    ///
    /// Whitespace is ignored. A known unit symbol written directly against
    /// the digits is recognised even when it consists of letters that would
    /// otherwise read as digits. Returns `None` when the response has no
    /// digits at all.
    pub fn parse_response(&self, response: &str) -> Option<ParsedResponse> {
        let compact: String = response.chars().filter(|c| !c.is_whitespace()).collect();

        if let Some(parsed) = self.split_known_unit(&compact) {
            return Some(parsed);
        }

        let caps = self.grammar.captures(&compact)?;
        let whole = caps.get(0)?;
        let unit = if self.units.units_left() {
            &compact[..whole.start()]
        } else {
            &compact[whole.end()..]
        };
        self.decompose(&caps, unit)
    }

    /// Try every known unit (longest symbol first) as the unit text
    fn split_known_unit(&self, compact: &str) -> Option<ParsedResponse> {
        let mut symbols: Vec<&str> = self
            .units
            .iter()
            .map(|u| u.symbol.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        symbols.sort_by_key(|s| std::cmp::Reverse(s.len()));

        symbols.into_iter().find_map(|symbol| {
            let numeral = if self.units.units_left() {
                compact.strip_prefix(symbol)?
            } else {
                compact.strip_suffix(symbol)?
            };
            let caps = self.grammar.captures(numeral)?;
            // The grammar must account for the whole numeral
            if caps.get(0)?.as_str().len() != numeral.len() {
                return None;
            }
            self.decompose(&caps, symbol)
        })
    }

    fn decompose(&self, caps: &regex::Captures<'_>, unit: &str) -> Option<ParsedResponse> {
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        let mut base_prefix = group(2).to_string();
        let mut integer_part = group(3).to_string();
        let fraction_part = group(4);

        if !self.spec.is_unrestricted() && !base_prefix.is_empty() {
            // A fixed base takes no prefix: those characters are digits
            integer_part = format!("{}{}", base_prefix, integer_part);
            base_prefix.clear();
        }

        let strip = |s: &str| {
            s.chars()
                .filter(|&c| c != self.locale.thousands_separator && c != '_')
                .collect::<String>()
        };
        let integer_part = strip(&integer_part);
        let fraction_part = strip(fraction_part);

        if integer_part.is_empty() && fraction_part.is_empty() {
            return None;
        }

        Some(ParsedResponse {
            negative: group(1) == "-",
            base_prefix,
            integer_part,
            fraction_part,
            unit: unit.trim().to_string(),
        })
    }

    /// Whether digit runs have the configured lengths (always true unless
    /// exact digits are enforced).
    ///
    /// In significant-figures mode the digits are counted as significant
    /// figures: leading zeros never count, and without a fraction part the
    /// trailing zeros of the integer part may or may not count (`1200` has
    /// two to four). An all-zero numeral such as `0.00` has one figure more
    /// than its fraction digits.
    pub fn is_correct_length(&self, integer_part: &str, fraction_part: &str) -> bool {
        if !self.spec.exact_digits() {
            return true;
        }
        let integer_part = integer_part.trim();
        let fraction_part = fraction_part.trim();
        let wanted = self.spec.integer_digits() as usize;

        match self.spec.mode() {
            DisplayMode::Decimal => {
                integer_part.chars().count() == wanted
                    && fraction_part.chars().count() == self.spec.fraction_digits() as usize
            }
            DisplayMode::SignificantFigures => {
                let (fewest, most) = significant_figures(integer_part, fraction_part);
                (fewest..=most).contains(&wanted)
            }
        }
    }

    /// Parse a response into its value and resolve its unit.
    ///
    /// `separate_unit`, when given, replaces whatever unit text followed the
    /// number (for interfaces with a separate unit field).
    pub fn apply_units(
        &self,
        response: &str,
        separate_unit: Option<&str>,
    ) -> Option<AppliedUnits> {
        let parsed = self.parse_response(response)?;

        if !self.is_correct_length(&parsed.integer_part, &parsed.fraction_part) {
            trace!(response, "wrong number of digits");
            return None;
        }

        let base = if self.spec.is_unrestricted() {
            base_from_prefix(&parsed.base_prefix)?
        } else {
            self.spec.base()
        };

        let b = f64::from(base);
        let mut value = 0.0;
        for c in parsed.integer_part.chars().chain(parsed.fraction_part.chars()) {
            // to_digit(base) rejects digits outside the base alphabet
            let digit = c.to_digit(base)?;
            value = value * b + f64::from(digit);
        }

        let fraction_len = parsed.fraction_part.chars().count();
        if fraction_len > 0 {
            value /= b.powi(fraction_len as i32);
        }
        if parsed.negative {
            value = -value;
        }

        let unit = separate_unit.map_or(parsed.unit, |u| u.trim().to_string());
        let multiplier = self.units.get(&unit).map(|u| 1.0 / u.multiplier);

        Some(AppliedUnits {
            value,
            unit,
            multiplier,
            integer_part: parsed.integer_part,
            fraction_part: parsed.fraction_part,
        })
    }

    /// Parse a response into a value in the default unit.
    ///
    /// When `expect_base` is 2, 8, 10 or 16 a matching `0b`/`0o`/`0d`/`0x`
    /// prefix (after an optional `-`) is dropped first, so a displayed
    /// answer with a prefix reads back in a fixed base.
    pub fn parse_to_float(&self, response: &str, expect_base: u32) -> Option<f64> {
        let stripped = strip_expected_prefix(response, expect_base);
        let applied = self.apply_units(&stripped, None)?;
        Some(applied.normalized())
    }
}

/// Fewest and most significant figures a numeral can be read as having
fn significant_figures(integer_part: &str, fraction_part: &str) -> (usize, usize) {
    let digits: Vec<char> = integer_part.chars().chain(fraction_part.chars()).collect();
    let leading = digits.iter().take_while(|&&c| c == '0').count();
    let fraction_len = fraction_part.chars().count();

    if leading == digits.len() {
        let figures = fraction_len + 1;
        return (figures, figures);
    }

    let most = digits.len() - leading;
    let fewest = if fraction_len == 0 {
        most - digits.iter().rev().take_while(|&&c| c == '0').count()
    } else {
        most
    };
    (fewest, most)
}

fn strip_expected_prefix(response: &str, expect_base: u32) -> String {
    let prefix = match base_prefix(expect_base) {
        Some(prefix) => prefix,
        None => return response.to_string(),
    };

    let (sign, rest) = match response.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", response),
    };
    match rest.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => {
            format!("{}{}", sign, &rest[prefix.len()..])
        }
        _ => response.to_string(),
    }
}
