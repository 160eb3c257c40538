//! Per-answer configuration
//!
//! [`AnswerRecord`] is the flat record an external store keeps for one
//! answer. [`AnswerRecord::resolve`] validates every field and yields the
//! [`AnswerConfig`] used for formatting/parsing plus the [`ToleranceSpec`]
//! used for grading.

use crate::error::{Error, Result};
use crate::format::{DisplayMode, NumberFormatSpec};
use crate::locale::NumberLocale;
use crate::tolerance::{ToleranceKind, ToleranceSpec};
use crate::units::{Unit, UnitTable};

/// Validated formatting and parsing configuration for one answer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerConfig {
    pub format: NumberFormatSpec,
    pub units: UnitTable,
    pub locale: NumberLocale,
}

impl AnswerConfig {
    pub fn new(format: NumberFormatSpec) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_units(mut self, units: UnitTable) -> Self {
        self.units = units;
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }
}

/// Stored configuration record for one answer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnswerRecord {
    pub base: u32,
    pub integer_digits: u32,
    pub fraction_digits: u32,
    pub exact_digits: bool,
    pub group_digits: bool,
    pub show_base_prefix: bool,
    /// Interpret `integer_digits` as significant digits
    pub significant_figures: bool,
    pub tolerance: f64,
    pub tolerance_kind: ToleranceKind,
    pub units: Vec<Unit>,
    pub units_left: bool,
    pub locale: NumberLocale,
}

impl Default for AnswerRecord {
    fn default() -> Self {
        let tolerance = ToleranceSpec::default();
        Self {
            base: 10,
            integer_digits: 0,
            fraction_digits: 0,
            exact_digits: false,
            group_digits: false,
            show_base_prefix: false,
            significant_figures: false,
            tolerance: tolerance.value(),
            tolerance_kind: tolerance.kind(),
            units: Vec::new(),
            units_left: false,
            locale: NumberLocale::default(),
        }
    }
}

impl AnswerRecord {
    /// The validated number format described by this record
    pub fn number_format(&self) -> Result<NumberFormatSpec> {
        let mode = if self.significant_figures {
            DisplayMode::SignificantFigures
        } else {
            DisplayMode::Decimal
        };
        Ok(
            NumberFormatSpec::new(self.base, self.integer_digits, self.fraction_digits)?
                .with_exact_digits(self.exact_digits)
                .with_group_digits(self.group_digits)
                .with_base_prefix(self.show_base_prefix)
                .with_mode(mode)?,
        )
    }

    /// The validated tolerance described by this record
    pub fn tolerance_spec(&self) -> Result<ToleranceSpec> {
        ToleranceSpec::new(self.tolerance, self.tolerance_kind)
    }

    /// Validate the whole record, splitting it into the formatting
    /// configuration and the grading tolerance
    pub fn resolve(&self) -> Result<(AnswerConfig, ToleranceSpec)> {
        Ok((AnswerConfig::try_from(self)?, self.tolerance_spec()?))
    }

    /// The validated unit table described by this record
    pub fn unit_table(&self) -> Result<UnitTable> {
        let units = self
            .units
            .iter()
            .map(|u| Unit::new(u.symbol.clone(), u.multiplier))
            .collect::<Result<Vec<_>>>()?;
        Ok(UnitTable::from_units(units).with_units_left(self.units_left))
    }
}

impl TryFrom<&AnswerRecord> for AnswerConfig {
    type Error = Error;

    fn try_from(record: &AnswerRecord) -> Result<Self> {
        Ok(AnswerConfig {
            format: record.number_format()?,
            units: record.unit_table()?,
            locale: record.locale.validate()?,
        })
    }
}
