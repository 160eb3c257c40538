//! Answer units

use crate::error::{Error, Result};

/// A unit an answer may be given in.
///
/// `multiplier` converts the canonical value into this unit, so a response in
/// this unit is normalized with `canonical = displayed / multiplier`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub symbol: String,
    pub multiplier: f64,
}

impl Unit {
    /// Create a unit, rejecting multipliers that are not positive and finite
    pub fn new<S: Into<String>>(symbol: S, multiplier: f64) -> Result<Self> {
        let symbol = symbol.into();
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(Error::IllegalMultiplier {
                unit: symbol,
                multiplier,
            });
        }
        Ok(Self { symbol, multiplier })
    }

    /// The default unit has multiplier 1
    pub fn is_default(&self) -> bool {
        self.multiplier == 1.0
    }

    /// Convert a value expressed in this unit to the canonical unit
    pub fn to_canonical(&self, value: f64) -> f64 {
        value / self.multiplier
    }

    /// Convert a canonical value into this unit
    pub fn from_canonical(&self, value: f64) -> f64 {
        value * self.multiplier
    }
}

/// The set of units accepted for one answer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitTable {
    units: Vec<Unit>,
    units_left: bool,
}

impl UnitTable {
    /// An empty table; units follow the number
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from already-validated units
    pub fn from_units(units: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            units: units.into_iter().collect(),
            units_left: false,
        }
    }

    /// Units precede the number (e.g. currency symbols)
    pub fn with_units_left(mut self, left: bool) -> Self {
        self.units_left = left;
        self
    }

    /// Add a unit, replacing any existing unit with the same symbol
    pub fn add(&mut self, unit: Unit) {
        match self.units.iter_mut().find(|u| u.symbol == unit.symbol) {
            Some(existing) => *existing = unit,
            None => self.units.push(unit),
        }
    }

    /// Look up a unit by its exact symbol
    pub fn get(&self, symbol: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.symbol == symbol)
    }

    pub fn is_known(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// The unit with multiplier 1, used when displaying correct answers
    pub fn default_unit(&self) -> Option<&Unit> {
        self.units.iter().find(|u| u.is_default())
    }

    pub fn units_left(&self) -> bool {
        self.units_left
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }
}
