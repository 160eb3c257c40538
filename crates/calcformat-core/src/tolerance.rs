//! Tolerance types
//!
//! A [`ToleranceSpec`] widens a correct numeric answer into the inclusive
//! [`ToleranceInterval`] of acceptable responses.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// ULPs of slack added to both interval bounds so that decimal round-off in
/// a response never rejects an answer sitting exactly on a bound.
const BOUND_SLACK_ULPS: f64 = 4.0;

/// How a tolerance value widens a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ToleranceKind {
    /// Percentage of the correct value
    #[default]
    Relative,
    /// Absolute distance from the correct value
    Nominal,
    /// Multiplicative factor `1 + t` around the correct value
    Geometric,
}

impl ToleranceKind {
    /// Numeric code used by stored question records (1, 2, 3)
    pub fn code(self) -> u8 {
        match self {
            ToleranceKind::Relative => 1,
            ToleranceKind::Nominal => 2,
            ToleranceKind::Geometric => 3,
        }
    }

    /// Inverse of [`ToleranceKind::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ToleranceKind::Relative),
            2 => Some(ToleranceKind::Nominal),
            3 => Some(ToleranceKind::Geometric),
            _ => None,
        }
    }
}

impl fmt::Display for ToleranceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToleranceKind::Relative => write!(f, "relative"),
            ToleranceKind::Nominal => write!(f, "nominal"),
            ToleranceKind::Geometric => write!(f, "geometric"),
        }
    }
}

impl FromStr for ToleranceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(code) = lower.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| Error::UnknownToleranceKind(s.to_string()));
        }
        match lower.as_str() {
            "relative" => Ok(ToleranceKind::Relative),
            "nominal" => Ok(ToleranceKind::Nominal),
            "geometric" => Ok(ToleranceKind::Geometric),
            _ => Err(Error::UnknownToleranceKind(s.to_string())),
        }
    }
}

/// Acceptance window around a correct answer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ToleranceSpec {
    value: f64,
    kind: ToleranceKind,
}

impl Default for ToleranceSpec {
    fn default() -> Self {
        Self {
            value: 0.01,
            kind: ToleranceKind::Relative,
        }
    }
}

impl ToleranceSpec {
    /// Create a tolerance, rejecting negative or non-finite values
    pub fn new(value: f64, kind: ToleranceKind) -> Result<Self> {
        if !(value.is_finite() && value >= 0.0) {
            return Err(Error::IllegalTolerance(value));
        }
        Ok(Self { value, kind })
    }

    pub fn nominal(value: f64) -> Result<Self> {
        Self::new(value, ToleranceKind::Nominal)
    }

    pub fn relative(value: f64) -> Result<Self> {
        Self::new(value, ToleranceKind::Relative)
    }

    pub fn geometric(value: f64) -> Result<Self> {
        Self::new(value, ToleranceKind::Geometric)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> ToleranceKind {
        self.kind
    }

    /// The inclusive interval of acceptable values around `correct`
    pub fn interval(&self, correct: f64) -> ToleranceInterval {
        let t = self.value;
        let (min, max) = match self.kind {
            ToleranceKind::Relative => {
                let delta = (correct * t / 100.0).abs();
                (correct - delta, correct + delta)
            }
            ToleranceKind::Nominal => (correct - t, correct + t),
            ToleranceKind::Geometric => {
                let quotient = 1.0 + t;
                if correct < 0.0 {
                    (correct * quotient, correct / quotient)
                } else {
                    (correct / quotient, correct * quotient)
                }
            }
        };

        let slack = BOUND_SLACK_ULPS * f64::EPSILON * min.abs().max(max.abs());
        ToleranceInterval {
            min: min - slack,
            max: max + slack,
        }
    }
}

/// Inclusive `[min, max]` range of acceptable values
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToleranceInterval {
    pub min: f64,
    pub max: f64,
}

impl ToleranceInterval {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ToleranceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
