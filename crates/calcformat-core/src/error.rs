//! Error types for calcformat-core

use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification shared by every error in the calcformat crates.
///
/// Callers that only need to decide what feedback to show (rather than the
/// details of what went wrong) match on this instead of the concrete error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Disallowed character or malformed bare-parenthesis grouping
    IllegalSyntax,
    /// Function called with an unsupported argument count
    WrongArity,
    /// Identifier not in the function whitelist
    UnsupportedFunction,
    /// Evaluation produced a non-numeric or non-finite result
    NotNumeric,
    /// Significant-figures display configured with zero digits
    ZeroSignificantFigures,
    /// Numeral base outside 2..=36 (and not 0/1)
    IllegalBase,
    /// Digit length outside 0..=64
    IllegalLength,
    /// Unit multiplier that is not a positive finite number
    IllegalMultiplier,
    /// Tolerance that is negative or not finite
    IllegalTolerance,
    /// Decimal and thousands separators that cannot delimit a numeral
    IllegalLocale,
    /// Answer set that references no dataset wildcard
    MissingWildcard,
    /// Learner response does not match the numeral grammar
    Unparseable,
}

impl ErrorKind {
    /// Whether this kind is raised while building a configuration
    /// (as opposed to a single evaluation or grading attempt).
    pub fn is_configuration(self) -> bool {
        matches!(
            self,
            ErrorKind::ZeroSignificantFigures
                | ErrorKind::IllegalBase
                | ErrorKind::IllegalLength
                | ErrorKind::IllegalMultiplier
                | ErrorKind::IllegalTolerance
                | ErrorKind::IllegalLocale
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::IllegalSyntax => "illegal syntax",
            ErrorKind::WrongArity => "wrong arity",
            ErrorKind::UnsupportedFunction => "unsupported function",
            ErrorKind::NotNumeric => "not numeric",
            ErrorKind::ZeroSignificantFigures => "zero significant figures",
            ErrorKind::IllegalBase => "illegal base",
            ErrorKind::IllegalLength => "illegal length",
            ErrorKind::IllegalMultiplier => "illegal multiplier",
            ErrorKind::IllegalTolerance => "illegal tolerance",
            ErrorKind::IllegalLocale => "illegal locale",
            ErrorKind::MissingWildcard => "missing wildcard",
            ErrorKind::Unparseable => "unparseable",
        };
        f.write_str(name)
    }
}

/// Configuration errors raised while constructing formats, units and tolerances
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Base outside 2..=36 (0 and 1 mean "unrestricted")
    #[error("Illegal base: {0} (expected 0, 1 or 2..=36)")]
    IllegalBase(u32),

    /// Integer or fraction digit count above the maximum
    #[error("Illegal length: {0} (max: {max})", max = crate::MAX_DIGITS)]
    IllegalLength(u32),

    /// Significant-figures display with no digits
    #[error("Significant-figures format requires at least one digit")]
    ZeroSignificantFigures,

    /// Unit multiplier that is zero, negative or not finite
    #[error("Illegal multiplier for unit '{unit}': {multiplier}")]
    IllegalMultiplier { unit: String, multiplier: f64 },

    /// Tolerance that is negative or not finite
    #[error("Illegal tolerance: {0}")]
    IllegalTolerance(f64),

    /// Separators that are equal, or that could be read as digits or signs
    #[error("Illegal locale separators: decimal '{decimal}', thousands '{thousands}'")]
    IllegalLocale { decimal: char, thousands: char },

    /// Unknown tolerance kind name or code
    #[error("Unknown tolerance kind: {0}")]
    UnknownToleranceKind(String),
}

impl Error {
    /// The coarse classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IllegalBase(_) => ErrorKind::IllegalBase,
            Error::IllegalLength(_) => ErrorKind::IllegalLength,
            Error::ZeroSignificantFigures => ErrorKind::ZeroSignificantFigures,
            Error::IllegalMultiplier { .. } => ErrorKind::IllegalMultiplier,
            Error::IllegalLocale { .. } => ErrorKind::IllegalLocale,
            Error::IllegalTolerance(_) | Error::UnknownToleranceKind(_) => {
                ErrorKind::IllegalTolerance
            }
        }
    }
}
