//! Formula error types

use calcformat_core::ErrorKind;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula validation, parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Disallowed character or malformed parenthesis grouping
    #[error("Illegal formula syntax starting at '{0}'")]
    IllegalSyntax(String),

    /// Known function called with the wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}")]
    WrongArity {
        function: String,
        expected: &'static str,
    },

    /// Identifier that is not a whitelisted function
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),

    /// Formula text that could not be parsed into an expression
    #[error("Parse error: {0}")]
    Parse(String),

    /// Evaluation produced a non-numeric or non-finite result
    #[error("Not a number: {0}")]
    NotNumeric(String),

    /// An answer set that uses no dataset wildcard
    #[error("At least one answer must use a {{wildcard}}")]
    MissingWildcard,
}

impl FormulaError {
    /// The coarse classification of this error.
    ///
    /// Parse failures only happen after validation succeeded (for example an
    /// unbound `{name}` placeholder or a dangling operator), so they are
    /// reported as [`ErrorKind::NotNumeric`]: the formula could not produce
    /// a number.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::IllegalSyntax(_) => ErrorKind::IllegalSyntax,
            FormulaError::WrongArity { .. } => ErrorKind::WrongArity,
            FormulaError::UnsupportedFunction(_) => ErrorKind::UnsupportedFunction,
            FormulaError::Parse(_) | FormulaError::NotNumeric(_) => ErrorKind::NotNumeric,
            FormulaError::MissingWildcard => ErrorKind::MissingWildcard,
        }
    }
}
