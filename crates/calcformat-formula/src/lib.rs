//! # calcformat-formula
//!
//! Formula validation, substitution and evaluation for calcformat.
//!
//! This crate provides:
//! - Whitelist validation ([`find_formula_errors`])
//! - Dataset substitution (`{name}` → value)
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → number)
//! - The registry of the whitelisted math functions
//!
//! ## Example
//!
//! ```rust
//! use calcformat_formula::{evaluate_formula, find_formula_errors, substitute, DatasetItem};
//!
//! let formula = "sqrt({a}^2 + {b}^2)";
//! assert_eq!(find_formula_errors(formula), None);
//!
//! let data = DatasetItem::new().with("a", 3.0).with("b", 4.0);
//! let value = evaluate_formula(&substitute(formula, &data)).unwrap();
//! assert_eq!(value, 5.0);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod substitute;
pub mod validate;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_formula};
pub use functions::{registry, FunctionDef, FunctionRegistry};
pub use parser::parse_formula;
pub use substitute::{is_wildcard, substitute, DatasetItem, ANY_VALUE};
pub use validate::{
    find_dataset_names, find_embedded_formula_errors, find_formula_errors, require_wildcards,
    validate_formula,
};
