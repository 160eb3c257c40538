//! # calcformat
//!
//! Calculated numeric answers, displayed in any base and graded within a
//! tolerance.
//!
//! ## Features
//!
//! - Whitelisted answer formulas with `{name}` dataset wildcards
//! - Display in bases 2 to 36 with fixed widths, grouping and base prefixes
//! - Significant-figures display
//! - Response parsing with base prefixes, locale separators and units
//! - Relative, nominal and geometric tolerance intervals
//!
//! ## Example
//!
//! ```rust
//! use calcformat::prelude::*;
//!
//! // Answers are shown as two hex digits with a prefix
//! let record = AnswerRecord {
//!     base: 16,
//!     integer_digits: 2,
//!     show_base_prefix: true,
//!     tolerance: 0.0,
//!     tolerance_kind: ToleranceKind::Nominal,
//!     ..Default::default()
//! };
//! let pipeline = AnswerPipeline::from_record(&record).unwrap();
//!
//! let data = DatasetItem::new().with("a", 200.0).with("b", 55.0);
//! let answer = pipeline.compute("{a} + {b}", &data).unwrap();
//! assert_eq!(answer.text(), Some("0xff"));
//!
//! assert!(pipeline.grade("{a} + {b}", &data, "FF").unwrap().within_tolerance);
//! assert!(!pipeline.grade("{a} + {b}", &data, "fe").unwrap().within_tolerance);
//! ```

pub mod answer;
pub mod check;
pub mod error;
pub mod formatter;
pub mod pipeline;
pub mod prelude;

pub use answer::{AnswerProcessor, AppliedUnits, ParsedResponse};
pub use check::{check_dataset_item, AnswerCheck, CheckOutcome, DatasetCheck};
pub use error::{Error, Result};
pub use formatter::{format_in_base, format_with_unit, mask_value, BaseFormatter};
pub use pipeline::{
    compute_formatted_answer, grade_response, AnswerPipeline, CalculatedAnswer, FormattedAnswer,
    Grade, PipelineState,
};

// Re-export core types
pub use calcformat_core::{
    AnswerConfig, AnswerRecord, DisplayMode, ErrorKind, NumberFormatSpec, NumberLocale,
    ToleranceInterval, ToleranceKind, ToleranceSpec, Unit, UnitTable,
};

// Re-export formula types
pub use calcformat_formula::{
    evaluate_formula, find_dataset_names, find_embedded_formula_errors, find_formula_errors,
    is_wildcard, require_wildcards, substitute, DatasetItem, FormulaError,
};
