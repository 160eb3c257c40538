//! Prelude module - common imports for calcformat users
//!
//! ```rust
//! use calcformat::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    check_dataset_item,
    compute_formatted_answer,
    // Formatting
    format_in_base,
    format_with_unit,
    grade_response,
    mask_value,
    AnswerConfig,
    AnswerPipeline,
    // Parsing
    AnswerProcessor,
    AnswerRecord,
    CalculatedAnswer,
    DatasetItem,
    DisplayMode,
    // Errors
    Error,
    ErrorKind,
    Grade,
    NumberFormatSpec,
    NumberLocale,
    Result,
    ToleranceKind,
    ToleranceSpec,
    Unit,
    UnitTable,
};
