//! Answer evaluation pipeline
//!
//! Turns an answer formula plus one dataset item into the correct answer as
//! displayed, and grades learner responses against it.
//!
//! A formula moves through `Substituted → Validated → Evaluated → Formatted`.
//! Any step may end in `Failed`; the `*` wildcard skips straight to
//! `AnyValueAccepted`.
//!
//! # Example
//!
//! ```rust
//! use calcformat::prelude::*;
//!
//! let config = AnswerConfig::new(NumberFormatSpec::new(10, 0, 2).unwrap());
//! let pipeline = AnswerPipeline::new(config, ToleranceSpec::nominal(0.01).unwrap()).unwrap();
//! let data = DatasetItem::new().with("x", 3.0);
//!
//! let answer = pipeline.compute("{x}*2", &data).unwrap();
//! assert_eq!(answer.text(), Some("6.00"));
//!
//! let grade = pipeline.grade("{x}*2", &data, "6.005").unwrap();
//! assert!(grade.within_tolerance);
//! ```

use crate::answer::AnswerProcessor;
use crate::error::{Error, Result};
use crate::formatter::{mask_value, BaseFormatter};
use calcformat_core::{AnswerConfig, AnswerRecord, ToleranceInterval, ToleranceSpec};
use calcformat_formula::{evaluate_formula, is_wildcard, substitute, validate_formula, DatasetItem};
use tracing::debug;

/// The correct answer as it is displayed
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedAnswer {
    /// Display text, including the unit when one is configured
    pub text: String,
    /// Evaluated value
    pub value: f64,
    /// Value the display format can represent (see [`mask_value`])
    pub masked_value: f64,
}

/// Outcome of computing an answer formula
#[derive(Debug, Clone, PartialEq)]
pub enum CalculatedAnswer {
    /// The `*` wildcard: every response is accepted
    AnyValue,
    Value(FormattedAnswer),
}

impl CalculatedAnswer {
    pub fn text(&self) -> Option<&str> {
        match self {
            CalculatedAnswer::AnyValue => None,
            CalculatedAnswer::Value(answer) => Some(&answer.text),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            CalculatedAnswer::AnyValue => None,
            CalculatedAnswer::Value(answer) => Some(answer.value),
        }
    }
}

/// Where a formula is on its way to a displayed answer
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Dataset values written into the formula
    Substituted(String),
    /// Formula passed the whitelist
    Validated(String),
    Evaluated(f64),
    Formatted(FormattedAnswer),
    AnyValueAccepted,
    Failed(Error),
}

impl PipelineState {
    /// Whether no further step applies
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Formatted(_) | PipelineState::AnyValueAccepted | PipelineState::Failed(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Substituted(_) => "substituted",
            PipelineState::Validated(_) => "validated",
            PipelineState::Evaluated(_) => "evaluated",
            PipelineState::Formatted(_) => "formatted",
            PipelineState::AnyValueAccepted => "any value accepted",
            PipelineState::Failed(_) => "failed",
        }
    }
}

/// Result of grading one response
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    /// Response value in the default unit (`None` only when a wildcard
    /// accepted text that is not a number)
    pub normalized_value: Option<f64>,
    pub within_tolerance: bool,
    /// Acceptance interval (`None` for the wildcard)
    pub interval: Option<ToleranceInterval>,
}

/// Computes and grades answers for one validated configuration
#[derive(Debug, Clone)]
pub struct AnswerPipeline {
    config: AnswerConfig,
    tolerance: ToleranceSpec,
    processor: AnswerProcessor,
}

impl AnswerPipeline {
    pub fn new(config: AnswerConfig, tolerance: ToleranceSpec) -> Result<Self> {
        let processor = AnswerProcessor::from_config(&config)?;
        Ok(Self {
            config,
            tolerance,
            processor,
        })
    }

    /// Validate a stored record and build its pipeline
    pub fn from_record(record: &AnswerRecord) -> Result<Self> {
        let (config, tolerance) = record.resolve()?;
        Self::new(config, tolerance)
    }

    pub fn config(&self) -> &AnswerConfig {
        &self.config
    }

    pub fn tolerance(&self) -> ToleranceSpec {
        self.tolerance
    }

    pub fn processor(&self) -> &AnswerProcessor {
        &self.processor
    }

    /// Substitute the dataset item into a formula
    pub fn start(&self, formula: &str, data: &DatasetItem) -> PipelineState {
        start(formula, data)
    }

    /// Advance one step; terminal states are returned unchanged
    pub fn step(&self, state: PipelineState) -> PipelineState {
        advance(state, &self.config)
    }

    /// Compute the displayed correct answer
    pub fn compute(&self, formula: &str, data: &DatasetItem) -> Result<CalculatedAnswer> {
        run(formula, data, &self.config)
    }

    /// Grade a response against the answer a formula computes
    pub fn grade(&self, formula: &str, data: &DatasetItem, response: &str) -> Result<Grade> {
        match self.compute(formula, data)? {
            CalculatedAnswer::AnyValue => {
                if response.trim().is_empty() {
                    return Err(Error::Unparseable(response.to_string()));
                }
                Ok(Grade {
                    normalized_value: self.read_response(response),
                    within_tolerance: true,
                    interval: None,
                })
            }
            CalculatedAnswer::Value(answer) => {
                grade_with(&self.processor, response, answer.value, self.tolerance)
            }
        }
    }

    fn read_response(&self, response: &str) -> Option<f64> {
        self.processor
            .parse_to_float(response, self.config.format.base())
    }
}

/// Compute the displayed correct answer for a formula and dataset item
pub fn compute_formatted_answer(
    formula: &str,
    data: &DatasetItem,
    config: &AnswerConfig,
) -> Result<CalculatedAnswer> {
    run(formula, data, config)
}

/// Grade a response against an already computed correct value
///
/// For masked formats the interval is centred on the value the display can
/// actually show.
pub fn grade_response(
    response: &str,
    correct_value: f64,
    tolerance: ToleranceSpec,
    config: &AnswerConfig,
) -> Result<Grade> {
    let processor = AnswerProcessor::from_config(config)?;
    grade_with(&processor, response, correct_value, tolerance)
}

fn grade_with(
    processor: &AnswerProcessor,
    response: &str,
    correct_value: f64,
    tolerance: ToleranceSpec,
) -> Result<Grade> {
    let value = processor
        .parse_to_float(response, processor.spec().base())
        .ok_or_else(|| Error::Unparseable(response.to_string()))?;

    let interval = tolerance.interval(mask_value(correct_value, processor.spec()));
    let within_tolerance = interval.contains(value);
    debug!(response, value, %interval, within_tolerance, "graded response");

    Ok(Grade {
        normalized_value: Some(value),
        within_tolerance,
        interval: Some(interval),
    })
}

fn start(formula: &str, data: &DatasetItem) -> PipelineState {
    let substituted = substitute(formula, data);
    let state = if is_wildcard(&substituted) {
        PipelineState::AnyValueAccepted
    } else {
        PipelineState::Substituted(substituted)
    };
    debug!(formula, state = state.name(), "pipeline started");
    state
}

fn advance(state: PipelineState, config: &AnswerConfig) -> PipelineState {
    let next = match state {
        PipelineState::Substituted(formula) => match validate_formula(&formula) {
            Ok(()) => PipelineState::Validated(formula),
            Err(e) => PipelineState::Failed(e.into()),
        },
        PipelineState::Validated(formula) => match evaluate_formula(&formula) {
            Ok(value) => PipelineState::Evaluated(value),
            Err(e) => PipelineState::Failed(e.into()),
        },
        PipelineState::Evaluated(value) => PipelineState::Formatted(format_answer(value, config)),
        terminal => return terminal,
    };
    debug!(state = next.name(), "pipeline advanced");
    next
}

fn run(formula: &str, data: &DatasetItem, config: &AnswerConfig) -> Result<CalculatedAnswer> {
    let mut state = start(formula, data);
    loop {
        state = match state {
            PipelineState::Formatted(answer) => return Ok(CalculatedAnswer::Value(answer)),
            PipelineState::AnyValueAccepted => return Ok(CalculatedAnswer::AnyValue),
            PipelineState::Failed(e) => return Err(e),
            pending => advance(pending, config),
        };
    }
}

fn format_answer(value: f64, config: &AnswerConfig) -> FormattedAnswer {
    let formatter = BaseFormatter::new(&config.format).with_locale(config.locale);
    let unit = config
        .units
        .default_unit()
        .map_or("", |u| u.symbol.as_str());

    let text = if config.units.units_left() && !unit.is_empty() {
        format!("{} {}", unit, formatter.format(value))
    } else {
        formatter.format_with_unit(value, unit)
    };

    FormattedAnswer {
        text,
        value,
        masked_value: mask_value(value, &config.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcformat_core::{ErrorKind, NumberFormatSpec, Unit, UnitTable};
    use pretty_assertions::assert_eq;

    fn decimal(frac: u32) -> AnswerConfig {
        AnswerConfig::new(NumberFormatSpec::new(10, 0, frac).unwrap())
    }

    #[test]
    fn test_state_sequence() {
        let config = decimal(1);
        let pipeline = AnswerPipeline::new(config, ToleranceSpec::default()).unwrap();
        let data = DatasetItem::new().with("x", 2.0);

        let mut state = pipeline.start("{x}+1", &data);
        let mut names = vec![state.name()];
        while !state.is_terminal() {
            state = pipeline.step(state);
            names.push(state.name());
        }
        assert_eq!(names, vec!["substituted", "validated", "evaluated", "formatted"]);
        assert_eq!(pipeline.step(state.clone()), state);
    }

    #[test]
    fn test_wildcard() {
        let config = decimal(1);
        let data = DatasetItem::new();
        assert_eq!(
            compute_formatted_answer("*", &data, &config).unwrap(),
            CalculatedAnswer::AnyValue
        );

        let pipeline = AnswerPipeline::new(config, ToleranceSpec::default()).unwrap();
        let grade = pipeline.grade("*", &data, "anything").unwrap();
        assert!(grade.within_tolerance);
        assert_eq!(grade.normalized_value, None);
        assert_eq!(grade.interval, None);

        let grade = pipeline.grade("*", &data, "42").unwrap();
        assert_eq!(grade.normalized_value, Some(42.0));

        let err = pipeline.grade("*", &data, "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unparseable);
    }

    #[test]
    fn test_failures_carry_kind() {
        let config = decimal(1);
        let data = DatasetItem::new();
        let kind = |formula| {
            compute_formatted_answer(formula, &data, &config)
                .unwrap_err()
                .kind()
        };
        assert_eq!(kind("1+{unknownvar}"), ErrorKind::NotNumeric);
        assert_eq!(kind("1/0"), ErrorKind::NotNumeric);
        assert_eq!(kind("foo(1)"), ErrorKind::UnsupportedFunction);
        assert_eq!(kind("1 + #"), ErrorKind::IllegalSyntax);
    }

    #[test]
    fn test_display_unit() {
        let units = UnitTable::from_units([
            Unit::new("km", 0.001).unwrap(),
            Unit::new("m", 1.0).unwrap(),
        ]);
        let config = decimal(0).with_units(units.clone());
        let answer = compute_formatted_answer("1500", &DatasetItem::new(), &config).unwrap();
        assert_eq!(answer.text(), Some("1500 m"));

        let config = decimal(0).with_units(units.with_units_left(true));
        let answer = compute_formatted_answer("1500", &DatasetItem::new(), &config).unwrap();
        assert_eq!(answer.text(), Some("m 1500"));
    }

    #[test]
    fn test_grade_with_units() {
        let units = UnitTable::from_units([
            Unit::new("m", 1.0).unwrap(),
            Unit::new("km", 0.001).unwrap(),
        ]);
        let config = decimal(0).with_units(units);
        let tolerance = ToleranceSpec::relative(1.0).unwrap();

        let grade = grade_response("1.5 km", 1500.0, tolerance, &config).unwrap();
        assert_eq!(grade.normalized_value, Some(1500.0));
        assert!(grade.within_tolerance);

        let grade = grade_response("1.6km", 1500.0, tolerance, &config).unwrap();
        assert!(!grade.within_tolerance);

        let err = grade_response("lots", 1500.0, tolerance, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unparseable);
    }

    #[test]
    fn test_grade_masked_centre() {
        let config = AnswerConfig::new(NumberFormatSpec::new(16, 2, 0).unwrap());
        let tolerance = ToleranceSpec::nominal(0.0).unwrap();
        // 0x10f only fits as 0x0f in two digits
        let grade = grade_response("0f", 271.0, tolerance, &config).unwrap();
        assert!(grade.within_tolerance);
        let grade = grade_response("0x0f", 271.0, tolerance, &config).unwrap();
        assert!(grade.within_tolerance);
    }

    #[test]
    fn test_wrapped_display_grades_correct() {
        let config = AnswerConfig::new(NumberFormatSpec::new(16, 2, 0).unwrap());
        let pipeline = AnswerPipeline::new(config, ToleranceSpec::nominal(0.0).unwrap()).unwrap();
        let data = DatasetItem::new().with("x", 255.9);

        let answer = pipeline.compute("{x}", &data).unwrap();
        assert_eq!(answer.text(), Some("00"));
        assert!(pipeline.grade("{x}", &data, "00").unwrap().within_tolerance);
        assert!(!pipeline.grade("{x}", &data, "ff").unwrap().within_tolerance);
    }
}
