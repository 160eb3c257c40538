//! Dataset item checks
//!
//! Before a question goes live every answer formula is computed for each
//! dataset item, and the displayed correct answer is read back through the
//! response parser. An answer whose own display falls outside its tolerance
//! interval (too few digits) is flagged as outside the limits.

use crate::answer::AnswerProcessor;
use crate::error::{Error, Result};
use crate::pipeline::{compute_formatted_answer, CalculatedAnswer};
use calcformat_core::{AnswerConfig, ToleranceInterval, ToleranceSpec};
use calcformat_formula::{substitute, DatasetItem};
use tracing::debug;

/// What checking one answer formula found
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Wildcard answer
    AnyValue,
    /// The formula could not be computed
    Failed(Error),
    Checked {
        /// Correct answer as displayed
        displayed: String,
        /// Displayed answer read back as a response
        parsed: Option<f64>,
        interval: ToleranceInterval,
        within_limits: bool,
    },
}

/// One answer formula of a dataset check
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCheck {
    /// Formula with the dataset item substituted
    pub formula: String,
    pub outcome: CheckOutcome,
}

/// Result of checking all answers against one dataset item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetCheck {
    pub answers: Vec<AnswerCheck>,
}

impl DatasetCheck {
    /// Whether any displayed correct answer falls outside its own interval
    pub fn outside_limits(&self) -> bool {
        !self.outside_answers().is_empty()
    }

    /// Indices of the answers whose display falls outside their interval
    pub fn outside_answers(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                matches!(
                    a.outcome,
                    CheckOutcome::Checked {
                        within_limits: false,
                        ..
                    }
                )
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the answers that failed to compute
    pub fn failed_answers(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, a)| matches!(a.outcome, CheckOutcome::Failed(_)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Check every answer formula (with its tolerance) for one dataset item
pub fn check_dataset_item<'a, I>(
    answers: I,
    data: &DatasetItem,
    config: &AnswerConfig,
) -> Result<DatasetCheck>
where
    I: IntoIterator<Item = (&'a str, ToleranceSpec)>,
{
    let processor = AnswerProcessor::from_config(config)?;

    let answers = answers
        .into_iter()
        .map(|(formula, tolerance)| AnswerCheck {
            formula: substitute(formula, data),
            outcome: check_answer(&processor, config, formula, tolerance, data),
        })
        .collect();

    Ok(DatasetCheck { answers })
}

fn check_answer(
    processor: &AnswerProcessor,
    config: &AnswerConfig,
    formula: &str,
    tolerance: ToleranceSpec,
    data: &DatasetItem,
) -> CheckOutcome {
    let answer = match compute_formatted_answer(formula, data, config) {
        Ok(CalculatedAnswer::AnyValue) => return CheckOutcome::AnyValue,
        Ok(CalculatedAnswer::Value(answer)) => answer,
        Err(e) => return CheckOutcome::Failed(e),
    };

    let parsed = processor.parse_to_float(&answer.text, config.format.base());
    let interval = tolerance.interval(answer.masked_value);
    let within_limits = parsed.map_or(false, |v| interval.contains(v));
    if !within_limits {
        debug!(formula, displayed = %answer.text, %interval, "correct answer outside limits");
    }

    CheckOutcome::Checked {
        displayed: answer.text,
        parsed,
        interval,
        within_limits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcformat_core::{ErrorKind, NumberFormatSpec};

    #[test]
    fn test_check_flags_coarse_display() {
        let config = AnswerConfig::new(NumberFormatSpec::new(10, 0, 1).unwrap());
        let data = DatasetItem::new().with("x", 1.0);
        let tight = ToleranceSpec::nominal(0.001).unwrap();
        let loose = ToleranceSpec::nominal(0.1).unwrap();

        let check = check_dataset_item(
            [("{x}/3", tight), ("{x}/3", loose), ("*", tight), ("sqrt(-{x})", loose)],
            &data,
            &config,
        )
        .unwrap();

        assert_eq!(check.answers.len(), 4);
        assert_eq!(check.answers[0].formula, "1.0/3");
        assert!(check.outside_limits());
        assert_eq!(check.outside_answers(), vec![0]);
        assert_eq!(check.failed_answers(), vec![3]);
        assert_eq!(check.answers[2].outcome, CheckOutcome::AnyValue);

        match &check.answers[1].outcome {
            CheckOutcome::Checked {
                displayed, parsed, ..
            } => {
                assert_eq!(displayed, "0.3");
                assert_eq!(*parsed, Some(0.3));
            }
            other => panic!("Expected Checked, got {:?}", other),
        }
        match &check.answers[3].outcome {
            CheckOutcome::Failed(e) => assert_eq!(e.kind(), ErrorKind::NotNumeric),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_check_masked_base() {
        let config = AnswerConfig::new(
            NumberFormatSpec::new(16, 2, 0)
                .unwrap()
                .with_base_prefix(true),
        );
        let data = DatasetItem::new().with("x", 271.0);
        let check =
            check_dataset_item([("{x}", ToleranceSpec::nominal(0.0).unwrap())], &data, &config)
                .unwrap();
        assert!(!check.outside_limits());
        match &check.answers[0].outcome {
            CheckOutcome::Checked { displayed, .. } => assert_eq!(displayed, "0x0f"),
            other => panic!("Expected Checked, got {:?}", other),
        }
    }
}
