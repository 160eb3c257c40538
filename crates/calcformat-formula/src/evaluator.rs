//! Formula evaluator
//!
//! Evaluates formula ASTs to produce numbers.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::registry;
use crate::parser::parse_formula;
use tracing::{debug, trace};

/// Parse and evaluate a formula that has already passed validation.
///
/// Anything that does not end in a finite number (a parse error, an
/// unbound `{name}` placeholder, a division by zero, a NaN result) is a
/// [`FormulaError`] whose kind is `NotNumeric`, or the arity/function error
/// found while evaluating.
///
/// # Example
/// ```rust
/// use calcformat_formula::evaluate_formula;
///
/// assert_eq!(evaluate_formula("2^10 + 0xff").unwrap(), 1279.0);
/// assert!(evaluate_formula("1/0").is_err());
/// ```
pub fn evaluate_formula(formula: &str) -> FormulaResult<f64> {
    let expr = parse_formula(formula).map_err(|e| {
        debug!(formula, error = %e, "formula did not parse");
        e
    })?;

    let value = evaluate(&expr)?;
    trace!(formula, value, "evaluated formula");

    if value.is_finite() {
        Ok(value)
    } else {
        debug!(formula, value, "formula evaluated to a non-finite value");
        Err(FormulaError::NotNumeric(format!("{} = {}", formula, value)))
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr) -> FormulaResult<f64> {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right),

        FormulaExpr::UnaryOp { op, operand } => {
            let value = evaluate(operand)?;
            match op {
                UnaryOperator::Negate => Ok(-value),
                UnaryOperator::Not => Ok(bool_to_number(!is_truthy(value))),
                UnaryOperator::BitNot => Ok(!to_integer(value)? as f64),
            }
        }

        FormulaExpr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if is_truthy(evaluate(condition)?) {
                evaluate(then)
            } else {
                evaluate(otherwise)
            }
        }

        FormulaExpr::Function { name, args } => evaluate_function(name, args),
    }
}

fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
) -> FormulaResult<f64> {
    let l = evaluate(left)?;

    // Short-circuit logical operators
    match op {
        BinaryOperator::And if !is_truthy(l) => return Ok(0.0),
        BinaryOperator::Or if is_truthy(l) => return Ok(1.0),
        _ => {}
    }

    let r = evaluate(right)?;

    match op {
        BinaryOperator::Add => Ok(l + r),
        BinaryOperator::Subtract => Ok(l - r),
        BinaryOperator::Multiply => Ok(l * r),
        BinaryOperator::Divide => {
            if r == 0.0 {
                Err(FormulaError::NotNumeric("Division by zero".into()))
            } else {
                Ok(l / r)
            }
        }
        BinaryOperator::Modulo => {
            // Integer modulo: operands are truncated first
            let divisor = to_integer(r)?;
            if divisor == 0 {
                Err(FormulaError::NotNumeric("Modulo by zero".into()))
            } else {
                Ok(to_integer(l)?.wrapping_rem(divisor) as f64)
            }
        }
        BinaryOperator::Power => Ok(l.powf(r)),

        BinaryOperator::Equal => Ok(bool_to_number(l == r)),
        BinaryOperator::NotEqual => Ok(bool_to_number(l != r)),
        BinaryOperator::LessThan => Ok(bool_to_number(l < r)),
        BinaryOperator::LessEqual => Ok(bool_to_number(l <= r)),
        BinaryOperator::GreaterThan => Ok(bool_to_number(l > r)),
        BinaryOperator::GreaterEqual => Ok(bool_to_number(l >= r)),

        BinaryOperator::And | BinaryOperator::Or => Ok(bool_to_number(is_truthy(r))),

        BinaryOperator::BitAnd => Ok((to_integer(l)? & to_integer(r)?) as f64),
        BinaryOperator::BitOr => Ok((to_integer(l)? | to_integer(r)?) as f64),
        BinaryOperator::ShiftLeft => {
            let shift = to_shift(r)?;
            Ok(to_integer(l)?.checked_shl(shift).unwrap_or(0) as f64)
        }
        BinaryOperator::ShiftRight => {
            let value = to_integer(l)?;
            let shift = to_shift(r)?;
            Ok(value
                .checked_shr(shift)
                .unwrap_or(if value < 0 { -1 } else { 0 }) as f64)
        }
    }
}

fn evaluate_function(name: &str, args: &[FormulaExpr]) -> FormulaResult<f64> {
    let def = registry()
        .get(name)
        .ok_or_else(|| FormulaError::UnsupportedFunction(name.to_string()))?;

    if !def.accepts(args.len()) {
        return Err(FormulaError::WrongArity {
            function: def.name.to_string(),
            expected: def.arity(),
        });
    }

    let values = args.iter().map(evaluate).collect::<FormulaResult<Vec<_>>>()?;
    (def.implementation)(&values)
}

fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Truncate an operand of an integer operator
fn to_integer(value: f64) -> FormulaResult<i64> {
    if value.is_finite() {
        Ok(value.trunc() as i64)
    } else {
        Err(FormulaError::NotNumeric(format!(
            "{} is not usable as an integer",
            value
        )))
    }
}

fn to_shift(value: f64) -> FormulaResult<u32> {
    let shift = to_integer(value)?;
    u32::try_from(shift)
        .map_err(|_| FormulaError::NotNumeric(format!("Negative shift count {}", shift)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcformat_core::ErrorKind;

    fn eval(formula: &str) -> f64 {
        evaluate_formula(formula).unwrap()
    }

    #[test]
    fn test_simple_arithmetic() {
        assert_eq!(eval("1+2"), 3.0);
        assert_eq!(eval("10-3"), 7.0);
        assert_eq!(eval("4*5"), 20.0);
        assert_eq!(eval("20/4"), 5.0);
        assert_eq!(eval("2^3"), 8.0);
        assert_eq!(eval("2**3"), 8.0);
        assert_eq!(eval("7%3"), 1.0);
        assert_eq!(eval("-7%3"), -1.0);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1+2*3"), 7.0);
        assert_eq!(eval("(1+2)*3"), 9.0);
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("-2^2"), -4.0);
        assert_eq!(eval("(-2)^2"), 4.0);
        assert_eq!(eval("2^-1"), 0.5);
    }

    #[test]
    fn test_comparison_and_logic() {
        assert_eq!(eval("1<2"), 1.0);
        assert_eq!(eval("2<=1"), 0.0);
        assert_eq!(eval("3==3"), 1.0);
        assert_eq!(eval("3<>3"), 0.0);
        assert_eq!(eval("1&&0"), 0.0);
        assert_eq!(eval("0||5"), 1.0);
        assert_eq!(eval("!0"), 1.0);
        assert_eq!(eval("1 > 2 ? 10 : 20"), 20.0);
        // Short-circuiting skips the division by zero
        assert_eq!(eval("0 && 1/0"), 0.0);
        assert_eq!(eval("1 ? 5 : 1/0"), 5.0);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(eval("12&10"), 8.0);
        assert_eq!(eval("12|3"), 15.0);
        assert_eq!(eval("1<<4"), 16.0);
        assert_eq!(eval("-16>>2"), -4.0);
        assert_eq!(eval("~0"), -1.0);
        assert_eq!(eval("5.9&7"), 5.0);
        assert!(evaluate_formula("1<<-1").is_err());
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("sqrt(16)"), 4.0);
        assert_eq!(eval("abs(-3)"), 3.0);
        assert_eq!(eval("max(1, 5, 3)"), 5.0);
        assert_eq!(eval("min(4, 2)"), 2.0);
        assert_eq!(eval("round(2.5)"), 3.0);
        assert_eq!(eval("round(3.14159, 2)"), 3.14);
        assert_eq!(eval("pow(2, 10)"), 1024.0);
        assert_eq!(eval("floor(-1.5)"), -2.0);
        assert!((eval("pi()") - std::f64::consts::PI).abs() < 1e-15);
        assert!((eval("sin(pi()/2)") - 1.0).abs() < 1e-15);
        assert_eq!(eval("bindec(1111)"), 15.0);
    }

    #[test]
    fn test_prefixed_literals() {
        assert_eq!(eval("0xff + 0b1"), 256.0);
        assert_eq!(eval("0o10 * 0d2"), 16.0);
    }

    #[test]
    fn test_not_numeric() {
        for formula in ["1/0", "sqrt(-1)", "log(0)", "1+{x}", "", "5%0"] {
            let err = evaluate_formula(formula).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotNumeric, "{}", formula);
        }
    }

    #[test]
    fn test_function_errors() {
        assert_eq!(
            evaluate_formula("sqrt(1, 2)").unwrap_err().kind(),
            ErrorKind::WrongArity
        );
        assert_eq!(
            evaluate_formula("system(1)").unwrap_err().kind(),
            ErrorKind::UnsupportedFunction
        );
    }
}
