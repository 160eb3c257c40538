//! Math functions
//!
//! Every function receives its arguments already evaluated and already
//! checked against the registered arity. Domain errors produce NaN or an
//! infinity, which the evaluator rejects once the whole formula is done.

use crate::error::FormulaResult;

macro_rules! unary_fn {
    ($(#[$doc:meta])* $name:ident, $op:expr) => {
        $(#[$doc])*
        pub fn $name(args: &[f64]) -> FormulaResult<f64> {
            let op: fn(f64) -> f64 = $op;
            Ok(op(args[0]))
        }
    };
}

/// PI function
pub fn fn_pi(_args: &[f64]) -> FormulaResult<f64> {
    Ok(std::f64::consts::PI)
}

unary_fn!(
    /// ABS function
    fn_abs, f64::abs
);
unary_fn!(fn_acos, f64::acos);
unary_fn!(fn_acosh, f64::acosh);
unary_fn!(fn_asin, f64::asin);
unary_fn!(fn_asinh, f64::asinh);
unary_fn!(fn_atan, f64::atan);
unary_fn!(fn_atanh, f64::atanh);
unary_fn!(fn_cos, f64::cos);
unary_fn!(fn_cosh, f64::cosh);
unary_fn!(fn_sin, f64::sin);
unary_fn!(fn_sinh, f64::sinh);
unary_fn!(fn_tan, f64::tan);
unary_fn!(fn_tanh, f64::tanh);
unary_fn!(
    /// CEIL function
    fn_ceil, f64::ceil
);
unary_fn!(
    /// FLOOR function
    fn_floor, f64::floor
);
unary_fn!(fn_exp, f64::exp);
unary_fn!(
    /// EXPM1 function: `e^x - 1`, accurate near zero
    fn_expm1, f64::exp_m1
);
unary_fn!(fn_log10, f64::log10);
unary_fn!(
    /// LOG1P function: `ln(1 + x)`, accurate near zero
    fn_log1p, f64::ln_1p
);
unary_fn!(fn_sqrt, f64::sqrt);
unary_fn!(fn_deg2rad, f64::to_radians);
unary_fn!(fn_rad2deg, f64::to_degrees);
unary_fn!(
    /// IS_FINITE function (1 or 0)
    fn_is_finite, |x| if x.is_finite() { 1.0 } else { 0.0 }
);
unary_fn!(fn_is_infinite, |x| if x.is_infinite() { 1.0 } else { 0.0 });
unary_fn!(fn_is_nan, |x| if x.is_nan() { 1.0 } else { 0.0 });

/// LOG function
///
/// Natural logarithm with one argument, logarithm in the given base with two.
pub fn fn_log(args: &[f64]) -> FormulaResult<f64> {
    match args {
        [x] => Ok(x.ln()),
        [x, base] => Ok(x.ln() / base.ln()),
        _ => Ok(f64::NAN),
    }
}

/// ROUND function
///
/// Rounds half away from zero to `precision` decimal places (default 0).
/// A negative precision rounds to tens, hundreds and so on.
pub fn fn_round(args: &[f64]) -> FormulaResult<f64> {
    let value = args[0];
    let precision = args.get(1).copied().unwrap_or(0.0).trunc();

    if precision == 0.0 {
        return Ok(value.round());
    }

    let factor = 10f64.powf(precision);
    if factor == 0.0 {
        // Rounding to a power of ten beyond any finite value
        return Ok(0.0 * value.signum());
    }
    let rounded = (value * factor).round() / factor;
    // Very large precisions overflow the factor; the value is already exact
    Ok(if rounded.is_finite() { rounded } else { value })
}

/// ATAN2 function: `atan2(y, x)`
pub fn fn_atan2(args: &[f64]) -> FormulaResult<f64> {
    Ok(args[0].atan2(args[1]))
}

/// FMOD function: floating point remainder with the sign of the dividend
pub fn fn_fmod(args: &[f64]) -> FormulaResult<f64> {
    Ok(args[0] % args[1])
}

/// POW function
pub fn fn_pow(args: &[f64]) -> FormulaResult<f64> {
    Ok(args[0].powf(args[1]))
}

/// MIN function
pub fn fn_min(args: &[f64]) -> FormulaResult<f64> {
    Ok(args.iter().copied().fold(f64::INFINITY, f64::min))
}

/// MAX function
pub fn fn_max(args: &[f64]) -> FormulaResult<f64> {
    Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// BINDEC function
///
/// Reads the decimal digits of the argument as a binary numeral:
/// `bindec(1010) == 10`. Digits other than 0 and 1 are ignored.
pub fn fn_bindec(args: &[f64]) -> FormulaResult<f64> {
    Ok(reinterpret_digits(args[0], 2))
}

/// OCTDEC function
///
/// Reads the decimal digits of the argument as an octal numeral:
/// `octdec(17) == 15`. Digits 8 and 9 are ignored.
pub fn fn_octdec(args: &[f64]) -> FormulaResult<f64> {
    Ok(reinterpret_digits(args[0], 8))
}

/// DECBIN function
///
/// Writes the binary digits of the integer part of the argument as a decimal
/// number: `decbin(10) == 1010`. Negative arguments use their 64-bit two's
/// complement.
pub fn fn_decbin(args: &[f64]) -> FormulaResult<f64> {
    Ok(digits_as_decimal(args[0], 2))
}

/// DECOCT function
///
/// Writes the octal digits of the integer part of the argument as a decimal
/// number: `decoct(15) == 17`.
pub fn fn_decoct(args: &[f64]) -> FormulaResult<f64> {
    Ok(digits_as_decimal(args[0], 8))
}

fn reinterpret_digits(value: f64, radix: u32) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    format!("{:.0}", value.abs().trunc())
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}

fn digits_as_decimal(value: f64, radix: u32) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    let bits = value.trunc() as i64 as u64;
    let digits = match radix {
        2 => format!("{:b}", bits),
        _ => format!("{:o}", bits),
    };
    digits.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(fn_round(&[2.5]).unwrap(), 3.0);
        assert_eq!(fn_round(&[-2.5]).unwrap(), -3.0);
        assert_eq!(fn_round(&[1.2345, 2.0]).unwrap(), 1.23);
        assert_eq!(fn_round(&[1.235, 1.0]).unwrap(), 1.2);
        assert_eq!(fn_round(&[1250.0, -2.0]).unwrap(), 1300.0);
        assert_eq!(fn_round(&[1.5, 400.0]).unwrap(), 1.5);
    }

    #[test]
    fn test_round_huge_negative_precision() {
        assert_eq!(fn_round(&[1250.0, -400.0]).unwrap(), 0.0);
        assert_eq!(fn_round(&[1250.0, -320.0]).unwrap(), 0.0);

        let negative = fn_round(&[-1250.0, -400.0]).unwrap();
        assert_eq!(negative, 0.0);
        assert!(negative.is_sign_negative());
    }

    #[test]
    fn test_log() {
        assert_eq!(fn_log(&[1.0]).unwrap(), 0.0);
        assert!((fn_log(&[8.0, 2.0]).unwrap() - 3.0).abs() < 1e-12);
        assert!(fn_log(&[-1.0]).unwrap().is_nan());
    }

    #[test]
    fn test_min_max() {
        assert_eq!(fn_min(&[3.0, 1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(fn_max(&[3.0, 1.0, 2.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_base_reinterpretation() {
        assert_eq!(fn_bindec(&[1010.0]).unwrap(), 10.0);
        assert_eq!(fn_octdec(&[17.0]).unwrap(), 15.0);
        assert_eq!(fn_decbin(&[10.0]).unwrap(), 1010.0);
        assert_eq!(fn_decoct(&[15.0]).unwrap(), 17.0);
        assert_eq!(fn_decbin(&[0.0]).unwrap(), 0.0);
        assert!(fn_bindec(&[f64::INFINITY]).unwrap().is_nan());
    }

    #[test]
    fn test_predicates() {
        assert_eq!(fn_is_finite(&[1.0]).unwrap(), 1.0);
        assert_eq!(fn_is_infinite(&[f64::INFINITY]).unwrap(), 1.0);
        assert_eq!(fn_is_nan(&[f64::NAN]).unwrap(), 1.0);
        assert_eq!(fn_is_nan(&[0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_fmod_keeps_dividend_sign() {
        assert_eq!(fn_fmod(&[7.5, 2.0]).unwrap(), 1.5);
        assert_eq!(fn_fmod(&[-7.5, 2.0]).unwrap(), -1.5);
    }
}
