//! Property tests: displayed answers read back as the value they display

use calcformat::prelude::*;
use proptest::prelude::*;

/// A base, widths, and a value exactly representable in those widths
fn representable() -> impl Strategy<Value = (u32, u32, u32, f64)> {
    (
        prop::sample::select(vec![2u32, 8, 10, 16]),
        0u32..=5,
        0u32..=5,
    )
        .prop_flat_map(|(base, int, frac)| {
            let scale = f64::from(base).powi(frac as i32);
            let limit = f64::from(base).powi(int.max(1) as i32) * scale;
            (
                Just(base),
                Just(int),
                Just(frac),
                (0u64..limit as u64, any::<bool>()),
            )
                .prop_map(move |(base, int, frac, (mantissa, negative))| {
                    let value = mantissa as f64 / scale;
                    (base, int, frac, if negative { -value } else { value })
                })
        })
}

/// A base, a significant-digit count and a non-zero value
fn significant() -> impl Strategy<Value = (u32, u32, f64)> {
    (
        prop::sample::select(vec![2u32, 8, 10, 16]),
        1u32..=6,
        1e-3f64..1e6,
        any::<bool>(),
    )
        .prop_map(|(base, digits, magnitude, negative)| {
            (base, digits, if negative { -magnitude } else { magnitude })
        })
}

/// Half a unit in the last significant place of `value`
fn half_unit(value: f64, base: u32, digits: u32) -> f64 {
    let b = f64::from(base);
    let magnitude = value.abs();
    let mut exponent = (magnitude.ln() / b.ln()).floor() as i32;
    while b.powi(exponent) > magnitude {
        exponent -= 1;
    }
    while b.powi(exponent + 1) <= magnitude {
        exponent += 1;
    }
    0.5 * b.powi(exponent - digits as i32 + 1)
}

fn processor(spec: &NumberFormatSpec) -> AnswerProcessor {
    AnswerProcessor::new(spec.clone(), UnitTable::new(), NumberLocale::default()).unwrap()
}

proptest! {
    #[test]
    fn prop_parse_to_float_inverts_format((base, int, frac, value) in representable()) {
        let spec = NumberFormatSpec::new(base, int, frac).unwrap();
        let processor = AnswerProcessor::new(spec.clone(), UnitTable::new(), NumberLocale::default()).unwrap();

        let text = format_in_base(value, &spec);
        let parsed = processor.parse_to_float(&text, base);
        prop_assert!(parsed.is_some(), "{} did not parse", text);

        let parsed = parsed.unwrap();
        let bound = 10f64.powi(-(frac as i32));
        prop_assert!((parsed - value).abs() <= bound, "{} read back as {}, expected {}", text, parsed, value);
    }

    #[test]
    fn prop_grouped_prefixed_round_trip((base, int, frac, value) in representable()) {
        let spec = NumberFormatSpec::new(base, int, frac)
            .unwrap()
            .with_group_digits(true)
            .with_base_prefix(true);
        let processor = AnswerProcessor::new(spec.clone(), UnitTable::new(), NumberLocale::default()).unwrap();

        let text = format_in_base(value, &spec);
        let parsed = processor.parse_to_float(&text, base).unwrap();
        prop_assert!((parsed - value).abs() <= 10f64.powi(-(frac as i32)));
    }

    #[test]
    fn prop_exact_digits_accept_own_display((base, int, frac, value) in representable()) {
        prop_assume!(int > 0);
        let spec = NumberFormatSpec::new(base, int, frac)
            .unwrap()
            .with_exact_digits(true);

        let text = format_in_base(value, &spec);
        let parsed = processor(&spec).parse_to_float(&text, base);
        prop_assert!(parsed.is_some(), "{} rejected", text);
        prop_assert!((parsed.unwrap() - value).abs() <= 10f64.powi(-(frac as i32)));
    }

    #[test]
    fn prop_significant_figures_round_trip((base, digits, value) in significant()) {
        let spec = NumberFormatSpec::significant_figures(base, digits).unwrap();

        let text = format_in_base(value, &spec);
        let parsed = processor(&spec).parse_to_float(&text, base);
        prop_assert!(parsed.is_some(), "{} did not parse", text);

        let error = (parsed.unwrap() - value).abs();
        let bound = half_unit(value, base, digits) + 1e-12 * value.abs();
        prop_assert!(error <= bound, "{} read back {} from {} (bound {})", text, parsed.unwrap(), value, bound);
    }

    #[test]
    fn prop_exact_significant_figures_accept_own_display((base, digits, value) in significant()) {
        let spec = NumberFormatSpec::significant_figures(base, digits)
            .unwrap()
            .with_exact_digits(true);

        let text = format_in_base(value, &spec);
        let parsed = processor(&spec).parse_to_float(&text, base);
        prop_assert!(parsed.is_some(), "{} rejected with {} significant figures", text, digits);
    }

    #[test]
    fn prop_value_within_own_interval(value in -1e6f64..1e6, tolerance in 0.0f64..10.0) {
        for spec in [
            ToleranceSpec::relative(tolerance).unwrap(),
            ToleranceSpec::nominal(tolerance).unwrap(),
            ToleranceSpec::geometric(tolerance).unwrap(),
        ] {
            let interval = spec.interval(value);
            prop_assert!(interval.min <= interval.max);
            prop_assert!(interval.contains(value));
        }
    }
}
