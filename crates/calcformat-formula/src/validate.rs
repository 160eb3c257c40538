//! Formula validation
//!
//! A formula is checked against a character and function whitelist before it
//! is ever parsed. Function calls are located innermost-first, checked
//! against the registry and collapsed to `1`; whatever text remains must be
//! made only of numerals and operator symbols.

use crate::error::{FormulaError, FormulaResult};
use crate::functions::registry;
use lazy_regex::regex;
use std::collections::BTreeSet;
use tracing::debug;

/// Check a formula for syntax and whitelist violations.
///
/// Returns `None` when the formula might be valid. `{name}` placeholders are
/// treated as numbers, so a formula referring to an unknown variable still
/// validates and only fails once evaluated.
///
/// # Example
/// ```rust
/// use calcformat_formula::{find_formula_errors, FormulaError};
///
/// assert_eq!(find_formula_errors("sqrt({a}) + 2"), None);
/// assert!(matches!(
///     find_formula_errors("system(1)"),
///     Some(FormulaError::UnsupportedFunction(_))
/// ));
/// ```
pub fn find_formula_errors(formula: &str) -> Option<FormulaError> {
    // Placeholders behave like numbers
    let mut formula = formula.to_string();
    let placeholder = regex!(r#"\{[[:alpha:]][^>} <{"']*\}"#);
    while placeholder.is_match(&formula) {
        formula = placeholder.replace_all(&formula, "1").into_owned();
    }

    let mut formula = formula.replace(' ', "").to_lowercase();

    let call = regex!(
        r"(^|[\-+/*%>:^~<?=&|!,(])([a-z0-9_]*)\(([\-+/*%>:^~<?=&|!.0-9a-fA-F_bodxBODX]+(,[\-+/*%>:^~<?=&|!.0-9a-fA-F_bodxBODX]+((,[\-+/*%>:^~<?=&|!.0-9a-fA-F_bodxBODX]+)+)?)?)?\)"
    );

    while let Some(caps) = call.captures(&formula) {
        let whole = caps.get(0).map_or("", |m| m.as_str()).to_string();
        let prefix = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let name = caps.get(2).map_or("", |m| m.as_str());
        let args = caps.get(3).map_or("", |m| m.as_str());
        let count = if args.is_empty() {
            0
        } else {
            args.split(',').count()
        };

        if name.is_empty() {
            // Plain grouping parentheses hold exactly one expression
            if count != 1 {
                return Some(illegal_syntax(whole));
            }
        } else {
            match registry().get(name) {
                Some(def) if def.accepts(count) => {}
                Some(def) => {
                    debug!(function = def.name, count, "wrong number of arguments");
                    return Some(FormulaError::WrongArity {
                        function: def.name.to_string(),
                        expected: def.arity(),
                    });
                }
                None => {
                    debug!(function = name, "function is not whitelisted");
                    return Some(FormulaError::UnsupportedFunction(name.to_string()));
                }
            }
        }

        // Collapse the call, keeping the operator in front of it
        formula = formula.replace(&whole, &format!("{}1", prefix));
    }

    let illegal = regex!(r"[^\-+/*%>:^~<?=&|!.0-9a-fA-F_bdoxBDOX]+");
    illegal
        .find(&formula)
        .map(|m| illegal_syntax(m.as_str().to_string()))
}

/// [`find_formula_errors`] as a `Result`
pub fn validate_formula(formula: &str) -> FormulaResult<()> {
    match find_formula_errors(formula) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn illegal_syntax(text: String) -> FormulaError {
    debug!(text = %text, "illegal formula syntax");
    FormulaError::IllegalSyntax(text)
}

/// Collect the `{name}` dataset names used in a text
///
/// ```rust
/// use calcformat_formula::find_dataset_names;
///
/// let names = find_dataset_names("{b} * {a} + {b}");
/// assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
/// ```
pub fn find_dataset_names(text: &str) -> BTreeSet<String> {
    regex!(r#"\{([[:alpha:]][^>} <{"']*)\}"#)
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Check every `{=formula}` embedded in a text.
///
/// Dataset names used anywhere in the text are replaced by `1` first. Returns
/// each failing embedded formula together with its error, in order of
/// appearance.
pub fn find_embedded_formula_errors(text: &str) -> Vec<(String, FormulaError)> {
    let mut remaining = text.to_string();
    for name in find_dataset_names(text) {
        remaining = remaining.replace(&format!("{{{}}}", name), "1");
    }

    regex!(r"\{=([^[:space:]}]*)\}")
        .captures_iter(&remaining)
        .filter_map(|caps| {
            let formula = caps.get(1)?.as_str();
            if formula.is_empty() {
                return None;
            }
            find_formula_errors(formula).map(|error| (formula.to_string(), error))
        })
        .collect()
}

/// Require that at least one of a set of answer formulas uses a dataset name
pub fn require_wildcards<'a, I>(formulas: I) -> FormulaResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    if formulas
        .into_iter()
        .any(|formula| !find_dataset_names(formula).is_empty())
    {
        Ok(())
    } else {
        Err(FormulaError::MissingWildcard)
    }
}
