//! Dataset substitution
//!
//! A [`DatasetItem`] binds wildcard names to numbers. [`substitute`] writes
//! those numbers into a formula in place of their `{name}` placeholders.

use lazy_regex::regex;
use std::collections::BTreeMap;

/// The wildcard formula: any answer is accepted
pub const ANY_VALUE: &str = "*";

/// Whether a formula is the "any answer" wildcard
pub fn is_wildcard(formula: &str) -> bool {
    formula.trim() == ANY_VALUE
}

/// One set of values for the dataset names used by a formula
///
/// Names are matched exactly (case-sensitive) and never contain whitespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetItem {
    values: BTreeMap<String, f64>,
}

impl DatasetItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind a name, returning the value it previously had
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for DatasetItem {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Replace every bound `{name}` placeholder with its value.
///
/// Values are written as the shortest decimal text that reads back to the
/// same `f64`; negative values are parenthesised so `{x}^2` keeps its
/// meaning. Placeholders without a binding are left untouched.
///
/// ```rust
/// use calcformat_formula::{substitute, DatasetItem};
///
/// let data = DatasetItem::new().with("x", -3.0);
/// assert_eq!(substitute("{x}^2 + {y}", &data), "(-3.0)^2 + {y}");
/// ```
pub fn substitute(formula: &str, data: &DatasetItem) -> String {
    regex!(r#"\{([[:alpha:]][^>} <{"']*)\}"#)
        .replace_all(formula, |caps: &regex::Captures| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            match data.get(name) {
                Some(value) => format_value(value),
                None => caps.get(0).map_or("", |m| m.as_str()).to_string(),
            }
        })
        .into_owned()
}

fn format_value(value: f64) -> String {
    if value.is_sign_negative() && value != 0.0 {
        format!("({:?})", value)
    } else {
        // Normalise -0.0
        format!("{:?}", value.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitute() {
        let data: DatasetItem = [("a", 2.0), ("b", 0.5)].into_iter().collect();
        assert_eq!(substitute("{a} * {b}", &data), "2.0 * 0.5");
        assert_eq!(substitute("{a}+{a}", &data), "2.0+2.0");
        assert_eq!(substitute("{c} + 1", &data), "{c} + 1");
    }

    #[test]
    fn test_substitute_negative_and_extreme_values() {
        let data = DatasetItem::new()
            .with("neg", -1.5)
            .with("zero", -0.0)
            .with("big", 1e300)
            .with("tiny", 0.1 + 0.2);
        assert_eq!(substitute("{neg}", &data), "(-1.5)");
        assert_eq!(substitute("{zero}", &data), "0.0");
        assert_eq!(substitute("{big}", &data), "1e300");
        assert_eq!(substitute("{tiny}", &data), "0.30000000000000004");
    }

    #[test]
    fn test_wildcard() {
        assert!(is_wildcard("*"));
        assert!(is_wildcard(" * "));
        assert!(!is_wildcard("2*3"));
        let data = DatasetItem::new().with("x", 1.0);
        assert_eq!(substitute("*", &data), "*");
    }

    #[test]
    fn test_dataset_item() {
        let mut data = DatasetItem::new();
        assert!(data.is_empty());
        assert_eq!(data.insert("x", 1.0), None);
        assert_eq!(data.insert("x", 2.0), Some(1.0));
        assert_eq!(data.get("x"), Some(2.0));
        assert!(!data.contains("X"));
        assert_eq!(data.iter().collect::<Vec<_>>(), vec![("x", 2.0)]);
    }
}
