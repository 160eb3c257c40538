//! Whitelisted formula functions
//!
//! The registry is the single source of truth for which functions a formula
//! may call and how many arguments each accepts. The validator reads arity
//! bounds from it and the evaluator dispatches through it.

pub mod math;

use crate::error::FormulaResult;
use ahash::AHashMap;
use std::sync::OnceLock;

/// Function implementation signature
pub type FunctionImpl = fn(&[f64]) -> FormulaResult<f64>;

/// Function definition
pub struct FunctionDef {
    /// Function name (lowercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    /// Whether a call with `count` arguments is well-formed
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human readable arity, used in error messages
    pub fn arity(&self) -> &'static str {
        match (self.min_args, self.max_args) {
            (0, Some(0)) => "no arguments",
            (1, Some(1)) => "exactly one argument",
            (1, Some(2)) => "one or two arguments",
            (2, Some(2)) => "exactly two arguments",
            (2, None) => "at least two arguments",
            _ => "a different number of arguments",
        }
    }
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The process-wide registry of whitelisted functions
pub fn registry() -> &'static FunctionRegistry {
    REGISTRY.get_or_init(FunctionRegistry::new)
}

impl FunctionRegistry {
    /// Create a registry holding every whitelisted function
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_constants();
        registry.register_unary_functions();
        registry.register_binary_functions();
        registry.register_variadic_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name.to_ascii_lowercase().as_str())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    /// Names of every registered function, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn register_fixed(&mut self, name: &'static str, args: usize, implementation: FunctionImpl) {
        self.register(FunctionDef {
            name,
            min_args: args,
            max_args: Some(args),
            implementation,
        });
    }

    fn register_constants(&mut self) {
        self.register_fixed("pi", 0, math::fn_pi);
    }

    fn register_unary_functions(&mut self) {
        let unary: [(&'static str, FunctionImpl); 29] = [
            ("abs", math::fn_abs),
            ("acos", math::fn_acos),
            ("acosh", math::fn_acosh),
            ("asin", math::fn_asin),
            ("asinh", math::fn_asinh),
            ("atan", math::fn_atan),
            ("atanh", math::fn_atanh),
            ("bindec", math::fn_bindec),
            ("ceil", math::fn_ceil),
            ("cos", math::fn_cos),
            ("cosh", math::fn_cosh),
            ("decbin", math::fn_decbin),
            ("decoct", math::fn_decoct),
            ("deg2rad", math::fn_deg2rad),
            ("exp", math::fn_exp),
            ("expm1", math::fn_expm1),
            ("floor", math::fn_floor),
            ("is_finite", math::fn_is_finite),
            ("is_infinite", math::fn_is_infinite),
            ("is_nan", math::fn_is_nan),
            ("log10", math::fn_log10),
            ("log1p", math::fn_log1p),
            ("octdec", math::fn_octdec),
            ("rad2deg", math::fn_rad2deg),
            ("sin", math::fn_sin),
            ("sinh", math::fn_sinh),
            ("sqrt", math::fn_sqrt),
            ("tan", math::fn_tan),
            ("tanh", math::fn_tanh),
        ];
        for (name, implementation) in unary {
            self.register_fixed(name, 1, implementation);
        }

        // One required argument, one optional
        self.register(FunctionDef {
            name: "log",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_log,
        });
        self.register(FunctionDef {
            name: "round",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });
    }

    fn register_binary_functions(&mut self) {
        self.register_fixed("atan2", 2, math::fn_atan2);
        self.register_fixed("fmod", 2, math::fn_fmod);
        self.register_fixed("pow", 2, math::fn_pow);
    }

    fn register_variadic_functions(&mut self) {
        self.register(FunctionDef {
            name: "min",
            min_args: 2,
            max_args: None,
            implementation: math::fn_min,
        });
        self.register(FunctionDef {
            name: "max",
            min_args: 2,
            max_args: None,
            implementation: math::fn_max,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        let registry = registry();
        assert_eq!(registry.len(), 37);
        assert!(registry.get("SQRT").is_some());
        assert!(registry.get("eval").is_none());
        assert!(registry.get("sum").is_none());
    }

    #[test]
    fn test_arity_bounds() {
        let registry = registry();

        let pi = registry.get("pi").unwrap();
        assert!(pi.accepts(0));
        assert!(!pi.accepts(1));

        let round = registry.get("round").unwrap();
        assert!(!round.accepts(0));
        assert!(round.accepts(1));
        assert!(round.accepts(2));
        assert!(!round.accepts(3));
        assert_eq!(round.arity(), "one or two arguments");

        let max = registry.get("max").unwrap();
        assert!(!max.accepts(1));
        assert!(max.accepts(2));
        assert!(max.accepts(10));
        assert_eq!(max.arity(), "at least two arguments");
    }

    #[test]
    fn test_names_sorted() {
        let names = registry().names();
        assert_eq!(names.first(), Some(&"abs"));
        assert_eq!(names.last(), Some(&"tanh"));
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }
}
