//! Formula Abstract Syntax Tree types

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
    /// `condition ? then : otherwise`
    Conditional {
        condition: Box<FormulaExpr>,
        then: Box<FormulaExpr>,
        otherwise: Box<FormulaExpr>,
    },

    /// Whitelisted function call (name is lowercase)
    Function { name: String, args: Vec<FormulaExpr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Logical
    And,
    Or,

    // Bitwise (integer-truncated operands)
    BitAnd,
    BitOr,
    ShiftLeft,
    ShiftRight,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
    BitNot,
}
