//! Formula parser
//!
//! A recursive descent parser for whitelisted arithmetic formulas with proper
//! operator precedence. Only the token set admitted by
//! [`find_formula_errors`](crate::validate::find_formula_errors) is
//! recognised; anything else is a parse error, never evaluated text.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};

/// Deepest nesting of parentheses, call arguments, unary operators,
/// exponents and conditional arms
const MAX_NESTING: usize = 64;

/// Most binary operators one formula may contain
const MAX_OPERATORS: usize = 512;

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use calcformat_formula::parse_formula;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("sqrt(0x10) * 2^-1").unwrap();
/// let ast = parse_formula("max(1, 2, 3) > 2 ? 1 : 0").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(formula.trim());
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Caret,
    Ampersand,
    AndAnd,
    Pipe,
    OrOr,
    Tilde,
    Bang,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    Question,
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    /// Text that cannot start any token
    Invalid(String),

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
    depth: usize,
    operators: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
            depth: 0,
            operators: 0,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Token::Eof,
        };

        if c.is_ascii_digit() || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit())) {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_identifier();
        }

        self.advance();
        match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                if self.eat('*') {
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '~' => Token::Tilde,
            '?' => Token::Question,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '&' => {
                if self.eat('&') {
                    Token::AndAnd
                } else {
                    Token::Ampersand
                }
            }
            '|' => {
                if self.eat('|') {
                    Token::OrOr
                } else {
                    Token::Pipe
                }
            }
            '!' => {
                if self.eat('=') {
                    // Accept both != and !==
                    self.eat('=');
                    Token::NotEqual
                } else {
                    Token::Bang
                }
            }
            '=' => {
                if self.eat('=') {
                    self.eat('=');
                    Token::Equal
                } else {
                    // A lone '=' would be assignment
                    Token::Invalid("=".into())
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::LessEqual
                } else if self.eat('>') {
                    Token::NotEqual
                } else if self.eat('<') {
                    Token::ShiftLeft
                } else {
                    Token::LessThan
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::GreaterEqual
                } else if self.eat('>') {
                    Token::ShiftRight
                } else {
                    Token::GreaterThan
                }
            }
            other => Token::Invalid(other.to_string()),
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Prefixed integer literal: 0b101, 0o17, 0d99, 0xff
        if self.peek_char() == Some('0') {
            let radix = match self.peek_char_at(1) {
                Some('b' | 'B') => Some(2),
                Some('o' | 'O') => Some(8),
                Some('d' | 'D') => Some(10),
                Some('x' | 'X') => Some(16),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                return self.scan_radix_digits(start, radix);
            }
        }

        // Integer part
        self.skip_digits();

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent part, only when digits actually follow
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let exponent_digit_at = match self.peek_char_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self
                .peek_char_at(exponent_digit_at)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..exponent_digit_at {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let text = &self.input[start..self.pos];
        match text.replace('_', "").parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Invalid(text.to_string()),
        }
    }

    fn scan_radix_digits(&mut self, start: usize, radix: u32) -> Token {
        let digits_start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        let digits = &self.input[digits_start..self.pos];
        let mut value = 0.0f64;
        let mut seen_digit = false;
        for c in digits.chars().filter(|&c| c != '_') {
            match c.to_digit(radix) {
                Some(d) => {
                    value = value * f64::from(radix) + f64::from(d);
                    seen_digit = true;
                }
                None => return Token::Invalid(text.to_string()),
            }
        }

        if seen_digit {
            Token::Number(value)
        } else {
            Token::Invalid(text.to_string())
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token::Identifier(self.input[start..self.pos].to_ascii_lowercase())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_digits(&mut self) {
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_digit() || c == '_')
        {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Conditional: ?:
    // 2. Logical or: ||
    // 3. Logical and: &&
    // 4. Bitwise or: |
    // 5. Bitwise and: &
    // 6. Equality: ==, !=, <>
    // 7. Comparison: <, <=, >, >=
    // 8. Shift: <<, >>
    // 9. Addition/Subtraction: +, -
    // 10. Multiplication/Division/Modulo: *, /, %
    // 11. Unary: -, +, !, ~
    // 12. Exponentiation: ^, ** (right associative, binds tighter than unary minus)
    // 13. Primary: literals, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_conditional()
    }

    /// Run `parse` one nesting level deeper
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> FormulaResult<FormulaExpr>,
    ) -> FormulaResult<FormulaExpr> {
        if self.depth >= MAX_NESTING {
            return Err(FormulaError::Parse("formula nested too deeply".to_string()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_conditional(&mut self) -> FormulaResult<FormulaExpr> {
        let condition = self.parse_logical_or()?;

        if !matches!(self.current_token(), Token::Question) {
            return Ok(condition);
        }

        self.consume();
        let then = self.nested(Self::parse_conditional)?;
        self.expect(&Token::Colon)?;
        let otherwise = self.nested(Self::parse_conditional)?;

        Ok(FormulaExpr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// Parse a left-associative chain of binary operators at one level
    fn parse_left_assoc(
        &mut self,
        operand: fn(&mut Self) -> FormulaResult<FormulaExpr>,
        operator: fn(&Token) -> Option<BinaryOperator>,
    ) -> FormulaResult<FormulaExpr> {
        let mut left = operand(self)?;

        while let Some(op) = operator(self.current_token()) {
            self.operators += 1;
            if self.operators > MAX_OPERATORS {
                return Err(FormulaError::Parse("formula has too many operators".to_string()));
            }
            self.consume();
            let right = operand(self)?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_logical_or(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_logical_and, |t| match t {
            Token::OrOr => Some(BinaryOperator::Or),
            _ => None,
        })
    }

    fn parse_logical_and(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_bit_or, |t| match t {
            Token::AndAnd => Some(BinaryOperator::And),
            _ => None,
        })
    }

    fn parse_bit_or(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_bit_and, |t| match t {
            Token::Pipe => Some(BinaryOperator::BitOr),
            _ => None,
        })
    }

    fn parse_bit_and(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_equality, |t| match t {
            Token::Ampersand => Some(BinaryOperator::BitAnd),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_comparison, |t| match t {
            Token::Equal => Some(BinaryOperator::Equal),
            Token::NotEqual => Some(BinaryOperator::NotEqual),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_shift, |t| match t {
            Token::LessThan => Some(BinaryOperator::LessThan),
            Token::LessEqual => Some(BinaryOperator::LessEqual),
            Token::GreaterThan => Some(BinaryOperator::GreaterThan),
            Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_additive, |t| match t {
            Token::ShiftLeft => Some(BinaryOperator::ShiftLeft),
            Token::ShiftRight => Some(BinaryOperator::ShiftRight),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_multiplicative, |t| match t {
            Token::Plus => Some(BinaryOperator::Add),
            Token::Minus => Some(BinaryOperator::Subtract),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_left_assoc(Self::parse_unary, |t| match t {
            Token::Star => Some(BinaryOperator::Multiply),
            Token::Slash => Some(BinaryOperator::Divide),
            Token::Percent => Some(BinaryOperator::Modulo),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Bang => UnaryOperator::Not,
            Token::Tilde => UnaryOperator::BitNot,
            Token::Plus => {
                // Prefix plus (no-op)
                self.consume();
                return self.nested(Self::parse_unary);
            }
            _ => return self.parse_power(),
        };

        self.consume();
        let operand = self.nested(Self::parse_unary)?;
        Ok(FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_primary()?;

        if matches!(self.current_token(), Token::Caret | Token::StarStar) {
            self.consume();
            // Right associative; the exponent may carry its own sign (2^-1)
            let right = self.nested(Self::parse_unary)?;
            return Ok(FormulaExpr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume();
                Ok(FormulaExpr::Number(n))
            }

            Token::LeftParen => {
                self.consume();
                let expr = self.nested(Self::parse_expression)?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Identifier(name) => {
                self.consume();
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Err(FormulaError::Parse(format!("Unknown identifier '{}'", name)))
                }
            }

            Token::Invalid(text) => Err(FormulaError::Parse(format!(
                "Unexpected text '{}'",
                text
            ))),

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.nested(Self::parse_expression)?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.nested(Self::parse_expression)?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(FormulaExpr::Function { name, args })
    }
}
