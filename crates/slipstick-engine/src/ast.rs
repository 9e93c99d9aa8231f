//! Spanned expression tree for slide-rule equations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range into the source text, used for error highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Parse-stage failure: an unsupported operator, a bad token, or a
/// malformed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at {}..{})",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}

/// The three operators an equation may use. They share one precedence
/// level and associate left, because that is how work flows on the
/// instrument: each operation consumes the previous reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Functions with a dedicated scale (or scale pairing) on the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryFunc {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
}

impl UnaryFunc {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UnaryFunc::Sqrt => "sqrt",
            UnaryFunc::Sin => "sin",
            UnaryFunc::Cos => "cos",
            UnaryFunc::Tan => "tan",
            UnaryFunc::Log => "log",
            UnaryFunc::Ln => "ln",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "sqrt" => Some(UnaryFunc::Sqrt),
            "sin" => Some(UnaryFunc::Sin),
            "cos" => Some(UnaryFunc::Cos),
            "tan" => Some(UnaryFunc::Tan),
            "log" => Some(UnaryFunc::Log),
            "ln" => Some(UnaryFunc::Ln),
            _ => None,
        }
    }
}

/// Named constants the lexer accepts in place of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }
}

/// A parsed equation. Every node keeps its source span so later stages can
/// point at the exact text that caused a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    Name {
        constant: Constant,
        span: Span,
    },
    /// Prefix minus. Infix minus is rejected outright, but a sign is fine:
    /// `10^-3` and `sqrt(-4)` both parse (the latter dies in the domain
    /// pass instead).
    UnaryMinus {
        operand: Box<Expr>,
        span: Span,
    },
    Call {
        func: UnaryFunc,
        arg: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Name { span, .. }
            | Expr::UnaryMinus { span, .. }
            | Expr::Call { span, .. }
            | Expr::Binary { span, .. } => *span,
        }
    }
}
