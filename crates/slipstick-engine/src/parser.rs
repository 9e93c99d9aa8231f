//! Equation lexer and parser.
//!
//! The grammar is deliberately flat: `*`, `/` and `^` share one precedence
//! level and associate left, so `2*3^2` means `(2*3)^2 = 36`. `**` is
//! accepted as an alias for `^`. `+` and infix `-` are rejected with a
//! message explaining that the instrument has no addition scales; a leading
//! `-` is a sign and parses as [`Expr::UnaryMinus`].

use crate::ast::{BinaryOp, Constant, Expr, ParseError, Span, UnaryFunc};

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident,
    Star,
    Slash,
    Caret,
    Minus,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Token {
    kind: TokenKind,
    span: Span,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.pos;
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c.is_ascii_digit()
                || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit()))
            {
                tokens.push(self.number(start)?);
                continue;
            }
            if c.is_ascii_alphabetic() || c == '_' {
                self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    span: Span::new(start, self.pos),
                });
                continue;
            }
            self.bump();
            let kind = match c {
                '*' => {
                    if self.peek() == Some('*') {
                        // `**` is an alias for `^`
                        self.bump();
                        TokenKind::Caret
                    } else {
                        TokenKind::Star
                    }
                }
                '/' => TokenKind::Slash,
                '^' => TokenKind::Caret,
                '-' => TokenKind::Minus,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '+' => {
                    return Err(ParseError::new(
                        "Addition is not supported on a slide rule",
                        Span::new(start, self.pos),
                    ));
                }
                other => {
                    return Err(ParseError::new(
                        format!("Unexpected character: {other}"),
                        Span::new(start, self.pos),
                    ));
                }
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
            });
        }
        Ok(tokens)
    }

    /// Consumes digits with at most one decimal point, starting at `start`.
    fn number(&mut self, start: usize) -> Result<Token, ParseError> {
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') {
            self.bump();
            self.take_while(|c| c.is_ascii_digit());
        }
        let span = Span::new(start, self.pos);
        let value: f64 = self.src[start..self.pos]
            .parse()
            .map_err(|_| ParseError::new("Invalid number", span))?;
        Ok(Token { kind: TokenKind::Number(value), span })
    }
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn end_span(&self) -> Span {
        Span::new(self.src.len(), self.src.len())
    }

    fn text(&self, span: Span) -> &'a str {
        &self.src[span.start..span.end]
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Caret => BinaryOp::Pow,
                TokenKind::Minus => {
                    return Err(ParseError::new(
                        "Subtraction is not supported on a slide rule",
                        token.span,
                    ));
                }
                _ => break,
            };
            self.pos += 1;
            if self.peek().is_none() {
                return Err(ParseError::new(
                    format!("Missing expression after {}", op.symbol()),
                    token.span,
                ));
            }
            let right = self.parse_factor()?;
            let span = Span::new(left.span().start, right.span().end);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.bump() else {
            return Err(ParseError::new(
                "Expected number, function, or (",
                self.end_span(),
            ));
        };
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number { value, span: token.span }),
            TokenKind::Minus => {
                let operand = self.parse_factor()?;
                let span = Span::new(token.span.start, operand.span().end);
                Ok(Expr::UnaryMinus { operand: Box::new(operand), span })
            }
            TokenKind::Ident => self.parse_name(token),
            TokenKind::LParen => {
                if self.at_rparen_or_end() {
                    return Err(ParseError::new(
                        "Expected expression after (",
                        self.next_span(),
                    ));
                }
                let inner = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            _ => Err(ParseError::new(
                "Expected number, function, or (",
                token.span,
            )),
        }
    }

    fn parse_name(&mut self, token: Token) -> Result<Expr, ParseError> {
        let name = self.text(token.span);
        if let Some(constant) = Constant::from_name(name) {
            return Ok(Expr::Name { constant, span: token.span });
        }
        let Some(func) = UnaryFunc::from_name(name) else {
            return Err(ParseError::new(
                format!("Unknown identifier: {name}"),
                token.span,
            ));
        };
        match self.peek() {
            Some(t) if t.kind == TokenKind::LParen => {
                self.pos += 1;
            }
            _ => {
                return Err(ParseError::new(
                    format!("Expected ( after {name}"),
                    token.span,
                ));
            }
        }
        if self.at_rparen_or_end() {
            return Err(ParseError::new(
                format!("Expected expression after {name}("),
                self.next_span(),
            ));
        }
        let arg = self.parse_expr()?;
        let close = self.expect_rparen()?;
        // The call's span runs through the closing paren.
        Ok(Expr::Call {
            func,
            arg: Box::new(arg),
            span: Span::new(token.span.start, close.end),
        })
    }

    fn at_rparen_or_end(&self) -> bool {
        match self.peek() {
            Some(t) => t.kind == TokenKind::RParen,
            None => true,
        }
    }

    fn next_span(&self) -> Span {
        self.peek().map_or_else(|| self.end_span(), |t| t.span)
    }

    fn expect_rparen(&mut self) -> Result<Span, ParseError> {
        match self.bump() {
            Some(t) if t.kind == TokenKind::RParen => Ok(t.span),
            Some(t) => Err(ParseError::new("Expected )", t.span)),
            None => Err(ParseError::new("Expected )", self.end_span())),
        }
    }
}

/// Parses an equation into a spanned AST.
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    if src.trim().is_empty() {
        return Err(ParseError::new(
            "Empty or invalid expression",
            Span::new(0, src.len()),
        ));
    }
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser { src, tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if let Some(extra) = parser.peek() {
        return Err(ParseError::new("Unexpected token", extra.span));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn err(src: &str) -> ParseError {
        match parse(src) {
            Err(e) => e,
            Ok(expr) => panic!("expected {src:?} to fail, parsed {expr:?}"),
        }
    }

    #[test]
    fn single_number() {
        let expr = parse("42").unwrap();
        assert_eq!(
            expr,
            Expr::Number { value: 42.0, span: Span::new(0, 2) }
        );
    }

    #[test]
    fn leading_dot_number() {
        let expr = parse(".5").unwrap();
        assert_eq!(expr, Expr::Number { value: 0.5, span: Span::new(0, 2) });
    }

    #[test]
    fn operators_share_one_precedence_level() {
        // (2*3)^2, never 2*(3^2)
        let expr = parse("2*3^2").unwrap();
        let Expr::Binary { op: BinaryOp::Pow, left, right, .. } = expr else {
            panic!("expected the power to be outermost: {expr:?}");
        };
        assert!(matches!(
            *left,
            Expr::Binary { op: BinaryOp::Mul, .. }
        ));
        assert!(matches!(*right, Expr::Number { value, .. } if value == 2.0));
    }

    #[test]
    fn double_star_is_power() {
        let expr = parse("2**3").unwrap();
        let Expr::Binary { op, left, right, .. } = expr else {
            panic!("expected a binary node: {expr:?}");
        };
        assert_eq!(op, BinaryOp::Pow);
        assert!(matches!(*left, Expr::Number { value, .. } if value == 2.0));
        assert!(matches!(*right, Expr::Number { value, .. } if value == 3.0));
    }

    #[test]
    fn addition_is_rejected_at_the_lexer() {
        let e = err("3+2");
        assert_eq!(e.message, "Addition is not supported on a slide rule");
        assert_eq!(e.span, Span::new(1, 2));
    }

    #[test]
    fn infix_subtraction_is_rejected() {
        let e = err("3-2");
        assert_eq!(e.message, "Subtraction is not supported on a slide rule");
        assert_eq!(e.span, Span::new(1, 2));
    }

    #[test]
    fn leading_minus_is_a_sign() {
        let expr = parse("-3").unwrap();
        assert!(matches!(expr, Expr::UnaryMinus { .. }));
        assert_eq!(expr.span(), Span::new(0, 2));
    }

    #[test]
    fn negative_exponent_parses() {
        let expr = parse("10^-3").unwrap();
        let Expr::Binary { op: BinaryOp::Pow, right, .. } = expr else {
            panic!("expected a power: {expr:?}");
        };
        assert!(matches!(*right, Expr::UnaryMinus { .. }));
    }

    #[test]
    fn call_span_runs_through_the_closing_paren() {
        let expr = parse("sqrt(16)").unwrap();
        assert_eq!(expr.span(), Span::new(0, 8));
        let Expr::Call { func, arg, .. } = expr else {
            panic!("expected a call: {expr:?}");
        };
        assert_eq!(func, UnaryFunc::Sqrt);
        assert_eq!(arg.span(), Span::new(5, 7));
    }

    #[test]
    fn function_names_are_case_insensitive() {
        assert!(parse("SQRT(16)").is_ok());
        assert!(parse("Sin(30)").is_ok());
    }

    #[test]
    fn constants_parse_as_names() {
        let expr = parse("2*pi").unwrap();
        let Expr::Binary { right, .. } = expr else {
            panic!("expected a product: {expr:?}");
        };
        assert!(matches!(*right, Expr::Name { constant: Constant::Pi, .. }));
    }

    #[test]
    fn parens_group_without_their_own_node() {
        let expr = parse("2*(3/4)").unwrap();
        let Expr::Binary { op: BinaryOp::Mul, right, .. } = expr else {
            panic!("expected the product outermost: {expr:?}");
        };
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Div, .. }));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(err("").message, "Empty or invalid expression");
        assert_eq!(err("   ").message, "Empty or invalid expression");
    }

    #[test]
    fn unknown_identifier_is_spanned() {
        let e = err("2*foo");
        assert_eq!(e.message, "Unknown identifier: foo");
        assert_eq!(e.span, Span::new(2, 5));
    }

    #[test]
    fn function_requires_parens() {
        assert_eq!(err("sqrt 16").message, "Expected ( after sqrt");
        assert_eq!(err("sin(").message, "Expected expression after sin(");
        assert_eq!(err("sin()").message, "Expected expression after sin(");
        assert_eq!(err("sin(30").message, "Expected )");
    }

    #[test]
    fn missing_factor_lists_the_accepted_forms() {
        assert_eq!(err("*2").message, "Expected number, function, or (");
        assert_eq!(err("2*)").message, "Expected number, function, or (");
        assert_eq!(err("(").message, "Expected expression after (");
        assert_eq!(err("()").message, "Expected expression after (");
    }

    #[test]
    fn trailing_operator_is_reported() {
        let e = err("2*");
        assert_eq!(e.message, "Missing expression after *");
        assert_eq!(e.span, Span::new(1, 2));
    }

    #[test]
    fn adjacent_values_are_rejected() {
        assert_eq!(err("2 3").message, "Unexpected token");
    }

    #[test]
    fn unexpected_character_is_spanned() {
        let e = err("2&3");
        assert_eq!(e.message, "Unexpected character: &");
        assert_eq!(e.span, Span::new(1, 2));
    }

    #[test]
    fn lexical_errors_are_stable_across_reparses() {
        for src in ["3+2", "2&3", "3-2"] {
            let first = err(src);
            let second = err(src);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn lexical_error_spans_reparse_to_the_same_class() {
        // Re-parsing just the reported slice reproduces the same message for
        // lexer-level rejections; spans from deeper parse errors point at
        // tokens that are innocent in isolation.
        for src in ["3+2", "2&3", "12*3+4", "9&&2"] {
            let first = err(src);
            let second = err(&src[first.span.start..first.span.end]);
            assert_eq!(first.message, second.message);
        }
    }
}
