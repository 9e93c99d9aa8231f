//! Pure evaluation and the pre-emission domain pass.
//!
//! Everything the instrument will be asked to do is computed here first, so
//! a tutorial either emits completely or not at all. The walk reports the
//! innermost failure with the span of the subexpression that caused it.

use crate::ast::{BinaryOp, Expr, Span, UnaryFunc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain-stage failure: the text parses, but the value cannot be computed
/// in real numbers (or at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainError {
    pub message: String,
    pub span: Span,
}

impl DomainError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at {}..{})",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for DomainError {}

/// Evaluates the tree numerically. Angles are in degrees, matching the S,
/// T and ST engravings. Out-of-domain operations yield NaN; callers that
/// need a diagnostic run [`check_domain`] instead.
#[must_use]
pub fn evaluate(expr: &Expr) -> f64 {
    match expr {
        Expr::Number { value, .. } => *value,
        Expr::Name { constant, .. } => constant.value(),
        Expr::UnaryMinus { operand, .. } => -evaluate(operand),
        Expr::Call { func, arg, .. } => apply_function(*func, evaluate(arg)),
        Expr::Binary { op, left, right, .. } => {
            let l = evaluate(left);
            let r = evaluate(right);
            match op {
                BinaryOp::Mul => l * r,
                BinaryOp::Div => {
                    if r == 0.0 {
                        f64::NAN
                    } else {
                        l / r
                    }
                }
                BinaryOp::Pow => l.powf(r),
            }
        }
    }
}

fn apply_function(func: UnaryFunc, x: f64) -> f64 {
    match func {
        UnaryFunc::Sqrt => {
            if x < 0.0 {
                f64::NAN
            } else {
                x.sqrt()
            }
        }
        UnaryFunc::Sin => x.to_radians().sin(),
        UnaryFunc::Cos => x.to_radians().cos(),
        UnaryFunc::Tan => x.to_radians().tan(),
        UnaryFunc::Log => {
            if x <= 0.0 {
                f64::NAN
            } else {
                x.log10()
            }
        }
        UnaryFunc::Ln => {
            if x <= 0.0 {
                f64::NAN
            } else {
                x.ln()
            }
        }
    }
}

/// Walks the tree bottom-up and reports the first operation that cannot be
/// carried out, with the span of the offending subexpression. Returns the
/// final value on success; every intermediate is finite by then.
pub fn check_domain(expr: &Expr) -> Result<f64, DomainError> {
    let value = match expr {
        Expr::Number { value, .. } => *value,
        Expr::Name { constant, .. } => constant.value(),
        Expr::UnaryMinus { operand, .. } => -check_domain(operand)?,
        Expr::Call { func, arg, .. } => {
            let a = check_domain(arg)?;
            match func {
                UnaryFunc::Sqrt if a < 0.0 => {
                    return Err(DomainError::new(
                        "Square root of a negative number",
                        arg.span(),
                    ));
                }
                UnaryFunc::Log | UnaryFunc::Ln if a <= 0.0 => {
                    return Err(DomainError::new(
                        "Logarithm requires a positive argument",
                        arg.span(),
                    ));
                }
                _ => {}
            }
            apply_function(*func, a)
        }
        Expr::Binary { op, left, right, .. } => {
            let l = check_domain(left)?;
            let r = check_domain(right)?;
            if *op == BinaryOp::Div && r == 0.0 {
                return Err(DomainError::new("Division by zero", right.span()));
            }
            match op {
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Pow => l.powf(r),
            }
        }
    };
    finite_or_err(value, expr.span())?;
    Ok(value)
}

fn finite_or_err(value: f64, span: Span) -> Result<(), DomainError> {
    if value.is_nan() {
        return Err(DomainError::new("Invalid result (e.g. domain error)", span));
    }
    if value.is_infinite() {
        return Err(DomainError::new("Result is too large to represent", span));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn value_of(src: &str) -> f64 {
        check_domain(&parse(src).unwrap()).unwrap()
    }

    fn domain_err(src: &str) -> DomainError {
        match check_domain(&parse(src).unwrap()) {
            Err(e) => e,
            Ok(v) => panic!("expected {src:?} to fail, got {v}"),
        }
    }

    #[test]
    fn left_to_right_evaluation() {
        assert!((value_of("2*3^2") - 36.0).abs() < 1e-12);
        assert!((value_of("2*3.5") - 7.0).abs() < 1e-12);
        assert!((value_of("1/7/3") - 1.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn trig_works_in_degrees() {
        assert!((value_of("sin(30)") - 0.5).abs() < 1e-12);
        assert!((value_of("cos(60)") - 0.5).abs() < 1e-12);
        assert!((value_of("tan(45)") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constants_evaluate() {
        assert!((value_of("2*pi") - 2.0 * std::f64::consts::PI).abs() < 1e-12);
        assert!((value_of("ln(e)") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn division_by_zero_points_at_the_divisor() {
        let e = domain_err("10/0");
        assert_eq!(e.message, "Division by zero");
        assert_eq!(e.span, Span::new(3, 4));
    }

    #[test]
    fn division_by_a_zero_expression_points_at_it() {
        // the divisor is itself a parenthesized expression
        let e = domain_err("10/(5*0)");
        assert_eq!(e.message, "Division by zero");
        assert_eq!(e.span, Span::new(4, 7));
    }

    #[test]
    fn negative_square_root_points_at_the_argument() {
        let e = domain_err("sqrt(-4)");
        assert_eq!(e.message, "Square root of a negative number");
        assert_eq!(e.span, Span::new(5, 7));
    }

    #[test]
    fn log_of_nonpositive_is_rejected() {
        assert_eq!(
            domain_err("log(0)").message,
            "Logarithm requires a positive argument"
        );
        assert_eq!(
            domain_err("ln(-2)").message,
            "Logarithm requires a positive argument"
        );
    }

    #[test]
    fn nan_power_is_reported_at_the_binary_node() {
        let e = domain_err("(-2)^0.5");
        assert_eq!(e.message, "Invalid result (e.g. domain error)");
    }

    #[test]
    fn overflow_is_reported() {
        let e = domain_err("9^9^9^9");
        assert_eq!(e.message, "Result is too large to represent");
    }

    #[test]
    fn evaluate_mirrors_check_domain_on_good_input() {
        for src in ["2*3.5", "1/7/3", "2^10", "sin(30)*2", "sqrt(16)/4"] {
            let expr = parse(src).unwrap();
            let checked = check_domain(&expr).unwrap();
            assert!((evaluate(&expr) - checked).abs() < 1e-12, "{src}");
        }
    }

    #[test]
    fn evaluate_yields_nan_where_check_domain_errors() {
        for src in ["10/0", "sqrt(-4)", "log(0)"] {
            let expr = parse(src).unwrap();
            assert!(evaluate(&expr).is_nan(), "{src}");
            assert!(check_domain(&expr).is_err(), "{src}");
        }
    }
}
