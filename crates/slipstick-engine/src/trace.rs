//! Flattening: turning the tree into the order work happens on the rule.
//!
//! A slide rule carries one running value, so the tree is walked post-order
//! into a linear trace. Leaves become `Init` entries; each operation entry
//! records its true operand values and result, which is what lets the
//! emitter narrate decimal points while the scales only show mantissas.

use crate::ast::{BinaryOp, Expr, UnaryFunc};
use crate::eval::evaluate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the linear operation trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceOp {
    /// A value entering the computation.
    Init { value: f64 },
    /// A binary operation, with the true (signed) operand values.
    Binary {
        op: BinaryOp,
        left: f64,
        right: f64,
        result: f64,
    },
    /// A function application.
    Unary {
        func: UnaryFunc,
        arg: f64,
        result: f64,
    },
}

impl TraceOp {
    /// The running value after this entry executes.
    #[must_use]
    pub fn value_after(&self) -> f64 {
        match self {
            TraceOp::Init { value } => *value,
            TraceOp::Binary { result, .. } | TraceOp::Unary { result, .. } => *result,
        }
    }
}

/// The trace contained a value outside what f64 can represent. Cannot
/// happen for expressions that passed the domain check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expression contains a value the instrument cannot represent")]
pub struct FlattenError;

/// Flattens the tree into execution order.
///
/// A sign on a leaf folds into its `Init` value; a sign on a composite
/// subexpression contributes the subexpression's ops unchanged, and the
/// sign travels in the enclosing operation's recorded operand values (the
/// scales only ever show magnitudes).
pub fn flatten(expr: &Expr) -> Result<Vec<TraceOp>, FlattenError> {
    let mut ops = Vec::new();
    push_ops(expr, &mut ops)?;
    Ok(ops)
}

fn push_ops(expr: &Expr, out: &mut Vec<TraceOp>) -> Result<(), FlattenError> {
    match expr {
        Expr::Number { .. } | Expr::Name { .. } => {
            out.push(TraceOp::Init { value: finite(evaluate(expr))? });
        }
        Expr::UnaryMinus { operand, .. } => {
            if is_signed_leaf(operand) {
                out.push(TraceOp::Init { value: finite(evaluate(expr))? });
            } else {
                push_ops(operand, out)?;
            }
        }
        Expr::Call { func, arg, .. } => {
            push_ops(arg, out)?;
            out.push(TraceOp::Unary {
                func: *func,
                arg: finite(evaluate(arg))?,
                result: finite(evaluate(expr))?,
            });
        }
        Expr::Binary { op, left, right, .. } => {
            push_ops(left, out)?;
            push_ops(right, out)?;
            out.push(TraceOp::Binary {
                op: *op,
                left: finite(evaluate(left))?,
                right: finite(evaluate(right))?,
                result: finite(evaluate(expr))?,
            });
        }
    }
    Ok(())
}

fn is_signed_leaf(expr: &Expr) -> bool {
    match expr {
        Expr::Number { .. } | Expr::Name { .. } => true,
        Expr::UnaryMinus { operand, .. } => is_signed_leaf(operand),
        _ => false,
    }
}

fn finite(value: f64) -> Result<f64, FlattenError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FlattenError)
    }
}

/// True when every operation in the trace is a division. Such expressions
/// run as a cursor-led chain: the dividend is set with the cursor alone,
/// and later divisions may use the inverted scales without moving the
/// slide.
#[must_use]
pub fn is_division_chain(trace: &[TraceOp]) -> bool {
    let mut saw_division = false;
    for op in trace {
        match op {
            TraceOp::Init { .. } => {}
            TraceOp::Binary { op: BinaryOp::Div, .. } => saw_division = true,
            _ => return false,
        }
    }
    saw_division
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn trace_of(src: &str) -> Vec<TraceOp> {
        flatten(&parse(src).unwrap()).unwrap()
    }

    #[test]
    fn multiply_flattens_post_order() {
        assert_eq!(
            trace_of("2*3.5"),
            vec![
                TraceOp::Init { value: 2.0 },
                TraceOp::Init { value: 3.5 },
                TraceOp::Binary {
                    op: BinaryOp::Mul,
                    left: 2.0,
                    right: 3.5,
                    result: 7.0,
                },
            ]
        );
    }

    #[test]
    fn chained_division_records_running_dividends() {
        let trace = trace_of("1/7/3");
        assert_eq!(trace.len(), 5);
        let TraceOp::Binary { left, right, result, .. } = trace[4] else {
            panic!("expected a division: {:?}", trace[4]);
        };
        assert!((left - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(right, 3.0);
        assert!((result - 1.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn negative_literal_folds_into_init() {
        assert_eq!(
            trace_of("10^-3"),
            vec![
                TraceOp::Init { value: 10.0 },
                TraceOp::Init { value: -3.0 },
                TraceOp::Binary {
                    op: BinaryOp::Pow,
                    left: 10.0,
                    right: -3.0,
                    result: 0.001,
                },
            ]
        );
    }

    #[test]
    fn negated_subexpression_contributes_its_ops_unchanged() {
        // the sign surfaces in the enclosing operation's recorded values
        let trace = trace_of("2*-(3/4)");
        assert_eq!(trace.len(), 5);
        let TraceOp::Binary { op, left, right, result } = trace[4] else {
            panic!("expected the product last: {:?}", trace[4]);
        };
        assert_eq!(op, BinaryOp::Mul);
        assert_eq!(left, 2.0);
        assert_eq!(right, -0.75);
        assert_eq!(result, -1.5);
    }

    #[test]
    fn call_argument_flattens_before_the_call() {
        let trace = trace_of("sqrt(4*9)");
        assert_eq!(trace.len(), 4);
        assert!(matches!(
            trace[3],
            TraceOp::Unary { func: UnaryFunc::Sqrt, arg, result }
                if arg == 36.0 && result == 6.0
        ));
    }

    #[test]
    fn division_chain_requires_every_op_to_divide() {
        assert!(is_division_chain(&trace_of("1/7/3")));
        assert!(is_division_chain(&trace_of("10/4")));
        assert!(!is_division_chain(&trace_of("2*3/4")));
        assert!(!is_division_chain(&trace_of("10/4*2")));
        assert!(!is_division_chain(&trace_of("7")));
        assert!(!is_division_chain(&trace_of("sqrt(16)")));
    }

    #[test]
    fn value_after_tracks_the_running_value() {
        let trace = trace_of("1/7/3");
        let final_value = trace.last().map(TraceOp::value_after);
        assert!(final_value.is_some_and(|v| (v - 1.0 / 21.0).abs() < 1e-12));
    }
}
