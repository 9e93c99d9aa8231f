#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Expression-to-tutorial engine for a log-scale slide rule.
//!
//! Text like `2*3.5/sin(30)` goes in; out comes a [`Tutorial`]: an ordered
//! list of narrated, machine-executable steps that carry the computation
//! out on a Hemmi Versalog layout, decimal-point bookkeeping included.
//! The pipeline is
//!
//! 1. [`parser::parse`] - spanned AST over the supported grammar
//! 2. [`eval::check_domain`] - every value the rule will hold, validated
//!    up front so a tutorial either emits completely or not at all
//! 3. [`trace::flatten`] - post-order linearization into the one-running-
//!    value order a slide rule imposes
//! 4. step emission against a [`slipstick_model::RuleProfile`]
//!
//! Steps are plain data ([`slipstick_model::Step`]); drive them through
//! [`runtime::execute_step`] or interactively with [`player::Player`].
//! [`runtime::SimulatedInstrument`] executes them against real scale
//! geometry, which is how the test suite proves the narrated motions
//! produce the narrated readings.

pub mod ast;
mod emitter;
pub mod eval;
pub mod parser;
pub mod player;
pub mod runtime;
pub mod trace;

pub use ast::{ParseError, Span};
pub use eval::DomainError;
pub use player::Player;
pub use runtime::{execute_step, Instrument, SimulatedInstrument};

use serde::{Deserialize, Serialize};
use slipstick_model::{RuleProfile, Step};
use thiserror::Error;

/// Why no tutorial could be generated for an input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TutorialError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl TutorialError {
    /// Byte range of the offending piece of the (trimmed) input.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            TutorialError::Parse(e) => e.span,
            TutorialError::Domain(e) => e.span,
        }
    }

    /// The message without the span suffix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            TutorialError::Parse(e) => &e.message,
            TutorialError::Domain(e) => &e.message,
        }
    }
}

/// A complete generated tutorial: the step list, the exact value it works
/// toward, and the input it narrates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    pub steps: Vec<Step>,
    /// Exact result, used by front ends that show the target up front.
    pub value: f64,
    /// The trimmed input text, as echoed in the narration.
    pub display: String,
}

/// Generates the tutorial for `text` on `profile`.
///
/// Validation is strict and up front: any parse or domain failure is
/// returned before a single step exists, so a caller never shows a
/// half-usable tutorial.
pub fn generate_tutorial(text: &str, profile: &RuleProfile) -> Result<Tutorial, TutorialError> {
    let display = text.trim();
    let expr = parser::parse(display)?;
    let value = eval::check_domain(&expr)?;
    let ops = trace::flatten(&expr)
        .map_err(|_| DomainError::new("Result is too large to represent", expr.span()))?;
    let steps = emitter::emit(&ops, profile, display, value);
    Ok(Tutorial {
        steps,
        value,
        display: display.to_owned(),
    })
}
