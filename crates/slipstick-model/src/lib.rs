//! `slipstick-model` defines the shared data model for the slide-rule tutor.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the tutorial engine (parsing, trace flattening, step emission)
//! - instrument runtimes (console player, web front ends, test doubles)
//!   via `serde` (JSON-safe step schema)

mod decimal;
mod profile;
mod scale;
mod step;

pub use decimal::{fmt_sig, round_sig, Decomposed};
pub use profile::{LogLogBand, RuleProfile, SMALL_ANGLE_DEG};
pub use scale::{Face, MarkingMode, ScaleId};
pub use step::{delay, Command, Narration, Step, VERIFY_TOLERANCE};
