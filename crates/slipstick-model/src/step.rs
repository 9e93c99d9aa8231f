use crate::scale::{MarkingMode, ScaleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position tolerance for the terminal completion check, in scale-position
/// units (the body is 1.0 long).
pub const VERIFY_TOLERANCE: f64 = 0.0005;

/// Step pacing defaults, milliseconds. Hand-tuned reading rhythm: narration
/// lingers, physical motions are quicker, the closing objective holds.
pub mod delay {
    pub const MESSAGE: u32 = 2000;
    pub const ACTION: u32 = 1500;
    pub const OBJECTIVE: u32 = 6000;
    pub const SCALE_PREP: u32 = 500;
    pub const FACE_PREP: u32 = 100;
    pub const TRY_AGAIN: u32 = 4000;
    pub const RESET_NOTE: u32 = 100;
    pub const NONE: u32 = 0;
}

/// Narrated instruction text plus the decimal bookkeeping in force when it
/// was written. The exponent state is captured at construction; nothing about
/// a narration changes during playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub text: String,
    /// Current out-of-band decimal exponent of the working value.
    pub exponent: i32,
    /// One-line reason the exponent last changed.
    pub exponent_note: String,
}

impl fmt::Display for Narration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [decimal exponent {:+}: {}]",
            self.text, self.exponent, self.exponent_note
        )
    }
}

/// One command against the instrument runtime. The variants mirror the
/// runtime interface verb-for-verb so a step list can be executed by any
/// implementation without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Ensure the visible face exposes all named scales, flipping if needed.
    SelectSide { scales: Vec<ScaleId> },
    PlaceCursor { scale: ScaleId, value: f64 },
    /// Move the slide so `value` on the slide scale sits at the cursor.
    PlaceBodyIndex { scale: ScaleId, value: f64 },
    /// Visual emphasis only; an empty set restores every scale.
    HighlightScales { scales: Vec<ScaleId> },
    SetMarkingMode { mode: MarkingMode },
    Narrate { narration: Narration },
    /// Compare the reading under the hairline on `scale` against `expected`.
    VerifyReading {
        scale: ScaleId,
        expected: f64,
        tolerance: f64,
    },
    ResetToOrigin,
}

/// One tutorial step: commands executed as a unit, pacing metadata, and
/// whether the step is a user-facing stopping point or pure setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub commands: Vec<Command>,
    pub delay_ms: u32,
    pub visible: bool,
}

impl Step {
    /// The step's narration, if it carries one.
    #[must_use]
    pub fn narration(&self) -> Option<&Narration> {
        self.commands.iter().find_map(|command| match command {
            Command::Narrate { narration } => Some(narration),
            _ => None,
        })
    }

    /// The terminal completion check, if this is the objective step.
    #[must_use]
    pub fn verify_reading(&self) -> Option<(ScaleId, f64, f64)> {
        self.commands.iter().find_map(|command| match command {
            Command::VerifyReading {
                scale,
                expected,
                tolerance,
            } => Some((*scale, *expected, *tolerance)),
            _ => None,
        })
    }
}
