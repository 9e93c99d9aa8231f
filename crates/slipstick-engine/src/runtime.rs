//! The instrument runtime boundary.
//!
//! [`Instrument`] is what a front end implements: one method per step
//! command, no interpretation required. [`SimulatedInstrument`] is a
//! faithful software rule used by the console player and the tests; its
//! scale geometry is the real Versalog layout, so a reading that verifies
//! here verifies on the physical instrument.

use slipstick_model::{Command, MarkingMode, ScaleId, Step};

/// A device (or rendering of one) that tutorial steps can drive.
pub trait Instrument {
    /// Ensure the visible face exposes all of `scales`, flipping if needed.
    fn select_side_with_scales(&mut self, scales: &[ScaleId]);
    /// Whether the visible face already exposes all of `scales`. Front ends
    /// use this to tell a flip from a no-op before animating.
    fn current_face_has_scales(&self, scales: &[ScaleId]) -> bool;
    fn place_cursor_at(&mut self, scale: ScaleId, value: f64);
    /// Move the slide so `value` on the slide scale `scale` sits under the
    /// cursor hairline.
    fn place_body_index_at(&mut self, scale: ScaleId, value: f64);
    fn set_highlighted_scales(&mut self, scales: &[ScaleId]);
    fn set_marking_mode(&mut self, mode: MarkingMode);
    fn narrate(&mut self, text: &str);
    /// Compare the reading under the hairline on `scale` against
    /// `expected`. Returns whether it matched within `tolerance`.
    fn verify_reading(&mut self, scale: ScaleId, expected: f64, tolerance: f64) -> bool;
    fn reset_to_origin(&mut self);
}

/// Runs every command of one step against an instrument. Returns the
/// outcome of the completion check if the step carried one.
pub fn execute_step<I: Instrument>(step: &Step, instrument: &mut I) -> Option<bool> {
    let mut check = None;
    for command in &step.commands {
        match command {
            Command::SelectSide { scales } => instrument.select_side_with_scales(scales),
            Command::PlaceCursor { scale, value } => instrument.place_cursor_at(*scale, *value),
            Command::PlaceBodyIndex { scale, value } => {
                instrument.place_body_index_at(*scale, *value);
            }
            Command::HighlightScales { scales } => instrument.set_highlighted_scales(scales),
            Command::SetMarkingMode { mode } => instrument.set_marking_mode(*mode),
            Command::Narrate { narration } => instrument.narrate(&narration.to_string()),
            Command::VerifyReading {
                scale,
                expected,
                tolerance,
            } => check = Some(instrument.verify_reading(*scale, *expected, *tolerance)),
            Command::ResetToOrigin => instrument.reset_to_origin(),
        }
    }
    check
}

/// Software slide rule with real scale geometry. Positions are in body
/// units: 0.0 at the left index of D, 1.0 at the right.
#[derive(Debug, Clone)]
pub struct SimulatedInstrument {
    cursor_position: Option<f64>,
    slide_shift: f64,
    visible_scales: Vec<ScaleId>,
    highlighted_scales: Vec<ScaleId>,
    marking_mode: MarkingMode,
    narration_log: Vec<String>,
}

impl Default for SimulatedInstrument {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedInstrument {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor_position: None,
            slide_shift: 0.0,
            visible_scales: Vec::new(),
            highlighted_scales: Vec::new(),
            marking_mode: MarkingMode::None,
            narration_log: Vec::new(),
        }
    }

    #[must_use]
    pub fn cursor_position(&self) -> Option<f64> {
        self.cursor_position
    }

    #[must_use]
    pub fn slide_shift(&self) -> f64 {
        self.slide_shift
    }

    #[must_use]
    pub fn visible_scales(&self) -> &[ScaleId] {
        &self.visible_scales
    }

    #[must_use]
    pub fn highlighted_scales(&self) -> &[ScaleId] {
        &self.highlighted_scales
    }

    #[must_use]
    pub fn marking_mode(&self) -> MarkingMode {
        self.marking_mode
    }

    #[must_use]
    pub fn narration_log(&self) -> &[String] {
        &self.narration_log
    }

    /// Body position of `value` on `scale` at the current slide setting.
    #[must_use]
    pub fn scale_position(&self, scale: ScaleId, value: f64) -> f64 {
        self.slide_offset(scale) + Self::unshifted_position(scale, value)
    }

    fn slide_offset(&self, scale: ScaleId) -> f64 {
        match scale {
            ScaleId::C | ScaleId::Cf | ScaleId::Ci | ScaleId::Cif => self.slide_shift,
            _ => 0.0,
        }
    }

    /// Position relative to the scale's own left end. Folded scales wrap:
    /// their engraving runs pi to 10 pi, so positions fold into one decade.
    fn unshifted_position(scale: ScaleId, value: f64) -> f64 {
        use std::f64::consts::PI;
        match scale {
            ScaleId::C | ScaleId::D => value.log10(),
            ScaleId::Cf | ScaleId::Df => (value / PI).log10().rem_euclid(1.0),
            ScaleId::Ci => 1.0 - value.log10(),
            ScaleId::Cif => 1.0 - (value * PI).log10(),
            ScaleId::A => value.log10() / 2.0,
            ScaleId::K => value.log10() / 3.0,
            ScaleId::R1 => 2.0 * value.log10(),
            ScaleId::R2 => 2.0 * value.log10() - 1.0,
            // L is linear in the decimal fraction itself.
            ScaleId::L => value,
            ScaleId::S => 1.0 + value.to_radians().sin().log10(),
            ScaleId::St => 2.0 + value.to_radians().sin().log10(),
            ScaleId::T => 1.0 + value.to_radians().tan().log10(),
            ScaleId::Ll3 => value.ln().log10(),
            ScaleId::Ll2 => value.ln().log10() + 1.0,
            ScaleId::Ll1 => value.ln().log10() + 2.0,
            ScaleId::LlDown3 => (-value.ln()).log10(),
            ScaleId::LlDown2 => (-value.ln()).log10() + 1.0,
            ScaleId::LlDown1 => (-value.ln()).log10() + 2.0,
        }
    }
}

impl Instrument for SimulatedInstrument {
    fn select_side_with_scales(&mut self, scales: &[ScaleId]) {
        self.visible_scales = scales.to_vec();
    }

    fn current_face_has_scales(&self, scales: &[ScaleId]) -> bool {
        scales.iter().all(|scale| self.visible_scales.contains(scale))
    }

    fn place_cursor_at(&mut self, scale: ScaleId, value: f64) {
        self.cursor_position = Some(self.scale_position(scale, value));
    }

    fn place_body_index_at(&mut self, scale: ScaleId, value: f64) {
        let cursor = self.cursor_position.unwrap_or(0.0);
        self.slide_shift = cursor - Self::unshifted_position(scale, value);
    }

    fn set_highlighted_scales(&mut self, scales: &[ScaleId]) {
        self.highlighted_scales = scales.to_vec();
    }

    fn set_marking_mode(&mut self, mode: MarkingMode) {
        self.marking_mode = mode;
    }

    fn narrate(&mut self, text: &str) {
        self.narration_log.push(text.to_owned());
    }

    fn verify_reading(&mut self, scale: ScaleId, expected: f64, tolerance: f64) -> bool {
        let Some(cursor) = self.cursor_position else {
            return false;
        };
        let expected_position = self.scale_position(scale, expected);
        // Positions one full decade apart are the same engraving: a reading
        // at the right index equals one at the left, and a log-log reading
        // a decade along is the adjacent band.
        let raw = (cursor - expected_position).rem_euclid(1.0);
        raw.min(1.0 - raw) <= tolerance
    }

    fn reset_to_origin(&mut self) {
        self.cursor_position = Some(0.0);
        self.slide_shift = 0.0;
    }
}
