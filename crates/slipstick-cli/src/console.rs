//! Console rendering of tutorial steps.

use slipstick_engine::{Instrument, SimulatedInstrument};
use slipstick_model::{fmt_sig, MarkingMode, RuleProfile, ScaleId};

/// Prints numbered narrations and, optionally, each physical motion, while
/// mirroring every command onto a [`SimulatedInstrument`] so the completion
/// check still runs against real scale geometry.
pub struct ConsoleInstrument {
    sim: SimulatedInstrument,
    profile: RuleProfile,
    motions: bool,
    narrated: usize,
}

impl ConsoleInstrument {
    pub fn new(profile: RuleProfile, motions: bool) -> Self {
        Self {
            sim: SimulatedInstrument::new(),
            profile,
            motions,
            narrated: 0,
        }
    }

    fn label(&self, scale: ScaleId) -> &'static str {
        self.profile.display_label(scale)
    }
}

impl Instrument for ConsoleInstrument {
    fn select_side_with_scales(&mut self, scales: &[ScaleId]) {
        let already_there = self.sim.current_face_has_scales(scales);
        self.sim.select_side_with_scales(scales);
        if self.motions && !already_there {
            let labels: Vec<&str> = scales.iter().map(|s| self.label(*s)).collect();
            println!("      [face: {}]", labels.join(" "));
        }
    }

    fn current_face_has_scales(&self, scales: &[ScaleId]) -> bool {
        self.sim.current_face_has_scales(scales)
    }

    fn place_cursor_at(&mut self, scale: ScaleId, value: f64) {
        self.sim.place_cursor_at(scale, value);
        if self.motions {
            println!(
                "      [cursor to {} on {}]",
                fmt_sig(value, 4),
                self.label(scale)
            );
        }
    }

    fn place_body_index_at(&mut self, scale: ScaleId, value: f64) {
        self.sim.place_body_index_at(scale, value);
        if self.motions {
            println!(
                "      [slide until {} on {} meets the hairline]",
                fmt_sig(value, 4),
                self.label(scale)
            );
        }
    }

    fn set_highlighted_scales(&mut self, scales: &[ScaleId]) {
        self.sim.set_highlighted_scales(scales);
    }

    fn set_marking_mode(&mut self, mode: MarkingMode) {
        self.sim.set_marking_mode(mode);
    }

    fn narrate(&mut self, text: &str) {
        self.narrated += 1;
        println!("{:>3}. {text}", self.narrated);
    }

    fn verify_reading(&mut self, scale: ScaleId, expected: f64, tolerance: f64) -> bool {
        let passed = self.sim.verify_reading(scale, expected, tolerance);
        if self.motions {
            println!(
                "      [check: {} should read {}: {}]",
                self.label(scale),
                fmt_sig(expected, 4),
                if passed { "ok" } else { "off" }
            );
        }
        passed
    }

    fn reset_to_origin(&mut self) {
        self.sim.reset_to_origin();
        if self.motions {
            println!("      [slide and cursor back to the origin]");
        }
    }
}
