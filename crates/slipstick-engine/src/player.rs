//! Plays a finished step list against an [`Instrument`], with the
//! pause/step/back controls a front end exposes.
//!
//! A user-facing "step" is one visible step plus the invisible motion
//! steps that follow it. Stepping back replays the list from the start:
//! every placement command is absolute and the list opens by resetting
//! the rule, so a replayed prefix always reproduces the same instrument
//! state.

use crate::runtime::{execute_step, Instrument};
use slipstick_model::Step;

pub struct Player<'a, I> {
    steps: &'a [Step],
    instrument: I,
    position: usize,
    check_passed: Option<bool>,
}

impl<'a, I: Instrument> Player<'a, I> {
    pub fn new(steps: &'a [Step], instrument: I) -> Self {
        Self {
            steps,
            instrument,
            position: 0,
            check_passed: None,
        }
    }

    pub fn instrument(&self) -> &I {
        &self.instrument
    }

    pub fn instrument_mut(&mut self) -> &mut I {
        &mut self.instrument
    }

    pub fn into_instrument(self) -> I {
        self.instrument
    }

    /// Index of the next step to execute.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Outcome of the completion check, once the objective step has run.
    pub fn check_passed(&self) -> Option<bool> {
        self.check_passed
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.steps.len()
    }

    /// Executes exactly one step, visible or not.
    pub fn advance_one(&mut self) {
        if let Some(step) = self.steps.get(self.position) {
            if let Some(passed) = execute_step(step, &mut self.instrument) {
                self.check_passed = Some(passed);
            }
            self.position += 1;
        }
    }

    /// Executes the next step together with its trailing invisible motions.
    pub fn step_forward(&mut self) {
        if self.is_finished() {
            return;
        }
        self.advance_one();
        while let Some(step) = self.steps.get(self.position) {
            if step.visible {
                break;
            }
            self.advance_one();
        }
    }

    /// Rewinds one user-facing step by replaying the list from the start.
    pub fn step_back(&mut self) {
        let target = self.visible_steps_done().saturating_sub(1);
        self.position = 0;
        self.check_passed = None;
        for _ in 0..target {
            self.step_forward();
        }
    }

    pub fn play_all(&mut self) {
        while !self.is_finished() {
            self.advance_one();
        }
    }

    /// Visible steps already executed.
    pub fn visible_steps_done(&self) -> usize {
        self.steps[..self.position]
            .iter()
            .filter(|step| step.visible)
            .count()
    }

    pub fn visible_total(&self) -> usize {
        self.steps.iter().filter(|step| step.visible).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::SimulatedInstrument;
    use slipstick_model::{delay, Command, Narration, ScaleId, VERIFY_TOLERANCE};

    fn say(text: &str) -> Step {
        Step {
            commands: vec![Command::Narrate {
                narration: Narration {
                    text: text.to_owned(),
                    exponent: 0,
                    exponent_note: "test".to_owned(),
                },
            }],
            delay_ms: delay::MESSAGE,
            visible: true,
        }
    }

    fn act(commands: Vec<Command>) -> Step {
        Step {
            commands,
            delay_ms: delay::ACTION,
            visible: false,
        }
    }

    fn sample_steps() -> Vec<Step> {
        vec![
            say("Resetting."),
            act(vec![Command::ResetToOrigin]),
            say("Move the cursor to 2 on D, slide index to it."),
            act(vec![Command::PlaceCursor {
                scale: ScaleId::D,
                value: 2.0,
            }]),
            act(vec![Command::PlaceBodyIndex {
                scale: ScaleId::C,
                value: 1.0,
            }]),
            say("Move the cursor to 3 on C."),
            act(vec![Command::PlaceCursor {
                scale: ScaleId::C,
                value: 3.0,
            }]),
            Step {
                commands: vec![Command::VerifyReading {
                    scale: ScaleId::D,
                    expected: 6.0,
                    tolerance: VERIFY_TOLERANCE,
                }],
                delay_ms: delay::OBJECTIVE,
                visible: true,
            },
        ]
    }

    #[test]
    fn step_forward_groups_trailing_motions() {
        let steps = sample_steps();
        let mut player = Player::new(&steps, SimulatedInstrument::new());
        assert_eq!(player.visible_total(), 4);

        player.step_forward();
        // Reset narration plus the reset motion.
        assert_eq!(player.position(), 2);
        assert_eq!(player.visible_steps_done(), 1);

        player.step_forward();
        // Cursor narration plus two motions.
        assert_eq!(player.position(), 5);
        assert_eq!(
            player.instrument().slide_shift(),
            2f64.log10()
        );

        player.step_forward();
        player.step_forward();
        assert!(player.is_finished());
        assert_eq!(player.check_passed(), Some(true));
    }

    #[test]
    fn step_back_replays_to_the_same_state() {
        let steps = sample_steps();
        let mut player = Player::new(&steps, SimulatedInstrument::new());
        player.step_forward();
        player.step_forward();
        let shift_after_two = player.instrument().slide_shift();
        let cursor_after_two = player.instrument().cursor_position();

        player.step_forward();
        player.step_back();
        assert_eq!(player.visible_steps_done(), 2);
        assert_eq!(player.instrument().slide_shift(), shift_after_two);
        assert_eq!(player.instrument().cursor_position(), cursor_after_two);

        // Stepping forward again reaches the end with the check intact.
        player.step_forward();
        player.step_forward();
        assert!(player.is_finished());
        assert_eq!(player.check_passed(), Some(true));
    }

    #[test]
    fn step_back_from_the_start_is_a_no_op() {
        let steps = sample_steps();
        let mut player = Player::new(&steps, SimulatedInstrument::new());
        player.step_back();
        assert_eq!(player.position(), 0);
        player.step_forward();
        assert_eq!(player.visible_steps_done(), 1);
    }

    #[test]
    fn play_all_runs_every_step() {
        let steps = sample_steps();
        let mut player = Player::new(&steps, SimulatedInstrument::new());
        player.play_all();
        assert!(player.is_finished());
        assert_eq!(player.check_passed(), Some(true));
        let sim = player.into_instrument();
        assert_eq!(sim.narration_log().len(), 3);
    }
}
