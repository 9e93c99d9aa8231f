//! Step emission: instruction selection over the operation trace.
//!
//! Each handler consumes one trace entry, appends a batch of steps, and
//! leaves [`EmitterState`] describing where the running value physically
//! sits. Narrations are snapshots: they capture the decimal-exponent state
//! at the moment they are written, so replaying steps later cannot drift.
//!
//! The narration always works in mantissas. The true signed value rides
//! along in the state and surfaces in the exponent notes and the final
//! result message.

mod power;
mod product;
mod unary;

use crate::ast::BinaryOp;
use crate::trace::{is_division_chain, TraceOp};
use slipstick_model::{
    delay, fmt_sig, Command, Decomposed, Face, MarkingMode, Narration, RuleProfile, ScaleId,
    Step, VERIFY_TOLERANCE,
};

/// Allowed overshoot past either end of the body, in scale-position units.
/// Real rules read a little past the end graduations.
pub(crate) const BODY_OVERSHOOT: f64 = 0.03;

pub(crate) fn in_range(position: f64) -> bool {
    position >= -BODY_OVERSHOOT && position <= 1.0 + BODY_OVERSHOOT
}

/// Position of `mantissa` on C for a given slide shift.
pub(crate) fn position_c(shift: f64, mantissa: f64) -> f64 {
    shift + mantissa.log10()
}

/// Position of `mantissa` on CI (C running backwards).
pub(crate) fn position_ci(shift: f64, mantissa: f64) -> f64 {
    shift + (1.0 - mantissa.log10())
}

/// Position of `mantissa` on CIF (inverted and folded at pi).
pub(crate) fn position_cif(shift: f64, mantissa: f64) -> f64 {
    shift + (1.0 - (mantissa * std::f64::consts::PI).log10())
}

/// Which slide index a reading lands under for a given shift. When both
/// indices sit on the body, the raw mantissa ratio decides: a ratio that
/// kept the value at or above one reads at the left index.
pub(crate) fn read_index(slide_shift: f64, raw_ratio: f64) -> f64 {
    let left_on_body = in_range(slide_shift);
    let right_on_body = in_range(slide_shift + 1.0);
    if left_on_body && right_on_body {
        return if raw_ratio >= 1.0 { 1.0 } else { 10.0 };
    }
    if right_on_body {
        return 10.0;
    }
    if left_on_body {
        return 1.0;
    }
    // Neither index cleanly on the body; pick the nearer one.
    if slide_shift + 0.5 >= 0.0 {
        10.0
    } else {
        1.0
    }
}

pub(crate) fn index_label(index: f64) -> &'static str {
    if index == 10.0 {
        "right index (10)"
    } else {
        "left index (1)"
    }
}

/// Which half of the A scale holds a value's square, by decimal exponent
/// parity. Even exponents read in the first decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SquareHalf {
    Left,
    Right,
}

impl SquareHalf {
    pub(crate) fn name(self) -> &'static str {
        match self {
            SquareHalf::Left => "left",
            SquareHalf::Right => "right",
        }
    }

    pub(crate) fn parity(self) -> &'static str {
        match self {
            SquareHalf::Left => "even",
            SquareHalf::Right => "odd",
        }
    }
}

pub(crate) fn square_root_half(value: f64) -> SquareHalf {
    if value <= 0.0 {
        return SquareHalf::Left;
    }
    let exponent = value.log10().floor() as i64;
    if exponent.rem_euclid(2) == 0 {
        SquareHalf::Left
    } else {
        SquareHalf::Right
    }
}

/// Which third of the K scale holds a value's cube root: 0, 1 or 2 from
/// the left, by decimal exponent modulo three.
pub(crate) fn cube_root_third(value: f64) -> i32 {
    if value <= 0.0 {
        return 0;
    }
    let exponent = value.log10().floor() as i64;
    exponent.rem_euclid(3) as i32
}

pub(crate) fn third_name(third: i32) -> &'static str {
    match third {
        0 => "left",
        1 => "middle",
        _ => "right",
    }
}

/// How a division is carried out physically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DivisionMethod {
    /// Cursor straight to the divisor on CI; the slide stays put.
    Inverted,
    /// Same shortcut via CIF/DF when CI is out of reach.
    InvertedFolded,
    /// Move the slide so the divisor on C meets the dividend on D.
    Plain,
}

pub(crate) fn division_method(chain_shift: Option<f64>, divisor_mantissa: f64) -> DivisionMethod {
    let Some(shift) = chain_shift else {
        return DivisionMethod::Plain;
    };
    if in_range(position_ci(shift, divisor_mantissa)) {
        return DivisionMethod::Inverted;
    }
    if in_range(position_cif(shift, divisor_mantissa)) {
        return DivisionMethod::InvertedFolded;
    }
    DivisionMethod::Plain
}

/// Appended to read instructions when the true value is negative: the
/// scales only show magnitudes.
pub(crate) fn sign_note(value: f64) -> &'static str {
    if value < 0.0 {
        " (The scales show the magnitude; the sign is tracked separately.)"
    } else {
        ""
    }
}

/// Where the running value physically sits, plus the narrative decimal
/// bookkeeping. Updated by every handler.
#[derive(Debug, Clone)]
pub(crate) struct EmitterState {
    /// True running value, sign included. The scales show its mantissa.
    pub value: f64,
    pub mantissa: f64,
    pub exponent: i32,
    pub exponent_note: String,
    pub negative: bool,
    /// Face the running value was last read on.
    pub face: Face,
    /// The result is on D under the hairline, ready to chain from.
    pub on_primary: bool,
    /// Running slide shift in log units, kept while a chain shortcut may
    /// still reuse it.
    pub slide_shift: Option<f64>,
    /// The cursor rests exactly at a slide index (a plain division just
    /// parked it there).
    pub cursor_at_index: bool,
    /// One-shot: the previous multiply seated its product at the body
    /// index via the inverted scale, so the next multiply may be
    /// cursor-only.
    pub inverted_chain: bool,
    /// One-shot: the previous operation left its result on a root scale,
    /// which has no index linkage back to C and D.
    pub root_reentry: bool,
    /// Scale and expected reading for the closing completion check.
    pub check: Option<(ScaleId, f64)>,
    /// Scales the last handler worked with; the closing step re-selects
    /// them.
    pub last_scales: Vec<ScaleId>,
}

impl EmitterState {
    fn new() -> Self {
        Self {
            value: f64::NAN,
            mantissa: 1.0,
            exponent: 0,
            exponent_note: "no value placed yet".to_owned(),
            negative: false,
            face: Face::Front,
            on_primary: false,
            slide_shift: None,
            cursor_at_index: false,
            inverted_chain: false,
            root_reentry: false,
            check: None,
            last_scales: Vec::new(),
        }
    }
}

pub(crate) struct Emitter<'a> {
    pub(crate) profile: &'a RuleProfile,
    display: &'a str,
    steps: Vec<Step>,
    pub(crate) state: EmitterState,
    front_prepared: bool,
    back_prepared: bool,
}

impl<'a> Emitter<'a> {
    fn new(profile: &'a RuleProfile, display: &'a str) -> Self {
        Self {
            profile,
            display,
            steps: Vec::new(),
            state: EmitterState::new(),
            front_prepared: false,
            back_prepared: false,
        }
    }

    /// Pushes a user-facing narration step carrying the current decimal
    /// snapshot.
    pub(crate) fn say(&mut self, text: impl Into<String>, delay_ms: u32) {
        let narration = Narration {
            text: text.into(),
            exponent: self.state.exponent,
            exponent_note: self.state.exponent_note.clone(),
        };
        self.steps.push(Step {
            commands: vec![Command::Narrate { narration }],
            delay_ms,
            visible: true,
        });
    }

    /// Pushes an invisible motion or preparation step.
    pub(crate) fn act(&mut self, commands: Vec<Command>, delay_ms: u32) {
        self.steps.push(Step {
            commands,
            delay_ms,
            visible: false,
        });
    }

    /// Emphasizes the scales an operation is about to use and arms the
    /// hairline.
    pub(crate) fn prep_scales(&mut self, scales: &[ScaleId]) {
        self.act(
            vec![
                Command::HighlightScales { scales: scales.to_vec() },
                Command::SetMarkingMode { mode: MarkingMode::Hairline },
            ],
            delay::SCALE_PREP,
        );
        self.state.last_scales = scales.to_vec();
    }

    /// Emits the once-per-face side selection.
    pub(crate) fn prepare_face(&mut self, face: Face, scales: &[ScaleId]) {
        let prepared = match face {
            Face::Front => &mut self.front_prepared,
            Face::Back => &mut self.back_prepared,
        };
        if !*prepared {
            *prepared = true;
            self.act(
                vec![Command::SelectSide { scales: scales.to_vec() }],
                delay::FACE_PREP,
            );
        }
    }

    /// Records the new running value. Returns its decomposition, or `None`
    /// when the value has no scale position (zero or out of f64 range); in
    /// that case the mantissa fields keep their previous contents and the
    /// caller degrades to an announcement.
    pub(crate) fn commit(&mut self, value: f64, note: impl Into<String>) -> Option<Decomposed> {
        self.state.value = value;
        let decomposed = Decomposed::of(value);
        if let Some(d) = decomposed {
            self.state.mantissa = d.mantissa;
            self.state.exponent = d.exponent;
            self.state.negative = d.negative;
            self.state.exponent_note = note.into();
        }
        decomposed
    }

    /// A step that tells the user what happened without any instrument
    /// work, for values the scales cannot hold.
    pub(crate) fn announce_only(&mut self, text: impl Into<String>) {
        self.state.on_primary = false;
        self.state.check = None;
        self.clear_chain_flags();
        self.say(text, delay::MESSAGE);
    }

    /// Self-seating operations invalidate every chain shortcut: the slide
    /// and cursor no longer relate to the previous operation.
    pub(crate) fn clear_chain_flags(&mut self) {
        self.state.slide_shift = None;
        self.state.cursor_at_index = false;
        self.state.inverted_chain = false;
        self.state.root_reentry = false;
    }

    /// Brings a value read on the other face back over C and D before a
    /// front operation continues the chain. The cursor is linked through
    /// the body, so its position survives; whether the user must flip
    /// depends on the profile.
    pub(crate) fn transfer_to_primary(&mut self) {
        if self.state.face != Face::Back {
            return;
        }
        self.prepare_face(Face::Front, &[ScaleId::C, ScaleId::D]);
        let mantissa = self.state.mantissa;
        let m = fmt_sig(mantissa, 4);
        let v = fmt_sig(self.state.value, 4);
        if self
            .profile
            .face_has_scales(Face::Back, &[ScaleId::C, ScaleId::D])
        {
            self.say(
                format!(
                    "The cursor is linked; it is already in position. The value carried \
                     forward is {v} (mantissa {m} on D). C and D are on this side, so \
                     there is no need to flip."
                ),
                delay::MESSAGE,
            );
        } else {
            self.say(
                format!(
                    "Flip the rule over. The cursor keeps its position through the flip; \
                     re-read it as {m} on the D scale. The value carried forward is {v}."
                ),
                delay::MESSAGE,
            );
        }
        self.act(
            vec![
                Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                Command::PlaceCursor { scale: ScaleId::D, value: mantissa },
            ],
            delay::ACTION,
        );
        self.state.face = Face::Front;
        self.state.on_primary = true;
    }

    /// Parks `value` on D when an operation must start from an operand
    /// that is not the running value (a parenthesized group was computed
    /// out of line). Clears every chain shortcut.
    pub(crate) fn reseat_on_primary(&mut self, value: f64, text: String) {
        let Some(d) = Decomposed::of(value) else {
            return;
        };
        self.prepare_face(Face::Front, &[ScaleId::C, ScaleId::D]);
        self.say(text, delay::MESSAGE);
        self.act(
            vec![
                Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                Command::PlaceCursor { scale: ScaleId::D, value: d.mantissa },
            ],
            delay::ACTION,
        );
        self.commit(
            value,
            format!(
                "{} = {} x 10^{}",
                fmt_sig(value, 4),
                fmt_sig(d.mantissa, 4),
                d.exponent
            ),
        );
        self.state.face = Face::Front;
        self.state.on_primary = true;
        self.clear_chain_flags();
    }

    /// The root scales have no index linkage; re-enter the value on D
    /// before chaining onward.
    pub(crate) fn reenter_from_root_scales(&mut self) {
        if !self.state.root_reentry {
            return;
        }
        self.state.root_reentry = false;
        let mantissa = self.state.mantissa;
        self.say(
            format!(
                "The root scales have no index of their own, so the chain cannot continue \
                 from there directly. Re-enter the value: move the cursor to {} on the D \
                 scale.",
                fmt_sig(mantissa, 4)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::D, value: mantissa }],
            delay::ACTION,
        );
        self.state.on_primary = true;
    }

    /// First trace entry: frame the problem and, unless a specialised
    /// handler will do its own seating, place the first factor.
    fn first_init(&mut self, value: f64, trace: &[TraceOp]) {
        let context = format!("Calculate: {}", self.display);

        // Patterns whose handler seats the value itself: a lone power
        // (`2^10`), a coefficient times a power (`3*10^2`), and any unary
        // call. For those, only frame the problem.
        let power_only = matches!(trace.get(1), Some(TraceOp::Init { .. }))
            && (matches!(
                trace.get(2),
                Some(TraceOp::Binary { op: BinaryOp::Pow, .. })
            ) || (matches!(trace.get(2), Some(TraceOp::Init { .. }))
                && matches!(
                    trace.get(3),
                    Some(TraceOp::Binary { op: BinaryOp::Pow, .. })
                )));
        let unary_next = matches!(trace.get(1), Some(TraceOp::Unary { .. }));
        let lone_value = trace.len() == 1;

        let Some(d) = self.commit(value, String::new()) else {
            self.say(context, delay::SCALE_PREP);
            self.announce_only(format!(
                "{} has no position on a logarithmic scale; the tutorial can only carry \
                 it symbolically.",
                fmt_sig(value, 4)
            ));
            return;
        };
        self.state.exponent_note = format!(
            "{} = {} x 10^{}",
            fmt_sig(value, 4),
            fmt_sig(d.mantissa, 4),
            d.exponent
        );

        if power_only || unary_next {
            self.say(context, delay::SCALE_PREP);
            self.state.on_primary = true;
            return;
        }

        if is_division_chain(trace) {
            self.prepare_face(Face::Front, &[ScaleId::C, ScaleId::D]);
            self.say(context, delay::SCALE_PREP);
            self.prep_scales(&[ScaleId::C, ScaleId::D]);
            self.say(
                format!(
                    "Division chain: set the dividend. Move the cursor to {} on the D \
                     scale.{}",
                    fmt_sig(d.mantissa, 4),
                    sign_note(value)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![
                    Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                    Command::PlaceCursor { scale: ScaleId::D, value: d.mantissa },
                ],
                delay::ACTION,
            );
            self.state.on_primary = true;
            self.state.cursor_at_index = false;
            self.state.check = Some((ScaleId::D, d.mantissa));
            return;
        }

        // A product follows (or the value stands alone): seat the slide
        // index over the first factor. Look one multiply ahead to decide
        // which index keeps the product on the body.
        let mut use_right_index = false;
        if let (
            Some(TraceOp::Init { value: second }),
            Some(TraceOp::Binary { op: BinaryOp::Mul, .. }),
        ) = (trace.get(1), trace.get(2))
        {
            if let Some(second_d) = Decomposed::of(*second) {
                if d.mantissa * second_d.mantissa >= 10.0 {
                    use_right_index = true;
                }
            }
        }
        let index = if use_right_index { 10.0 } else { 1.0 };
        let reason = if use_right_index {
            " (The product will run past 10; the right index keeps it on the D scale.)"
        } else {
            ""
        };

        self.prepare_face(Face::Front, &[ScaleId::C, ScaleId::D]);
        self.say(context, delay::SCALE_PREP);
        self.prep_scales(&[ScaleId::C, ScaleId::D]);
        self.say(
            format!(
                "The first factor is {}. Move the slide so the {} on C is over {} on \
                 the D scale.{}{}",
                fmt_sig(value, 4),
                index_label(index),
                fmt_sig(d.mantissa, 4),
                reason,
                sign_note(value)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![
                Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                Command::PlaceCursor { scale: ScaleId::D, value: d.mantissa },
            ],
            delay::ACTION,
        );
        self.act(
            vec![Command::PlaceBodyIndex { scale: ScaleId::C, value: index }],
            delay::ACTION,
        );
        self.state.on_primary = true;
        self.state.cursor_at_index = true;
        self.state.slide_shift = Some(if use_right_index {
            d.mantissa.log10() - 1.0
        } else {
            d.mantissa.log10()
        });
        if lone_value {
            self.state.check = Some((ScaleId::D, d.mantissa));
        }
    }

    /// Closes the tutorial: a reset pair is spliced in front, then the
    /// objective step (with the completion check) and the retry prompt go
    /// on the end.
    fn finish(mut self, final_value: f64) -> Vec<Step> {
        let reset_narration = Narration {
            text: "Resetting the slide rule to its starting position (index 1 on C over 1 \
                   on D)."
                .to_owned(),
            exponent: 0,
            exponent_note: "starting position".to_owned(),
        };
        let mut steps = vec![
            Step {
                commands: vec![Command::Narrate { narration: reset_narration }],
                delay_ms: delay::RESET_NOTE,
                visible: true,
            },
            Step {
                commands: vec![
                    Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                    Command::ResetToOrigin,
                ],
                delay_ms: delay::NONE,
                visible: false,
            },
        ];
        steps.append(&mut self.steps);

        let scales = if self.state.last_scales.is_empty() {
            vec![ScaleId::C, ScaleId::D]
        } else {
            self.state.last_scales.clone()
        };
        let mut commands = vec![
            Command::SelectSide { scales: scales.clone() },
            Command::HighlightScales { scales },
        ];
        let result_text = format!("Result: {} = {}", self.display, fmt_sig(final_value, 3));
        let text = match self.state.check {
            Some((scale, expected)) => {
                commands.push(Command::VerifyReading {
                    scale,
                    expected,
                    tolerance: VERIFY_TOLERANCE,
                });
                format!(
                    "Check the hairline: the {} scale should read {}. {}",
                    self.profile.display_label(scale),
                    fmt_sig(expected, 4),
                    result_text
                )
            }
            None => result_text,
        };
        commands.push(Command::Narrate {
            narration: Narration {
                text,
                exponent: self.state.exponent,
                exponent_note: self.state.exponent_note.clone(),
            },
        });
        steps.push(Step {
            commands,
            delay_ms: delay::OBJECTIVE,
            visible: true,
        });

        steps.push(Step {
            commands: vec![
                Command::HighlightScales { scales: Vec::new() },
                Command::Narrate {
                    narration: Narration {
                        text: "Try again, or enter another equation.".to_owned(),
                        exponent: self.state.exponent,
                        exponent_note: self.state.exponent_note.clone(),
                    },
                },
            ],
            delay_ms: delay::TRY_AGAIN,
            visible: true,
        });
        steps
    }
}

/// Runs every handler over the trace and returns the finished step list.
pub(crate) fn emit(
    trace: &[TraceOp],
    profile: &RuleProfile,
    display: &str,
    final_value: f64,
) -> Vec<Step> {
    let mut emitter = Emitter::new(profile, display);
    let chain = is_division_chain(trace);
    let mut divisions_done = 0u32;
    for (i, op) in trace.iter().enumerate() {
        match *op {
            TraceOp::Init { value } => {
                if i == 0 {
                    emitter.first_init(value, trace);
                }
            }
            TraceOp::Binary { op: BinaryOp::Mul, left, right, result } => {
                let next_is_mul = matches!(
                    next_operation(trace, i),
                    Some(TraceOp::Binary { op: BinaryOp::Mul, .. })
                );
                emitter.multiply(left, right, result, next_is_mul);
            }
            TraceOp::Binary { op: BinaryOp::Div, left, right, result } => {
                emitter.divide(left, right, result, chain, divisions_done);
                if chain {
                    divisions_done += 1;
                }
            }
            TraceOp::Binary { op: BinaryOp::Pow, left, right, result } => {
                emitter.power(left, right, result);
            }
            TraceOp::Unary { func, arg, result } => {
                emitter.unary(func, arg, result);
            }
        }
    }
    emitter.finish(final_value)
}

fn next_operation(trace: &[TraceOp], after: usize) -> Option<&TraceOp> {
    trace[after + 1..]
        .iter()
        .find(|op| !matches!(op, TraceOp::Init { .. }))
}
