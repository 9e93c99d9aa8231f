//! Function handlers: roots, degree trig with small-angle routing, and
//! the two logarithm readings.

use super::{sign_note, square_root_half, Emitter, SquareHalf};
use crate::ast::UnaryFunc;
use slipstick_model::{delay, fmt_sig, Command, Decomposed, Face, ScaleId, SMALL_ANGLE_DEG};

/// Below this angle (degrees) even the ST scale runs out; one decade under
/// its upper limit.
fn st_floor() -> f64 {
    SMALL_ANGLE_DEG / 10.0
}

impl<'a> Emitter<'a> {
    pub(super) fn unary(&mut self, func: UnaryFunc, arg: f64, result: f64) {
        match func {
            UnaryFunc::Sqrt => self.square_root(arg, result),
            UnaryFunc::Sin => self.sine(arg, result),
            UnaryFunc::Cos => self.cosine(arg, result),
            UnaryFunc::Tan => self.tangent(arg, result),
            UnaryFunc::Log => self.log10_reading(arg, result),
            UnaryFunc::Ln => self.ln_reading(arg, result),
        }
    }

    /// Shared by `sqrt(x)` and `x^0.5`.
    pub(super) fn square_root(&mut self, arg: f64, result: f64) {
        let (Some(arg_d), Some(result_d)) = (Decomposed::of(arg), Decomposed::of(result))
        else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only("The square root of 0 is 0; there is nothing to set.");
            return;
        };
        let note = format!(
            "a square root halves the exponent: the result's magnitude is 10^{}",
            result_d.exponent
        );
        let a = fmt_sig(arg, 4);
        let r4 = fmt_sig(result, 4);
        let half = square_root_half(arg);

        if self.profile.has_squares_scale {
            let a_value = match half {
                SquareHalf::Left => arg_d.mantissa,
                SquareHalf::Right => arg_d.mantissa * 10.0,
            };
            let scales = [ScaleId::A, ScaleId::D];
            let Some(face) = self.profile.face_with_scales(&scales) else {
                self.commit(result, note);
                self.announce_only(format!(
                    "This rule cannot pair A with D; the square root of {a} is {r4}."
                ));
                return;
            };
            self.prepare_face(face, &scales);
            self.act(
                vec![Command::SelectSide { scales: scales.to_vec() }],
                delay::FACE_PREP,
            );
            self.prep_scales(&scales);
            self.commit(result, note);
            self.say(
                format!(
                    "Square root of {a}: the decimal exponent is {}, so use the {} half \
                     of the A scale. Move the cursor to {} on A and read the root on the \
                     D scale.",
                    half.parity(),
                    half.name(),
                    fmt_sig(a_value, 4)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![Command::PlaceCursor { scale: ScaleId::A, value: a_value }],
                delay::ACTION,
            );
            self.say(
                format!("Read the result {r4} on the D scale."),
                delay::MESSAGE,
            );
            self.state.face = face;
            self.state.on_primary = true;
            self.clear_chain_flags();
            self.state.check = Some((ScaleId::D, result_d.mantissa));
        } else {
            // Dual root scales: the value goes on D, the root is read from
            // R1 or R2, and the chain cannot continue from there without a
            // re-entry.
            let root_scale = match half {
                SquareHalf::Left => ScaleId::R1,
                SquareHalf::Right => ScaleId::R2,
            };
            let scales = [root_scale, ScaleId::D];
            let Some(face) = self.profile.face_with_scales(&scales) else {
                self.commit(result, note);
                self.announce_only(format!(
                    "This rule has no root path; the square root of {a} is {r4}."
                ));
                return;
            };
            self.prepare_face(face, &scales);
            self.act(
                vec![Command::SelectSide { scales: scales.to_vec() }],
                delay::FACE_PREP,
            );
            self.prep_scales(&scales);
            self.commit(result, note);
            self.say(
                format!(
                    "Square root of {a}: move the cursor to {} on the D scale. The \
                     decimal exponent is {}, which picks the {} scale; read the root \
                     there.",
                    fmt_sig(arg_d.mantissa, 4),
                    half.parity(),
                    root_scale.as_label()
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![Command::PlaceCursor { scale: ScaleId::D, value: arg_d.mantissa }],
                delay::ACTION,
            );
            self.say(
                format!("Read the result {r4} on {}.", root_scale.as_label()),
                delay::MESSAGE,
            );
            self.state.face = face;
            self.state.on_primary = false;
            self.clear_chain_flags();
            self.state.root_reentry = true;
            self.state.check = Some((root_scale, result_d.mantissa));
        }
    }

    fn sine(&mut self, arg: f64, result: f64) {
        if !(0.0..=90.0).contains(&arg) {
            self.commit(result, format!("computed arithmetically: sin({})", fmt_sig(arg, 4)));
            self.announce_only(format!(
                "The S scale covers 0 to 90 degrees and {} lies outside it. Computed \
                 directly: sin({}) = {}.",
                fmt_sig(arg, 4),
                fmt_sig(arg, 4),
                fmt_sig(result, 4)
            ));
            return;
        }
        let Some(result_d) = Decomposed::of(result) else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only(format!(
                "sin({}) is 0, which has no position on the scales.",
                fmt_sig(arg, 4)
            ));
            return;
        };
        let a = fmt_sig(arg, 4);
        let r4 = fmt_sig(result, 4);
        let note = format!(
            "sin({a}) = {} x 10^{}",
            fmt_sig(result_d.mantissa, 4),
            result_d.exponent
        );

        if arg < st_floor() {
            self.commit(result, note);
            self.announce_only(format!(
                "{a} degrees is below even the ST scale. For angles this small \
                 sin(x) is x times pi/180: sin({a}) = {r4}."
            ));
            return;
        }
        if arg <= SMALL_ANGLE_DEG {
            self.angle_reading(
                ScaleId::St,
                arg,
                result,
                note,
                format!(
                    "Sine of {a} degrees: angles at or below {SMALL_ANGLE_DEG} read on \
                     the small-angle ST scale. Move the cursor to {a} on ST and read the \
                     digits on the D scale."
                ),
                format!(
                    "Read sin({a}) = {r4} on the D scale; the ST decade spans 0.01 to \
                     0.1, which fixes the decimal."
                ),
                result_d.mantissa,
            );
        } else {
            self.angle_reading(
                ScaleId::S,
                arg,
                result,
                note,
                format!(
                    "Sine of {a} degrees: move the cursor to {a} on the S scale and read \
                     the digits on the D scale."
                ),
                format!(
                    "Read sin({a}) = {r4} on the D scale; a sine below 90 degrees is at \
                     most 1, which fixes the decimal."
                ),
                result_d.mantissa,
            );
        }
    }

    fn cosine(&mut self, arg: f64, result: f64) {
        if !(0.0..=90.0).contains(&arg) {
            self.commit(result, format!("computed arithmetically: cos({})", fmt_sig(arg, 4)));
            self.announce_only(format!(
                "The S scale covers 0 to 90 degrees and the complement of {} lies \
                 outside it. Computed directly: cos({}) = {}.{}",
                fmt_sig(arg, 4),
                fmt_sig(arg, 4),
                fmt_sig(result, 4),
                sign_note(result)
            ));
            return;
        }
        let complement = 90.0 - arg;
        let Some(result_d) = Decomposed::of(result) else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only(format!(
                "cos({}) is 0, which has no position on the scales.",
                fmt_sig(arg, 4)
            ));
            return;
        };
        let a = fmt_sig(arg, 4);
        let c = fmt_sig(complement, 4);
        let r4 = fmt_sig(result, 4);
        let note = format!(
            "cos({a}) = {} x 10^{}",
            fmt_sig(result_d.mantissa, 4),
            result_d.exponent
        );

        if complement < st_floor() {
            self.commit(result, note);
            self.announce_only(format!(
                "{a} degrees is so close to 90 that even the ST scale cannot resolve its \
                 complement. Computed directly: cos({a}) = {r4}."
            ));
            return;
        }
        if complement <= SMALL_ANGLE_DEG {
            self.angle_reading(
                ScaleId::St,
                complement,
                result,
                note,
                format!(
                    "Cosine of {a} degrees: on the rule cos(x) = sin(90 - x). The \
                     complement {c} is small, so move the cursor to {c} on the ST scale \
                     and read the digits on the D scale."
                ),
                format!(
                    "Read cos({a}) = {r4} on the D scale; the ST decade spans 0.01 to \
                     0.1, which fixes the decimal."
                ),
                result_d.mantissa,
            );
        } else {
            self.angle_reading(
                ScaleId::S,
                complement,
                result,
                note,
                format!(
                    "Cosine of {a} degrees: on the rule cos(x) = sin(90 - x). Move the \
                     cursor to the complement {c} on the S scale and read the digits on \
                     the D scale."
                ),
                format!(
                    "Read cos({a}) = {r4} on the D scale; a cosine is at most 1, which \
                     fixes the decimal."
                ),
                result_d.mantissa,
            );
        }
    }

    fn tangent(&mut self, arg: f64, result: f64) {
        if !(0.0..90.0).contains(&arg) {
            self.commit(result, format!("computed arithmetically: tan({})", fmt_sig(arg, 4)));
            self.announce_only(format!(
                "The T scale works below 90 degrees and {} lies outside that. Computed \
                 directly: tan({}) = {}.{}",
                fmt_sig(arg, 4),
                fmt_sig(arg, 4),
                fmt_sig(result, 4),
                sign_note(result)
            ));
            return;
        }
        let Some(result_d) = Decomposed::of(result) else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only(format!(
                "tan({}) is 0, which has no position on the scales.",
                fmt_sig(arg, 4)
            ));
            return;
        };
        let a = fmt_sig(arg, 4);
        let r4 = fmt_sig(result, 4);
        let note = format!(
            "tan({a}) = {} x 10^{}",
            fmt_sig(result_d.mantissa, 4),
            result_d.exponent
        );

        if arg < st_floor() {
            self.commit(result, note);
            self.announce_only(format!(
                "{a} degrees is below even the ST scale. For angles this small \
                 tan(x) is x times pi/180: tan({a}) = {r4}."
            ));
            return;
        }
        if arg <= SMALL_ANGLE_DEG {
            self.angle_reading(
                ScaleId::St,
                arg,
                result,
                note,
                format!(
                    "Tangent of {a} degrees: below {SMALL_ANGLE_DEG} degrees tangent and \
                     sine coincide at scale resolution, so use the ST scale. Move the \
                     cursor to {a} on ST and read the digits on the D scale."
                ),
                format!(
                    "Read tan({a}) = {r4} on the D scale; the ST decade spans 0.01 to \
                     0.1, which fixes the decimal."
                ),
                result_d.mantissa,
            );
            return;
        }
        if arg <= 45.0 {
            self.angle_reading(
                ScaleId::T,
                arg,
                result,
                note,
                format!(
                    "Tangent of {a} degrees: move the cursor to {a} on the T scale and \
                     read the digits on the D scale."
                ),
                format!(
                    "Read tan({a}) = {r4} on the D scale; tangents between \
                     {SMALL_ANGLE_DEG} and 45 degrees run 0.1 to 1, which fixes the \
                     decimal."
                ),
                result_d.mantissa,
            );
            return;
        }

        let complement = 90.0 - arg;
        if complement < SMALL_ANGLE_DEG {
            // Past T's reversed span; the complement leaves the scale.
            self.commit(result, note);
            self.announce_only(format!(
                "Beyond {} degrees even the complement leaves the T scale. Computed \
                 directly: tan({a}) = {r4}.",
                fmt_sig(90.0 - SMALL_ANGLE_DEG, 4)
            ));
            return;
        }

        // 45 to 84.26 degrees: the T scale's reversed numbering, read
        // against CI. The reciprocal relation only holds with the slide at
        // its index.
        let c = fmt_sig(complement, 4);
        let scales = [ScaleId::T, ScaleId::Ci, ScaleId::D];
        self.prepare_face(Face::Back, &scales);
        self.prep_scales(&scales);
        self.commit(result, note);
        self.say(
            format!(
                "Tangent of {a} degrees: above 45 the T scale reads through its \
                 reversed numbering, against CI. First bring the slide to its index so \
                 CI reads true reciprocals."
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![
                Command::SelectSide { scales: scales.to_vec() },
                Command::PlaceCursor { scale: ScaleId::D, value: 1.0 },
            ],
            delay::ACTION,
        );
        self.act(
            vec![Command::PlaceBodyIndex { scale: ScaleId::C, value: 1.0 }],
            delay::ACTION,
        );
        self.say(
            format!(
                "Move the cursor to the complement {c} on the T scale; tan({a}) = \
                 1/tan({c}), and the CI scale takes that reciprocal for you."
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::T, value: complement }],
            delay::ACTION,
        );
        self.say(
            format!(
                "Read tan({a}) = {r4} on the CI scale under the hairline; tangents \
                 between 45 and 84.26 degrees run 1 to 10."
            ),
            delay::MESSAGE,
        );
        self.state.face = Face::Back;
        self.state.on_primary = false;
        self.clear_chain_flags();
        self.state.check = Some((ScaleId::Ci, result_d.mantissa));
    }

    /// Common body for the angle scales: cursor to the angle, digits on D.
    #[allow(clippy::too_many_arguments)]
    fn angle_reading(
        &mut self,
        scale: ScaleId,
        angle: f64,
        result: f64,
        note: String,
        instruction: String,
        reading: String,
        expected_digits: f64,
    ) {
        let scales = [scale, ScaleId::D];
        let Some(face) = self.profile.face_with_scales(&scales) else {
            self.commit(result, note);
            self.announce_only(format!(
                "This rule has no {} scale. {reading}",
                scale.as_label()
            ));
            return;
        };
        self.prepare_face(face, &scales);
        self.act(
            vec![Command::SelectSide { scales: scales.to_vec() }],
            delay::FACE_PREP,
        );
        self.prep_scales(&scales);
        self.commit(result, note);
        self.say(instruction, delay::MESSAGE);
        self.act(
            vec![Command::PlaceCursor { scale, value: angle }],
            delay::ACTION,
        );
        self.say(reading, delay::MESSAGE);
        self.state.face = face;
        self.state.on_primary = true;
        self.clear_chain_flags();
        self.state.check = Some((ScaleId::D, expected_digits));
    }

    fn log10_reading(&mut self, arg: f64, result: f64) {
        let Some(arg_d) = Decomposed::of(arg) else {
            // cannot happen: the domain pass requires arg > 0
            self.commit(result, "no logarithm".to_owned());
            self.announce_only("The logarithm's argument has no scale position.");
            return;
        };
        let fraction = arg_d.mantissa.log10();
        let a = fmt_sig(arg, 4);
        let f4 = fmt_sig(fraction, 4);
        let r4 = fmt_sig(result, 4);
        let note = format!(
            "log10 splits into fraction {f4} plus characteristic {}",
            arg_d.exponent
        );
        let scales = [ScaleId::L, ScaleId::D];
        let Some(face) = self.profile.face_with_scales(&scales) else {
            self.commit(result, note);
            self.announce_only(format!("This rule has no L scale; log10({a}) = {r4}."));
            return;
        };
        self.prepare_face(face, &scales);
        self.act(
            vec![Command::SelectSide { scales: scales.to_vec() }],
            delay::FACE_PREP,
        );
        self.prep_scales(&scales);
        self.commit(result, note);
        self.say(
            format!(
                "Log10 of {a}: move the cursor to {} on the D scale and read the \
                 decimal fraction on the {} scale.",
                fmt_sig(arg_d.mantissa, 4),
                self.profile.display_label(ScaleId::L)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::D, value: arg_d.mantissa }],
            delay::ACTION,
        );
        self.say(
            format!(
                "The L scale reads {f4}. That is the fractional part; adding the \
                 characteristic {} (the decimal exponent of {a}) gives log10({a}) = \
                 {r4}. {r4} is the value any following step works with.",
                arg_d.exponent
            ),
            delay::MESSAGE,
        );
        self.state.face = face;
        self.state.on_primary = false;
        self.clear_chain_flags();
        self.state.check = Some((ScaleId::L, fraction));
    }

    fn ln_reading(&mut self, arg: f64, result: f64) {
        let Some(arg_d) = Decomposed::of(arg) else {
            self.commit(result, "no logarithm".to_owned());
            self.announce_only("The logarithm's argument has no scale position.");
            return;
        };
        let a = fmt_sig(arg, 4);
        let r4 = fmt_sig(result, 4);

        if let Some(band) = self.profile.log_log_band(arg) {
            let digits = Decomposed::of(result).map_or(1.0, |d| d.mantissa);
            let note = format!(
                "ln is read directly from the band alignment; its magnitude is 10^{}",
                Decomposed::of(result).map_or(0, |d| d.exponent)
            );
            let label = band.scale.as_label();
            let scales = [band.scale, ScaleId::D];
            let Some(face) = self.profile.face_with_scales(&scales) else {
                self.commit(result, note);
                self.announce_only(format!("This rule has no {label} scale; ln({a}) = {r4}."));
                return;
            };
            self.prepare_face(face, &scales);
            self.act(
                vec![Command::SelectSide { scales: scales.to_vec() }],
                delay::FACE_PREP,
            );
            self.prep_scales(&scales);
            self.commit(result, note);
            self.say(
                format!(
                    "Natural log of {a}: the D scale is aligned with the log-log bands, \
                     so ln is read directly. Find {a} on the {label} scale.",
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![Command::PlaceCursor { scale: band.scale, value: arg }],
                delay::ACTION,
            );
            self.say(
                format!(
                    "With the hairline over {a} on {label}, read the digits on the D \
                     scale. {label} covers ln between {} and {}, so ln({a}) = {r4}.{}",
                    fmt_sig(band.ln_lo, 3),
                    fmt_sig(band.ln_hi, 3),
                    sign_note(result)
                ),
                delay::MESSAGE,
            );
            self.state.face = face;
            self.state.on_primary = true;
            self.clear_chain_flags();
            self.state.check = Some((ScaleId::D, digits));
            return;
        }

        // No band holds the argument (too close to 1, past the band ends,
        // or a layout without reciprocal bands): go through L and convert.
        let fraction = arg_d.mantissa.log10();
        let log10_value = result / std::f64::consts::LN_10;
        let note = format!(
            "ln converts from log10: log10({a}) x 2.303 = {r4}"
        );
        let scales = [ScaleId::L, ScaleId::D];
        let Some(face) = self.profile.face_with_scales(&scales) else {
            self.commit(result, note);
            self.announce_only(format!("This rule has no L scale; ln({a}) = {r4}."));
            return;
        };
        self.prepare_face(face, &scales);
        self.act(
            vec![Command::SelectSide { scales: scales.to_vec() }],
            delay::FACE_PREP,
        );
        self.prep_scales(&scales);
        self.commit(result, note);
        self.say(
            format!(
                "Natural log of {a}: no log-log band holds this value, so read log10 \
                 first. Move the cursor to {} on the D scale.",
                fmt_sig(arg_d.mantissa, 4)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::D, value: arg_d.mantissa }],
            delay::ACTION,
        );
        self.say(
            format!(
                "Read log10({a}) = {} on the L scale (fraction {} plus characteristic \
                 {}), then convert: ln(x) = log10(x) x 2.303 = {r4}.{}",
                fmt_sig(log10_value, 4),
                fmt_sig(fraction, 4),
                arg_d.exponent,
                sign_note(result)
            ),
            delay::MESSAGE,
        );
        self.state.face = face;
        self.state.on_primary = false;
        self.clear_chain_flags();
        self.state.check = Some((ScaleId::L, fraction));
    }
}
