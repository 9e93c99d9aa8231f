//! Power handlers: the A/K special cases, the log-log bands, and the
//! four-step log method for everything past them.

use super::{cube_root_third, sign_note, third_name, Emitter};
use slipstick_model::{delay, fmt_sig, Command, Decomposed, LogLogBand, ScaleId};

impl<'a> Emitter<'a> {
    pub(super) fn power(&mut self, base: f64, exponent: f64, result: f64) {
        if exponent == 2.0 {
            return self.square(base, result);
        }
        if exponent == 3.0 {
            return self.cube(base, result);
        }
        if exponent == 0.5 {
            return self.square_root(base, result);
        }
        if (exponent - 1.0 / 3.0).abs() < 1e-9 {
            return self.cube_root(base, result);
        }
        if base > 0.0 && result > 0.0 {
            return self.general_power(base, exponent, result);
        }
        // A base at or below zero has no logarithm; no scale can hold it.
        self.commit(result, "computed arithmetically".to_owned());
        self.announce_only(format!(
            "The power {}^{} cannot be set on logarithmic scales (the base has no \
             logarithm). Computed directly, it is {}.",
            fmt_sig(base, 4),
            fmt_sig(exponent, 4),
            fmt_sig(result, 4)
        ));
    }

    fn square(&mut self, base: f64, result: f64) {
        let (Some(base_d), Some(result_d)) = (Decomposed::of(base), Decomposed::of(result))
        else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only("0 squared is 0; there is nothing to set on the scales.");
            return;
        };
        let naive = 2 * base_d.exponent;
        let mut note = format!(
            "squaring doubles the exponent: 2 x {} = {}",
            base_d.exponent, naive
        );
        if result_d.exponent > naive {
            note.push_str("; the mantissa square passed 10, carrying one more");
        }
        let b = fmt_sig(base, 4);
        let r4 = fmt_sig(result, 4);

        if self.profile.has_squares_scale {
            let scales = [ScaleId::A, ScaleId::D];
            let Some(face) = self.profile.face_with_scales(&scales) else {
                self.commit(result, note);
                self.announce_only(format!("This rule cannot pair A with D; {b} squared is {r4}."));
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
                    "Square {b}: move the cursor to {} on the D scale and read the square \
                     on the A scale directly above.",
                    fmt_sig(base_d.mantissa, 4)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![Command::PlaceCursor { scale: ScaleId::D, value: base_d.mantissa }],
                delay::ACTION,
            );
            self.say(
                format!("Read the result {r4} on the A scale.{}", sign_note(result)),
                delay::MESSAGE,
            );
            self.state.face = face;
            self.state.on_primary = false;
            self.state.check = Some((ScaleId::A, base_d.mantissa * base_d.mantissa));
        } else {
            // No A scale: the dual root scales run in reverse, value on R,
            // square on D.
            let root_scale = if base_d.mantissa < 10f64.sqrt() {
                ScaleId::R1
            } else {
                ScaleId::R2
            };
            let scales = [root_scale, ScaleId::D];
            let Some(face) = self.profile.face_with_scales(&scales) else {
                self.commit(result, note);
                self.announce_only(format!("This rule has no squares path; {b} squared is {r4}."));
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
                    "Square {b}: this rule has no A scale, but the root scales work in \
                     reverse. Move the cursor to {} on {} and read the square on the D \
                     scale.",
                    fmt_sig(base_d.mantissa, 4),
                    root_scale.as_label()
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![Command::PlaceCursor { scale: root_scale, value: base_d.mantissa }],
                delay::ACTION,
            );
            self.say(
                format!("Read the result {r4} on the D scale.{}", sign_note(result)),
                delay::MESSAGE,
            );
            self.state.face = face;
            self.state.on_primary = true;
            self.state.check = Some((ScaleId::D, result_d.mantissa));
        }
        self.clear_chain_flags();
    }

    fn cube(&mut self, base: f64, result: f64) {
        let (Some(base_d), Some(result_d)) = (Decomposed::of(base), Decomposed::of(result))
        else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only("0 cubed is 0; there is nothing to set on the scales.");
            return;
        };
        let naive = 3 * base_d.exponent;
        let mut note = format!(
            "cubing triples the exponent: 3 x {} = {}",
            base_d.exponent, naive
        );
        if result_d.exponent > naive {
            note.push_str(&format!(
                "; the mantissa cube carried {} more",
                result_d.exponent - naive
            ));
        }
        let b = fmt_sig(base, 4);
        let r4 = fmt_sig(result, 4);
        let scales = [ScaleId::K, ScaleId::D];
        let Some(face) = self.profile.face_with_scales(&scales) else {
            self.commit(result, note);
            self.announce_only(format!("This rule has no K scale; {b} cubed is {r4}."));
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
                "Cube {b}: move the cursor to {} on the D scale and read the cube on the \
                 K scale; its three decades absorb the carry.",
                fmt_sig(base_d.mantissa, 4)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::D, value: base_d.mantissa }],
            delay::ACTION,
        );
        self.say(
            format!("Read the result {r4} on the K scale.{}", sign_note(result)),
            delay::MESSAGE,
        );
        self.state.face = face;
        self.state.on_primary = false;
        self.clear_chain_flags();
        let k_reading = base_d.mantissa * base_d.mantissa * base_d.mantissa;
        self.state.check = Some((ScaleId::K, k_reading));
    }

    fn cube_root(&mut self, base: f64, result: f64) {
        let (Some(base_d), Some(result_d)) = (Decomposed::of(base), Decomposed::of(result))
        else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only("The cube root of 0 is 0; there is nothing to set.");
            return;
        };
        let third = cube_root_third(base);
        let k_value = base_d.mantissa * 10f64.powi(third);
        let note = format!(
            "a cube root cuts the exponent to a third: the result's magnitude is 10^{}",
            result_d.exponent
        );
        let b = fmt_sig(base, 4);
        let r4 = fmt_sig(result, 4);
        let scales = [ScaleId::K, ScaleId::D];
        let Some(face) = self.profile.face_with_scales(&scales) else {
            self.commit(result, note);
            self.announce_only(format!(
                "This rule has no K scale; the cube root of {b} is {r4}."
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
                "Cube root of {b}: the decimal exponent picks the {} third of the K \
                 scale. Move the cursor to {} on K and read the root on the D scale.",
                third_name(third),
                fmt_sig(k_value, 4)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::K, value: k_value }],
            delay::ACTION,
        );
        self.say(
            format!("Read the result {r4} on the D scale.{}", sign_note(result)),
            delay::MESSAGE,
        );
        self.state.face = face;
        self.state.on_primary = true;
        self.clear_chain_flags();
        self.state.check = Some((ScaleId::D, result_d.mantissa));
    }

    fn general_power(&mut self, base: f64, exponent: f64, result: f64) {
        // The log method takes over when the exponent runs off C's single
        // decade, when the result runs off LL3, or when no band holds
        // either endpoint.
        if exponent.abs() >= 10.0 || result.ln().abs() > 10.0 {
            return self.power_by_logs(base, exponent, result);
        }
        let (Some(base_band), Some(result_band)) = (
            self.profile.log_log_band(base),
            self.profile.log_log_band(result),
        ) else {
            return self.power_by_logs(base, exponent, result);
        };
        self.power_on_log_log(base_band, result_band, base, exponent, result);
    }

    fn power_on_log_log(
        &mut self,
        base_band: LogLogBand,
        result_band: LogLogBand,
        base: f64,
        exponent: f64,
        result: f64,
    ) {
        let (Some(result_d), Some(exp_d)) = (Decomposed::of(result), Decomposed::of(exponent))
        else {
            // exponent 0 never reaches here (its result 1 has no band)
            return self.power_by_logs(base, exponent, result);
        };
        let mut scales = vec![base_band.scale];
        if result_band.scale != base_band.scale {
            scales.push(result_band.scale);
        }
        scales.push(ScaleId::C);
        scales.push(ScaleId::D);
        let Some(face) = self.profile.face_with_scales(&scales) else {
            return self.power_by_logs(base, exponent, result);
        };

        // The exponent goes on C as its mantissa; each decade it is scaled
        // by moves the reading one band along.
        let c_value = exp_d.mantissa;
        let band_jumps = -exp_d.exponent;

        let mut note = format!("the power's magnitude is 10^{}", result_d.exponent);
        if exponent < 0.0 {
            note.push_str("; the negative exponent reflects the reading onto the reciprocal bands");
        }
        let b = fmt_sig(base, 4);
        let e = fmt_sig(exponent, 4);

        self.prepare_face(face, &scales);
        self.act(
            vec![Command::SelectSide { scales: scales.clone() }],
            delay::FACE_PREP,
        );
        self.prep_scales(&scales);
        self.commit(result, note);

        self.say(
            format!(
                "Power {b}^{e} using the log-log scales: set the hairline over {b} on \
                 the {} scale. The log-log bands carry true values, not mantissas.",
                base_band.scale.as_label()
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![
                Command::SelectSide { scales: scales.clone() },
                Command::PlaceCursor { scale: base_band.scale, value: base },
            ],
            delay::ACTION,
        );
        self.say(
            "Move the slide so the left index (1) of C is under the cursor. The rule is \
             now set for this base."
                .to_owned(),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceBodyIndex { scale: ScaleId::C, value: 1.0 }],
            delay::ACTION,
        );

        let mut move_text = format!(
            "Move the cursor to {} on the C scale (standing in for the exponent {e}).",
            fmt_sig(c_value, 4)
        );
        if exponent < 0.0 {
            move_text.push_str(
                " The exponent is negative, so the reading reflects onto the reciprocal \
                 LL/ bands.",
            );
        }
        if band_jumps > 0 {
            move_text.push_str(&format!(
                " The exponent is below 1, so the reading drops {band_jumps} band{} \
                 toward 1.",
                if band_jumps == 1 { "" } else { "s" }
            ));
        }
        self.say(move_text, delay::MESSAGE);
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::C, value: c_value }],
            delay::ACTION,
        );

        self.say(
            format!(
                "Read {} under the hairline on the {} scale. (Do not read D here: on \
                 the log-log bands the value under the hairline is absolute.)",
                fmt_sig(result, 4),
                result_band.scale.as_label()
            ),
            delay::MESSAGE,
        );
        self.state.face = face;
        self.state.on_primary = false;
        self.clear_chain_flags();
        self.state.check = Some((result_band.scale, result));
    }

    /// Four named sub-steps through L, C and D. Always available, whatever
    /// the band layout, because it only ever multiplies logarithms.
    fn power_by_logs(&mut self, base: f64, exponent: f64, result: f64) {
        let (Some(base_d), Some(result_d)) = (Decomposed::of(base), Decomposed::of(result))
        else {
            self.commit(result, "beyond representable magnitudes".to_owned());
            self.announce_only(format!(
                "The power {}^{} cannot be represented; computed directly it is {}.",
                fmt_sig(base, 4),
                fmt_sig(exponent, 4),
                fmt_sig(result, 4)
            ));
            return;
        };
        let log10_base = base.log10();
        let Some(log_d) = Decomposed::of(log10_base) else {
            // base exactly 1
            self.commit(result, "1 to any power is 1".to_owned());
            self.announce_only("1 raised to any power is 1; there is nothing to set.");
            return;
        };
        let Some(exp_d) = Decomposed::of(exponent) else {
            self.commit(result, "a zero exponent gives 1".to_owned());
            self.announce_only("Any base to the power 0 is 1; there is nothing to set.");
            return;
        };

        let product = exponent * log10_base;
        let characteristic = product.floor();
        let fraction = product - characteristic;
        let antilog = 10f64.powf(fraction);
        let char_i = characteristic as i64;

        let d_value = log_d.mantissa;
        let c_value = exp_d.mantissa;
        let mantissa_product = d_value * c_value;
        let use_right = mantissa_product > 10.0;
        let index = if use_right { 10.0 } else { 1.0 };
        let read_on_d = if use_right {
            mantissa_product / 10.0
        } else {
            mantissa_product
        };

        let scales = [ScaleId::L, ScaleId::C, ScaleId::D];
        let Some(face) = self.profile.face_with_scales(&scales) else {
            self.commit(result, "computed arithmetically".to_owned());
            self.announce_only(format!(
                "This rule cannot pair L with C and D; {}^{} is {}.",
                fmt_sig(base, 4),
                fmt_sig(exponent, 4),
                fmt_sig(result, 4)
            ));
            return;
        };

        let b3 = fmt_sig(base, 3);
        let e4 = fmt_sig(exponent, 4);
        let l3 = fmt_sig(log10_base, 3);
        let f3 = fmt_sig(fraction, 3);
        let a3 = fmt_sig(antilog, 3);

        let reason = if result.ln().abs() > 10.0 {
            "runs past the end of the LL3 scale (about 22,026)"
        } else if exponent.abs() >= 10.0 {
            "has an exponent beyond the single decade of C"
        } else {
            "falls where no log-log band can resolve it"
        };

        self.prepare_face(face, &scales);
        self.act(
            vec![Command::SelectSide { scales: scales.to_vec() }],
            delay::FACE_PREP,
        );
        self.prep_scales(&scales);
        self.commit(
            result,
            format!(
                "the characteristic of {e4} x log10({b3}) is {char_i}, which becomes \
                 the decimal exponent"
            ),
        );

        self.say(
            format!(
                "{b3}^{e4} = {} x 10^{} {reason}. Use the log method: \
                 log10(a^b) = b x log10(a).",
                fmt_sig(result_d.mantissa, 3),
                result_d.exponent
            ),
            delay::MESSAGE,
        );
        self.say(
            format!(
                "Step A: find log10({b3}). Move the cursor to {} on D and read the L \
                 scale: log10({b3}) is about {l3}.",
                fmt_sig(base_d.mantissa, 4)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::D, value: base_d.mantissa }],
            delay::ACTION,
        );
        self.say(
            format!(
                "Step B: multiply {e4} x {l3} on C and D. Set the {} of C over {} on D \
                 (standing in for {l3}), then move the cursor to {} on the C scale \
                 (standing in for {e4}).",
                super::index_label(index),
                fmt_sig(d_value, 4),
                fmt_sig(c_value, 4)
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::D, value: d_value }],
            delay::ACTION,
        );
        self.act(
            vec![Command::PlaceBodyIndex { scale: ScaleId::C, value: index }],
            delay::ACTION,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::C, value: c_value }],
            delay::ACTION,
        );
        self.say(
            format!(
                "Step C: read {} on D under the hairline; it stands for {}. Split that \
                 into characteristic {char_i} and log mantissa {f3}.",
                fmt_sig(read_on_d, 3),
                fmt_sig(product, 4)
            ),
            delay::MESSAGE,
        );
        self.say(
            format!(
                "Step D: take the antilog. Move the cursor to {f3} on the L scale and \
                 read the result mantissa on D: about {a3} (a slide-rule reading, 3-4 \
                 significant figures)."
            ),
            delay::MESSAGE,
        );
        self.act(
            vec![Command::PlaceCursor { scale: ScaleId::L, value: fraction }],
            delay::ACTION,
        );
        self.say(
            format!(
                "Result: {b3}^{e4} = {a3} x 10^{char_i}, in full {} x 10^{}.",
                fmt_sig(result_d.mantissa, 3),
                result_d.exponent
            ),
            delay::MESSAGE,
        );
        self.state.face = face;
        self.state.on_primary = true;
        self.clear_chain_flags();
        self.state.check = Some((ScaleId::D, result_d.mantissa));
    }
}
