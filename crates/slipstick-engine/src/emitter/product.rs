//! Multiply and divide handlers: index seating, the folded-scale escape,
//! and the inverted-scale shortcuts that keep a chain moving without
//! slide traffic.

use super::{
    division_method, in_range, index_label, position_c, read_index, sign_note, DivisionMethod,
    Emitter,
};
use slipstick_model::{delay, fmt_sig, Command, Decomposed, Face, ScaleId};

impl<'a> Emitter<'a> {
    pub(super) fn multiply(&mut self, left: f64, right: f64, result: f64, next_is_mul: bool) {
        if self.state.value != left && self.state.value != right {
            self.reseat_on_primary(
                left,
                format!(
                    "This part of the expression starts fresh with {}. Move the cursor \
                     to {} on the D scale.",
                    fmt_sig(left, 4),
                    Decomposed::of(left).map_or_else(|| fmt_sig(left, 4), |d| fmt_sig(d.mantissa, 4))
                ),
            );
        }
        // The running value is one operand; the other is the factor to set.
        let factor = if self.state.value == right { left } else { right };

        let (Some(factor_d), Some(result_d)) = (Decomposed::of(factor), Decomposed::of(result))
        else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only(format!(
                "Multiplying by {} gives {}; zero has no position on a logarithmic \
                 scale, so this step is arithmetic only.",
                fmt_sig(factor, 4),
                fmt_sig(result, 4)
            ));
            return;
        };

        self.transfer_to_primary();
        self.reenter_from_root_scales();

        let running_m = self.state.mantissa;
        let old_exponent = self.state.exponent;
        let naive = old_exponent + factor_d.exponent;
        let mut note = format!(
            "exponents add: {old_exponent} + {} = {naive}",
            factor_d.exponent
        );
        if result_d.exponent > naive {
            note.push_str("; the mantissa product passed 10, carrying one more");
        }
        let product_4 = fmt_sig(result, 4);
        let factor_m = factor_d.mantissa;

        // Cursor-only shortcut armed by a previous inverted-scale multiply:
        // the product is at the body index and the slide already holds the
        // next setting.
        if self.state.inverted_chain {
            self.state.inverted_chain = false;
            if let Some(shift) = self.state.slide_shift {
                if in_range(position_c(shift, factor_m)) {
                    self.prep_scales(&[ScaleId::C, ScaleId::D]);
                    self.commit(result, note);
                    self.say(
                        format!(
                            "The slide is already set from the previous product. Move \
                             the cursor straight to {} on the C scale and read {} on \
                             the D scale; no slide movement is needed.{}",
                            fmt_sig(factor_m, 4),
                            product_4,
                            sign_note(result)
                        ),
                        delay::MESSAGE,
                    );
                    self.act(
                        vec![Command::PlaceCursor { scale: ScaleId::C, value: factor_m }],
                        delay::ACTION,
                    );
                    self.state.on_primary = true;
                    self.state.cursor_at_index = false;
                    self.state.check = Some((ScaleId::D, result_d.mantissa));
                    return;
                }
            }
            // Factor out of reach at this setting; fall through to the
            // standard method.
        }

        self.prepare_face(Face::Front, &[ScaleId::C, ScaleId::D]);

        let shift_left = running_m.log10();
        let shift_right = shift_left - 1.0;
        let left_reachable = in_range(position_c(shift_left, factor_m));
        let right_reachable = in_range(position_c(shift_right, factor_m));

        if !left_reachable && !right_reachable {
            // Neither index brings the factor onto the body; the pi-folded
            // pair always can.
            let scales = [ScaleId::Cf, ScaleId::Df];
            self.prep_scales(&scales);
            self.commit(result, note);
            self.say(
                format!(
                    "The factor {} falls off the C scale at this setting; use the \
                     folded scales. Set the cursor to {} on DF, bring the CF index to \
                     the cursor, then move the cursor to {} on CF and read the product \
                     on DF.",
                    fmt_sig(factor, 4),
                    fmt_sig(running_m, 4),
                    fmt_sig(factor_m, 4)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![
                    Command::SelectSide { scales: scales.to_vec() },
                    Command::PlaceCursor { scale: ScaleId::Df, value: running_m },
                ],
                delay::ACTION,
            );
            self.act(
                vec![Command::PlaceBodyIndex { scale: ScaleId::Cf, value: 1.0 }],
                delay::ACTION,
            );
            self.act(
                vec![Command::PlaceCursor { scale: ScaleId::Cf, value: factor_m }],
                delay::ACTION,
            );
            self.say(
                format!(
                    "Read the intermediate result {product_4} on the DF scale.{}",
                    sign_note(result)
                ),
                delay::MESSAGE,
            );
            self.state.on_primary = false;
            self.clear_chain_flags();
            self.state.check = Some((ScaleId::Df, result_d.mantissa));
            return;
        }

        if next_is_mul {
            // Another multiply follows: set the factor on CI instead. The
            // product forms at the body index and the slide needs no move
            // for the next factor.
            let new_shift = shift_left - (1.0 - factor_m.log10());
            // The product reads at the left index only once the mantissa
            // product reaches a full decade.
            let index = read_index(new_shift, running_m * factor_m / 10.0);
            let label = index_label(index);
            let scales = [ScaleId::C, ScaleId::D, ScaleId::Ci];
            self.prep_scales(&scales);
            self.commit(result, note);
            self.say(
                format!(
                    "Multiply using the inverted scale: keep the hairline on {} on D \
                     and move the slide so {} on the CI scale sits under it. The \
                     product {product_4} forms on D under the {label} of C, leaving the \
                     slide set for the next factor.{}",
                    fmt_sig(running_m, 4),
                    fmt_sig(factor_m, 4),
                    sign_note(result)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![
                    Command::SelectSide { scales: scales.to_vec() },
                    Command::PlaceCursor { scale: ScaleId::D, value: running_m },
                ],
                delay::ACTION,
            );
            self.act(
                vec![Command::PlaceBodyIndex { scale: ScaleId::Ci, value: factor_m }],
                delay::ACTION,
            );
            self.say(
                format!(
                    "Read the intermediate result {product_4} on the D scale under the \
                     {label}."
                ),
                delay::MESSAGE,
            );
            self.state.on_primary = false;
            self.state.cursor_at_index = false;
            self.state.slide_shift = Some(new_shift);
            self.state.inverted_chain = true;
            self.state.check = None;
            return;
        }

        // An index may already sit over the running value (the opening seat,
        // or a division that just parked its quotient there). If it does and
        // the factor is reachable, the slide stays put.
        let current = self.state.slide_shift;
        let keep_left =
            left_reachable && current.is_some_and(|s| (s - shift_left).abs() < 1e-9);
        let keep_right =
            right_reachable && current.is_some_and(|s| (s - shift_right).abs() < 1e-9);
        let use_right_index = if keep_left {
            false
        } else if keep_right {
            true
        } else {
            !left_reachable
        };
        let index = if use_right_index { 10.0 } else { 1.0 };
        let label = index_label(index);
        self.prep_scales(&[ScaleId::C, ScaleId::D]);
        self.commit(result, note);
        if keep_left || keep_right {
            self.say(
                format!(
                    "Multiply by {}: the slide is already set with the {label} of C \
                     over {}. Move the cursor to {} on the C scale.",
                    fmt_sig(factor, 4),
                    fmt_sig(running_m, 4),
                    fmt_sig(factor_m, 4)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![
                    Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                    Command::PlaceCursor { scale: ScaleId::C, value: factor_m },
                ],
                delay::ACTION,
            );
        } else {
            self.say(
                format!(
                    "Multiply by {}: move the slide so the {label} on C is over {} on \
                     the D scale.",
                    fmt_sig(factor, 4),
                    fmt_sig(running_m, 4)
                ),
                delay::MESSAGE,
            );
            self.act(
                vec![
                    Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                    Command::PlaceCursor { scale: ScaleId::D, value: running_m },
                ],
                delay::ACTION,
            );
            self.act(
                vec![Command::PlaceBodyIndex { scale: ScaleId::C, value: index }],
                delay::ACTION,
            );
            self.say(
                format!("Move the cursor to {} on the C scale.", fmt_sig(factor_m, 4)),
                delay::MESSAGE,
            );
            self.act(
                vec![Command::PlaceCursor { scale: ScaleId::C, value: factor_m }],
                delay::ACTION,
            );
        }
        let decimal_hint = if use_right_index {
            format!(" (The right index shifted the decade; the result is {product_4}.)")
        } else {
            String::new()
        };
        self.say(
            format!(
                "Read the intermediate result {product_4} on the D scale.{decimal_hint}{}",
                sign_note(result)
            ),
            delay::MESSAGE,
        );
        self.state.on_primary = true;
        self.state.cursor_at_index = false;
        self.state.slide_shift = Some(if use_right_index { shift_right } else { shift_left });
        self.state.inverted_chain = false;
        self.state.root_reentry = false;
        self.state.check = Some((ScaleId::D, result_d.mantissa));
    }

    pub(super) fn divide(
        &mut self,
        dividend: f64,
        divisor: f64,
        result: f64,
        in_chain: bool,
        divisions_done: u32,
    ) {
        if self.state.value != dividend {
            let text = if self.state.value == divisor {
                format!(
                    "The rule holds the divisor {}; the division starts from the \
                     dividend instead. Move the cursor to {} on the D scale to set {}.",
                    fmt_sig(divisor, 4),
                    Decomposed::of(dividend)
                        .map_or_else(|| fmt_sig(dividend, 4), |d| fmt_sig(d.mantissa, 4)),
                    fmt_sig(dividend, 4)
                )
            } else {
                format!(
                    "Set the dividend for this part of the expression: move the cursor \
                     to {} on the D scale ({}).",
                    Decomposed::of(dividend)
                        .map_or_else(|| fmt_sig(dividend, 4), |d| fmt_sig(d.mantissa, 4)),
                    fmt_sig(dividend, 4)
                )
            };
            self.reseat_on_primary(dividend, text);
        }

        let (Some(divisor_d), Some(result_d)) = (Decomposed::of(divisor), Decomposed::of(result))
        else {
            self.commit(result, "zero has no logarithm".to_owned());
            self.announce_only(format!(
                "Dividing {} by {} gives {}; zero has no position on a logarithmic \
                 scale, so this step is arithmetic only.",
                fmt_sig(dividend, 4),
                fmt_sig(divisor, 4),
                fmt_sig(result, 4)
            ));
            return;
        };

        self.transfer_to_primary();
        self.reenter_from_root_scales();
        // A divide never follows an armed inverted multiply directly, but
        // the flag must not leak past it either.
        self.state.inverted_chain = false;

        let dividend_m = self.state.mantissa;
        let old_exponent = self.state.exponent;
        let was_at_index = self.state.cursor_at_index;

        let naive = old_exponent - divisor_d.exponent;
        let mut note = format!(
            "exponents subtract: {old_exponent} - {} = {naive}",
            divisor_d.exponent
        );
        if result_d.exponent < naive {
            note.push_str("; the mantissa quotient fell below 1, borrowing one");
        }
        let quotient_4 = fmt_sig(result, 4);
        let divisor_m = divisor_d.mantissa;
        let new_shift = dividend_m.log10() - divisor_m.log10();

        let method = if in_chain && divisions_done > 0 && was_at_index {
            division_method(self.state.slide_shift, divisor_m)
        } else {
            DivisionMethod::Plain
        };

        match method {
            DivisionMethod::Inverted => {
                let scales = [ScaleId::C, ScaleId::D, ScaleId::Ci];
                self.prep_scales(&scales);
                self.commit(result, note);
                self.say(
                    format!(
                        "Divide by {}: no slide movement is needed. Move the cursor to \
                         {} on the CI scale and read the intermediate result \
                         {quotient_4} on the D scale under the hairline.{}",
                        fmt_sig(divisor, 4),
                        fmt_sig(divisor_m, 4),
                        sign_note(result)
                    ),
                    delay::MESSAGE,
                );
                self.act(
                    vec![
                        Command::SelectSide { scales: scales.to_vec() },
                        Command::PlaceCursor { scale: ScaleId::Ci, value: divisor_m },
                    ],
                    delay::ACTION,
                );
                // The slide shift survives for the next division to try.
                self.state.on_primary = true;
                self.state.cursor_at_index = false;
                self.state.check = Some((ScaleId::D, result_d.mantissa));
            }
            DivisionMethod::InvertedFolded => {
                let scales = [
                    ScaleId::C,
                    ScaleId::D,
                    ScaleId::Ci,
                    ScaleId::Cif,
                    ScaleId::Df,
                ];
                self.prep_scales(&scales);
                self.commit(result, note);
                self.say(
                    format!(
                        "Divide by {}: the CI scale cannot reach at this setting, but \
                         the folded CIF can. Move the cursor to {} on the CIF scale and \
                         read the intermediate result {quotient_4} on the DF scale.{}",
                        fmt_sig(divisor, 4),
                        fmt_sig(divisor_m, 4),
                        sign_note(result)
                    ),
                    delay::MESSAGE,
                );
                self.act(
                    vec![
                        Command::SelectSide { scales: scales.to_vec() },
                        Command::PlaceCursor { scale: ScaleId::Cif, value: divisor_m },
                    ],
                    delay::ACTION,
                );
                self.state.on_primary = false;
                self.state.cursor_at_index = false;
                self.state.check = Some((ScaleId::Df, result_d.mantissa));
            }
            DivisionMethod::Plain => {
                self.prepare_face(Face::Front, &[ScaleId::C, ScaleId::D]);
                if !self.state.on_primary {
                    // The previous reading sits on a folded or secondary
                    // scale; bring it back to D before aligning the slide.
                    self.say(
                        format!(
                            "Bring the value back to the primary scale: move the cursor \
                             to {} on D.",
                            fmt_sig(dividend_m, 4)
                        ),
                        delay::MESSAGE,
                    );
                    self.act(
                        vec![Command::PlaceCursor { scale: ScaleId::D, value: dividend_m }],
                        delay::ACTION,
                    );
                    self.state.on_primary = true;
                }
                let index = read_index(new_shift, dividend_m / divisor_m);
                let label = index_label(index);
                self.prep_scales(&[ScaleId::C, ScaleId::D]);
                self.commit(result, note);
                let lead = if in_chain && divisions_done > 0 {
                    if was_at_index {
                        format!(
                            "Divide by {}: move the slide so {} on the C scale is under \
                             the cursor. The intermediate result {quotient_4} lands on \
                             the D scale under the slide index.",
                            fmt_sig(divisor, 4),
                            fmt_sig(divisor_m, 4)
                        )
                    } else {
                        format!(
                            "Divide by {}: the hairline is no longer at the slide \
                             index, so the slide must move to continue the chain. Align \
                             {} on the C scale with the previous result {} on the D \
                             scale; the new result {quotient_4} appears under the slide \
                             index.",
                            fmt_sig(divisor, 4),
                            fmt_sig(divisor_m, 4),
                            fmt_sig(dividend_m, 4)
                        )
                    }
                } else {
                    format!(
                        "Divide by {}: move the slide so {} on the C scale is under the \
                         cursor over {} on D. The result {quotient_4} lands on the D \
                         scale under the slide index.",
                        fmt_sig(divisor, 4),
                        fmt_sig(divisor_m, 4),
                        fmt_sig(dividend_m, 4)
                    )
                };
                self.say(lead, delay::MESSAGE);
                self.act(
                    vec![
                        Command::SelectSide { scales: vec![ScaleId::C, ScaleId::D] },
                        Command::PlaceBodyIndex { scale: ScaleId::C, value: divisor_m },
                    ],
                    delay::ACTION,
                );
                self.act(
                    vec![Command::PlaceCursor { scale: ScaleId::C, value: index }],
                    delay::ACTION,
                );
                self.say(
                    format!(
                        "Read {quotient_4} on the D scale under the {label}.{}",
                        sign_note(result)
                    ),
                    delay::MESSAGE,
                );
                self.state.on_primary = true;
                self.state.cursor_at_index = true;
                self.state.slide_shift = Some(new_shift);
                self.state.check = Some((ScaleId::D, result_d.mantissa));
            }
        }
    }
}
