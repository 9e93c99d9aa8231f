use serde::{Deserialize, Serialize};

/// Mantissa/exponent split of a finite, non-zero value.
///
/// The instrument only ever shows the mantissa; the decimal exponent and the
/// sign ride along in the narration. `mantissa` is kept exact here and rounded
/// only at display time, so positional arithmetic downstream does not
/// accumulate narration rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decomposed {
    /// In `[1, 10)`.
    pub mantissa: f64,
    pub exponent: i32,
    pub negative: bool,
}

impl Decomposed {
    /// Splits `value` into sign, mantissa and decimal exponent.
    ///
    /// Returns `None` for zero and non-finite values: neither has a location
    /// on a logarithmic scale.
    #[must_use]
    pub fn of(value: f64) -> Option<Self> {
        if value == 0.0 || !value.is_finite() {
            return None;
        }
        let magnitude = value.abs();
        let mut exponent = magnitude.log10().floor() as i32;
        let mut mantissa = magnitude / 10f64.powi(exponent);
        // log10 + powi rounding can land a hair outside [1, 10).
        if mantissa >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        }
        if mantissa < 1.0 {
            mantissa *= 10.0;
            exponent -= 1;
        }
        Some(Decomposed {
            mantissa,
            exponent,
            negative: value < 0.0,
        })
    }

    /// Rebuilds the original value.
    #[must_use]
    pub fn reconstruct(&self) -> f64 {
        let magnitude = self.mantissa * 10f64.powi(self.exponent);
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Rounds to `figures` significant figures.
#[must_use]
pub fn round_sig(value: f64, figures: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let exponent = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(figures as i32 - 1 - exponent);
    // powi overflows once the magnitude nears the f64 floor; such values
    // pass through unrounded.
    if !scale.is_finite() {
        return value;
    }
    (value * scale).round() / scale
}

/// Formats at `figures` significant figures, trimming trailing zeros the way
/// a person would write a scale reading (`7`, `3.5`, `0.301`).
#[must_use]
pub fn fmt_sig(value: f64, figures: u32) -> String {
    format!("{}", round_sig(value, figures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_across_magnitudes() {
        let d = Decomposed::of(200.0).unwrap();
        assert_eq!(d.mantissa, 2.0);
        assert_eq!(d.exponent, 2);
        assert!(!d.negative);

        let d = Decomposed::of(0.035).unwrap();
        assert!((d.mantissa - 3.5).abs() < 1e-12);
        assert_eq!(d.exponent, -2);

        let d = Decomposed::of(-7.0).unwrap();
        assert_eq!(d.mantissa, 7.0);
        assert_eq!(d.exponent, 0);
        assert!(d.negative);
    }

    #[test]
    fn zero_and_non_finite_have_no_location() {
        assert_eq!(Decomposed::of(0.0), None);
        assert_eq!(Decomposed::of(f64::NAN), None);
        assert_eq!(Decomposed::of(f64::INFINITY), None);
    }

    #[test]
    fn reconstruct_round_trips() {
        for value in [1.0, 9.9999, 123.456, 0.001024, -4.2e8, -0.5] {
            let d = Decomposed::of(value).unwrap();
            assert!(d.mantissa >= 1.0 && d.mantissa < 10.0, "mantissa of {value}");
            let back = d.reconstruct();
            assert!(
                ((back - value) / value).abs() < 1e-12,
                "{value} came back as {back}"
            );
        }
    }

    #[test]
    fn significant_figure_rounding() {
        assert_eq!(round_sig(3.14159, 3), 3.14);
        assert_eq!(round_sig(1024.0, 3), 1020.0);
        assert_eq!(round_sig(0.0301029, 4), 0.0301);
        assert_eq!(round_sig(0.0, 3), 0.0);
    }

    #[test]
    fn magnitudes_near_the_f64_floor_pass_through() {
        assert_eq!(round_sig(1e-307, 4), 1e-307);
        assert_eq!(round_sig(-1e-307, 4), -1e-307);
        assert_eq!(round_sig(5e-324, 3), 5e-324);
        assert!(!fmt_sig(1e-307, 4).contains("NaN"));
    }

    #[test]
    fn display_trims_like_a_reading() {
        assert_eq!(fmt_sig(7.0, 3), "7");
        assert_eq!(fmt_sig(3.5, 4), "3.5");
        assert_eq!(fmt_sig(0.30103, 3), "0.301");
        assert_eq!(fmt_sig(1024.0, 3), "1020");
    }
}
