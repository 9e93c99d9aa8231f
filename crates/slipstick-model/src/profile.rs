use crate::scale::{Face, ScaleId};
use serde::{Deserialize, Serialize};

/// Angles at or below this (degrees) read on the ST small-angle scale rather
/// than S or T; sine and tangent are indistinguishable at scale resolution
/// there.
pub const SMALL_ANGLE_DEG: f64 = 5.74;

/// One log-log band: a named scale covering `e^ln_lo .. e^ln_hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogLogBand {
    pub scale: ScaleId,
    pub ln_lo: f64,
    pub ln_hi: f64,
}

impl LogLogBand {
    /// Whether `value` falls inside this band.
    ///
    /// Up bands own their upper edge, down bands their lower edge, so the
    /// shared boundaries (e.g. `e^0.1` between LL1 and LL2) belong to exactly
    /// one band.
    #[must_use]
    pub fn holds(&self, value: f64) -> bool {
        if value <= 0.0 || !value.is_finite() {
            return false;
        }
        let ln = value.ln();
        if self.scale.is_down_band() {
            ln >= self.ln_lo && ln < self.ln_hi
        } else {
            ln > self.ln_lo && ln <= self.ln_hi
        }
    }
}

/// Physical capability description of one rule model.
///
/// Fields are public so reduced or experimental layouts can be built directly
/// (tests do this to reach the face-flip narration); the stock instruments
/// come from the const constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleProfile {
    pub name: &'static str,
    /// A/K squares-and-cubes pair present; otherwise squares and roots go
    /// through the dual root scales R1/R2.
    pub has_squares_scale: bool,
    /// Printed label of the single-decade log scale. Some models decorate it.
    pub log_scale_label: &'static str,
    pub front: &'static [ScaleId],
    pub back: &'static [ScaleId],
    pub bands: &'static [LogLogBand],
}

const UP_BANDS: [LogLogBand; 3] = [
    LogLogBand {
        scale: ScaleId::Ll1,
        ln_lo: 0.01,
        ln_hi: 0.1,
    },
    LogLogBand {
        scale: ScaleId::Ll2,
        ln_lo: 0.1,
        ln_hi: 1.0,
    },
    LogLogBand {
        scale: ScaleId::Ll3,
        ln_lo: 1.0,
        ln_hi: 10.0,
    },
];

const ALL_BANDS: [LogLogBand; 6] = [
    UP_BANDS[0],
    UP_BANDS[1],
    UP_BANDS[2],
    LogLogBand {
        scale: ScaleId::LlDown1,
        ln_lo: -0.1,
        ln_hi: -0.01,
    },
    LogLogBand {
        scale: ScaleId::LlDown2,
        ln_lo: -1.0,
        ln_hi: -0.1,
    },
    LogLogBand {
        scale: ScaleId::LlDown3,
        ln_lo: -10.0,
        ln_hi: -1.0,
    },
];

impl RuleProfile {
    /// Hemmi Versalog II: squares scale, decorated log label, reciprocal
    /// log-log bands.
    #[must_use]
    pub const fn versalog_ii() -> Self {
        RuleProfile {
            name: "Versalog II",
            has_squares_scale: true,
            log_scale_label: "LogX     L",
            front: &[
                ScaleId::Df,
                ScaleId::Cf,
                ScaleId::Cif,
                ScaleId::Ci,
                ScaleId::C,
                ScaleId::D,
                ScaleId::A,
                ScaleId::K,
            ],
            back: &[
                ScaleId::LlDown1,
                ScaleId::LlDown2,
                ScaleId::LlDown3,
                ScaleId::Ll1,
                ScaleId::Ll2,
                ScaleId::Ll3,
                ScaleId::S,
                ScaleId::T,
                ScaleId::St,
                ScaleId::L,
                ScaleId::C,
                ScaleId::D,
            ],
            bands: &ALL_BANDS,
        }
    }

    /// First-generation Versalog: dual root scales instead of A, plain log
    /// label, no reciprocal bands.
    #[must_use]
    pub const fn versalog() -> Self {
        RuleProfile {
            name: "Versalog",
            has_squares_scale: false,
            log_scale_label: "L",
            front: &[
                ScaleId::Df,
                ScaleId::Cf,
                ScaleId::Cif,
                ScaleId::Ci,
                ScaleId::C,
                ScaleId::D,
                ScaleId::R1,
                ScaleId::R2,
            ],
            back: &[
                ScaleId::Ll1,
                ScaleId::Ll2,
                ScaleId::Ll3,
                ScaleId::K,
                ScaleId::S,
                ScaleId::T,
                ScaleId::St,
                ScaleId::L,
                ScaleId::C,
                ScaleId::D,
            ],
            bands: &UP_BANDS,
        }
    }

    #[must_use]
    pub fn face_scales(&self, face: Face) -> &'static [ScaleId] {
        match face {
            Face::Front => self.front,
            Face::Back => self.back,
        }
    }

    #[must_use]
    pub fn face_has_scales(&self, face: Face, wanted: &[ScaleId]) -> bool {
        let present = self.face_scales(face);
        wanted.iter().all(|scale| present.contains(scale))
    }

    /// The face carrying every scale in `wanted`, front preferred.
    #[must_use]
    pub fn face_with_scales(&self, wanted: &[ScaleId]) -> Option<Face> {
        if self.face_has_scales(Face::Front, wanted) {
            Some(Face::Front)
        } else if self.face_has_scales(Face::Back, wanted) {
            Some(Face::Back)
        } else {
            None
        }
    }

    /// Linear scan for the band holding `value`; `None` outside every band
    /// (including the dead zone around 1 and anything past `e^10`).
    #[must_use]
    pub fn log_log_band(&self, value: f64) -> Option<LogLogBand> {
        self.bands.iter().copied().find(|band| band.holds(value))
    }

    #[must_use]
    pub fn has_down_bands(&self) -> bool {
        self.bands.iter().any(|band| band.scale.is_down_band())
    }

    /// Label to hand the runtime for `scale`, applying the model's decorated
    /// log-scale engraving.
    #[must_use]
    pub fn display_label(&self, scale: ScaleId) -> &'static str {
        if scale == ScaleId::L {
            self.log_scale_label
        } else {
            scale.as_label()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn band_lookup_partitions_by_ln_magnitude() {
        let p = RuleProfile::versalog_ii();
        assert_eq!(p.log_log_band(1.05).map(|b| b.scale), Some(ScaleId::Ll1));
        assert_eq!(p.log_log_band(2.0).map(|b| b.scale), Some(ScaleId::Ll2));
        assert_eq!(p.log_log_band(1024.0).map(|b| b.scale), Some(ScaleId::Ll3));
        assert_eq!(
            p.log_log_band(0.5).map(|b| b.scale),
            Some(ScaleId::LlDown2)
        );
        assert_eq!(
            p.log_log_band(0.001).map(|b| b.scale),
            Some(ScaleId::LlDown3)
        );
        // Dead zone around 1 and past either end of the span.
        assert_eq!(p.log_log_band(1.0), None);
        assert_eq!(p.log_log_band(1.005), None);
        assert_eq!(p.log_log_band(25_000.0), None);
        assert_eq!(p.log_log_band(1e-5), None);
    }

    #[test]
    fn versalog_lacks_down_bands_and_squares_scale() {
        let p = RuleProfile::versalog();
        assert!(!p.has_squares_scale);
        assert!(!p.has_down_bands());
        assert_eq!(p.log_log_band(0.5), None);
        assert!(p.face_has_scales(Face::Front, &[ScaleId::R1, ScaleId::R2]));
        assert!(!p.face_has_scales(Face::Front, &[ScaleId::A]));
    }

    #[test]
    fn face_queries() {
        let p = RuleProfile::versalog_ii();
        assert_eq!(
            p.face_with_scales(&[ScaleId::C, ScaleId::D]),
            Some(Face::Front)
        );
        assert_eq!(
            p.face_with_scales(&[ScaleId::S, ScaleId::D]),
            Some(Face::Back)
        );
        assert_eq!(p.face_with_scales(&[ScaleId::R1]), None);
        // Both stock models keep C and D on the back, so trig results can
        // continue into a product without a face flip.
        assert!(p.face_has_scales(Face::Back, &[ScaleId::C, ScaleId::D]));
    }

    #[test]
    fn decorated_log_label() {
        assert_eq!(
            RuleProfile::versalog_ii().display_label(ScaleId::L),
            "LogX     L"
        );
        assert_eq!(RuleProfile::versalog().display_label(ScaleId::L), "L");
        assert_eq!(RuleProfile::versalog_ii().display_label(ScaleId::Ci), "CI");
    }

    #[test]
    fn band_edges_belong_to_one_band() {
        let p = RuleProfile::versalog_ii();
        let e_tenth = (0.1f64).exp();
        assert_eq!(
            p.log_log_band(e_tenth).map(|b| b.scale),
            Some(ScaleId::Ll1)
        );
        let just_over = (0.1f64 + 1e-9).exp();
        assert_eq!(
            p.log_log_band(just_over).map(|b| b.scale),
            Some(ScaleId::Ll2)
        );
    }
}
