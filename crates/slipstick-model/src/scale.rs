use serde::{Deserialize, Serialize};
use std::fmt;

/// Which physical face of the rule is toward the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Front,
    Back,
}

/// Cursor marking overlay requested from the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkingMode {
    None,
    Hairline,
}

/// Identifies one scale on the rule, independent of which face carries it.
///
/// `L` is the single-decade log scale; some rule models decorate its printed
/// label, so display strings go through [`crate::RuleProfile::display_label`]
/// rather than [`ScaleId::as_label`] when addressing the physical instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleId {
    C,
    D,
    Cf,
    Df,
    Ci,
    Cif,
    A,
    K,
    R1,
    R2,
    S,
    T,
    St,
    L,
    Ll1,
    Ll2,
    Ll3,
    LlDown1,
    LlDown2,
    LlDown3,
}

impl ScaleId {
    /// Canonical engraved label.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            ScaleId::C => "C",
            ScaleId::D => "D",
            ScaleId::Cf => "CF",
            ScaleId::Df => "DF",
            ScaleId::Ci => "CI",
            ScaleId::Cif => "CIF",
            ScaleId::A => "A",
            ScaleId::K => "K",
            ScaleId::R1 => "R1",
            ScaleId::R2 => "R2",
            ScaleId::S => "S",
            ScaleId::T => "T",
            ScaleId::St => "ST",
            ScaleId::L => "L",
            ScaleId::Ll1 => "LL1",
            ScaleId::Ll2 => "LL2",
            ScaleId::Ll3 => "LL3",
            ScaleId::LlDown1 => "LL/1",
            ScaleId::LlDown2 => "LL/2",
            ScaleId::LlDown3 => "LL/3",
        }
    }

    /// True for any log-log band, up or down.
    #[must_use]
    pub const fn is_log_log(self) -> bool {
        matches!(
            self,
            ScaleId::Ll1
                | ScaleId::Ll2
                | ScaleId::Ll3
                | ScaleId::LlDown1
                | ScaleId::LlDown2
                | ScaleId::LlDown3
        )
    }

    /// True for the reciprocal ("down") log-log bands, which carry values
    /// below 1.
    #[must_use]
    pub const fn is_down_band(self) -> bool {
        matches!(self, ScaleId::LlDown1 | ScaleId::LlDown2 | ScaleId::LlDown3)
    }
}

impl fmt::Display for ScaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
