use std::fmt;

use super::Flags7;

/// Identifies the header flavour encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RomFormat {
    /// iNES 1.0.
    INes,
    /// NES 2.0 with extended sizing and metadata fields.
    Nes20,
}

impl RomFormat {
    /// Only the `0b10` marker selects NES 2.0; every other value reads as iNES.
    pub(super) fn from_flags7(flags7: Flags7) -> Self {
        match (flags7 & Flags7::NES2_DETECTION).bits() >> 2 {
            0b10 => Self::Nes20,
            _ => Self::INes,
        }
    }
}

impl fmt::Display for RomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::INes => "INes",
            Self::Nes20 => "Nes20",
        };
        f.write_str(name)
    }
}
