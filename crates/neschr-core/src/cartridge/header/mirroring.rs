use std::fmt;

use super::Flags6;

/// Nametable mirroring declared by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// Two horizontal nametables that mirror vertically.
    Horizontal,
    /// Two vertical nametables that mirror horizontally.
    Vertical,
    /// Cartridge supplies its own four nametables.
    FourScreen,
}

impl Mirroring {
    /// Four-screen wins over the vertical bit.
    pub(super) fn from_flags6(flags6: Flags6) -> Self {
        if flags6.contains(Flags6::FOUR_SCREEN) {
            Self::FourScreen
        } else if flags6.contains(Flags6::MIRRORING) {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }
}

impl fmt::Display for Mirroring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
            Self::FourScreen => "FourScreen",
        };
        f.write_str(name)
    }
}
