//! Visualization palettes for CHR tiles.
//!
//! A `.nes` file carries no colour information at all: tile pixels are just the
//! values 0..=3. This module supplies the colours used to *look* at them: the
//! 64-entry 2C02 reference table, nine curated four-colour presets that index
//! into it (in the spirit of YY-CHR), and two greyscale ramps.

use std::ops::Index;

/// Number of entries in the reference table.
pub const STANDARD_PALETTE_SIZE: usize = 64;

/// Colours per resolved tile palette (backdrop + 3).
pub const TILE_PALETTE_SIZE: usize = 4;

/// Greyscale plus the nine presets.
pub const PALETTE_COUNT: usize = 1 + PRESETS.len();

/// Preset used when the caller asks for an index that does not exist.
pub const FALLBACK_PRESET: i32 = 1;

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Marker for "do not paint". Never produced by the reference table.
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// 2C02 PPU output colours, indexed by palette byte.
#[rustfmt::skip]
pub const STANDARD_PALETTE: [Color; STANDARD_PALETTE_SIZE] = [
    // 0x00-0x0F
    Color::rgb(84, 84, 84),    Color::rgb(0, 30, 116),    Color::rgb(8, 16, 144),    Color::rgb(48, 0, 136),
    Color::rgb(68, 0, 100),    Color::rgb(92, 0, 48),     Color::rgb(84, 4, 0),      Color::rgb(60, 24, 0),
    Color::rgb(32, 42, 0),     Color::rgb(8, 58, 0),      Color::rgb(0, 64, 0),      Color::rgb(0, 60, 0),
    Color::rgb(0, 50, 60),     Color::rgb(0, 0, 0),       Color::rgb(0, 0, 0),       Color::rgb(0, 0, 0),
    // 0x10-0x1F
    Color::rgb(152, 150, 152), Color::rgb(8, 76, 196),    Color::rgb(48, 50, 236),   Color::rgb(92, 30, 228),
    Color::rgb(136, 20, 176),  Color::rgb(160, 20, 100),  Color::rgb(152, 34, 32),   Color::rgb(120, 60, 0),
    Color::rgb(84, 90, 0),     Color::rgb(40, 114, 0),    Color::rgb(8, 124, 0),     Color::rgb(0, 118, 40),
    Color::rgb(0, 102, 120),   Color::rgb(0, 0, 0),       Color::rgb(0, 0, 0),       Color::rgb(0, 0, 0),
    // 0x20-0x2F
    Color::rgb(236, 238, 236), Color::rgb(76, 154, 236),  Color::rgb(120, 124, 236), Color::rgb(176, 98, 236),
    Color::rgb(228, 84, 236),  Color::rgb(236, 88, 180),  Color::rgb(236, 106, 100), Color::rgb(212, 136, 32),
    Color::rgb(160, 170, 0),   Color::rgb(116, 196, 0),   Color::rgb(76, 208, 32),   Color::rgb(56, 204, 108),
    Color::rgb(56, 180, 204),  Color::rgb(60, 60, 60),    Color::rgb(0, 0, 0),       Color::rgb(0, 0, 0),
    // 0x30-0x3F
    Color::rgb(236, 238, 236), Color::rgb(168, 204, 236), Color::rgb(188, 188, 236), Color::rgb(212, 178, 236),
    Color::rgb(236, 174, 236), Color::rgb(236, 174, 212), Color::rgb(236, 180, 176), Color::rgb(228, 196, 144),
    Color::rgb(204, 210, 120), Color::rgb(180, 222, 120), Color::rgb(168, 226, 144), Color::rgb(152, 226, 180),
    Color::rgb(160, 214, 228), Color::rgb(160, 162, 160), Color::rgb(0, 0, 0),       Color::rgb(0, 0, 0),
];

/// Opaque greyscale ramp, black backdrop.
pub const GREYSCALE: TilePalette = TilePalette([
    Color::rgb(0, 0, 0),
    Color::rgb(85, 85, 85),
    Color::rgb(170, 170, 170),
    Color::rgb(255, 255, 255),
]);

/// Greyscale ramp with a transparent backdrop (sprite view).
pub const GREYSCALE_TRANSPARENT: TilePalette = TilePalette([
    Color::TRANSPARENT,
    Color::rgb(85, 85, 85),
    Color::rgb(170, 170, 170),
    Color::rgb(255, 255, 255),
]);

/// A curated four-colour selection from [`STANDARD_PALETTE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub indices: [u8; TILE_PALETTE_SIZE],
}

/// Presets 1..=9, in order.
pub const PRESETS: [Preset; 9] = [
    Preset { name: "Neutral", indices: [0x0F, 0x00, 0x10, 0x30] },
    Preset { name: "Blue", indices: [0x0F, 0x02, 0x12, 0x22] },
    Preset { name: "Red", indices: [0x0F, 0x06, 0x16, 0x26] },
    Preset { name: "Green", indices: [0x0F, 0x0A, 0x1A, 0x2A] },
    Preset { name: "Yellow", indices: [0x0F, 0x18, 0x28, 0x38] },
    Preset { name: "Purple", indices: [0x0F, 0x03, 0x13, 0x23] },
    Preset { name: "Teal", indices: [0x0F, 0x0C, 0x1C, 0x2C] },
    Preset { name: "Orange", indices: [0x0F, 0x07, 0x17, 0x27] },
    Preset { name: "Rainbow", indices: [0x0F, 0x16, 0x27, 0x38] },
];

/// Display names for every selectable palette index (0 = greyscale).
pub const PALETTE_NAMES: [&str; PALETTE_COUNT] = [
    "Greyscale (default)",
    PRESETS[0].name,
    PRESETS[1].name,
    PRESETS[2].name,
    PRESETS[3].name,
    PRESETS[4].name,
    PRESETS[5].name,
    PRESETS[6].name,
    PRESETS[7].name,
    PRESETS[8].name,
];

/// Exactly four colours, indexed by tile pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePalette(pub [Color; TILE_PALETTE_SIZE]);

impl TilePalette {
    pub fn colors(&self) -> &[Color; TILE_PALETTE_SIZE] {
        &self.0
    }

    /// Slot 0 carries the transparent marker.
    pub fn has_transparent_backdrop(&self) -> bool {
        self.0[0] == Color::TRANSPARENT
    }
}

impl Index<u8> for TilePalette {
    type Output = Color;

    /// # Panics
    /// Panics for values above 3.
    fn index(&self, value: u8) -> &Color {
        &self.0[value as usize]
    }
}

impl Default for TilePalette {
    fn default() -> Self {
        GREYSCALE
    }
}

impl Preset {
    fn resolve(&self, transparent: bool) -> TilePalette {
        let mut colors = self
            .indices
            .map(|index| STANDARD_PALETTE[index as usize]);
        if transparent {
            colors[0] = Color::TRANSPARENT;
        }
        TilePalette(colors)
    }
}

/// Resolve a palette index into four colours.
///
/// `0` selects greyscale; `1..=9` select [`PRESETS`]. Anything else falls back to
/// preset 1 instead of failing. With `transparent` set, slot 0 becomes
/// [`Color::TRANSPARENT`].
pub fn resolve(index: i32, transparent: bool) -> TilePalette {
    if index == 0 {
        return if transparent {
            GREYSCALE_TRANSPARENT
        } else {
            GREYSCALE
        };
    }

    let preset = index
        .checked_sub(1)
        .and_then(|slot| usize::try_from(slot).ok())
        .and_then(|slot| PRESETS.get(slot))
        .unwrap_or_else(|| {
            tracing::trace!(index, "palette index out of range, using preset {FALLBACK_PRESET}");
            &PRESETS[0]
        });
    preset.resolve(transparent)
}

/// Display name for a palette index, applying the same fallback as [`resolve`].
pub fn palette_name(index: i32) -> &'static str {
    usize::try_from(index)
        .ok()
        .and_then(|slot| PALETTE_NAMES.get(slot))
        .copied()
        .unwrap_or(PALETTE_NAMES[FALLBACK_PRESET as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chr::Tile;

    #[test]
    fn greyscale_variants() {
        assert_eq!(resolve(0, false), GREYSCALE);
        assert_eq!(resolve(0, true), GREYSCALE_TRANSPARENT);
        assert!(resolve(0, true).has_transparent_backdrop());
        assert!(!resolve(0, false).has_transparent_backdrop());
    }

    #[test]
    fn presets_map_through_reference_table() {
        let neutral = resolve(1, false);
        assert_eq!(
            neutral.colors(),
            &[
                STANDARD_PALETTE[0x0F],
                STANDARD_PALETTE[0x00],
                STANDARD_PALETTE[0x10],
                STANDARD_PALETTE[0x30],
            ]
        );

        let rainbow = resolve(9, false);
        assert_eq!(rainbow[3], Color::rgb(204, 210, 120));
    }

    #[test]
    fn transparency_replaces_slot_zero_only() {
        let opaque = resolve(3, false);
        let clear = resolve(3, true);
        assert_eq!(clear[0], Color::TRANSPARENT);
        assert_eq!(&clear.colors()[1..], &opaque.colors()[1..]);
    }

    #[test]
    fn out_of_range_falls_back_to_first_preset() {
        let first = resolve(1, false);
        assert_eq!(resolve(-1, false), first);
        assert_eq!(resolve(10, false), first);
        assert_eq!(resolve(999, false), first);
        assert_eq!(resolve(i32::MIN, false), first);
        assert_eq!(resolve(-5, true), resolve(1, true));
    }

    #[test]
    fn every_index_resolves_to_four_entries() {
        for index in -3..15 {
            for transparent in [false, true] {
                assert_eq!(resolve(index, transparent).colors().len(), TILE_PALETTE_SIZE);
            }
        }
    }

    #[test]
    fn reference_table_is_fully_opaque() {
        assert!(STANDARD_PALETTE.iter().all(|c| !c.is_transparent()));
        assert_eq!(STANDARD_PALETTE.len(), 64);
    }

    #[test]
    fn names_cover_every_index() {
        assert_eq!(PALETTE_NAMES.len(), PALETTE_COUNT);
        assert_eq!(palette_name(0), "Greyscale (default)");
        assert_eq!(palette_name(9), "Rainbow");
        assert_eq!(palette_name(42), "Neutral");
    }

    #[test]
    fn palette_choice_does_not_touch_decoded_pixels() {
        let block = [0x3C, 0x42, 0x81, 0xFF, 0, 0, 0, 0, 0xFF, 0, 0x18, 0, 0, 0, 0, 0];
        let tile = Tile::decode(&block, 0).expect("decode");
        let before = *tile.rows();
        for index in 0..PALETTE_COUNT as i32 {
            let _ = resolve(index, index % 2 == 0);
            let again = Tile::decode(&block, 0).expect("decode");
            assert_eq!(again.rows(), &before);
        }
    }
}
