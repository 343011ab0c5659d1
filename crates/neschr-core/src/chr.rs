//! CHR (pattern table) tile decoding.
//!
//! A tile is 8×8 pixels stored as two bitplanes: bytes 0..8 hold the low bit of
//! each row, bytes 8..16 the high bit. Bit 7 of each byte is the leftmost pixel.
//!
//! ```text
//! low  = 0b1010_1010   ->  pixel bits 0: 1 0 1 0 1 0 1 0
//! high = 0b0101_0101   ->  pixel bits 1: 0 1 0 1 0 1 0 1
//! value = high << 1 | low           1 2 1 2 1 2 1 2
//! ```
//!
//! Decoding never looks at palettes: the result is a grid of abstract values 0..=3.

use crate::error::Error;

/// Width and height of a tile in pixels.
pub const TILE_SIZE: usize = 8;

/// Encoded size of a tile (two 8-byte bitplanes).
pub const TILE_BYTES: usize = 16;

const PLANE_BYTES: usize = 8;

/// Tiles in one 8 KiB CHR bank.
pub const TILES_PER_BANK: usize = 8 * 1024 / TILE_BYTES;

/// One decoded 8×8 tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    index: usize,
    raw: [u8; TILE_BYTES],
    pixels: [[u8; TILE_SIZE]; TILE_SIZE],
}

impl Tile {
    /// Decode the first 16 bytes of `block`. Extra bytes are ignored.
    pub fn decode(block: &[u8], index: usize) -> Result<Self, Error> {
        let raw: [u8; TILE_BYTES] = block
            .get(..TILE_BYTES)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(Error::TileBlockTooShort {
                actual: block.len(),
            })?;

        Ok(Self::decode_block(raw, index))
    }

    fn decode_block(raw: [u8; TILE_BYTES], index: usize) -> Self {
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (y, row) in pixels.iter_mut().enumerate() {
            let low = raw[y];
            let high = raw[y + PLANE_BYTES];
            for (x, pixel) in row.iter_mut().enumerate() {
                let shift = 7 - x;
                let low_bit = (low >> shift) & 1;
                let high_bit = (high >> shift) & 1;
                *pixel = (high_bit << 1) | low_bit;
            }
        }

        Self { index, raw, pixels }
    }

    /// Position of the tile within the buffer it was extracted from.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self) -> &[u8; TILE_BYTES] {
        &self.raw
    }

    /// Pixel value (0..=3) at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if `x` or `y` is outside `0..8`.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    pub fn rows(&self) -> &[[u8; TILE_SIZE]; TILE_SIZE] {
        &self.pixels
    }

    /// Distinct pixel values present in the tile, ascending.
    pub fn used_colors(&self) -> Vec<u8> {
        let mut seen = [false; 4];
        for value in self.pixels.iter().flatten() {
            seen[*value as usize] = true;
        }
        (0u8..4).filter(|value| seen[*value as usize]).collect()
    }

    /// `true` when every pixel is 0.
    pub fn is_empty(&self) -> bool {
        self.pixels.iter().flatten().all(|value| *value == 0)
    }
}

/// Split `chr` into consecutive 16-byte tiles. A trailing partial tile is dropped.
pub fn extract_tiles(chr: &[u8]) -> Vec<Tile> {
    let tiles: Vec<Tile> = chr
        .chunks_exact(TILE_BYTES)
        .enumerate()
        .map(|(index, block)| {
            let mut raw = [0u8; TILE_BYTES];
            // chunks_exact only yields full blocks.
            raw.copy_from_slice(block);
            Tile::decode_block(raw, index)
        })
        .collect();

    let remainder = chr.len() % TILE_BYTES;
    if remainder != 0 {
        tracing::debug!(remainder, "dropping trailing partial tile");
    }
    tiles
}
