use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while reading a ROM container or laying out tiles.
#[derive(Error, Debug)]
pub enum Error {
    /// Magic number ("NES<EOF>") is missing.
    #[error("missing NES magic bytes, found {found:02X?}")]
    InvalidMagic { found: [u8; 4] },

    /// A ROM section (header/trainer/PRG/CHR) is shorter than advertised.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A tile block handed to the decoder holds fewer than 16 bytes.
    #[error("tile data must be at least {expected} bytes, got {actual}", expected = crate::chr::TILE_BYTES)]
    TileBlockTooShort { actual: usize },

    /// Tile sheets need at least one tile.
    #[error("tile list cannot be empty")]
    EmptyTiles,

    /// Caller supplied a value outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The ROM file does not exist.
    #[error("NES file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Wrapper for I/O errors raised while reading ROMs from disk.
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}
