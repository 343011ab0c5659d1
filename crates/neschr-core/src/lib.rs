//! Core of the NES CHR extractor: container parsing, tile decoding, palettes
//! and tile sheet composition. Everything here is synchronous and keeps no
//! state between calls.

pub mod cartridge;
pub mod chr;
pub mod error;
pub mod palette;
pub mod sheet;

pub use cartridge::{Rom, parse, parse_bytes, parse_file, probe};
pub use chr::{Tile, extract_tiles};
pub use error::Error;
pub use palette::{Color, TilePalette, resolve};
pub use sheet::{SheetLayout, Surface, compose_sheet, render_tile};
