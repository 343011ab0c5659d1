//! Per-tile and whole-sheet file output.

use std::{
    fs,
    path::{Path, PathBuf},
};

use neschr_core::{Surface, Tile, TilePalette, render_tile};

use crate::{error::ExportError, png::write_png};

/// How exported tile files are named: `{prefix}_{index}.png`, index zero-padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileNaming {
    pub prefix: String,
    pub width: usize,
}

impl TileNaming {
    /// `tile_0000.png`, `tile_0001.png`, ...
    pub fn individual() -> Self {
        Self {
            prefix: "tile".to_string(),
            width: 4,
        }
    }

    /// `{stem}_000.png`, `{stem}_001.png`, ... used inside batch output.
    pub fn for_rom(stem: &str) -> Self {
        Self {
            prefix: stem.to_string(),
            width: 3,
        }
    }

    pub fn file_name(&self, index: usize) -> String {
        format!("{}_{:0width$}.png", self.prefix, index, width = self.width)
    }
}

impl Default for TileNaming {
    fn default() -> Self {
        Self::individual()
    }
}

/// Write every tile to its own PNG in `dir`, creating the directory if needed.
/// Files are numbered by position in `tiles`.
pub fn export_tiles(
    tiles: &[Tile],
    dir: &Path,
    naming: &TileNaming,
    scale: u32,
    palette: &TilePalette,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|err| ExportError::io(dir, err))?;

    let mut written = Vec::with_capacity(tiles.len());
    for (position, tile) in tiles.iter().enumerate() {
        let surface = render_tile(tile, palette, scale)?;
        let path = dir.join(naming.file_name(position));
        write_png(&surface, &path)?;
        written.push(path);
    }

    tracing::debug!(count = written.len(), dir = %dir.display(), "exported tiles");
    Ok(written)
}

/// Write a composed sheet to `path`.
pub fn export_tile_sheet(sheet: &Surface, path: &Path) -> Result<(), ExportError> {
    write_png(sheet, path)
}
