//! Export settings. Defaults mirror what the tile viewer shows out of the box.

use std::{num::NonZeroUsize, path::PathBuf, thread};

use neschr_core::{SheetLayout, TilePalette, resolve};

use crate::error::ExportError;

/// Individual tiles are exported larger than they appear on the sheet.
pub const DEFAULT_TILE_SCALE: u32 = 4;

/// Palette selection shared by sheet and tile output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteChoice {
    /// 0 = greyscale, 1..=9 = presets; anything else falls back to preset 1.
    pub index: i32,
    /// Slot 0 becomes transparent and sheets get a checkerboard underlay.
    pub transparent: bool,
}

impl PaletteChoice {
    pub fn resolve(&self) -> TilePalette {
        resolve(self.index, self.transparent)
    }
}

/// Settings for [`crate::batch::BatchExporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Each ROM gets its own subdirectory here.
    pub output_dir: PathBuf,
    pub palette: PaletteChoice,
    pub layout: SheetLayout,
    /// Scale for the per-tile PNGs.
    pub tile_scale: u32,
    /// Worker threads; at least 1.
    pub jobs: usize,
}

impl BatchConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            palette: PaletteChoice::default(),
            layout: SheetLayout::default(),
            tile_scale: DEFAULT_TILE_SCALE,
            jobs: default_jobs(),
        }
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ExportError::InvalidConfig(
                "output directory is empty".to_string(),
            ));
        }
        if self.tile_scale == 0 {
            return Err(ExportError::InvalidConfig(
                "tile scale must be at least 1".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(ExportError::InvalidConfig(
                "at least one worker is required".to_string(),
            ));
        }
        self.layout.validate()?;
        Ok(())
    }
}

/// One worker per available core.
pub fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
