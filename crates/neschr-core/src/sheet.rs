//! Tile sheet composition.
//!
//! Lays decoded tiles out on a grid and paints them into an in-memory
//! [`Surface`]. Nothing here touches the filesystem; encoding the surface is the
//! export crate's job.
//!
//! Geometry for `n` tiles:
//!
//! ```text
//! cell   = 8 * scale
//! rows   = ceil(n / tiles_per_row)
//! width  = tiles_per_row * (cell + spacing) - spacing
//! height = rows          * (cell + spacing) - spacing
//! ```

use crate::{
    chr::{TILE_SIZE, Tile},
    error::Error,
    palette::{Color, TilePalette},
};

/// Backdrop behind the whole sheet.
pub const SHEET_BACKGROUND: Color = Color::rgb(32, 32, 32);

/// Outline drawn around each tile when there is spacing to hold it.
pub const TILE_BORDER: Color = Color::rgb(64, 64, 64);

/// Checkerboard colours shown under transparent backdrops.
pub const CHECKER_LIGHT: Color = Color::rgb(128, 128, 128);
pub const CHECKER_DARK: Color = Color::rgb(96, 96, 96);

const MIN_CHECKER_CELL: u32 = 2;

/// Upper bound on the pixel count of any surface built here (1 GiB of RGBA).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 28;

/// RGBA raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Surface {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Colour at `(x, y)`, `None` outside the surface.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.offset(x, y).map(|offset| self.pixels[offset])
    }

    /// Writes outside the surface are dropped.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset] = color;
        }
    }

    /// Fill a rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i64).min(self.width as i64);
        let y1 = (y + height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for row in y0..y1 {
            let start = row as usize * self.width as usize;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    /// One-pixel outline whose inner edge is the given rectangle.
    pub fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        let outer_w = width + 2;
        self.fill_rect(x - 1, y - 1, outer_w, 1, color);
        self.fill_rect(x - 1, y + height as i64, outer_w, 1, color);
        self.fill_rect(x - 1, y, 1, height, color);
        self.fill_rect(x + width as i64, y, 1, height, color);
    }

    /// Flatten into `width * height * 4` RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|color| color.to_rgba()).collect()
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Grid parameters for [`compose_sheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetLayout {
    /// Tiles per grid row, at least 1.
    pub tiles_per_row: u32,
    /// Output pixels per source pixel, at least 1.
    pub scale: u32,
    /// Gap between neighbouring tiles.
    pub spacing: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            tiles_per_row: 16,
            scale: 2,
            spacing: 1,
        }
    }
}

impl SheetLayout {
    /// Checks the grid parameters, including that a single cell and its pitch
    /// fit in `u32`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tiles_per_row == 0 {
            return Err(Error::InvalidArgument(
                "tiles per row must be at least 1".to_string(),
            ));
        }
        if self.scale == 0 {
            return Err(Error::InvalidArgument(
                "tile scale must be at least 1".to_string(),
            ));
        }
        self.pitch()?;
        Ok(())
    }

    /// Edge length of one scaled tile.
    pub fn cell_size(&self) -> Result<u32, Error> {
        scaled_tile_size(self.scale)
    }

    fn pitch(&self) -> Result<u32, Error> {
        self.cell_size()?
            .checked_add(self.spacing)
            .ok_or_else(|| too_large("tile spacing"))
    }

    /// Top-left corner of tile `position` within the sheet.
    pub fn tile_origin(&self, position: usize) -> Result<(u32, u32), Error> {
        let per_row = self.tiles_per_row as usize;
        let pitch = self.pitch()?;
        let axis = |slot: usize| {
            u32::try_from(slot)
                .ok()
                .and_then(|slot| slot.checked_mul(pitch))
                .ok_or_else(|| too_large("tile position"))
        };
        Ok((axis(position % per_row)?, axis(position / per_row)?))
    }
}

/// Output size of a sheet holding `tile_count` tiles.
///
/// Fails when the layout is invalid or the sheet would be larger than
/// [`MAX_SURFACE_PIXELS`].
pub fn sheet_dimensions(tile_count: usize, layout: &SheetLayout) -> Result<(u32, u32), Error> {
    layout.validate()?;
    let pitch = layout.pitch()?;
    let rows = u32::try_from(tile_count.div_ceil(layout.tiles_per_row as usize))
        .map_err(|_| too_large("row count"))?;

    let extent = |count: u32, what: &str| {
        count
            .checked_mul(pitch)
            .map(|span| span.saturating_sub(layout.spacing))
            .ok_or_else(|| too_large(what))
    };
    let width = extent(layout.tiles_per_row, "sheet width")?;
    let height = extent(rows, "sheet height")?;
    check_area(width, height)?;
    Ok((width, height))
}

/// Compose `tiles` into one sheet.
///
/// `transparency` only controls the checkerboard under tiles whose backdrop is
/// transparent; pixels resolving to [`Color::TRANSPARENT`] are never painted.
pub fn compose_sheet(
    tiles: &[Tile],
    layout: &SheetLayout,
    palette: &TilePalette,
    transparency: bool,
) -> Result<Surface, Error> {
    if tiles.is_empty() {
        return Err(Error::EmptyTiles);
    }

    let (width, height) = sheet_dimensions(tiles.len(), layout)?;
    let mut surface = Surface::new(width, height, SHEET_BACKGROUND);
    let cell = layout.cell_size()?;
    let checkerboard = transparency && palette.has_transparent_backdrop();

    tracing::debug!(
        tiles = tiles.len(),
        width,
        height,
        checkerboard,
        "composing tile sheet"
    );

    for (position, tile) in tiles.iter().enumerate() {
        let (x, y) = layout.tile_origin(position)?;

        if checkerboard {
            draw_checkerboard(&mut surface, x, y, cell, layout.scale);
        }

        paint_tile(&mut surface, tile, palette, x, y, layout.scale);

        if layout.spacing > 0 {
            surface.stroke_rect(x as i64, y as i64, cell, cell, TILE_BORDER);
        }
    }

    Ok(surface)
}

/// Render one tile at `scale` with no grid, spacing or border.
///
/// The surface starts out as palette slot 0, or fully transparent when slot 0
/// is the transparent marker.
pub fn render_tile(tile: &Tile, palette: &TilePalette, scale: u32) -> Result<Surface, Error> {
    if scale == 0 {
        return Err(Error::InvalidArgument(
            "tile scale must be at least 1".to_string(),
        ));
    }

    let size = scaled_tile_size(scale)?;
    check_area(size, size)?;
    let mut surface = Surface::new(size, size, palette[0]);
    paint_tile(&mut surface, tile, palette, 0, 0, scale);
    Ok(surface)
}

fn scaled_tile_size(scale: u32) -> Result<u32, Error> {
    (TILE_SIZE as u32)
        .checked_mul(scale)
        .ok_or_else(|| too_large("tile scale"))
}

fn check_area(width: u32, height: u32) -> Result<(), Error> {
    if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
        return Err(Error::InvalidArgument(format!(
            "{width}x{height} surface exceeds {MAX_SURFACE_PIXELS} pixels"
        )));
    }
    Ok(())
}

fn too_large(what: &str) -> Error {
    Error::InvalidArgument(format!("{what} overflows the surface size"))
}

fn paint_tile(surface: &mut Surface, tile: &Tile, palette: &TilePalette, x: u32, y: u32, scale: u32) {
    for (ty, row) in tile.rows().iter().enumerate() {
        for (tx, value) in row.iter().enumerate() {
            let color = palette[*value];
            if color == Color::TRANSPARENT {
                continue;
            }
            surface.fill_rect(
                (x + tx as u32 * scale) as i64,
                (y + ty as u32 * scale) as i64,
                scale,
                scale,
                color,
            );
        }
    }
}

fn draw_checkerboard(surface: &mut Surface, x: u32, y: u32, size: u32, scale: u32) {
    let check = scale.max(MIN_CHECKER_CELL);
    for cy in (0..size).step_by(check as usize) {
        for cx in (0..size).step_by(check as usize) {
            let light = ((cx / check) + (cy / check)) % 2 == 0;
            let color = if light { CHECKER_LIGHT } else { CHECKER_DARK };
            let w = check.min(size - cx);
            let h = check.min(size - cy);
            surface.fill_rect((x + cx) as i64, (y + cy) as i64, w, h, color);
        }
    }
}
