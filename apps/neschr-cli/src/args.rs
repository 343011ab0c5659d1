use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use neschr_core::SheetLayout;
use neschr_export::{PaletteChoice, config::DEFAULT_TILE_SCALE};
use tracing::Level;

/// NES CHR ROM tile extractor
#[derive(Parser, Debug)]
#[command(name = "neschr", author, version, about, long_about = None)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the header summary of a ROM
    Info {
        rom: PathBuf,

        /// Print the metadata document as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Check whether a file looks like an iNES ROM (exit status 1 if not)
    Probe { path: PathBuf },

    /// List the selectable palettes
    Palettes,

    /// Render every CHR tile into a single sheet PNG
    Sheet {
        rom: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        palette: PaletteArgs,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Write each CHR tile to its own PNG
    Tiles {
        rom: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        palette: PaletteArgs,

        /// Pixel scale of each tile image
        #[arg(long, default_value_t = DEFAULT_TILE_SCALE)]
        scale: u32,
    },

    /// Export tiles, sheet and metadata for many ROMs
    Batch {
        #[arg(required = true)]
        roms: Vec<PathBuf>,

        /// Output directory; each ROM gets a subdirectory
        #[arg(short, long)]
        output: PathBuf,

        /// Worker threads (defaults to the number of cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        palette: PaletteArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Pixel scale of the individual tile images
        #[arg(long, default_value_t = DEFAULT_TILE_SCALE)]
        tile_scale: u32,
    },
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct PaletteArgs {
    /// Palette index: 0 = greyscale, 1-9 = presets
    #[arg(short, long, default_value_t = 0)]
    pub palette: i32,

    /// Treat color 0 as transparent
    #[arg(short, long)]
    pub transparent: bool,
}

impl From<PaletteArgs> for PaletteChoice {
    fn from(args: PaletteArgs) -> Self {
        Self {
            index: args.palette,
            transparent: args.transparent,
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct LayoutArgs {
    #[arg(long, default_value_t = 16)]
    pub tiles_per_row: u32,

    /// Pixel scale of tiles on the sheet
    #[arg(long, default_value_t = 2)]
    pub scale: u32,

    /// Gap between tiles, in output pixels
    #[arg(long, default_value_t = 1)]
    pub spacing: u32,
}

impl From<LayoutArgs> for SheetLayout {
    fn from(args: LayoutArgs) -> Self {
        Self {
            tiles_per_row: args.tiles_per_row,
            scale: args.scale,
            spacing: args.spacing,
        }
    }
}
