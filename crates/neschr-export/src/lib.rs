//! File output for extracted CHR data: PNG encoding, JSON metadata, per-tile
//! files and multi-ROM batch runs.

pub mod batch;
pub mod config;
pub mod error;
pub mod metadata;
pub mod png;
pub mod tiles;

pub use batch::{
    BatchEvent, BatchExporter, BatchReport, CancelToken, RomExport, RomOutcome, export_rom,
};
pub use config::{BatchConfig, PaletteChoice};
pub use error::ExportError;
pub use metadata::RomMetadata;
pub use self::png::{encode_png, write_png};
pub use tiles::{TileNaming, export_tile_sheet, export_tiles};
