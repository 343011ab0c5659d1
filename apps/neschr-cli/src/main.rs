mod args;

use std::{path::Path, process::ExitCode, thread};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use neschr_core::{
    SheetLayout, compose_sheet, extract_tiles,
    palette::{PALETTE_COUNT, palette_name},
    parse_file, probe,
};
use neschr_export::{
    BatchConfig, BatchEvent, BatchExporter, PaletteChoice, RomMetadata, RomOutcome, TileNaming,
    export_tile_sheet, export_tiles,
};
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::args::{Args, Command};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Info { rom, json } => info_command(&rom, json),
        Command::Probe { path } => {
            let ok = probe(&path);
            println!("{}: {}", path.display(), if ok { "iNES ROM" } else { "not a ROM" });
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Palettes => {
            for index in 0..PALETTE_COUNT as i32 {
                println!("{index}: {}", palette_name(index));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Sheet {
            rom,
            output,
            palette,
            layout,
        } => sheet_command(&rom, &output, palette.into(), layout.into()),
        Command::Tiles {
            rom,
            output,
            palette,
            scale,
        } => tiles_command(&rom, &output, palette.into(), scale),
        Command::Batch {
            roms,
            output,
            jobs,
            palette,
            layout,
            tile_scale,
        } => {
            let mut config = BatchConfig::new(output);
            config.palette = palette.into();
            config.layout = layout.into();
            config.tile_scale = tile_scale;
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }
            batch_command(&roms, config)
        }
    }
}

fn info_command(path: &Path, json: bool) -> Result<ExitCode> {
    let rom = parse_file(path).with_context(|| format!("failed to read {}", path.display()))?;

    if json {
        println!("{}", RomMetadata::from_rom(&rom).to_json_pretty()?);
        return Ok(ExitCode::SUCCESS);
    }

    let header = rom.header();
    println!("{rom}");
    println!("Format:      {}", header.format());
    println!("Battery:     {}", header.battery_backed_ram());
    println!("Trainer:     {}", header.trainer_present());
    println!("PRG ROM:     {} bytes", rom.prg_rom().len());
    println!("CHR ROM:     {} bytes", rom.chr_rom().len());
    println!("Tiles:       {}", rom.tile_count());
    println!("Total size:  {} bytes", rom.total_size());
    Ok(ExitCode::SUCCESS)
}

fn sheet_command(
    path: &Path,
    output: &Path,
    palette: PaletteChoice,
    layout: SheetLayout,
) -> Result<ExitCode> {
    let rom = parse_file(path).with_context(|| format!("failed to read {}", path.display()))?;
    let tiles = extract_tiles(rom.chr_rom());
    debug!(palette = palette_name(palette.index), "composing sheet");
    let sheet = compose_sheet(&tiles, &layout, &palette.resolve(), palette.transparent)
        .with_context(|| format!("cannot build a tile sheet for {}", path.display()))?;
    export_tile_sheet(&sheet, output)?;

    info!(
        tiles = tiles.len(),
        width = sheet.width(),
        height = sheet.height(),
        "wrote {}",
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn tiles_command(
    path: &Path,
    output: &Path,
    palette: PaletteChoice,
    scale: u32,
) -> Result<ExitCode> {
    let rom = parse_file(path).with_context(|| format!("failed to read {}", path.display()))?;
    let tiles = extract_tiles(rom.chr_rom());
    if tiles.is_empty() {
        warn!("{} has no CHR ROM (CHR RAM cartridge?)", path.display());
    }

    let written = export_tiles(
        &tiles,
        output,
        &TileNaming::individual(),
        scale,
        &palette.resolve(),
    )?;
    info!(count = written.len(), "wrote tiles to {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn batch_command(roms: &[std::path::PathBuf], config: BatchConfig) -> Result<ExitCode> {
    let (events_tx, events_rx) = unbounded();
    let exporter = BatchExporter::new(config)?.with_events(events_tx);
    let total = roms.len();

    let report = thread::scope(|scope| {
        scope.spawn(move || {
            for event in events_rx {
                if let BatchEvent::Finished { index, outcome } = event {
                    match outcome {
                        RomOutcome::Exported { path, export } => info!(
                            "[{}/{total}] {} -> {}",
                            index + 1,
                            path.display(),
                            export.output_dir.display()
                        ),
                        RomOutcome::Failed { path, error } => {
                            warn!("[{}/{total}] {}: {error}", index + 1, path.display())
                        }
                        RomOutcome::Skipped { .. } => {}
                    }
                }
            }
        });

        let report = exporter.run(roms);
        // Closes the event channel so the progress thread exits.
        drop(exporter);
        report
    })?;

    println!(
        "{} exported, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped()
    );
    for (path, error) in report.failures() {
        eprintln!("  {}: {error}", path.display());
    }

    Ok(if report.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
