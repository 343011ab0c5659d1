//! Batch export over many ROM files.
//!
//! Every ROM runs through its own pipeline (parse, extract, render, write) on
//! a small pool of worker threads fed from a crossbeam job queue. A failure is
//! recorded against the ROM that caused it and the rest of the batch carries
//! on. Cancellation is checked before each ROM starts; a ROM already in
//! progress always finishes.
//!
//! Output layout per ROM:
//!
//! ```text
//! {output_dir}/{stem}/{stem}_000.png ...   one file per tile
//! {output_dir}/{stem}/{stem}_full.png      whole tile sheet
//! {output_dir}/{stem}/{stem}.json          metadata document
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crossbeam_channel::{Sender, unbounded};
use neschr_core::{Rom, compose_sheet, extract_tiles, parse_file};

use crate::{
    config::BatchConfig,
    error::ExportError,
    metadata::RomMetadata,
    png::write_png,
    tiles::{TileNaming, export_tiles},
};

/// Shared flag that stops a batch from starting further ROMs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Files written for one ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomExport {
    pub output_dir: PathBuf,
    pub tile_files: Vec<PathBuf>,
    /// `None` when the ROM has no CHR data to lay out.
    pub sheet: Option<PathBuf>,
    pub metadata: PathBuf,
}

/// What happened to a single input path.
#[derive(Debug, Clone)]
pub enum RomOutcome {
    Exported { path: PathBuf, export: RomExport },
    Failed { path: PathBuf, error: Arc<ExportError> },
    Skipped { path: PathBuf },
}

impl RomOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Exported { path, .. } | Self::Failed { path, .. } | Self::Skipped { path } => {
                path
            }
        }
    }
}

/// Progress notifications published while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { index: usize, path: PathBuf },
    Finished { index: usize, outcome: RomOutcome },
}

/// Outcomes in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RomOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, RomOutcome::Exported { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RomOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RomOutcome::Skipped { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ExportError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RomOutcome::Failed { path, error } => Some((path.as_path(), error.as_ref())),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&RomOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

pub struct BatchExporter {
    config: BatchConfig,
    cancel: CancelToken,
    events: Option<Sender<BatchEvent>>,
}

impl BatchExporter {
    pub fn new(config: BatchConfig) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancelToken::new(),
            events: None,
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_events(mut self, events: Sender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Export every ROM in `roms`. Only failing to create the output directory
    /// aborts the whole run; per-ROM errors end up in the report.
    pub fn run(&self, roms: &[PathBuf]) -> Result<BatchReport, ExportError> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|err| ExportError::io(output_dir, err))?;

        let (job_tx, job_rx) = unbounded::<(usize, PathBuf)>();
        for job in roms.iter().cloned().enumerate() {
            // Receiver is alive until the scope below ends.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let (done_tx, done_rx) = unbounded::<(usize, RomOutcome)>();
        let workers = self.config.jobs.min(roms.len()).max(1);
        tracing::info!(roms = roms.len(), workers, "starting batch export");

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    while let Ok((index, path)) = job_rx.recv() {
                        let outcome = self.process(index, path);
                        self.emit(BatchEvent::Finished {
                            index,
                            outcome: outcome.clone(),
                        });
                        let _ = done_tx.send((index, outcome));
                    }
                });
            }
        });
        drop(done_tx);

        let mut finished: Vec<(usize, RomOutcome)> = done_rx.iter().collect();
        finished.sort_by_key(|(index, _)| *index);
        let report = BatchReport {
            outcomes: finished.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "batch export finished"
        );
        Ok(report)
    }

    fn process(&self, index: usize, path: PathBuf) -> RomOutcome {
        if self.cancel.is_cancelled() {
            tracing::debug!(path = %path.display(), "skipping ROM after cancellation");
            return RomOutcome::Skipped { path };
        }

        self.emit(BatchEvent::Started {
            index,
            path: path.clone(),
        });

        let result = parse_file(&path)
            .map_err(ExportError::from)
            .and_then(|rom| export_rom(&rom, &rom_stem(&path), &self.config));

        match result {
            Ok(export) => {
                tracing::info!(
                    path = %path.display(),
                    tiles = export.tile_files.len(),
                    "exported ROM"
                );
                RomOutcome::Exported { path, export }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to export ROM");
                RomOutcome::Failed {
                    path,
                    error: Arc::new(error),
                }
            }
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Write the tile files, full sheet and metadata for one ROM under
/// `{config.output_dir}/{stem}/`.
pub fn export_rom(rom: &Rom, stem: &str, config: &BatchConfig) -> Result<RomExport, ExportError> {
    let dir = config.output_dir.join(stem);
    fs::create_dir_all(&dir).map_err(|err| ExportError::io(&dir, err))?;

    let palette = config.palette.resolve();
    let tiles = extract_tiles(rom.chr_rom());

    let tile_files = export_tiles(
        &tiles,
        &dir,
        &TileNaming::for_rom(stem),
        config.tile_scale,
        &palette,
    )?;

    let sheet = if tiles.is_empty() {
        tracing::debug!(stem, "no CHR ROM, skipping tile sheet");
        None
    } else {
        let surface = compose_sheet(&tiles, &config.layout, &palette, config.palette.transparent)?;
        let path = dir.join(format!("{stem}_full.png"));
        write_png(&surface, &path)?;
        Some(path)
    };

    let metadata = dir.join(format!("{stem}.json"));
    RomMetadata::from_rom(rom).write_json(&metadata)?;

    Ok(RomExport {
        output_dir: dir,
        tile_files,
        sheet,
        metadata,
    })
}

/// Output directory name for a ROM path: the file stem, or `rom` if there is none.
pub fn rom_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "rom".to_string())
}
