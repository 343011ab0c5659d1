use std::{
    fmt,
    fs::File,
    io::{BufReader, Cursor, Read},
    path::{Path, PathBuf},
};

use crate::{
    cartridge::header::{Header, NES_HEADER_LEN, TRAINER_SIZE},
    chr::TILE_BYTES,
    error::Error,
};

pub mod header;

/// File extension recognised by [`probe`].
pub const ROM_EXTENSION: &str = "nes";

/// A fully split ROM image.
///
/// Section lengths always match what the header advertises: the parser fails
/// instead of producing a partially filled `Rom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    header: Header,
    trainer: Option<Box<[u8; TRAINER_SIZE]>>,
    prg_rom: Box<[u8]>,
    chr_rom: Box<[u8]>,
    path: Option<PathBuf>,
}

impl Rom {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn trainer(&self) -> Option<&[u8; TRAINER_SIZE]> {
        self.trainer.as_deref()
    }

    /// Program segment.
    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    /// Graphics segment.
    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    /// Path the ROM was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Final path component, or `"Unknown"` for ROMs parsed from memory.
    pub fn file_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Header + trainer + PRG + CHR.
    pub fn total_size(&self) -> usize {
        NES_HEADER_LEN + self.header.trainer_size() + self.prg_rom.len() + self.chr_rom.len()
    }

    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }

    pub fn prg_rom_banks(&self) -> u8 {
        self.header.prg_rom_units()
    }

    pub fn chr_rom_banks(&self) -> u8 {
        self.header.chr_rom_units()
    }

    /// Number of whole 16-byte tiles in the graphics segment.
    pub fn tile_count(&self) -> usize {
        self.chr_rom.len() / TILE_BYTES
    }
}

impl fmt::Display for Rom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Mapper: {} ({}), PRG: {}x16KB, CHR: {}x8KB, Mirroring: {}",
            self.file_name(),
            self.header.mapper(),
            self.header.mapper_name(),
            self.header.prg_rom_units(),
            self.header.chr_rom_units(),
            self.header.mirroring(),
        )
    }
}

/// Read a ROM container from any byte source.
///
/// `path` is only recorded as metadata; nothing is opened through it.
pub fn parse<R: Read>(mut reader: R, path: Option<&Path>) -> Result<Rom, Error> {
    let header_bytes = read_section(&mut reader, NES_HEADER_LEN, "header")?;
    let header = Header::parse(&header_bytes)?;

    tracing::debug!(
        format = %header.format(),
        mapper = header.mapper(),
        prg_banks = header.prg_rom_units(),
        chr_banks = header.chr_rom_units(),
        trainer = header.trainer_present(),
        "parsed NES header"
    );

    let trainer = if header.trainer_present() {
        let bytes = read_section(&mut reader, TRAINER_SIZE, "trainer")?;
        let trainer: Box<[u8; TRAINER_SIZE]> =
            bytes
                .into_boxed_slice()
                .try_into()
                .map_err(|rest: Box<[u8]>| Error::SectionTooShort {
                    section: "trainer",
                    expected: TRAINER_SIZE,
                    actual: rest.len(),
                })?;
        Some(trainer)
    } else {
        None
    };

    let prg_rom = read_section(&mut reader, header.prg_rom_size(), "PRG ROM")?;
    let chr_rom = read_section(&mut reader, header.chr_rom_size(), "CHR ROM")?;

    Ok(Rom {
        header,
        trainer,
        prg_rom: prg_rom.into_boxed_slice(),
        chr_rom: chr_rom.into_boxed_slice(),
        path: path.map(Path::to_path_buf),
    })
}

/// Parse a ROM held in memory.
pub fn parse_bytes(bytes: &[u8], path: Option<&Path>) -> Result<Rom, Error> {
    parse(Cursor::new(bytes), path)
}

/// Load a ROM directly from disk.
pub fn parse_file<P>(path: P) -> Result<Rom, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.to_string_lossy().trim().is_empty() {
        return Err(Error::InvalidArgument("ROM path is empty".to_string()));
    }
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    parse(BufReader::new(file), Some(path))
}

/// Cheap check whether `path` looks like an iNES image: `.nes` extension plus
/// magic. Never fails; any problem reads as `false`.
pub fn probe<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ROM_EXTENSION));
    if !has_extension {
        return false;
    }

    let Ok(file) = File::open(path) else {
        return false;
    };
    match read_section(file, NES_HEADER_LEN, "header") {
        Ok(bytes) => Header::parse(&bytes).is_ok(),
        Err(_) => false,
    }
}

/// Read exactly `len` bytes, reporting how many actually arrived on a short read.
fn read_section<R: Read>(reader: R, len: usize, name: &'static str) -> Result<Vec<u8>, Error> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let mut buf = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(Error::SectionTooShort {
            section: name,
            expected: len,
            actual: buf.len(),
        });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::header::{CHR_ROM_BANK_SIZE, Mirroring, PRG_ROM_BANK_SIZE};

    fn base_header(prg_banks: u8, chr_banks: u8, flags6: u8) -> [u8; NES_HEADER_LEN] {
        [
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ]
    }

    #[test]
    fn loads_basic_nrom_cartridge() {
        let mut image = base_header(1, 1, 0).to_vec();
        image.extend(vec![0xAA; PRG_ROM_BANK_SIZE]);
        image.extend(vec![0x55; CHR_ROM_BANK_SIZE]);

        let rom = parse_bytes(&image, None).expect("parse cartridge");

        assert!(rom.is_valid());
        assert_eq!(rom.prg_rom().len(), 16 * 1024);
        assert_eq!(rom.chr_rom().len(), 8 * 1024);
        assert_eq!(rom.prg_rom()[0], 0xAA);
        assert_eq!(rom.chr_rom()[0], 0x55);
        assert!(rom.trainer().is_none());
        assert_eq!(rom.total_size(), image.len());
        assert_eq!(rom.tile_count(), 512);
        assert_eq!(rom.file_name(), "Unknown");
    }

    #[test]
    fn loads_cartridge_with_trainer() {
        let mut image = base_header(1, 0, 0b0000_0100).to_vec();
        image.extend(vec![0xFE; TRAINER_SIZE]);
        image.extend(vec![0xAA; PRG_ROM_BANK_SIZE]);

        let rom = parse_bytes(&image, None).expect("parse cartridge");

        assert!(rom.header().trainer_present());
        assert_eq!(rom.trainer().map(|t| t[0]), Some(0xFE));
        assert_eq!(rom.prg_rom()[0], 0xAA);
        assert!(rom.chr_rom().is_empty());
        assert_eq!(rom.total_size(), 16 + 512 + 16 * 1024);
    }

    #[test]
    fn errors_when_prg_section_missing() {
        let mut image = base_header(1, 0, 0).to_vec();
        image.extend(vec![0xAA; 1024]); // insufficient PRG data

        let err = parse_bytes(&image, None).expect_err("should fail");
        assert!(matches!(
            err,
            Error::SectionTooShort {
                section: "PRG ROM",
                expected: 16384,
                actual: 1024
            }
        ));
    }

    #[test]
    fn errors_when_trainer_truncated() {
        let mut image = base_header(0, 0, 0b0000_0100).to_vec();
        image.extend(vec![0; 100]);

        let err = parse_bytes(&image, None).expect_err("should fail");
        assert!(matches!(
            err,
            Error::SectionTooShort {
                section: "trainer",
                expected: TRAINER_SIZE,
                actual: 100
            }
        ));
    }

    #[test]
    fn errors_when_chr_section_missing() {
        let mut image = base_header(1, 1, 0).to_vec();
        image.extend(vec![0; PRG_ROM_BANK_SIZE]);

        let err = parse_bytes(&image, None).expect_err("should fail");
        assert!(matches!(
            err,
            Error::SectionTooShort {
                section: "CHR ROM",
                expected: 8192,
                actual: 0
            }
        ));
    }

    #[test]
    fn rejects_bad_magic_before_reading_sections() {
        let mut image = base_header(1, 1, 0).to_vec();
        image[3] = 0x00;

        let err = parse_bytes(&image, None).expect_err("should fail");
        assert!(matches!(err, Error::InvalidMagic { .. }));
    }

    #[test]
    fn zero_sized_sections_are_empty() {
        let image = base_header(0, 0, 0);
        let rom = parse_bytes(&image, None).expect("parse cartridge");
        assert!(rom.prg_rom().is_empty());
        assert!(rom.chr_rom().is_empty());
        assert_eq!(rom.total_size(), NES_HEADER_LEN);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut image = base_header(0, 1, 0).to_vec();
        image.extend(vec![0x11; CHR_ROM_BANK_SIZE + 37]);

        let rom = parse_bytes(&image, None).expect("parse cartridge");
        assert_eq!(rom.chr_rom().len(), CHR_ROM_BANK_SIZE);
    }

    #[test]
    fn summary_line_mentions_mapper_and_mirroring() {
        let mut image = base_header(2, 0, 0b0001_0001).to_vec();
        image.extend(vec![0; 2 * PRG_ROM_BANK_SIZE]);
        let rom = parse_bytes(&image, Some(Path::new("roms/game.nes"))).expect("parse");

        assert_eq!(rom.header().mirroring(), Mirroring::Vertical);
        assert_eq!(
            rom.to_string(),
            "game.nes - Mapper: 1 (MMC1), PRG: 2x16KB, CHR: 0x8KB, Mirroring: Vertical"
        );
    }
}
