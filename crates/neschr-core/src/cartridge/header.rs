//! The 16-byte iNES / NES 2.0 header.
//!
//! Every `.nes` image starts with the same fixed block: four magic bytes, the
//! PRG/CHR sizes in bank units, and a handful of flag bytes. [`Header`] keeps
//! those raw bytes untouched and derives everything else (mapper number,
//! mirroring, format, section sizes) on access, so there is no cached state
//! that could drift from the bytes read off disk.
//!
//! # Quick overview
//! - [`Header::from_bytes`] copies the first 16 bytes without judging them.
//! - [`Header::parse`] does the same but rejects a missing magic number.
//! - `prg_rom_size` / `chr_rom_size` / `trainer_size` tell the container
//!   parser how many bytes follow the header.

use crate::error::Error;

mod flags6;
mod flags7;
mod mirroring;
mod rom_format;

pub use flags6::Flags6;
pub use flags7::Flags7;
pub use mirroring::Mirroring;
pub use rom_format::RomFormat;

/// Magic number opening every iNES image.
pub const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;

/// One PRG ROM bank.
pub const PRG_ROM_BANK_SIZE: usize = 16 * 1024;

/// One CHR ROM bank.
pub const CHR_ROM_BANK_SIZE: usize = 8 * 1024;

/// Optional trainer block between the header and PRG data.
pub const TRAINER_SIZE: usize = 512;

const PADDING_OFFSET: usize = 11;

/// Raw header bytes with derived views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    bytes: [u8; NES_HEADER_LEN],
}

impl Header {
    /// Copy the first 16 bytes of `bytes` into a header. Magic is not checked.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let raw = bytes
            .get(..NES_HEADER_LEN)
            .ok_or(Error::SectionTooShort {
                section: "header",
                expected: NES_HEADER_LEN,
                actual: bytes.len(),
            })?;

        let mut header = [0u8; NES_HEADER_LEN];
        header.copy_from_slice(raw);
        Ok(Self { bytes: header })
    }

    /// Parse a header, refusing anything without the `NES\x1A` magic.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let header = Self::from_bytes(bytes)?;
        if !header.is_valid() {
            return Err(Error::InvalidMagic {
                found: header.magic(),
            });
        }
        Ok(header)
    }

    pub fn magic(&self) -> [u8; 4] {
        [self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]
    }

    /// `true` iff the magic reads `N`, `E`, `S`, `0x1A`.
    pub fn is_valid(&self) -> bool {
        &self.magic() == NES_MAGIC
    }

    /// PRG ROM size in 16 KiB units.
    pub fn prg_rom_units(&self) -> u8 {
        self.bytes[4]
    }

    /// CHR ROM size in 8 KiB units.
    pub fn chr_rom_units(&self) -> u8 {
        self.bytes[5]
    }

    pub fn flags6(&self) -> Flags6 {
        Flags6::from_bits_retain(self.bytes[6])
    }

    pub fn flags7(&self) -> Flags7 {
        Flags7::from_bits_retain(self.bytes[7])
    }

    pub fn flags8(&self) -> u8 {
        self.bytes[8]
    }

    pub fn flags9(&self) -> u8 {
        self.bytes[9]
    }

    pub fn flags10(&self) -> u8 {
        self.bytes[10]
    }

    pub fn padding(&self) -> &[u8] {
        &self.bytes[PADDING_OFFSET..]
    }

    /// Mapper ID built from the high nibble of flags 7 and the high nibble of flags 6.
    pub fn mapper(&self) -> u8 {
        let high = (self.flags7() & Flags7::MAPPER_HIGH_MASK).bits();
        let low = (self.flags6() & Flags6::MAPPER_LOW_MASK).bits() >> 4;
        high | low
    }

    /// Common board name for the mapper, or `Unknown (#N)`.
    pub fn mapper_name(&self) -> String {
        let name = match self.mapper() {
            0 => "NROM",
            1 => "MMC1",
            2 => "UxROM",
            3 => "CNROM",
            4 => "MMC3",
            5 => "MMC5",
            7 => "AxROM",
            9 => "MMC2",
            10 => "MMC4",
            11 => "Color Dreams",
            other => return format!("Unknown (#{other})"),
        };
        name.to_string()
    }

    pub fn mirroring(&self) -> Mirroring {
        Mirroring::from_flags6(self.flags6())
    }

    /// Battery bit indicates the cartridge keeps RAM contents when powered off.
    pub fn battery_backed_ram(&self) -> bool {
        self.flags6().contains(Flags6::BATTERY)
    }

    pub fn trainer_present(&self) -> bool {
        self.flags6().contains(Flags6::TRAINER)
    }

    pub fn format(&self) -> RomFormat {
        RomFormat::from_flags7(self.flags7())
    }

    /// Amount of PRG ROM in bytes.
    pub fn prg_rom_size(&self) -> usize {
        self.prg_rom_units() as usize * PRG_ROM_BANK_SIZE
    }

    /// Amount of CHR ROM in bytes.
    pub fn chr_rom_size(&self) -> usize {
        self.chr_rom_units() as usize * CHR_ROM_BANK_SIZE
    }

    pub fn trainer_size(&self) -> usize {
        if self.trainer_present() {
            TRAINER_SIZE
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with(flags6: u8, flags7: u8) -> Header {
        let bytes = [
            b'N', b'E', b'S', 0x1A, 2, 1, flags6, flags7, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        Header::parse(&bytes).expect("header parses")
    }

    #[test]
    fn parses_valid_header() {
        let header_bytes = [
            b'N',
            b'E',
            b'S',
            0x1A,        // magic
            2,           // 2 * 16 KiB PRG ROM
            1,           // 1 * 8 KiB CHR ROM
            0b0000_0001, // vertical mirroring
            0b0000_0000, // mapper 0
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0, // padding
        ];

        let header = Header::parse(&header_bytes).expect("header parses");

        assert!(header.is_valid());
        assert_eq!(header.format(), RomFormat::INes);
        assert_eq!(header.prg_rom_size(), 2 * 16 * 1024);
        assert_eq!(header.chr_rom_size(), 8 * 1024);
        assert_eq!(header.mirroring(), Mirroring::Vertical);
        assert!(!header.trainer_present());
        assert_eq!(header.trainer_size(), 0);
        assert_eq!(header.mapper(), 0);
        assert_eq!(header.mapper_name(), "NROM");
        assert_eq!(header.padding().len(), 5);
    }

    #[test]
    fn rejects_invalid_magic() {
        let mut header_bytes = [0u8; NES_HEADER_LEN];
        header_bytes[..4].copy_from_slice(b"NOPE");

        let err = Header::parse(&header_bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic { found } if &found == b"NOPE"));
    }

    #[test]
    fn from_bytes_keeps_invalid_magic_for_inspection() {
        let header = Header::from_bytes(&[0u8; NES_HEADER_LEN]).expect("16 bytes");
        assert!(!header.is_valid());
    }

    #[test]
    fn short_header_reports_section() {
        let err = Header::from_bytes(b"NES\x1A\x01").unwrap_err();
        assert!(matches!(
            err,
            Error::SectionTooShort {
                section: "header",
                expected: NES_HEADER_LEN,
                actual: 5
            }
        ));
    }

    #[test]
    fn magic_with_wrong_terminator_is_invalid() {
        let mut bytes = [0u8; NES_HEADER_LEN];
        bytes[..4].copy_from_slice(b"NES\x1B");
        let header = Header::from_bytes(&bytes).expect("16 bytes");
        assert!(!header.is_valid());
    }

    #[test]
    fn combines_mapper_nibbles() {
        assert_eq!(header_with(0x20, 0x10).mapper(), 18);
        assert_eq!(header_with(0x10, 0x00).mapper(), 1);
        assert_eq!(header_with(0xF0, 0xF0).mapper(), 255);
        assert_eq!(header_with(0x40, 0x00).mapper_name(), "MMC3");
        assert_eq!(header_with(0xB0, 0x00).mapper_name(), "Color Dreams");
        assert_eq!(header_with(0x20, 0x10).mapper_name(), "Unknown (#18)");
    }

    #[test]
    fn mapper_ignores_flag_bits() {
        assert_eq!(header_with(0x2F, 0x1F).mapper(), 18);
        assert_eq!(header_with(0x0F, 0x0F).mapper(), 0);
    }

    #[test]
    fn four_screen_overrides_vertical_bit() {
        assert_eq!(header_with(0b0000_1001, 0).mirroring(), Mirroring::FourScreen);
        assert_eq!(header_with(0b0000_1000, 0).mirroring(), Mirroring::FourScreen);
        assert_eq!(header_with(0b0000_0001, 0).mirroring(), Mirroring::Vertical);
        assert_eq!(header_with(0b0000_0000, 0).mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn detects_nes2_marker() {
        assert_eq!(header_with(0, 0b0000_1000).format(), RomFormat::Nes20);
        assert_eq!(header_with(0, 0b0000_0000).format(), RomFormat::INes);
        assert_eq!(header_with(0, 0b0000_0100).format(), RomFormat::INes);
        assert_eq!(header_with(0, 0b0000_1100).format(), RomFormat::INes);
        // Console-type and mapper bits do not disturb the marker.
        assert_eq!(header_with(0, 0b1111_1011).format(), RomFormat::Nes20);
        assert_eq!(header_with(0, 0b1111_0011).format(), RomFormat::INes);
    }

    #[test]
    fn battery_and_trainer_bits() {
        let header = header_with(0b0000_0110, 0);
        assert!(header.battery_backed_ram());
        assert!(header.trainer_present());
        assert_eq!(header.trainer_size(), TRAINER_SIZE);
    }

    #[test]
    fn display_names_match_document_fields() {
        assert_eq!(Mirroring::FourScreen.to_string(), "FourScreen");
        assert_eq!(RomFormat::Nes20.to_string(), "Nes20");
        assert_eq!(RomFormat::INes.to_string(), "INes");
    }
}
