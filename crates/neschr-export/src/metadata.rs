//! Structured ROM metadata document.

use std::{fs, path::Path};

use neschr_core::Rom;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperInfo {
    pub number: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrgRomInfo {
    pub banks: u8,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChrRomInfo {
    pub banks: u8,
    pub size_bytes: usize,
    pub tile_count: usize,
}

/// Everything worth knowing about a parsed ROM, in a serializable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RomMetadata {
    pub file_name: String,
    pub file_path: Option<String>,
    pub format: String,
    pub mapper: MapperInfo,
    pub prg_rom: PrgRomInfo,
    pub chr_rom: ChrRomInfo,
    pub mirroring: String,
    pub has_battery_backed_ram: bool,
    pub has_trainer: bool,
    pub trainer_size: usize,
    pub total_file_size: usize,
    pub is_valid: bool,
}

impl RomMetadata {
    pub fn from_rom(rom: &Rom) -> Self {
        let header = rom.header();
        Self {
            file_name: rom.file_name(),
            file_path: rom.path().map(|path| path.display().to_string()),
            format: header.format().to_string(),
            mapper: MapperInfo {
                number: header.mapper(),
                name: header.mapper_name(),
            },
            prg_rom: PrgRomInfo {
                banks: header.prg_rom_units(),
                size_bytes: header.prg_rom_size(),
            },
            chr_rom: ChrRomInfo {
                banks: header.chr_rom_units(),
                size_bytes: header.chr_rom_size(),
                tile_count: rom.tile_count(),
            },
            mirroring: header.mirroring().to_string(),
            has_battery_backed_ram: header.battery_backed_ram(),
            has_trainer: header.trainer_present(),
            trainer_size: header.trainer_size(),
            total_file_size: rom.total_size(),
            is_valid: rom.is_valid(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|err| ExportError::io(path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neschr_core::parse_bytes;
    use serde_json::Value;

    fn rom(flags6: u8) -> Rom {
        let mut image = vec![
            b'N', b'E', b'S', 0x1A, 2, 1, flags6, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        if flags6 & 0b100 != 0 {
            image.extend(vec![0; 512]);
        }
        image.extend(vec![0; 2 * 16384 + 8192]);
        parse_bytes(&image, Some(Path::new("/roms/test_rom.nes"))).expect("parse")
    }

    #[test]
    fn document_uses_camel_case_fields() {
        let json = RomMetadata::from_rom(&rom(0b0000_0010))
            .to_json_pretty()
            .expect("serialize");
        let value: Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["fileName"], "test_rom.nes");
        assert_eq!(value["filePath"], "/roms/test_rom.nes");
        assert_eq!(value["format"], "INes");
        assert_eq!(value["mapper"]["number"], 0);
        assert_eq!(value["mapper"]["name"], "NROM");
        assert_eq!(value["prgRom"]["banks"], 2);
        assert_eq!(value["prgRom"]["sizeBytes"], 32768);
        assert_eq!(value["chrRom"]["banks"], 1);
        assert_eq!(value["chrRom"]["sizeBytes"], 8192);
        assert_eq!(value["chrRom"]["tileCount"], 512);
        assert_eq!(value["mirroring"], "Horizontal");
        assert_eq!(value["hasBatteryBackedRam"], true);
        assert_eq!(value["hasTrainer"], false);
        assert_eq!(value["trainerSize"], 0);
        assert_eq!(value["totalFileSize"], 16 + 32768 + 8192);
        assert_eq!(value["isValid"], true);
    }

    #[test]
    fn trainer_is_reported() {
        let metadata = RomMetadata::from_rom(&rom(0b0000_0100));
        assert!(metadata.has_trainer);
        assert_eq!(metadata.trainer_size, 512);
        assert_eq!(metadata.total_file_size, 16 + 512 + 32768 + 8192);
    }

    #[test]
    fn in_memory_rom_has_null_path() {
        let image = [b'N', b'E', b'S', 0x1A, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let metadata = RomMetadata::from_rom(&parse_bytes(&image, None).expect("parse"));
        assert_eq!(metadata.file_name, "Unknown");
        let value: Value = serde_json::to_value(&metadata).expect("to value");
        assert!(value["filePath"].is_null());
    }
}
