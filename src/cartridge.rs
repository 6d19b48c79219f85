/*!
Cartridge: iNES (v1) loader and mapper construction.

Features:
- Parse the 16-byte iNES header from bytes or a file path
- Extract PRG ROM and CHR (ROM, or 8 KiB of CHR RAM when the image ships none)
- Determine mirroring, battery, trainer and the mapper id
- Build the concrete mapper for ids 0 (NROM), 1 (MMC1), 2 (UxROM), 3 (CNROM)
  and 4 (MMC3)

Notes:
- NES 2.0 images and four-screen boards are rejected.
- PRG RAM: header byte 8 counts 8 KiB units; 0 means 8 KiB by convention.
- The trainer (512 bytes after the header) is skipped, not stored.
*/

use std::fs;
use std::path::Path;

use crate::config::NesConfig;
use crate::error::ConfigError;
use crate::mapper::{Mapper, Mirroring, Nrom};
use crate::mappers::{Cnrom, Mmc1, Mmc3, Uxrom};

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;
const PRG_RAM_UNIT: usize = 8 * 1024;

pub struct Cartridge {
    mapper_id: u16,
    mirroring: Mirroring,
    battery: bool,
    has_trainer: bool,

    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram_len: usize,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("mapper_id", &self.mapper_id)
            .field("mirroring", &self.mirroring)
            .field("battery", &self.battery)
            .field("has_trainer", &self.has_trainer)
            .field("prg_rom_len", &self.prg_rom.len())
            .field("chr_len", &self.chr.len())
            .field("chr_is_ram", &self.chr_is_ram)
            .field("prg_ram_len", &self.prg_ram_len)
            .finish()
    }
}

impl Cartridge {
    // -------------- Construction --------------

    /// Parse a cartridge from raw iNES bytes.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        if data.len() < HEADER_LEN {
            return Err(ConfigError::InvalidRom("data too small for iNES header"));
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(ConfigError::InvalidRom("bad magic (expected NES<1A>)"));
        }

        let prg_units = data[4] as usize;
        let chr_units = data[5] as usize;
        let flags6 = data[6];
        let flags7 = data[7];
        let prg_ram_units = data[8] as usize;

        if flags7 & 0x0C == 0x08 {
            return Err(ConfigError::InvalidRom("NES 2.0 format is not supported"));
        }
        if flags6 & 0b0000_1000 != 0 {
            return Err(ConfigError::InvalidRom("four-screen mirroring is not supported"));
        }

        let mapper_id = (flags7 & 0xF0) as u16 | (flags6 >> 4) as u16;
        if !matches!(mapper_id, 0..=4) {
            return Err(ConfigError::UnsupportedMapper(mapper_id));
        }

        let mirroring = if flags6 & 0b0000_0001 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let battery = flags6 & 0b0000_0010 != 0;
        let has_trainer = flags6 & 0b0000_0100 != 0;

        let mut offset = HEADER_LEN;
        if has_trainer {
            offset += TRAINER_LEN;
        }

        let prg_len = prg_units * PRG_UNIT;
        if prg_len == 0 {
            return Err(ConfigError::InvalidRom("image declares no PRG ROM"));
        }
        let prg_rom = data
            .get(offset..offset + prg_len)
            .ok_or(ConfigError::InvalidRom("data too small for PRG ROM"))?
            .to_vec();
        offset += prg_len;

        let chr_is_ram = chr_units == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_UNIT]
        } else {
            let chr_len = chr_units * CHR_UNIT;
            data.get(offset..offset + chr_len)
                .ok_or(ConfigError::InvalidRom("data too small for CHR ROM"))?
                .to_vec()
        };

        let prg_ram_len = prg_ram_units.max(1) * PRG_RAM_UNIT;

        log::info!(
            "cartridge: mapper {mapper_id}, PRG {} KiB, CHR {} KiB ({}), PRG-RAM {} KiB, {:?} mirroring",
            prg_rom.len() / 1024,
            chr.len() / 1024,
            if chr_is_ram { "RAM" } else { "ROM" },
            prg_ram_len / 1024,
            mirroring,
        );

        Ok(Self {
            mapper_id,
            mirroring,
            battery,
            has_trainer,
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram_len,
        })
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    /// Consume the cartridge and build its mapper.
    pub fn into_mapper(self, config: &NesConfig) -> Result<Box<dyn Mapper>, ConfigError> {
        let ram_enabled = config.prg_ram_enabled_at_power_on;
        let mapper: Box<dyn Mapper> = match self.mapper_id {
            0 => Box::new(Nrom::new(
                self.prg_rom,
                self.chr,
                self.chr_is_ram,
                self.prg_ram_len,
                self.mirroring,
            )),
            1 => Box::new(Mmc1::new(
                self.prg_rom,
                self.prg_ram_len,
                self.chr,
                self.chr_is_ram,
                ram_enabled,
            )),
            2 => Box::new(Uxrom::new(self.prg_rom, self.chr, self.chr_is_ram, self.mirroring)),
            3 => Box::new(Cnrom::new(self.prg_rom, self.chr, self.chr_is_ram, self.mirroring)),
            4 => Box::new(Mmc3::new(
                self.prg_rom,
                self.prg_ram_len,
                self.chr,
                self.chr_is_ram,
                self.mirroring,
                ram_enabled,
            )),
            other => return Err(ConfigError::UnsupportedMapper(other)),
        };
        Ok(mapper)
    }

    // -------------- Accessors --------------

    pub fn mapper_id(&self) -> u16 {
        self.mapper_id
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn battery_backed(&self) -> bool {
        self.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_rom.len()
    }

    pub fn chr_len(&self) -> usize {
        self.chr.len()
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    pub fn prg_ram_len(&self) -> usize {
        self.prg_ram_len
    }
}
