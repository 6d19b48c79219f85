//! MMC1 (Mapper 1).
//!
//! Implements:
//! - Serial 5-bit shift register feeding control / CHR0 / CHR1 / PRG registers
//! - PRG banking: 32K switch, 16K with fixed low, 16K with fixed high
//! - CHR banking: 8K combined or two independent 4K windows
//! - Mirroring selection including both single-screen modes
//! - PRG-RAM enable (PRG register bit 4, active low)
//!
//! Every committed register write recomputes all four bank offsets from the
//! full register state.
//!
//! Not modelled: consecutive-cycle write filtering, SUROM/SOROM outer banks.

use crate::error::{AccessKind, MemoryError};
use crate::mapper::{Interceptors, Mapper, Mirroring, Window, violation, window};

#[derive(Debug, Clone)]
pub struct Mmc1 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,

    // 5-bit registers
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
    prg_ram_enabled: bool,
    // PRG register value restored on reset
    power_on_prg_bank: u8,

    // Serial latch
    shift_reg: u8,
    shift_count: u8,

    // Byte offsets into PRG/CHR for each window
    chr_offsets: [usize; 2],
    prg_offsets: [usize; 2],

    mirroring: Mirroring,
    interceptors: Interceptors,
}

impl Mmc1 {
    pub fn new(
        prg_rom: Vec<u8>,
        prg_ram_size: usize,
        chr: Vec<u8>,
        chr_is_ram: bool,
        prg_ram_enabled: bool,
    ) -> Self {
        let chr = if chr.is_empty() { vec![0; 0x2000] } else { chr };
        let power_on_prg_bank = if prg_ram_enabled { 0 } else { 0x10 };
        let mut s = Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: power_on_prg_bank,
            prg_ram_enabled,
            power_on_prg_bank,
            shift_reg: 0,
            shift_count: 0,
            chr_offsets: [0, 0x1000],
            prg_offsets: [0, 0],
            mirroring: Mirroring::SingleScreenLower,
            interceptors: Interceptors::new(),
        };
        s.update_offsets();
        s
    }

    #[inline]
    fn prg_bank_count(&self) -> usize {
        (self.prg_rom.len() / 0x4000).max(1)
    }

    #[inline]
    fn prg_mode(&self) -> u8 {
        (self.control >> 2) & 0x03
    }

    #[inline]
    fn chr_mode(&self) -> u8 {
        (self.control >> 4) & 0x01
    }

    fn update_offsets(&mut self) {
        self.mirroring = match self.control & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };

        self.chr_offsets = if self.chr_mode() == 0 {
            let base = (self.chr_bank0 & 0x1E) as usize * 0x1000;
            [base, base + 0x1000]
        } else {
            [
                self.chr_bank0 as usize * 0x1000,
                self.chr_bank1 as usize * 0x1000,
            ]
        };

        let last = (self.prg_bank_count() - 1) * 0x4000;
        let bank = (self.prg_bank & 0x0F) as usize;
        self.prg_offsets = match self.prg_mode() {
            0 | 1 => {
                let base = (bank & 0x0E) * 0x4000;
                [base, base + 0x4000]
            }
            2 => [0, bank * 0x4000],
            _ => [bank * 0x4000, last],
        };
        self.prg_ram_enabled = self.prg_bank & 0x10 == 0;
    }

    fn commit_register(&mut self, offset: u16, value5: u8) {
        match offset {
            0x8000..=0x9FFF => self.control = value5,
            0xA000..=0xBFFF => self.chr_bank0 = value5,
            0xC000..=0xDFFF => self.chr_bank1 = value5,
            _ => self.prg_bank = value5,
        }
        self.update_offsets();
        log::debug!(
            "mmc1: ctrl={:05b} chr0={:02X} chr1={:02X} prg={:02X}",
            self.control,
            self.chr_bank0,
            self.chr_bank1,
            self.prg_bank
        );
    }

    fn serial_write(&mut self, offset: u16, data: u8) {
        if data & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            self.update_offsets();
            return;
        }
        self.shift_reg |= (data & 1) << self.shift_count;
        self.shift_count += 1;
        if self.shift_count == 5 {
            let value5 = self.shift_reg & 0x1F;
            self.shift_reg = 0;
            self.shift_count = 0;
            self.commit_register(offset, value5);
        }
    }

    #[inline]
    fn chr_index(&self, offset: u16) -> usize {
        let slot = (offset as usize >> 12) & 1;
        (self.chr_offsets[slot] + (offset as usize & 0x0FFF)) % self.chr.len()
    }

    fn prg_ram_index(&self, offset: u16) -> Result<Option<usize>, MemoryError> {
        if !self.prg_ram_enabled {
            return Err(violation(offset, AccessKind::PrgRamDisabled));
        }
        if self.prg_ram.is_empty() {
            return Ok(None);
        }
        Ok(Some((offset as usize - 0x6000) % self.prg_ram.len()))
    }

    #[cfg(test)]
    pub(crate) fn prg_offsets(&self) -> [usize; 2] {
        self.prg_offsets
    }

    #[cfg(test)]
    pub(crate) fn chr_offsets(&self) -> [usize; 2] {
        self.chr_offsets
    }
}

impl Mapper for Mmc1 {
    fn mapper_id(&self) -> u16 {
        1
    }

    fn read(&self, offset: u16) -> Result<u8, MemoryError> {
        Ok(match window(offset)? {
            Window::Chr => self.chr[self.chr_index(offset)],
            Window::Registers | Window::Expansion => 0,
            Window::PrgRam => match self.prg_ram_index(offset)? {
                Some(i) => self.prg_ram[i],
                None => 0,
            },
            Window::PrgRom => {
                if self.prg_rom.is_empty() {
                    return Ok(0);
                }
                let rel = (offset - 0x8000) as usize;
                let base = self.prg_offsets[rel >> 14];
                self.prg_rom[(base + (rel & 0x3FFF)) % self.prg_rom.len()]
            }
        })
    }

    fn write(&mut self, offset: u16, value: u8) -> Result<(), MemoryError> {
        match window(offset)? {
            Window::Chr => {
                if !self.chr_is_ram {
                    return Err(violation(offset, AccessKind::ChrRomWrite));
                }
                let idx = self.chr_index(offset);
                self.chr[idx] = value;
            }
            Window::Registers | Window::Expansion => {}
            Window::PrgRam => {
                if let Some(i) = self.prg_ram_index(offset)? {
                    self.prg_ram[i] = value;
                }
            }
            Window::PrgRom => self.serial_write(offset, value),
        }
        Ok(())
    }

    fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    fn interceptors_mut(&mut self) -> &mut Interceptors {
        &mut self.interceptors
    }

    fn nametable_mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn set_nametable_mirroring(&mut self, mode: Mirroring) {
        self.mirroring = mode;
    }

    fn reset(&mut self) {
        self.control = 0x0C;
        self.shift_reg = 0;
        self.shift_count = 0;
        self.chr_bank0 = 0;
        self.chr_bank1 = 0;
        self.prg_bank = self.power_on_prg_bank;
        self.update_offsets();
    }
}
