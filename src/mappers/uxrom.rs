/*!
UxROM (Mapper 2).

- PRG: 16 KiB switchable bank at `$8000-$BFFF`, last bank fixed at `$C000-$FFFF`.
- Bank select: any write to `$8000-$FFFF`, low four bits.
- CHR: 8 KiB, almost always RAM on these boards.
- No PRG-RAM; `$6000-$7FFF` reads 0.
*/

use crate::error::{AccessKind, MemoryError};
use crate::mapper::{Interceptors, Mapper, Mirroring, Window, violation, window};

#[derive(Debug, Clone)]
pub struct Uxrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
    bank_select: u8,
    // Byte offsets of the two 16 KiB windows.
    prg_low_offset: usize,
    prg_high_offset: usize,
    interceptors: Interceptors,
}

impl Uxrom {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool, mirroring: Mirroring) -> Self {
        let chr = if chr.is_empty() { vec![0; 0x2000] } else { chr };
        let mut s = Self {
            prg_rom,
            chr,
            chr_is_ram,
            mirroring,
            bank_select: 0,
            prg_low_offset: 0,
            prg_high_offset: 0,
            interceptors: Interceptors::new(),
        };
        s.update_offsets();
        s
    }

    fn bank_count(&self) -> usize {
        (self.prg_rom.len() / 0x4000).max(1)
    }

    fn update_offsets(&mut self) {
        let banks = self.bank_count();
        self.prg_low_offset = (self.bank_select as usize & 0x0F) % banks * 0x4000;
        self.prg_high_offset = (banks - 1) * 0x4000;
    }

    #[cfg(test)]
    pub(crate) fn bank_select(&self) -> u8 {
        self.bank_select
    }
}

impl Mapper for Uxrom {
    fn mapper_id(&self) -> u16 {
        2
    }

    fn read(&self, offset: u16) -> Result<u8, MemoryError> {
        Ok(match window(offset)? {
            Window::Chr => self.chr[offset as usize % self.chr.len()],
            Window::Registers | Window::Expansion | Window::PrgRam => 0,
            Window::PrgRom => {
                if self.prg_rom.is_empty() {
                    return Ok(0);
                }
                let rel = (offset - 0x8000) as usize;
                let base = if rel < 0x4000 {
                    self.prg_low_offset
                } else {
                    self.prg_high_offset
                };
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
                let len = self.chr.len();
                self.chr[offset as usize % len] = value;
            }
            Window::Registers | Window::Expansion | Window::PrgRam => {}
            Window::PrgRom => {
                self.bank_select = value;
                self.update_offsets();
                log::debug!("uxrom: prg bank {}", value & 0x0F);
            }
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
        self.bank_select = 0;
        self.update_offsets();
    }
}
