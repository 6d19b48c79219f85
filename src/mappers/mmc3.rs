/*!
MMC3 (Mapper 4)

Registers (even address selects, odd address acts):
- `$8000/$8001` bank select (index, PRG mode bit 6, CHR inversion bit 7) / bank data
- `$A000/$A001` mirroring (0 vertical, 1 horizontal) / PRG-RAM enable bit 7, protect bit 6
- `$C000/$C001` IRQ latch / IRQ counter clear (reloads on the next pulse)
- `$E000/$E001` IRQ disable and acknowledge / IRQ enable

Banking:
- PRG: four 8 KiB windows. Mode 0 maps `[R6, R7, second-last, last]`,
  mode 1 maps `[second-last, R7, R6, last]`.
- CHR: eight 1 KiB windows. Mode 0 puts the two 2 KiB banks (R0, R1) low and
  the four 1 KiB banks (R2-R5) high; mode 1 swaps the halves.

Offsets are recomputed from the full register state after every register
write.

IRQ:
- `pulse()` is driven by the PPU on each rising edge of address line 12.
  A zero counter reloads from the latch; otherwise it decrements and raises
  the IRQ line when it reaches zero while IRQs are enabled.
*/

use crate::error::{AccessKind, MemoryError};
use crate::mapper::{Interceptors, Mapper, Mirroring, Window, violation, window};

#[derive(Debug, Clone)]
pub struct Mmc3 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,

    // Bank registers R0..R7
    bank_regs: [u8; 8],
    bank_select: u8,
    prg_mode: u8,
    chr_mode: u8,

    chr_offsets: [usize; 8],
    prg_offsets: [usize; 4],

    prg_ram_enabled: bool,
    prg_ram_protected: bool,
    power_on_prg_ram_enabled: bool,

    irq_latch: u8,
    irq_counter: u8,
    irq_enabled: bool,
    irq_pending: bool,

    mirroring: Mirroring,
    interceptors: Interceptors,
}

impl Mmc3 {
    pub fn new(
        prg_rom: Vec<u8>,
        prg_ram_size: usize,
        chr: Vec<u8>,
        chr_is_ram: bool,
        mirroring: Mirroring,
        prg_ram_enabled: bool,
    ) -> Self {
        let chr = if chr.is_empty() { vec![0; 0x2000] } else { chr };
        let mut s = Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            bank_regs: [0, 2, 4, 5, 6, 7, 0, 1],
            bank_select: 0,
            prg_mode: 0,
            chr_mode: 0,
            chr_offsets: [0; 8],
            prg_offsets: [0; 4],
            prg_ram_enabled,
            prg_ram_protected: false,
            power_on_prg_ram_enabled: prg_ram_enabled,
            irq_latch: 0,
            irq_counter: 0,
            irq_enabled: false,
            irq_pending: false,
            mirroring,
            interceptors: Interceptors::new(),
        };
        s.update_offsets();
        s
    }

    fn prg_bank_count(&self) -> usize {
        (self.prg_rom.len() / 0x2000).max(2)
    }

    fn update_offsets(&mut self) {
        let r = self.bank_regs.map(|b| b as usize);
        let pairs = [
            (r[0] & 0xFE) * 0x400,
            (r[0] | 0x01) * 0x400,
            (r[1] & 0xFE) * 0x400,
            (r[1] | 0x01) * 0x400,
        ];
        let singles = [r[2] * 0x400, r[3] * 0x400, r[4] * 0x400, r[5] * 0x400];
        let (low, high) = if self.chr_mode == 0 {
            (pairs, singles)
        } else {
            (singles, pairs)
        };
        self.chr_offsets[..4].copy_from_slice(&low);
        self.chr_offsets[4..].copy_from_slice(&high);

        let banks = self.prg_bank_count();
        let second_last = (banks - 2) * 0x2000;
        let last = (banks - 1) * 0x2000;
        let r6 = (r[6] & 0x3F) % banks * 0x2000;
        let r7 = (r[7] & 0x3F) % banks * 0x2000;
        self.prg_offsets = if self.prg_mode == 0 {
            [r6, r7, second_last, last]
        } else {
            [second_last, r7, r6, last]
        };
    }

    #[inline]
    fn chr_index(&self, offset: u16) -> usize {
        let slot = (offset as usize >> 10) & 7;
        (self.chr_offsets[slot] + (offset as usize & 0x03FF)) % self.chr.len()
    }

    fn write_register(&mut self, offset: u16, value: u8) {
        let even = offset & 1 == 0;
        match (offset, even) {
            (0x8000..=0x9FFF, true) => {
                self.bank_select = value & 0x07;
                self.prg_mode = (value >> 6) & 1;
                self.chr_mode = (value >> 7) & 1;
            }
            (0x8000..=0x9FFF, false) => {
                self.bank_regs[self.bank_select as usize] = value;
            }
            (0xA000..=0xBFFF, true) => {
                self.mirroring = if value & 1 == 0 {
                    Mirroring::Vertical
                } else {
                    Mirroring::Horizontal
                };
                log::debug!("mmc3: mirroring {:?}", self.mirroring);
            }
            (0xA000..=0xBFFF, false) => {
                self.prg_ram_enabled = value & 0x80 != 0;
                self.prg_ram_protected = value & 0x40 != 0;
            }
            (0xC000..=0xDFFF, true) => self.irq_latch = value,
            (0xC000..=0xDFFF, false) => self.irq_counter = 0,
            (_, true) => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            (_, false) => self.irq_enabled = true,
        }
        self.update_offsets();
    }

    fn prg_ram_offset(&self, offset: u16) -> Option<usize> {
        if self.prg_ram.is_empty() {
            None
        } else {
            Some((offset as usize - 0x6000) % self.prg_ram.len())
        }
    }

    #[cfg(test)]
    pub(crate) fn irq_counter(&self) -> u8 {
        self.irq_counter
    }
}

impl Mapper for Mmc3 {
    fn mapper_id(&self) -> u16 {
        4
    }

    fn read(&self, offset: u16) -> Result<u8, MemoryError> {
        Ok(match window(offset)? {
            Window::Chr => self.chr[self.chr_index(offset)],
            Window::Registers | Window::Expansion => 0,
            Window::PrgRam => {
                if !self.prg_ram_enabled {
                    return Err(violation(offset, AccessKind::PrgRamDisabled));
                }
                self.prg_ram_offset(offset).map_or(0, |i| self.prg_ram[i])
            }
            Window::PrgRom => {
                if self.prg_rom.is_empty() {
                    return Ok(0);
                }
                let rel = (offset - 0x8000) as usize;
                let base = self.prg_offsets[rel >> 13];
                self.prg_rom[(base + (rel & 0x1FFF)) % self.prg_rom.len()]
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
                if !self.prg_ram_enabled {
                    return Err(violation(offset, AccessKind::PrgRamDisabled));
                }
                if self.prg_ram_protected {
                    return Err(violation(offset, AccessKind::PrgRamWriteProtected));
                }
                if let Some(i) = self.prg_ram_offset(offset) {
                    self.prg_ram[i] = value;
                }
            }
            Window::PrgRom => self.write_register(offset, value),
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

    fn pulse(&mut self) {
        if self.irq_counter == 0 {
            self.irq_counter = self.irq_latch;
        } else {
            self.irq_counter -= 1;
            if self.irq_counter == 0 && self.irq_enabled {
                self.irq_pending = true;
            }
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    fn reset(&mut self) {
        self.bank_regs = [0, 2, 4, 5, 6, 7, 0, 1];
        self.bank_select = 0;
        self.prg_mode = 0;
        self.chr_mode = 0;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_enabled = false;
        self.irq_pending = false;
        self.prg_ram_enabled = self.power_on_prg_ram_enabled;
        self.prg_ram_protected = false;
        self.update_offsets();
    }
}
