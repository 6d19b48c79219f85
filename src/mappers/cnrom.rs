/*
CNROM (Mapper 3).

- PRG: fixed, 16 KiB mirrored or 32 KiB direct at $8000-$FFFF.
- CHR: 8 KiB window selected by any write to $8000-$FFFF (low two bits,
  wrapped by the number of 8 KiB banks present).
- Mirroring comes from the header; the board cannot change it.
*/

use crate::error::{AccessKind, MemoryError};
use crate::mapper::{Interceptors, Mapper, Mirroring, Window, violation, window};

#[derive(Debug, Clone)]
pub struct Cnrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
    chr_bank: u8,
    chr_offset: usize,
    interceptors: Interceptors,
}

impl Cnrom {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool, mirroring: Mirroring) -> Self {
        let chr = if chr.is_empty() { vec![0; 0x2000] } else { chr };
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            mirroring,
            chr_bank: 0,
            chr_offset: 0,
            interceptors: Interceptors::new(),
        }
    }

    fn update_offsets(&mut self) {
        let banks = (self.chr.len() / 0x2000).max(1);
        self.chr_offset = (self.chr_bank as usize & 0x03) % banks * 0x2000;
    }

    #[inline]
    fn chr_index(&self, offset: u16) -> usize {
        (self.chr_offset + (offset as usize & 0x1FFF)) % self.chr.len()
    }

    #[cfg(test)]
    pub(crate) fn current_chr_bank(&self) -> u8 {
        self.chr_bank
    }
}

impl Mapper for Cnrom {
    fn mapper_id(&self) -> u16 {
        3
    }

    fn read(&self, offset: u16) -> Result<u8, MemoryError> {
        Ok(match window(offset)? {
            Window::Chr => self.chr[self.chr_index(offset)],
            Window::Registers | Window::Expansion | Window::PrgRam => 0,
            Window::PrgRom => {
                if self.prg_rom.is_empty() {
                    0
                } else {
                    self.prg_rom[(offset - 0x8000) as usize % self.prg_rom.len()]
                }
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
            Window::Registers | Window::Expansion | Window::PrgRam => {}
            Window::PrgRom => {
                self.chr_bank = value;
                self.update_offsets();
                log::debug!("cnrom: chr bank {}", value & 0x03);
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
        self.chr_bank = 0;
        self.update_offsets();
    }
}

#[cfg(test)]
mod tests {
    use super::Cnrom;
    use crate::mapper::{Mapper, Mirroring};

    fn make_prg(size_k: usize, fill_a: u8, fill_b: u8) -> Vec<u8> {
        let size = size_k * 1024;
        let mut v = vec![fill_a; size];
        if size > 0 {
            v[size - 1] = fill_b;
        }
        v
    }

    fn cnrom(prg: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool) -> Cnrom {
        Cnrom::new(prg, chr, chr_is_ram, Mirroring::Vertical)
    }

    #[test]
    fn prg_16k_mirroring() {
        let m = cnrom(make_prg(16, 0xAA, 0xBB), vec![0x11; 0x2000], false);
        assert_eq!(m.read(0x8000), Ok(0xAA));
        assert_eq!(m.read(0xBFFF), Ok(0xBB));
        assert_eq!(m.read(0xC000), Ok(0xAA));
        assert_eq!(m.read(0xFFFF), Ok(0xBB));
    }

    #[test]
    fn chr_bank_switching() {
        let mut chr = vec![0u8; 0x8000];
        chr[0] = 0x01;
        chr[0x2000] = 0x02;
        chr[0x6000] = 0x04;
        let mut m = cnrom(make_prg(16, 0, 0), chr, false);
        assert_eq!(m.read(0x0000), Ok(0x01));
        m.write(0x8000, 0x01).unwrap();
        assert_eq!(m.read(0x0000), Ok(0x02));
        m.write(0xFFFF, 0x03).unwrap();
        assert_eq!(m.read(0x0000), Ok(0x04));
    }

    #[test]
    fn chr_bank_wraps_to_present_banks() {
        let mut chr = vec![0u8; 0x4000];
        chr[0x2000] = 0x55;
        let mut m = cnrom(make_prg(16, 0, 0), chr, false);
        m.write(0x8000, 3).unwrap();
        assert_eq!(m.current_chr_bank(), 3);
        assert_eq!(m.read(0x0000), Ok(0x55));
    }

    #[test]
    fn chr_rom_rejects_writes() {
        let mut m = cnrom(make_prg(16, 0, 0), vec![0x00; 0x2000], false);
        assert!(m.write(0x0002, 0x7F).is_err());
        assert_eq!(m.read(0x0002), Ok(0x00));
    }

    #[test]
    fn reset_restores_bank0() {
        let mut chr = vec![0u8; 0x4000];
        chr[0] = 0x10;
        let mut m = cnrom(make_prg(16, 0, 0), chr, false);
        m.write(0x8000, 1).unwrap();
        m.reset();
        assert_eq!(m.current_chr_bank(), 0);
        assert_eq!(m.read(0x0000), Ok(0x10));
    }
}
