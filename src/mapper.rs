/*!
Mapper subsystem: the trait every cartridge circuit implements, the shared
interceptor registry, and the NROM (mapper 0) implementation.

Address space
=============
A mapper sees one 16-bit space. The CPU bus forwards `$4020-$FFFF` and the
PPU bus forwards `$0000-$1FFF`, so both windows funnel through the same
instance and are told apart by offset:

- `$0000-$1FFF` pattern tables (CHR-ROM or CHR-RAM)
- `$2000-$3FFF` PPU register window; only reached when no interceptor claims
  the register, reads return 0
- `$4000-$401F` CPU I/O space; never cartridge-owned, rejected as unmapped
- `$4020-$5FFF` expansion area; reads 0 unless the board has hardware there
- `$6000-$7FFF` PRG-RAM
- `$8000-$FFFF` PRG-ROM and bank-select registers

Interceptors
============
The PPU claims its registers by registering plain function pointers with the
mapper (`register_read_interceptor` and friends). The CPU bus consults the
registry before falling back to `Mapper::read`/`write`. Storage lives in an
`Interceptors` value composed into each mapper; only the bookkeeping is
shared, every variant keeps its own `read`/`write`.
*/

use std::collections::HashMap;

use crate::error::{AccessKind, AddressSpace, MemoryError};
use crate::ppu::Ppu;
use crate::ppu_bus::PpuBus;

/// Nametable arrangement a mapper currently selects.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    SingleScreenLower,
    SingleScreenUpper,
    Vertical,
    Horizontal,
}

/// Register read hook. Receives the canonical register offset.
pub type ReadInterceptor = fn(&mut Ppu, &mut dyn PpuBus, u16) -> Result<u8, MemoryError>;

/// Register write hook. Receives the canonical register offset and the value.
pub type WriteInterceptor = fn(&mut Ppu, &mut dyn PpuBus, u16, u8) -> Result<(), MemoryError>;

/// Offset-keyed interceptor maps shared by all mapper variants.
#[derive(Clone, Debug, Default)]
pub struct Interceptors {
    reads: HashMap<u16, ReadInterceptor>,
    writes: HashMap<u16, WriteInterceptor>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_read(&mut self, start: u16, end: u16, f: ReadInterceptor) {
        for offset in start..=end {
            self.reads.insert(offset, f);
        }
    }

    pub fn add_write(&mut self, start: u16, end: u16, f: WriteInterceptor) {
        for offset in start..=end {
            self.writes.insert(offset, f);
        }
    }

    #[inline]
    pub fn read_handler(&self, offset: u16) -> Option<ReadInterceptor> {
        self.reads.get(&offset).copied()
    }

    #[inline]
    pub fn write_handler(&self, offset: u16) -> Option<WriteInterceptor> {
        self.writes.get(&offset).copied()
    }

    pub fn clear(&mut self) {
        self.reads.clear();
        self.writes.clear();
    }
}

/// Which part of the cartridge-visible space an offset falls in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Window {
    Chr,
    Registers,
    Expansion,
    PrgRam,
    PrgRom,
}

/// Classify an offset, rejecting the CPU I/O range no cartridge owns.
pub fn window(offset: u16) -> Result<Window, MemoryError> {
    match offset {
        0x0000..=0x1FFF => Ok(Window::Chr),
        0x2000..=0x3FFF => Ok(Window::Registers),
        0x4000..=0x401F => Err(MemoryError::Unmapped {
            space: AddressSpace::Cartridge,
            addr: offset,
        }),
        0x4020..=0x5FFF => Ok(Window::Expansion),
        0x6000..=0x7FFF => Ok(Window::PrgRam),
        0x8000..=0xFFFF => Ok(Window::PrgRom),
    }
}

#[inline]
pub(crate) fn violation(addr: u16, kind: AccessKind) -> MemoryError {
    MemoryError::AccessViolation { addr, kind }
}

/// Common interface all cartridge mappers implement.
pub trait Mapper {
    /// iNES mapper number.
    fn mapper_id(&self) -> u16;

    fn read(&self, offset: u16) -> Result<u8, MemoryError>;

    fn write(&mut self, offset: u16, value: u8) -> Result<(), MemoryError>;

    fn interceptors(&self) -> &Interceptors;

    fn interceptors_mut(&mut self) -> &mut Interceptors;

    fn nametable_mirroring(&self) -> Mirroring;

    fn set_nametable_mirroring(&mut self, mode: Mirroring);

    fn register_read_interceptor(&mut self, f: ReadInterceptor, offset: u16) {
        self.interceptors_mut().add_read(offset, offset, f);
    }

    fn register_read_interceptor_range(&mut self, f: ReadInterceptor, start: u16, end: u16) {
        self.interceptors_mut().add_read(start, end, f);
    }

    fn register_write_interceptor(&mut self, f: WriteInterceptor, offset: u16) {
        self.interceptors_mut().add_write(offset, offset, f);
    }

    fn register_write_interceptor_range(&mut self, f: WriteInterceptor, start: u16, end: u16) {
        self.interceptors_mut().add_write(start, end, f);
    }

    /// Rising edge on PPU address line 12. Only scanline-counting boards care.
    fn pulse(&mut self) {}

    /// Level of the mapper's IRQ output.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Power/reset the bank registers. Storage contents are kept.
    fn reset(&mut self) {}
}

/// NROM (mapper 0).
///
/// - PRG-ROM: 16 KiB mirrored into both halves, or 32 KiB direct.
/// - PRG-RAM: optional, at `$6000-$7FFF`.
/// - CHR: 8 KiB ROM, or RAM when the image ships none.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
    interceptors: Interceptors,
}

impl Nrom {
    pub fn new(
        prg_rom: Vec<u8>,
        chr: Vec<u8>,
        chr_is_ram: bool,
        prg_ram_size: usize,
        mirroring: Mirroring,
    ) -> Self {
        let chr = if chr.is_empty() { vec![0; 0x2000] } else { chr };
        Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            mirroring,
            interceptors: Interceptors::new(),
        }
    }

    #[inline]
    fn prg_rom_read(&self, offset: u16) -> u8 {
        if self.prg_rom.is_empty() {
            return 0;
        }
        // 16 KiB images repeat at $C000.
        let rel = (offset - 0x8000) as usize;
        self.prg_rom[rel % self.prg_rom.len()]
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }
}

impl Mapper for Nrom {
    #[inline]
    fn mapper_id(&self) -> u16 {
        0
    }

    fn read(&self, offset: u16) -> Result<u8, MemoryError> {
        Ok(match window(offset)? {
            Window::Chr => self.chr[offset as usize % self.chr.len()],
            Window::Registers | Window::Expansion => 0,
            Window::PrgRam => {
                if self.prg_ram.is_empty() {
                    0
                } else {
                    self.prg_ram[(offset as usize - 0x6000) % self.prg_ram.len()]
                }
            }
            Window::PrgRom => self.prg_rom_read(offset),
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
            Window::Registers | Window::Expansion => {}
            Window::PrgRam => {
                let len = self.prg_ram.len();
                if len > 0 {
                    self.prg_ram[(offset as usize - 0x6000) % len] = value;
                }
            }
            Window::PrgRom => return Err(violation(offset, AccessKind::PrgRomWrite)),
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
}
