/*!
ppu_bus: the PPU's view of memory.

The PPU core never touches storage directly; it goes through the `PpuBus`
trait so register and rendering logic can be tested against a small mock.
The real implementation, `PpuMemory`, borrows the cartridge mapper and the
console's internal video RAM for the duration of a tick or register access.

Address space
=============
- 0x0000-0x1FFF : Pattern tables (cartridge CHR via the mapper)
- 0x2000-0x2FFF : Nametables, folded onto 2 KiB by the mapper's mirroring
- 0x3000-0x3EFF : Mirrors of 0x2000-0x2EFF
- 0x3F00-0x3F1F : Palette RAM; 0x3F10/14/18/1C alias 0x3F00/04/08/0C
- 0x3F20-0x3FFF : Mirrors of 0x3F00-0x3F1F

Anything above 0x3FFF is an addressing error. Callers mask the VRAM address
before presenting it.
*/

use crate::config::AccessPolicy;
use crate::error::{AddressSpace, MemoryError};
use crate::mapper::{Mapper, Mirroring};

/// Interface the PPU core depends on for memory traffic.
pub trait PpuBus {
    fn read(&self, addr: u16) -> Result<u8, MemoryError>;

    fn write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError>;

    /// Rising edge on address line 12, forwarded to scanline-counting mappers.
    fn pulse_a12(&mut self) {}
}

/// Console-side video memory: 2 KiB of nametable RAM and 32 palette bytes.
#[derive(Clone, Debug)]
pub struct Vram {
    nametables: [u8; 0x800],
    palette: [u8; 32],
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}

impl Vram {
    pub fn new() -> Self {
        Self {
            nametables: [0; 0x800],
            palette: [0; 32],
        }
    }

    pub fn reset(&mut self) {
        self.nametables = [0; 0x800];
        self.palette = [0; 32];
    }
}

/// Fold a palette address onto the 32 physical entries.
#[inline]
pub fn palette_index(addr: u16) -> usize {
    let idx = ((addr - 0x3F00) % 32) as usize;
    if idx >= 16 && idx % 4 == 0 {
        idx - 16
    } else {
        idx
    }
}

/// Map a nametable address ($2000-$3EFF) to an index into 2 KiB of VRAM.
#[inline]
pub fn nametable_index(addr: u16, mode: Mirroring) -> usize {
    let index = ((addr - 0x2000) % 0x1000) as usize;
    let table = index / 0x400;
    let bank = match mode {
        Mirroring::Vertical => [0, 1, 0, 1][table],
        Mirroring::Horizontal => [0, 0, 1, 1][table],
        Mirroring::SingleScreenLower => 0,
        Mirroring::SingleScreenUpper => 1,
    };
    bank * 0x400 + index % 0x400
}

/// Borrowed PPU address space over the cartridge mapper and console VRAM.
pub struct PpuMemory<'a> {
    mapper: &'a mut dyn Mapper,
    vram: &'a mut Vram,
    policy: AccessPolicy,
}

impl<'a> PpuMemory<'a> {
    pub fn new(mapper: &'a mut dyn Mapper, vram: &'a mut Vram, policy: AccessPolicy) -> Self {
        Self {
            mapper,
            vram,
            policy,
        }
    }
}

impl PpuBus for PpuMemory<'_> {
    fn read(&self, addr: u16) -> Result<u8, MemoryError> {
        match addr {
            0x0000..=0x1FFF => self.policy.filter(self.mapper.read(addr), 0),
            0x2000..=0x3EFF => {
                let i = nametable_index(addr, self.mapper.nametable_mirroring());
                Ok(self.vram.nametables[i])
            }
            0x3F00..=0x3FFF => Ok(self.vram.palette[palette_index(addr)]),
            _ => Err(MemoryError::Unmapped {
                space: AddressSpace::Ppu,
                addr,
            }),
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        match addr {
            0x0000..=0x1FFF => self.policy.filter(self.mapper.write(addr, value), ()),
            0x2000..=0x3EFF => {
                let i = nametable_index(addr, self.mapper.nametable_mirroring());
                self.vram.nametables[i] = value;
                Ok(())
            }
            0x3F00..=0x3FFF => {
                self.vram.palette[palette_index(addr)] = value;
                Ok(())
            }
            _ => Err(MemoryError::Unmapped {
                space: AddressSpace::Ppu,
                addr,
            }),
        }
    }

    fn pulse_a12(&mut self) {
        self.mapper.pulse();
    }
}
