#![doc = r#"
PPU registers module

Purpose
- CPU-visible register semantics for $2000-$2007 and the $4014 DMA port.
- `Ppu::attach` installs them as interceptors on the cartridge mapper, which
  is how the CPU bus reaches the PPU.

Notes
- The CPU bus folds $2000-$3FFF onto the eight canonical offsets before
  consulting the interceptor table, so handlers only ever see $2000-$2007
  and $4014.
- Only $2002, $2004 and $2007 are readable. The remaining registers are
  write-only and fall through to the mapper, which returns 0.
- Every write copies its low five bits into PPUSTATUS (open bus).
- PPUDATA reads below $3F00 go through the internal read buffer; palette
  reads return immediately and refill the buffer from the nametable byte
  underneath (address - $1000).
"#]

use super::*;
use crate::error::{AddressSpace, MemoryError};
use crate::mapper::Mapper;
use crate::ppu_bus::PpuBus;

pub const PPUCTRL: u16 = 0x2000;
pub const PPUMASK: u16 = 0x2001;
pub const PPUSTATUS: u16 = 0x2002;
pub const OAMADDR: u16 = 0x2003;
pub const OAMDATA: u16 = 0x2004;
pub const PPUSCROLL: u16 = 0x2005;
pub const PPUADDR: u16 = 0x2006;
pub const PPUDATA: u16 = 0x2007;
pub const OAMDMA: u16 = 0x4014;

fn read_interceptor(ppu: &mut Ppu, bus: &mut dyn PpuBus, offset: u16) -> Result<u8, MemoryError> {
    ppu.read_register(bus, offset)
}

fn write_interceptor(
    ppu: &mut Ppu,
    bus: &mut dyn PpuBus,
    offset: u16,
    value: u8,
) -> Result<(), MemoryError> {
    ppu.write_register(bus, offset, value)
}

impl Ppu {
    /// Claim the PPU register window on a mapper.
    pub fn attach(mapper: &mut dyn Mapper) {
        mapper.register_read_interceptor(read_interceptor, PPUSTATUS);
        mapper.register_read_interceptor(read_interceptor, OAMDATA);
        mapper.register_read_interceptor(read_interceptor, PPUDATA);
        mapper.register_write_interceptor_range(write_interceptor, PPUCTRL, PPUDATA);
        mapper.register_write_interceptor(write_interceptor, OAMDMA);
    }

    #[inline]
    fn vram_increment(&self) -> u16 {
        if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 }
    }

    #[inline]
    fn advance_vram_addr(&mut self) {
        self.v = self.v.wrapping_add(self.vram_increment()) & 0x7FFF;
    }

    /// CPU read of a canonical register offset.
    pub fn read_register<B: PpuBus + ?Sized>(
        &mut self,
        bus: &mut B,
        reg: u16,
    ) -> Result<u8, MemoryError> {
        match reg {
            PPUSTATUS => {
                let out = self.status;
                self.status &= !STATUS_VBLANK;
                self.write_toggle = false;
                Ok(out)
            }
            OAMDATA => Ok(self.oam[self.oam_addr as usize]),
            PPUDATA => {
                let addr = self.v & 0x3FFF;
                let mut data = bus.read(addr)?;
                if addr < 0x3F00 {
                    std::mem::swap(&mut data, &mut self.data_buffer);
                } else {
                    self.data_buffer = bus.read(addr - 0x1000)?;
                }
                self.advance_vram_addr();
                Ok(data)
            }
            PPUCTRL | PPUMASK | OAMADDR | PPUSCROLL | PPUADDR | OAMDMA => Ok(0),
            _ => Err(MemoryError::Unmapped {
                space: AddressSpace::Cpu,
                addr: reg,
            }),
        }
    }

    /// CPU write to a canonical register offset.
    pub fn write_register<B: PpuBus + ?Sized>(
        &mut self,
        bus: &mut B,
        reg: u16,
        value: u8,
    ) -> Result<(), MemoryError> {
        self.status = (self.status & 0xE0) | (value & 0x1F);
        match reg {
            PPUCTRL => {
                self.ctrl = value;
                self.t = (self.t & 0xF3FF) | (((value & 0x03) as u16) << 10);
            }
            PPUMASK => self.mask = value,
            PPUSTATUS => {}
            OAMADDR => self.oam_addr = value,
            OAMDATA => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            PPUSCROLL => {
                if !self.write_toggle {
                    self.t = (self.t & 0xFFE0) | (value >> 3) as u16;
                    self.fine_x = value & 0x07;
                } else {
                    self.t &= 0x0C1F;
                    self.t |= ((value & 0x07) as u16) << 12;
                    self.t |= ((value & 0xF8) as u16) << 2;
                }
                self.write_toggle = !self.write_toggle;
            }
            PPUADDR => {
                if !self.write_toggle {
                    self.t = (self.t & 0x00FF) | (((value & 0x3F) as u16) << 8);
                } else {
                    self.t = (self.t & 0xFF00) | value as u16;
                    self.v = self.t;
                }
                self.write_toggle = !self.write_toggle;
            }
            PPUDATA => {
                bus.write(self.v & 0x3FFF, value)?;
                self.advance_vram_addr();
            }
            OAMDMA => self.dma_request = Some(value),
            _ => {
                return Err(MemoryError::Unmapped {
                    space: AddressSpace::Cpu,
                    addr: reg,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{Mirroring, Nrom};
    use crate::ppu_bus::tests::MockPpuBus;

    fn setup() -> (Ppu, MockPpuBus) {
        (Ppu::new(), MockPpuBus::new())
    }

    fn set_addr(ppu: &mut Ppu, bus: &mut MockPpuBus, addr: u16) {
        ppu.write_register(bus, PPUADDR, (addr >> 8) as u8).unwrap();
        ppu.write_register(bus, PPUADDR, addr as u8).unwrap();
    }

    #[test]
    fn status_read_clears_vblank_and_toggle() {
        let (mut ppu, mut bus) = setup();
        ppu.write_register(&mut bus, PPUSCROLL, 0x10).unwrap();
        assert!(ppu.write_toggle);

        let s = ppu.read_register(&mut bus, PPUSTATUS).unwrap();
        assert_eq!(s & STATUS_VBLANK, STATUS_VBLANK);
        assert!(!ppu.vblank());
        assert!(!ppu.write_toggle);
    }

    #[test]
    fn writes_leak_low_bits_into_status() {
        let (mut ppu, mut bus) = setup();
        ppu.write_register(&mut bus, PPUMASK, 0x1B).unwrap();
        assert_eq!(ppu.status(), STATUS_VBLANK | 0x1B);
        ppu.write_register(&mut bus, OAMADDR, 0xE4).unwrap();
        assert_eq!(ppu.status(), STATUS_VBLANK | 0x04);
    }

    #[test]
    fn ctrl_sets_nametable_bits_of_t() {
        let (mut ppu, mut bus) = setup();
        ppu.write_register(&mut bus, PPUCTRL, 0x03).unwrap();
        assert_eq!(ppu.temp_addr(), 0x0C00);
        ppu.write_register(&mut bus, PPUCTRL, 0x01).unwrap();
        assert_eq!(ppu.temp_addr(), 0x0400);
    }

    #[test]
    fn scroll_writes_compose_t_and_fine_x() {
        let (mut ppu, mut bus) = setup();
        // X = 0x7D: coarse X 15, fine X 5. Y = 0x5E: coarse Y 11, fine Y 6.
        ppu.write_register(&mut bus, PPUSCROLL, 0x7D).unwrap();
        ppu.write_register(&mut bus, PPUSCROLL, 0x5E).unwrap();
        assert_eq!(ppu.fine_x(), 5);
        assert_eq!(ppu.temp_addr(), (6 << 12) | (11 << 5) | 15);
        // v is untouched until the second PPUADDR write.
        assert_eq!(ppu.vram_addr(), 0);
    }

    #[test]
    fn addr_writes_load_v_on_second_write() {
        let (mut ppu, mut bus) = setup();
        ppu.write_register(&mut bus, PPUADDR, 0xFF).unwrap();
        assert_eq!(ppu.vram_addr(), 0);
        ppu.write_register(&mut bus, PPUADDR, 0x45).unwrap();
        // High write is masked to six bits, keeping v within 15 bits.
        assert_eq!(ppu.vram_addr(), 0x3F45);
    }

    #[test]
    fn data_reads_are_buffered_below_palette() {
        let (mut ppu, mut bus) = setup();
        bus.nametable[0x0000] = 0x11;
        bus.nametable[0x0001] = 0x22;
        set_addr(&mut ppu, &mut bus, 0x2000);

        assert_eq!(ppu.read_register(&mut bus, PPUDATA), Ok(0x00));
        assert_eq!(ppu.read_register(&mut bus, PPUDATA), Ok(0x11));
        assert_eq!(ppu.read_register(&mut bus, PPUDATA), Ok(0x22));
        assert_eq!(ppu.vram_addr(), 0x2003);
    }

    #[test]
    fn palette_reads_are_immediate_and_refill_buffer() {
        let (mut ppu, mut bus) = setup();
        bus.palette[0x01] = 0x2A;
        // Nametable byte underneath $3F01 is $2F01.
        bus.nametable[0x0F01] = 0x77;
        set_addr(&mut ppu, &mut bus, 0x3F01);

        assert_eq!(ppu.read_register(&mut bus, PPUDATA), Ok(0x2A));
        assert_eq!(ppu.data_buffer, 0x77);
    }

    #[test]
    fn data_writes_increment_by_1_or_32() {
        let (mut ppu, mut bus) = setup();
        set_addr(&mut ppu, &mut bus, 0x2000);
        ppu.write_register(&mut bus, PPUDATA, 0xAA).unwrap();
        assert_eq!(bus.nametable[0], 0xAA);
        assert_eq!(ppu.vram_addr(), 0x2001);

        ppu.write_register(&mut bus, PPUCTRL, CTRL_INCREMENT_32).unwrap();
        ppu.write_register(&mut bus, PPUDATA, 0xBB).unwrap();
        assert_eq!(bus.nametable[1], 0xBB);
        assert_eq!(ppu.vram_addr(), 0x2021);
    }

    #[test]
    fn oam_data_port() {
        let (mut ppu, mut bus) = setup();
        ppu.write_register(&mut bus, OAMADDR, 0xFF).unwrap();
        ppu.write_register(&mut bus, OAMDATA, 0x12).unwrap();
        ppu.write_register(&mut bus, OAMDATA, 0x34).unwrap();
        assert_eq!(ppu.oam()[0xFF], 0x12);
        assert_eq!(ppu.oam()[0x00], 0x34);
        assert_eq!(ppu.oam_addr(), 0x01);

        ppu.write_register(&mut bus, OAMADDR, 0xFF).unwrap();
        assert_eq!(ppu.read_register(&mut bus, OAMDATA), Ok(0x12));
        // Reads do not advance OAMADDR.
        assert_eq!(ppu.oam_addr(), 0xFF);
    }

    #[test]
    fn dma_port_records_request() {
        let (mut ppu, mut bus) = setup();
        ppu.write_register(&mut bus, OAMDMA, 0x02).unwrap();
        assert_eq!(ppu.take_dma_request(), Some(0x02));
    }

    #[test]
    fn attach_claims_register_window() {
        let mut mapper = Nrom::new(vec![0; 0x8000], Vec::new(), true, 0, Mirroring::Vertical);
        Ppu::attach(&mut mapper);
        let table = mapper.interceptors();
        for reg in [PPUSTATUS, OAMDATA, PPUDATA] {
            assert!(table.read_handler(reg).is_some());
        }
        assert!(table.read_handler(PPUCTRL).is_none());
        for reg in PPUCTRL..=PPUDATA {
            assert!(table.write_handler(reg).is_some());
        }
        assert!(table.write_handler(OAMDMA).is_some());
    }
}
