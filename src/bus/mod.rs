#![doc = r#"
CPU memory bus.

Routes every CPU access to the device that owns the address and owns those
devices: work RAM, the PPU with its video RAM, the cartridge mapper and the
two controller ports.

Address map (CPU)
- $0000-$1FFF: 2 KiB work RAM, mirrored every $0800
- $2000-$3FFF: PPU registers, mirrored every 8 bytes
- $4014: OAM DMA
- $4016: controller 1 serial read / strobe to both pads
- $4017: controller 2 serial read (writes belong to the APU and are dropped)
- $4000-$401F otherwise: APU and test registers, read 0, writes dropped
- $4020-$FFFF: cartridge window (mapper)

PPU registers
- The bus folds a register address onto `$2000 | (addr & 7)` and asks the
  mapper's interceptor table for a handler. A handler receives the PPU and a
  `PpuMemory` view borrowed from the mapper and video RAM, so register
  accesses such as PPUDATA reach the PPU address space without aliasing the
  bus.
- With no handler, the access falls through to the mapper.

OAM DMA
- A $4014 write records the source page in the PPU; the bus then copies 256
  bytes from CPU-visible memory into OAM starting at OAMADDR (wrapping) and
  raises `take_dma_started` so the orchestrator can stall the CPU.
"#]

pub mod ram;


use crate::cartridge::Cartridge;
use crate::config::{AccessPolicy, NesConfig};
use crate::controller::Controller;
use crate::cpu::CpuBus;
use crate::error::{ConfigError, MemoryError};
use crate::mapper::Mapper;
use crate::ppu::Ppu;
use crate::ppu::registers::OAMDMA;
use crate::ppu_bus::{PpuMemory, Vram};

pub use ram::Ram;

pub struct Bus {
    ram: Ram,
    ppu: Ppu,
    vram: Vram,
    mapper: Box<dyn Mapper>,
    controllers: [Controller; 2],
    policy: AccessPolicy,
    dma_started: bool,
}

impl Bus {
    /// Wire a mapper to a fresh PPU. The PPU claims its register window on
    /// the mapper here.
    pub fn new(mut mapper: Box<dyn Mapper>, policy: AccessPolicy) -> Self {
        Ppu::attach(mapper.as_mut());
        Self {
            ram: Ram::new(),
            ppu: Ppu::new(),
            vram: Vram::new(),
            mapper,
            controllers: [Controller::new(), Controller::new()],
            policy,
            dma_started: false,
        }
    }

    pub fn from_cartridge(cart: Cartridge, config: &NesConfig) -> Result<Self, ConfigError> {
        let mapper = cart.into_mapper(config)?;
        Ok(Self::new(mapper, config.access_policy))
    }

    /// Clear RAM, PPU state and video RAM. Controllers keep their buttons,
    /// mapper storage is kept and its bank registers are reset.
    pub fn reset(&mut self) {
        self.ram.clear();
        self.ppu.reset();
        self.vram.reset();
        self.mapper.reset();
        for c in &mut self.controllers {
            c.reset();
        }
        self.dma_started = false;
    }

    // -----------------------------
    // CPU-visible memory interface
    // -----------------------------

    pub fn read(&mut self, addr: u16) -> Result<u8, MemoryError> {
        match addr {
            0x0000..=0x1FFF => Ok(self.ram.read(addr)),
            0x2000..=0x3FFF => self.register_read(0x2000 | (addr & 0x0007)),
            0x4016 => Ok(self.controllers[0].read()),
            0x4017 => Ok(self.controllers[1].read()),
            0x4000..=0x401F => Ok(0),
            _ => self.policy.filter(self.mapper.read(addr), 0),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        match addr {
            0x0000..=0x1FFF => {
                self.ram.write(addr, value);
                Ok(())
            }
            0x2000..=0x3FFF => self.register_write(0x2000 | (addr & 0x0007), value),
            OAMDMA => {
                self.register_write(OAMDMA, value)?;
                match self.ppu.take_dma_request() {
                    Some(page) => self.oam_dma(page),
                    None => Ok(()),
                }
            }
            0x4016 => {
                for c in &mut self.controllers {
                    c.signal(value);
                }
                Ok(())
            }
            0x4000..=0x401F => Ok(()),
            _ => self.policy.filter(self.mapper.write(addr, value), ()),
        }
    }

    /// Little-endian word at `addr`, `addr + 1`.
    pub fn read_word(&mut self, addr: u16) -> Result<u16, MemoryError> {
        let lo = self.read(addr)? as u16;
        let hi = self.read(addr.wrapping_add(1))? as u16;
        Ok((hi << 8) | lo)
    }

    fn register_read(&mut self, reg: u16) -> Result<u8, MemoryError> {
        match self.mapper.interceptors().read_handler(reg) {
            Some(handler) => {
                let mut mem = PpuMemory::new(&mut *self.mapper, &mut self.vram, self.policy);
                handler(&mut self.ppu, &mut mem, reg)
            }
            None => self.policy.filter(self.mapper.read(reg), 0),
        }
    }

    fn register_write(&mut self, reg: u16, value: u8) -> Result<(), MemoryError> {
        match self.mapper.interceptors().write_handler(reg) {
            Some(handler) => {
                let mut mem = PpuMemory::new(&mut *self.mapper, &mut self.vram, self.policy);
                handler(&mut self.ppu, &mut mem, reg, value)
            }
            None => self.policy.filter(self.mapper.write(reg, value), ()),
        }
    }

    /// Copy page `page` of CPU-visible memory into OAM starting at OAMADDR.
    fn oam_dma(&mut self, page: u8) -> Result<(), MemoryError> {
        let mut oam = *self.ppu.oam();
        let cursor = self.ppu.oam_addr();
        let base = (page as u16) << 8;
        if let Some(src) = self.ram.page(page) {
            for (i, &b) in src.iter().enumerate() {
                oam[cursor.wrapping_add(i as u8) as usize] = b;
            }
        } else {
            for i in 0..=255u8 {
                oam[cursor.wrapping_add(i) as usize] = self.read(base | i as u16)?;
            }
        }
        self.ppu.load_oam(oam);
        self.dma_started = true;
        log::trace!("OAM DMA from ${base:04X} at OAMADDR ${cursor:02X}");
        Ok(())
    }

    /// True once after a DMA transfer completed on this bus.
    pub fn take_dma_started(&mut self) -> bool {
        std::mem::take(&mut self.dma_started)
    }

    // -----------------------------
    // Time and signals
    // -----------------------------

    /// Advance the PPU by `dots` dots.
    pub fn tick_ppu(&mut self, dots: u64) -> Result<(), MemoryError> {
        let mut mem = PpuMemory::new(&mut *self.mapper, &mut self.vram, self.policy);
        for _ in 0..dots {
            self.ppu.tick(&mut mem)?;
        }
        Ok(())
    }

    /// Level of the cartridge IRQ line.
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    // -----------------------------
    // Accessors
    // -----------------------------

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn controller_mut(&mut self, idx: usize) -> Option<&mut Controller> {
        self.controllers.get_mut(idx)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.policy
    }
}

impl CpuBus for Bus {
    #[inline]
    fn read(&mut self, addr: u16) -> Result<u8, MemoryError> {
        Bus::read(self, addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        Bus::write(self, addr, value)
    }
}
