#![doc = r#"
Console orchestrator.

`Nes` owns the CPU and the bus (which in turn owns the PPU, video RAM, the
mapper and the controllers) and keeps them in lockstep:

- One `step` runs one CPU instruction, or one cycle of a pending DMA stall,
  then advances the PPU three dots per CPU cycle consumed.
- After the PPU has caught up, a raised NMI is handed to the CPU (the PPU's
  signal is cleared on hand-off) and the mapper IRQ level is copied onto the
  CPU's IRQ input.
- A write to $4014 stalls the CPU for 513 cycles, 514 when the writing
  instruction began on an odd cycle count. The PPU keeps running.

Everything is single-threaded; `run_frame` steps until the PPU reports a
completed frame.
"#]

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::config::NesConfig;
use crate::controller::Controller;
use crate::cpu::Cpu;
use crate::error::NesError;

/// PPU dots per CPU cycle.
pub const DOTS_PER_CPU_CYCLE: u64 = 3;
/// Base CPU stall for an OAM DMA transfer.
pub const DMA_STALL_CYCLES: u32 = 513;

pub struct Nes {
    cpu: Cpu,
    bus: Bus,
    config: NesConfig,
    stall: u32,
}

impl Nes {
    /// Build the console around `cart` and power it on.
    pub fn new(cart: Cartridge, config: NesConfig) -> Result<Self, NesError> {
        let bus = Bus::from_cartridge(cart, &config)?;
        let mut nes = Self {
            cpu: Cpu::new(),
            bus,
            config,
            stall: 0,
        };
        nes.power_on()?;
        Ok(nes)
    }

    /// Power-on and reset share one sequence: RAM, PPU and video RAM are
    /// cleared, mapper banking is reset and the CPU reloads PC.
    pub fn power_on(&mut self) -> Result<(), NesError> {
        self.restart()?;
        log::info!("power on: PC=${:04X}", self.cpu.pc());
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), NesError> {
        self.restart()?;
        log::info!("reset: PC=${:04X}", self.cpu.pc());
        Ok(())
    }

    fn restart(&mut self) -> Result<(), NesError> {
        self.bus.reset();
        self.cpu.reset(&mut self.bus, self.config.entry_point)?;
        self.stall = 0;
        Ok(())
    }

    /// Run one instruction (or one stalled cycle) and the matching PPU dots.
    /// Returns true when a frame completed during this step.
    pub fn step(&mut self) -> Result<bool, NesError> {
        let cycles = if self.stall > 0 {
            self.stall -= 1;
            self.cpu.stall(1);
            1
        } else {
            let start = self.cpu.cycles();
            let cycles = self.cpu.tick(&mut self.bus)?;
            if self.bus.take_dma_started() {
                self.stall = DMA_STALL_CYCLES + (start & 1) as u32;
                log::trace!("DMA stall of {} cycles", self.stall);
            }
            cycles
        };

        self.bus.tick_ppu(cycles as u64 * DOTS_PER_CPU_CYCLE)?;

        if self.bus.ppu_mut().take_nmi() {
            self.cpu.trigger_nmi();
        }
        self.cpu.set_irq_line(self.bus.irq_pending());

        Ok(self.bus.ppu_mut().take_frame_ready())
    }

    /// Step until a frame completes. Returns the CPU cycles spent.
    pub fn run_frame(&mut self) -> Result<u64, NesError> {
        let start = self.cpu.cycles();
        while !self.step()? {}
        Ok(self.cpu.cycles() - start)
    }

    /// Palette-index frame buffer (256 x 240).
    pub fn frame(&self) -> &[u8] {
        self.bus.ppu().frame()
    }

    pub fn controller_mut(&mut self, idx: usize) -> Option<&mut Controller> {
        self.bus.controller_mut(idx)
    }

    /// CPU cycles still owed to a DMA transfer.
    pub fn stall_remaining(&self) -> u32 {
        self.stall
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}
