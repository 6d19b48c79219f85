#![doc = r#"
nescore library crate.

Cycle-level emulation core for a cartridge-based 8-bit console: a 6502-class
CPU, the picture processing unit and the common cartridge mappers, wired
together by the `Nes` orchestrator.

Modules:
- error: error taxonomy (`MemoryError`, `ConfigError`, `NesError`)
- config: runtime knobs (`NesConfig`, `AccessPolicy`)
- mapper: Mapper trait, mirroring modes, register interceptors and NROM
- mappers: UxROM, CNROM, MMC1 and MMC3
- cartridge: iNES v1 loader; constructs a Mapper
- controller: standard 8-button pad
- bus: CPU memory bus (work RAM, PPU registers, controllers, cartridge)
- ppu_bus: PPU memory bus (pattern tables, nametables, palette)
- ppu: per-dot PPU state machine
- cpu: CPU core (state, addressing, descriptor table, execute, facade)
- nes: orchestrator (1:3 clock ratio, NMI/IRQ hand-off, DMA stall)
- screenshot: PNG frame dumps (feature `screenshot`)

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mapper;
pub mod mappers;
pub mod nes;
pub mod ppu;
pub mod ppu_bus;
#[cfg(feature = "screenshot")]
pub mod screenshot;

// Re-export commonly used types at the crate root for convenience.
pub use bus::Bus;
pub use cartridge::Cartridge;
pub use config::{AccessPolicy, NesConfig};
pub use controller::{Button, Controller};
pub use cpu::Cpu;
pub use error::{ConfigError, MemoryError, NesError};
pub use mapper::{Mapper, Mirroring};
pub use nes::Nes;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
