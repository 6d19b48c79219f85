/*!
cpu - the 6502-class CPU core.

Layout:

```text
state.rs       - Registers, decomposed status flags, cycle counter.
addressing.rs  - Addressing modes and effective-address resolution.
table.rs       - Static 256-entry opcode descriptor table.
execute.rs     - Operation semantics (ALU, transfers, stack, branches).
core/          - The `Cpu` facade: reset, interrupts, `tick`.
```

One call to `Cpu::tick` runs exactly one instruction (after servicing a
pending interrupt) and returns the cycles it consumed. Memory is reached only
through the `CpuBus` trait, so the core runs against the real `Bus` or a flat
test memory alike.

```ignore
let mut cpu = Cpu::new();
cpu.reset(&mut bus, None)?;
let cycles = cpu.tick(&mut bus)?;
```
*/

pub mod addressing;
pub mod core;
pub mod execute;
pub mod state;
pub mod table;

use crate::error::MemoryError;

pub use crate::cpu::addressing::AddressingMode;
pub use crate::cpu::core::Cpu;
pub use crate::cpu::state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, Status, UNUSED, ZERO,
};
pub use crate::cpu::table::{Instruction, Operation};

/// CPU-visible address space as seen by the core.
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> Result<u8, MemoryError>;
    fn write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError>;
}

/// Fixed vectors in high memory.
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Base of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;
