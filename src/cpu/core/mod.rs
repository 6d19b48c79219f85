/*!
core::Cpu - the CPU facade: reset, interrupt inputs and the tick loop.

`tick` runs one instruction:

1. A pending NMI is serviced first (push PC and status, set I, jump through
   $FFFA) and costs 7 cycles. Otherwise, if the IRQ line is high and I is
   clear, the IRQ is serviced the same way through $FFFE.
2. The opcode at PC is decoded through the descriptor table; an empty slot is
   a `ConfigError::UnknownOpcode`.
3. The operation runs, PC advances by the descriptor length (unless the
   operation moved PC itself), and the base cost plus any page or branch
   penalty is added to the cycle counter and returned.

The NMI input is edge-latched: `trigger_nmi` sets a request that the next
`tick` consumes. The IRQ input is a level that stays asserted until the
source (the mapper) drops it.
*/

use crate::cpu::addressing::read_word;
use crate::cpu::execute::{Outcome, execute, interrupt};
use crate::cpu::state::{CpuState, RESET_CYCLES, RESET_SP, Status};
use crate::cpu::table::decode;
use crate::cpu::{CpuBus, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
use crate::error::{ConfigError, MemoryError, NesError};

/// Cycles taken by interrupt entry.
const INTERRUPT_CYCLES: u32 = 7;

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    state: CpuState,
    nmi_pending: bool,
    irq_line: bool,
}

impl Cpu {
    /// CPU with power-up register defaults. Call `reset` before ticking.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// Reset: SP $FD, status $24, A/X/Y cleared, cycle counter 7, pending
    /// interrupts dropped. PC comes from `entry_point` when given, else from
    /// the vector at $FFFC.
    pub fn reset<B: CpuBus + ?Sized>(
        &mut self,
        bus: &mut B,
        entry_point: Option<u16>,
    ) -> Result<(), MemoryError> {
        let pc = match entry_point {
            Some(pc) => pc,
            None => read_word(bus, RESET_VECTOR)?,
        };
        self.state = CpuState {
            pc,
            sp: RESET_SP,
            cycles: RESET_CYCLES,
            ..CpuState::new()
        };
        self.nmi_pending = false;
        self.irq_line = false;
        log::debug!("cpu reset: PC=${pc:04X}");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Interrupt inputs
    // ---------------------------------------------------------------------

    /// Latch an NMI request; the next `tick` services it.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Drive the maskable IRQ input.
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Execute one instruction. Returns the cycles consumed, interrupt entry
    /// included.
    pub fn tick<B: CpuBus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, NesError> {
        let mut cycles = 0;

        if self.nmi_pending {
            self.nmi_pending = false;
            let pc = self.state.pc;
            interrupt(&mut self.state, bus, pc, NMI_VECTOR, false)?;
            log::trace!("NMI: ${pc:04X} -> ${:04X}", self.state.pc);
            cycles += INTERRUPT_CYCLES;
        } else if self.irq_line && !self.state.status.irq_disable {
            let pc = self.state.pc;
            interrupt(&mut self.state, bus, pc, IRQ_VECTOR, false)?;
            log::trace!("IRQ: ${pc:04X} -> ${:04X}", self.state.pc);
            cycles += INTERRUPT_CYCLES;
        }

        let pc = self.state.pc;
        let opcode = bus.read(pc)?;
        let ins = decode(opcode).ok_or(ConfigError::UnknownOpcode { opcode, pc })?;

        log::trace!(
            "{pc:04X}  {opcode:02X}  {:?} {:<12} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            ins.op,
            ins.mode.name(),
            self.state.a,
            self.state.x,
            self.state.y,
            self.state.status_byte(),
            self.state.sp,
            self.state.cycles,
        );

        let Outcome {
            extra_cycles,
            jumped,
        } = execute(&mut self.state, bus, ins)?;
        if ins.len != 0 && !jumped {
            self.state.pc = pc.wrapping_add(ins.len as u16);
        }

        cycles += ins.cycles as u32 + extra_cycles;
        self.state.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Account for cycles the CPU spent halted (OAM DMA).
    pub fn stall(&mut self, cycles: u32) {
        self.state.cycles += cycles as u64;
    }

    /// Execute `n` instructions; returns the total cycles.
    pub fn tick_n<B: CpuBus + ?Sized>(&mut self, bus: &mut B, n: usize) -> Result<u64, NesError> {
        let mut total = 0u64;
        for _ in 0..n {
            total += self.tick(bus)? as u64;
        }
        Ok(total)
    }

    // ---------------------------------------------------------------------
    // Register accessors
    // ---------------------------------------------------------------------

    /// Accumulator.
    pub fn a(&self) -> u8 {
        self.state.a
    }

    /// X index register.
    pub fn x(&self) -> u8 {
        self.state.x
    }

    /// Y index register.
    pub fn y(&self) -> u8 {
        self.state.y
    }

    /// Stack pointer (offset into page $01).
    pub fn sp(&self) -> u8 {
        self.state.sp
    }

    /// Address of the next opcode to fetch.
    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    /// Processor flags.
    pub fn status(&self) -> Status {
        self.state.status
    }

    /// Status byte (bit 5 set, B clear).
    pub fn status_byte(&self) -> u8 {
        self.state.status_byte()
    }

    /// Total cycles since power-on, starting at 7.
    pub fn cycles(&self) -> u64 {
        self.state.cycles
    }

    /// Move the program counter without executing anything.
    pub fn set_pc(&mut self, v: u16) {
        self.state.pc = v;
    }
}
