/*!
addressing.rs - addressing modes and effective-address resolution.

Resolution reads the operand bytes that follow the opcode (PC still points at
the opcode while an instruction executes) and never moves PC itself.

Quirks kept on purpose:
- Zero-page indexing wraps within the first 256 bytes.
- `(zp,X)` and `(zp),Y` read their pointer with page wrap: a pointer at $FF
  takes its high byte from $00.
- JMP `($xxFF)` takes the high byte of the target from `$xx00`.
- Indexed absolute modes wrap past $FFFF, so a base of $FFFF plus an index
  `n` lands on `n - 1`.

Page crossing is reported alongside the address; the caller decides whether
the opcode pays a cycle for it.
*/

use crate::cpu::CpuBus;
use crate::cpu::state::CpuState;
use crate::error::{ConfigError, MemoryError, NesError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
}

impl AddressingMode {
    pub fn name(self) -> &'static str {
        match self {
            AddressingMode::Implied => "implied",
            AddressingMode::Accumulator => "accumulator",
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zero page",
            AddressingMode::ZeroPageX => "zero page,X",
            AddressingMode::ZeroPageY => "zero page,Y",
            AddressingMode::Relative => "relative",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute,X",
            AddressingMode::AbsoluteY => "absolute,Y",
            AddressingMode::Indirect => "indirect",
            AddressingMode::IndexedIndirect => "(indirect,X)",
            AddressingMode::IndirectIndexed => "(indirect),Y",
        }
    }
}

/// An effective address and whether indexing crossed a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub addr: u16,
    pub crossed: bool,
}

impl Resolved {
    #[inline]
    fn flat(addr: u16) -> Self {
        Self {
            addr,
            crossed: false,
        }
    }

    #[inline]
    fn indexed(base: u16, index: u8) -> Self {
        let addr = base.wrapping_add(index as u16);
        Self {
            addr,
            crossed: page_crossed(base, addr),
        }
    }
}

#[inline]
pub(crate) fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

// -------------------------
// Operand fetch
// -------------------------

/// Byte following the opcode.
#[inline]
pub(crate) fn operand_byte<B: CpuBus + ?Sized>(
    cpu: &CpuState,
    bus: &mut B,
) -> Result<u8, MemoryError> {
    bus.read(cpu.pc.wrapping_add(1))
}

/// Little-endian word following the opcode.
#[inline]
pub(crate) fn operand_word<B: CpuBus + ?Sized>(
    cpu: &CpuState,
    bus: &mut B,
) -> Result<u16, MemoryError> {
    read_word(bus, cpu.pc.wrapping_add(1))
}

/// Plain little-endian word read.
#[inline]
pub(crate) fn read_word<B: CpuBus + ?Sized>(bus: &mut B, addr: u16) -> Result<u16, MemoryError> {
    let lo = bus.read(addr)? as u16;
    let hi = bus.read(addr.wrapping_add(1))? as u16;
    Ok((hi << 8) | lo)
}

/// Word read whose high byte stays on the same page as `addr`.
#[inline]
pub(crate) fn read_word_page_wrapped<B: CpuBus + ?Sized>(
    bus: &mut B,
    addr: u16,
) -> Result<u16, MemoryError> {
    let lo = bus.read(addr)? as u16;
    let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let hi = bus.read(hi_addr)? as u16;
    Ok((hi << 8) | lo)
}

// -------------------------
// Resolution
// -------------------------

/// Effective address for `mode`. Implied, accumulator and immediate have
/// none and are rejected.
pub(crate) fn resolve<B: CpuBus + ?Sized>(
    cpu: &CpuState,
    bus: &mut B,
    mode: AddressingMode,
) -> Result<Resolved, NesError> {
    let r = match mode {
        AddressingMode::ZeroPage => Resolved::flat(operand_byte(cpu, bus)? as u16),
        AddressingMode::ZeroPageX => {
            Resolved::flat(operand_byte(cpu, bus)?.wrapping_add(cpu.x) as u16)
        }
        AddressingMode::ZeroPageY => {
            Resolved::flat(operand_byte(cpu, bus)?.wrapping_add(cpu.y) as u16)
        }
        AddressingMode::Absolute => Resolved::flat(operand_word(cpu, bus)?),
        AddressingMode::AbsoluteX => Resolved::indexed(operand_word(cpu, bus)?, cpu.x),
        AddressingMode::AbsoluteY => Resolved::indexed(operand_word(cpu, bus)?, cpu.y),
        AddressingMode::Relative => {
            let offset = operand_byte(cpu, bus)? as i8;
            let next = cpu.pc.wrapping_add(2);
            let target = next.wrapping_add_signed(offset as i16);
            Resolved {
                addr: target,
                crossed: page_crossed(next, target),
            }
        }
        AddressingMode::Indirect => {
            let ptr = operand_word(cpu, bus)?;
            Resolved::flat(read_word_page_wrapped(bus, ptr)?)
        }
        AddressingMode::IndexedIndirect => {
            let zp = operand_byte(cpu, bus)?.wrapping_add(cpu.x);
            Resolved::flat(read_word_page_wrapped(bus, zp as u16)?)
        }
        AddressingMode::IndirectIndexed => {
            let zp = operand_byte(cpu, bus)?;
            let base = read_word_page_wrapped(bus, zp as u16)?;
            Resolved::indexed(base, cpu.y)
        }
        AddressingMode::Implied | AddressingMode::Accumulator | AddressingMode::Immediate => {
            return Err(ConfigError::UnresolvableMode(mode.name()).into());
        }
    };
    Ok(r)
}

/// Operand value: the immediate byte or the byte at the effective address.
pub(crate) fn read_operand<B: CpuBus + ?Sized>(
    cpu: &CpuState,
    bus: &mut B,
    mode: AddressingMode,
) -> Result<(u8, bool), NesError> {
    if mode == AddressingMode::Immediate {
        return Ok((operand_byte(cpu, bus)?, false));
    }
    let r = resolve(cpu, bus, mode)?;
    Ok((bus.read(r.addr)?, r.crossed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::tests::TestMemory;

    fn setup(program: &[u8]) -> (CpuState, TestMemory) {
        let mem = TestMemory::with_program(0x0400, program);
        let cpu = CpuState {
            pc: 0x0400,
            ..CpuState::new()
        };
        (cpu, mem)
    }

    #[test]
    fn zero_page_indexing_wraps() {
        let (mut cpu, mut mem) = setup(&[0xB5, 0xF0]);
        cpu.x = 0x20;
        let r = resolve(&cpu, &mut mem, AddressingMode::ZeroPageX).unwrap();
        assert_eq!(r.addr, 0x0010);
        assert!(!r.crossed);
    }

    #[test]
    fn absolute_indexed_page_cross() {
        let (mut cpu, mut mem) = setup(&[0xB9, 0xFF, 0x00]);
        cpu.y = 1;
        let r = resolve(&cpu, &mut mem, AddressingMode::AbsoluteY).unwrap();
        assert_eq!(r, Resolved { addr: 0x0100, crossed: true });

        cpu.y = 0;
        let r = resolve(&cpu, &mut mem, AddressingMode::AbsoluteY).unwrap();
        assert_eq!(r, Resolved { addr: 0x00FF, crossed: false });
    }

    #[test]
    fn top_of_space_base_lands_on_index_minus_one() {
        let (mut cpu, mut mem) = setup(&[0xBD, 0xFF, 0xFF]);
        cpu.x = 0x05;
        let r = resolve(&cpu, &mut mem, AddressingMode::AbsoluteX).unwrap();
        assert_eq!(r.addr, 0x0004);
        assert!(r.crossed);

        cpu.x = 0;
        let r = resolve(&cpu, &mut mem, AddressingMode::AbsoluteX).unwrap();
        assert_eq!(r.addr, 0xFFFF);
    }

    #[test]
    fn indirect_jump_page_bug() {
        let (cpu, mut mem) = setup(&[0x6C, 0xFF, 0x02]);
        mem.data[0x02FF] = 0x34;
        mem.data[0x0200] = 0x12;
        mem.data[0x0300] = 0x99;
        let r = resolve(&cpu, &mut mem, AddressingMode::Indirect).unwrap();
        assert_eq!(r.addr, 0x1234);
    }

    #[test]
    fn indexed_indirect_wraps_pointer_in_zero_page() {
        let (mut cpu, mut mem) = setup(&[0xA1, 0xFE]);
        cpu.x = 1;
        mem.data[0x00FF] = 0x00;
        mem.data[0x0000] = 0x06;
        let r = resolve(&cpu, &mut mem, AddressingMode::IndexedIndirect).unwrap();
        assert_eq!(r.addr, 0x0600);
    }

    #[test]
    fn indirect_indexed_adds_y_after_dereference() {
        let (mut cpu, mut mem) = setup(&[0xB1, 0x10]);
        cpu.y = 0x10;
        mem.set_word(0x0010, 0x06F8);
        let r = resolve(&cpu, &mut mem, AddressingMode::IndirectIndexed).unwrap();
        assert_eq!(r, Resolved { addr: 0x0708, crossed: true });
    }

    #[test]
    fn relative_measures_cross_from_next_instruction() {
        // Branch at $04FD: next instruction at $04FF, +1 lands on $0500.
        let mut mem = TestMemory::new();
        mem.load(0x04FD, &[0x90, 0x01]);
        let cpu = CpuState {
            pc: 0x04FD,
            ..CpuState::new()
        };
        let r = resolve(&cpu, &mut mem, AddressingMode::Relative).unwrap();
        assert_eq!(r, Resolved { addr: 0x0500, crossed: true });

        // Backwards: -3 from $0402 is $03FF.
        let (cpu, mut mem) = setup(&[0xD0, 0xFD]);
        let r = resolve(&cpu, &mut mem, AddressingMode::Relative).unwrap();
        assert_eq!(r, Resolved { addr: 0x03FF, crossed: true });
    }

    #[test]
    fn modes_without_address_are_rejected() {
        let (cpu, mut mem) = setup(&[0xA9, 0x01]);
        for mode in [
            AddressingMode::Immediate,
            AddressingMode::Implied,
            AddressingMode::Accumulator,
        ] {
            assert!(matches!(
                resolve(&cpu, &mut mem, mode),
                Err(NesError::Config(ConfigError::UnresolvableMode(_)))
            ));
        }
        assert_eq!(
            read_operand(&cpu, &mut mem, AddressingMode::Immediate).unwrap(),
            (0x01, false)
        );
    }
}
