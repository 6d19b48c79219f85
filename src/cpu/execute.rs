/*!
execute.rs - operation semantics.

`execute` runs one decoded instruction against `CpuState` and a `CpuBus`.
PC still points at the opcode on entry; the caller advances it by the
descriptor length afterwards unless the operation reports that it moved PC
itself.

Each operation updates exactly the flags the 6502 reference lists for it.
The undocumented composites run their two halves back to back on the same
resolved operand (DCP is DEC then CMP, ISB is INC then SBC, and so on), so
the second half sees every flag the first half left behind.
*/

use crate::cpu::addressing::{AddressingMode, operand_word, read_operand, read_word, resolve};
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::{Instruction, Operation};
use crate::cpu::{CpuBus, IRQ_VECTOR, STACK_BASE};
use crate::error::{MemoryError, NesError};

/// What an executed instruction reports back to the tick loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    /// Cycles beyond the descriptor's base cost.
    pub extra_cycles: u32,
    /// PC was set by the operation; do not advance by length.
    pub jumped: bool,
}

impl Outcome {
    fn page(ins: &Instruction, crossed: bool) -> Self {
        Self {
            extra_cycles: (ins.page_penalty && crossed) as u32,
            jumped: false,
        }
    }
}

pub(crate) fn execute<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
    ins: &Instruction,
) -> Result<Outcome, NesError> {
    let mode = ins.mode;
    let outcome = match ins.op {
        // ---------------- Loads, stores, transfers ----------------
        Operation::Lda => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            lda(cpu, v);
            Outcome::page(ins, crossed)
        }
        Operation::Ldx => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            cpu.x = v;
            cpu.status.update_zn(v);
            Outcome::page(ins, crossed)
        }
        Operation::Ldy => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            cpu.y = v;
            cpu.status.update_zn(v);
            Outcome::page(ins, crossed)
        }
        Operation::Lax => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            lda(cpu, v);
            tax(cpu);
            Outcome::page(ins, crossed)
        }
        Operation::Sta => store(cpu, bus, mode, cpu.a)?,
        Operation::Stx => store(cpu, bus, mode, cpu.x)?,
        Operation::Sty => store(cpu, bus, mode, cpu.y)?,
        Operation::Sax => store(cpu, bus, mode, cpu.a & cpu.x)?,
        Operation::Tax => {
            tax(cpu);
            Outcome::default()
        }
        Operation::Tay => {
            cpu.y = cpu.a;
            cpu.status.update_zn(cpu.y);
            Outcome::default()
        }
        Operation::Txa => {
            cpu.a = cpu.x;
            cpu.status.update_zn(cpu.a);
            Outcome::default()
        }
        Operation::Tya => {
            cpu.a = cpu.y;
            cpu.status.update_zn(cpu.a);
            Outcome::default()
        }
        Operation::Tsx => {
            cpu.x = cpu.sp;
            cpu.status.update_zn(cpu.x);
            Outcome::default()
        }
        Operation::Txs => {
            cpu.sp = cpu.x;
            Outcome::default()
        }

        // ---------------- ALU ----------------
        Operation::Adc => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            adc(cpu, v);
            Outcome::page(ins, crossed)
        }
        Operation::Sbc => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            sbc(cpu, v);
            Outcome::page(ins, crossed)
        }
        Operation::And => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            and(cpu, v);
            Outcome::page(ins, crossed)
        }
        Operation::Ora => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            ora(cpu, v);
            Outcome::page(ins, crossed)
        }
        Operation::Eor => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            eor(cpu, v);
            Outcome::page(ins, crossed)
        }
        Operation::Cmp => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            let a = cpu.a;
            compare(cpu, a, v);
            Outcome::page(ins, crossed)
        }
        Operation::Cpx => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            let x = cpu.x;
            compare(cpu, x, v);
            Outcome::page(ins, crossed)
        }
        Operation::Cpy => {
            let (v, crossed) = read_operand(cpu, bus, mode)?;
            let y = cpu.y;
            compare(cpu, y, v);
            Outcome::page(ins, crossed)
        }
        Operation::Bit => {
            let (v, _) = read_operand(cpu, bus, mode)?;
            cpu.status.zero = cpu.a & v == 0;
            cpu.status.negative = v & 0x80 != 0;
            cpu.status.overflow = v & 0x40 != 0;
            Outcome::default()
        }

        // ---------------- Increments ----------------
        Operation::Inx => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.status.update_zn(cpu.x);
            Outcome::default()
        }
        Operation::Iny => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.status.update_zn(cpu.y);
            Outcome::default()
        }
        Operation::Dex => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.status.update_zn(cpu.x);
            Outcome::default()
        }
        Operation::Dey => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.status.update_zn(cpu.y);
            Outcome::default()
        }
        Operation::Inc => {
            modify(cpu, bus, mode, inc)?;
            Outcome::default()
        }
        Operation::Dec => {
            modify(cpu, bus, mode, dec)?;
            Outcome::default()
        }

        // ---------------- Shifts and rotates ----------------
        Operation::Asl => {
            modify(cpu, bus, mode, asl)?;
            Outcome::default()
        }
        Operation::Lsr => {
            modify(cpu, bus, mode, lsr)?;
            Outcome::default()
        }
        Operation::Rol => {
            modify(cpu, bus, mode, rol)?;
            Outcome::default()
        }
        Operation::Ror => {
            modify(cpu, bus, mode, ror)?;
            Outcome::default()
        }

        // ---------------- Composites ----------------
        Operation::Slo => {
            let v = modify(cpu, bus, mode, asl)?;
            ora(cpu, v);
            Outcome::default()
        }
        Operation::Rla => {
            let v = modify(cpu, bus, mode, rol)?;
            and(cpu, v);
            Outcome::default()
        }
        Operation::Sre => {
            let v = modify(cpu, bus, mode, lsr)?;
            eor(cpu, v);
            Outcome::default()
        }
        Operation::Rra => {
            let v = modify(cpu, bus, mode, ror)?;
            adc(cpu, v);
            Outcome::default()
        }
        Operation::Dcp => {
            let v = modify(cpu, bus, mode, dec)?;
            let a = cpu.a;
            compare(cpu, a, v);
            Outcome::default()
        }
        Operation::Isb => {
            let v = modify(cpu, bus, mode, inc)?;
            sbc(cpu, v);
            Outcome::default()
        }

        // ---------------- Flags ----------------
        Operation::Clc => flag(|s| s.carry = false, cpu),
        Operation::Sec => flag(|s| s.carry = true, cpu),
        Operation::Cli => flag(|s| s.irq_disable = false, cpu),
        Operation::Sei => flag(|s| s.irq_disable = true, cpu),
        Operation::Cld => flag(|s| s.decimal = false, cpu),
        Operation::Sed => flag(|s| s.decimal = true, cpu),
        Operation::Clv => flag(|s| s.overflow = false, cpu),

        // ---------------- Stack ----------------
        Operation::Pha => {
            let a = cpu.a;
            push(cpu, bus, a)?;
            Outcome::default()
        }
        Operation::Pla => {
            let v = pop(cpu, bus)?;
            lda(cpu, v);
            Outcome::default()
        }
        Operation::Php => {
            let p = cpu.status.to_byte(true);
            push(cpu, bus, p)?;
            Outcome::default()
        }
        Operation::Plp => {
            let v = pop(cpu, bus)?;
            cpu.set_status_byte(v);
            Outcome::default()
        }

        // ---------------- Branches ----------------
        Operation::Bcc => branch(cpu, bus, |s| !s.carry)?,
        Operation::Bcs => branch(cpu, bus, |s| s.carry)?,
        Operation::Bne => branch(cpu, bus, |s| !s.zero)?,
        Operation::Beq => branch(cpu, bus, |s| s.zero)?,
        Operation::Bpl => branch(cpu, bus, |s| !s.negative)?,
        Operation::Bmi => branch(cpu, bus, |s| s.negative)?,
        Operation::Bvc => branch(cpu, bus, |s| !s.overflow)?,
        Operation::Bvs => branch(cpu, bus, |s| s.overflow)?,

        // ---------------- Control flow ----------------
        Operation::Jmp => {
            cpu.pc = resolve(cpu, bus, mode)?.addr;
            jumped()
        }
        Operation::Jsr => {
            let target = operand_word(cpu, bus)?;
            let ret = cpu.pc.wrapping_add(2);
            push_word(cpu, bus, ret)?;
            cpu.pc = target;
            jumped()
        }
        Operation::Rts => {
            cpu.pc = pop_word(cpu, bus)?.wrapping_add(1);
            jumped()
        }
        Operation::Rti => {
            let v = pop(cpu, bus)?;
            cpu.set_status_byte(v);
            cpu.pc = pop_word(cpu, bus)?;
            jumped()
        }
        Operation::Brk => {
            let ret = cpu.pc.wrapping_add(2);
            interrupt(cpu, bus, ret, IRQ_VECTOR, true)?;
            jumped()
        }

        Operation::Nop => {
            if mode == AddressingMode::Implied {
                Outcome::default()
            } else {
                let (_, crossed) = read_operand(cpu, bus, mode)?;
                Outcome::page(ins, crossed)
            }
        }
    };
    Ok(outcome)
}

#[inline]
fn jumped() -> Outcome {
    Outcome {
        extra_cycles: 0,
        jumped: true,
    }
}

#[inline]
fn flag(set: impl FnOnce(&mut Status), cpu: &mut CpuState) -> Outcome {
    set(&mut cpu.status);
    Outcome::default()
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn push<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
    v: u8,
) -> Result<(), MemoryError> {
    bus.write(STACK_BASE | cpu.sp as u16, v)?;
    cpu.sp = cpu.sp.wrapping_sub(1);
    Ok(())
}

#[inline]
pub(crate) fn pop<B: CpuBus + ?Sized>(cpu: &mut CpuState, bus: &mut B) -> Result<u8, MemoryError> {
    cpu.sp = cpu.sp.wrapping_add(1);
    bus.read(STACK_BASE | cpu.sp as u16)
}

/// High byte first, so the low byte ends up at the lower address.
#[inline]
pub(crate) fn push_word<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
    v: u16,
) -> Result<(), MemoryError> {
    push(cpu, bus, (v >> 8) as u8)?;
    push(cpu, bus, v as u8)
}

#[inline]
pub(crate) fn pop_word<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
) -> Result<u16, MemoryError> {
    let lo = pop(cpu, bus)? as u16;
    let hi = pop(cpu, bus)? as u16;
    Ok((hi << 8) | lo)
}

/// Interrupt entry shared by BRK, NMI and IRQ: push the return address and
/// status, mask IRQs, load PC from `vector`.
pub(crate) fn interrupt<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
    return_addr: u16,
    vector: u16,
    brk: bool,
) -> Result<(), MemoryError> {
    push_word(cpu, bus, return_addr)?;
    let p = cpu.status.to_byte(brk);
    push(cpu, bus, p)?;
    cpu.status.irq_disable = true;
    cpu.pc = read_word(bus, vector)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Memory operands
// ---------------------------------------------------------------------------

fn store<B: CpuBus + ?Sized>(
    cpu: &CpuState,
    bus: &mut B,
    mode: AddressingMode,
    v: u8,
) -> Result<Outcome, NesError> {
    let addr = resolve(cpu, bus, mode)?.addr;
    bus.write(addr, v)?;
    Ok(Outcome::default())
}

/// Read-modify-write on the accumulator or on memory. Returns the new value.
fn modify<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
    mode: AddressingMode,
    f: fn(&mut CpuState, u8) -> u8,
) -> Result<u8, NesError> {
    if mode == AddressingMode::Accumulator {
        let a = cpu.a;
        let v = f(cpu, a);
        cpu.a = v;
        return Ok(v);
    }
    let addr = resolve(cpu, bus, mode)?.addr;
    let old = bus.read(addr)?;
    let v = f(cpu, old);
    bus.write(addr, v)?;
    Ok(v)
}

// ---------------------------------------------------------------------------
// ALU
// ---------------------------------------------------------------------------

#[inline]
fn lda(cpu: &mut CpuState, v: u8) {
    cpu.a = v;
    cpu.status.update_zn(v);
}

#[inline]
fn tax(cpu: &mut CpuState) {
    cpu.x = cpu.a;
    cpu.status.update_zn(cpu.x);
}

#[inline]
fn and(cpu: &mut CpuState, v: u8) {
    cpu.a &= v;
    cpu.status.update_zn(cpu.a);
}

#[inline]
fn ora(cpu: &mut CpuState, v: u8) {
    cpu.a |= v;
    cpu.status.update_zn(cpu.a);
}

#[inline]
fn eor(cpu: &mut CpuState, v: u8) {
    cpu.a ^= v;
    cpu.status.update_zn(cpu.a);
}

/// Signed and unsigned sums are computed side by side: V from the signed
/// one leaving -128..=127, C from the unsigned one exceeding 255.
pub(crate) fn adc(cpu: &mut CpuState, v: u8) {
    let carry = cpu.status.carry as i16;
    let signed = cpu.a as i8 as i16 + v as i8 as i16 + carry;
    let unsigned = cpu.a as u16 + v as u16 + carry as u16;
    cpu.status.overflow = !(-128..=127).contains(&signed);
    cpu.status.carry = unsigned > 0xFF;
    cpu.a = unsigned as u8;
    cpu.status.update_zn(cpu.a);
}

/// C is set when no borrow occurred.
pub(crate) fn sbc(cpu: &mut CpuState, v: u8) {
    let borrow = !cpu.status.carry as i16;
    let signed = cpu.a as i8 as i16 - v as i8 as i16 - borrow;
    let unsigned = cpu.a as i16 - v as i16 - borrow;
    cpu.status.overflow = !(-128..=127).contains(&signed);
    cpu.status.carry = unsigned >= 0;
    cpu.a = unsigned as u8;
    cpu.status.update_zn(cpu.a);
}

#[inline]
fn compare(cpu: &mut CpuState, reg: u8, v: u8) {
    cpu.status.carry = reg >= v;
    cpu.status.update_zn(reg.wrapping_sub(v));
}

fn inc(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_add(1);
    cpu.status.update_zn(r);
    r
}

fn dec(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_sub(1);
    cpu.status.update_zn(r);
    r
}

fn asl(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.status.carry = v & 0x80 != 0;
    let r = v << 1;
    cpu.status.update_zn(r);
    r
}

fn lsr(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.status.carry = v & 0x01 != 0;
    let r = v >> 1;
    cpu.status.update_zn(r);
    r
}

fn rol(cpu: &mut CpuState, v: u8) -> u8 {
    let r = (v << 1) | cpu.status.carry as u8;
    cpu.status.carry = v & 0x80 != 0;
    cpu.status.update_zn(r);
    r
}

fn ror(cpu: &mut CpuState, v: u8) -> u8 {
    let r = (v >> 1) | ((cpu.status.carry as u8) << 7);
    cpu.status.carry = v & 0x01 != 0;
    cpu.status.update_zn(r);
    r
}

/// Taken: +1 cycle, +1 more when the target is on another page than the
/// next instruction.
fn branch<B: CpuBus + ?Sized>(
    cpu: &mut CpuState,
    bus: &mut B,
    cond: fn(&Status) -> bool,
) -> Result<Outcome, NesError> {
    if !cond(&cpu.status) {
        return Ok(Outcome::default());
    }
    let r = resolve(cpu, bus, AddressingMode::Relative)?;
    cpu.pc = r.addr;
    Ok(Outcome {
        extra_cycles: 1 + r.crossed as u32,
        jumped: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::tests::TestMemory;

    fn state(a: u8, carry: bool) -> CpuState {
        CpuState {
            a,
            status: Status {
                carry,
                ..Status::default()
            },
            ..CpuState::new()
        }
    }

    /// Classic formulation used as a cross-check.
    fn xor_overflow(a: u8, v: u8, r: u8) -> bool {
        (a ^ r) & (v ^ r) & 0x80 != 0
    }

    #[test]
    fn adc_carry_and_overflow_are_independent() {
        let mut cpu = state(0xFF, false);
        adc(&mut cpu, 0x02);
        assert_eq!(cpu.a, 0x01);
        assert!(cpu.status.carry);
        assert!(!cpu.status.overflow);

        let mut cpu = state(0x7F, false);
        adc(&mut cpu, 0x01);
        assert_eq!(cpu.a, 0x80);
        assert!(!cpu.status.carry);
        assert!(cpu.status.overflow);
        assert!(cpu.status.negative);

        let mut cpu = state(0x80, false);
        adc(&mut cpu, 0xFF);
        assert_eq!(cpu.a, 0x7F);
        assert!(cpu.status.carry && cpu.status.overflow);
    }

    #[test]
    fn adc_sbc_overflow_agrees_with_xor_at_boundaries() {
        let edges = [0x00u8, 0x01, 0x7E, 0x7F, 0x80, 0x81, 0xFE, 0xFF];
        for &a in &edges {
            for &v in &edges {
                for carry in [false, true] {
                    let mut cpu = state(a, carry);
                    adc(&mut cpu, v);
                    assert_eq!(
                        cpu.status.overflow,
                        xor_overflow(a, v, cpu.a),
                        "ADC {a:02X}+{v:02X}+{carry}"
                    );

                    let mut cpu = state(a, carry);
                    sbc(&mut cpu, v);
                    assert_eq!(
                        cpu.status.overflow,
                        xor_overflow(a, !v, cpu.a),
                        "SBC {a:02X}-{v:02X} c={carry}"
                    );
                    assert_eq!(
                        cpu.status.carry,
                        a as i16 - v as i16 - (!carry) as i16 >= 0
                    );
                }
            }
        }
    }

    #[test]
    fn sbc_borrow() {
        let mut cpu = state(0x00, true);
        sbc(&mut cpu, 0x01);
        assert_eq!(cpu.a, 0xFF);
        assert!(!cpu.status.carry);
        assert!(cpu.status.negative);

        let mut cpu = state(0x80, true);
        sbc(&mut cpu, 0x01);
        assert_eq!(cpu.a, 0x7F);
        assert!(cpu.status.carry && cpu.status.overflow);
    }

    #[test]
    fn compare_flags() {
        let mut cpu = state(0x40, false);
        compare(&mut cpu, 0x40, 0x40);
        assert!(cpu.status.carry && cpu.status.zero && !cpu.status.negative);
        compare(&mut cpu, 0x40, 0x41);
        assert!(!cpu.status.carry && !cpu.status.zero && cpu.status.negative);
    }

    #[test]
    fn rotates_go_through_carry() {
        let mut cpu = state(0, true);
        assert_eq!(rol(&mut cpu, 0x80), 0x01);
        assert!(cpu.status.carry);
        assert_eq!(ror(&mut cpu, 0x00), 0x80);
        assert!(!cpu.status.carry);
        assert!(cpu.status.negative);
    }

    #[test]
    fn stack_wraps_without_detection() {
        let mut cpu = CpuState {
            sp: 0x00,
            ..CpuState::new()
        };
        let mut mem = TestMemory::new();
        push(&mut cpu, &mut mem, 0xAB).unwrap();
        assert_eq!(cpu.sp, 0xFF);
        assert_eq!(mem.data[0x0100], 0xAB);
        assert_eq!(pop(&mut cpu, &mut mem), Ok(0xAB));
        assert_eq!(cpu.sp, 0x00);
    }

    #[test]
    fn word_push_order() {
        let mut cpu = CpuState::new();
        let mut mem = TestMemory::new();
        push_word(&mut cpu, &mut mem, 0x1234).unwrap();
        assert_eq!(mem.data[0x01FD], 0x12);
        assert_eq!(mem.data[0x01FC], 0x34);
        assert_eq!(pop_word(&mut cpu, &mut mem), Ok(0x1234));
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn interrupt_entry_sets_i_and_loads_vector() {
        let mut cpu = CpuState {
            pc: 0x8123,
            ..CpuState::new()
        };
        cpu.status.irq_disable = false;
        let mut mem = TestMemory::new();
        mem.set_word(0xFFFA, 0x9000);
        interrupt(&mut cpu, &mut mem, 0x8123, 0xFFFA, false).unwrap();
        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.status.irq_disable);
        assert_eq!(mem.data[0x01FB] & 0x30, 0x20);
        assert_eq!(&mem.data[0x01FC..=0x01FD], &[0x23, 0x81]);
    }
}
