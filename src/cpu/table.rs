/*!
table.rs - static opcode descriptor table.

Each of the 256 opcode slots holds an `Instruction` descriptor or `None`.
A descriptor names the operation, its addressing mode, its byte length and
base cycle cost, and whether resolving the operand across a page boundary
costs one more cycle.

Length 0 marks operations that set PC themselves (jumps, calls, returns,
BRK); every other instruction advances PC by its length after executing.

Besides the documented set the table carries the undocumented opcodes that
commercial software and CPU test ROMs rely on: the multi-byte NOPs, SBC
`$EB`, and the read-modify-write composites SLO, RLA, SRE, RRA, DCP, ISB
plus LAX and SAX.
*/

use crate::cpu::addressing::AddressingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dcp,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Isb,
    Jmp,
    Jsr,
    Lax,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rla,
    Rol,
    Ror,
    Rra,
    Rti,
    Rts,
    Sax,
    Sbc,
    Sec,
    Sed,
    Sei,
    Slo,
    Sre,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Operation,
    pub mode: AddressingMode,
    pub len: u8,
    pub cycles: u8,
    pub page_penalty: bool,
}

impl Instruction {
    const fn new(
        op: Operation,
        mode: AddressingMode,
        len: u8,
        cycles: u8,
        page_penalty: bool,
    ) -> Self {
        Self {
            op,
            mode,
            len,
            cycles,
            page_penalty,
        }
    }
}

/// Descriptor for `opcode`, if the core implements it.
#[inline]
pub fn decode(opcode: u8) -> Option<&'static Instruction> {
    OPCODES[opcode as usize].as_ref()
}

// ------------------------------------------
// Descriptor table (256 entries)
// ------------------------------------------

pub static OPCODES: [Option<Instruction>; 256] = {
    let mut t: [Option<Instruction>; 256] = [None; 256];

    macro_rules! op {
        ($code:literal, $op:ident, $mode:ident, $len:literal, $cycles:literal) => {
            t[$code] = Some(Instruction::new(
                Operation::$op,
                AddressingMode::$mode,
                $len,
                $cycles,
                false,
            ));
        };
        ($code:literal, $op:ident, $mode:ident, $len:literal, $cycles:literal, page) => {
            t[$code] = Some(Instruction::new(
                Operation::$op,
                AddressingMode::$mode,
                $len,
                $cycles,
                true,
            ));
        };
    }

    op!(0x00, Brk, Implied, 0, 7);
    op!(0x01, Ora, IndexedIndirect, 2, 6);
    op!(0x03, Slo, IndexedIndirect, 2, 8);
    op!(0x04, Nop, ZeroPage, 2, 3);
    op!(0x05, Ora, ZeroPage, 2, 3);
    op!(0x06, Asl, ZeroPage, 2, 5);
    op!(0x07, Slo, ZeroPage, 2, 5);
    op!(0x08, Php, Implied, 1, 3);
    op!(0x09, Ora, Immediate, 2, 2);
    op!(0x0A, Asl, Accumulator, 1, 2);
    op!(0x0C, Nop, Absolute, 3, 4);
    op!(0x0D, Ora, Absolute, 3, 4);
    op!(0x0E, Asl, Absolute, 3, 6);
    op!(0x0F, Slo, Absolute, 3, 6);
    op!(0x10, Bpl, Relative, 2, 2, page);
    op!(0x11, Ora, IndirectIndexed, 2, 5, page);
    op!(0x13, Slo, IndirectIndexed, 2, 8);
    op!(0x14, Nop, ZeroPageX, 2, 4);
    op!(0x15, Ora, ZeroPageX, 2, 4);
    op!(0x16, Asl, ZeroPageX, 2, 6);
    op!(0x17, Slo, ZeroPageX, 2, 6);
    op!(0x18, Clc, Implied, 1, 2);
    op!(0x19, Ora, AbsoluteY, 3, 4, page);
    op!(0x1A, Nop, Implied, 1, 2);
    op!(0x1B, Slo, AbsoluteY, 3, 7);
    op!(0x1C, Nop, AbsoluteX, 3, 4, page);
    op!(0x1D, Ora, AbsoluteX, 3, 4, page);
    op!(0x1E, Asl, AbsoluteX, 3, 7);
    op!(0x1F, Slo, AbsoluteX, 3, 7);
    op!(0x20, Jsr, Absolute, 0, 6);
    op!(0x21, And, IndexedIndirect, 2, 6);
    op!(0x23, Rla, IndexedIndirect, 2, 8);
    op!(0x24, Bit, ZeroPage, 2, 3);
    op!(0x25, And, ZeroPage, 2, 3);
    op!(0x26, Rol, ZeroPage, 2, 5);
    op!(0x27, Rla, ZeroPage, 2, 5);
    op!(0x28, Plp, Implied, 1, 4);
    op!(0x29, And, Immediate, 2, 2);
    op!(0x2A, Rol, Accumulator, 1, 2);
    op!(0x2C, Bit, Absolute, 3, 4);
    op!(0x2D, And, Absolute, 3, 4);
    op!(0x2E, Rol, Absolute, 3, 6);
    op!(0x2F, Rla, Absolute, 3, 6);
    op!(0x30, Bmi, Relative, 2, 2, page);
    op!(0x31, And, IndirectIndexed, 2, 5, page);
    op!(0x33, Rla, IndirectIndexed, 2, 8);
    op!(0x34, Nop, ZeroPageX, 2, 4);
    op!(0x35, And, ZeroPageX, 2, 4);
    op!(0x36, Rol, ZeroPageX, 2, 6);
    op!(0x37, Rla, ZeroPageX, 2, 6);
    op!(0x38, Sec, Implied, 1, 2);
    op!(0x39, And, AbsoluteY, 3, 4, page);
    op!(0x3A, Nop, Implied, 1, 2);
    op!(0x3B, Rla, AbsoluteY, 3, 7);
    op!(0x3C, Nop, AbsoluteX, 3, 4, page);
    op!(0x3D, And, AbsoluteX, 3, 4, page);
    op!(0x3E, Rol, AbsoluteX, 3, 7);
    op!(0x3F, Rla, AbsoluteX, 3, 7);
    op!(0x40, Rti, Implied, 0, 6);
    op!(0x41, Eor, IndexedIndirect, 2, 6);
    op!(0x43, Sre, IndexedIndirect, 2, 8);
    op!(0x44, Nop, ZeroPage, 2, 3);
    op!(0x45, Eor, ZeroPage, 2, 3);
    op!(0x46, Lsr, ZeroPage, 2, 5);
    op!(0x47, Sre, ZeroPage, 2, 5);
    op!(0x48, Pha, Implied, 1, 3);
    op!(0x49, Eor, Immediate, 2, 2);
    op!(0x4A, Lsr, Accumulator, 1, 2);
    op!(0x4C, Jmp, Absolute, 0, 3);
    op!(0x4D, Eor, Absolute, 3, 4);
    op!(0x4E, Lsr, Absolute, 3, 6);
    op!(0x4F, Sre, Absolute, 3, 6);
    op!(0x50, Bvc, Relative, 2, 2, page);
    op!(0x51, Eor, IndirectIndexed, 2, 5, page);
    op!(0x53, Sre, IndirectIndexed, 2, 8);
    op!(0x54, Nop, ZeroPageX, 2, 4);
    op!(0x55, Eor, ZeroPageX, 2, 4);
    op!(0x56, Lsr, ZeroPageX, 2, 6);
    op!(0x57, Sre, ZeroPageX, 2, 6);
    op!(0x58, Cli, Implied, 1, 2);
    op!(0x59, Eor, AbsoluteY, 3, 4, page);
    op!(0x5A, Nop, Implied, 1, 2);
    op!(0x5B, Sre, AbsoluteY, 3, 7);
    op!(0x5C, Nop, AbsoluteX, 3, 4, page);
    op!(0x5D, Eor, AbsoluteX, 3, 4, page);
    op!(0x5E, Lsr, AbsoluteX, 3, 7);
    op!(0x5F, Sre, AbsoluteX, 3, 7);
    op!(0x60, Rts, Implied, 0, 6);
    op!(0x61, Adc, IndexedIndirect, 2, 6);
    op!(0x63, Rra, IndexedIndirect, 2, 8);
    op!(0x64, Nop, ZeroPage, 2, 3);
    op!(0x65, Adc, ZeroPage, 2, 3);
    op!(0x66, Ror, ZeroPage, 2, 5);
    op!(0x67, Rra, ZeroPage, 2, 5);
    op!(0x68, Pla, Implied, 1, 4);
    op!(0x69, Adc, Immediate, 2, 2);
    op!(0x6A, Ror, Accumulator, 1, 2);
    op!(0x6C, Jmp, Indirect, 0, 5);
    op!(0x6D, Adc, Absolute, 3, 4);
    op!(0x6E, Ror, Absolute, 3, 6);
    op!(0x6F, Rra, Absolute, 3, 6);
    op!(0x70, Bvs, Relative, 2, 2, page);
    op!(0x71, Adc, IndirectIndexed, 2, 5, page);
    op!(0x73, Rra, IndirectIndexed, 2, 8);
    op!(0x74, Nop, ZeroPageX, 2, 4);
    op!(0x75, Adc, ZeroPageX, 2, 4);
    op!(0x76, Ror, ZeroPageX, 2, 6);
    op!(0x77, Rra, ZeroPageX, 2, 6);
    op!(0x78, Sei, Implied, 1, 2);
    op!(0x79, Adc, AbsoluteY, 3, 4, page);
    op!(0x7A, Nop, Implied, 1, 2);
    op!(0x7B, Rra, AbsoluteY, 3, 7);
    op!(0x7C, Nop, AbsoluteX, 3, 4, page);
    op!(0x7D, Adc, AbsoluteX, 3, 4, page);
    op!(0x7E, Ror, AbsoluteX, 3, 7);
    op!(0x7F, Rra, AbsoluteX, 3, 7);
    op!(0x80, Nop, Immediate, 2, 2);
    op!(0x81, Sta, IndexedIndirect, 2, 6);
    op!(0x82, Nop, Immediate, 2, 2);
    op!(0x83, Sax, IndexedIndirect, 2, 6);
    op!(0x84, Sty, ZeroPage, 2, 3);
    op!(0x85, Sta, ZeroPage, 2, 3);
    op!(0x86, Stx, ZeroPage, 2, 3);
    op!(0x87, Sax, ZeroPage, 2, 3);
    op!(0x88, Dey, Implied, 1, 2);
    op!(0x89, Nop, Immediate, 2, 2);
    op!(0x8A, Txa, Implied, 1, 2);
    op!(0x8C, Sty, Absolute, 3, 4);
    op!(0x8D, Sta, Absolute, 3, 4);
    op!(0x8E, Stx, Absolute, 3, 4);
    op!(0x8F, Sax, Absolute, 3, 4);
    op!(0x90, Bcc, Relative, 2, 2, page);
    op!(0x91, Sta, IndirectIndexed, 2, 6);
    op!(0x94, Sty, ZeroPageX, 2, 4);
    op!(0x95, Sta, ZeroPageX, 2, 4);
    op!(0x96, Stx, ZeroPageY, 2, 4);
    op!(0x97, Sax, ZeroPageY, 2, 4);
    op!(0x98, Tya, Implied, 1, 2);
    op!(0x99, Sta, AbsoluteY, 3, 5);
    op!(0x9A, Txs, Implied, 1, 2);
    op!(0x9D, Sta, AbsoluteX, 3, 5);
    op!(0xA0, Ldy, Immediate, 2, 2);
    op!(0xA1, Lda, IndexedIndirect, 2, 6);
    op!(0xA2, Ldx, Immediate, 2, 2);
    op!(0xA3, Lax, IndexedIndirect, 2, 6);
    op!(0xA4, Ldy, ZeroPage, 2, 3);
    op!(0xA5, Lda, ZeroPage, 2, 3);
    op!(0xA6, Ldx, ZeroPage, 2, 3);
    op!(0xA7, Lax, ZeroPage, 2, 3);
    op!(0xA8, Tay, Implied, 1, 2);
    op!(0xA9, Lda, Immediate, 2, 2);
    op!(0xAA, Tax, Implied, 1, 2);
    op!(0xAC, Ldy, Absolute, 3, 4);
    op!(0xAD, Lda, Absolute, 3, 4);
    op!(0xAE, Ldx, Absolute, 3, 4);
    op!(0xAF, Lax, Absolute, 3, 4);
    op!(0xB0, Bcs, Relative, 2, 2, page);
    op!(0xB1, Lda, IndirectIndexed, 2, 5, page);
    op!(0xB3, Lax, IndirectIndexed, 2, 5, page);
    op!(0xB4, Ldy, ZeroPageX, 2, 4);
    op!(0xB5, Lda, ZeroPageX, 2, 4);
    op!(0xB6, Ldx, ZeroPageY, 2, 4);
    op!(0xB7, Lax, ZeroPageY, 2, 4);
    op!(0xB8, Clv, Implied, 1, 2);
    op!(0xB9, Lda, AbsoluteY, 3, 4, page);
    op!(0xBA, Tsx, Implied, 1, 2);
    op!(0xBC, Ldy, AbsoluteX, 3, 4, page);
    op!(0xBD, Lda, AbsoluteX, 3, 4, page);
    op!(0xBE, Ldx, AbsoluteY, 3, 4, page);
    op!(0xBF, Lax, AbsoluteY, 3, 4, page);
    op!(0xC0, Cpy, Immediate, 2, 2);
    op!(0xC1, Cmp, IndexedIndirect, 2, 6);
    op!(0xC2, Nop, Immediate, 2, 2);
    op!(0xC3, Dcp, IndexedIndirect, 2, 8);
    op!(0xC4, Cpy, ZeroPage, 2, 3);
    op!(0xC5, Cmp, ZeroPage, 2, 3);
    op!(0xC6, Dec, ZeroPage, 2, 5);
    op!(0xC7, Dcp, ZeroPage, 2, 5);
    op!(0xC8, Iny, Implied, 1, 2);
    op!(0xC9, Cmp, Immediate, 2, 2);
    op!(0xCA, Dex, Implied, 1, 2);
    op!(0xCC, Cpy, Absolute, 3, 4);
    op!(0xCD, Cmp, Absolute, 3, 4);
    op!(0xCE, Dec, Absolute, 3, 6);
    op!(0xCF, Dcp, Absolute, 3, 6);
    op!(0xD0, Bne, Relative, 2, 2, page);
    op!(0xD1, Cmp, IndirectIndexed, 2, 5, page);
    op!(0xD3, Dcp, IndirectIndexed, 2, 8);
    op!(0xD4, Nop, ZeroPageX, 2, 4);
    op!(0xD5, Cmp, ZeroPageX, 2, 4);
    op!(0xD6, Dec, ZeroPageX, 2, 6);
    op!(0xD7, Dcp, ZeroPageX, 2, 6);
    op!(0xD8, Cld, Implied, 1, 2);
    op!(0xD9, Cmp, AbsoluteY, 3, 4, page);
    op!(0xDA, Nop, Implied, 1, 2);
    op!(0xDB, Dcp, AbsoluteY, 3, 7);
    op!(0xDC, Nop, AbsoluteX, 3, 4, page);
    op!(0xDD, Cmp, AbsoluteX, 3, 4, page);
    op!(0xDE, Dec, AbsoluteX, 3, 7);
    op!(0xDF, Dcp, AbsoluteX, 3, 7);
    op!(0xE0, Cpx, Immediate, 2, 2);
    op!(0xE1, Sbc, IndexedIndirect, 2, 6);
    op!(0xE2, Nop, Immediate, 2, 2);
    op!(0xE3, Isb, IndexedIndirect, 2, 8);
    op!(0xE4, Cpx, ZeroPage, 2, 3);
    op!(0xE5, Sbc, ZeroPage, 2, 3);
    op!(0xE6, Inc, ZeroPage, 2, 5);
    op!(0xE7, Isb, ZeroPage, 2, 5);
    op!(0xE8, Inx, Implied, 1, 2);
    op!(0xE9, Sbc, Immediate, 2, 2);
    op!(0xEA, Nop, Implied, 1, 2);
    op!(0xEB, Sbc, Immediate, 2, 2);
    op!(0xEC, Cpx, Absolute, 3, 4);
    op!(0xED, Sbc, Absolute, 3, 4);
    op!(0xEE, Inc, Absolute, 3, 6);
    op!(0xEF, Isb, Absolute, 3, 6);
    op!(0xF0, Beq, Relative, 2, 2, page);
    op!(0xF1, Sbc, IndirectIndexed, 2, 5, page);
    op!(0xF3, Isb, IndirectIndexed, 2, 8);
    op!(0xF4, Nop, ZeroPageX, 2, 4);
    op!(0xF5, Sbc, ZeroPageX, 2, 4);
    op!(0xF6, Inc, ZeroPageX, 2, 6);
    op!(0xF7, Isb, ZeroPageX, 2, 6);
    op!(0xF8, Sed, Implied, 1, 2);
    op!(0xF9, Sbc, AbsoluteY, 3, 4, page);
    op!(0xFA, Nop, Implied, 1, 2);
    op!(0xFB, Isb, AbsoluteY, 3, 7);
    op!(0xFC, Nop, AbsoluteX, 3, 4, page);
    op!(0xFD, Sbc, AbsoluteX, 3, 4, page);
    op!(0xFE, Inc, AbsoluteX, 3, 7);
    op!(0xFF, Isb, AbsoluteX, 3, 7);

    t
};
