/*!
state.rs - architectural CPU state: registers, status flags, cycle counter.

The status register is held as independent booleans. Its byte encoding is
produced on demand:

```text
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
```

Bit 5 always reads as 1. Bit 4 (B) is never stored: it only exists in the
copy pushed by BRK/PHP and is dropped again by PLP/RTI. The decimal flag has
no arithmetic effect on this CPU but is kept and round-trips through the
stack like any other flag.
*/

/// Processor status flag bit masks.
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000;
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000;
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Power-up / reset stack pointer.
pub const RESET_SP: u8 = 0xFD;
/// Cycle counter value right after reset.
pub const RESET_CYCLES: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub carry: bool,
    pub zero: bool,
    pub irq_disable: bool,
    pub decimal: bool,
    pub overflow: bool,
    pub negative: bool,
}

impl Status {
    /// Encode as a byte. Bit 5 is always set; `brk` controls bit 4.
    #[inline]
    pub fn to_byte(self, brk: bool) -> u8 {
        let mut v = UNUSED;
        if self.carry {
            v |= CARRY;
        }
        if self.zero {
            v |= ZERO;
        }
        if self.irq_disable {
            v |= IRQ_DISABLE;
        }
        if self.decimal {
            v |= DECIMAL;
        }
        if brk {
            v |= BREAK;
        }
        if self.overflow {
            v |= OVERFLOW;
        }
        if self.negative {
            v |= NEGATIVE;
        }
        v
    }

    /// Decode a byte. Bits 4 and 5 are ignored.
    #[inline]
    pub fn from_byte(v: u8) -> Self {
        Self {
            carry: v & CARRY != 0,
            zero: v & ZERO != 0,
            irq_disable: v & IRQ_DISABLE != 0,
            decimal: v & DECIMAL != 0,
            overflow: v & OVERFLOW != 0,
            negative: v & NEGATIVE != 0,
        }
    }

    #[inline]
    pub fn update_zn(&mut self, v: u8) {
        self.zero = v == 0;
        self.negative = v & 0x80 != 0;
    }
}

/// Registers plus the cumulative cycle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
    pub cycles: u64,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: RESET_SP,
            pc: 0,
            status: Status::from_byte(IRQ_DISABLE | UNUSED),
            cycles: 0,
        }
    }
}

impl CpuState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status byte as software observes it (bit 5 set, B clear).
    #[inline]
    pub fn status_byte(&self) -> u8 {
        self.status.to_byte(false)
    }

    #[inline]
    pub fn set_status_byte(&mut self, v: u8) {
        self.status = Status::from_byte(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_defaults() {
        let s = CpuState::new();
        assert_eq!(s.sp, 0xFD);
        assert_eq!(s.status_byte(), 0x24);
    }

    #[test]
    fn bit5_always_set_and_break_never_stored() {
        let st = Status::from_byte(0x00);
        assert_eq!(st.to_byte(false), 0x20);
        assert_eq!(st.to_byte(true), 0x30);

        let st = Status::from_byte(0xFF);
        assert_eq!(st.to_byte(false), 0xEF);
        assert_eq!(Status::from_byte(BREAK), Status::default());
    }

    #[test]
    fn decimal_round_trips() {
        let st = Status::from_byte(DECIMAL | CARRY);
        assert!(st.decimal);
        assert_eq!(Status::from_byte(st.to_byte(true)), st);
    }

    #[test]
    fn update_zn_sets_exactly_two_flags() {
        let mut st = Status {
            carry: true,
            overflow: true,
            ..Status::default()
        };
        st.update_zn(0x00);
        assert!(st.zero && !st.negative);
        st.update_zn(0x80);
        assert!(!st.zero && st.negative);
        assert!(st.carry && st.overflow);
    }
}
