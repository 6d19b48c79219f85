#![doc = r#"
PPU background fetch pipeline

Responsibilities
- Eight-dot fetch cycle: nametable byte (dot 1), attribute byte (3), pattern
  low plane (5), pattern high plane (7), pack into the shift register (0).
- Coarse X / fine Y increments of the VRAM address and the horizontal and
  vertical copies from `t`.
- Background pixel selection from the shift register using fine X.

Shift register layout
- 64 bits holding sixteen 4-bit pixels: `palette << 2 | colour`.
- The low 32 bits are the tile being drawn, the high 32 bits the next one.
- Shifted right by one pixel on every fetch dot.
"#]

use super::*;
use crate::error::MemoryError;
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// One fetch-eligible dot of the background pipeline.
    pub(in crate::ppu) fn fetch_step<B: PpuBus + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<(), MemoryError> {
        self.tile_shift >>= 4;
        match self.dot % 8 {
            0 => {
                self.store_tile_data();
                self.increment_x();
                if self.dot == 256 {
                    self.increment_y();
                }
            }
            1 => self.nametable_byte = bus.read(0x2000 | (self.v & 0x0FFF))?,
            3 => {
                let addr = 0x23C0 | (self.v & 0x0C00) | ((self.v >> 4) & 0x38) | ((self.v >> 2) & 0x07);
                self.attribute_byte = bus.read(addr)?;
            }
            5 => self.tile_low = bus.read(self.pattern_addr())?,
            7 => self.tile_high = bus.read(self.pattern_addr() + 8)?,
            _ => {}
        }
        Ok(())
    }

    #[inline]
    fn pattern_addr(&self) -> u16 {
        let base = if self.ctrl & CTRL_BG_TABLE != 0 { 0x1000 } else { 0x0000 };
        base + self.nametable_byte as u16 * 16 + self.fine_y()
    }

    #[inline]
    fn fine_y(&self) -> u16 {
        (self.v >> 12) & 0x07
    }

    #[inline]
    fn coarse_x(&self) -> u16 {
        self.v & 0x001F
    }

    #[inline]
    fn coarse_y(&self) -> u16 {
        (self.v >> 5) & 0x001F
    }

    /// Pack the latched tile into the upper half of the shift register.
    fn store_tile_data(&mut self) {
        let shift = (self.coarse_x() & 0x02) | ((self.coarse_y() & 0x02) << 1);
        let palette = ((self.attribute_byte >> shift) & 0x03) as u64;
        let mut data: u64 = 0;
        for i in 0..8 {
            let lo = ((self.tile_low >> (7 - i)) & 1) as u64;
            let hi = ((self.tile_high >> (7 - i)) & 1) as u64;
            data |= ((palette << 2) | (hi << 1) | lo) << (4 * i);
        }
        self.tile_shift &= 0xFFFF_FFFF;
        self.tile_shift |= data << 32;
    }

    pub(in crate::ppu) fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    pub(in crate::ppu) fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }
        self.v &= !0x7000;
        let mut y = self.coarse_y();
        match y {
            29 => {
                y = 0;
                self.v ^= 0x0800;
            }
            // Attribute rows: wrap without switching nametable.
            31 => y = 0,
            _ => y += 1,
        }
        self.v = (self.v & !0x03E0) | (y << 5);
    }

    #[inline]
    pub(in crate::ppu) fn copy_horizontal(&mut self) {
        self.v = (self.v & 0x7BE0) | (self.t & 0x041F);
    }

    #[inline]
    pub(in crate::ppu) fn copy_vertical(&mut self) {
        self.v = (self.v & 0x041F) | (self.t & 0x7BE0);
    }

    /// Background pixel (`palette << 2 | colour`) at screen column `x`.
    pub(in crate::ppu) fn background_pixel(&self, x: usize) -> u8 {
        if self.mask & MASK_SHOW_BG == 0 {
            return 0;
        }
        if self.mask & MASK_BG_LEFT == 0 && x < 8 {
            return 0;
        }
        ((self.tile_shift >> (self.fine_x as u64 * 4)) & 0x0F) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::tests::MockPpuBus;

    #[test]
    fn increment_x_wraps_into_next_nametable() {
        let mut ppu = Ppu::new();
        ppu.v = 31;
        ppu.increment_x();
        assert_eq!(ppu.v, 0x0400);
        ppu.increment_x();
        assert_eq!(ppu.v, 0x0401);
    }

    #[test]
    fn increment_y_fine_then_coarse() {
        let mut ppu = Ppu::new();
        ppu.v = 0x6000; // fine Y 6
        ppu.increment_y();
        assert_eq!(ppu.v, 0x7000);
        ppu.increment_y();
        assert_eq!(ppu.v, 1 << 5);
    }

    #[test]
    fn increment_y_row_29_switches_nametable() {
        let mut ppu = Ppu::new();
        ppu.v = 0x7000 | (29 << 5);
        ppu.increment_y();
        assert_eq!(ppu.v, 0x0800);
    }

    #[test]
    fn increment_y_row_31_wraps_in_place() {
        let mut ppu = Ppu::new();
        ppu.v = 0x7000 | (31 << 5) | 0x0800;
        ppu.increment_y();
        assert_eq!(ppu.v, 0x0800);
    }

    #[test]
    fn scroll_copies_select_their_bits() {
        let mut ppu = Ppu::new();
        ppu.t = 0x7FFF;
        ppu.v = 0;
        ppu.copy_horizontal();
        assert_eq!(ppu.v, 0x041F);
        ppu.v = 0;
        ppu.copy_vertical();
        assert_eq!(ppu.v, 0x7BE0);
    }

    #[test]
    fn eight_dots_load_one_tile() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.mask = MASK_SHOW_BG | MASK_BG_LEFT;
        // Tile 1 at the top-left, palette 2 via attribute bits 0-1, colour 3 in pixel 0.
        bus.nametable[0x000] = 0x01;
        bus.nametable[0x3C0] = 0x02;
        bus.pattern[0x10] = 0x80;
        bus.pattern[0x18] = 0x80;

        for dot in 1..=8 {
            ppu.dot = dot;
            ppu.fetch_step(&mut bus).unwrap();
        }
        assert_eq!(ppu.v, 1);
        // Eight more shifts bring the tile into the low half.
        for _ in 0..8 {
            ppu.tile_shift >>= 4;
        }
        assert_eq!(ppu.background_pixel(0), (2 << 2) | 3);

        ppu.fine_x = 1;
        assert_eq!(ppu.background_pixel(0), 2 << 2);

        ppu.mask = MASK_SHOW_BG;
        assert_eq!(ppu.background_pixel(0), 0);
    }
}
