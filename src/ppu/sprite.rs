#![doc = r#"
PPU sprite pixel lookup

For a screen column, scan the sprites selected for this line in slot order
and return the first opaque pixel. Slot order follows OAM order, so the
lowest OAM index wins.

- 8x8 sprites take their pattern table from PPUCTRL bit 3.
- 8x16 sprites take it from bit 0 of their tile byte and use the even tile
  for the top half, the following tile for the bottom half.
- Attribute bit 6 flips horizontally, bit 7 vertically (over the full
  sprite height).
"#]

use super::*;
use crate::error::MemoryError;
use crate::ppu_bus::PpuBus;

/// Opaque sprite pixel found at a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(in crate::ppu) struct SpritePixel {
    /// `palette << 2 | colour`
    pub data: u8,
    /// Secondary-buffer slot that produced it.
    pub slot: usize,
}

impl Ppu {
    pub(in crate::ppu) fn sprite_pixel<B: PpuBus + ?Sized>(
        &self,
        bus: &B,
        x: usize,
    ) -> Result<Option<SpritePixel>, MemoryError> {
        if self.mask & MASK_SHOW_SPRITES == 0 {
            return Ok(None);
        }
        if self.mask & MASK_SPRITE_LEFT == 0 && x < 8 {
            return Ok(None);
        }

        let tall = self.ctrl & CTRL_SPRITE_16 != 0;
        // Sprites were selected against the previous line's number.
        let line = self.scanline as i32 - 1;

        for slot in 0..self.sprite_count {
            let [y, tile, attr, sx] = [
                self.sprites[slot * 4],
                self.sprites[slot * 4 + 1],
                self.sprites[slot * 4 + 2],
                self.sprites[slot * 4 + 3],
            ];
            let col = x as i32 - sx as i32;
            if !(0..8).contains(&col) {
                continue;
            }
            let row = line - y as i32;

            let (table, index) = if tall {
                ((tile as u16 & 1) * 0x1000, tile & 0xFE)
            } else {
                let table = if self.ctrl & CTRL_SPRITE_TABLE != 0 { 0x1000 } else { 0 };
                (table, tile)
            };
            let base = table + index as u16 * 16;

            let colour = self.sprite_pattern_pixel(bus, base, col, row, attr)?;
            if colour == 0 {
                continue;
            }
            return Ok(Some(SpritePixel {
                data: ((attr & 0x03) << 2) | colour,
                slot,
            }));
        }
        Ok(None)
    }

    fn sprite_pattern_pixel<B: PpuBus + ?Sized>(
        &self,
        bus: &B,
        base: u16,
        col: i32,
        row: i32,
        attr: u8,
    ) -> Result<u8, MemoryError> {
        let last_row = self.sprite_height() as i32 - 1;
        let col = if attr & 0x40 != 0 { 7 - col } else { col };
        let row = if attr & 0x80 != 0 { last_row - row } else { row };
        let row = row.clamp(0, last_row) as u16;

        let addr = if row <= 7 { base + row } else { base + 16 + (row - 8) };
        let lo = bus.read(addr)?;
        let hi = bus.read(addr + 8)?;
        let bit = 7 - col as u8;
        Ok((((hi >> bit) & 1) << 1) | ((lo >> bit) & 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::tests::MockPpuBus;

    fn setup() -> (Ppu, MockPpuBus) {
        let mut ppu = Ppu::new();
        ppu.mask = MASK_SHOW_SPRITES | MASK_SPRITE_LEFT;
        (ppu, MockPpuBus::new())
    }

    fn select(ppu: &mut Ppu, sprites: &[[u8; 4]]) {
        for (slot, s) in sprites.iter().enumerate() {
            ppu.sprites[slot * 4..slot * 4 + 4].copy_from_slice(s);
            ppu.sprite_indices[slot] = slot as u8;
        }
        ppu.sprite_count = sprites.len();
    }

    #[test]
    fn opaque_pixel_with_palette() {
        let (mut ppu, mut bus) = setup();
        // Tile 2 row 0: leftmost pixel colour 1.
        bus.pattern[0x20] = 0x80;
        select(&mut ppu, &[[9, 2, 0x03, 16]]);
        ppu.scanline = 10;

        let px = ppu.sprite_pixel(&bus, 16).unwrap();
        assert_eq!(px, Some(SpritePixel { data: (3 << 2) | 1, slot: 0 }));
        assert_eq!(ppu.sprite_pixel(&bus, 17).unwrap(), None);
        assert_eq!(ppu.sprite_pixel(&bus, 24).unwrap(), None);
    }

    #[test]
    fn horizontal_and_vertical_flip() {
        let (mut ppu, mut bus) = setup();
        // Row 7 of tile 0 has only its leftmost pixel set (colour 2).
        bus.pattern[0x0F] = 0x80;
        // Flip both: drawn at the top-right corner.
        select(&mut ppu, &[[0, 0, 0xC0, 0]]);
        ppu.scanline = 1;
        assert_eq!(ppu.sprite_pixel(&bus, 7).unwrap().map(|p| p.data), Some(2));
        assert_eq!(ppu.sprite_pixel(&bus, 0).unwrap(), None);
    }

    #[test]
    fn tall_sprite_uses_tile_bit0_table_and_next_tile() {
        let (mut ppu, mut bus) = setup();
        ppu.ctrl = CTRL_SPRITE_16;
        // Tile byte 0x05: table $1000, tiles 4 (top) and 5 (bottom).
        bus.pattern[0x1000 + 5 * 16 + 2] = 0x01;
        select(&mut ppu, &[[20, 0x05, 0x00, 100]]);
        ppu.scanline = 20 + 10 + 1; // row 10 => bottom tile, row 2
        assert_eq!(ppu.sprite_pixel(&bus, 107).unwrap().map(|p| p.data), Some(1));
    }

    #[test]
    fn lowest_slot_wins_and_transparent_falls_through() {
        let (mut ppu, mut bus) = setup();
        bus.pattern[0x10] = 0x00; // tile 1 transparent
        bus.pattern[0x20] = 0xFF; // tile 2 opaque
        bus.pattern[0x30] = 0xFF; // tile 3 opaque
        select(&mut ppu, &[[0, 1, 0, 0], [0, 2, 1, 0], [0, 3, 2, 0]]);
        ppu.scanline = 1;
        let px = ppu.sprite_pixel(&bus, 3).unwrap();
        assert_eq!(px, Some(SpritePixel { data: (1 << 2) | 1, slot: 1 }));
    }

    #[test]
    fn left_column_mask_hides_sprites() {
        let (mut ppu, mut bus) = setup();
        bus.pattern[0x00] = 0xFF;
        select(&mut ppu, &[[0, 0, 0, 0]]);
        ppu.scanline = 1;
        ppu.mask = MASK_SHOW_SPRITES;
        assert_eq!(ppu.sprite_pixel(&bus, 3).unwrap(), None);
        ppu.mask = 0;
        assert_eq!(ppu.sprite_pixel(&bus, 3).unwrap(), None);
    }
}
