#![doc = r#"
PPU OAM evaluation

Runs once per visible scanline at dot 257. Walks primary OAM from the
current OAMADDR to the end, copying up to eight sprites whose vertical range
covers this scanline into the secondary buffer; those sprites are drawn on
the following line, which is why sprites appear one line below their Y
coordinate. A ninth match sets the sprite-overflow flag and ends the scan.

The OAM index recorded per slot is relative to the starting OAMADDR and is
what sprite-zero hit detection compares against.
"#]

use super::*;

impl Ppu {
    pub(in crate::ppu) fn evaluate_sprites(&mut self) {
        self.sprites.fill(0);
        self.sprite_indices.fill(0);
        self.sprite_count = 0;

        let height = self.sprite_height() as i32;
        let line = self.scanline as i32;
        let start = self.oam_addr as usize;

        for i in (start..256).step_by(4) {
            let row = line - self.oam[i] as i32;
            if !(0..height).contains(&row) {
                continue;
            }
            if self.sprite_count == 8 {
                self.status |= STATUS_OVERFLOW;
                break;
            }
            let slot = self.sprite_count;
            // A misaligned OAMADDR can leave fewer than four bytes before the end.
            let end = (i + 4).min(256);
            self.sprites[slot * 4..slot * 4 + (end - i)].copy_from_slice(&self.oam[i..end]);
            self.sprite_indices[slot] = ((i - start) / 4) as u8;
            self.sprite_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_sprite(ppu: &mut Ppu, index: usize, y: u8, tile: u8, attr: u8, x: u8) {
        ppu.oam[index * 4..index * 4 + 4].copy_from_slice(&[y, tile, attr, x]);
    }

    #[test]
    fn selects_sprites_covering_line() {
        let mut ppu = Ppu::new();
        ppu.oam.fill(0xFF);
        place_sprite(&mut ppu, 3, 10, 0x21, 0x01, 40);
        place_sprite(&mut ppu, 7, 17, 0x22, 0x00, 50); // ends at 17..=24, misses 16
        ppu.scanline = 16;
        ppu.evaluate_sprites();

        assert_eq!(ppu.sprite_count, 1);
        assert_eq!(&ppu.sprites[0..4], &[10, 0x21, 0x01, 40]);
        assert_eq!(ppu.sprite_indices[0], 3);
        assert!(!ppu.sprite_overflow());
    }

    #[test]
    fn tall_sprites_extend_range() {
        let mut ppu = Ppu::new();
        ppu.oam.fill(0xFF);
        place_sprite(&mut ppu, 0, 10, 0, 0, 0);
        ppu.ctrl = CTRL_SPRITE_16;
        ppu.scanline = 25;
        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 1);

        ppu.scanline = 26;
        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 0);

        ppu.ctrl = 0;
        ppu.scanline = 18;
        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 0);
    }

    #[test]
    fn ninth_match_sets_overflow_and_caps_at_eight() {
        let mut ppu = Ppu::new();
        ppu.oam.fill(0xFF);
        ppu.status = 0;
        for i in 0..12 {
            place_sprite(&mut ppu, i, 100, i as u8, 0, (i * 10) as u8);
        }
        ppu.scanline = 103;
        ppu.evaluate_sprites();

        assert_eq!(ppu.sprite_count, 8);
        assert!(ppu.sprite_overflow());
        assert_eq!(ppu.sprite_indices[7], 7);
        assert_eq!(ppu.sprites[7 * 4 + 1], 7);
    }

    #[test]
    fn eight_matches_do_not_overflow() {
        let mut ppu = Ppu::new();
        ppu.oam.fill(0xFF);
        ppu.status = 0;
        for i in 0..8 {
            place_sprite(&mut ppu, i, 50, 0, 0, 0);
        }
        ppu.scanline = 50;
        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 8);
        assert!(!ppu.sprite_overflow());
    }

    #[test]
    fn scan_starts_at_oam_addr() {
        let mut ppu = Ppu::new();
        ppu.oam.fill(0xFF);
        place_sprite(&mut ppu, 0, 20, 0, 0, 0);
        place_sprite(&mut ppu, 2, 20, 0, 0, 0);
        ppu.oam_addr = 4;
        ppu.scanline = 20;
        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 1);
        assert_eq!(ppu.sprite_indices[0], 1);
    }
}
