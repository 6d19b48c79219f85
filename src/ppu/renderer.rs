#![doc = r#"
PPU renderer module

Responsibilities
- Per-dot timing: `Ppu::tick` advances the dot/scanline counters and raises
  the frame, vertical-blank and NMI signals.
- Per-dot phase dispatch while rendering is enabled (background fetches,
  sprite evaluation, scroll copies, OAMADDR reset, mapper A12 pulse).
- Pixel compositing of background and sprite into the palette-index frame.

Timing
- Dot 1 of line 241 sets vertical blank (and NMI when enabled).
- Dot 1 of line 261 clears vertical blank, sprite zero hit and overflow.
- After dot 340 of line 261 the position becomes line 0, dot -1 so the next
  tick lands on dot 0; on odd frames with rendering enabled dot 340 is
  skipped, giving 89341 dots instead of 89342.
"#]

use super::*;
use crate::error::MemoryError;
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// Advance one PPU dot (called three times per CPU cycle).
    pub fn tick<B: PpuBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), MemoryError> {
        self.cycles += 1;
        self.dot += 1;
        if self.dot > LAST_DOT {
            self.dot = 0;
            self.scanline += 1;
        }

        if self.dot == 1 {
            if self.scanline == PRE_RENDER_LINE {
                self.status &= !(STATUS_VBLANK | STATUS_OVERFLOW | STATUS_SPRITE0);
            } else if self.scanline == VBLANK_LINE {
                self.status |= STATUS_VBLANK;
                if self.ctrl & CTRL_NMI != 0 {
                    self.nmi = true;
                }
            }
        }

        if self.rendering_enabled() {
            self.render_dot(bus)?;
        }

        self.finish_dot();
        Ok(())
    }

    fn render_dot<B: PpuBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), MemoryError> {
        let visible_line = (0..NES_HEIGHT as i16).contains(&self.scanline);
        let pre_line = self.scanline == PRE_RENDER_LINE;
        let render_line = visible_line || pre_line;
        let visible_dot = (1..=256).contains(&self.dot);
        let fetch_dot = visible_dot || (321..=336).contains(&self.dot);

        if self.dot == 257 {
            if visible_line {
                self.evaluate_sprites();
            } else {
                self.sprite_count = 0;
            }
        }

        if visible_line && visible_dot {
            self.render_pixel(bus)?;
        }

        if !render_line {
            return Ok(());
        }

        if fetch_dot {
            self.fetch_step(bus)?;
        }
        if (258..=320).contains(&self.dot) {
            self.oam_addr = 0;
        }
        if self.dot == 257 {
            self.copy_horizontal();
        }
        if pre_line && (280..=304).contains(&self.dot) {
            self.copy_vertical();
        }
        if self.a12_rises_at(self.dot) {
            bus.pulse_a12();
        }
        Ok(())
    }

    /// Dot at which PPU address line 12 goes high once per line, given the
    /// background and sprite pattern table selection.
    fn a12_rises_at(&self, dot: i16) -> bool {
        let bg_high = self.ctrl & CTRL_BG_TABLE != 0;
        let sprites_high = self.ctrl & CTRL_SPRITE_TABLE != 0 || self.ctrl & CTRL_SPRITE_16 != 0;
        match dot {
            260 => !bg_high && sprites_high,
            324 => bg_high && !sprites_high,
            _ => false,
        }
    }

    fn finish_dot(&mut self) {
        if self.scanline != PRE_RENDER_LINE {
            return;
        }
        let skip = self.odd_frame && self.rendering_enabled() && self.dot == LAST_DOT - 1;
        if skip || self.dot == LAST_DOT {
            self.scanline = 0;
            self.dot = -1;
            self.odd_frame = !self.odd_frame;
            self.frame_ready = true;
        }
    }

    fn render_pixel<B: PpuBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), MemoryError> {
        let x = (self.dot - 1) as usize;
        let y = self.scanline as usize;

        let background = self.background_pixel(x);
        let sprite = self.sprite_pixel(bus, x)?;

        let addr = match sprite {
            Some(sp) if background & 0x03 == 0 => 0x3F10 + sp.data as u16,
            Some(sp) => {
                if self.sprite_indices[sp.slot] == 0 {
                    self.status |= STATUS_SPRITE0;
                }
                let attr = self.sprites[sp.slot * 4 + 2];
                if attr & 0x20 != 0 {
                    0x3F00 + background as u16
                } else {
                    0x3F10 + sp.data as u16
                }
            }
            None if background & 0x03 == 0 => 0x3F00,
            None => 0x3F00 + background as u16,
        };

        self.frame[y * NES_WIDTH + x] = bus.read(addr)?;
        Ok(())
    }
}
