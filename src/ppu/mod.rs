/*!
PPU core: a per-dot state machine over 262 scanlines of 341 dots.

Each `tick` advances one dot and, when rendering is enabled, runs the
background fetch pipeline, sprite evaluation and pixel compositing for that
dot. The output is a 256x240 buffer of palette bytes (indices into the
64-colour master palette), not RGB.

Scanlines
- 0..=239  visible
- 240      post-render
- 241..=260 vertical blank (flag and NMI raised at 241, dot 1)
- 261      pre-render (flags cleared at dot 1, vertical scroll reloaded)

Signals
- `take_frame_ready()` after the last dot of the pre-render line
- `take_nmi()` at the start of vertical blank when PPUCTRL bit 7 is set
- `take_dma_request()` after a CPU write to $4014

All three are one-shot: the consumer clears them by taking them.

STRUCTURE:
- `registers.rs` CPU-visible register semantics, installed as mapper interceptors
- `renderer.rs`  timing (`tick`), per-dot phase dispatch, pixel compositing
- `fetch.rs`     background nametable/attribute/pattern pipeline and scroll increments
- `oam_eval.rs`  secondary OAM selection for the next scanline
- `sprite.rs`    per-pixel sprite lookup
*/

pub(crate) mod fetch;
pub(crate) mod oam_eval;
pub(crate) mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;

pub(crate) const LAST_DOT: i16 = 340;
pub(crate) const PRE_RENDER_LINE: i16 = 261;
pub(crate) const VBLANK_LINE: i16 = 241;

// PPUCTRL
pub(crate) const CTRL_INCREMENT_32: u8 = 0x04;
pub(crate) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(crate) const CTRL_BG_TABLE: u8 = 0x10;
pub(crate) const CTRL_SPRITE_16: u8 = 0x20;
pub(crate) const CTRL_NMI: u8 = 0x80;

// PPUMASK
pub(crate) const MASK_BG_LEFT: u8 = 0x02;
pub(crate) const MASK_SPRITE_LEFT: u8 = 0x04;
pub(crate) const MASK_SHOW_BG: u8 = 0x08;
pub(crate) const MASK_SHOW_SPRITES: u8 = 0x10;

// PPUSTATUS
pub(crate) const STATUS_OVERFLOW: u8 = 0x20;
pub(crate) const STATUS_SPRITE0: u8 = 0x40;
pub(crate) const STATUS_VBLANK: u8 = 0x80;

pub struct Ppu {
    // CPU-visible register latches
    ctrl: u8,     // $2000
    mask: u8,     // $2001
    status: u8,   // $2002
    oam_addr: u8, // $2003

    // Loopy registers: current VRAM address, temporary address, fine X
    v: u16,
    t: u16,
    fine_x: u8,
    write_toggle: bool,
    odd_frame: bool,

    data_buffer: u8,

    // Background fetch latches
    nametable_byte: u8,
    attribute_byte: u8,
    tile_low: u8,
    tile_high: u8,
    // Eight 4-bit pixels (palette << 2 | colour) for the current and next tile
    tile_shift: u64,

    oam: [u8; 256],
    // Sprites selected for the next scanline and their OAM indices
    sprites: [u8; 32],
    sprite_indices: [u8; 8],
    sprite_count: usize,

    scanline: i16,
    dot: i16,
    cycles: u64,

    frame: Vec<u8>,
    frame_ready: bool,
    nmi: bool,
    dma_request: Option<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        let mut ppu = Self {
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_toggle: false,
            odd_frame: false,
            data_buffer: 0,
            nametable_byte: 0,
            attribute_byte: 0,
            tile_low: 0,
            tile_high: 0,
            tile_shift: 0,
            oam: [0; 256],
            sprites: [0; 32],
            sprite_indices: [0; 8],
            sprite_count: 0,
            scanline: 0,
            dot: 0,
            cycles: 0,
            frame: vec![0; NES_WIDTH * NES_HEIGHT],
            frame_ready: false,
            nmi: false,
            dma_request: None,
        };
        ppu.reset();
        ppu
    }

    /// Power-up state: registers cleared, vblank flag set, positioned at the
    /// end of the post-render line so the next dot enters vertical blank.
    pub fn reset(&mut self) {
        self.ctrl = 0;
        self.mask = 0;
        self.status = STATUS_VBLANK;
        self.oam_addr = 0;
        self.v = 0;
        self.t = 0;
        self.fine_x = 0;
        self.write_toggle = false;
        self.odd_frame = false;
        self.data_buffer = 0;
        self.nametable_byte = 0;
        self.attribute_byte = 0;
        self.tile_low = 0;
        self.tile_high = 0;
        self.tile_shift = 0;
        self.oam.fill(0);
        self.sprites.fill(0);
        self.sprite_indices.fill(0);
        self.sprite_count = 0;
        self.scanline = 240;
        self.dot = LAST_DOT;
        self.cycles = 0;
        self.frame.fill(0);
        self.frame_ready = false;
        self.nmi = false;
        self.dma_request = None;
    }

    /// Palette-index frame buffer, row-major, `NES_WIDTH * NES_HEIGHT` bytes.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Source page of a pending OAM DMA, if the CPU wrote $4014.
    pub fn take_dma_request(&mut self) -> Option<u8> {
        self.dma_request.take()
    }

    pub fn oam(&self) -> &[u8; 256] {
        &self.oam
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    /// Replace OAM wholesale (result of a DMA transfer).
    pub fn load_oam(&mut self, oam: [u8; 256]) {
        self.oam = oam;
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn dot(&self) -> i16 {
        self.dot
    }

    /// Dots ticked since reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn vblank(&self) -> bool {
        self.status & STATUS_VBLANK != 0
    }

    pub fn sprite_zero_hit(&self) -> bool {
        self.status & STATUS_SPRITE0 != 0
    }

    pub fn sprite_overflow(&self) -> bool {
        self.status & STATUS_OVERFLOW != 0
    }

    /// Current VRAM address (`v`), 15 bits.
    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    /// Temporary VRAM address (`t`), 15 bits.
    pub fn temp_addr(&self) -> u16 {
        self.t
    }

    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    #[inline]
    pub(crate) fn rendering_enabled(&self) -> bool {
        self.mask & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    #[inline]
    pub(crate) fn sprite_height(&self) -> i16 {
        if self.ctrl & CTRL_SPRITE_16 != 0 { 16 } else { 8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_state() {
        let mut ppu = Ppu::new();
        assert!(ppu.vblank());
        assert_eq!((ppu.scanline(), ppu.dot()), (240, 340));
        assert_eq!(ppu.frame().len(), NES_WIDTH * NES_HEIGHT);
        assert!(!ppu.take_frame_ready());
        assert!(!ppu.take_nmi());
        assert_eq!(ppu.take_dma_request(), None);
    }

    #[test]
    fn signals_clear_when_taken() {
        let mut ppu = Ppu::new();
        ppu.frame_ready = true;
        ppu.nmi = true;
        ppu.dma_request = Some(0x02);
        assert!(ppu.take_frame_ready());
        assert!(!ppu.take_frame_ready());
        assert!(ppu.take_nmi());
        assert!(!ppu.take_nmi());
        assert_eq!(ppu.take_dma_request(), Some(0x02));
        assert_eq!(ppu.take_dma_request(), None);
    }
}
