//! Shared test utilities for building minimal iNES (v1) ROM images.
//!
//! Used by the cartridge, bus, CPU and orchestrator tests.
//!
//! Notes on iNES header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => loader allocates 8 KiB CHR RAM)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, mapper low nibble)
//! - byte 7 = Flags 7 (NES 2.0 indicator, mapper high nibble)
//! - byte 8 = PRG RAM size in 8 KiB units (0 => 8 KiB by convention)
//! - bytes 9..15 = padding
//!
//! Vectors sit in the last six bytes of the PRG image: NMI, RESET, IRQ/BRK.

#![allow(dead_code)]

/// Build a minimal iNES (v1) image. PRG is filled with 0xAA and CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map(|_| 512).unwrap_or(0) + prg_16k * 16 * 1024 + chr_8k * 8 * 1024,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat_n(0xAA, prg_16k * 16 * 1024));
    bytes.extend(std::iter::repeat_n(0xCC, chr_8k * 8 * 1024));
    bytes
}

/// Image for an arbitrary mapper id with `prg_16k` PRG units and `chr_8k` CHR
/// units. Each 16 KiB PRG bank is filled with its own bank number so bank
/// switching is observable; vectors point at $8000.
pub fn build_rom_with_mapper(mapper_id: u8, prg_16k: usize, chr_8k: usize) -> Vec<u8> {
    let flags6 = (mapper_id & 0x0F) << 4;
    let flags7 = mapper_id & 0xF0;
    let mut rom = build_ines(prg_16k, chr_8k, flags6, flags7, 1, None);

    let prg = &mut rom[16..16 + prg_16k * 16 * 1024];
    for (bank, chunk) in prg.chunks_mut(16 * 1024).enumerate() {
        chunk.fill(bank as u8);
    }
    let len = prg.len();
    write_le_u16(prg, len - 6, 0x8000);
    write_le_u16(prg, len - 4, 0x8000);
    write_le_u16(prg, len - 2, 0x8000);
    rom
}

/// Build an NROM image with `prg` placed at the start of a single 16 KiB
/// bank (so it runs from $8000 and $C000). Vectors default to $8000.
pub fn build_nrom_with_prg(
    prg: &[u8],
    chr_8k: usize,
    prg_ram_8k: u8,
    vectors: Option<(u16, u16, u16)>,
) -> Vec<u8> {
    assert!(
        prg.len() <= 16 * 1024,
        "Program must fit within a 16 KiB PRG bank"
    );

    let mut rom = build_ines(1, chr_8k, 0, 0, prg_ram_8k, None);
    let prg_start = 16;
    let prg_end = prg_start + 16 * 1024;
    rom[prg_start..prg_end].fill(0xEA);
    rom[prg_start..prg_start + prg.len()].copy_from_slice(prg);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_end], reset, nmi, irq);
    rom
}

/// Write NMI, RESET and IRQ vectors into a 16 KiB or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!(
            "Unsupported PRG length for vector placement: {} bytes (expected 16 KiB or 32 KiB)",
            other
        ),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = (value & 0x00FF) as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(&rom[4..9], &[2, 1, 0x01, 0x00, 1]);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn writes_vectors_for_16k_prg() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x3FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn writes_vectors_for_32k_prg() {
        let mut prg = vec![0u8; 32 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x7FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn mapper_rom_encodes_id_and_banks() {
        let rom = build_rom_with_mapper(0x14, 4, 0);
        assert_eq!(rom[6] >> 4, 0x4);
        assert_eq!(rom[7] & 0xF0, 0x10);
        assert_eq!(rom[16], 0);
        assert_eq!(rom[16 + 3 * 16 * 1024], 3);
        let end = 16 + 4 * 16 * 1024;
        assert_eq!(&rom[end - 4..end - 2], &[0x00, 0x80]);
    }
}
