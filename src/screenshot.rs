/*!
Frame dumps (feature `screenshot`).

The PPU produces palette indices; this module maps them through the 64-entry
master palette and writes an RGB PNG with the `image` crate.
*/

use std::path::Path;

use image::error::{ImageError, ParameterError, ParameterErrorKind};

use crate::ppu::{NES_HEIGHT, NES_WIDTH};

/// Canonical (approximate) NES master palette, RGB.
pub const NES_PALETTE: [[u8; 3]; 64] = [
    [0x75, 0x75, 0x75],
    [0x27, 0x1B, 0x8F],
    [0x00, 0x00, 0xAB],
    [0x47, 0x00, 0x9F],
    [0x8F, 0x00, 0x77],
    [0xAB, 0x00, 0x13],
    [0xA7, 0x00, 0x00],
    [0x7F, 0x0B, 0x00],
    [0x43, 0x2F, 0x00],
    [0x00, 0x47, 0x00],
    [0x00, 0x51, 0x00],
    [0x00, 0x3F, 0x17],
    [0x1B, 0x3F, 0x5F],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0xBC, 0xBC, 0xBC],
    [0x00, 0x73, 0xEF],
    [0x23, 0x3B, 0xEF],
    [0x83, 0x00, 0xF3],
    [0xBF, 0x00, 0xBF],
    [0xE7, 0x00, 0x5B],
    [0xDB, 0x2B, 0x00],
    [0xCB, 0x4F, 0x0F],
    [0x8B, 0x73, 0x00],
    [0x00, 0x97, 0x00],
    [0x00, 0xAB, 0x00],
    [0x00, 0x93, 0x3B],
    [0x00, 0x83, 0x8B],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0xFF, 0xFF, 0xFF],
    [0x3F, 0xBF, 0xFF],
    [0x5F, 0x97, 0xFF],
    [0xA7, 0x8B, 0xFD],
    [0xF7, 0x7B, 0xFF],
    [0xFF, 0x77, 0xB7],
    [0xFF, 0x77, 0x63],
    [0xFF, 0x9B, 0x3B],
    [0xF3, 0xBF, 0x3F],
    [0x83, 0xD3, 0x13],
    [0x4F, 0xDF, 0x4B],
    [0x58, 0xF8, 0x98],
    [0x00, 0xEB, 0xDB],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0xFF, 0xFF, 0xFF],
    [0xAB, 0xE7, 0xFF],
    [0xC7, 0xD7, 0xFF],
    [0xD7, 0xCB, 0xFF],
    [0xFF, 0xC7, 0xFF],
    [0xFF, 0xC7, 0xDB],
    [0xFF, 0xBF, 0xB3],
    [0xFF, 0xDB, 0xAB],
    [0xFF, 0xE7, 0xA3],
    [0xE3, 0xFF, 0xA3],
    [0xAB, 0xF3, 0xBF],
    [0xB3, 0xFF, 0xCF],
    [0x9F, 0xFF, 0xF3],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0x00],
];

/// Expand a palette-index frame to packed RGB8. Only the low six bits of an
/// index select a colour.
pub fn frame_to_rgb(frame: &[u8]) -> Vec<u8> {
    frame
        .iter()
        .flat_map(|&i| NES_PALETTE[(i & 0x3F) as usize])
        .collect()
}

/// Write a 256x240 palette-index frame as a PNG.
pub fn save_png<P: AsRef<Path>>(frame: &[u8], path: P) -> image::ImageResult<()> {
    if frame.len() != NES_WIDTH * NES_HEIGHT {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )));
    }
    let path = path.as_ref();
    let rgb = frame_to_rgb(frame);
    image::save_buffer(
        path,
        &rgb,
        NES_WIDTH as u32,
        NES_HEIGHT as u32,
        image::ExtendedColorType::Rgb8,
    )?;
    log::info!("wrote frame to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_map_through_palette() {
        let rgb = frame_to_rgb(&[0x00, 0x30, 0x0F, 0x70]);
        assert_eq!(&rgb[0..3], &[0x75, 0x75, 0x75]);
        assert_eq!(&rgb[3..6], &[0xFF, 0xFF, 0xFF]);
        assert_eq!(&rgb[6..9], &[0x00, 0x00, 0x00]);
        // High bits are ignored: $70 selects $30.
        assert_eq!(&rgb[9..12], &[0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn writes_png() {
        let frame = vec![0x21u8; NES_WIDTH * NES_HEIGHT];
        let path = std::env::temp_dir().join("nescore_screenshot_test.png");
        save_png(&frame, &path).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (256, 240));
        assert_eq!(img.get_pixel(10, 10).0, NES_PALETTE[0x21]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn wrong_frame_size_is_an_error() {
        let path = std::env::temp_dir().join("nescore_screenshot_bad.png");
        assert!(save_png(&[0u8; 16], &path).is_err());
    }
}
