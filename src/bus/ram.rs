/*!
Work RAM: 2 KiB at $0000-$07FF, repeated three more times up to $1FFF.

Addresses are taken as CPU addresses and folded with a mask. Page views let
OAM DMA copy a RAM-sourced page without going through the full bus decode.
*/

pub const WORK_RAM_SIZE: usize = 0x0800;
const MIRROR_MASK: u16 = (WORK_RAM_SIZE as u16) - 1;

#[derive(Clone, Debug)]
pub struct Ram {
    cells: Box<[u8; WORK_RAM_SIZE]>,
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        Self {
            cells: Box::new([0; WORK_RAM_SIZE]),
        }
    }

    /// Power-on and reset both zero the array.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[(addr & MIRROR_MASK) as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[(addr & MIRROR_MASK) as usize] = value;
    }

    /// The 256 bytes behind CPU page `page`, if that page is work RAM.
    pub fn page(&self, page: u8) -> Option<&[u8]> {
        if page >= 0x20 {
            return None;
        }
        let start = ((page as u16) << 8 & MIRROR_MASK) as usize;
        Some(&self.cells[start..start + 0x100])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_every_2k() {
        let mut ram = Ram::new();
        ram.write(0x0001, 0xAA);
        assert_eq!(ram.read(0x0801), 0xAA);
        assert_eq!(ram.read(0x1801), 0xAA);

        ram.write(0x1FFF, 0x55);
        assert_eq!(ram.read(0x07FF), 0x55);
    }

    #[test]
    fn page_views_fold_mirrors() {
        let mut ram = Ram::new();
        ram.write(0x0203, 0x42);
        assert_eq!(ram.page(0x02).unwrap()[3], 0x42);
        assert_eq!(ram.page(0x0A).unwrap()[3], 0x42);
        assert_eq!(ram.page(0x1A).unwrap().len(), 0x100);
        assert!(ram.page(0x20).is_none());
        assert!(ram.page(0x80).is_none());
    }

    #[test]
    fn clear_zeroes() {
        let mut ram = Ram::new();
        ram.write(0x07FF, 0x12);
        ram.clear();
        assert_eq!(ram.read(0x07FF), 0);
    }
}
