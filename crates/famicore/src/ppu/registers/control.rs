use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// PPU control register (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V M S B s I Y X
    /// ```
    /// - `X`/`Y`: nametable select bits (copied into the temporary scroll
    ///   register on write)
    /// - `I`: VRAM increment (0=+1, 1=+32)
    /// - `s`: sprite pattern table (8x8 mode)
    /// - `B`: background pattern table
    /// - `S`: sprite size (0=8x8, 1=8x16)
    /// - `M`: master/slave select
    /// - `V`: generate NMI at VBlank start
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Control: u8 {
        const NAMETABLE_X = 0b0000_0001;
        const NAMETABLE_Y = 0b0000_0010;
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::empty()
    }
}

impl Control {
    /// VRAM auto-increment applied after `$2007` accesses (1 or 32).
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Base address of the pattern table used by 8x8 sprites.
    pub(crate) fn sprite_pattern_table(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            0x0000
        }
    }

    /// Base address of the background pattern table.
    pub(crate) fn background_pattern_table(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            0x0000
        }
    }

    /// Sprite height for the current sprite-size mode (8 or 16).
    pub(crate) fn sprite_height(self) -> i16 {
        if self.contains(Control::SPRITE_SIZE_16) {
            16
        } else {
            8
        }
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}
