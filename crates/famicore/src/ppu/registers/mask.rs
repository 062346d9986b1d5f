use bitflags::bitflags;

bitflags! {
    /// PPU mask register (`$2001`).
    ///
    /// Controls grayscale mode, left-edge clipping, layer enables, and the
    /// color emphasis bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Mask: u8 {
        const GRAYSCALE = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mask {
    /// `true` when either background or sprite rendering is enabled.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    /// `true` when rendering is enabled in the leftmost eight pixels for
    /// either layer.
    pub(crate) fn left_edge_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND_LEFT | Mask::SHOW_SPRITES_LEFT)
    }
}
