use bitflags::bitflags;

// Layout (bits 0-14):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][Y][X][coarse_y   ][coarse_x   ]
//  yyy      N  N  YYYYY         XXXXX
bitflags! {
    /// Bit masks for the 15-bit scroll/VRAM address (`v`/`t` registers).
    pub(crate) struct VramAddrMask: u16 {
        const COARSE_X = 0x001F;    // bits 0-4
        const COARSE_Y = 0x03E0;    // bits 5-9
        const NAMETABLE_X = 0x0400; // bit 10
        const NAMETABLE_Y = 0x0800; // bit 11
        const FINE_Y = 0x7000;      // bits 12-14
        const ALL = Self::COARSE_X.bits()
            | Self::COARSE_Y.bits()
            | Self::NAMETABLE_X.bits()
            | Self::NAMETABLE_Y.bits()
            | Self::FINE_Y.bits();
    }
}

const COARSE_Y_SHIFT: u16 = 5;
const NAMETABLE_X_SHIFT: u16 = 10;
const NAMETABLE_Y_SHIFT: u16 = 11;
const FINE_Y_SHIFT: u16 = 12;

/// 15-bit packed scroll register ("loopy" register) used twice by the PPU:
/// once as the current address `v` and once as the temporary `t`.
///
/// Every field write masks to field width, so no write can corrupt the
/// neighboring fields.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(pub(crate) u16);

impl VramAddr {
    /// Coarse X scroll component (0..31).
    #[inline]
    pub fn coarse_x(self) -> u8 {
        (self.0 & VramAddrMask::COARSE_X.bits()) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, cx: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_X.bits()) | u16::from(cx & 0b1_1111);
    }

    /// Coarse Y scroll component (0..31).
    #[inline]
    pub fn coarse_y(self) -> u8 {
        ((self.0 & VramAddrMask::COARSE_Y.bits()) >> COARSE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, cy: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_Y.bits())
            | (u16::from(cy & 0b1_1111) << COARSE_Y_SHIFT);
    }

    /// Horizontal nametable select bit.
    #[inline]
    pub fn nametable_x(self) -> u8 {
        ((self.0 & VramAddrMask::NAMETABLE_X.bits()) >> NAMETABLE_X_SHIFT) as u8
    }

    #[inline]
    pub fn set_nametable_x(&mut self, nx: u8) {
        self.0 = (self.0 & !VramAddrMask::NAMETABLE_X.bits())
            | (u16::from(nx & 0b1) << NAMETABLE_X_SHIFT);
    }

    /// Vertical nametable select bit.
    #[inline]
    pub fn nametable_y(self) -> u8 {
        ((self.0 & VramAddrMask::NAMETABLE_Y.bits()) >> NAMETABLE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_nametable_y(&mut self, ny: u8) {
        self.0 = (self.0 & !VramAddrMask::NAMETABLE_Y.bits())
            | (u16::from(ny & 0b1) << NAMETABLE_Y_SHIFT);
    }

    /// Fine Y scroll component (0..7).
    #[inline]
    pub fn fine_y(self) -> u8 {
        ((self.0 & VramAddrMask::FINE_Y.bits()) >> FINE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, fy: u8) {
        self.0 = (self.0 & !VramAddrMask::FINE_Y.bits()) | (u16::from(fy & 0b111) << FINE_Y_SHIFT);
    }

    /// Raw 15-bit value.
    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Replaces the raw address, masking to 15 bits.
    #[inline]
    pub fn set_raw(&mut self, v: u16) {
        self.0 = v & VramAddrMask::ALL.bits();
    }

    /// Advances the raw address by `step`, staying within 15 bits.
    #[inline]
    pub fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & VramAddrMask::ALL.bits();
    }
}

impl core::fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VramAddr")
            .field("raw", &format_args!("{:#06X}", self.0))
            .field("fine_y", &self.fine_y())
            .field("nametable_y", &self.nametable_y())
            .field("nametable_x", &self.nametable_x())
            .field("coarse_y", &self.coarse_y())
            .field("coarse_x", &self.coarse_x())
            .finish()
    }
}

impl From<u16> for VramAddr {
    #[inline]
    fn from(v: u16) -> Self {
        VramAddr(v & VramAddrMask::ALL.bits())
    }
}

impl From<VramAddr> for u16 {
    #[inline]
    fn from(v: VramAddr) -> Self {
        v.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_round_trips() {
        let mut addr = VramAddr::default();
        addr.set_coarse_x(17);
        addr.set_coarse_y(23);
        addr.set_nametable_x(1);
        addr.set_nametable_y(1);
        addr.set_fine_y(5);

        assert_eq!(addr.coarse_x(), 17);
        assert_eq!(addr.coarse_y(), 23);
        assert_eq!(addr.nametable_x(), 1);
        assert_eq!(addr.nametable_y(), 1);
        assert_eq!(addr.fine_y(), 5);
    }

    #[test]
    fn out_of_range_writes_never_leak_into_neighbors() {
        let mut addr = VramAddr::default();
        addr.set_coarse_y(9);
        addr.set_nametable_x(1);
        addr.set_fine_y(3);

        // Oversized coarse X must be masked to 5 bits and leave the rest alone.
        addr.set_coarse_x(0xFF);
        assert_eq!(addr.coarse_x(), 0b1_1111);
        assert_eq!(addr.coarse_y(), 9);
        assert_eq!(addr.nametable_x(), 1);
        assert_eq!(addr.nametable_y(), 0);
        assert_eq!(addr.fine_y(), 3);

        addr.set_fine_y(0xFF);
        assert_eq!(addr.fine_y(), 0b111);
        assert_eq!(addr.coarse_y(), 9);
    }

    #[test]
    fn raw_value_masks_to_fifteen_bits() {
        let mut addr = VramAddr::default();
        addr.set_raw(0xFFFF);
        assert_eq!(addr.raw(), 0x7FFF);
    }

    #[test]
    fn increment_wraps_within_fifteen_bits() {
        let mut addr = VramAddr::from(0x7FFF);
        addr.increment(1);
        assert_eq!(addr.raw(), 0x0000);
    }
}
