//! OAM sprite records.
//!
//! OAM stays a plain byte array so DMA remains byte-for-byte; rendering code
//! decodes records through explicit offset arithmetic instead of
//! reinterpreting the backing storage.

/// Bytes per OAM entry (Y, tile id, attributes, X).
pub const BYTES_PER_SPRITE: usize = 4;

/// Attribute bit: sprite drawn behind the background when set.
pub(crate) const ATTR_PRIORITY_BEHIND: u8 = 0x20;
/// Attribute bit: flip the sprite horizontally.
pub(crate) const ATTR_FLIP_H: u8 = 0x40;
/// Attribute bit: flip the sprite vertically.
pub(crate) const ATTR_FLIP_V: u8 = 0x80;

/// Decoded 4-byte OAM record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sprite {
    pub y: u8,
    pub tile: u8,
    pub attr: u8,
    pub x: u8,
}

impl Sprite {
    /// Decodes the `index`-th record from a backing OAM byte array.
    pub fn read(oam: &[u8], index: usize) -> Self {
        let base = index * BYTES_PER_SPRITE;
        Self {
            y: oam[base],
            tile: oam[base + 1],
            attr: oam[base + 2],
            x: oam[base + 3],
        }
    }

    /// Encodes this record into the `index`-th slot of a byte array.
    pub fn write(self, oam: &mut [u8], index: usize) {
        let base = index * BYTES_PER_SPRITE;
        oam[base] = self.y;
        oam[base + 1] = self.tile;
        oam[base + 2] = self.attr;
        oam[base + 3] = self.x;
    }

    /// Two-bit palette select, offset into the sprite half of palette RAM.
    pub(crate) fn palette(self) -> u8 {
        (self.attr & 0x03) + 0x04
    }

    pub(crate) fn behind_background(self) -> bool {
        self.attr & ATTR_PRIORITY_BEHIND != 0
    }

    pub(crate) fn flip_h(self) -> bool {
        self.attr & ATTR_FLIP_H != 0
    }

    pub(crate) fn flip_v(self) -> bool {
        self.attr & ATTR_FLIP_V != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_through_byte_array() {
        let mut oam = [0u8; 16];
        let sprite = Sprite {
            y: 10,
            tile: 0x42,
            attr: 0xE3,
            x: 200,
        };
        sprite.write(&mut oam, 2);
        assert_eq!(&oam[8..12], &[10, 0x42, 0xE3, 200]);
        assert_eq!(Sprite::read(&oam, 2), sprite);
    }

    #[test]
    fn attribute_decoding() {
        let sprite = Sprite {
            attr: ATTR_FLIP_V | ATTR_PRIORITY_BEHIND | 0x02,
            ..Default::default()
        };
        assert_eq!(sprite.palette(), 0x06);
        assert!(sprite.behind_background());
        assert!(sprite.flip_v());
        assert!(!sprite.flip_h());
    }
}
