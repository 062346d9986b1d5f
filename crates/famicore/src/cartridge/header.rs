//! iNES (1.0) header parsing.
//!
//! The loader collaborator hands the core a raw `.nes` image; everything the
//! hardware model needs (bank counts, mapper id, mirroring, trainer presence)
//! comes out of the first 16 bytes parsed here.

use bitflags::bitflags;

use crate::error::Error;

/// Length of the iNES header in bytes.
pub const INES_HEADER_LEN: usize = 16;

/// Magic number at the start of every iNES image ("NES" + MS-DOS EOF).
pub const INES_MAGIC: [u8; 4] = *b"NES\x1a";

bitflags! {
    /// iNES flags 6: mirroring, battery, trainer, and the low mapper nibble.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        /// Vertical mirroring when set, horizontal when clear.
        const MIRROR_VERTICAL = 0b0000_0001;
        /// Battery-backed PRG RAM present.
        const BATTERY = 0b0000_0010;
        /// 512-byte trainer block between header and PRG data.
        const TRAINER = 0b0000_0100;
        /// Cartridge provides four-screen VRAM (ignores the mirroring bit).
        const FOUR_SCREEN = 0b0000_1000;
        /// Low nibble of the mapper id.
        const MAPPER_LO = 0b1111_0000;
    }
}

bitflags! {
    /// iNES flags 7: console type bits and the high mapper nibble.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags7: u8 {
        const VS_UNISYSTEM = 0b0000_0001;
        const PLAYCHOICE_10 = 0b0000_0010;
        /// High nibble of the mapper id.
        const MAPPER_HI = 0b1111_0000;
    }
}

/// Layout mirroring type for the PPU nametables.
///
/// Horizontal/Vertical come from the header; the one-screen modes exist for
/// mappers that switch a single nametable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    OneScreenLo,
    OneScreenHi,
}

/// Parsed iNES header fields the core consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// PRG ROM bank count (units of 16 KiB).
    pub prg_banks: u8,
    /// CHR ROM bank count (units of 8 KiB); zero means CHR RAM.
    pub chr_banks: u8,
    /// Mapper id combined from the flags 6/7 nibbles.
    pub mapper: u8,
    /// Nametable mirroring wired by the cartridge.
    pub mirroring: Mirroring,
    /// Whether a 512-byte trainer precedes PRG data.
    pub trainer_present: bool,
}

impl Header {
    /// Parses the 16-byte iNES header, rejecting short or unmagical input.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < INES_HEADER_LEN {
            return Err(Error::TooShort {
                actual: bytes.len(),
            });
        }
        if bytes[..4] != INES_MAGIC {
            return Err(Error::InvalidMagic);
        }

        let flags6 = Flags6::from_bits_retain(bytes[6]);
        let flags7 = Flags7::from_bits_retain(bytes[7]);

        let mapper = (flags7.bits() & 0xF0) | (flags6.bits() >> 4);
        let mirroring = if flags6.contains(Flags6::MIRROR_VERTICAL) {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(Self {
            prg_banks: bytes[4],
            chr_banks: bytes[5],
            mapper,
            mirroring,
            trainer_present: flags6.contains(Flags6::TRAINER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(prg: u8, chr: u8, flags6: u8, flags7: u8) -> [u8; INES_HEADER_LEN] {
        let mut bytes = [0u8; INES_HEADER_LEN];
        bytes[..4].copy_from_slice(&INES_MAGIC);
        bytes[4] = prg;
        bytes[5] = chr;
        bytes[6] = flags6;
        bytes[7] = flags7;
        bytes
    }

    #[test]
    fn parses_bank_counts_and_mirroring() {
        let header = Header::parse(&raw_header(2, 1, 0x01, 0x00)).unwrap();
        assert_eq!(header.prg_banks, 2);
        assert_eq!(header.chr_banks, 1);
        assert_eq!(header.mapper, 0);
        assert_eq!(header.mirroring, Mirroring::Vertical);
        assert!(!header.trainer_present);
    }

    #[test]
    fn combines_mapper_nibbles() {
        let header = Header::parse(&raw_header(1, 1, 0x40, 0x20)).unwrap();
        assert_eq!(header.mapper, 0x24);
    }

    #[test]
    fn flags_trainer_presence() {
        let header = Header::parse(&raw_header(1, 1, 0x04, 0x00)).unwrap();
        assert!(header.trainer_present);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = raw_header(1, 1, 0, 0);
        bytes[0] = b'X';
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidMagic)));
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            Header::parse(&[0u8; 4]),
            Err(Error::TooShort { actual: 4 })
        ));
    }
}
