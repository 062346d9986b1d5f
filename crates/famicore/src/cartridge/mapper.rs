//! Cartridge address translation.
//!
//! Mappers are a closed, small set of bank-switching strategies, so they are
//! modeled as a tagged enum dispatched by mapper id rather than trait
//! objects. Each variant supplies four pure translation functions: given a
//! CPU- or PPU-space address, either decline (`None`) or yield an offset into
//! the owning PRG/CHR array.

use crate::error::Error;
use crate::memory::{cpu as cpu_mem, ppu as ppu_mem};

/// Active bank-switching strategy for a cartridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapper {
    Nrom(Nrom),
}

impl Mapper {
    /// Instantiates the mapper named by the header, or fails the load.
    pub fn from_id(id: u8, prg_banks: u8, chr_banks: u8) -> Result<Self, Error> {
        match id {
            0 => Ok(Self::Nrom(Nrom::new(prg_banks, chr_banks))),
            other => Err(Error::UnsupportedMapper(other)),
        }
    }

    /// Translates a CPU-space read address into a PRG offset.
    pub fn cpu_map_read(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(nrom) => nrom.cpu_map(addr),
        }
    }

    /// Translates a CPU-space write address into a PRG offset.
    pub fn cpu_map_write(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(nrom) => nrom.cpu_map(addr),
        }
    }

    /// Translates a PPU-space (pattern table) read address into a CHR offset.
    pub fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(nrom) => nrom.ppu_map(addr),
        }
    }

    /// Translates a PPU-space write address into a CHR offset.
    ///
    /// Writes are only permitted when the cartridge carries CHR RAM.
    pub fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(nrom) => nrom.ppu_map_write(addr),
        }
    }
}

/// Mapper 0 (NROM): no banking at all.
///
/// PRG is a fixed 16 KiB window mirrored twice (NROM-128) or a flat 32 KiB
/// window (NROM-256) at `$8000-$FFFF`; CHR maps straight through at
/// `$0000-$1FFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nrom {
    prg_banks: u8,
    chr_banks: u8,
}

impl Nrom {
    pub fn new(prg_banks: u8, chr_banks: u8) -> Self {
        Self {
            prg_banks,
            chr_banks,
        }
    }

    fn cpu_map(&self, addr: u16) -> Option<usize> {
        if addr >= cpu_mem::PRG_ROM_START {
            let mask = if self.prg_banks > 1 { 0x7FFF } else { 0x3FFF };
            Some((addr & mask) as usize)
        } else {
            None
        }
    }

    fn ppu_map(&self, addr: u16) -> Option<usize> {
        if addr <= ppu_mem::PATTERN_TABLE_END {
            Some(addr as usize)
        } else {
            None
        }
    }

    fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        if addr <= ppu_mem::PATTERN_TABLE_END && self.chr_banks == 0 {
            Some(addr as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_prg_bank_mirrors_16k_window() {
        let mapper = Mapper::from_id(0, 1, 1).unwrap();
        assert_eq!(mapper.cpu_map_read(0x8000), Some(0x0000));
        assert_eq!(mapper.cpu_map_read(0xC000), Some(0x0000));
        assert_eq!(mapper.cpu_map_read(0xFFFF), Some(0x3FFF));
    }

    #[test]
    fn double_prg_bank_uses_32k_window() {
        let mapper = Mapper::from_id(0, 2, 1).unwrap();
        assert_eq!(mapper.cpu_map_read(0x8000), Some(0x0000));
        assert_eq!(mapper.cpu_map_read(0xC000), Some(0x4000));
        assert_eq!(mapper.cpu_map_read(0xFFFF), Some(0x7FFF));
    }

    #[test]
    fn declines_cpu_addresses_below_prg_window() {
        let mapper = Mapper::from_id(0, 1, 1).unwrap();
        assert_eq!(mapper.cpu_map_read(0x7FFF), None);
        assert_eq!(mapper.cpu_map_read(0x0000), None);
    }

    #[test]
    fn chr_rom_rejects_writes_chr_ram_accepts() {
        let rom = Mapper::from_id(0, 1, 1).unwrap();
        assert_eq!(rom.ppu_map_write(0x0123), None);

        let ram = Mapper::from_id(0, 1, 0).unwrap();
        assert_eq!(ram.ppu_map_write(0x0123), Some(0x0123));
        assert_eq!(ram.ppu_map_write(0x2000), None);
    }

    #[test]
    fn unknown_mapper_id_is_a_load_error() {
        assert!(matches!(
            Mapper::from_id(4, 1, 1),
            Err(Error::UnsupportedMapper(4))
        ));
    }
}
