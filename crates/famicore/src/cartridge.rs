//! Cartridge model: PRG/CHR storage plus the active mapper.
//!
//! The cartridge gets first refusal on every CPU and PPU bus access; the
//! mapper decides whether an address belongs to it and where it lands in the
//! backing arrays. Construction is the only fallible operation in the core.

use std::{fs, path::Path};

use tracing::debug;

use crate::{
    cartridge::{
        header::{Header, INES_HEADER_LEN},
        mapper::Mapper,
    },
    error::Error,
};

pub mod header;
pub mod mapper;

pub use header::Mirroring;

/// Size of the optional trainer block between header and PRG data.
pub const TRAINER_SIZE: usize = 512;
/// One PRG bank as counted by the header (16 KiB).
pub const PRG_BANK_SIZE: usize = 0x4000;
/// One CHR bank as counted by the header (8 KiB).
pub const CHR_BANK_SIZE: usize = 0x2000;

#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    mapper: Mapper,
    prg: Box<[u8]>,
    chr: Box<[u8]>,
    /// CHR is writable RAM when the header advertises zero CHR banks.
    chr_is_ram: bool,
}

impl Cartridge {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mirroring(&self) -> Mirroring {
        self.header.mirroring
    }

    /// CPU-space read; `None` when the mapper declines the address.
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        self.mapper
            .cpu_map_read(addr)
            .map(|offset| self.prg[offset])
    }

    /// CPU-space write; reports whether the cartridge claimed the address.
    ///
    /// NROM PRG is ROM, so claimed writes land nowhere, but claiming still
    /// stops the bus from dispatching the address elsewhere.
    pub fn cpu_write(&mut self, addr: u16, _data: u8) -> bool {
        self.mapper.cpu_map_write(addr).is_some()
    }

    /// PPU-space (pattern table) read; `None` when the mapper declines.
    pub fn ppu_read(&self, addr: u16) -> Option<u8> {
        self.mapper
            .ppu_map_read(addr)
            .map(|offset| self.chr[offset])
    }

    /// PPU-space write; succeeds only for CHR RAM cartridges.
    pub fn ppu_write(&mut self, addr: u16, data: u8) -> bool {
        match self.mapper.ppu_map_write(addr) {
            Some(offset) => {
                self.chr[offset] = data;
                true
            }
            None => false,
        }
    }

    /// Whether CHR is backed by RAM rather than ROM.
    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }
}

/// Loads a cartridge from an in-memory iNES image.
pub fn load_cartridge(bytes: &[u8]) -> Result<Cartridge, Error> {
    let header_bytes = bytes.get(..INES_HEADER_LEN).ok_or(Error::TooShort {
        actual: bytes.len(),
    })?;
    let header = Header::parse(header_bytes)?;

    let mut cursor = INES_HEADER_LEN;
    if header.trainer_present {
        // Trainer contents are irrelevant to the hardware model; skip them.
        section(bytes, &mut cursor, TRAINER_SIZE, "trainer")?;
    }

    let prg = section(
        bytes,
        &mut cursor,
        header.prg_banks as usize * PRG_BANK_SIZE,
        "PRG ROM",
    )?
    .into_boxed_slice();

    let chr_is_ram = header.chr_banks == 0;
    let chr = if chr_is_ram {
        vec![0u8; CHR_BANK_SIZE].into_boxed_slice()
    } else {
        section(
            bytes,
            &mut cursor,
            header.chr_banks as usize * CHR_BANK_SIZE,
            "CHR ROM",
        )?
        .into_boxed_slice()
    };

    let mapper = Mapper::from_id(header.mapper, header.prg_banks, header.chr_banks)?;

    debug!(
        mapper = header.mapper,
        prg_banks = header.prg_banks,
        chr_banks = header.chr_banks,
        chr_is_ram,
        mirroring = ?header.mirroring,
        "cartridge loaded"
    );

    Ok(Cartridge {
        header,
        mapper,
        prg,
        chr,
        chr_is_ram,
    })
}

/// Loads a cartridge directly from disk.
pub fn load_cartridge_from_file<P>(path: P) -> Result<Cartridge, Error>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    load_cartridge(&bytes)
}

fn section(
    bytes: &[u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<Vec<u8>, Error> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let end = cursor.checked_add(len).ok_or(Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    })?;

    let slice = bytes.get(*cursor..end).ok_or(Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    })?;

    *cursor = end;
    Ok(slice.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::header::INES_MAGIC;

    fn image(prg_banks: u8, chr_banks: u8, flags6: u8) -> Vec<u8> {
        let mut bytes = vec![0u8; INES_HEADER_LEN];
        bytes[..4].copy_from_slice(&INES_MAGIC);
        bytes[4] = prg_banks;
        bytes[5] = chr_banks;
        bytes[6] = flags6;
        bytes.extend(std::iter::repeat_n(
            0xEAu8,
            prg_banks as usize * PRG_BANK_SIZE,
        ));
        bytes.extend(std::iter::repeat_n(
            0x11u8,
            chr_banks as usize * CHR_BANK_SIZE,
        ));
        bytes
    }

    #[test]
    fn loads_nrom_image() {
        let cart = load_cartridge(&image(1, 1, 0)).unwrap();
        assert_eq!(cart.header().prg_banks, 1);
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
        assert_eq!(cart.cpu_read(0x8000), Some(0xEA));
        assert_eq!(cart.cpu_read(0xC000), Some(0xEA));
        assert_eq!(cart.ppu_read(0x0000), Some(0x11));
        assert!(!cart.chr_is_ram());
    }

    #[test]
    fn declines_non_prg_cpu_addresses() {
        let cart = load_cartridge(&image(1, 1, 0)).unwrap();
        assert_eq!(cart.cpu_read(0x0000), None);
        assert_eq!(cart.cpu_read(0x4020), None);
    }

    #[test]
    fn substitutes_chr_ram_when_no_chr_banks() {
        let mut cart = load_cartridge(&image(1, 0, 0)).unwrap();
        assert!(cart.chr_is_ram());
        assert!(cart.ppu_write(0x0042, 0x99));
        assert_eq!(cart.ppu_read(0x0042), Some(0x99));
    }

    #[test]
    fn chr_rom_swallows_writes() {
        let mut cart = load_cartridge(&image(1, 1, 0)).unwrap();
        assert!(!cart.ppu_write(0x0042, 0x99));
        assert_eq!(cart.ppu_read(0x0042), Some(0x11));
    }

    #[test]
    fn trainer_block_is_skipped() {
        let mut bytes = vec![0u8; INES_HEADER_LEN];
        bytes[..4].copy_from_slice(&INES_MAGIC);
        bytes[4] = 1;
        bytes[5] = 0;
        bytes[6] = 0x04; // trainer present
        bytes.extend(std::iter::repeat_n(0x55u8, TRAINER_SIZE));
        bytes.extend(std::iter::repeat_n(0xABu8, PRG_BANK_SIZE));

        let cart = load_cartridge(&bytes).unwrap();
        assert_eq!(cart.cpu_read(0x8000), Some(0xAB));
    }

    #[test]
    fn short_prg_section_fails() {
        let mut bytes = image(2, 0, 0);
        bytes.truncate(INES_HEADER_LEN + PRG_BANK_SIZE);
        assert!(matches!(
            load_cartridge(&bytes),
            Err(Error::SectionTooShort {
                section: "PRG ROM",
                ..
            })
        ));
    }

    #[test]
    fn bad_magic_never_constructs_a_cartridge() {
        let mut bytes = image(1, 1, 0);
        bytes[1] = 0;
        assert!(matches!(load_cartridge(&bytes), Err(Error::InvalidMagic)));
    }
}
