//! CHR access path between the PPU and the cartridge mapper.

use crate::cartridge::Cartridge;

/// Borrowed view the PPU uses for pattern-table space.
///
/// The cartridge (through its mapper) gets first refusal on every access;
/// the PPU's internal pattern tables back whatever the mapper declines.
#[derive(Debug)]
pub struct PatternBus<'a> {
    cartridge: Option<&'a mut Cartridge>,
}

impl<'a> PatternBus<'a> {
    pub fn new(cartridge: Option<&'a mut Cartridge>) -> Self {
        Self { cartridge }
    }

    /// CHR read through the mapper; `None` when declined or no cartridge.
    pub fn read(&self, addr: u16) -> Option<u8> {
        self.cartridge.as_ref().and_then(|cart| cart.ppu_read(addr))
    }

    /// CHR write through the mapper; reports whether it was claimed.
    pub fn write(&mut self, addr: u16, data: u8) -> bool {
        match self.cartridge.as_deref_mut() {
            Some(cart) => cart.ppu_write(addr, data),
            None => false,
        }
    }
}
