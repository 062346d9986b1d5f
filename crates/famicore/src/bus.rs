//! CPU-side address decoding.

pub(crate) mod dma;
#[cfg(test)]
pub(crate) mod mock;

use tracing::trace;

use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::mem_block::cpu::Ram;
use crate::memory::cpu as cpu_mem;
use crate::ppu::{PatternBus, Ppu};

pub use dma::OamDma;

/// Byte-addressed view the CPU executes against.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Little-endian 16-bit read, used for vectors and pointers.
    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }
}

/// Borrowed view over the console's CPU-visible devices.
///
/// The cartridge gets first refusal on every access; internal devices
/// decode only the addresses it declines.
pub struct CpuBus<'a> {
    ram: &'a mut Ram,
    ppu: &'a mut Ppu,
    cartridge: Option<&'a mut Cartridge>,
    controllers: &'a mut [Controller; 2],
    dma: &'a mut OamDma,
}

impl<'a> CpuBus<'a> {
    pub fn new(
        ram: &'a mut Ram,
        ppu: &'a mut Ppu,
        cartridge: Option<&'a mut Cartridge>,
        controllers: &'a mut [Controller; 2],
        dma: &'a mut OamDma,
    ) -> Self {
        Self {
            ram,
            ppu,
            cartridge,
            controllers,
            dma,
        }
    }

    pub fn dma_active(&self) -> bool {
        self.dma.is_active()
    }

    /// Advances an in-flight OAM DMA by one CPU cycle.
    ///
    /// The engine idles until an odd cycle aligns it, then alternates
    /// read (even) and write (odd) cycles until all 256 bytes have been
    /// copied into OAM.
    pub fn step_dma(&mut self, cpu_cycle: u64) {
        if self.dma.waiting_for_alignment() {
            if cpu_cycle % 2 == 1 {
                self.dma.align();
            }
            return;
        }
        if cpu_cycle % 2 == 0 {
            let addr = (u16::from(self.dma.page()) << 8) | u16::from(self.dma.cursor());
            let data = self.read(addr);
            self.dma.stage(data);
        } else {
            let (cursor, data) = self.dma.commit();
            self.ppu.oam_dma_write(cursor, data);
        }
    }
}

impl Bus for CpuBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        if let Some(cart) = self.cartridge.as_deref_mut()
            && let Some(data) = cart.cpu_read(addr)
        {
            return data;
        }
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram.read(usize::from(addr & cpu_mem::INTERNAL_RAM_MASK))
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let pattern = PatternBus::new(self.cartridge.as_deref_mut());
                self.ppu.cpu_read(addr, &pattern)
            }
            cpu_mem::CONTROLLER_PORT_1 => self.controllers[0].read(),
            cpu_mem::CONTROLLER_PORT_2 => self.controllers[1].read(),
            _ => {
                trace!(addr = format_args!("{addr:#06X}"), "read from unmapped address");
                0
            }
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let Some(cart) = self.cartridge.as_deref_mut()
            && cart.cpu_write(addr, data)
        {
            return;
        }
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram
                    .write(usize::from(addr & cpu_mem::INTERNAL_RAM_MASK), data);
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let mut pattern = PatternBus::new(self.cartridge.as_deref_mut());
                self.ppu.cpu_write(addr, data, &mut pattern);
            }
            cpu_mem::OAM_DMA => {
                self.dma.begin(data);
            }
            cpu_mem::CONTROLLER_PORT_1 => {
                // Any strobe write latches both pads.
                self.controllers[0].latch();
                self.controllers[1].latch();
            }
            _ => {
                trace!(
                    addr = format_args!("{addr:#06X}"),
                    data,
                    "write to unmapped address"
                );
            }
        }
    }
}
