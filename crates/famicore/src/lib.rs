//! Cycle-accurate NES console core.
//!
//! The crate models the stock console: a 6502 CPU, the picture processing
//! unit, 2 KiB of internal RAM, two controller ports, OAM DMA and an iNES
//! cartridge with its mapper. [`Nes`] ties the pieces together and advances
//! them on the shared master clock, where the PPU runs every tick and the
//! CPU every third tick.
//!
//! ```no_run
//! use famicore::Nes;
//!
//! # fn main() -> Result<(), famicore::Error> {
//! let mut nes = Nes::new();
//! nes.load_rom(&std::fs::read("game.nes")?)?;
//! nes.run_frame();
//! let pixels = nes.frame().pixels();
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod ppu;

pub use bus::{Bus, CpuBus, OamDma};
pub use cartridge::{Cartridge, Mirroring, load_cartridge, load_cartridge_from_file};
pub use controller::{Button, Controller};
pub use cpu::{Cpu, CpuSnapshot};
pub use error::Error;
pub use ppu::{FrameBuffer, PatternBus, Ppu};

use mem_block::cpu::Ram;
use tracing::info;

/// PPU dots per CPU cycle.
pub const PPU_CLOCKS_PER_CPU_CLOCK: u64 = 3;

/// The console. Owns every device and the master clock that phases them.
#[derive(Debug, Default)]
pub struct Nes {
    cpu: Cpu,
    ppu: Ppu,
    ram: Ram,
    controllers: [Controller; 2],
    dma: OamDma,
    cartridge: Option<Cartridge>,
    master_clock: u64,
}

impl Nes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an iNES image, inserts it and resets the console.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let cartridge = load_cartridge(bytes)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    /// Reads an iNES file from disk, inserts it and resets the console.
    pub fn load_cartridge_from_file<P>(&mut self, path: P) -> Result<(), Error>
    where
        P: AsRef<std::path::Path>,
    {
        let cartridge = load_cartridge_from_file(path)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    /// Inserts a parsed cartridge and resets the console.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        info!(mapper = cartridge.header().mapper, "cartridge inserted");
        self.ppu.set_mirroring(cartridge.mirroring());
        self.cartridge = Some(cartridge);
        self.reset();
    }

    /// Resets CPU and PPU as the front-panel button does. RAM contents
    /// survive.
    pub fn reset(&mut self) {
        let mut bus = CpuBus::new(
            &mut self.ram,
            &mut self.ppu,
            self.cartridge.as_mut(),
            &mut self.controllers,
            &mut self.dma,
        );
        self.cpu.reset(&mut bus);
        self.ppu.reset();
        self.dma = OamDma::new();
        self.master_clock = 0;
    }

    /// Advances the console by one master clock tick: the PPU always, the
    /// CPU (or an in-flight DMA) on every third tick, and any NMI the PPU
    /// raised is delivered before the tick ends.
    pub fn clock(&mut self) {
        {
            let mut pattern = PatternBus::new(self.cartridge.as_mut());
            self.ppu.clock(&mut pattern);
        }

        if self.master_clock % PPU_CLOCKS_PER_CPU_CLOCK == 0 {
            let cpu_cycle = self.master_clock / PPU_CLOCKS_PER_CPU_CLOCK;
            let mut bus = CpuBus::new(
                &mut self.ram,
                &mut self.ppu,
                self.cartridge.as_mut(),
                &mut self.controllers,
                &mut self.dma,
            );
            if bus.dma_active() {
                bus.step_dma(cpu_cycle);
            } else {
                self.cpu.clock(&mut bus);
            }
        }

        if self.ppu.take_nmi() {
            let mut bus = CpuBus::new(
                &mut self.ram,
                &mut self.ppu,
                self.cartridge.as_mut(),
                &mut self.controllers,
                &mut self.dma,
            );
            self.cpu.nmi(&mut bus);
        }

        self.master_clock += 1;
    }

    /// Clocks until the PPU signals the end of the current frame.
    pub fn run_frame(&mut self) {
        loop {
            self.clock();
            if self.ppu.take_frame_complete() {
                break;
            }
        }
    }

    /// Applies a full button mask to one controller port.
    pub fn set_buttons(&mut self, port: usize, mask: u8) {
        self.controllers[port].set_buttons(mask);
    }

    /// Presses or releases a single button on one controller port.
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        self.controllers[port].set_button(button, pressed);
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.ppu.frame()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Snapshot of the CPU register file for tracing and assertions.
    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn master_clock(&self) -> u64 {
        self.master_clock
    }
}
