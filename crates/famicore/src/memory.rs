//! Shared definitions for the NES memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and makes it easier to reference the original console
//! documentation while reading the code base.

/// CPU memory map details.
pub mod cpu {
    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// Reset vector low byte address (`$FFFC`).
    pub const RESET_VECTOR: u16 = 0xFFFC;
    /// NMI vector low byte address (`$FFFA`).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    /// IRQ/BRK vector low byte address (`$FFFE`).
    pub const IRQ_VECTOR: u16 = 0xFFFE;

    /// First byte of CPU internal RAM.
    pub const INTERNAL_RAM_START: u16 = 0x0000;
    /// Last mirrored internal RAM address visible to the CPU (`$1FFF`).
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    /// Size of the CPU internal RAM block (2 KiB mirrored through `$1FFF`).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask applied to mirror CPU RAM accesses within `$0000-$1FFF`.
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;

    /// First CPU address mapped to the PPU register mirror.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last CPU address mirrored to the PPU register set.
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// OAM DMA trigger register (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;
    /// Controller port 1 strobe/read address (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 read address (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// PRG ROM window start address (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Final CPU-visible address (`$FFFF`).
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

/// PPU register layout and VRAM mirror rules.
pub mod ppu {
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Size of the internal nametable RAM (CIRAM). The NES carries 2 KiB,
    /// mapped into `$2000-$2FFF` with mirroring selected by the cartridge.
    pub const CIRAM_SIZE: usize = 0x0800;
    /// Size of one logical nametable in bytes.
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;

    /// Address mask applied to every PPU VRAM access (14-bit space).
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (32 bytes mirrored every 32 bytes).
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Pattern table base address for table 1.
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Last pattern table address (`$1FFF`).
    pub const PATTERN_TABLE_END: u16 = 0x1FFF;
    /// Size of a single pattern table (4 KiB).
    pub const PATTERN_TABLE_SIZE: usize = 0x1000;

    /// Primary Object Attribute Memory (OAM) byte count.
    pub const OAM_RAM_SIZE: usize = 0x100;
    /// Secondary OAM byte count used during sprite evaluation.
    pub const SECONDARY_OAM_RAM_SIZE: usize = 0x20;

    /// CPU-visible PPU register indices after mirror decoding.
    pub const REG_CONTROL: u16 = 0x0000;
    pub const REG_MASK: u16 = 0x0001;
    pub const REG_STATUS: u16 = 0x0002;
    pub const REG_OAM_ADDR: u16 = 0x0003;
    pub const REG_OAM_DATA: u16 = 0x0004;
    pub const REG_SCROLL: u16 = 0x0005;
    pub const REG_ADDR: u16 = 0x0006;
    pub const REG_DATA: u16 = 0x0007;
}
