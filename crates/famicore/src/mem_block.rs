use core::ops::{Deref, DerefMut};

/// Fixed-size memory block backing the console's internal RAMs.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemBlock<T, const N: usize>([T; N]);

/// Convenience alias for a `MemBlock` of bytes.
pub type ByteBlock<const N: usize> = MemBlock<u8, N>;

pub mod cpu {
    use crate::memory::cpu as cpu_mem;

    /// CPU internal RAM (2 KiB, mirrored through `$1FFF`).
    pub type Ram = super::ByteBlock<{ cpu_mem::INTERNAL_RAM_SIZE }>;
}

pub mod ppu {
    use crate::memory::ppu as ppu_mem;

    /// Internal nametable RAM (CIRAM).
    pub type Ciram = super::ByteBlock<{ ppu_mem::CIRAM_SIZE }>;
    pub type PaletteRam = super::ByteBlock<{ ppu_mem::PALETTE_RAM_SIZE }>;
    pub type OamRam = super::ByteBlock<{ ppu_mem::OAM_RAM_SIZE }>;
    pub type SecondaryOamRam = super::ByteBlock<{ ppu_mem::SECONDARY_OAM_RAM_SIZE }>;
    /// Cartridge-less pattern table fallback (one 4 KiB table).
    pub type PatternTable = super::ByteBlock<{ ppu_mem::PATTERN_TABLE_SIZE }>;
}

impl<T: Copy + Default, const N: usize> MemBlock<T, N> {
    pub fn new() -> Self {
        Self([T::default(); N])
    }
}

impl<T, const N: usize> MemBlock<T, N> {
    pub fn read(&self, addr: usize) -> T
    where
        T: Copy,
    {
        self.0[addr]
    }

    pub fn write(&mut self, addr: usize, value: T) {
        self.0[addr] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T: Copy + Default, const N: usize> Default for MemBlock<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for MemBlock<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, const N: usize> DerefMut for MemBlock<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
