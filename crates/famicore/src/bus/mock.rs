//! Flat 64 KiB bus for exercising the CPU in isolation.

use crate::bus::Bus;
use crate::memory::cpu as cpu_mem;

pub(crate) struct MockBus {
    mem: Box<[u8; 0x10000]>,
}

impl MockBus {
    pub(crate) fn new() -> Self {
        Self {
            mem: Box::new([0; 0x10000]),
        }
    }

    /// Copies `program` into memory at `addr` and points the reset vector
    /// at it.
    pub(crate) fn with_program(addr: u16, program: &[u8]) -> Self {
        let mut bus = Self::new();
        for (i, &byte) in program.iter().enumerate() {
            bus.mem[usize::from(addr) + i] = byte;
        }
        let [lo, hi] = addr.to_le_bytes();
        bus.mem[usize::from(cpu_mem::RESET_VECTOR)] = lo;
        bus.mem[usize::from(cpu_mem::RESET_VECTOR) + 1] = hi;
        bus
    }

    pub(crate) fn set_vector(&mut self, vector: u16, target: u16) {
        let [lo, hi] = target.to_le_bytes();
        self.mem[usize::from(vector)] = lo;
        self.mem[usize::from(vector) + 1] = hi;
    }
}

impl Bus for MockBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[usize::from(addr)]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mem[usize::from(addr)] = data;
    }
}
