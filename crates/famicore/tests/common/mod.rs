#![allow(dead_code)]

use anyhow::Result;
use famicore::Nes;

pub const ORIGIN: u16 = 0x8000;
/// 16 KiB PRG bank as counted by the iNES header.
const PRG_BANK: usize = 0x4000;

/// Builds a minimal NROM image (one PRG bank, CHR RAM): `program` at
/// `$8000`, unused PRG filled with NOPs, vectors as given.
pub fn nrom_image(program: &[u8], reset: u16, nmi: u16) -> Vec<u8> {
    let mut prg = vec![0xEA; PRG_BANK];
    prg[..program.len()].copy_from_slice(program);
    prg[0x3FFA..0x3FFC].copy_from_slice(&nmi.to_le_bytes());
    prg[0x3FFC..0x3FFE].copy_from_slice(&reset.to_le_bytes());

    let mut image = Vec::with_capacity(16 + prg.len());
    image.extend_from_slice(b"NES\x1a");
    image.extend_from_slice(&[1, 0, 0, 0]);
    image.extend_from_slice(&[0; 8]);
    image.extend_from_slice(&prg);
    image
}

/// Boots a console with `program` at the reset vector.
pub fn boot(program: &[u8]) -> Result<Nes> {
    let mut nes = Nes::new();
    nes.load_rom(&nrom_image(program, ORIGIN, ORIGIN))?;
    Ok(nes)
}

/// Clocks until the CPU sits at an instruction boundary at `pc`, or panics
/// after `max_ticks` master clocks.
pub fn run_until_pc(nes: &mut Nes, pc: u16, max_ticks: u64) {
    for _ in 0..max_ticks {
        nes.clock();
        if nes.cpu().pc() == pc && nes.cpu().at_instruction_boundary() {
            return;
        }
    }
    panic!(
        "CPU never reached {pc:#06X} within {max_ticks} ticks (stuck at {:#06X})",
        nes.cpu().pc()
    );
}
