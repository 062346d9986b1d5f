//! Opcode decode table.
//!
//! All 151 official opcodes with their addressing mode and base cycle
//! counts. The remaining entries decode as `Ill` and execute as logged
//! two-cycle no-ops.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    Ill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Instruction {
    pub(crate) mnemonic: Mnemonic,
    pub(crate) mode: AddrMode,
    /// Base cycle cost charged when the instruction executes.
    pub(crate) cycles: u8,
    /// Whether an index carry into the high address byte costs one more.
    pub(crate) page_penalty: bool,
}

impl Instruction {
    const fn new(mnemonic: Mnemonic, mode: AddrMode, cycles: u8, page_penalty: bool) -> Self {
        Self {
            mnemonic,
            mode,
            cycles,
            page_penalty,
        }
    }

    const fn ill() -> Self {
        Self::new(Mnemonic::Ill, AddrMode::Implied, 2, false)
    }
}

pub(crate) const LOOKUP: [Instruction; 256] = build_lookup();

#[rustfmt::skip]
const fn build_lookup() -> [Instruction; 256] {
    use AddrMode::*;
    use Mnemonic::*;

    let mut t = [Instruction::ill(); 256];

    t[0x69] = Instruction::new(Adc, Immediate, 2, false);
    t[0x65] = Instruction::new(Adc, ZeroPage, 3, false);
    t[0x75] = Instruction::new(Adc, ZeroPageX, 4, false);
    t[0x6D] = Instruction::new(Adc, Absolute, 4, false);
    t[0x7D] = Instruction::new(Adc, AbsoluteX, 4, true);
    t[0x79] = Instruction::new(Adc, AbsoluteY, 4, true);
    t[0x61] = Instruction::new(Adc, IndirectX, 6, false);
    t[0x71] = Instruction::new(Adc, IndirectY, 5, true);

    t[0x29] = Instruction::new(And, Immediate, 2, false);
    t[0x25] = Instruction::new(And, ZeroPage, 3, false);
    t[0x35] = Instruction::new(And, ZeroPageX, 4, false);
    t[0x2D] = Instruction::new(And, Absolute, 4, false);
    t[0x3D] = Instruction::new(And, AbsoluteX, 4, true);
    t[0x39] = Instruction::new(And, AbsoluteY, 4, true);
    t[0x21] = Instruction::new(And, IndirectX, 6, false);
    t[0x31] = Instruction::new(And, IndirectY, 5, true);

    t[0x0A] = Instruction::new(Asl, Accumulator, 2, false);
    t[0x06] = Instruction::new(Asl, ZeroPage, 5, false);
    t[0x16] = Instruction::new(Asl, ZeroPageX, 6, false);
    t[0x0E] = Instruction::new(Asl, Absolute, 6, false);
    t[0x1E] = Instruction::new(Asl, AbsoluteX, 7, false);

    t[0x90] = Instruction::new(Bcc, Relative, 2, false);
    t[0xB0] = Instruction::new(Bcs, Relative, 2, false);
    t[0xF0] = Instruction::new(Beq, Relative, 2, false);
    t[0x30] = Instruction::new(Bmi, Relative, 2, false);
    t[0xD0] = Instruction::new(Bne, Relative, 2, false);
    t[0x10] = Instruction::new(Bpl, Relative, 2, false);
    t[0x50] = Instruction::new(Bvc, Relative, 2, false);
    t[0x70] = Instruction::new(Bvs, Relative, 2, false);

    t[0x24] = Instruction::new(Bit, ZeroPage, 3, false);
    t[0x2C] = Instruction::new(Bit, Absolute, 4, false);

    t[0x00] = Instruction::new(Brk, Implied, 7, false);

    t[0x18] = Instruction::new(Clc, Implied, 2, false);
    t[0xD8] = Instruction::new(Cld, Implied, 2, false);
    t[0x58] = Instruction::new(Cli, Implied, 2, false);
    t[0xB8] = Instruction::new(Clv, Implied, 2, false);

    t[0xC9] = Instruction::new(Cmp, Immediate, 2, false);
    t[0xC5] = Instruction::new(Cmp, ZeroPage, 3, false);
    t[0xD5] = Instruction::new(Cmp, ZeroPageX, 4, false);
    t[0xCD] = Instruction::new(Cmp, Absolute, 4, false);
    t[0xDD] = Instruction::new(Cmp, AbsoluteX, 4, true);
    t[0xD9] = Instruction::new(Cmp, AbsoluteY, 4, true);
    t[0xC1] = Instruction::new(Cmp, IndirectX, 6, false);
    t[0xD1] = Instruction::new(Cmp, IndirectY, 5, true);

    t[0xE0] = Instruction::new(Cpx, Immediate, 2, false);
    t[0xE4] = Instruction::new(Cpx, ZeroPage, 3, false);
    t[0xEC] = Instruction::new(Cpx, Absolute, 4, false);

    t[0xC0] = Instruction::new(Cpy, Immediate, 2, false);
    t[0xC4] = Instruction::new(Cpy, ZeroPage, 3, false);
    t[0xCC] = Instruction::new(Cpy, Absolute, 4, false);

    t[0xC6] = Instruction::new(Dec, ZeroPage, 5, false);
    t[0xD6] = Instruction::new(Dec, ZeroPageX, 6, false);
    t[0xCE] = Instruction::new(Dec, Absolute, 6, false);
    t[0xDE] = Instruction::new(Dec, AbsoluteX, 7, false);

    t[0xCA] = Instruction::new(Dex, Implied, 2, false);
    t[0x88] = Instruction::new(Dey, Implied, 2, false);

    t[0x49] = Instruction::new(Eor, Immediate, 2, false);
    t[0x45] = Instruction::new(Eor, ZeroPage, 3, false);
    t[0x55] = Instruction::new(Eor, ZeroPageX, 4, false);
    t[0x4D] = Instruction::new(Eor, Absolute, 4, false);
    t[0x5D] = Instruction::new(Eor, AbsoluteX, 4, true);
    t[0x59] = Instruction::new(Eor, AbsoluteY, 4, true);
    t[0x41] = Instruction::new(Eor, IndirectX, 6, false);
    t[0x51] = Instruction::new(Eor, IndirectY, 5, true);

    t[0xE6] = Instruction::new(Inc, ZeroPage, 5, false);
    t[0xF6] = Instruction::new(Inc, ZeroPageX, 6, false);
    t[0xEE] = Instruction::new(Inc, Absolute, 6, false);
    t[0xFE] = Instruction::new(Inc, AbsoluteX, 7, false);

    t[0xE8] = Instruction::new(Inx, Implied, 2, false);
    t[0xC8] = Instruction::new(Iny, Implied, 2, false);

    t[0x4C] = Instruction::new(Jmp, Absolute, 3, false);
    t[0x6C] = Instruction::new(Jmp, Indirect, 5, false);
    t[0x20] = Instruction::new(Jsr, Absolute, 6, false);

    t[0xA9] = Instruction::new(Lda, Immediate, 2, false);
    t[0xA5] = Instruction::new(Lda, ZeroPage, 3, false);
    t[0xB5] = Instruction::new(Lda, ZeroPageX, 4, false);
    t[0xAD] = Instruction::new(Lda, Absolute, 4, false);
    t[0xBD] = Instruction::new(Lda, AbsoluteX, 4, true);
    t[0xB9] = Instruction::new(Lda, AbsoluteY, 4, true);
    t[0xA1] = Instruction::new(Lda, IndirectX, 6, false);
    t[0xB1] = Instruction::new(Lda, IndirectY, 5, true);

    t[0xA2] = Instruction::new(Ldx, Immediate, 2, false);
    t[0xA6] = Instruction::new(Ldx, ZeroPage, 3, false);
    t[0xB6] = Instruction::new(Ldx, ZeroPageY, 4, false);
    t[0xAE] = Instruction::new(Ldx, Absolute, 4, false);
    t[0xBE] = Instruction::new(Ldx, AbsoluteY, 4, true);

    t[0xA0] = Instruction::new(Ldy, Immediate, 2, false);
    t[0xA4] = Instruction::new(Ldy, ZeroPage, 3, false);
    t[0xB4] = Instruction::new(Ldy, ZeroPageX, 4, false);
    t[0xAC] = Instruction::new(Ldy, Absolute, 4, false);
    t[0xBC] = Instruction::new(Ldy, AbsoluteX, 4, true);

    t[0x4A] = Instruction::new(Lsr, Accumulator, 2, false);
    t[0x46] = Instruction::new(Lsr, ZeroPage, 5, false);
    t[0x56] = Instruction::new(Lsr, ZeroPageX, 6, false);
    t[0x4E] = Instruction::new(Lsr, Absolute, 6, false);
    t[0x5E] = Instruction::new(Lsr, AbsoluteX, 7, false);

    t[0xEA] = Instruction::new(Nop, Implied, 2, false);

    t[0x09] = Instruction::new(Ora, Immediate, 2, false);
    t[0x05] = Instruction::new(Ora, ZeroPage, 3, false);
    t[0x15] = Instruction::new(Ora, ZeroPageX, 4, false);
    t[0x0D] = Instruction::new(Ora, Absolute, 4, false);
    t[0x1D] = Instruction::new(Ora, AbsoluteX, 4, true);
    t[0x19] = Instruction::new(Ora, AbsoluteY, 4, true);
    t[0x01] = Instruction::new(Ora, IndirectX, 6, false);
    t[0x11] = Instruction::new(Ora, IndirectY, 5, true);

    t[0x48] = Instruction::new(Pha, Implied, 3, false);
    t[0x08] = Instruction::new(Php, Implied, 3, false);
    t[0x68] = Instruction::new(Pla, Implied, 4, false);
    t[0x28] = Instruction::new(Plp, Implied, 4, false);

    t[0x2A] = Instruction::new(Rol, Accumulator, 2, false);
    t[0x26] = Instruction::new(Rol, ZeroPage, 5, false);
    t[0x36] = Instruction::new(Rol, ZeroPageX, 6, false);
    t[0x2E] = Instruction::new(Rol, Absolute, 6, false);
    t[0x3E] = Instruction::new(Rol, AbsoluteX, 7, false);

    t[0x6A] = Instruction::new(Ror, Accumulator, 2, false);
    t[0x66] = Instruction::new(Ror, ZeroPage, 5, false);
    t[0x76] = Instruction::new(Ror, ZeroPageX, 6, false);
    t[0x6E] = Instruction::new(Ror, Absolute, 6, false);
    t[0x7E] = Instruction::new(Ror, AbsoluteX, 7, false);

    t[0x40] = Instruction::new(Rti, Implied, 6, false);
    t[0x60] = Instruction::new(Rts, Implied, 6, false);

    t[0xE9] = Instruction::new(Sbc, Immediate, 2, false);
    t[0xE5] = Instruction::new(Sbc, ZeroPage, 3, false);
    t[0xF5] = Instruction::new(Sbc, ZeroPageX, 4, false);
    t[0xED] = Instruction::new(Sbc, Absolute, 4, false);
    t[0xFD] = Instruction::new(Sbc, AbsoluteX, 4, true);
    t[0xF9] = Instruction::new(Sbc, AbsoluteY, 4, true);
    t[0xE1] = Instruction::new(Sbc, IndirectX, 6, false);
    t[0xF1] = Instruction::new(Sbc, IndirectY, 5, true);

    t[0x38] = Instruction::new(Sec, Implied, 2, false);
    t[0xF8] = Instruction::new(Sed, Implied, 2, false);
    t[0x78] = Instruction::new(Sei, Implied, 2, false);

    t[0x85] = Instruction::new(Sta, ZeroPage, 3, false);
    t[0x95] = Instruction::new(Sta, ZeroPageX, 4, false);
    t[0x8D] = Instruction::new(Sta, Absolute, 4, false);
    t[0x9D] = Instruction::new(Sta, AbsoluteX, 5, false);
    t[0x99] = Instruction::new(Sta, AbsoluteY, 5, false);
    t[0x81] = Instruction::new(Sta, IndirectX, 6, false);
    t[0x91] = Instruction::new(Sta, IndirectY, 6, false);

    t[0x86] = Instruction::new(Stx, ZeroPage, 3, false);
    t[0x96] = Instruction::new(Stx, ZeroPageY, 4, false);
    t[0x8E] = Instruction::new(Stx, Absolute, 4, false);

    t[0x84] = Instruction::new(Sty, ZeroPage, 3, false);
    t[0x94] = Instruction::new(Sty, ZeroPageX, 4, false);
    t[0x8C] = Instruction::new(Sty, Absolute, 4, false);

    t[0xAA] = Instruction::new(Tax, Implied, 2, false);
    t[0xA8] = Instruction::new(Tay, Implied, 2, false);
    t[0xBA] = Instruction::new(Tsx, Implied, 2, false);
    t[0x8A] = Instruction::new(Txa, Implied, 2, false);
    t[0x9A] = Instruction::new(Txs, Implied, 2, false);
    t[0x98] = Instruction::new(Tya, Implied, 2, false);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_opcode_count() {
        let official = LOOKUP
            .iter()
            .filter(|i| i.mnemonic != Mnemonic::Ill)
            .count();
        assert_eq!(official, 151);
    }

    #[test]
    fn stores_never_take_page_penalties() {
        for instr in LOOKUP {
            if matches!(instr.mnemonic, Mnemonic::Sta | Mnemonic::Stx | Mnemonic::Sty) {
                assert!(!instr.page_penalty);
            }
        }
    }
}
