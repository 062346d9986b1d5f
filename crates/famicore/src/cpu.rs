//! 6502 core.
//!
//! The core executes an instruction in full on the first clock of its
//! window and then burns the remaining cycles as debt, so bus traffic is
//! front-loaded but instruction boundaries land on the documented cycle
//! counts, including page-cross and branch penalties.

mod lookup;
mod status;

use tracing::debug;

use crate::bus::Bus;
use crate::memory::cpu as cpu_mem;

use lookup::{AddrMode, Instruction, LOOKUP, Mnemonic};
pub use status::Status;

/// Startup debt charged by [`Cpu::reset`].
const RESET_CYCLES: u8 = 8;
/// Debt charged when an interrupt is taken.
const INTERRUPT_CYCLES: u8 = 7;
/// Stack pointer after reset.
const SP_POWER_UP: u8 = 0xFD;

/// Register-file snapshot for tracing and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
    pub total_cycles: u64,
}

/// Resolved operand location plus whether indexing carried into the high
/// address byte.
#[derive(Debug, Clone, Copy)]
struct Operand {
    addr: u16,
    page_crossed: bool,
}

#[derive(Debug)]
pub struct Cpu {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    pc: u16,
    status: Status,
    /// Remaining debt cycles of the instruction in flight.
    cycles: u8,
    total_cycles: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: SP_POWER_UP,
            pc: 0,
            status: Status::power_up(),
            cycles: 0,
            total_cycles: 0,
        }
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Total clocks consumed since power-up.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Copies the register file out for tracing and assertions.
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
            total_cycles: self.total_cycles,
        }
    }

    /// `true` when the next clock starts a new instruction.
    pub fn at_instruction_boundary(&self) -> bool {
        self.cycles == 0
    }

    /// Loads the reset vector and charges the startup debt. Register state
    /// returns to the power-up values.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = SP_POWER_UP;
        self.status = Status::power_up();
        self.pc = bus.read_u16(cpu_mem::RESET_VECTOR);
        self.cycles = RESET_CYCLES;
    }

    /// Advances the CPU by one cycle. The instruction executes in full
    /// when its window opens; subsequent calls only pay down the debt.
    pub fn clock(&mut self, bus: &mut impl Bus) {
        if self.cycles == 0 {
            self.step(bus);
        }
        self.cycles -= 1;
        self.total_cycles += 1;
    }

    /// Services a non-maskable interrupt: pushes the return state and
    /// jumps through `$FFFA`.
    pub fn nmi(&mut self, bus: &mut impl Bus) {
        self.interrupt(bus, cpu_mem::NMI_VECTOR);
    }

    /// Services a maskable interrupt request through `$FFFE`, unless the
    /// interrupt-disable flag is set.
    pub fn irq(&mut self, bus: &mut impl Bus) {
        if !self.status.contains(Status::INTERRUPT_DISABLE) {
            self.interrupt(bus, cpu_mem::IRQ_VECTOR);
        }
    }

    fn interrupt(&mut self, bus: &mut impl Bus, vector: u16) {
        self.push_u16(bus, self.pc);
        self.push_status(bus);
        self.status.insert(Status::INTERRUPT_DISABLE);
        self.pc = bus.read_u16(vector);
        self.cycles = INTERRUPT_CYCLES;
    }

    fn step(&mut self, bus: &mut impl Bus) {
        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        let instr = LOOKUP[usize::from(opcode)];
        self.cycles = instr.cycles;
        let operand = self.resolve(bus, instr.mode);
        self.execute(bus, opcode, instr, operand);
        if operand.page_crossed && instr.page_penalty {
            self.cycles += 1;
        }
    }

    fn resolve(&mut self, bus: &mut impl Bus, mode: AddrMode) -> Operand {
        let mut page_crossed = false;
        let addr = match mode {
            AddrMode::Implied | AddrMode::Accumulator => 0,
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            AddrMode::ZeroPage => {
                let addr = u16::from(bus.read(self.pc));
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            AddrMode::ZeroPageX => {
                let base = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                u16::from(base.wrapping_add(self.x))
            }
            AddrMode::ZeroPageY => {
                let base = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                u16::from(base.wrapping_add(self.y))
            }
            AddrMode::Relative => {
                let offset = bus.read(self.pc) as i8;
                self.pc = self.pc.wrapping_add(1);
                let target = self.pc.wrapping_add_signed(i16::from(offset));
                page_crossed = (target & 0xFF00) != (self.pc & 0xFF00);
                target
            }
            AddrMode::Absolute => {
                let addr = bus.read_u16(self.pc);
                self.pc = self.pc.wrapping_add(2);
                addr
            }
            AddrMode::AbsoluteX => {
                let base = bus.read_u16(self.pc);
                self.pc = self.pc.wrapping_add(2);
                let addr = base.wrapping_add(u16::from(self.x));
                page_crossed = (base & 0xFF00) != (addr & 0xFF00);
                addr
            }
            AddrMode::AbsoluteY => {
                let base = bus.read_u16(self.pc);
                self.pc = self.pc.wrapping_add(2);
                let addr = base.wrapping_add(u16::from(self.y));
                page_crossed = (base & 0xFF00) != (addr & 0xFF00);
                addr
            }
            AddrMode::Indirect => {
                let ptr = bus.read_u16(self.pc);
                self.pc = self.pc.wrapping_add(2);
                // Hardware quirk: the pointer's high byte is fetched from
                // the start of the same page when the low byte is $FF.
                let lo = bus.read(ptr);
                let hi = if ptr & 0x00FF == 0x00FF {
                    bus.read(ptr & 0xFF00)
                } else {
                    bus.read(ptr.wrapping_add(1))
                };
                u16::from_le_bytes([lo, hi])
            }
            AddrMode::IndirectX => {
                let zp = bus.read(self.pc).wrapping_add(self.x);
                self.pc = self.pc.wrapping_add(1);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                u16::from_le_bytes([lo, hi])
            }
            AddrMode::IndirectY => {
                let zp = bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(u16::from(self.y));
                page_crossed = (base & 0xFF00) != (addr & 0xFF00);
                addr
            }
        };
        Operand { addr, page_crossed }
    }

    fn fetch(&mut self, bus: &mut impl Bus, mode: AddrMode, addr: u16) -> u8 {
        if mode == AddrMode::Accumulator {
            self.a
        } else {
            bus.read(addr)
        }
    }

    fn execute(&mut self, bus: &mut impl Bus, opcode: u8, instr: Instruction, operand: Operand) {
        let mode = instr.mode;
        let addr = operand.addr;
        match instr.mnemonic {
            Mnemonic::Lda => {
                self.a = self.fetch(bus, mode, addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ldx => {
                self.x = self.fetch(bus, mode, addr);
                self.status.set_zn(self.x);
            }
            Mnemonic::Ldy => {
                self.y = self.fetch(bus, mode, addr);
                self.status.set_zn(self.y);
            }
            Mnemonic::Sta => bus.write(addr, self.a),
            Mnemonic::Stx => bus.write(addr, self.x),
            Mnemonic::Sty => bus.write(addr, self.y),

            Mnemonic::Adc => {
                let value = self.fetch(bus, mode, addr);
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = self.fetch(bus, mode, addr);
                self.adc(value ^ 0xFF);
            }
            Mnemonic::And => {
                self.a &= self.fetch(bus, mode, addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ora => {
                self.a |= self.fetch(bus, mode, addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Eor => {
                self.a ^= self.fetch(bus, mode, addr);
                self.status.set_zn(self.a);
            }
            Mnemonic::Bit => {
                let value = self.fetch(bus, mode, addr);
                self.status.set(Status::ZERO, self.a & value == 0);
                self.status.set(Status::NEGATIVE, value & 0x80 != 0);
                self.status.set(Status::OVERFLOW, value & 0x40 != 0);
            }
            Mnemonic::Cmp => {
                let value = self.fetch(bus, mode, addr);
                self.compare(self.a, value);
            }
            Mnemonic::Cpx => {
                let value = self.fetch(bus, mode, addr);
                self.compare(self.x, value);
            }
            Mnemonic::Cpy => {
                let value = self.fetch(bus, mode, addr);
                self.compare(self.y, value);
            }

            Mnemonic::Asl => self.rmw(bus, mode, addr, |cpu, v| {
                cpu.status.set(Status::CARRY, v & 0x80 != 0);
                v << 1
            }),
            Mnemonic::Lsr => self.rmw(bus, mode, addr, |cpu, v| {
                cpu.status.set(Status::CARRY, v & 0x01 != 0);
                v >> 1
            }),
            Mnemonic::Rol => self.rmw(bus, mode, addr, |cpu, v| {
                let carry_in = u8::from(cpu.status.contains(Status::CARRY));
                cpu.status.set(Status::CARRY, v & 0x80 != 0);
                (v << 1) | carry_in
            }),
            Mnemonic::Ror => self.rmw(bus, mode, addr, |cpu, v| {
                let carry_in = u8::from(cpu.status.contains(Status::CARRY));
                cpu.status.set(Status::CARRY, v & 0x01 != 0);
                (v >> 1) | (carry_in << 7)
            }),
            Mnemonic::Inc => self.rmw(bus, mode, addr, |_, v| v.wrapping_add(1)),
            Mnemonic::Dec => self.rmw(bus, mode, addr, |_, v| v.wrapping_sub(1)),

            Mnemonic::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Mnemonic::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }

            Mnemonic::Jmp => self.pc = addr,
            Mnemonic::Jsr => {
                self.push_u16(bus, self.pc.wrapping_sub(1));
                self.pc = addr;
            }
            Mnemonic::Rts => {
                self.pc = self.pop_u16(bus).wrapping_add(1);
            }
            Mnemonic::Brk => {
                // BRK skips the byte after the opcode.
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(bus, self.pc);
                self.push_status(bus);
                self.status.insert(Status::INTERRUPT_DISABLE);
                self.pc = bus.read_u16(cpu_mem::IRQ_VECTOR);
            }
            Mnemonic::Rti => {
                self.pop_status(bus);
                self.pc = self.pop_u16(bus);
            }

            Mnemonic::Bcc => self.branch(operand, !self.status.contains(Status::CARRY)),
            Mnemonic::Bcs => self.branch(operand, self.status.contains(Status::CARRY)),
            Mnemonic::Bne => self.branch(operand, !self.status.contains(Status::ZERO)),
            Mnemonic::Beq => self.branch(operand, self.status.contains(Status::ZERO)),
            Mnemonic::Bpl => self.branch(operand, !self.status.contains(Status::NEGATIVE)),
            Mnemonic::Bmi => self.branch(operand, self.status.contains(Status::NEGATIVE)),
            Mnemonic::Bvc => self.branch(operand, !self.status.contains(Status::OVERFLOW)),
            Mnemonic::Bvs => self.branch(operand, self.status.contains(Status::OVERFLOW)),

            Mnemonic::Pha => self.push(bus, self.a),
            Mnemonic::Php => self.push_status(bus),
            Mnemonic::Pla => {
                self.a = self.pop(bus);
                self.status.set_zn(self.a);
            }
            Mnemonic::Plp => self.pop_status(bus),

            Mnemonic::Clc => self.status.remove(Status::CARRY),
            Mnemonic::Sec => self.status.insert(Status::CARRY),
            Mnemonic::Cli => self.status.remove(Status::INTERRUPT_DISABLE),
            Mnemonic::Sei => self.status.insert(Status::INTERRUPT_DISABLE),
            Mnemonic::Cld => self.status.remove(Status::DECIMAL),
            Mnemonic::Sed => self.status.insert(Status::DECIMAL),
            Mnemonic::Clv => self.status.remove(Status::OVERFLOW),

            Mnemonic::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Mnemonic::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Mnemonic::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Mnemonic::Txs => self.sp = self.x,

            Mnemonic::Nop => {}
            Mnemonic::Ill => {
                debug!(
                    opcode = format_args!("{opcode:#04X}"),
                    pc = format_args!("{:#06X}", self.pc.wrapping_sub(1)),
                    "unofficial opcode executed as NOP"
                );
            }
        }
    }

    fn adc(&mut self, value: u8) {
        let sum = u16::from(self.a)
            + u16::from(value)
            + u16::from(self.status.contains(Status::CARRY));
        let result = sum as u8;
        self.status.set(Status::CARRY, sum > 0xFF);
        // Overflow when both operands share a sign the result does not.
        self.status.set(
            Status::OVERFLOW,
            !(self.a ^ value) & (self.a ^ result) & 0x80 != 0,
        );
        self.a = result;
        self.status.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::CARRY, register >= value);
        self.status.set_zn(register.wrapping_sub(value));
    }

    fn rmw(
        &mut self,
        bus: &mut impl Bus,
        mode: AddrMode,
        addr: u16,
        op: impl FnOnce(&mut Self, u8) -> u8,
    ) {
        if mode == AddrMode::Accumulator {
            let result = op(self, self.a);
            self.a = result;
            self.status.set_zn(result);
        } else {
            let value = bus.read(addr);
            let result = op(self, value);
            bus.write(addr, result);
            self.status.set_zn(result);
        }
    }

    /// Taken branches cost one extra cycle, two when the target sits on a
    /// different page than the next instruction.
    fn branch(&mut self, operand: Operand, taken: bool) {
        if taken {
            self.cycles += 1 + u8::from(operand.page_crossed);
            self.pc = operand.addr;
        }
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(cpu_mem::STACK_PAGE_START + u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(cpu_mem::STACK_PAGE_START + u16::from(self.sp))
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    fn pop_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn push_status(&mut self, bus: &mut impl Bus) {
        let copy = self.status | Status::BREAK | Status::UNUSED;
        self.push(bus, copy.bits());
    }

    fn pop_status(&mut self, bus: &mut impl Bus) {
        self.status = Status::from_bits_retain(self.pop(bus));
        self.status.insert(Status::UNUSED);
        self.status.remove(Status::BREAK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::MockBus;

    const ORIGIN: u16 = 0x8000;

    fn setup(program: &[u8]) -> (Cpu, MockBus) {
        let mut bus = MockBus::with_program(ORIGIN, program);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.cycles = 0;
        (cpu, bus)
    }

    /// Runs exactly one instruction, returning its cycle cost.
    fn run_one(cpu: &mut Cpu, bus: &mut MockBus) -> u64 {
        let start = cpu.total_cycles();
        loop {
            cpu.clock(bus);
            if cpu.at_instruction_boundary() {
                break;
            }
        }
        cpu.total_cycles() - start
    }

    #[test]
    fn reset_charges_startup_debt() {
        let mut bus = MockBus::with_program(ORIGIN, &[0xEA]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        assert_eq!(cpu.pc(), ORIGIN);
        assert_eq!(cpu.sp(), 0xFD);
        assert_eq!(cpu.status(), Status::UNUSED | Status::INTERRUPT_DISABLE);
        assert_eq!(cpu.cycles, 8);
    }

    #[test]
    fn lda_immediate_sets_flags() {
        let (mut cpu, mut bus) = setup(&[0xA9, 0x00, 0xA9, 0x80]);
        assert_eq!(run_one(&mut cpu, &mut bus), 2);
        assert_eq!(cpu.a(), 0);
        assert!(cpu.status().contains(Status::ZERO));

        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.a(), 0x80);
        assert!(cpu.status().contains(Status::NEGATIVE));
        assert!(!cpu.status().contains(Status::ZERO));
    }

    #[test]
    fn adc_sets_carry_and_overflow() {
        // $80 + $FF = $17F: carry out, and two negatives produced $7F.
        let (mut cpu, mut bus) = setup(&[0xA9, 0x80, 0x69, 0xFF]);
        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.a(), 0x7F);
        assert!(cpu.status().contains(Status::CARRY));
        assert!(cpu.status().contains(Status::OVERFLOW));
        assert!(!cpu.status().contains(Status::NEGATIVE));
    }

    #[test]
    fn sbc_borrows_through_inverted_carry() {
        // SEC; LDA #$03; SBC #$05 -> $FE with carry clear (borrow).
        let (mut cpu, mut bus) = setup(&[0x38, 0xA9, 0x03, 0xE9, 0x05]);
        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.a(), 0xFE);
        assert!(!cpu.status().contains(Status::CARRY));
        assert!(cpu.status().contains(Status::NEGATIVE));
    }

    #[test]
    fn indexed_read_pays_page_cross_penalty() {
        // LDA $12F0,X with X=$20 crosses into page $13.
        let (mut cpu, mut bus) = setup(&[0xA2, 0x20, 0xBD, 0xF0, 0x12]);
        bus.write(0x1310, 0x55);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 5);
        assert_eq!(cpu.a(), 0x55);

        // Same access without the cross costs the base four cycles.
        let (mut cpu, mut bus) = setup(&[0xA2, 0x01, 0xBD, 0xF0, 0x12]);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 4);
    }

    #[test]
    fn indexed_store_never_pays_the_penalty() {
        // STA $12F0,X with X=$20: always five cycles.
        let (mut cpu, mut bus) = setup(&[0xA2, 0x20, 0xA9, 0x7E, 0x9D, 0xF0, 0x12]);
        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 5);
        assert_eq!(bus.read(0x1310), 0x7E);
    }

    #[test]
    fn zero_page_indexing_wraps_within_the_page() {
        let (mut cpu, mut bus) = setup(&[0xA2, 0x02, 0xB5, 0xFF]);
        bus.write(0x0001, 0x99);
        run_one(&mut cpu, &mut bus);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.a(), 0x99);
    }

    #[test]
    fn branch_cycle_costs() {
        // Not taken: 2.
        let (mut cpu, mut bus) = setup(&[0xB0, 0x10]);
        assert_eq!(run_one(&mut cpu, &mut bus), 2);

        // Taken, same page: 3.
        let (mut cpu, mut bus) = setup(&[0x18, 0x90, 0x10]);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 3);
        assert_eq!(cpu.pc(), ORIGIN + 3 + 0x10);

        // Taken, crossing a page boundary: 4.
        let mut bus = MockBus::with_program(0x80F0, &[0x18, 0x90, 0x7F]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.cycles = 0;
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 4);
        assert_eq!(cpu.pc(), 0x80F3 + 0x7F);
    }

    #[test]
    fn jmp_indirect_page_wrap_quirk() {
        let (mut cpu, mut bus) = setup(&[0x6C, 0xFF, 0x02]);
        bus.write(0x02FF, 0x34);
        bus.write(0x0300, 0x99); // must not be used
        bus.write(0x0200, 0x12);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn jsr_rts_round_trip() {
        // JSR $8010 ... RTS back to the following instruction.
        let (mut cpu, mut bus) = setup(&[0x20, 0x10, 0x80]);
        bus.write(0x8010, 0x60);
        assert_eq!(run_one(&mut cpu, &mut bus), 6);
        assert_eq!(cpu.pc(), 0x8010);
        assert_eq!(cpu.sp(), 0xFB);
        assert_eq!(run_one(&mut cpu, &mut bus), 6);
        assert_eq!(cpu.pc(), ORIGIN + 3);
        assert_eq!(cpu.sp(), 0xFD);
    }

    #[test]
    fn unused_bit_policy() {
        // PHP pushes Break and Unused set; PLP restores with Unused forced
        // on and Break forced off.
        let (mut cpu, mut bus) = setup(&[0x08, 0x28]);
        run_one(&mut cpu, &mut bus);
        let pushed = Status::from_bits_retain(bus.read(0x01FD));
        assert!(pushed.contains(Status::BREAK | Status::UNUSED));

        bus.write(0x01FD, 0xDF); // everything except Unused
        run_one(&mut cpu, &mut bus);
        assert!(cpu.status().contains(Status::UNUSED));
        assert!(!cpu.status().contains(Status::BREAK));
    }

    #[test]
    fn brk_pushes_state_and_takes_the_irq_vector() {
        let (mut cpu, mut bus) = setup(&[0x00]);
        bus.set_vector(cpu_mem::IRQ_VECTOR, 0x9000);
        assert_eq!(run_one(&mut cpu, &mut bus), 7);
        assert_eq!(cpu.pc(), 0x9000);
        assert!(cpu.status().contains(Status::INTERRUPT_DISABLE));
        // Return address is the byte after the BRK padding byte.
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x02);
        let pushed = Status::from_bits_retain(bus.read(0x01FB));
        assert!(pushed.contains(Status::BREAK | Status::UNUSED));
    }

    #[test]
    fn rti_restores_status_and_pc() {
        let (mut cpu, mut bus) = setup(&[0x00]);
        bus.set_vector(cpu_mem::IRQ_VECTOR, 0x9000);
        bus.write(0x9000, 0x40);
        run_one(&mut cpu, &mut bus);
        assert_eq!(run_one(&mut cpu, &mut bus), 6);
        assert_eq!(cpu.pc(), ORIGIN + 2);
        assert!(cpu.status().contains(Status::UNUSED));
        assert!(!cpu.status().contains(Status::BREAK));
    }

    #[test]
    fn nmi_pushes_state_and_takes_the_vector() {
        let (mut cpu, mut bus) = setup(&[0xEA]);
        bus.set_vector(cpu_mem::NMI_VECTOR, 0xA000);
        cpu.nmi(&mut bus);
        assert_eq!(cpu.pc(), 0xA000);
        assert_eq!(cpu.cycles, 7);
        assert!(cpu.status().contains(Status::INTERRUPT_DISABLE));
    }

    #[test]
    fn irq_is_masked_by_interrupt_disable() {
        let (mut cpu, mut bus) = setup(&[0xEA]);
        bus.set_vector(cpu_mem::IRQ_VECTOR, 0xB000);

        // Interrupt-disable is set at power-up, so the request is ignored.
        cpu.irq(&mut bus);
        assert_eq!(cpu.pc(), ORIGIN);

        cpu.status.remove(Status::INTERRUPT_DISABLE);
        cpu.irq(&mut bus);
        assert_eq!(cpu.pc(), 0xB000);
        assert_eq!(cpu.cycles, 7);
    }

    #[test]
    fn unofficial_opcode_runs_as_two_cycle_nop() {
        let (mut cpu, mut bus) = setup(&[0x02, 0xA9, 0x42]);
        assert_eq!(run_one(&mut cpu, &mut bus), 2);
        assert_eq!(cpu.pc(), ORIGIN + 1);
        run_one(&mut cpu, &mut bus);
        assert_eq!(cpu.a(), 0x42);
    }

    #[test]
    fn rmw_on_memory_writes_back() {
        // ASL $10 shifts in place and sets carry from bit 7.
        let (mut cpu, mut bus) = setup(&[0x06, 0x10]);
        bus.write(0x0010, 0xC1);
        assert_eq!(run_one(&mut cpu, &mut bus), 5);
        assert_eq!(bus.read(0x0010), 0x82);
        assert!(cpu.status().contains(Status::CARRY));
        assert!(cpu.status().contains(Status::NEGATIVE));
    }
}
