use bitflags::bitflags;

bitflags! {
    /// Processor status register.
    ///
    /// Bit 5 has no storage on the real chip and always reads as set; every
    /// copy pushed to the stack carries both `BREAK` and `UNUSED`, and
    /// pulls force `UNUSED` on and `BREAK` off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

impl Status {
    /// Power-up value: interrupts disabled, unused bit set.
    pub(crate) fn power_up() -> Self {
        Status::UNUSED | Status::INTERRUPT_DISABLE
    }

    /// Updates `ZERO` and `NEGATIVE` from a result byte.
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::power_up()
    }
}
