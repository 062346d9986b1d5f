//! Standard NES controller (joypad) model.
//!
//! The input collaborator sets a per-frame button bitmask; the CPU latches it
//! by writing `$4016` and shifts it back out one bit per read, most
//! significant bit first.

/// Button bits as they appear in the latched byte (A is bit 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    Right = 0x01,
    Left = 0x02,
    Down = 0x04,
    Up = 0x08,
    Start = 0x10,
    Select = 0x20,
    B = 0x40,
    A = 0x80,
}

/// Serially-readable controller state with write-to-latch behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controller {
    /// Live button state as maintained by the input collaborator.
    state: u8,
    /// Shift register snapshot taken at latch time.
    latched: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full button mask.
    pub fn set_buttons(&mut self, mask: u8) {
        self.state = mask;
    }

    /// Updates a single button's pressed state.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.state |= button as u8;
        } else {
            self.state &= !(button as u8);
        }
    }

    /// A CPU write to `$4016` snapshots the live state into the shifter.
    pub fn latch(&mut self) {
        self.latched = self.state;
    }

    /// Shifts the next bit (MSB first) out of the latched byte.
    pub fn read(&mut self) -> u8 {
        let bit = (self.latched & 0x80 != 0) as u8;
        self.latched <<= 1;
        bit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_latched_byte_msb_first() {
        let mut pad = Controller::new();
        pad.set_buttons(Button::A as u8 | Button::Start as u8);
        pad.latch();

        // A, B, Select, Start, Up, Down, Left, Right
        let bits: Vec<u8> = (0..8).map(|_| pad.read()).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn reads_past_eight_bits_return_zero() {
        let mut pad = Controller::new();
        pad.set_buttons(0xFF);
        pad.latch();
        for _ in 0..8 {
            pad.read();
        }
        assert_eq!(pad.read(), 0);
    }

    #[test]
    fn state_changes_after_latch_are_invisible() {
        let mut pad = Controller::new();
        pad.set_buttons(Button::A as u8);
        pad.latch();
        pad.set_buttons(0);
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn set_button_flips_individual_bits() {
        let mut pad = Controller::new();
        pad.set_button(Button::Left, true);
        pad.set_button(Button::B, true);
        pad.set_button(Button::Left, false);
        pad.latch();
        let bits: Vec<u8> = (0..8).map(|_| pad.read()).collect();
        assert_eq!(bits, vec![0, 1, 0, 0, 0, 0, 0, 0]);
    }
}
