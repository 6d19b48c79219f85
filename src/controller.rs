/*!
Standard NES pad behind the serial port at $4016/$4017.

The eight buttons form one byte in the order the CPU shifts them out,
A in bit 0 up to Right in bit 7.

`signal` takes CPU writes to $4016 and only looks at bit 0. With bit 0 set
the shift position is held at A, so every read returns A. With bit 0 clear
each read advances the position by one button. After the eighth button,
reads return 1.
*/

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A = 0x01,
    B = 0x02,
    Select = 0x04,
    Start = 0x08,
    Up = 0x10,
    Down = 0x20,
    Left = 0x40,
    Right = 0x80,
}

/// Shift position once every button has been read.
const EXHAUSTED: u8 = 8;

#[derive(Clone, Debug, Default)]
pub struct Controller {
    held: u8,
    shift: u8,
    advancing: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let bit = button as u8;
        self.held = if pressed { self.held | bit } else { self.held & !bit };
    }

    pub fn press(&mut self, button: Button) {
        self.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set_button(button, false);
    }

    /// Replace every button at once, in shift order.
    pub fn set_held(&mut self, mask: u8) {
        self.held = mask;
    }

    pub fn held(&self) -> u8 {
        self.held
    }

    pub fn signal(&mut self, value: u8) {
        self.advancing = value & 1 == 0;
        if !self.advancing {
            self.shift = 0;
        }
    }

    pub fn read(&mut self) -> u8 {
        if self.shift >= EXHAUSTED {
            return 1;
        }
        let bit = (self.held >> self.shift) & 1;
        if self.advancing {
            self.shift += 1;
        }
        bit
    }

    /// Back to the power-on port state. Held buttons are kept.
    pub fn reset(&mut self) {
        self.shift = 0;
        self.advancing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(mask: u8) -> Controller {
        let mut pad = Controller::new();
        pad.set_held(mask);
        pad.signal(1);
        pad.signal(0);
        pad
    }

    #[test]
    fn reads_walk_buttons_then_return_one() {
        let mut pad = setup(Button::A as u8 | Button::Start as u8 | Button::Left as u8);
        let got: Vec<u8> = (0..10).map(|_| pad.read()).collect();
        assert_eq!(got, [1, 0, 0, 1, 0, 0, 1, 0, 1, 1]);
    }

    #[test]
    fn bit0_high_holds_position_at_a() {
        let mut pad = Controller::new();
        pad.press(Button::A);
        pad.signal(1);
        for _ in 0..16 {
            assert_eq!(pad.read(), 1);
        }
        pad.release(Button::A);
        assert_eq!(pad.read(), 0);
    }

    #[test]
    fn new_signal_restarts_sequence() {
        let mut pad = setup(Button::B as u8);
        assert_eq!(pad.read(), 0);
        assert_eq!(pad.read(), 1);
        pad.signal(1);
        pad.signal(0);
        assert_eq!(pad.read(), 0);
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn press_and_release_edit_mask() {
        let mut pad = Controller::new();
        pad.press(Button::Right);
        pad.press(Button::Select);
        assert_eq!(pad.held(), 0x84);
        pad.release(Button::Right);
        assert_eq!(pad.held(), 0x04);
    }
}
