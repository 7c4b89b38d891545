/*
    parport

    Copyright 2025 the parport authors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the "Software"),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    registers.rs

    Bit layouts of the SPP status/control registers and the ECP Extended
    Control Register, plus the direction and communication-mode enums stored
    in them.

*/

use modular_bitfield::{bitfield, prelude::*};
use strum_macros::{Display, FromRepr};

use crate::bitops;

/// Control register bit 0. Pulsed high to tell the peripheral the data
/// lines are valid.
pub const CONTROL_STROBE: u8 = 0b0000_0001;
/// Control register bit 2. Held high in the Centronics idle state; driving
/// it low resets the peripheral.
pub const CONTROL_INITIALIZE: u8 = 0b0000_0100;
/// Control register bit 5. Selects which end drives the data bus.
pub const CONTROL_DIRECTION: u8 = 0b0010_0000;
/// Bit index of the direction bit within the control register.
pub const CONTROL_DIRECTION_BIT: u8 = 5;

/// Reset mask for bidirectional hardware: bits 4-7 preserved.
pub const CONTROL_RESET_MASK_BIDIR: u8 = 0b1111_0000;
/// Reset mask for write-only hardware: direction bit additionally cleared.
pub const CONTROL_RESET_MASK_UNIDIR: u8 = 0b1101_0000;

/// Bit offset of the ECR communication mode field.
pub const ECR_MODE_OFFSET: u8 = 5;
/// Width of the ECR communication mode field.
pub const ECR_MODE_WIDTH: u8 = 3;

/// Status register layout. All five live lines are peripheral-driven.
///
/// The BUSY line is inverted by the port's input buffer: the register bit
/// reads low while the peripheral is busy.
#[bitfield]
#[derive(Copy, Clone, Default)]
pub struct StatusRegister {
    #[skip]
    pub unused: B3,
    pub error: bool,
    pub select_in: bool,
    pub paper_out: bool,
    pub ack: bool,
    pub busy: bool,
}

impl StatusRegister {
    /// Whether the peripheral is asserting BUSY, accounting for the
    /// hardware inversion of the register bit.
    pub fn busy_asserted(&self) -> bool {
        !self.busy()
    }
}

/// Control register layout. Bits 0, 1 and 3 are inverted on the connector;
/// that inversion is handled by the pin capability table, not here.
#[bitfield]
#[derive(Copy, Clone, Default)]
pub struct ControlRegister {
    pub strobe: bool,
    pub auto_line_feed: bool,
    pub initialize: bool,
    pub select_printer: bool,
    pub enable_irq: bool,
    pub direction: bool,
    #[skip]
    pub unused: B2,
}

/// ECP Extended Control Register layout.
#[bitfield]
#[derive(Copy, Clone, Default)]
pub struct EcrRegister {
    pub fifo_empty: bool,
    pub fifo_full: bool,
    pub service_intr: bool,
    pub dma_enable: bool,
    pub err_intr_disable: bool,
    pub mode: B3,
}

/// Transfer direction of the bidirectional data bus.
///
/// Stored in control register bit 5: clear for Forward (host drives the
/// bus), set for Reverse (peripheral drives the bus).
#[derive(Copy, Clone, Debug, Display, FromRepr, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Forward = 0,
    Reverse = 1,
}

impl Direction {
    /// Decode the direction from a raw control register value.
    pub fn from_control_byte(control: u8) -> Direction {
        if bitops::bit_set(control, CONTROL_DIRECTION_BIT) {
            Direction::Reverse
        }
        else {
            Direction::Forward
        }
    }

    /// Return `control` with the direction bit set to this direction and
    /// every other bit untouched.
    pub fn apply_to_control_byte(&self, control: u8) -> u8 {
        bitops::with_bit(
            control,
            CONTROL_DIRECTION_BIT,
            matches!(self, Direction::Reverse),
        )
    }
}

/// Communication modes selectable in the ECR mode field (bits 7..5).
///
/// The mode space is sparse; the remaining bit patterns are reserved and
/// reads that encounter one are rejected rather than renumbered.
#[derive(Copy, Clone, Debug, Display, FromRepr, PartialEq, Eq)]
#[repr(u8)]
pub enum CommMode {
    Spp = 0,
    Byte = 1,
    Epp = 4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_layout() {
        let status = StatusRegister::from_bytes([0b1000_0000]);
        assert!(status.busy());
        assert!(!status.busy_asserted());
        assert!(!status.ack());

        let status = StatusRegister::from_bytes([0b0100_1000]);
        assert!(status.busy_asserted());
        assert!(status.ack());
        assert!(status.error());
    }

    #[test]
    fn test_control_layout() {
        let control = ControlRegister::from_bytes([CONTROL_STROBE | CONTROL_INITIALIZE]);
        assert!(control.strobe());
        assert!(control.initialize());
        assert!(!control.direction());
    }

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(Direction::from_control_byte(0x00), Direction::Forward);
        assert_eq!(Direction::from_control_byte(CONTROL_DIRECTION), Direction::Reverse);

        let byte = Direction::Reverse.apply_to_control_byte(0b0000_0100);
        assert_eq!(byte, 0b0010_0100);
        let byte = Direction::Forward.apply_to_control_byte(byte);
        assert_eq!(byte, 0b0000_0100);
    }

    #[test]
    fn test_comm_mode_repr() {
        assert_eq!(CommMode::from_repr(0), Some(CommMode::Spp));
        assert_eq!(CommMode::from_repr(1), Some(CommMode::Byte));
        assert_eq!(CommMode::from_repr(4), Some(CommMode::Epp));
        assert_eq!(CommMode::from_repr(2), None);
        assert_eq!(CommMode::from_repr(7), None);
    }
}
