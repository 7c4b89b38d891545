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

    gpio/pins.rs

    Pin descriptors and the canonical IEEE-1284 pinout table.

    This file is the master list of signal-to-register assignments for the
    DB-25 connector. Pin numbers are connector positions; bit indices are
    positions within the backing register. Three control lines and BUSY are
    inverted between register and connector by the port hardware.

*/

use strum_macros::{Display, EnumIter};

use crate::{
    errors::{PortError, Result},
    registers::Direction,
};

/// The seventeen live signals of the Centronics interface.
///
/// Declaration order is the bank's storage order; `PinName as usize`
/// indexes the bank directly.
#[derive(Copy, Clone, Debug, Display, EnumIter, PartialEq, Eq, Hash)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PinName {
    Strobe,
    AutoLinefeed,
    Initialize,
    SelectPrinter,
    Ack,
    Busy,
    PaperOut,
    SelectIn,
    Error,
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
}

/// Which of the port's registers backs a pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PinRegister {
    Data,
    Status,
    Control,
}

/// Termination of a signal line. Fixed by the board, never by software.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Pull {
    Floating,
    Up,
}

/// Output stage of a signal line. Fixed by the board, never by software.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum DriveMode {
    PushPull,
    OpenDrain,
}

/// One logical signal bound to a register bit, with its direction
/// constraints and claim state.
#[derive(Clone, Debug)]
pub struct Pin {
    name: PinName,
    pin_number: u8,
    register: PinRegister,
    bit_index: u8,
    hw_inverted: bool,
    input_allowed: bool,
    output_allowed: bool,
    pull: Pull,
    drive_mode: Option<DriveMode>,
    direction: Direction,
    in_use: bool,
}

impl Pin {
    /// Build a pin descriptor, validating that the default direction is one
    /// of the allowed directions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: PinName,
        pin_number: u8,
        register: PinRegister,
        bit_index: u8,
        default_direction: Direction,
        hw_inverted: bool,
        input_allowed: bool,
        output_allowed: bool,
    ) -> Result<Self> {
        if bit_index > 7 {
            return Err(PortError::Configuration(format!(
                "bit index {} out of range for pin {}",
                bit_index, name
            )));
        }
        let direction_ok = match default_direction {
            Direction::Forward => output_allowed,
            Direction::Reverse => input_allowed,
        };
        if !direction_ok {
            return Err(PortError::InvalidPinConfiguration {
                pin: name,
                direction: default_direction,
            });
        }

        // Pulls and drive stages follow the board topology of the register
        // the pin lives on: open-collector control lines with pull-ups,
        // totem-pole data drivers, receive-only status lines.
        let (pull, drive_mode) = match register {
            PinRegister::Control => (Pull::Up, Some(DriveMode::OpenDrain)),
            PinRegister::Data => (Pull::Floating, Some(DriveMode::PushPull)),
            PinRegister::Status => (Pull::Up, None),
        };

        Ok(Self {
            name,
            pin_number,
            register,
            bit_index,
            hw_inverted,
            input_allowed,
            output_allowed,
            pull,
            drive_mode,
            direction: default_direction,
            in_use: false,
        })
    }

    /// The canonical descriptor for a named signal. Data pins accept input
    /// only on bidirectional hardware.
    pub fn canonical(name: PinName, bidirectional: bool) -> Result<Self> {
        use PinName::*;
        match name {
            Strobe => Self::control(name, 1, 0, true),
            AutoLinefeed => Self::control(name, 14, 1, true),
            Initialize => Self::control(name, 16, 2, false),
            SelectPrinter => Self::control(name, 17, 3, true),
            Ack => Self::status(name, 10, 6, false),
            Busy => Self::status(name, 11, 7, true),
            PaperOut => Self::status(name, 12, 5, false),
            SelectIn => Self::status(name, 13, 4, false),
            Error => Self::status(name, 15, 3, false),
            D0 => Self::data(name, 2, 0, bidirectional),
            D1 => Self::data(name, 3, 1, bidirectional),
            D2 => Self::data(name, 4, 2, bidirectional),
            D3 => Self::data(name, 5, 3, bidirectional),
            D4 => Self::data(name, 6, 4, bidirectional),
            D5 => Self::data(name, 7, 5, bidirectional),
            D6 => Self::data(name, 8, 6, bidirectional),
            D7 => Self::data(name, 9, 7, bidirectional),
        }
    }

    fn control(name: PinName, pin_number: u8, bit_index: u8, hw_inverted: bool) -> Result<Self> {
        Self::new(
            name,
            pin_number,
            PinRegister::Control,
            bit_index,
            Direction::Forward,
            hw_inverted,
            true,
            true,
        )
    }

    fn status(name: PinName, pin_number: u8, bit_index: u8, hw_inverted: bool) -> Result<Self> {
        Self::new(
            name,
            pin_number,
            PinRegister::Status,
            bit_index,
            Direction::Reverse,
            hw_inverted,
            true,
            false,
        )
    }

    fn data(name: PinName, pin_number: u8, bit_index: u8, bidirectional: bool) -> Result<Self> {
        Self::new(
            name,
            pin_number,
            PinRegister::Data,
            bit_index,
            Direction::Forward,
            false,
            bidirectional,
            true,
        )
    }

    pub fn name(&self) -> PinName {
        self.name
    }

    /// DB-25 connector position.
    pub fn pin_number(&self) -> u8 {
        self.pin_number
    }

    pub fn register(&self) -> PinRegister {
        self.register
    }

    pub fn bit_index(&self) -> u8 {
        self.bit_index
    }

    pub fn hw_inverted(&self) -> bool {
        self.hw_inverted
    }

    pub fn input_allowed(&self) -> bool {
        self.input_allowed
    }

    pub fn output_allowed(&self) -> bool {
        self.output_allowed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn pull(&self) -> Pull {
        self.pull
    }

    /// `None` for receive-only lines with no output stage.
    pub fn drive_mode(&self) -> Option<DriveMode> {
        self.drive_mode
    }

    pub(crate) fn set_direction_state(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub(crate) fn set_in_use(&mut self, in_use: bool) {
        self.in_use = in_use;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_canonical_table() {
        let strobe = Pin::canonical(PinName::Strobe, true).unwrap();
        assert_eq!(strobe.pin_number(), 1);
        assert_eq!(strobe.register(), PinRegister::Control);
        assert_eq!(strobe.bit_index(), 0);
        assert!(strobe.hw_inverted());

        let busy = Pin::canonical(PinName::Busy, true).unwrap();
        assert_eq!(busy.pin_number(), 11);
        assert_eq!(busy.register(), PinRegister::Status);
        assert_eq!(busy.bit_index(), 7);
        assert!(busy.hw_inverted());
        assert!(!busy.output_allowed());
        assert_eq!(busy.direction(), Direction::Reverse);

        let d5 = Pin::canonical(PinName::D5, true).unwrap();
        assert_eq!(d5.pin_number(), 7);
        assert_eq!(d5.register(), PinRegister::Data);
        assert_eq!(d5.bit_index(), 5);
        assert!(!d5.hw_inverted());
        assert!(d5.input_allowed());
    }

    #[test]
    fn test_bank_is_complete() {
        assert_eq!(PinName::iter().count(), 17);
        for name in PinName::iter() {
            Pin::canonical(name, true).unwrap();
            Pin::canonical(name, false).unwrap();
        }
    }

    #[test]
    fn test_data_pins_write_only_on_unidirectional_hardware() {
        let d0 = Pin::canonical(PinName::D0, false).unwrap();
        assert!(!d0.input_allowed());
        assert!(d0.output_allowed());
    }

    #[test]
    fn test_invalid_default_direction_rejected() {
        // An output-only pin cannot default to the Reverse direction.
        let result = Pin::new(
            PinName::D0,
            2,
            PinRegister::Data,
            0,
            Direction::Reverse,
            false,
            false,
            true,
        );
        assert_eq!(
            result.err(),
            Some(PortError::InvalidPinConfiguration {
                pin: PinName::D0,
                direction: Direction::Reverse,
            })
        );
    }

    #[test]
    fn test_bad_bit_index_rejected() {
        let result = Pin::new(
            PinName::D0,
            2,
            PinRegister::Data,
            8,
            Direction::Forward,
            false,
            true,
            true,
        );
        assert!(matches!(result, Err(PortError::Configuration(_))));
    }

    #[test]
    fn test_fixed_topology() {
        let strobe = Pin::canonical(PinName::Strobe, true).unwrap();
        assert_eq!(strobe.pull(), Pull::Up);
        assert_eq!(strobe.drive_mode(), Some(DriveMode::OpenDrain));

        let ack = Pin::canonical(PinName::Ack, true).unwrap();
        assert_eq!(ack.drive_mode(), None);

        let d0 = Pin::canonical(PinName::D0, true).unwrap();
        assert_eq!(d0.pull(), Pull::Floating);
        assert_eq!(d0.drive_mode(), Some(DriveMode::PushPull));
    }

    #[test]
    fn test_pin_name_display() {
        // PinName renders in its connector spelling.
        assert_eq!(PinName::AutoLinefeed.to_string(), "AUTO_LINEFEED");
        assert_eq!(PinName::D3.to_string(), "D3");
    }
}
