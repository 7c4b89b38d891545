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

    gpio/mod.rs

    Per-bit GPIO access over a Standard port.

    The bank is an arena: it owns the seventeen pin descriptors and the
    port, and every register access goes through it. A pin write is a
    read-modify-write of its single bit, so pins sharing a register never
    clobber each other.

*/

pub mod pins;

use log::trace;
use strum::IntoEnumIterator;

use crate::{
    bitops,
    errors::{PortError, Result},
    io::PortIo,
    ports::StandardPort,
    registers::Direction,
};

use pins::{DriveMode, Pin, PinName, PinRegister, Pull};

/// GPIO bank construction options.
#[derive(Copy, Clone, Debug)]
pub struct GpioOptions {
    /// Drive all data lines low and reset the control lines at
    /// construction.
    pub clear_on_init: bool,
    /// Reset the control register before the pin clear (the Standard port
    /// constructor usually already has).
    pub reset_control: bool,
    /// Whether a data pin direction change also drives the port's shared
    /// direction bit.
    pub propagate_direction: bool,
}

impl Default for GpioOptions {
    fn default() -> Self {
        Self {
            clear_on_init: true,
            reset_control: false,
            propagate_direction: true,
        }
    }
}

pub struct GpioPort<B: PortIo> {
    port: StandardPort<B>,
    pins: Vec<Pin>,
    propagate_direction: bool,
}

impl<B: PortIo> GpioPort<B> {
    pub fn new(port: StandardPort<B>) -> Result<Self> {
        Self::with_options(port, GpioOptions::default())
    }

    pub fn with_options(mut port: StandardPort<B>, options: GpioOptions) -> Result<Self> {
        if options.reset_control {
            port.reset_control_register();
        }
        let bidirectional = port.bidirectional();
        let pins = PinName::iter()
            .map(|name| Pin::canonical(name, bidirectional))
            .collect::<Result<Vec<_>>>()?;

        let mut bank = Self {
            port,
            pins,
            propagate_direction: options.propagate_direction,
        };
        if options.clear_on_init {
            bank.reset_data_pins();
            bank.reset_control_pins();
        }
        Ok(bank)
    }

    fn index(name: PinName) -> usize {
        name as usize
    }

    pub fn pin(&self, name: PinName) -> &Pin {
        &self.pins[Self::index(name)]
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Look a pin up by its DB-25 connector position.
    pub fn pin_by_number(&self, pin_number: u8) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.pin_number() == pin_number)
    }

    /// Mark a pin as in use. Fails if it already is.
    pub fn claim(&mut self, name: PinName) -> Result<()> {
        let pin = &mut self.pins[Self::index(name)];
        if pin.in_use() {
            return Err(PortError::PinInUse(name));
        }
        pin.set_in_use(true);
        trace!("GPIO: pin {} claimed", name);
        Ok(())
    }

    pub fn release(&mut self, name: PinName) {
        self.pins[Self::index(name)].set_in_use(false);
        trace!("GPIO: pin {} released", name);
    }

    fn register_address(&self, register: PinRegister) -> u16 {
        let regs = self.port.registers();
        match register {
            PinRegister::Data => regs.data,
            PinRegister::Status => regs.status,
            PinRegister::Control => regs.control,
        }
    }

    /// Read a pin's state. Always issues a register read.
    pub fn read_pin(&mut self, name: PinName) -> Result<bool> {
        let pin = self.pin(name);
        if !pin.input_allowed() {
            return Err(PortError::InvalidDirection(format!(
                "input not allowed on pin {}",
                name
            )));
        }
        let addr = self.register_address(pin.register());
        let (bit_index, inverted) = (pin.bit_index(), pin.hw_inverted());

        let byte = self.port.io_mut().read_byte(addr);
        let bit = bitops::bit_set(byte, bit_index);
        Ok(bit != inverted)
    }

    /// Set a pin's state with a read-modify-write that touches only its own
    /// bit; sibling pins in the same register keep their values.
    pub fn write_pin(&mut self, name: PinName, value: bool) -> Result<()> {
        let pin = self.pin(name);
        if !pin.output_allowed() {
            return Err(PortError::InvalidDirection(format!(
                "output not allowed on pin {}",
                name
            )));
        }
        if pin.register() == PinRegister::Data && pin.direction() == Direction::Reverse {
            return Err(PortError::InvalidDirection(format!(
                "pin {} is set to the Reverse direction; the host must not drive the bus",
                name
            )));
        }
        let addr = self.register_address(pin.register());
        let (bit_index, inverted) = (pin.bit_index(), pin.hw_inverted());

        let physical = value != inverted;
        let byte = self.port.io_mut().read_byte(addr);
        self.port
            .io_mut()
            .write_byte(addr, bitops::with_bit(byte, bit_index, physical));
        trace!("GPIO: pin {} set to {}", name, value);
        Ok(())
    }

    /// Change a pin's logical direction, validated against its allowed
    /// directions. On data pins of a direction-propagating bank this also
    /// drives the port's direction bit, and the sibling data pins follow:
    /// the data bus has one direction, whichever pin asked for it.
    pub fn set_pin_direction(&mut self, name: PinName, direction: Direction) -> Result<()> {
        let pin = self.pin(name);
        let allowed = match direction {
            Direction::Forward => pin.output_allowed(),
            Direction::Reverse => pin.input_allowed(),
        };
        if !allowed {
            return Err(PortError::InvalidDirection(format!(
                "pin {} does not allow the {} direction",
                name, direction
            )));
        }

        let propagate = pin.register() == PinRegister::Data && self.propagate_direction;
        if propagate {
            self.port.set_direction(direction);
            for pin in self
                .pins
                .iter_mut()
                .filter(|pin| pin.register() == PinRegister::Data)
            {
                pin.set_direction_state(direction);
            }
        }
        else {
            self.pins[Self::index(name)].set_direction_state(direction);
        }
        Ok(())
    }

    pub fn pull(&self, name: PinName) -> Pull {
        self.pin(name).pull()
    }

    /// Signal pulls are fixed by the board; there is nothing to configure.
    pub fn set_pull(&mut self, _name: PinName, _pull: Pull) -> Result<()> {
        Err(PortError::ImmutableAttribute { attribute: "pull" })
    }

    pub fn drive_mode(&self, name: PinName) -> Option<DriveMode> {
        self.pin(name).drive_mode()
    }

    /// Output stages are fixed by the board; there is nothing to configure.
    pub fn set_drive_mode(&mut self, _name: PinName, _mode: DriveMode) -> Result<()> {
        Err(PortError::ImmutableAttribute { attribute: "drive_mode" })
    }

    /// Drive all data lines low.
    pub fn reset_data_pins(&mut self) {
        self.port.write_data_register(0);
    }

    /// Return the control lines to the Centronics idle state.
    pub fn reset_control_pins(&mut self) {
        self.port.reset_control_register();
    }

    pub fn port(&self) -> &StandardPort<B> {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut StandardPort<B> {
        &mut self.port
    }

    /// Dissolve the bank, returning the underlying port.
    pub fn into_port(self) -> StandardPort<B> {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::{SimBackend, SimEvent};

    const BASE: u16 = 0x378;
    const STATUS: u16 = BASE + 1;
    const CONTROL: u16 = BASE + 2;

    fn bank(io: &SimBackend) -> GpioPort<SimBackend> {
        let port = StandardPort::new(io.clone(), BASE).unwrap();
        GpioPort::new(port).unwrap()
    }

    #[test]
    fn test_construction_clears_pins() {
        let io = SimBackend::new();
        let _bank = bank(&io);
        assert_eq!(io.peek(BASE), 0x00);
        // Control idles with INITIALIZE high and the low handshake bits
        // clear.
        assert_eq!(io.peek(CONTROL) & 0b0000_1111, 0b0000_0100);
    }

    #[test]
    fn test_pin_write_preserves_siblings() {
        let io = SimBackend::new();
        let mut bank = bank(&io);

        io.poke(BASE, 0b0101_0101);
        bank.write_pin(PinName::D3, true).unwrap();
        assert_eq!(io.peek(BASE), 0b0101_1101);

        bank.write_pin(PinName::D0, false).unwrap();
        assert_eq!(io.peek(BASE), 0b0101_1100);
    }

    #[test]
    fn test_inverted_pin_write() {
        let io = SimBackend::new();
        let mut bank = bank(&io);

        io.poke(CONTROL, 0b0000_0100);
        // STROBE is hardware-inverted: asserting it clears register bit 0.
        bank.write_pin(PinName::Strobe, true).unwrap();
        assert_eq!(io.peek(CONTROL), 0b0000_0100);
        bank.write_pin(PinName::Strobe, false).unwrap();
        assert_eq!(io.peek(CONTROL), 0b0000_0101);
    }

    #[test]
    fn test_read_is_a_register_read() {
        let io = SimBackend::new();
        let mut bank = bank(&io);
        io.clear_events();

        io.poke(STATUS, 0b0100_0000);
        assert!(bank.read_pin(PinName::Ack).unwrap());
        // BUSY reads inverted: bit 7 low means busy asserted.
        assert!(bank.read_pin(PinName::Busy).unwrap());

        let status_reads = io
            .events()
            .iter()
            .filter(|ev| matches!(ev, SimEvent::Read { addr, .. } if *addr == STATUS))
            .count();
        assert_eq!(status_reads, 2);
    }

    #[test]
    fn test_direction_constraints_enforced() {
        let io = SimBackend::new();
        io.set_unidirectional(CONTROL);
        let mut bank = bank(&io);

        // Status lines are receive-only; data input needs bidirectional
        // hardware.
        assert!(matches!(
            bank.write_pin(PinName::Busy, true),
            Err(PortError::InvalidDirection(_))
        ));
        assert!(matches!(
            bank.read_pin(PinName::D0),
            Err(PortError::InvalidDirection(_))
        ));
        assert!(matches!(
            bank.set_pin_direction(PinName::D0, Direction::Reverse),
            Err(PortError::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_reversed_data_pin_refuses_writes() {
        let io = SimBackend::new();
        let mut bank = bank(&io);

        bank.set_pin_direction(PinName::D2, Direction::Reverse).unwrap();
        assert!(matches!(
            bank.write_pin(PinName::D2, true),
            Err(PortError::InvalidDirection(_))
        ));

        bank.set_pin_direction(PinName::D2, Direction::Forward).unwrap();
        bank.write_pin(PinName::D2, true).unwrap();
    }

    #[test]
    fn test_direction_propagation() {
        let io = SimBackend::new();
        let mut bank = bank(&io);

        bank.set_pin_direction(PinName::D0, Direction::Reverse).unwrap();
        assert_eq!(bank.port_mut().direction(), Direction::Reverse);
        // The bus direction is shared; sibling data pins follow.
        assert_eq!(bank.pin(PinName::D7).direction(), Direction::Reverse);
    }

    #[test]
    fn test_no_propagation_when_disabled() {
        let io = SimBackend::new();
        let port = StandardPort::new(io.clone(), BASE).unwrap();
        let mut bank = GpioPort::with_options(
            port,
            GpioOptions {
                propagate_direction: false,
                ..Default::default()
            },
        )
        .unwrap();

        let before = bank.port_mut().direction();
        bank.set_pin_direction(PinName::D0, Direction::Reverse).unwrap();
        assert_eq!(bank.port_mut().direction(), before);
        assert_eq!(bank.pin(PinName::D0).direction(), Direction::Reverse);
        // Non-propagating changes are purely logical state.
        assert_eq!(bank.pin(PinName::D1).direction(), Direction::Forward);
    }

    #[test]
    fn test_claim_release() {
        let io = SimBackend::new();
        let mut bank = bank(&io);

        bank.claim(PinName::D0).unwrap();
        assert_eq!(bank.claim(PinName::D0), Err(PortError::PinInUse(PinName::D0)));
        assert!(bank.pin(PinName::D0).in_use());

        bank.release(PinName::D0);
        bank.claim(PinName::D0).unwrap();
    }

    #[test]
    fn test_immutable_attributes() {
        let io = SimBackend::new();
        let mut bank = bank(&io);

        assert_eq!(
            bank.set_pull(PinName::D0, Pull::Up),
            Err(PortError::ImmutableAttribute { attribute: "pull" })
        );
        assert_eq!(
            bank.set_drive_mode(PinName::Strobe, DriveMode::PushPull),
            Err(PortError::ImmutableAttribute { attribute: "drive_mode" })
        );
    }

    #[test]
    fn test_pin_number_lookup() {
        let io = SimBackend::new();
        let bank = bank(&io);

        assert_eq!(bank.pin_by_number(1).map(Pin::name), Some(PinName::Strobe));
        assert_eq!(bank.pin_by_number(11).map(Pin::name), Some(PinName::Busy));
        assert_eq!(bank.pin_by_number(9).map(Pin::name), Some(PinName::D7));
        assert!(bank.pin_by_number(18).is_none());
    }
}
