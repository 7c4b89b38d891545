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

    ports/standard.rs

    The Standard Parallel Port tier: the data/status/control register file,
    bus direction control, the bidirectionality probe and the
    compatibility-mode write path.

    Construction acquires the 3-register range before touching any hardware
    state; a failed construction leaves the control register exactly as it
    was found.

*/

use log::{debug, trace};

use crate::{
    config::PortConfig,
    errors::{PortError, Result},
    handshake::{self, StrobeTiming},
    io::PortIo,
    regmap::SppRegisters,
    registers::{Direction, CONTROL_RESET_MASK_BIDIR, CONTROL_RESET_MASK_UNIDIR, CONTROL_INITIALIZE},
};

pub struct StandardPort<B: PortIo> {
    io: B,
    regs: SppRegisters,
    bidirectional: bool,
    timing: StrobeTiming,
}

impl<B: PortIo> StandardPort<B> {
    /// Construct a port at `spp_base` with default options: probe
    /// bidirectionality, reset the control register to the idle state.
    pub fn new(io: B, spp_base: u16) -> Result<Self> {
        Self::with_config(io, &PortConfig::new(spp_base))
    }

    pub fn with_config(mut io: B, config: &PortConfig) -> Result<Self> {
        let regs = SppRegisters::map(config.spp_base_address)?;
        io.acquire_port_range(config.spp_base_address, SppRegisters::SPAN)?;
        let mut port = Self::assemble(io, regs, config);
        port.init_hardware(config);
        Ok(port)
    }

    /// Build the struct without touching hardware. Higher tiers acquire
    /// their additional ranges between this and `init_hardware` so a failed
    /// acquisition never leaves a half-initialized control register.
    pub(crate) fn assemble(io: B, regs: SppRegisters, config: &PortConfig) -> Self {
        let timing = match config.strobe_pulse_width_us {
            Some(us) => StrobeTiming { pulse_width_us: us },
            None => StrobeTiming::default(),
        };
        Self { io, regs, bidirectional: false, timing }
    }

    /// First hardware contact: probe (or trust the configured override) and
    /// optionally reset the control register.
    pub(crate) fn init_hardware(&mut self, config: &PortConfig) {
        self.bidirectional = match config.bidirectional {
            Some(bidirectional) => bidirectional,
            None => self.test_bidirectional(),
        };
        if config.reset_control {
            self.reset_control_register();
        }
        debug!(
            "SPP: port at {:04X} ready, bidirectional: {}",
            self.regs.data, self.bidirectional
        );
    }

    /// Base I/O address (the data register).
    pub fn base_address(&self) -> u16 {
        self.regs.data
    }

    pub fn registers(&self) -> &SppRegisters {
        &self.regs
    }

    /// Whether the hardware honors the direction bit, as probed at
    /// construction or overridden by configuration.
    pub fn bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn strobe_timing(&self) -> StrobeTiming {
        self.timing
    }

    pub fn set_strobe_timing(&mut self, timing: StrobeTiming) {
        self.timing = timing;
    }

    /// Current bus direction, decoded from control register bit 5.
    pub fn direction(&mut self) -> Direction {
        Direction::from_control_byte(self.read_control_register())
    }

    /// Set the bus direction, read-modify-write on bit 5 only. The driver
    /// state change has taken effect by the time this returns; do not write
    /// the data register between issuing this and its return.
    pub fn set_direction(&mut self, direction: Direction) {
        let control = self.read_control_register();
        self.write_control_register(direction.apply_to_control_byte(control));
        trace!("SPP: direction set to {}", direction);
    }

    /// Probe whether the port honors the direction bit. Forces Reverse and
    /// reads it back; write-only hardware won't latch the bit. Restores the
    /// saved direction if it was Forward, and preserves every
    /// non-direction control bit.
    pub fn test_bidirectional(&mut self) -> bool {
        let saved = self.direction();
        self.set_direction(Direction::Reverse);
        let bidirectional = self.direction() == Direction::Reverse;
        if saved == Direction::Forward {
            self.set_direction(Direction::Forward);
        }
        debug!("SPP: bidirectional probe: {}", bidirectional);
        bidirectional
    }

    /// Reset the control register to the Centronics idle state: bits 4-7
    /// preserved (direction additionally forced Forward on write-only
    /// hardware), bits 0, 1 and 3 cleared, INITIALIZE held high.
    pub fn reset_control_register(&mut self) {
        let control = self.read_control_register();
        let mask = if self.bidirectional {
            CONTROL_RESET_MASK_BIDIR
        }
        else {
            CONTROL_RESET_MASK_UNIDIR
        };
        self.write_control_register((control & mask) | CONTROL_INITIALIZE);
    }

    /// Read the data register. The peripheral only drives the bus on
    /// bidirectional hardware, so this is refused elsewhere.
    pub fn read_data_register(&mut self) -> Result<u8> {
        if !self.bidirectional {
            return Err(PortError::InvalidDirection(
                "port is not bidirectional; the data register cannot be read".to_string(),
            ));
        }
        let byte = self.io.read_byte(self.regs.data);
        trace!("SPP: data register read: {:02X}", byte);
        Ok(byte)
    }

    pub fn write_data_register(&mut self, byte: u8) {
        self.io.write_byte(self.regs.data, byte);
        trace!("SPP: data register write: {:02X}", byte);
    }

    pub fn read_status_register(&mut self) -> u8 {
        let byte = self.io.read_byte(self.regs.status);
        trace!("SPP: status register read: {:02X}", byte);
        byte
    }

    pub fn read_control_register(&mut self) -> u8 {
        let byte = self.io.read_byte(self.regs.control);
        trace!("SPP: control register read: {:02X}", byte);
        byte
    }

    pub fn write_control_register(&mut self, byte: u8) {
        self.io.write_byte(self.regs.control, byte);
        trace!("SPP: control register write: {:02X}", byte);
    }

    /// Write a buffer through the compatibility-mode handshake.
    ///
    /// Direction is set Forward once for the whole buffer, not per byte.
    /// With `hold_while_busy` the call blocks after each strobe until the
    /// peripheral releases BUSY; without it, it returns right after the
    /// pulse and trades guaranteed acceptance for throughput.
    pub fn write_spp_data(&mut self, data: &[u8], hold_while_busy: bool) -> Result<()> {
        self.reset_control_register();
        if self.bidirectional {
            self.set_direction(Direction::Forward);
        }
        handshake::write_spp_buffer(&mut self.io, &self.regs, &self.timing, data, hold_while_busy)
    }

    /// Read one byte off the data bus, managing the handshake registers the
    /// same way a write does.
    pub fn read_spp_data(&mut self) -> Result<u8> {
        if !self.bidirectional {
            return Err(PortError::InvalidDirection(
                "port is not bidirectional; the data register cannot be read".to_string(),
            ));
        }
        self.reset_control_register();
        self.set_direction(Direction::Reverse);
        self.read_data_register()
    }

    /// Named register list, for diagnostics.
    pub fn register_map(&self) -> Vec<(String, u16)> {
        vec![
            ("SPP Data".to_string(), self.regs.data),
            ("SPP Status".to_string(), self.regs.status),
            ("SPP Control".to_string(), self.regs.control),
        ]
    }

    pub(crate) fn io_mut(&mut self) -> &mut B {
        &mut self.io
    }
}

impl<B: PortIo> Drop for StandardPort<B> {
    fn drop(&mut self) {
        self.io.release_port_range(self.regs.data, SppRegisters::SPAN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::{SimBackend, SimEvent};

    const BASE: u16 = 0x378;
    const CONTROL: u16 = BASE + 2;

    #[test]
    fn test_construction_acquires_range() {
        let io = SimBackend::new();
        let port = StandardPort::new(io.clone(), BASE).unwrap();
        assert_eq!(io.claims(), vec![(BASE, 3)]);
        assert!(port.bidirectional());
    }

    #[test]
    fn test_exclusive_ownership() {
        let io = SimBackend::new();
        let port = StandardPort::new(io.clone(), BASE).unwrap();
        match StandardPort::new(io.clone(), BASE) {
            Err(PortError::Permission { base, count }) => {
                assert_eq!((base, count), (BASE, 3));
            }
            other => panic!("expected Permission error, got {:?}", other.map(|_| ())),
        }

        // Releasing the first port frees the range again.
        drop(port);
        StandardPort::new(io.clone(), BASE).unwrap();
    }

    #[test]
    fn test_direction_round_trip() {
        let io = SimBackend::new();
        let mut port = StandardPort::new(io, BASE).unwrap();

        port.set_direction(Direction::Reverse);
        assert_eq!(port.direction(), Direction::Reverse);
        port.set_direction(Direction::Forward);
        assert_eq!(port.direction(), Direction::Forward);
    }

    #[test]
    fn test_probe_restores_forward() {
        let io = SimBackend::new();
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();

        io.poke(CONTROL, 0x04);
        assert!(port.test_bidirectional());
        assert_eq!(io.peek(CONTROL), 0x04);

        // A saved Reverse direction is left alone.
        io.poke(CONTROL, 0x24);
        assert!(port.test_bidirectional());
        assert_eq!(io.peek(CONTROL), 0x24);
    }

    #[test]
    fn test_unidirectional_hardware_detected() {
        let io = SimBackend::new();
        io.set_unidirectional(CONTROL);
        let port = StandardPort::new(io, BASE).unwrap();
        assert!(!port.bidirectional());
    }

    #[test]
    fn test_reset_control_convention() {
        let io = SimBackend::new();
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();

        io.poke(CONTROL, 0xFF);
        port.reset_control_register();
        assert_eq!(io.peek(CONTROL), 0xF4);
    }

    #[test]
    fn test_reset_control_convention_unidirectional() {
        let io = SimBackend::new();
        io.set_unidirectional(CONTROL);
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();

        io.poke(CONTROL, 0xDF);
        port.reset_control_register();
        // Direction bit cleared along with the low nibble; bit 2 forced.
        assert_eq!(io.peek(CONTROL) & 0b1101_0111, 0b1101_0100);
    }

    #[test]
    fn test_buffer_write_order() {
        let io = SimBackend::new();
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();
        io.clear_events();

        port.write_spp_data(&[0x41, 0x42], true).unwrap();

        let data_writes: Vec<u8> = io
            .events()
            .iter()
            .filter_map(|ev| match ev {
                SimEvent::Write { addr, value } if *addr == BASE => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(data_writes, vec![0x41, 0x42]);
    }

    #[test]
    fn test_busy_peripheral_rejected() {
        let io = SimBackend::new();
        io.set_busy_on_data_write(BASE, BASE + 1);
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();

        assert_eq!(port.write_spp_data(&[0x41], true), Err(PortError::PeripheralBusy));
    }

    #[test]
    fn test_read_refused_on_write_only_hardware() {
        let io = SimBackend::new();
        io.set_unidirectional(CONTROL);
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();
        io.clear_events();

        assert!(matches!(port.read_spp_data(), Err(PortError::InvalidDirection(_))));
        assert!(matches!(port.read_data_register(), Err(PortError::InvalidDirection(_))));

        // The refusal happens before any bus traffic on the data register.
        assert!(!io
            .events()
            .iter()
            .any(|ev| matches!(ev, SimEvent::Read { addr, .. } if *addr == BASE)));
    }

    #[test]
    fn test_spp_read_sets_reverse() {
        let io = SimBackend::new();
        let mut port = StandardPort::new(io.clone(), BASE).unwrap();

        io.poke(BASE, 0x5A);
        assert_eq!(port.read_spp_data().unwrap(), 0x5A);
        assert_eq!(port.direction(), Direction::Reverse);
    }
}
