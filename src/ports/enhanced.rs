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

    ports/enhanced.rs

    The Enhanced Parallel Port tier. Extends the Standard tier's register
    set with the EPP address and data registers at base+3 and base+4; the
    byte handshake for these is performed by the port hardware's wait-state
    logic, so transfers reduce to addressed register loops.

*/

use log::debug;

use crate::{
    config::PortConfig,
    errors::Result,
    handshake,
    io::PortIo,
    regmap::{EppRegisters, SppRegisters},
    registers::Direction,
};

use super::standard::StandardPort;

pub struct EnhancedPort<B: PortIo> {
    spp: StandardPort<B>,
    epp_regs: EppRegisters,
}

impl<B: PortIo> EnhancedPort<B> {
    pub fn new(io: B, spp_base: u16) -> Result<Self> {
        Self::with_config(io, &PortConfig::new(spp_base))
    }

    pub fn with_config(mut io: B, config: &PortConfig) -> Result<Self> {
        let spp_regs = SppRegisters::map(config.spp_base_address)?;
        let epp_regs = EppRegisters::map(config.spp_base_address)?;

        // Acquire everything before the first hardware write so a failed
        // construction has no side effects.
        io.acquire_port_range(config.spp_base_address, SppRegisters::SPAN)?;
        if let Err(err) = io.acquire_port_range(epp_regs.range_base(), EppRegisters::SPAN) {
            io.release_port_range(config.spp_base_address, SppRegisters::SPAN);
            return Err(err);
        }

        let mut spp = StandardPort::assemble(io, spp_regs, config);
        spp.init_hardware(config);
        debug!("EPP: registers at {:04X}+{} ready", epp_regs.range_base(), EppRegisters::SPAN);
        Ok(Self::from_parts(spp, epp_regs))
    }

    pub(crate) fn from_parts(spp: StandardPort<B>, epp_regs: EppRegisters) -> Self {
        Self { spp, epp_regs }
    }

    /// The embedded Standard tier; every SPP operation remains available.
    pub fn spp(&self) -> &StandardPort<B> {
        &self.spp
    }

    pub fn spp_mut(&mut self) -> &mut StandardPort<B> {
        &mut self.spp
    }

    pub fn epp_registers(&self) -> &EppRegisters {
        &self.epp_regs
    }

    pub fn bidirectional(&self) -> bool {
        self.spp.bidirectional()
    }

    pub fn direction(&mut self) -> Direction {
        self.spp.direction()
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.spp.set_direction(direction)
    }

    pub fn write_spp_data(&mut self, data: &[u8], hold_while_busy: bool) -> Result<()> {
        self.spp.write_spp_data(data, hold_while_busy)
    }

    pub fn read_spp_data(&mut self) -> Result<u8> {
        self.spp.read_spp_data()
    }

    /// EPP address write cycles for each byte of `data`.
    pub fn write_epp_address(&mut self, data: &[u8]) {
        let target = self.epp_regs.address;
        self.addressed_write(target, data);
    }

    /// EPP address read cycles filling `buf`.
    pub fn read_epp_address(&mut self, buf: &mut [u8]) {
        let target = self.epp_regs.address;
        self.addressed_read(target, buf);
    }

    /// EPP data write cycles for each byte of `data`.
    pub fn write_epp_data(&mut self, data: &[u8]) {
        let target = self.epp_regs.data;
        self.addressed_write(target, data);
    }

    /// EPP data read cycles filling `buf`.
    pub fn read_epp_data(&mut self, buf: &mut [u8]) {
        let target = self.epp_regs.data;
        self.addressed_read(target, buf);
    }

    fn addressed_write(&mut self, target: u16, data: &[u8]) {
        self.spp.reset_control_register();
        self.spp.set_direction(Direction::Forward);
        handshake::write_addressed(self.spp.io_mut(), target, data);
    }

    fn addressed_read(&mut self, target: u16, buf: &mut [u8]) {
        self.spp.reset_control_register();
        self.spp.set_direction(Direction::Reverse);
        handshake::read_addressed(self.spp.io_mut(), target, buf);
    }

    pub fn register_map(&self) -> Vec<(String, u16)> {
        let mut map = self.spp.register_map();
        map.push(("EPP Address".to_string(), self.epp_regs.address));
        map.push(("EPP Data".to_string(), self.epp_regs.data));
        map
    }
}

impl<B: PortIo> Drop for EnhancedPort<B> {
    fn drop(&mut self) {
        let base = self.epp_regs.range_base();
        self.spp.io_mut().release_port_range(base, EppRegisters::SPAN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::sim::SimBackend, errors::PortError};

    const BASE: u16 = 0x378;

    #[test]
    fn test_construction_acquires_both_ranges() {
        let io = SimBackend::new();
        let _port = EnhancedPort::new(io.clone(), BASE).unwrap();
        let mut claims = io.claims();
        claims.sort();
        assert_eq!(claims, vec![(BASE, 3), (BASE + 3, 2)]);
    }

    #[test]
    fn test_failed_epp_acquisition_rolls_back() {
        let io = SimBackend::new();
        // Squat on the EPP data register only.
        let mut squatter = io.clone();
        use crate::io::PortIo;
        squatter.acquire_port_range(BASE + 4, 1).unwrap();

        let result = EnhancedPort::new(io.clone(), BASE);
        assert!(matches!(result, Err(PortError::Permission { .. })));
        // The SPP range was given back; nothing was written to hardware.
        assert_eq!(io.claims(), vec![(BASE + 4, 1)]);
        assert!(io.events().is_empty());
    }

    #[test]
    fn test_epp_write_sets_forward_once() {
        let io = SimBackend::new();
        let mut port = EnhancedPort::new(io.clone(), BASE).unwrap();
        io.clear_events();

        port.write_epp_data(&[0x10, 0x20]);
        assert_eq!(port.direction(), Direction::Forward);
        assert_eq!(io.peek(BASE + 4), 0x20);
    }

    #[test]
    fn test_epp_read_fills_buffer() {
        let io = SimBackend::new();
        let mut port = EnhancedPort::new(io.clone(), BASE).unwrap();

        io.poke(BASE + 3, 0xA5);
        let mut buf = [0u8; 3];
        port.read_epp_address(&mut buf);
        assert_eq!(buf, [0xA5, 0xA5, 0xA5]);
        assert_eq!(port.direction(), Direction::Reverse);
    }

    #[test]
    fn test_drop_releases_everything() {
        let io = SimBackend::new();
        let port = EnhancedPort::new(io.clone(), BASE).unwrap();
        drop(port);
        assert!(io.claims().is_empty());
    }
}
