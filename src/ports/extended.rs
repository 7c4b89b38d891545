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

    ports/extended.rs

    The Extended Capability Port tier. Adds an independently addressed ECP
    register block (data, config, ECR) on top of the Enhanced tier, and the
    communication mode field in ECR bits 7..5.

*/

use log::{debug, trace};

use crate::{
    bitops,
    config::PortConfig,
    errors::{PortError, Result},
    io::PortIo,
    regmap::{ranges_overlap, EcpRegisters, EppRegisters, SppRegisters},
    registers::{CommMode, Direction, ECR_MODE_OFFSET, ECR_MODE_WIDTH},
};

use super::{enhanced::EnhancedPort, standard::StandardPort};

pub struct ExtendedPort<B: PortIo> {
    epp: EnhancedPort<B>,
    ecp_regs: EcpRegisters,
}

impl<B: PortIo> ExtendedPort<B> {
    pub fn new(io: B, spp_base: u16, ecp_base: u16) -> Result<Self> {
        Self::with_config(io, &PortConfig::new(spp_base).with_ecp_base(ecp_base))
    }

    pub fn with_config(mut io: B, config: &PortConfig) -> Result<Self> {
        let ecp_base = config.ecp_base_address.ok_or_else(|| {
            PortError::Configuration(
                "an ECP base address is required for an extended port".to_string(),
            )
        })?;

        let spp_regs = SppRegisters::map(config.spp_base_address)?;
        let epp_regs = EppRegisters::map(config.spp_base_address)?;
        let ecp_regs = EcpRegisters::map(ecp_base)?;

        // The ECP block is independently configured; reject a layout that
        // folds it onto the SPP/EPP registers.
        let spp_span = (config.spp_base_address, SppRegisters::SPAN + EppRegisters::SPAN);
        if ranges_overlap(spp_span, (ecp_base, EcpRegisters::SPAN)) {
            return Err(PortError::Configuration(format!(
                "ECP range {:#06X}+{} overlaps the SPP/EPP range",
                ecp_base,
                EcpRegisters::SPAN
            )));
        }

        io.acquire_port_range(config.spp_base_address, SppRegisters::SPAN)?;
        if let Err(err) = io.acquire_port_range(epp_regs.range_base(), EppRegisters::SPAN) {
            io.release_port_range(config.spp_base_address, SppRegisters::SPAN);
            return Err(err);
        }
        if let Err(err) = io.acquire_port_range(ecp_base, EcpRegisters::SPAN) {
            io.release_port_range(epp_regs.range_base(), EppRegisters::SPAN);
            io.release_port_range(config.spp_base_address, SppRegisters::SPAN);
            return Err(err);
        }

        let mut spp = StandardPort::assemble(io, spp_regs, config);
        spp.init_hardware(config);
        debug!("ECP: registers at {:04X}+{} ready", ecp_base, EcpRegisters::SPAN);
        Ok(Self {
            epp: EnhancedPort::from_parts(spp, epp_regs),
            ecp_regs,
        })
    }

    /// The embedded Enhanced tier; EPP and SPP operations remain available.
    pub fn epp(&self) -> &EnhancedPort<B> {
        &self.epp
    }

    pub fn epp_mut(&mut self) -> &mut EnhancedPort<B> {
        &mut self.epp
    }

    pub fn ecp_registers(&self) -> &EcpRegisters {
        &self.ecp_regs
    }

    pub fn bidirectional(&self) -> bool {
        self.epp.bidirectional()
    }

    pub fn direction(&mut self) -> Direction {
        self.epp.direction()
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.epp.set_direction(direction)
    }

    pub fn read_ecr(&mut self) -> u8 {
        let byte = self.epp.spp_mut().io_mut().read_byte(self.ecp_regs.ecr);
        trace!("ECP: ECR read: {:02X}", byte);
        byte
    }

    pub fn write_ecr(&mut self, byte: u8) {
        self.epp.spp_mut().io_mut().write_byte(self.ecp_regs.ecr, byte);
        trace!("ECP: ECR write: {:02X}", byte);
    }

    pub fn read_ecp_config(&mut self) -> u8 {
        self.epp.spp_mut().io_mut().read_byte(self.ecp_regs.config)
    }

    pub fn write_ecp_config(&mut self, byte: u8) {
        self.epp.spp_mut().io_mut().write_byte(self.ecp_regs.config, byte);
    }

    /// The communication mode currently selected in ECR bits 7..5. The mode
    /// space is sparse; a reserved bit pattern is reported as an error, not
    /// renumbered.
    pub fn comm_mode(&mut self) -> Result<CommMode> {
        let raw = bitops::read_field(self.read_ecr(), ECR_MODE_OFFSET, ECR_MODE_WIDTH);
        CommMode::from_repr(raw).ok_or(PortError::InvalidCommMode(raw))
    }

    /// Select a communication mode, leaving ECR bits 0-4 untouched.
    pub fn set_comm_mode(&mut self, mode: CommMode) {
        let ecr = self.read_ecr();
        self.write_ecr(bitops::write_field(ecr, ECR_MODE_OFFSET, ECR_MODE_WIDTH, mode as u8));
        trace!("ECP: comm mode set to {}", mode);
    }

    pub fn register_map(&self) -> Vec<(String, u16)> {
        let mut map = self.epp.register_map();
        map.push(("ECP Data".to_string(), self.ecp_regs.data));
        map.push(("ECP Config".to_string(), self.ecp_regs.config));
        map.push(("ECR".to_string(), self.ecp_regs.ecr));
        map
    }
}

impl<B: PortIo> Drop for ExtendedPort<B> {
    fn drop(&mut self) {
        let base = self.ecp_regs.data;
        self.epp.spp_mut().io_mut().release_port_range(base, EcpRegisters::SPAN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::SimBackend;

    const SPP_BASE: u16 = 0x378;
    const ECP_BASE: u16 = 0x778;
    const ECR: u16 = ECP_BASE + 2;

    #[test]
    fn test_construction_acquires_three_ranges() {
        let io = SimBackend::new();
        let _port = ExtendedPort::new(io.clone(), SPP_BASE, ECP_BASE).unwrap();
        let mut claims = io.claims();
        claims.sort();
        assert_eq!(claims, vec![(SPP_BASE, 3), (SPP_BASE + 3, 2), (ECP_BASE, 3)]);
    }

    #[test]
    fn test_overlapping_ecp_base_rejected() {
        let io = SimBackend::new();
        let result = ExtendedPort::new(io.clone(), SPP_BASE, SPP_BASE + 2);
        assert!(matches!(result, Err(PortError::Configuration(_))));
        assert!(io.claims().is_empty());
    }

    #[test]
    fn test_missing_ecp_base_rejected() {
        let io = SimBackend::new();
        let config = PortConfig::new(SPP_BASE);
        assert!(matches!(
            ExtendedPort::with_config(io, &config),
            Err(PortError::Configuration(_))
        ));
    }

    #[test]
    fn test_comm_mode_round_trip() {
        let io = SimBackend::new();
        let mut port = ExtendedPort::new(io.clone(), SPP_BASE, ECP_BASE).unwrap();

        // Sibling ECR bits hold a known pattern throughout.
        io.poke(ECR, 0b0001_0011);
        for mode in [CommMode::Spp, CommMode::Byte, CommMode::Epp] {
            port.set_comm_mode(mode);
            assert_eq!(port.comm_mode().unwrap(), mode);
            assert_eq!(io.peek(ECR) & 0b0001_1111, 0b0001_0011);
        }
    }

    #[test]
    fn test_reserved_mode_rejected() {
        let io = SimBackend::new();
        let mut port = ExtendedPort::new(io.clone(), SPP_BASE, ECP_BASE).unwrap();

        io.poke(ECR, 0b0110_0000); // mode field 3: ECP FIFO, reserved here
        assert_eq!(port.comm_mode(), Err(PortError::InvalidCommMode(0b011)));
    }

    #[test]
    fn test_failed_ecp_acquisition_rolls_back() {
        let io = SimBackend::new();
        let mut squatter = io.clone();
        use crate::io::PortIo;
        squatter.acquire_port_range(ECR, 1).unwrap();

        let result = ExtendedPort::new(io.clone(), SPP_BASE, ECP_BASE);
        assert!(matches!(result, Err(PortError::Permission { .. })));
        assert_eq!(io.claims(), vec![(ECR, 1)]);
        assert!(io.events().is_empty());
    }
}
