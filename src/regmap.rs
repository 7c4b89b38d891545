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

    regmap.rs

    Register address computation for the three port standards.

    Offsets are fixed by the ISA-era conventions:
      SPP:  data = base+0, status = base+1, control = base+2
      EPP:  address = base+3, data = base+4   (same base as SPP)
      ECP:  data = base+0, config = base+1, ecr = base+2
            (relative to a separate ECP base, typically SPP base + 0x400)

*/

use crate::errors::{PortError, Result};

pub const SPP_DATA_OFFSET: u16 = 0;
pub const SPP_STATUS_OFFSET: u16 = 1;
pub const SPP_CONTROL_OFFSET: u16 = 2;
pub const EPP_ADDRESS_OFFSET: u16 = 3;
pub const EPP_DATA_OFFSET: u16 = 4;
pub const ECP_DATA_OFFSET: u16 = 0;
pub const ECP_CONFIG_OFFSET: u16 = 1;
pub const ECP_ECR_OFFSET: u16 = 2;

/// Whether two (base, count) register ranges share any address.
pub(crate) fn ranges_overlap(a: (u16, u16), b: (u16, u16)) -> bool {
    let a_end = a.0 as u32 + a.1 as u32;
    let b_end = b.0 as u32 + b.1 as u32;
    (a.0 as u32) < b_end && (b.0 as u32) < a_end
}

fn checked_span(base: u16, span: u16) -> Result<()> {
    match base.checked_add(span - 1) {
        Some(_) => Ok(()),
        None => Err(PortError::Configuration(format!(
            "base address {:#06X} overflows a {}-register range",
            base, span
        ))),
    }
}

/// Absolute addresses of the three SPP registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SppRegisters {
    pub data: u16,
    pub status: u16,
    pub control: u16,
}

impl SppRegisters {
    pub const SPAN: u16 = 3;

    pub fn map(base: u16) -> Result<Self> {
        checked_span(base, Self::SPAN)?;
        Ok(Self {
            data: base + SPP_DATA_OFFSET,
            status: base + SPP_STATUS_OFFSET,
            control: base + SPP_CONTROL_OFFSET,
        })
    }
}

/// Absolute addresses of the two EPP registers. These extend the SPP range;
/// `map` takes the SPP base, not an independent EPP base.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EppRegisters {
    pub address: u16,
    pub data: u16,
}

impl EppRegisters {
    pub const SPAN: u16 = 2;

    pub fn map(spp_base: u16) -> Result<Self> {
        checked_span(spp_base, EPP_DATA_OFFSET + 1)?;
        Ok(Self {
            address: spp_base + EPP_ADDRESS_OFFSET,
            data: spp_base + EPP_DATA_OFFSET,
        })
    }

    /// First address of the additional range this map claims.
    pub fn range_base(&self) -> u16 {
        self.address
    }
}

/// Absolute addresses of the ECP register block, computed from the ECP base
/// address (independent of the SPP base).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EcpRegisters {
    pub data: u16,
    pub config: u16,
    pub ecr: u16,
}

impl EcpRegisters {
    pub const SPAN: u16 = 3;

    pub fn map(ecp_base: u16) -> Result<Self> {
        checked_span(ecp_base, Self::SPAN)?;
        Ok(Self {
            data: ecp_base + ECP_DATA_OFFSET,
            config: ecp_base + ECP_CONFIG_OFFSET,
            ecr: ecp_base + ECP_ECR_OFFSET,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spp_offsets() {
        let regs = SppRegisters::map(0x378).unwrap();
        assert_eq!(regs.data, 0x378);
        assert_eq!(regs.status, regs.data + 1);
        assert_eq!(regs.control, regs.data + 2);
    }

    #[test]
    fn test_epp_offsets() {
        let regs = EppRegisters::map(0x378).unwrap();
        assert_eq!(regs.address, 0x378 + 3);
        assert_eq!(regs.data, 0x378 + 4);
        assert_eq!(regs.range_base(), 0x37B);
    }

    #[test]
    fn test_ecp_offsets() {
        let regs = EcpRegisters::map(0x778).unwrap();
        assert_eq!(regs.data, 0x778);
        assert_eq!(regs.config, 0x779);
        assert_eq!(regs.ecr, 0x77A);
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(SppRegisters::map(0xFFFD).is_ok());
        assert!(SppRegisters::map(0xFFFE).is_err());
        assert!(EppRegisters::map(0xFFFB).is_ok());
        assert!(EppRegisters::map(0xFFFC).is_err());
        assert!(EcpRegisters::map(0xFFFE).is_err());
    }
}
