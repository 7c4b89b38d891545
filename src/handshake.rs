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

    handshake.rs

    The Centronics compatibility-mode byte handshake and the EPP/ECP
    addressed transfer loops.

    A compatibility-mode byte goes through four steps once the caller holds
    the Forward direction and a reset control register:

      data assert -> busy check -> strobe pulse -> hold (optional)

    A byte whose busy check fails is reported as PeripheralBusy without a
    strobe; the peripheral never sees an unacknowledged byte overwritten.
    A strobe pulse, once begun, always completes its low transition before
    this module returns, even if the delay primitive fails mid-pulse.

    EPP/ECP transfers have no software handshake at all; the port hardware
    inserts wait states. They reduce to a plain per-byte loop on the target
    register.

*/

use log::trace;

use crate::{
    errors::{PortError, Result},
    io::PortIo,
    regmap::SppRegisters,
    registers::{StatusRegister, CONTROL_STROBE},
};

/// Strobe pulse width configuration. The default of 5 microseconds is well
/// above the 0.5 us floor of IEEE-1284 compatibility mode and matches what
/// most period host adapters generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StrobeTiming {
    pub pulse_width_us: u16,
}

impl Default for StrobeTiming {
    fn default() -> Self {
        Self { pulse_width_us: 5 }
    }
}

/// Write a buffer through the compatibility-mode handshake, one strobed
/// byte at a time.
///
/// The caller has already reset the control register and set the Forward
/// direction; direction is not touched per byte. On `PeripheralBusy` the
/// failed byte has not been strobed and the remainder of the buffer is
/// untransmitted; retrying, skipping or aborting is the caller's call.
pub(crate) fn write_spp_buffer<B: PortIo>(
    io: &mut B,
    regs: &SppRegisters,
    timing: &StrobeTiming,
    data: &[u8],
    hold_while_busy: bool,
) -> Result<()> {
    for &byte in data {
        write_spp_byte(io, regs, timing, byte, hold_while_busy)?;
    }
    Ok(())
}

fn write_spp_byte<B: PortIo>(
    io: &mut B,
    regs: &SppRegisters,
    timing: &StrobeTiming,
    byte: u8,
    hold_while_busy: bool,
) -> Result<()> {
    // Data assert.
    io.write_byte(regs.data, byte);
    trace!("SPP: data register write: {:02X}", byte);

    // Busy check. An asserted BUSY line means the previous byte was never
    // acknowledged; strobing over it would lose data.
    let status = StatusRegister::from_bytes([io.read_byte(regs.status)]);
    if status.busy_asserted() {
        trace!("SPP: busy check failed, byte {:02X} not strobed", byte);
        return Err(PortError::PeripheralBusy);
    }

    // Strobe pulse. The low transition is unconditional so the pulse always
    // completes even when the delay primitive reports failure.
    let control = io.read_byte(regs.control);
    io.write_byte(regs.control, control | CONTROL_STROBE);
    let delayed = io.delay_microseconds(timing.pulse_width_us);
    io.write_byte(regs.control, control);
    delayed?;

    // Hold until the peripheral has accepted the byte, if asked to. There
    // is no deadline here; callers needing one must impose it externally.
    if hold_while_busy {
        while StatusRegister::from_bytes([io.read_byte(regs.status)]).busy_asserted() {}
    }

    Ok(())
}

/// EPP/ECP addressed write: a plain per-byte loop on one target register.
pub(crate) fn write_addressed<B: PortIo>(io: &mut B, target: u16, data: &[u8]) {
    for &byte in data {
        io.write_byte(target, byte);
    }
    trace!("EPP: wrote {} byte(s) to {:04X}", data.len(), target);
}

/// EPP/ECP addressed read: fill the caller's buffer from one target
/// register.
pub(crate) fn read_addressed<B: PortIo>(io: &mut B, target: u16, buf: &mut [u8]) {
    for slot in buf.iter_mut() {
        *slot = io.read_byte(target);
    }
    trace!("EPP: read {} byte(s) from {:04X}", buf.len(), target);
}
